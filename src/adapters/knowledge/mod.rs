//! Knowledge corpus loading.

mod jsonl_loader;

pub use jsonl_loader::load_knowledge_base;
