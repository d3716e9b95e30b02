//! Prompt text sent to the language model.

use chrono::NaiveDate;

/// Refusal the model is told to give when the knowledge base lacks an answer.
pub const SUPPORT_REFUSAL: &str =
    "I don't have that information currently. Please contact support@servibid.tech.";

pub const GENERAL_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Feel free to answer using general knowledge.";

/// Sentinel the model answers with when it cannot extract anything.
pub const NONE_LABEL: &str = "none";

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn classify_intent(message: &str, labels: &[String]) -> String {
    format!(
        "Classify the intent of the user's message below into one of the following categories:\n\n\
         {}\n\n\
         User Message: \"{}\"\n\n\
         Reply ONLY with one of the category keywords above. Do not explain.",
        bullet_list(labels),
        message
    )
}

pub fn extract_category(message: &str, categories: &[String]) -> String {
    format!(
        "Extract the most relevant service category from the message below.\n\
         Only choose from the following categories:\n\n\
         {}\n\n\
         If the category is unclear or not mentioned, reply with \"{none}\".\n\n\
         Message: \"{}\"\n\n\
         Respond ONLY with a category name from the list or \"{none}\".",
        bullet_list(categories),
        message,
        none = NONE_LABEL
    )
}

pub fn extract_car_type(message: &str, car_types: &[String]) -> String {
    format!(
        "A user is describing their car. Extract the most likely car type based on what they say.\n\n\
         Choose only from this list:\n\
         {}\n\n\
         If the car type isn't obvious or cannot be confidently matched, return \"{none}\".\n\n\
         User said: \"{}\"\n\n\
         Respond ONLY with the car type or \"{none}\".",
        bullet_list(car_types),
        message,
        none = NONE_LABEL
    )
}

pub fn extract_service(message: &str, category: &str, services: &[String]) -> String {
    format!(
        "You're helping a user book a service in the \"{}\" category.\n\
         Identify the best matching service name from the list below, based on what they said.\n\n\
         Service Options:\n\
         {}\n\n\
         User said: \"{}\"\n\n\
         Reply ONLY with one exact match from the list above, or \"{none}\" if nothing matches well.",
        category,
        bullet_list(services),
        message,
        none = NONE_LABEL
    )
}

pub fn extract_date(message: &str, today: NaiveDate) -> String {
    format!(
        "You're helping a user schedule a service. Today's date is {}.\n\n\
         They said: \"{}\"\n\n\
         Extract a valid future date in YYYY-MM-DD format from their message.\n\
         If the date is unclear or invalid, reply with \"{none}\".\n\n\
         Only reply with the date string or \"{none}\".",
        today.format("%A, %B %-d, %Y"),
        message,
        none = NONE_LABEL
    )
}

pub fn extract_budget(message: &str) -> String {
    format!(
        "You're helping a user provide their budget for a service.\n\n\
         They said: \"{}\"\n\n\
         Extract the most reasonable single number in AED that represents their intended budget.\n\
         Only reply with the number (e.g., 250). If unclear, reply with \"{none}\".",
        message,
        none = NONE_LABEL
    )
}

/// System prompt restricting the answer to the retrieved chunks.
pub fn knowledge_system_prompt(chunks: &[&str]) -> String {
    format!(
        "You are an AI assistant for the ServiBid app.\n\n\
         Only answer using the following knowledge base. If unsure, say:\n\
         \"{}\"\n\n\
         Knowledge Base:\n\
         {}",
        SUPPORT_REFUSAL,
        chunks.join("\n\n")
    )
}
