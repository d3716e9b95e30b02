//! ServiBid assistant server - composition root.
//!
//! 1. Load and validate configuration
//! 2. Initialize tracing
//! 3. Build the marketplace store (PostgreSQL or in-memory)
//! 4. Build conversation state (in-memory or Redis)
//! 5. Load the knowledge corpus and the language model client
//! 6. Serve the axum router

use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use servibid_assistant::adapters::ai::{OpenAIConfig, OpenAIProvider};
use servibid_assistant::adapters::clock::SystemClock;
use servibid_assistant::adapters::http::{app_router, AssistantAppState};
use servibid_assistant::adapters::knowledge::load_knowledge_base;
use servibid_assistant::adapters::memory::InMemoryMarketplace;
use servibid_assistant::adapters::postgres::{
    self, PostgresAccountRepository, PostgresBidRepository, PostgresMessagingRepository,
    PostgresRequestRepository, PostgresReviewRepository, PostgresServiceCatalog,
    PostgresTransactionRepository,
};
use servibid_assistant::adapters::storage::{InMemoryConversationStore, RedisConversationStore};
use servibid_assistant::application::{AssistantDeps, MarketplacePorts};
use servibid_assistant::config::{AppConfig, StateBackend};
use servibid_assistant::domain::assistant::ReplyFormatter;
use servibid_assistant::ports::ConversationStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let marketplace = build_marketplace(&config).await?;
    let conversations = build_conversation_store(&config).await?;

    let ai_config = OpenAIConfig::from_settings(&config.ai).ok_or("AI__API_KEY is required")?;
    info!(model = %config.ai.model, "Language model client initialized");
    let ai = Arc::new(OpenAIProvider::new(ai_config)?);

    let knowledge = load_knowledge_base(config.assistant.knowledge_path.as_deref()).await?;

    let replies = if config.assistant.vary_phrasing {
        ReplyFormatter::random()
    } else {
        ReplyFormatter::fixed()
    };

    let deps = AssistantDeps {
        marketplace,
        ai,
        conversations,
        knowledge: Arc::new(knowledge),
        clock: Arc::new(SystemClock),
        replies,
    };

    let app = app_router(AssistantAppState::new(deps), &config.server);
    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, environment = ?config.server.environment, "ServiBid assistant listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_marketplace(config: &AppConfig) -> Result<MarketplacePorts, Box<dyn Error>> {
    let Some(database) = &config.database else {
        warn!("No database configured; using an empty in-memory marketplace");
        return Ok(MarketplacePorts::shared(Arc::new(InMemoryMarketplace::new())));
    };

    let pool = postgres::connect(database).await?;
    info!("Connected to PostgreSQL");

    Ok(MarketplacePorts {
        accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
        requests: Arc::new(PostgresRequestRepository::new(pool.clone())),
        bids: Arc::new(PostgresBidRepository::new(pool.clone())),
        messaging: Arc::new(PostgresMessagingRepository::new(pool.clone())),
        reviews: Arc::new(PostgresReviewRepository::new(pool.clone())),
        transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
        catalog: Arc::new(PostgresServiceCatalog::new(pool)),
    })
}

async fn build_conversation_store(
    config: &AppConfig,
) -> Result<Arc<dyn ConversationStore>, Box<dyn Error>> {
    let ttl = config.assistant.state_ttl();

    match (config.assistant.state_backend, &config.redis) {
        (StateBackend::Redis, Some(redis)) => {
            let store = RedisConversationStore::connect(&redis.url, redis.key_prefix.clone())
                .await?
                .with_ttl(ttl);
            info!("Conversation state kept in Redis");
            Ok(Arc::new(store))
        }
        (StateBackend::Redis, None) => Err("redis state backend requires REDIS__URL".into()),
        (StateBackend::Memory, _) => {
            info!("Conversation state kept in process memory");
            Ok(Arc::new(InMemoryConversationStore::new().with_ttl(ttl)))
        }
    }
}
