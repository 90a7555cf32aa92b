use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, loaded from the environment with defaults.
///
/// Variable names follow the deployment convention of the service this
/// backend fronts: `PORT`, `REDIS_HOST`/`REDIS_PORT`, `QDRANT_URL`,
/// `JINA_API_KEY`, `GEMINI_API_KEY`, `SESSION_TTL`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub log_dir: PathBuf,

    pub redis_url: String,
    pub session_ttl: Duration,
    /// Serialized size cap for a single stored turn, in bytes.
    pub max_turn_bytes: usize,

    pub qdrant_url: String,
    pub qdrant_collection: String,

    pub jina_api_url: String,
    pub jina_api_key: String,
    pub jina_model: String,

    pub gemini_api_url: String,
    pub gemini_api_key: String,

    pub top_k: usize,
    pub history_window: usize,
    pub max_snippet_chars: usize,
    pub max_query_chars: usize,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub upstream_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 5000,
            log_dir: PathBuf::from("logs"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            session_ttl: Duration::from_secs(3600),
            max_turn_bytes: 10_000,
            qdrant_url: "http://localhost:6333".to_string(),
            qdrant_collection: "news_articles".to_string(),
            jina_api_url: "https://api.jina.ai/v1/embeddings".to_string(),
            jina_api_key: String::new(),
            jina_model: "jina-embeddings-v2-base-en".to_string(),
            gemini_api_url:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                    .to_string(),
            gemini_api_key: String::new(),
            top_k: 5,
            history_window: 5,
            max_snippet_chars: 500,
            max_query_chars: 5000,
            temperature: 0.7,
            max_output_tokens: 500,
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let redis_host = env_or("REDIS_HOST", "127.0.0.1");
        let redis_port = parse_env("REDIS_PORT").unwrap_or(6379u16);

        Settings {
            port: parse_env("PORT").unwrap_or(defaults.port),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            redis_url: format!("redis://{}:{}", redis_host, redis_port),
            session_ttl: parse_env("SESSION_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_turn_bytes: parse_env("MAX_MESSAGE_SIZE").unwrap_or(defaults.max_turn_bytes),
            qdrant_url: env_or("QDRANT_URL", &defaults.qdrant_url),
            qdrant_collection: env_or("QDRANT_COLLECTION", &defaults.qdrant_collection),
            jina_api_url: env_or("JINA_API_URL", &defaults.jina_api_url),
            jina_api_key: env_or("JINA_API_KEY", ""),
            jina_model: env_or("JINA_MODEL", &defaults.jina_model),
            gemini_api_url: env_or("GEMINI_API_URL", &defaults.gemini_api_url),
            gemini_api_key: env_or("GEMINI_API_KEY", ""),
            top_k: parse_env("RAG_TOP_K").unwrap_or(defaults.top_k),
            history_window: parse_env("RAG_HISTORY_WINDOW").unwrap_or(defaults.history_window),
            max_snippet_chars: parse_env("RAG_MAX_CONTEXT_CHARS")
                .unwrap_or(defaults.max_snippet_chars),
            max_query_chars: defaults.max_query_chars,
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
            upstream_timeout: parse_env("UPSTREAM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => fallback.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.parse().ok())
}
