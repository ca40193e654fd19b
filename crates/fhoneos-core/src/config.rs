use crate::error::ConfigError;

/// Process-wide configuration, read once at startup and passed into the
/// handlers explicitly. No handler reads the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    /// Stripe secret key (`sk_live_...` / `sk_test_...`).
    pub stripe_secret_key: String,
    /// Supabase project base URL, e.g. `https://xyz.supabase.co`.
    pub supabase_url: String,
    /// Supabase service-role key; used for both GoTrue lookups and
    /// privileged PostgREST queries.
    pub supabase_service_role_key: String,
    /// OpenAI API key for the chat relay.
    pub openai_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stripe_secret_key: require("STRIPE_SECRET_KEY")?,
            supabase_url: require("SUPABASE_URL")?,
            supabase_service_role_key: require("SUPABASE_SERVICE_ROLE_KEY")?,
            openai_api_key: require("OPENAI_API_KEY")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
