use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client with connection pooling and keep-alive. Built once
/// per process so warm invocations reuse connections to Stripe, Supabase
/// and OpenAI.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent("fhoneos-functions/0.1.0")
        .build()
        .expect("Failed to create HTTP client")
});

/// Get the shared HTTP client.
pub fn client() -> &'static Client {
    &HTTP_CLIENT
}
