use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{self, header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::auth::{SupabaseAuth, TokenVerifier};
use crate::billing::{CheckoutParams, PaymentGateway, StripeGateway};
use crate::config::Config;
use crate::error::{ApiError, ProviderError};
use crate::provider::{ChatProvider, OpenAiChat};
use crate::store::{DataStore, SupabaseStore};
use crate::types::Message;

/// Fixed model and persona for the chat relay. Single-turn: no history is
/// kept across invocations.
const CHAT_MODEL: &str = "gpt-5-mini";
const CHAT_SYSTEM_PROMPT: &str =
    "You are the AI assistant for FhoneOS, helping with calls, messaging, and support.";
const CHAT_REASONING_EFFORT: &str = "minimal";
const CHAT_FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Shared application state: the external collaborators each handler
/// talks to, behind trait objects.
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub store: Arc<dyn DataStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub chat: Arc<dyn ChatProvider>,
}

impl AppState {
    /// Wire up the production collaborators from config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            verifier: Arc::new(SupabaseAuth::new(
                &config.supabase_url,
                &config.supabase_service_role_key,
            )),
            store: Arc::new(SupabaseStore::new(
                &config.supabase_url,
                &config.supabase_service_role_key,
            )),
            gateway: Arc::new(StripeGateway::new(&config.stripe_secret_key)),
            chat: Arc::new(OpenAiChat::new(&config.openai_api_key)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    /// Used verbatim in the plan lookup; an absent field behaves like an
    /// unknown plan id rather than a parse failure.
    #[serde(default)]
    plan_id: String,
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

/// Build the router hosted by both the Lambda and the local server.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/create-stripe-session", post(handle_create_stripe_session))
        .route("/openai-chat", post(handle_openai_chat))
        .route("/health", get(handle_health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::POST, http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .with_state(state)
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// Pull the Authorization header value, stripping a `Bearer ` prefix when
/// present. An empty header value counts as absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
}

/// POST /create-stripe-session — resolve the caller's account and plan,
/// ensure a Stripe customer exists, and open a hosted checkout session.
async fn handle_create_stripe_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;

    let user = state
        .verifier
        .verify(token)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    // Parsed by hand so a malformed body lands in the catch-all 500
    // instead of an extractor rejection.
    let req: CheckoutRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::Internal(e.into()))?;

    let plan = state
        .store
        .plan(&req.plan_id)
        .await?
        .ok_or(ApiError::NotFound("Plan not found"))?;

    // Fails closed: a user with no account link cannot check out.
    let account_id = state
        .store
        .account_id_for_user(&user.id)
        .await?
        .ok_or(ApiError::NotFound("Account not found"))?;

    // Best-effort: a missing or unreadable accounts row falls back to the
    // user's own email below.
    let billing_email = match state.store.billing_email(&account_id).await {
        Ok(email) => email,
        Err(e) => {
            error!("Billing email lookup failed for account {}: {}", account_id, e);
            None
        }
    };

    // Reuse the account's Stripe customer when one is already recorded;
    // otherwise create one, preferring the billing email.
    let customer_id = match state.store.existing_customer_id(&account_id).await? {
        Some(id) => id,
        None => {
            let email = billing_email
                .as_deref()
                .or(user.email.as_deref())
                .unwrap_or_default();
            state
                .gateway
                .create_customer(email, &account_id, &user.id)
                .await?
                .id
        }
    };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let session = state
        .gateway
        .create_checkout_session(&CheckoutParams {
            customer_id,
            price_id: plan.stripe_price_id.clone(),
            success_url: format!(
                "{origin}/billing-payment-center?session_id={{CHECKOUT_SESSION_ID}}"
            ),
            cancel_url: format!("{origin}/billing-payment-center?canceled=true"),
            account_id: account_id.clone(),
            plan_id: plan.id.clone(),
            user_id: user.id.clone(),
        })
        .await?;

    info!(
        "Checkout session {} created for account {} (plan {})",
        session.id, account_id, plan.id
    );

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// POST /openai-chat — relay a single-turn message to the completion API.
/// The Authorization header is only checked for presence, matching the
/// deployed contract; the token itself is not verified here.
async fn handle_openai_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    if bearer_token(&headers).is_none() {
        return Err(ApiError::Unauthenticated);
    }

    let req: ChatRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::Internal(e.into()))?;

    let message = match req.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => return Err(ApiError::BadRequest("Missing message")),
    };

    let messages = [Message::system(CHAT_SYSTEM_PROMPT), Message::user(message)];

    let completion = state
        .chat
        .complete(&messages, CHAT_MODEL, CHAT_REASONING_EFFORT)
        .await
        .map_err(|e| match e {
            ProviderError::Api { status, message } => {
                error!("OpenAI error ({}): {}", status, message);
                ApiError::Upstream("OpenAI error")
            }
            other => ApiError::Internal(other.into()),
        })?;

    let reply = completion
        .content
        .unwrap_or_else(|| CHAT_FALLBACK_REPLY.to_string());

    Ok(Json(ChatResponse { reply }))
}
