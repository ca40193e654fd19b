use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::BillingError;
use crate::types::{CheckoutSession, Customer};
use crate::util::http;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const STRIPE_API_VERSION: &str = "2024-06-20";

/// Everything needed to open a hosted checkout session in subscription
/// mode: one line item at quantity 1, plus traceability metadata.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub account_id: String,
    pub plan_id: String,
    pub user_id: String,
}

/// Payment-provider operations the checkout handler depends on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer record, tagged with account and user ids.
    async fn create_customer(
        &self,
        email: &str,
        account_id: &str,
        user_id: &str,
    ) -> Result<Customer, BillingError>;

    /// Open a new hosted checkout session. Deliberately not idempotent:
    /// every call creates a fresh session on the provider side.
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, BillingError>;
}

/// Stripe REST client. Stripe's API takes form-encoded bodies, so requests
/// are assembled as flat key/value lists with bracketed nesting.
pub struct StripeGateway {
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, BillingError> {
        let url = format!("{}{}", self.api_base, path);

        let response = http::client()
            .post(&url)
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

fn customer_form(email: &str, account_id: &str, user_id: &str) -> Vec<(String, String)> {
    vec![
        ("email".to_string(), email.to_string()),
        ("metadata[account_id]".to_string(), account_id.to_string()),
        ("metadata[user_id]".to_string(), user_id.to_string()),
    ]
}

fn checkout_session_form(params: &CheckoutParams) -> Vec<(String, String)> {
    vec![
        ("customer".to_string(), params.customer_id.clone()),
        ("mode".to_string(), "subscription".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("line_items[0][price]".to_string(), params.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
        ("metadata[account_id]".to_string(), params.account_id.clone()),
        ("metadata[plan_id]".to_string(), params.plan_id.clone()),
        ("metadata[user_id]".to_string(), params.user_id.clone()),
    ]
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(
        &self,
        email: &str,
        account_id: &str,
        user_id: &str,
    ) -> Result<Customer, BillingError> {
        let customer: Customer = self
            .post_form("/customers", &customer_form(email, account_id, user_id))
            .await?;
        info!(
            "Created Stripe customer {} for account {} (user {})",
            customer.id, account_id, user_id
        );
        Ok(customer)
    }

    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, BillingError> {
        self.post_form("/checkout/sessions", &checkout_session_form(params))
            .await
    }
}
