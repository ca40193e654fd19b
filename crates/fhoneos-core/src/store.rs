use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;
use crate::types::Plan;
use crate::util::http;

/// Table-style exact-match lookups against the relational backend. Every
/// method resolves at most one row; zero or multiple matches come back as
/// `None`, never as an error.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Plan by primary key.
    async fn plan(&self, plan_id: &str) -> Result<Option<Plan>, StoreError>;

    /// Account a user is linked to, via the `account_users` link table.
    async fn account_id_for_user(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// The account's billing email, when the account row exists and has one.
    async fn billing_email(&self, account_id: &str) -> Result<Option<String>, StoreError>;

    /// An already-recorded Stripe customer id for the account, from a
    /// subscription row where the id is non-null.
    async fn existing_customer_id(&self, account_id: &str) -> Result<Option<String>, StoreError>;
}

/// Supabase PostgREST client over `/rest/v1`, authenticated with the
/// service-role key.
pub struct SupabaseStore {
    base_url: String,
    service_role_key: String,
}

#[derive(Debug, Deserialize)]
struct AccountUserRow {
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    billing_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    stripe_customer_id: Option<String>,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }

    /// Run a filtered select and return the row only when exactly one
    /// matched. `limit=2` is enough to tell one row from many.
    async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>, StoreError> {
        let mut url = format!("{}/rest/v1/{}?select={}&limit=2", self.base_url, table, select);
        for (column, filter) in filters {
            url.push_str(&format!("&{}={}", column, urlencoding::encode(filter)));
        }

        debug!("PostgREST query: {} {:?}", table, filters);

        let response = http::client()
            .get(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut rows: Vec<T> = response.json().await?;
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl DataStore for SupabaseStore {
    async fn plan(&self, plan_id: &str) -> Result<Option<Plan>, StoreError> {
        self.select_single(
            "plans",
            "id,stripe_price_id",
            &[("id", format!("eq.{plan_id}"))],
        )
        .await
    }

    async fn account_id_for_user(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let row: Option<AccountUserRow> = self
            .select_single(
                "account_users",
                "account_id",
                &[("user_id", format!("eq.{user_id}"))],
            )
            .await?;
        Ok(row.map(|r| r.account_id))
    }

    async fn billing_email(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        let row: Option<AccountRow> = self
            .select_single(
                "accounts",
                "billing_email",
                &[("id", format!("eq.{account_id}"))],
            )
            .await?;
        Ok(row.and_then(|r| r.billing_email))
    }

    async fn existing_customer_id(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        let row: Option<SubscriptionRow> = self
            .select_single(
                "account_subscriptions",
                "stripe_customer_id",
                &[
                    ("account_id", format!("eq.{account_id}")),
                    ("stripe_customer_id", "not.is.null".to_string()),
                ],
            )
            .await?;
        Ok(row.and_then(|r| r.stripe_customer_id))
    }
}
