//! Shardbank HTTP client implementation.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    AccountCreated, ApiErrorResponse, CreateAccount, CreateUser, HealthResponse, InsertResponse,
    ReadinessResponse, Record, Region, ResolvedEndpoint, TransactionRequest, TransactionResult,
    UserLocation,
};

/// Shardbank API client.
///
/// Provides one method per dashboard endpoint.
#[derive(Debug, Clone)]
pub struct ShardbankClient {
    client: Client,
    base_url: String,
}

impl ShardbankClient {
    /// Create a new shardbank client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the shardbank service (e.g., `"http://localhost:5001"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new shardbank client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the base URL is empty or the
    /// HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base URL is empty".into()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health").await
    }

    /// Check that the service can reach the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the catalog is unreachable.
    pub async fn ready(&self) -> Result<ReadinessResponse, ClientError> {
        self.get("/health/ready").await
    }

    /// Per-region aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn regional_stats(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/stats/regional").await
    }

    /// System-wide aggregates; empty when the catalog has no row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn overall_stats(&self) -> Result<Record, ClientError> {
        self.get("/api/stats/overall").await
    }

    /// Latest transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn recent_transactions(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/transactions/recent").await
    }

    /// Daily transaction volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn transactions_by_date(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/transactions/by-date").await
    }

    /// Account breakdown per region.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn accounts_by_region(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/accounts/by-region").await
    }

    /// `(user_id, username, full_name)` for every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn users(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/users").await
    }

    /// Users with account count and total balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn user_summaries(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/users/list").await
    }

    /// Accounts joined with their owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn accounts(&self) -> Result<Vec<Record>, ClientError> {
        self.get("/api/accounts").await
    }

    /// Find a user by username. `Ok(None)` when no shard has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error
    /// other than not found.
    pub async fn lookup_user(&self, username: &str) -> Result<Option<UserLocation>, ClientError> {
        let url = format!("{}/api/users/lookup", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("username", username)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(response).await.map(Some)
    }

    /// Address a region's shard resolves to; `None` resolves the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn resolve_shard(
        &self,
        region: Option<Region>,
    ) -> Result<ResolvedEndpoint, ClientError> {
        let url = format!("{}/api/shards/resolve", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(region) = region {
            request = request.query(&[("region", region.code())]);
        }
        handle_response(request.send().await?).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn insert_user(
        &self,
        user: &CreateUser,
    ) -> Result<InsertResponse<UserLocation>, ClientError> {
        self.post("/api/insert/user", user).await
    }

    /// Open an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn insert_account(
        &self,
        account: &CreateAccount,
    ) -> Result<InsertResponse<AccountCreated>, ClientError> {
        self.post("/api/insert/account", account).await
    }

    /// Deposit, withdraw, transfer or record a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn insert_transaction(
        &self,
        transaction: &TransactionRequest,
    ) -> Result<InsertResponse<TransactionResult>, ClientError> {
        self.post("/api/insert/transaction", transaction).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;
        handle_response(response).await
    }
}

/// Decode a success body, or turn an `{error}` payload into `ClientError::Api`.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let bytes = response.bytes().await?;
    let error = match serde_json::from_slice::<ApiErrorResponse>(&bytes) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            message: body.error,
            details: body.details,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            message: format!("HTTP {status}"),
            details: None,
        },
    };
    tracing::debug!(error = %error, "Shardbank API returned an error");
    Err(error)
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = ShardbankClient::new("http://localhost:5001/").unwrap();
        assert_eq!(client.base_url, "http://localhost:5001");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            ShardbankClient::new("/"),
            Err(ClientError::Configuration(_))
        ));
    }
}
