//! Client for the serverless email functions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::notifications::{
    NotificationError, OrderConfirmation, OrderNotifier, OrderStatusNotice,
};

const ORDER_CONFIRMATION_FUNCTION: &str = "send-order-confirmation";
const ORDER_STATUS_FUNCTION: &str = "send-order-status-update";

/// Configuration for the functions endpoint.
#[derive(Clone)]
pub struct FunctionsConfig {
    /// Base URL, e.g. `"https://functions.example.com"`.
    pub url: String,

    /// Service key sent as a bearer token.
    pub service_key: String,

    pub timeout: Duration,
}

impl std::fmt::Debug for FunctionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsConfig")
            .field("url", &self.url)
            .field("service_key", &"**redacted**")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client invoking `POST {url}/functions/v1/{name}`.
#[derive(Debug, Clone)]
pub struct FunctionsNotifier {
    config: FunctionsConfig,
    http: Client,
}

impl FunctionsNotifier {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: FunctionsConfig) -> Result<Self, NotificationError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NotificationError::Http)?;

        Ok(Self { config, http })
    }

    fn function_url(&self, name: &str) -> String {
        format!(
            "{}/functions/v1/{name}",
            self.config.url.trim_end_matches('/')
        )
    }

    async fn invoke<T: Serialize + Sync>(
        &self,
        name: &str,
        body: &T,
    ) -> Result<(), NotificationError> {
        let url = self.function_url(name);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.service_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(NotificationError::UnexpectedResponse { status, body });
        }

        debug!(function = name, %status, "notification function invoked");

        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for FunctionsNotifier {
    async fn send_order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError> {
        self.invoke(ORDER_CONFIRMATION_FUNCTION, confirmation).await
    }

    async fn send_status_update(&self, notice: &OrderStatusNotice) -> Result<(), NotificationError> {
        self.invoke(ORDER_STATUS_FUNCTION, notice).await
    }
}
