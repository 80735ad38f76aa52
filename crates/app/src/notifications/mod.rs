//! Transactional notifications

mod errors;
mod functions;
mod payloads;

use async_trait::async_trait;
use mockall::automock;

pub use errors::NotificationError;
pub use functions::{FunctionsConfig, FunctionsNotifier};
pub use payloads::*;

#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError>;

    async fn send_status_update(&self, notice: &OrderStatusNotice) -> Result<(), NotificationError>;
}

/// Used when no functions endpoint is configured. Orders stay unconfirmed and
/// are picked up by the retry job once one is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl OrderNotifier for DisabledNotifier {
    async fn send_order_confirmation(
        &self,
        _confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Disabled)
    }

    async fn send_status_update(&self, _notice: &OrderStatusNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Disabled)
    }
}
