//! Contact bodies

use krua_app::domain::contact::models::ContactMessage;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ContactMessageResponse {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(message: ContactMessage) -> Self {
        Self {
            uuid: message.uuid.into(),
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            created_at: message.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ContactMessagesResponse {
    pub messages: Vec<ContactMessageResponse>,
}

impl From<Vec<ContactMessage>> for ContactMessagesResponse {
    fn from(messages: Vec<ContactMessage>) -> Self {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }
}
