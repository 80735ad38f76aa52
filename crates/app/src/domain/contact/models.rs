//! Contact Message Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Contact Message UUID
pub type ContactMessageUuid = TypedUuid<ContactMessage>;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Contact Message Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub uuid: ContactMessageUuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// New Contact Message Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub uuid: ContactMessageUuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
