//! Contact Messages Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::contact::models::{ContactMessage, ContactMessageUuid, NewContactMessage};

const CREATE_CONTACT_MESSAGE_SQL: &str = include_str!("sql/create_contact_message.sql");
const LIST_CONTACT_MESSAGES_SQL: &str = include_str!("sql/list_contact_messages.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgContactRepository;

impl PgContactRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_message(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, sqlx::Error> {
        query_as::<Postgres, ContactMessage>(CREATE_CONTACT_MESSAGE_SQL)
            .bind(message.uuid.into_uuid())
            .bind(&message.name)
            .bind(&message.email)
            .bind(&message.subject)
            .bind(&message.message)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_messages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        query_as::<Postgres, ContactMessage>(LIST_CONTACT_MESSAGES_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ContactMessage {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ContactMessageUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            subject: row.try_get("subject")?,
            message: row.try_get("message")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
