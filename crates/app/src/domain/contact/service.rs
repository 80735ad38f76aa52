//! Contact service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        contact::{
            errors::ContactServiceError,
            models::{ContactMessage, MAX_MESSAGE_CHARS, NewContactMessage},
            repository::PgContactRepository,
        },
        validation,
    },
};

#[derive(Debug, Clone)]
pub struct PgContactService {
    db: Db,
    repository: PgContactRepository,
}

impl PgContactService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgContactRepository::new(),
        }
    }
}

fn validate(message: NewContactMessage) -> Result<NewContactMessage, ContactServiceError> {
    let body = validation::required("message", &message.message)?;

    validation::max_chars("message", &body, MAX_MESSAGE_CHARS)?;

    Ok(NewContactMessage {
        uuid: message.uuid,
        name: validation::required("name", &message.name)?,
        email: validation::email("email", &message.email)?,
        subject: validation::required("subject", &message.subject)?,
        message: body,
    })
}

#[async_trait]
impl ContactService for PgContactService {
    async fn submit(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, ContactServiceError> {
        let message = validate(message)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_message(&mut tx, &message).await?;

        tx.commit().await?;

        info!(message_uuid = %created.uuid, "contact message received");

        Ok(created)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, ContactServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let messages = self.repository.list_messages(&mut tx).await?;

        tx.commit().await?;

        Ok(messages)
    }
}

#[automock]
#[async_trait]
pub trait ContactService: Send + Sync {
    /// Store a message sent through the public contact form.
    async fn submit(&self, message: NewContactMessage)
    -> Result<ContactMessage, ContactServiceError>;

    /// Newest first.
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, ContactServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{contact::models::ContactMessageUuid, validation::ValidationError},
        test::TestContext,
    };

    use super::*;

    fn message(body: &str) -> NewContactMessage {
        NewContactMessage {
            uuid: ContactMessageUuid::new(),
            name: " Somchai ".to_string(),
            email: "somchai@example.com".to_string(),
            subject: "Catering".to_string(),
            message: body.to_string(),
        }
    }

    #[test]
    fn validation_trims_fields() -> TestResult {
        let validated = validate(message("  Do you cater weddings?  "))?;

        assert_eq!(validated.name, "Somchai");
        assert_eq!(validated.message, "Do you cater weddings?");

        Ok(())
    }

    #[test]
    fn validation_rejects_blank_and_bad_email() {
        assert!(matches!(
            validate(message("   ")),
            Err(ContactServiceError::Validation(ValidationError::Required(
                "message"
            )))
        ));

        let result = validate(NewContactMessage {
            email: "somchai".to_string(),
            ..message("Hello")
        });

        assert!(matches!(
            result,
            Err(ContactServiceError::Validation(ValidationError::InvalidEmail(
                "email"
            )))
        ));
    }

    #[test]
    fn message_length_is_counted_in_characters() -> TestResult {
        let thai = "ก".repeat(MAX_MESSAGE_CHARS);

        validate(message(&thai))?;

        let too_long = validate(message(&"a".repeat(MAX_MESSAGE_CHARS + 1)));

        assert!(matches!(
            too_long,
            Err(ContactServiceError::Validation(ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_CHARS,
            }))
        ));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn submitted_messages_are_listed_newest_first() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx.contact.submit(message("First")).await?;
        let second = ctx.contact.submit(message("Second")).await?;

        let listed = ctx.contact.list_messages().await?;

        assert_eq!(
            listed.iter().map(|m| m.uuid).collect::<Vec<_>>(),
            vec![second.uuid, first.uuid]
        );

        Ok(())
    }
}
