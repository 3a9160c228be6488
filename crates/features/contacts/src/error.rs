use moringa_database::DatabaseError;
use moringa_domain::error::format_context;
use moringa_kernel::server::FieldError;
use std::borrow::Cow;

/// Rejected form input. Carries every failing field, in form order.
#[derive(Debug, thiserror::Error)]
#[error("Invalid form data: {}", summarize(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// A payload that could not be read as JSON at all.
    pub fn invalid_json(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(vec![FieldError::new("body", "invalid_json", message)])
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors.iter().map(|e| format!("{} ({})", e.field, e.code)).collect::<Vec<_>>().join(", ")
}

/// Failures of the contact store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Contact storage error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },
    /// A stored row could not be mapped back to a contact.
    #[error("Corrupt contact record{}: {message}", format_context(.context))]
    Corrupt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<DatabaseError> for StorageError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

/// Why a notification did not go out. Never surfaces past the notifier.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification build error{}: {message}", format_context(.context))]
    Build { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Notification address error{}: {message}", format_context(.context))]
    Address { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Notification transport error{}: {message}", format_context(.context))]
    Transport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Notification timed out{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Notification not sent: mail delivery is disabled")]
    Disabled,
}

/// A specialized [`ContactsError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Contacts configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<NotificationError> for ContactsError {
    fn from(err: NotificationError) -> Self {
        Self::Configuration { message: err.to_string().into(), context: Some("Mail setup".into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_fields() {
        let err = ValidationError::new(vec![
            FieldError::new("name", "required", "Required"),
            FieldError::new("email", "invalid_email", "Invalid email"),
        ]);
        assert_eq!(err.to_string(), "Invalid form data: name (required), email (invalid_email)");
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn notification_error_becomes_configuration_error() {
        let err: ContactsError = NotificationError::Address {
            message: "bad mailbox".into(),
            context: None,
        }
        .into();
        assert!(matches!(err, ContactsError::Configuration { .. }));
        assert!(err.to_string().contains("bad mailbox"));
    }
}
