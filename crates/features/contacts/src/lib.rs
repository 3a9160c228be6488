//! Contact form feature slice: validate, persist, notify, respond.
//!
//! ```text
//! POST /api/contacts  -> validate -> store.create -> notifier.notify -> 200 | 400 | 500
//! GET  /api/contacts  -> store.list
//! GET  /api/stats     -> baseline + store.count
//! ```

mod error;
mod handlers;
mod model;
mod notifier;
mod router;
mod stats;
mod store;
mod validation;

pub use crate::error::{ContactsError, NotificationError, StorageError, ValidationError};
pub use crate::model::{Contact, NewContact, StatsResponse, SubmitResponse};
pub use crate::notifier::{MailTransport, Notifier};
pub use crate::router::router;
pub use crate::stats::StatsAggregator;
pub use crate::store::{ContactRepository, StoreFuture, SurrealContactStore};
pub use crate::validation::validate;

use moringa_database::Database;
use moringa_kernel::domain::config::ApiConfig;
use moringa_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info};

/// Result of an accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub contact: Contact,
    /// Whether the notification email was dispatched.
    pub notified: bool,
}

#[derive(Debug)]
struct ContactsInner {
    store: Arc<dyn ContactRepository>,
    notifier: Notifier,
    stats: StatsAggregator,
}

/// Contacts feature state.
#[derive(Debug, Clone)]
pub struct Contacts {
    inner: Arc<ContactsInner>,
}

impl FeatureSlice for Contacts {
    fn name(&self) -> &'static str {
        "contacts"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Contacts {
    pub fn new(store: Arc<dyn ContactRepository>, notifier: Notifier, stats: StatsAggregator) -> Self {
        Self { inner: Arc::new(ContactsInner { store, notifier, stats }) }
    }

    /// Runs the submission pipeline for a raw JSON body.
    ///
    /// Persistence is authoritative; the notification outcome only shows up in
    /// [`SubmissionOutcome::notified`].
    ///
    /// # Errors
    /// * [`ContactsError::Validation`] if the body is rejected. Nothing is stored.
    /// * [`ContactsError::Storage`] if the contact cannot be stored. No email is sent.
    pub async fn submit(&self, body: &Value) -> Result<SubmissionOutcome, ContactsError> {
        let payload = validate(body)?;

        let contact = self.inner.store.create(payload.clone()).await.inspect_err(|e| {
            error!(error = %e, service = %payload.service, "Failed to store contact");
        })?;

        let notified = self.inner.notifier.notify(&payload).await;

        info!(contact_id = %contact.id, service = %contact.service, notified, "Contact submitted");

        Ok(SubmissionOutcome { contact, notified })
    }

    /// All stored contacts, in insertion order.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<Contact>, StorageError> {
        self.inner.store.list().await
    }

    /// Baseline plus the number of stored contacts.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the store cannot be read.
    pub async fn happy_clients(&self) -> Result<u64, StorageError> {
        let count = self.inner.store.count().await?;
        Ok(self.inner.stats.happy_clients(count))
    }
}

/// Initialize the contacts feature over the shared database.
///
/// # Errors
/// * [`ContactsError::Configuration`] if the mail settings are unusable.
/// * [`ContactsError::Storage`] if the contact table cannot be read.
pub async fn init(cfg: &ApiConfig, db: &Database) -> Result<InitializedSlice, ContactsError> {
    let notifier = Notifier::from_config(&cfg.mail)?;
    let store = SurrealContactStore::new(db.clone()).await?;
    let stats = StatsAggregator::from_config(&cfg.stats);

    info!(mail = cfg.mail.enabled, baseline = cfg.stats.baseline, "Contacts slice initialized");

    Ok(InitializedSlice::new(Contacts::new(Arc::new(store), notifier, stats)))
}
