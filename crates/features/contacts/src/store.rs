use crate::error::StorageError;
use crate::model::{Contact, NewContact};
use chrono::{DateTime, SecondsFormat, Utc};
use moringa_database::{Database, DatabaseErrorExt};
use moringa_domain::constants::CONTACT;
use moringa_kernel::safe_nanoid;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use surrealdb::types::SurrealValue;
use tokio::sync::Mutex;
use tracing::debug;

/// Length of generated contact identifiers.
const CONTACT_ID_LEN: usize = 16;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// The canonical collection of contact submissions.
///
/// Records are append-only: created once, never updated or removed.
pub trait ContactRepository: Debug + Send + Sync {
    /// Assigns an id and timestamp, then appends the record atomically.
    fn create(&self, payload: NewContact) -> StoreFuture<'_, Contact>;

    /// Every contact, in insertion order.
    fn list(&self) -> StoreFuture<'_, Vec<Contact>>;

    fn count(&self) -> StoreFuture<'_, u64>;
}

#[derive(Debug, SurrealValue)]
struct ContactRow {
    contact_id: String,
    name: String,
    email: String,
    service: String,
    message: String,
    created_at: String,
    seq: i64,
}

impl ContactRow {
    fn into_contact(self) -> Result<Contact, StorageError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StorageError::Corrupt {
                message: format!("created_at '{}': {e}", self.created_at).into(),
                context: Some(format!("Contact {}", self.contact_id).into()),
            })?
            .with_timezone(&Utc);

        Ok(Contact {
            id: self.contact_id,
            name: self.name,
            email: self.email,
            service: self.service,
            message: self.message,
            created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct LatestRow {
    created_at: String,
    seq: i64,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

/// Timestamp of the most recent append.
#[derive(Debug)]
struct WriteClock {
    last_created_at: Option<DateTime<Utc>>,
}

impl WriteClock {
    /// Current time, never earlier than the previous record.
    fn stamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.last_created_at.map_or(now, |last| now.max(last))
    }
}

/// [`ContactRepository`] backed by the `contact` table.
///
/// The insertion sequence is assigned by the database inside the `CREATE` transaction, so
/// rows written by another process (or a write whose reply was lost) never block later ones.
/// Local writers are serialized through the clock lock.
#[derive(Debug)]
pub struct SurrealContactStore {
    db: Database,
    clock: Mutex<WriteClock>,
}

impl SurrealContactStore {
    /// Opens the store and resumes after the last stored record.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the table cannot be read.
    pub async fn new(db: Database) -> Result<Self, StorageError> {
        let query = format!("SELECT created_at, seq FROM {CONTACT} ORDER BY seq DESC LIMIT 1");
        let latest = db
            .query(&query)
            .await
            .context("Loading latest contact")?
            .take::<Vec<LatestRow>>(0)
            .context("Parsing latest contact")?
            .into_iter()
            .next();

        debug!(last_seq = latest.as_ref().map_or(0, |row| row.seq), "Contact store ready");

        let last_created_at = latest
            .and_then(|row| DateTime::parse_from_rfc3339(&row.created_at).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Self { db, clock: Mutex::new(WriteClock { last_created_at }) })
    }

    async fn insert(&self, payload: NewContact) -> Result<Contact, StorageError> {
        let mut clock = self.clock.lock().await;

        let id = safe_nanoid!(CONTACT_ID_LEN);
        let created_at = clock.stamp();

        let query = format!(
            "BEGIN TRANSACTION;
            LET $last = (SELECT VALUE seq FROM {CONTACT} ORDER BY seq DESC LIMIT 1)[0];
            CREATE {CONTACT} CONTENT {{
                contact_id: $contact_id,
                name: $name,
                email: $email,
                service: $service,
                message: $message,
                created_at: $created_at,
                seq: ($last ?? 0) + 1
            }} RETURN NONE;
            COMMIT TRANSACTION;"
        );

        self.db
            .query(&query)
            .bind(("contact_id", id.clone()))
            .bind(("name", payload.name.clone()))
            .bind(("email", payload.email.clone()))
            .bind(("service", payload.service.clone()))
            .bind(("message", payload.message.clone()))
            .bind(("created_at", created_at.to_rfc3339_opts(SecondsFormat::Nanos, true)))
            .await
            .context("Creating contact")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Contact rejected")?;

        clock.last_created_at = Some(created_at);

        Ok(payload.into_contact(id, created_at))
    }

    async fn select_all(&self) -> Result<Vec<Contact>, StorageError> {
        let query = format!(
            "SELECT contact_id, name, email, service, message, created_at, seq
            FROM {CONTACT} ORDER BY seq ASC"
        );

        self.db
            .query(&query)
            .await
            .context("Listing contacts")?
            .take::<Vec<ContactRow>>(0)
            .context("Parsing contacts")?
            .into_iter()
            .map(ContactRow::into_contact)
            .collect()
    }

    async fn select_count(&self) -> Result<u64, StorageError> {
        let query = format!("SELECT count() AS total FROM {CONTACT} GROUP ALL");

        let total = self
            .db
            .query(&query)
            .await
            .context("Counting contacts")?
            .take::<Vec<CountRow>>(0)
            .context("Parsing contact count")?
            .into_iter()
            .next()
            .map_or(0, |row| row.total);

        u64::try_from(total).map_err(|_| StorageError::Corrupt {
            message: format!("negative count {total}").into(),
            context: None,
        })
    }
}

impl ContactRepository for SurrealContactStore {
    fn create(&self, payload: NewContact) -> StoreFuture<'_, Contact> {
        Box::pin(self.insert(payload))
    }

    fn list(&self) -> StoreFuture<'_, Vec<Contact>> {
        Box::pin(self.select_all())
    }

    fn count(&self) -> StoreFuture<'_, u64> {
        Box::pin(self.select_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn stamp_never_goes_backwards() {
        let future = Utc::now() + TimeDelta::hours(1);
        let clock = WriteClock { last_created_at: Some(future) };
        assert_eq!(clock.stamp(), future);
    }

    #[test]
    fn stamp_uses_clock_when_ahead() {
        let past = Utc::now() - TimeDelta::hours(1);
        let clock = WriteClock { last_created_at: Some(past) };
        assert!(clock.stamp() > past);
    }

    #[test]
    fn corrupt_timestamp_is_reported() {
        let row = ContactRow {
            contact_id: "x".into(),
            name: "n".into(),
            email: "e@x.io".into(),
            service: "s".into(),
            message: "m".into(),
            created_at: "yesterday".into(),
            seq: 1,
        };
        assert!(matches!(row.into_contact(), Err(StorageError::Corrupt { .. })));
    }
}
