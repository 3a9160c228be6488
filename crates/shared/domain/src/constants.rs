//! String constants shared by slices, routes and storage.

/// `OpenAPI` tag for infrastructure routes (health, docs).
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for the contact form routes.
pub const CONTACTS_TAG: &str = "Contacts";

/// Table holding contact form submissions.
pub const CONTACT: &str = "contact";
/// Table holding applied schema migrations.
pub const MIGRATION: &str = "migration";

/// Prefix for environment variable overrides (`MORINGA__MAIL__PASSWORD`).
pub const ENV_PREFIX: &str = "MORINGA";

/// Display baseline for the "happy clients" counter.
pub const HAPPY_CLIENTS_BASELINE: u64 = 582;
