//! Names shared between the apps, the HTTP layer and the `OpenAPI` document.

/// `OpenAPI` tag for the phonebook endpoints.
pub const PERSONS_TAG: &str = "Persons";
/// `OpenAPI` tag for infrastructure endpoints (health, greeting).
pub const SYSTEM_TAG: &str = "System";

/// `database.url` value selecting process-local storage instead of `SurrealDB`.
pub const IN_PROCESS_STORE: &str = "memory";

/// Listener port used when neither the config file nor `PORT` provide one.
pub const DEFAULT_PORT: u16 = 3001;
