//! Persons feature slice: the phonebook records, their admission gate and the error taxonomy
//! the HTTP layer answers with.

pub mod error;
pub mod gate;
pub mod model;
pub mod service;
pub mod store;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod router;

pub use error::{ErrorBody, PersonsError, RejectionKind};
pub use model::{ApprovedPerson, Candidate, Field, Person, PersonId, PersonPayload};
#[cfg(feature = "server")]
pub use router::persons_router;
pub use service::PersonService;
pub use store::{MIGRATION, MemoryPersonStore, PersonStore, StoreError, SurrealPersonStore};

use phonebook_database::{Database, DatabaseError};
use phonebook_kernel::domain::config::DatabaseConfig;
use phonebook_kernel::domain::constants::IN_PROCESS_STORE;
use phonebook_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;

/// Name the slice is registered under.
pub const SLICE_NAME: &str = "persons";

#[derive(Debug)]
pub struct PersonsInner {
    pub service: PersonService,
}

/// Persons feature state
#[derive(Debug, Clone)]
pub struct Persons {
    inner: Arc<PersonsInner>,
}

impl Persons {
    #[must_use]
    pub fn new(service: PersonService) -> Self {
        Self { inner: Arc::new(PersonsInner { service }) }
    }
}

impl Deref for Persons {
    type Target = PersonsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Persons {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Opens the storage `cfg` names, applying the persons schema on `SurrealDB`.
///
/// [`IN_PROCESS_STORE`] skips the database entirely; the returned handle is then `None`.
///
/// # Errors
/// Any [`DatabaseError`] raised while connecting or migrating.
pub async fn connect(cfg: &DatabaseConfig) -> Result<(PersonService, Option<Database>), DatabaseError> {
    if cfg.url == IN_PROCESS_STORE {
        tracing::info!("Persons kept in process memory");
        return Ok((PersonService::new(MemoryPersonStore::new()), None));
    }

    let db = Database::builder().config(cfg).migration(MIGRATION).init().await?;
    tracing::info!(engine = %db.engine(), namespace = db.namespace(), "Persons kept in SurrealDB");
    Ok((PersonService::new(SurrealPersonStore::new(db.clone())), Some(db)))
}

/// Registers the persons slice around `service`.
#[must_use]
pub fn init(service: PersonService) -> InitializedSlice {
    InitializedSlice::new(SLICE_NAME, Persons::new(service))
}
