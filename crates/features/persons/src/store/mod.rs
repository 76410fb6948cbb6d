//! Storage collaborator of the persons slice.

mod memory;
mod surreal;

pub use memory::MemoryPersonStore;
pub use surreal::{MIGRATION, SurrealPersonStore};

use crate::model::{ApprovedPerson, Field, Person, PersonId};
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt::Debug;

#[phonebook_derive::phonebook_error]
pub enum StoreError {
    #[error("Unique constraint violated on `{field}`{}", format_context(.context))]
    Conflict { field: Field, context: Option<Cow<'static, str>> },
    #[error("Field validation failed for {fields:?}{}", format_context(.context))]
    Validation { fields: Vec<Field>, context: Option<Cow<'static, str>> },
    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },
    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Persistence operations the persons slice relies on.
///
/// Implementations must enforce `name` and `number` uniqueness themselves at write
/// time, reporting a violation as [`StoreError::Conflict`].
#[async_trait]
pub trait PersonStore: Debug + Send + Sync {
    /// All records, ascending by id.
    async fn list(&self) -> Result<Vec<Person>, StoreError>;

    async fn get(&self, id: PersonId) -> Result<Option<Person>, StoreError>;

    /// Record holding exactly `name`, ignoring `excluding`.
    async fn find_by_name(
        &self,
        name: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError>;

    /// Record holding exactly `number`, ignoring `excluding`.
    async fn find_by_number(
        &self,
        number: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError>;

    /// Stores a new record under a freshly assigned id.
    async fn insert(&self, person: &ApprovedPerson) -> Result<Person, StoreError>;

    /// Replaces name and number of `id`; `None` if there is no such record.
    async fn update(
        &self,
        id: PersonId,
        person: &ApprovedPerson,
    ) -> Result<Option<Person>, StoreError>;

    /// Removes `id`, returning the removed record if there was one.
    async fn delete(&self, id: PersonId) -> Result<Option<Person>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
