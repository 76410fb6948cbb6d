use crate::error::{PersonsError, PersonsErrorExt};
use crate::gate::{Mode, admit};
use crate::model::{Person, PersonId, PersonPayload};
use crate::store::PersonStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Use-cases of the persons slice, shared by the HTTP handlers and the CLI.
#[derive(Debug, Clone)]
pub struct PersonService {
    store: Arc<dyn PersonStore>,
}

impl PersonService {
    pub fn new(store: impl PersonStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }

    #[must_use]
    pub fn store(&self) -> &dyn PersonStore {
        self.store.as_ref()
    }

    /// Parses a raw path segment into an id.
    pub fn parse_id(raw: &str) -> Result<PersonId, PersonsError> {
        raw.parse().map_err(|_| PersonsError::MalformedId { raw: raw.to_owned() })
    }

    pub async fn list(&self) -> Result<Vec<Person>, PersonsError> {
        self.store.list().await.context("Listing persons")
    }

    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Person, PersonsError> {
        let id = Self::parse_id(raw_id)?;
        self.store
            .get(id)
            .await
            .context("Loading person")?
            .ok_or(PersonsError::NotFound { id })
    }

    #[instrument(skip_all)]
    pub async fn create(&self, payload: &PersonPayload) -> Result<Person, PersonsError> {
        let approved = admit(self.store(), payload, Mode::Create).await?;
        let person = self.store.insert(&approved).await.context("Inserting person")?;
        info!(id = %person.id, "Person created");
        Ok(person)
    }

    /// Replaces name and number of an existing record. A missing target is reported
    /// before any validation of the payload.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, raw_id: &str, payload: &PersonPayload) -> Result<Person, PersonsError> {
        let id = Self::parse_id(raw_id)?;
        if self.store.get(id).await.context("Loading person")?.is_none() {
            return Err(PersonsError::NotFound { id });
        }

        let approved = admit(self.store(), payload, Mode::Update(id)).await?;
        let person = self
            .store
            .update(id, &approved)
            .await
            .context("Updating person")?
            .ok_or(PersonsError::NotFound { id })?;
        info!(id = %person.id, "Person updated");
        Ok(person)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<Person, PersonsError> {
        let id = Self::parse_id(raw_id)?;
        let person = self
            .store
            .delete(id)
            .await
            .context("Deleting person")?
            .ok_or(PersonsError::AlreadyDeleted { id })?;
        info!(%id, "Person deleted");
        Ok(person)
    }

    pub async fn count(&self) -> Result<usize, PersonsError> {
        self.store.count().await.context("Counting persons")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use crate::store::MemoryPersonStore;

    fn service() -> PersonService {
        PersonService::new(MemoryPersonStore::new())
    }

    #[tokio::test]
    async fn noop_update_is_admitted() {
        let svc = service();
        let ada = svc.create(&PersonPayload::new("Ada", "0123456789")).await.expect("create");
        let same = svc.update("1", &PersonPayload::new("Ada", "0123456789")).await.expect("update");
        assert_eq!(ada, same);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let err = service()
            .update("5", &PersonPayload::new("Ada", "0123456789"))
            .await
            .expect_err("missing");
        assert_eq!(err.kind(), RejectionKind::NotFound);
    }

    #[tokio::test]
    async fn second_delete_reports_already_deleted() {
        let svc = service();
        svc.create(&PersonPayload::new("Ada", "0123456789")).await.expect("create");
        svc.delete("1").await.expect("delete");

        let err = svc.delete("1").await.expect_err("gone");
        assert_eq!(err.kind(), RejectionKind::AlreadyDeleted);
        assert_eq!(svc.get("1").await.expect_err("gone").kind(), RejectionKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_storage() {
        let svc = service();
        for raw in ["abc", "0", "-3"] {
            assert_eq!(svc.get(raw).await.expect_err(raw).kind(), RejectionKind::MalformedIdentifier);
        }
    }

    #[tokio::test]
    async fn duplicate_number_is_detected_after_name() {
        let svc = service();
        svc.create(&PersonPayload::new("Ada", "0123456789")).await.expect("create");
        svc.create(&PersonPayload::new("Bob", "1111111111")).await.expect("create");

        let both = svc.create(&PersonPayload::new("Ada", "1111111111")).await.expect_err("dup");
        assert_eq!(both.kind(), RejectionKind::DuplicateName);

        let number = svc.create(&PersonPayload::new("Cy", "0123456789")).await.expect_err("dup");
        assert_eq!(number.kind(), RejectionKind::DuplicateNumber);
        assert_eq!(svc.count().await.expect("count"), 2);
    }
}
