use super::{PersonStore, StoreError};
use crate::model::{ApprovedPerson, Field, Person, PersonId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Person>,
    last_id: u64,
}

impl Table {
    fn conflict(&self, person: &ApprovedPerson, excluding: Option<PersonId>) -> Option<Field> {
        let others = || self.rows.iter().filter(move |p| Some(p.id) != excluding);
        if others().any(|p| p.name == person.name()) {
            Some(Field::Name)
        } else if others().any(|p| p.number == person.number()) {
            Some(Field::Number)
        } else {
            None
        }
    }

    fn position(&self, id: PersonId) -> Option<usize> {
        self.rows.iter().position(|p| p.id == id)
    }
}

/// Process-local store. Rows stay in insertion order, which is also id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersonStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryPersonStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn list(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.table.read().rows.clone())
    }

    async fn get(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        Ok(self.table.read().rows.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        let table = self.table.read();
        Ok(table.rows.iter().find(|p| p.name == name && Some(p.id) != excluding).cloned())
    }

    async fn find_by_number(
        &self,
        number: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        let table = self.table.read();
        Ok(table.rows.iter().find(|p| p.number == number && Some(p.id) != excluding).cloned())
    }

    async fn insert(&self, person: &ApprovedPerson) -> Result<Person, StoreError> {
        let mut table = self.table.write();
        if let Some(field) = table.conflict(person, None) {
            return Err(StoreError::Conflict { field, context: Some("Inserting person".into()) });
        }

        let id = table
            .last_id
            .checked_add(1)
            .and_then(PersonId::new)
            .ok_or("Person id sequence exhausted")?;
        table.last_id = id.get();

        let stored = person.with_id(id);
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: PersonId,
        person: &ApprovedPerson,
    ) -> Result<Option<Person>, StoreError> {
        let mut table = self.table.write();
        let Some(index) = table.position(id) else {
            return Ok(None);
        };
        if let Some(field) = table.conflict(person, Some(id)) {
            return Err(StoreError::Conflict { field, context: Some("Updating person".into()) });
        }

        let stored = person.with_id(id);
        table.rows[index] = stored.clone();
        Ok(Some(stored))
    }

    async fn delete(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        let mut table = self.table.write();
        Ok(table.position(id).map(|index| table.rows.remove(index)))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.read().rows.len())
    }
}
