use super::{PersonStore, StoreError};
use crate::model::{ApprovedPerson, Field, Person, PersonId};
use async_trait::async_trait;
use phonebook_database::{Database, Migration};
use serde::Deserialize;
use std::borrow::Cow;
use tracing::instrument;

/// Schema of the `person` table: field formats and uniqueness are enforced by the engine.
pub const MIGRATION: Migration = Migration::new(
    "persons",
    "0001",
    r"
    DEFINE TABLE IF NOT EXISTS person SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS name ON person TYPE string
        ASSERT string::trim($value) != '' AND $value = /^[\p{Alphabetic}\s]+$/;
    DEFINE FIELD IF NOT EXISTS number ON person TYPE string
        ASSERT $value = /^[0-9]{10}$/;
    DEFINE INDEX IF NOT EXISTS person_name ON person FIELDS name UNIQUE;
    DEFINE INDEX IF NOT EXISTS person_number ON person FIELDS number UNIQUE;
    DEFINE TABLE IF NOT EXISTS sequence SCHEMALESS;
    ",
);

const PROJECTION: &str = "record::id(id) AS id, name, number";

/// Row shape returned by every read; the record id is flattened to its numeric key.
#[derive(Debug, Deserialize)]
struct Row {
    id: u64,
    name: String,
    number: String,
}

impl TryFrom<Row> for Person {
    type Error = StoreError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let id = PersonId::new(row.id)
            .ok_or_else(|| StoreError::from(format!("Invalid stored person id {}", row.id)))?;
        Ok(Self { id, name: row.name, number: row.number })
    }
}

fn into_person(row: Option<Row>) -> Result<Option<Person>, StoreError> {
    row.map(Person::try_from).transpose()
}

/// Maps an engine error onto the store taxonomy.
///
/// Remote engines only surface rendered messages, so the mapping works on the text
/// of the index and field names declared in [`MIGRATION`].
fn classify(err: surrealdb::Error, context: &'static str) -> StoreError {
    let message = err.to_string();
    let context = Some(Cow::Borrowed(context));

    if message.contains("already contains") {
        if message.contains("person_name") {
            return StoreError::Conflict { field: Field::Name, context };
        }
        if message.contains("person_number") {
            return StoreError::Conflict { field: Field::Number, context };
        }
    }

    let fields: Vec<Field> = [Field::Name, Field::Number]
        .into_iter()
        .filter(|field| message.contains(&format!("field `{field}`")))
        .collect();
    if !fields.is_empty() {
        return StoreError::Validation { fields, context };
    }

    StoreError::Database { source: err, context }
}

/// `SurrealDB`-backed store over the `person` table.
#[derive(Debug, Clone)]
pub struct SurrealPersonStore {
    db: Database,
}

impl SurrealPersonStore {
    /// Wraps a connection on which [`MIGRATION`] has been applied.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    async fn next_id(&self) -> Result<PersonId, StoreError> {
        let seq = self
            .db
            .query("UPSERT ONLY sequence:person SET seq = (seq OR 0) + 1 RETURN VALUE seq")
            .await
            .map_err(|e| classify(e, "Advancing person sequence"))?
            .take::<Option<u64>>(0)
            .map_err(|e| classify(e, "Reading person sequence"))?;

        seq.and_then(PersonId::new).ok_or_else(|| "Person sequence returned no value".into())
    }

    async fn find_by(
        &self,
        field: Field,
        value: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        let exclusion = if excluding.is_some() { " AND record::id(id) != $exclude" } else { "" };
        let query = format!(
            "SELECT {PROJECTION} FROM person WHERE {field} = $value{exclusion} LIMIT 1",
            field = field.as_str(),
        );

        let row = self
            .db
            .query(query)
            .bind(("value", value.to_owned()))
            .bind(("exclude", excluding.map(PersonId::get)))
            .await
            .map_err(|e| classify(e, "Looking up person"))?
            .take::<Option<Row>>(0)
            .map_err(|e| classify(e, "Parsing person"))?;

        into_person(row)
    }
}

#[async_trait]
impl PersonStore for SurrealPersonStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Person>, StoreError> {
        self.db
            .query(format!("SELECT {PROJECTION} FROM person ORDER BY id"))
            .await
            .map_err(|e| classify(e, "Listing persons"))?
            .take::<Vec<Row>>(0)
            .map_err(|e| classify(e, "Parsing persons"))?
            .into_iter()
            .map(Person::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        let row = self
            .db
            .query(format!("SELECT {PROJECTION} FROM ONLY type::thing('person', $id)"))
            .bind(("id", id.get()))
            .await
            .map_err(|e| classify(e, "Loading person"))?
            .take::<Option<Row>>(0)
            .map_err(|e| classify(e, "Parsing person"))?;

        into_person(row)
    }

    async fn find_by_name(
        &self,
        name: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        self.find_by(Field::Name, name, excluding).await
    }

    async fn find_by_number(
        &self,
        number: &str,
        excluding: Option<PersonId>,
    ) -> Result<Option<Person>, StoreError> {
        self.find_by(Field::Number, number, excluding).await
    }

    #[instrument(skip_all)]
    async fn insert(&self, person: &ApprovedPerson) -> Result<Person, StoreError> {
        let id = self.next_id().await?;

        let mut response = self
            .db
            .query(
                "CREATE type::thing('person', $id) CONTENT { name: $name, number: $number } RETURN NONE",
            )
            .query(format!("SELECT {PROJECTION} FROM ONLY type::thing('person', $id)"))
            .bind(("id", id.get()))
            .bind(("name", person.name().to_owned()))
            .bind(("number", person.number().to_owned()))
            .await
            .map_err(|e| classify(e, "Inserting person"))?
            .check()
            .map_err(|e| classify(e, "Inserting person"))?;

        let row = response.take::<Option<Row>>(1).map_err(|e| classify(e, "Parsing person"))?;
        into_person(row)?.ok_or_else(|| "Inserted person could not be read back".into())
    }

    #[instrument(skip(self, person))]
    async fn update(
        &self,
        id: PersonId,
        person: &ApprovedPerson,
    ) -> Result<Option<Person>, StoreError> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        let mut response = self
            .db
            .query(
                "UPDATE type::thing('person', $id) MERGE { name: $name, number: $number } RETURN NONE",
            )
            .query(format!("SELECT {PROJECTION} FROM ONLY type::thing('person', $id)"))
            .bind(("id", id.get()))
            .bind(("name", person.name().to_owned()))
            .bind(("number", person.number().to_owned()))
            .await
            .map_err(|e| classify(e, "Updating person"))?
            .check()
            .map_err(|e| classify(e, "Updating person"))?;

        let row = response.take::<Option<Row>>(1).map_err(|e| classify(e, "Parsing person"))?;
        into_person(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        self.db
            .query("DELETE type::thing('person', $id) RETURN NONE")
            .bind(("id", id.get()))
            .await
            .map_err(|e| classify(e, "Deleting person"))?
            .check()
            .map_err(|e| classify(e, "Deleting person"))?;

        Ok(Some(existing))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count = self
            .db
            .query("RETURN array::len(SELECT VALUE id FROM person)")
            .await
            .map_err(|e| classify(e, "Counting persons"))?
            .take::<Option<usize>>(0)
            .map_err(|e| classify(e, "Parsing person count"))?;

        Ok(count.unwrap_or_default())
    }
}
