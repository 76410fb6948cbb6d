//! Admission gate for person records.
//!
//! Cheap, local format checks run first; only a well-formed candidate is looked up
//! against the store for `name` and `number` collisions.

use crate::error::PersonsError;
use crate::model::{ApprovedPerson, Candidate, Field, PersonId, PersonPayload};
use crate::store::PersonStore;
use tracing::debug;

/// What the candidate is admitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    /// Replacing the record with this id, which is excluded from uniqueness checks.
    Update(PersonId),
}

impl Mode {
    const fn excluding(self) -> Option<PersonId> {
        match self {
            Self::Create => None,
            Self::Update(id) => Some(id),
        }
    }
}

#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}

#[must_use]
pub fn is_valid_number(number: &str) -> bool {
    number.len() == 10 && number.bytes().all(|b| b.is_ascii_digit())
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Checks presence, then the shape of every field.
///
/// Absent or blank fields fail with [`PersonsError::ContentMissing`]; otherwise all
/// malformed fields are reported together in one [`PersonsError::Format`].
pub fn validate_format(payload: &PersonPayload) -> Result<Candidate, PersonsError> {
    let name = present(payload.name.as_ref());
    let number = present(payload.number.as_ref());

    let (Some(name), Some(number)) = (name, number) else {
        let fields = [(Field::Name, name.is_none()), (Field::Number, number.is_none())]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect();
        return Err(PersonsError::ContentMissing { fields });
    };

    let checks = [(Field::Name, is_valid_name(name)), (Field::Number, is_valid_number(number))];
    let fields: Vec<Field> = checks
        .into_iter()
        .filter_map(|(field, valid)| (!valid).then_some(field))
        .collect();
    if !fields.is_empty() {
        return Err(PersonsError::Format { fields });
    }

    Ok(Candidate::new(name.to_owned(), number.to_owned()))
}

/// Rejects a candidate whose name, then number, is already held by another record.
pub async fn check_uniqueness(
    store: &dyn PersonStore,
    candidate: &Candidate,
    excluding: Option<PersonId>,
) -> Result<(), PersonsError> {
    if let Some(holder) = store.find_by_name(candidate.name(), excluding).await? {
        debug!(holder = %holder.id, "Name already taken");
        return Err(PersonsError::DuplicateName { name: candidate.name().to_owned() });
    }

    if let Some(holder) = store.find_by_number(candidate.number(), excluding).await? {
        debug!(holder = %holder.id, "Number already taken");
        return Err(PersonsError::DuplicateNumber { number: candidate.number().to_owned() });
    }

    Ok(())
}

/// Runs the full gate. The store is only read, never written.
pub async fn admit(
    store: &dyn PersonStore,
    payload: &PersonPayload,
    mode: Mode,
) -> Result<ApprovedPerson, PersonsError> {
    let candidate = validate_format(payload)?;
    check_uniqueness(store, &candidate, mode.excluding()).await?;
    Ok(ApprovedPerson::new(candidate))
}
