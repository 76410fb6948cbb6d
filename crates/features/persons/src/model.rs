use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use utoipa::ToSchema;

/// Storage-assigned identifier of a [`Person`], rendered as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(into = "String", try_from = "String")]
#[schema(value_type = String, example = "1")]
pub struct PersonId(NonZeroU64);

impl PersonId {
    /// Builds an id from its numeric value; `0` is not a valid id.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// Error returned when a path segment is not a canonical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPersonId(pub String);

impl fmt::Display for InvalidPersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid person id `{}`", self.0)
    }
}

impl std::error::Error for InvalidPersonId {}

impl FromStr for PersonId {
    type Err = InvalidPersonId;

    /// Accepts canonical decimal ids only: ASCII digits, no sign, no leading zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPersonId(s.to_owned()));
        }
        s.parse::<u64>().ok().and_then(Self::new).ok_or_else(|| InvalidPersonId(s.to_owned()))
    }
}

impl TryFrom<String> for PersonId {
    type Error = InvalidPersonId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonId> for String {
    fn from(id: PersonId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phonebook entry as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    pub id: PersonId,
    /// Letters and whitespace only
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Exactly ten digits
    #[schema(example = "3944532352")]
    pub number: String,
}

/// Request body of create and update. Both fields are required; absence is
/// reported by the gate rather than by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonPayload {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(example = "3944532352")]
    pub number: Option<String>,
}

impl PersonPayload {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self { name: Some(name.into()), number: Some(number.into()) }
    }
}

/// A validated record field, named the way clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Number,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload whose fields are present and well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    name: String,
    number: String,
}

impl Candidate {
    pub(crate) const fn new(name: String, number: String) -> Self {
        Self { name, number }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }
}

/// A candidate that also passed the uniqueness check and may be written.
///
/// Only the gate constructs it, so every store write has been through admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedPerson(Candidate);

impl ApprovedPerson {
    pub(crate) const fn new(candidate: Candidate) -> Self {
        Self(candidate)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.0.name()
    }

    #[must_use]
    pub fn number(&self) -> &str {
        self.0.number()
    }

    /// Attaches an id, producing the stored representation.
    #[must_use]
    pub fn with_id(&self, id: PersonId) -> Person {
        Person { id, name: self.0.name.clone(), number: self.0.number.clone() }
    }
}
