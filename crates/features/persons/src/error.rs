//! Rejection taxonomy of the persons API.
//!
//! Every failure of the slice is a [`PersonsError`]; [`PersonsError::kind`] maps it
//! onto the closed [`RejectionKind`] set, which alone decides status and payload.

use crate::model::{Field, PersonId};
use crate::store::StoreError;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use utoipa::ToSchema;

#[phonebook_derive::phonebook_error]
pub enum PersonsError {
    #[error("Content missing: {fields:?}")]
    ContentMissing { fields: Vec<Field> },
    #[error("Format validation failed: {fields:?}")]
    Format { fields: Vec<Field> },
    #[error("Name `{name}` is already taken")]
    DuplicateName { name: String },
    #[error("Number `{number}` is already taken")]
    DuplicateNumber { number: String },
    #[error("Malformed person id `{raw}`")]
    MalformedId { raw: String },
    #[error("Person {id} not found")]
    NotFound { id: PersonId },
    #[error("Person {id} already deleted")]
    AlreadyDeleted { id: PersonId },
    #[error("Storage error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// The fixed set of response shapes a failure can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    ContentMissing,
    DuplicateName,
    DuplicateNumber,
    MalformedIdentifier,
    FormatValidationFailed,
    NotFound,
    AlreadyDeleted,
    Unclassified,
}

impl RejectionKind {
    /// HTTP status code of the response.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Unclassified => 500,
            Self::ContentMissing
            | Self::DuplicateName
            | Self::DuplicateNumber
            | Self::MalformedIdentifier
            | Self::FormatValidationFailed
            | Self::NotFound
            | Self::AlreadyDeleted => 400,
        }
    }

    /// Value of the `error` key in the response body.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ContentMissing => "content missing",
            Self::DuplicateName => "name must be unique",
            Self::DuplicateNumber => "duplicate phone number",
            Self::MalformedIdentifier => "malformatted id",
            Self::FormatValidationFailed => "format validation error",
            Self::NotFound | Self::AlreadyDeleted => "person not found",
            Self::Unclassified => "Something went wrong",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl PersonsError {
    /// Classifies the error. Store conflicts and field validation failures are
    /// reported exactly like their gate counterparts.
    #[must_use]
    pub const fn kind(&self) -> RejectionKind {
        match self {
            Self::ContentMissing { .. } => RejectionKind::ContentMissing,
            Self::Format { .. } | Self::Store { source: StoreError::Validation { .. }, .. } => {
                RejectionKind::FormatValidationFailed
            },
            Self::DuplicateName { .. }
            | Self::Store { source: StoreError::Conflict { field: Field::Name, .. }, .. } => {
                RejectionKind::DuplicateName
            },
            Self::DuplicateNumber { .. }
            | Self::Store { source: StoreError::Conflict { field: Field::Number, .. }, .. } => {
                RejectionKind::DuplicateNumber
            },
            Self::MalformedId { .. } => RejectionKind::MalformedIdentifier,
            Self::NotFound { .. } => RejectionKind::NotFound,
            Self::AlreadyDeleted { .. } => RejectionKind::AlreadyDeleted,
            Self::Store {
                source: StoreError::Database { .. } | StoreError::Internal { .. }, ..
            }
            | Self::Internal { .. } => RejectionKind::Unclassified,
        }
    }

    /// Offending fields reported alongside a format rejection.
    #[must_use]
    pub fn invalid_fields(&self) -> Option<&[Field]> {
        match self {
            Self::Format { fields }
            | Self::Store { source: StoreError::Validation { fields, .. }, .. } => {
                Some(fields.as_slice())
            },
            _ => None,
        }
    }

    /// Renders the error and all its sources, outermost first.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

/// JSON body of every API error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "name must be unique")]
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
}

impl From<&PersonsError> for ErrorBody {
    fn from(err: &PersonsError) -> Self {
        Self { error: err.kind().message(), fields: err.invalid_fields().map(<[Field]>::to_vec) }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::{ErrorBody, PersonsError};
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use tracing::{error, warn};

    impl IntoResponse for PersonsError {
        fn into_response(self) -> Response {
            let kind = self.kind();
            let status =
                StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if status.is_server_error() {
                error!(%kind, error = %self.chain(), "Request failed");
            } else {
                warn!(%kind, error = %self, "Request rejected");
            }

            (status, Json(ErrorBody::from(&self))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> PersonId {
        PersonId::new(n).expect("non-zero")
    }

    #[test]
    fn every_variant_maps_to_its_kind() {
        let cases = [
            (PersonsError::ContentMissing { fields: vec![Field::Name] }, RejectionKind::ContentMissing),
            (PersonsError::Format { fields: vec![Field::Number] }, RejectionKind::FormatValidationFailed),
            (PersonsError::DuplicateName { name: "Ada".into() }, RejectionKind::DuplicateName),
            (PersonsError::DuplicateNumber { number: "0123456789".into() }, RejectionKind::DuplicateNumber),
            (PersonsError::MalformedId { raw: "x".into() }, RejectionKind::MalformedIdentifier),
            (PersonsError::NotFound { id: id(1) }, RejectionKind::NotFound),
            (PersonsError::AlreadyDeleted { id: id(1) }, RejectionKind::AlreadyDeleted),
            (PersonsError::from("boom"), RejectionKind::Unclassified),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn store_failures_reuse_gate_kinds() {
        let conflict = PersonsError::from(StoreError::Conflict { field: Field::Number, context: None });
        assert_eq!(conflict.kind(), RejectionKind::DuplicateNumber);

        let conflict = PersonsError::from(StoreError::Conflict { field: Field::Name, context: None });
        assert_eq!(conflict.kind(), RejectionKind::DuplicateName);

        let invalid =
            PersonsError::from(StoreError::Validation { fields: vec![Field::Name], context: None });
        assert_eq!(invalid.kind(), RejectionKind::FormatValidationFailed);
        assert_eq!(invalid.invalid_fields(), Some(&[Field::Name][..]));

        let internal = PersonsError::from(StoreError::from("lock poisoned"));
        assert_eq!(internal.kind(), RejectionKind::Unclassified);
    }

    #[test]
    fn only_unclassified_is_a_server_error() {
        assert_eq!(RejectionKind::Unclassified.status(), 500);
        assert_eq!(RejectionKind::NotFound.status(), 400);
        assert_eq!(RejectionKind::AlreadyDeleted.message(), "person not found");
    }

    #[test]
    fn body_lists_fields_for_format_errors_only() {
        let body = ErrorBody::from(&PersonsError::Format { fields: vec![Field::Name, Field::Number] });
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            serde_json::json!({ "error": "format validation error", "fields": ["name", "number"] })
        );

        let body = ErrorBody::from(&PersonsError::ContentMissing { fields: vec![Field::Name] });
        assert_eq!(serde_json::to_value(&body).expect("json"), serde_json::json!({ "error": "content missing" }));
    }

    #[test]
    fn chain_includes_sources_but_body_does_not() {
        let err = PersonsError::Store {
            source: StoreError::from("disk on fire"),
            context: Some("Listing persons".into()),
        };
        assert!(err.chain().contains("disk on fire"));
        assert_eq!(ErrorBody::from(&err).error, "Something went wrong");
    }
}
