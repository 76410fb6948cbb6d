use std::borrow::Cow;

/// Failures while opening a phonebook storage session.
#[phonebook_derive::phonebook_error]
pub enum DatabaseError {
    /// A connection setting (url, namespace or database) was never supplied.
    #[error("Missing database setting `{setting}`")]
    MissingSetting { setting: &'static str },

    /// The engine could not be started or never answered its health check.
    #[error("Database unreachable{}: {message}", format_context(.context))]
    Unreachable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Root sign-in was refused.
    #[error("Database sign-in rejected{}: {message}", format_context(.context))]
    SignIn { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A schema script failed; `migration` is its `slice:version` label.
    #[error("Migration {migration} failed: {message}")]
    Migration { migration: String, message: Cow<'static, str> },

    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
