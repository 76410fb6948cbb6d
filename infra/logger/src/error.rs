use std::borrow::Cow;

/// Reasons the global subscriber could not be installed.
#[phonebook_derive::phonebook_error]
pub enum LoggerError {
    /// The log directory could not be created.
    #[error("Log directory error{}: {source}", format_context(.context))]
    Directory { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rolling file appender error{}: {source}", format_context(.context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// Another subscriber already owns this process.
    #[error("Subscriber already installed{}: {source}", format_context(.context))]
    AlreadyInstalled {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// A level, filter or output combination that cannot work.
    #[error("Invalid logging setting: {message}")]
    Setting { message: Cow<'static, str> },
}
