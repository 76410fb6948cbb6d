use phonebook_derive::phonebook_error;
use std::borrow::Cow;

#[phonebook_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Duplicate name {name}")]
    Duplicate { name: String },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    io.context("Reading phonebook file")?;
    Ok(())
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading phonebook file): disk");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");

    let contextual: Result<(), DemoError> = Err(String::from("late").into());
    let err = contextual.context("Saving").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (Saving): late");

    let duplicate: Result<(), DemoError> = Err(DemoError::Duplicate { name: "Ada".to_owned() });
    let err = duplicate.context("ignored").unwrap_err();
    assert_eq!(err.to_string(), "Duplicate name Ada");
}
