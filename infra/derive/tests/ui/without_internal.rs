use phonebook_derive::phonebook_error;
use std::borrow::Cow;

#[phonebook_error]
#[derive(Debug)]
pub enum ParseError {
    #[error("Bad digits{}: {source}", format_context(.context))]
    Digits { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u64, ParseError> {
    Ok(raw.parse::<u64>()?)
}

fn main() {
    assert_eq!(parse("42").unwrap(), 42);
    assert!(matches!(parse("x"), Err(ParseError::Digits { context: None, .. })));
}
