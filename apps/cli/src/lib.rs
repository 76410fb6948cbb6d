//! Seed and inspection tool for a phonebook database.
//!
//! Without arguments it prints every record; with `NAME NUMBER` it admits one record
//! through the same gate the HTTP API uses.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use phonebook_kernel::domain::config::DatabaseConfig;
use phonebook_persons::{PersonPayload, PersonService};
use std::io::Write;

pub use phonebook_kernel::domain::constants::IN_PROCESS_STORE;

#[derive(Debug, Parser)]
#[command(name = "phonebook-cli", version, about = "List or add phonebook entries")]
pub struct Cli {
    /// Storage connection string (`mem://`, `ws://host:port`, ...); overrides the config file
    #[arg(long, env = "DATABASE_URL")]
    pub url: Option<String>,

    /// Either nothing, to list all entries, or NAME NUMBER, to add one
    #[arg(value_name = "NAME NUMBER")]
    pub args: Vec<String>,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Add { name: String, number: String },
}

impl Cli {
    /// Resolves the positional arguments.
    ///
    /// # Errors
    /// A usage error for any arity other than zero or two.
    pub fn action(&self) -> Result<Action, clap::Error> {
        match self.args.as_slice() {
            [] => Ok(Action::List),
            [name, number] => Ok(Action::Add { name: name.clone(), number: number.clone() }),
            _ => Err(Self::command().error(
                ErrorKind::WrongNumberOfValues,
                "expected no arguments, or exactly NAME and NUMBER",
            )),
        }
    }
}

/// Opens the storage described by `cfg` with the persons schema applied.
pub async fn connect(cfg: &DatabaseConfig) -> Result<PersonService> {
    let (service, _db) =
        phonebook_persons::connect(cfg).await.context("Failed to open phonebook storage")?;
    Ok(service)
}

/// Performs `action` against `service`, writing the report to `out`.
pub async fn execute(action: Action, service: &PersonService, out: &mut impl Write) -> Result<()> {
    match action {
        Action::List => {
            let persons = service.list().await?;
            writeln!(out, "phonebook:")?;
            for person in persons {
                writeln!(out, "{} {}", person.name, person.number)?;
            }
        },
        Action::Add { name, number } => {
            let person = service.create(&PersonPayload::new(name, number)).await?;
            writeln!(out, "added {} number {} to phonebook", person.name, person.number)?;
        },
    }
    Ok(())
}
