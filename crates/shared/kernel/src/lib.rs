//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it owns config loading and, behind the `server` feature,
//! the shared Axum state, the system routes and the JSON fallback.
//!
//! ## Config loading
//! ```rust,no_run
//! use phonebook_kernel::config::load_config;
//! use phonebook_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("phonebook")).unwrap_or_default();
//! assert!(cfg.server.port > 0);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use phonebook_domain as domain;
