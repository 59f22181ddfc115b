//! # Control
//!
//! A small blocking client for the Ably Control API.
//!
//! Only the endpoints the provider manages are covered: integration and
//! ingress rules, and channel namespaces.
//!
//! ## Example
//!
//! ```no_run
//! use control::{ControlApi, HttpClient};
//!
//! let client = HttpClient::new("account-token");
//! let rule = client.rule("app1", "rule1")?;
//! println!("{} is {}", rule.id, rule.status);
//! # Ok::<(), control::Error>(())
//! ```
//!
//! For tests, [`MockControlApi`] implements the same [`ControlApi`] trait
//! in memory.

pub mod api;
pub mod error;
pub mod http;
pub mod types;

pub use api::{ControlApi, MockControlApi};
pub use error::{Error, ErrorCategory, Result};
pub use http::{DEFAULT_URL, HttpClient};
pub use types::{
    AmqpTarget, ErrorBody, Header, HttpTarget, MongoTarget, Namespace, NewRule,
    PostgresOutboxTarget, Rule, RuleSource, RuleTarget,
};
