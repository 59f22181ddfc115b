//! # Lifecycle
//!
//! A generic engine for driving resource lifecycles against a remote API.
//!
//! This crate sits between a host that owns declared configuration ("plan")
//! and persisted values ("state"), and an API client that owns the remote
//! objects. It decodes host data, translates it to and from the API's wire
//! structures, runs the operation, and hands reconciled state back.
//!
//! ## Core Concepts
//!
//! - **ResourceKind**: capability interface implemented once per kind
//!   (decode, translate, call the API)
//! - **Host**: supplies plan/state snapshots and persists new state
//! - **ProviderState / Handle**: explicit provider configuration passed into
//!   every operation
//! - **Driver**: `create`, `read`, `update`, `delete`, `import` written once
//!   for every kind
//! - **Schema**: attribute schemas composed from shared fragments
//!
//! ## Example
//!
//! ```ignore
//! use lifecycle::{driver, Handle, MemoryHost, ProviderState};
//!
//! let provider = ProviderState::Configured(client);
//! let kind = NamespaceKind;
//! let handle = Handle::new(kind.name(), &provider);
//!
//! let mut host = MemoryHost::new().with_plan(plan_json);
//! let response = driver::create(&kind, &handle, &mut host);
//! assert!(!response.has_error());
//! ```
//!
//! ## Error Handling
//!
//! API errors are classified by the caller as [`ApiError::NotFound`] or
//! [`ApiError::Other`]. A read of a missing resource removes it from state;
//! a delete of a missing resource only warns. Everything else surfaces as
//! an error diagnostic naming the resource kind. Nothing is retried.

pub mod context;
pub mod driver;
pub mod error;
pub mod import;
pub mod resource;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use context::{Handle, Host, MemoryHost, ProviderState};
pub use error::{ApiError, Error, ErrorCategory, Result};
pub use import::{IMPORT_SEPARATOR, parse_import_id};
pub use resource::{ResourceKind, decode_value, encode_value, find_by_id};
pub use schema::{
    Attribute, AttributeType, Attributes, PlanModifier, Presence, Schema, SchemaBuilder, compose,
    compose_builder,
};
pub use types::{
    Diagnostic, Diagnostics, Operation, OperationResponse, OperationState, ResourceKey, Severity,
};
