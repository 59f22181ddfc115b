//! Ably resource kinds
//!
//! Each kind implements [`lifecycle::ResourceKind`] against the Control
//! API. Kinds that carry a polymorphic target are generic over the target
//! variant, so the variant is fixed per kind and never guessed from host
//! input.

pub mod ingress_rule;
pub mod namespace;
pub mod rule;
pub mod target;

use control::ControlApi;
use lifecycle::{ApiError, Error, ResourceKey, Result};

pub use ingress_rule::{IngressRule, IngressRuleKind, MongoRuleKind, PostgresOutboxRuleKind};
pub use namespace::{Namespace, NamespaceKind};
pub use rule::{AmqpRuleKind, HttpRuleKind, Rule, RuleKind};

/// Client type shared by every kind
pub type Client = Box<dyn ControlApi>;

/// Classify a Control API error for the lifecycle driver
pub(crate) fn api_error(err: control::Error) -> ApiError {
    if err.is_not_found() {
        ApiError::not_found(err.to_string())
    } else {
        ApiError::other(err.to_string())
    }
}

/// Lookup key of a server-identified resource
pub(crate) fn rule_key(app_id: &str, id: Option<&str>) -> Result<ResourceKey> {
    match id {
        Some(id) if !id.is_empty() => Ok(ResourceKey::new(app_id, id)),
        _ => Err(Error::decode("state", "rule id is not known yet")),
    }
}

/// Status as echoed by the API, or the declared one when the API omits it
pub(crate) fn echoed_status(status: String, fallback: Option<&String>) -> Option<String> {
    if status.is_empty() {
        fallback.cloned()
    } else {
        Some(status)
    }
}
