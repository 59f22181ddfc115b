//! Wire types of the Control API.
//!
//! Field names follow the API's camelCase JSON. Rules carry their target
//! variant as a `ruleType` discriminant next to a nested `target` object;
//! [`RuleTarget`] folds both into one enum.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An integration rule as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Server-assigned rule ID.
    pub id: String,
    /// Owning application.
    pub app_id: String,
    /// "enabled" or "disabled".
    #[serde(default)]
    pub status: String,
    /// "single" or "batch"; absent for ingress rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_mode: Option<String>,
    /// Channel source; absent for ingress rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RuleSource>,
    /// Target variant and its payload.
    #[serde(flatten)]
    pub target: RuleTarget,
}

/// Body of a rule create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RuleSource>,
    #[serde(flatten)]
    pub target: RuleTarget,
}

/// Which channel events feed a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSource {
    #[serde(default)]
    pub channel_filter: String,
    /// e.g. "channel.message", "channel.presence".
    #[serde(rename = "type")]
    pub source_type: String,
}

/// A rule target.
///
/// Unknown `ruleType` values are kept as [`RuleTarget::Unrecognized`] so a
/// rule created by a newer client still decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTarget", into = "RawTarget")]
pub enum RuleTarget {
    Http(HttpTarget),
    Amqp(AmqpTarget),
    IngressMongo(MongoTarget),
    IngressPostgresOutbox(PostgresOutboxTarget),
    Unrecognized { rule_type: String, target: Value },
}

impl RuleTarget {
    pub const HTTP: &'static str = "http";
    pub const AMQP: &'static str = "amqp";
    pub const INGRESS_MONGO: &'static str = "ingress/mongodb";
    pub const INGRESS_POSTGRES_OUTBOX: &'static str = "ingress-postgres-outbox";

    /// The `ruleType` discriminant of this target.
    pub fn rule_type(&self) -> &str {
        match self {
            Self::Http(_) => Self::HTTP,
            Self::Amqp(_) => Self::AMQP,
            Self::IngressMongo(_) => Self::INGRESS_MONGO,
            Self::IngressPostgresOutbox(_) => Self::INGRESS_POSTGRES_OUTBOX,
            Self::Unrecognized { rule_type, .. } => rule_type,
        }
    }
}

/// Wire layout of a target: discriminant plus untyped payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTarget {
    #[serde(rename = "ruleType")]
    rule_type: String,
    #[serde(default)]
    target: Value,
}

impl TryFrom<RawTarget> for RuleTarget {
    type Error = serde_json::Error;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        Ok(match raw.rule_type.as_str() {
            Self::HTTP => Self::Http(serde_json::from_value(raw.target)?),
            Self::AMQP => Self::Amqp(serde_json::from_value(raw.target)?),
            Self::INGRESS_MONGO => Self::IngressMongo(serde_json::from_value(raw.target)?),
            Self::INGRESS_POSTGRES_OUTBOX => {
                Self::IngressPostgresOutbox(serde_json::from_value(raw.target)?)
            }
            _ => Self::Unrecognized {
                rule_type: raw.rule_type,
                target: raw.target,
            },
        })
    }
}

impl From<RuleTarget> for RawTarget {
    fn from(target: RuleTarget) -> Self {
        let rule_type = target.rule_type().to_string();
        // Plain structs of strings and bools always serialize
        let target = match target {
            RuleTarget::Http(t) => serde_json::to_value(t),
            RuleTarget::Amqp(t) => serde_json::to_value(t),
            RuleTarget::IngressMongo(t) => serde_json::to_value(t),
            RuleTarget::IngressPostgresOutbox(t) => serde_json::to_value(t),
            RuleTarget::Unrecognized { target, .. } => Ok(target),
        }
        .unwrap_or_default();
        Self { rule_type, target }
    }
}

/// An HTTP header sent with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Webhook target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTarget {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enveloped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Ably Queue target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmqpTarget {
    pub queue_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enveloped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// MongoDB change-stream ingress source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoTarget {
    pub url: String,
    pub database: String,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_document_before_change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_site: Option<String>,
}

/// Postgres outbox-table ingress source.
///
/// The API never returns `sslRootCert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostgresOutboxTarget {
    pub url: String,
    pub outbox_table_schema: String,
    pub outbox_table_name: String,
    pub nodes_table_schema: String,
    pub nodes_table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_root_cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_site: Option<String>,
}

/// A channel namespace.
///
/// The namespace name doubles as its ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub id: String,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub persisted: bool,
    #[serde(default)]
    pub persist_last: bool,
    #[serde(default)]
    pub push_enabled: bool,
    #[serde(default)]
    pub tls_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_timeserial: Option<bool>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub href: Option<String>,
}
