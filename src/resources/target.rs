//! Target union codec
//!
//! Host-side target models and their field-for-field mapping to the
//! Control API's [`control::RuleTarget`]. Each family is a closed enum:
//! a wire variant outside the family is an error, never silently dropped.

use control::RuleTarget;
use lifecycle::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Ingress family
// ============================================================================

/// MongoDB change-stream source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Postgres outbox-table source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresOutboxTarget {
    pub url: String,
    pub outbox_table_schema: String,
    pub outbox_table_name: String,
    pub nodes_table_schema: String,
    pub nodes_table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,
    /// Write-only: the API never returns it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_root_cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_site: Option<String>,
}

/// Target of an ingress rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IngressTarget {
    Mongo(MongoTarget),
    PostgresOutbox(PostgresOutboxTarget),
}

impl IngressTarget {
    /// Wire discriminant of this variant
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::Mongo(_) => RuleTarget::INGRESS_MONGO,
            Self::PostgresOutbox(_) => RuleTarget::INGRESS_POSTGRES_OUTBOX,
        }
    }

    pub fn encode(&self) -> RuleTarget {
        match self {
            Self::Mongo(t) => RuleTarget::IngressMongo(control::MongoTarget {
                url: t.url.clone(),
                database: t.database.clone(),
                collection: t.collection.clone(),
                pipeline: t.pipeline.clone(),
                full_document: t.full_document.clone(),
                full_document_before_change: t.full_document_before_change.clone(),
                primary_site: t.primary_site.clone(),
            }),
            Self::PostgresOutbox(t) => {
                RuleTarget::IngressPostgresOutbox(control::PostgresOutboxTarget {
                    url: t.url.clone(),
                    outbox_table_schema: t.outbox_table_schema.clone(),
                    outbox_table_name: t.outbox_table_name.clone(),
                    nodes_table_schema: t.nodes_table_schema.clone(),
                    nodes_table_name: t.nodes_table_name.clone(),
                    ssl_mode: t.ssl_mode.clone(),
                    ssl_root_cert: t.ssl_root_cert.clone(),
                    primary_site: t.primary_site.clone(),
                })
            }
        }
    }

    pub fn decode(target: RuleTarget) -> Result<Self> {
        match target {
            RuleTarget::IngressMongo(t) => Ok(Self::Mongo(MongoTarget {
                url: t.url,
                database: t.database,
                collection: t.collection,
                pipeline: t.pipeline,
                full_document: t.full_document,
                full_document_before_change: t.full_document_before_change,
                primary_site: t.primary_site,
            })),
            RuleTarget::IngressPostgresOutbox(t) => {
                Ok(Self::PostgresOutbox(PostgresOutboxTarget {
                    url: t.url,
                    outbox_table_schema: t.outbox_table_schema,
                    outbox_table_name: t.outbox_table_name,
                    nodes_table_schema: t.nodes_table_schema,
                    nodes_table_name: t.nodes_table_name,
                    ssl_mode: t.ssl_mode,
                    ssl_root_cert: t.ssl_root_cert,
                    primary_site: t.primary_site,
                }))
            }
            other => Err(Error::UnknownVariant(other.rule_type().to_string())),
        }
    }
}

impl From<MongoTarget> for IngressTarget {
    fn from(target: MongoTarget) -> Self {
        Self::Mongo(target)
    }
}

impl From<PostgresOutboxTarget> for IngressTarget {
    fn from(target: PostgresOutboxTarget) -> Self {
        Self::PostgresOutbox(target)
    }
}

// ============================================================================
// Integration rule family
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Webhook delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Ably Queue delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmqpTarget {
    pub queue_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enveloped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Target of an integration rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IntegrationTarget {
    Http(HttpTarget),
    Amqp(AmqpTarget),
}

fn encode_headers(headers: &[Header]) -> Vec<control::Header> {
    headers
        .iter()
        .map(|h| control::Header {
            name: h.name.clone(),
            value: h.value.clone(),
        })
        .collect()
}

fn decode_headers(headers: Vec<control::Header>) -> Vec<Header> {
    headers
        .into_iter()
        .map(|h| Header {
            name: h.name,
            value: h.value,
        })
        .collect()
}

impl IntegrationTarget {
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::Http(_) => RuleTarget::HTTP,
            Self::Amqp(_) => RuleTarget::AMQP,
        }
    }

    pub fn encode(&self) -> RuleTarget {
        match self {
            Self::Http(t) => RuleTarget::Http(control::HttpTarget {
                url: t.url.clone(),
                headers: encode_headers(&t.headers),
                signing_key_id: t.signing_key_id.clone(),
                enveloped: t.enveloped,
                format: t.format.clone(),
            }),
            Self::Amqp(t) => RuleTarget::Amqp(control::AmqpTarget {
                queue_id: t.queue_id.clone(),
                headers: encode_headers(&t.headers),
                enveloped: t.enveloped,
                format: t.format.clone(),
            }),
        }
    }

    pub fn decode(target: RuleTarget) -> Result<Self> {
        match target {
            RuleTarget::Http(t) => Ok(Self::Http(HttpTarget {
                url: t.url,
                headers: decode_headers(t.headers),
                signing_key_id: t.signing_key_id,
                enveloped: t.enveloped,
                format: t.format,
            })),
            RuleTarget::Amqp(t) => Ok(Self::Amqp(AmqpTarget {
                queue_id: t.queue_id,
                headers: decode_headers(t.headers),
                enveloped: t.enveloped,
                format: t.format,
            })),
            other => Err(Error::UnknownVariant(other.rule_type().to_string())),
        }
    }
}

impl From<HttpTarget> for IntegrationTarget {
    fn from(target: HttpTarget) -> Self {
        Self::Http(target)
    }
}

impl From<AmqpTarget> for IntegrationTarget {
    fn from(target: AmqpTarget) -> Self {
        Self::Amqp(target)
    }
}
