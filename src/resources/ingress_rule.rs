//! Ingress rules - database change streams fed into Ably channels
//!
//! One generic kind, [`IngressRuleKind<T>`], instantiated per source
//! variant. Plan and state are decoded with the variant's own shape; only
//! API responses are dispatched on their `ruleType`.

use super::target::{IngressTarget, MongoTarget, PostgresOutboxTarget};
use super::{Client, api_error, echoed_status, rule_key};
use control::{NewRule, Rule as WireRule, RuleTarget};
use lifecycle::{
    ApiError, Attribute, Attributes, ResourceKey, ResourceKind, Result, Schema, compose,
    decode_value, encode_value,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A source variant an ingress rule kind can be instantiated with
pub trait IngressVariant:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Into<IngressTarget>
{
    /// Resource kind name
    const KIND: &'static str;
    /// Markdown description of the kind
    const DESCRIPTION: &'static str;
    /// Wire discriminant every rule of this kind carries
    const RULE_TYPE: &'static str;

    /// Attributes nested under `target`
    fn target_fields() -> Attributes;
}

/// Normalized ingress rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressRule {
    pub id: Option<String>,
    pub app_id: String,
    pub status: Option<String>,
    pub target: IngressTarget,
}

/// Host-side shape of an ingress rule with a statically known target
#[derive(Debug, Deserialize)]
struct IngressRuleModel<T> {
    #[serde(default)]
    id: Option<String>,
    app_id: String,
    #[serde(default)]
    status: Option<String>,
    target: T,
}

impl<T: Into<IngressTarget>> From<IngressRuleModel<T>> for IngressRule {
    fn from(model: IngressRuleModel<T>) -> Self {
        Self {
            id: model.id,
            app_id: model.app_id,
            status: model.status,
            target: model.target.into(),
        }
    }
}

/// Ingress rule kind for source variant `T`
pub struct IngressRuleKind<T> {
    variant: PhantomData<T>,
}

pub type MongoRuleKind = IngressRuleKind<MongoTarget>;
pub type PostgresOutboxRuleKind = IngressRuleKind<PostgresOutboxTarget>;

impl<T> IngressRuleKind<T> {
    pub const fn new() -> Self {
        Self {
            variant: PhantomData,
        }
    }
}

impl<T> Default for IngressRuleKind<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IngressVariant> IngressRuleKind<T> {
    fn decode(&self, source_name: &'static str, value: &Value) -> Result<IngressRule> {
        let model: IngressRuleModel<T> = decode_value(source_name, value)?;
        Ok(model.into())
    }
}

impl<T: IngressVariant> ResourceKind for IngressRuleKind<T> {
    type Client = Client;
    type Snapshot = IngressRule;
    type Request = NewRule;
    type Response = WireRule;

    fn name(&self) -> &'static str {
        T::KIND
    }

    fn schema(&self) -> Schema {
        compose(T::target_fields(), T::DESCRIPTION)
    }

    fn decode_plan(&self, value: &Value) -> Result<IngressRule> {
        self.decode("plan", value)
    }

    fn decode_state(&self, value: &Value) -> Result<IngressRule> {
        self.decode("state", value)
    }

    fn encode(&self, snapshot: &IngressRule) -> Result<Value> {
        encode_value(snapshot)
    }

    fn app_id<'s>(&self, snapshot: &'s IngressRule) -> &'s str {
        &snapshot.app_id
    }

    fn key(&self, snapshot: &IngressRule) -> Result<ResourceKey> {
        rule_key(&snapshot.app_id, snapshot.id.as_deref())
    }

    fn variant(&self, snapshot: &IngressRule) -> Option<&'static str> {
        Some(snapshot.target.rule_type())
    }

    fn expected_variant(&self) -> Option<&'static str> {
        Some(T::RULE_TYPE)
    }

    fn to_wire(&self, snapshot: &IngressRule) -> NewRule {
        NewRule {
            status: snapshot.status.clone(),
            request_mode: None,
            source: None,
            target: snapshot.target.encode(),
        }
    }

    fn from_wire(&self, response: WireRule, fallback: Option<&IngressRule>) -> Result<IngressRule> {
        let mut target = IngressTarget::decode(response.target)?;

        // The API never echoes the root certificate
        if let (IngressTarget::PostgresOutbox(echoed), Some(fallback)) = (&mut target, fallback)
            && let IngressTarget::PostgresOutbox(declared) = &fallback.target
            && echoed.ssl_root_cert.is_none()
        {
            echoed.ssl_root_cert = declared.ssl_root_cert.clone();
        }

        Ok(IngressRule {
            id: Some(response.id),
            app_id: response.app_id,
            status: echoed_status(response.status, fallback.and_then(|f| f.status.as_ref())),
            target,
        })
    }

    fn create(
        &self,
        client: &Client,
        app_id: &str,
        request: &NewRule,
    ) -> std::result::Result<WireRule, ApiError> {
        client.create_rule(app_id, request).map_err(api_error)
    }

    fn read(&self, client: &Client, key: &ResourceKey) -> std::result::Result<WireRule, ApiError> {
        client.rule(&key.app_id, &key.id).map_err(api_error)
    }

    fn update(
        &self,
        client: &Client,
        key: &ResourceKey,
        request: &NewRule,
    ) -> std::result::Result<WireRule, ApiError> {
        client
            .update_rule(&key.app_id, &key.id, request)
            .map_err(api_error)
    }

    fn delete(&self, client: &Client, key: &ResourceKey) -> std::result::Result<(), ApiError> {
        client.delete_rule(&key.app_id, &key.id).map_err(api_error)
    }
}

fn field(name: &str, attribute: Attribute) -> (String, Attribute) {
    (name.to_string(), attribute)
}

/// Fields both ingress sources share
fn primary_site() -> (String, Attribute) {
    field(
        "primary_site",
        Attribute::optional_string(
            "The primary site that the connector will run in. You should choose a site that is close to your database.",
        ),
    )
}

impl IngressVariant for MongoTarget {
    const KIND: &'static str = "ably_ingress_rule_mongodb";
    const RULE_TYPE: &'static str = RuleTarget::INGRESS_MONGO;
    const DESCRIPTION: &'static str = "The `ably_ingress_rule_mongodb` resource allows you to create and manage a MongoDB ingress rule. Read more at https://ably.com/docs/general/db-connectors";

    fn target_fields() -> Attributes {
        Attributes::from([
            field(
                "url",
                Attribute::required_string("The connection string of your MongoDB instance.")
                    .sensitive(),
            ),
            field(
                "database",
                Attribute::required_string("The MongoDB Database Name"),
            ),
            field(
                "collection",
                Attribute::required_string("What the connector should watch within the database."),
            ),
            field(
                "pipeline",
                Attribute::optional_string(
                    "A MongoDB pipeline to pass to the Change Stream API. This field allows you to control which types of change events are published, and which channel the change event should be published to.",
                ),
            ),
            field(
                "full_document",
                Attribute::optional_string(
                    "Controls whether the full document should be included in the published change events. Full Document is not available by default in all types of change event.",
                ),
            ),
            field(
                "full_document_before_change",
                Attribute::optional_string(
                    "Controls whether the pre-image of the document should be included in the published change events.",
                ),
            ),
            primary_site(),
        ])
    }
}

impl IngressVariant for PostgresOutboxTarget {
    const KIND: &'static str = "ably_ingress_rule_postgres_outbox";
    const RULE_TYPE: &'static str = RuleTarget::INGRESS_POSTGRES_OUTBOX;
    const DESCRIPTION: &'static str = "The `ably_ingress_rule_postgres_outbox` resource allows you to create and manage an Ably integration rule for Postgres. Read more at https://ably.com/docs/general/db-connectors";

    fn target_fields() -> Attributes {
        Attributes::from([
            field(
                "url",
                Attribute::required_string("The connection string of your Postgres database.")
                    .sensitive(),
            ),
            field(
                "outbox_table_schema",
                Attribute::required_string("Schema for the outbox table in your database."),
            ),
            field(
                "outbox_table_name",
                Attribute::required_string("Name for the outbox table."),
            ),
            field(
                "nodes_table_schema",
                Attribute::required_string("Schema for the nodes table in your database."),
            ),
            field(
                "nodes_table_name",
                Attribute::required_string("Name for the nodes table."),
            ),
            field(
                "ssl_mode",
                Attribute::optional_string(
                    "Determines the level of protection provided by the SSL connection. Options are: prefer, require, verify-ca, verify-full.",
                ),
            ),
            field(
                "ssl_root_cert",
                Attribute::optional_string(
                    "Optional. Specifies the SSL certificate authority (CA) certificates. Required if SSL mode is verify-ca or verify-full.",
                ),
            ),
            primary_site(),
        ])
    }
}
