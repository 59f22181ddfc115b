//! Integration rules - deliver channel events to an external target
//!
//! Like ingress rules the kind is generic over its target variant, but a
//! rule also carries a channel `source` and a `request_mode`.

use super::target::{AmqpTarget, HttpTarget, IntegrationTarget};
use super::{Client, api_error, echoed_status, rule_key};
use control::{NewRule, Rule as WireRule, RuleSource as WireSource, RuleTarget};
use lifecycle::{
    ApiError, Attribute, Attributes, Error, Presence, ResourceKey, ResourceKind, Result, Schema,
    compose_builder, decode_value, encode_value,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A delivery variant a rule kind can be instantiated with
pub trait RuleVariant:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Into<IntegrationTarget>
{
    const KIND: &'static str;
    const DESCRIPTION: &'static str;
    /// Wire discriminant every rule of this kind carries
    const RULE_TYPE: &'static str;

    fn target_fields() -> Attributes;
}

/// Channel events that feed a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_filter: Option<String>,
    #[serde(rename = "type")]
    pub source_type: String,
}

/// Normalized integration rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: Option<String>,
    pub app_id: String,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_mode: Option<String>,
    pub source: RuleSource,
    pub target: IntegrationTarget,
}

#[derive(Debug, Deserialize)]
struct RuleModel<T> {
    #[serde(default)]
    id: Option<String>,
    app_id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    request_mode: Option<String>,
    source: RuleSource,
    target: T,
}

impl<T: Into<IntegrationTarget>> From<RuleModel<T>> for Rule {
    fn from(model: RuleModel<T>) -> Self {
        Self {
            id: model.id,
            app_id: model.app_id,
            status: model.status,
            request_mode: model.request_mode,
            source: model.source,
            target: model.target.into(),
        }
    }
}

/// Integration rule kind for delivery variant `T`
pub struct RuleKind<T> {
    variant: PhantomData<T>,
}

pub type HttpRuleKind = RuleKind<HttpTarget>;
pub type AmqpRuleKind = RuleKind<AmqpTarget>;

impl<T> RuleKind<T> {
    pub const fn new() -> Self {
        Self {
            variant: PhantomData,
        }
    }
}

impl<T> Default for RuleKind<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RuleVariant> RuleKind<T> {
    fn decode(&self, source_name: &'static str, value: &Value) -> Result<Rule> {
        let model: RuleModel<T> = decode_value(source_name, value)?;
        Ok(model.into())
    }
}

impl<T: RuleVariant> ResourceKind for RuleKind<T> {
    type Client = Client;
    type Snapshot = Rule;
    type Request = NewRule;
    type Response = WireRule;

    fn name(&self) -> &'static str {
        T::KIND
    }

    fn schema(&self) -> Schema {
        compose_builder(T::target_fields(), T::DESCRIPTION)
            .fragment(rule_fragment())
            .build()
    }

    fn decode_plan(&self, value: &Value) -> Result<Rule> {
        self.decode("plan", value)
    }

    fn decode_state(&self, value: &Value) -> Result<Rule> {
        self.decode("state", value)
    }

    fn encode(&self, snapshot: &Rule) -> Result<Value> {
        encode_value(snapshot)
    }

    fn app_id<'s>(&self, snapshot: &'s Rule) -> &'s str {
        &snapshot.app_id
    }

    fn key(&self, snapshot: &Rule) -> Result<ResourceKey> {
        rule_key(&snapshot.app_id, snapshot.id.as_deref())
    }

    fn variant(&self, snapshot: &Rule) -> Option<&'static str> {
        Some(snapshot.target.rule_type())
    }

    fn expected_variant(&self) -> Option<&'static str> {
        Some(T::RULE_TYPE)
    }

    fn to_wire(&self, snapshot: &Rule) -> NewRule {
        NewRule {
            status: snapshot.status.clone(),
            request_mode: snapshot.request_mode.clone(),
            source: Some(WireSource {
                channel_filter: snapshot.source.channel_filter.clone().unwrap_or_default(),
                source_type: snapshot.source.source_type.clone(),
            }),
            target: snapshot.target.encode(),
        }
    }

    fn from_wire(&self, response: WireRule, fallback: Option<&Rule>) -> Result<Rule> {
        let target = IntegrationTarget::decode(response.target)?;

        let source = match (response.source, fallback) {
            (Some(source), _) => RuleSource {
                // An empty filter matches every channel, same as no filter
                channel_filter: Some(source.channel_filter)
                    .filter(|f| !f.is_empty())
                    .or_else(|| fallback.and_then(|f| f.source.channel_filter.clone())),
                source_type: source.source_type,
            },
            (None, Some(fallback)) => fallback.source.clone(),
            (None, None) => return Err(Error::decode("response", "rule has no source")),
        };

        Ok(Rule {
            id: Some(response.id),
            app_id: response.app_id,
            status: echoed_status(response.status, fallback.and_then(|f| f.status.as_ref())),
            request_mode: response
                .request_mode
                .or_else(|| fallback.and_then(|f| f.request_mode.clone())),
            source,
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

/// `source` and `request_mode`, shared by every integration rule
fn rule_fragment() -> Attributes {
    let source = Attributes::from([
        field(
            "channel_filter",
            Attribute::optional_string(
                "This field allows you to filter your rule based on a regular expression that is matched against the complete channel name. Leave this empty if you want the rule to apply to all channels.",
            ),
        ),
        field(
            "type",
            Attribute::required_string(
                "The type `channel.message` delivers all messages published on a channel. The type `channel.presence` delivers all enter, update and leave events for members present on a channel. The type `channel.lifecycle` events for this rule type are currently not supported. Get in touch (https://ably.com/contact) if you need this feature. The type `channel.occupancy` delivers all occupancy events for the channel.",
            ),
        ),
    ]);

    Attributes::from([
        field(
            "source",
            Attribute::single_nested(Presence::Required, source, "object (rule_source)"),
        ),
        field(
            "request_mode",
            Attribute::optional_string(
                "This is Single Request mode or Batch Request mode. Single Request mode sends each event separately to the endpoint specified by the rule. Batch Request mode rolls up multiple events into the same request.",
            ),
        ),
    ])
}

fn headers() -> (String, Attribute) {
    field(
        "headers",
        Attribute::list_nested(
            Presence::Optional,
            Attributes::from([
                field("name", Attribute::required_string("The name of the header")),
                field("value", Attribute::required_string("The value of the header")),
            ]),
            "If you have additional information to send, you'll need to include the relevant headers",
        ),
    )
}

fn enveloped() -> (String, Attribute) {
    field(
        "enveloped",
        Attribute::optional_bool(
            "Delivered messages are wrapped in an Ably envelope by default that contains metadata about the message and its payload.",
        ),
    )
}

fn format() -> (String, Attribute) {
    field(
        "format",
        Attribute::optional_string(
            "JSON provides a simpler text-based encoding, whereas MsgPack provides a more efficient binary encoding.",
        ),
    )
}

impl RuleVariant for HttpTarget {
    const KIND: &'static str = "ably_rule_http";
    const RULE_TYPE: &'static str = RuleTarget::HTTP;
    const DESCRIPTION: &'static str = "The `ably_rule_http` resource allows you to create and manage an Ably integration rule for HTTP. Read more at https://ably.com/docs/general/webhooks";

    fn target_fields() -> Attributes {
        Attributes::from([
            headers(),
            field(
                "url",
                Attribute::required_string("The webhook URL that Ably will POST events to"),
            ),
            field(
                "signing_key_id",
                Attribute::optional_string(
                    "The signing key ID for use in batch mode. Ably will optionally sign the payload using an API key ensuring your servers can validate the payload using the private API key.",
                ),
            ),
            enveloped(),
            format(),
        ])
    }
}

impl RuleVariant for AmqpTarget {
    const KIND: &'static str = "ably_rule_amqp";
    const RULE_TYPE: &'static str = RuleTarget::AMQP;
    const DESCRIPTION: &'static str = "The `ably_rule_amqp` resource allows you to create and manage an Ably integration rule for AMQP. Read more at https://ably.com/docs/general/firehose/amqp-rule";

    fn target_fields() -> Attributes {
        Attributes::from([
            headers(),
            field(
                "queue_id",
                Attribute::required_string("The ID of your Ably queue"),
            ),
            enveloped(),
            format(),
        ])
    }
}
