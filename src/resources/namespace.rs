//! Channel namespaces
//!
//! A namespace is identified by its name, chosen by the user. The API has
//! no single-namespace read, so reads scan the app's namespace list.

use super::{Client, api_error};
use control::Namespace as WireNamespace;
use lifecycle::schema::Attributes;
use lifecycle::{
    ApiError, Attribute, Error, ResourceKey, ResourceKind, Result, Schema, decode_value,
    encode_value, find_by_id,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub app_id: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_last: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_timeserial: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceKind;

impl ResourceKind for NamespaceKind {
    type Client = Client;
    type Snapshot = Namespace;
    type Request = WireNamespace;
    type Response = WireNamespace;

    fn name(&self) -> &'static str {
        "ably_namespace"
    }

    fn schema(&self) -> Schema {
        let flag = |description: &str| Attribute::optional_bool(description);
        Schema::builder(
            "The `ably_namespace` resource allows you to manage namespaces for channel rules in Ably. Read more in Ably documentation: https://ably.com/docs/general/channel-rules-namespaces.",
        )
        .fragment(Attributes::from([
            (
                "app_id".to_string(),
                Attribute::required_string("The application ID.").requires_replace(),
            ),
            (
                "id".to_string(),
                Attribute::required_string(
                    "The namespace or channel name that the channel rule will apply to.",
                )
                .requires_replace(),
            ),
        ]))
        .attribute(
            "authenticated",
            flag("Require clients to be authenticated to use channels in this namespace."),
        )
        .attribute(
            "persisted",
            flag("If true, messages will be stored for 24 hours."),
        )
        .attribute(
            "persist_last",
            flag("If true, the last message on each channel will persist for 365 days."),
        )
        .attribute(
            "push_enabled",
            flag("If true, publishing messages with a push payload in the extras field is permitted."),
        )
        .attribute(
            "tls_only",
            flag("If true, only clients that are connected using TLS will be permitted to subscribe."),
        )
        .attribute(
            "expose_timeserial",
            flag(
                "If true, messages received on a channel will contain a unique timeserial that can be referenced by later messages for use with message interactions.",
            ),
        )
        .build()
    }

    fn decode_plan(&self, value: &Value) -> Result<Namespace> {
        decode_value("plan", value)
    }

    fn decode_state(&self, value: &Value) -> Result<Namespace> {
        decode_value("state", value)
    }

    fn encode(&self, snapshot: &Namespace) -> Result<Value> {
        encode_value(snapshot)
    }

    fn app_id<'s>(&self, snapshot: &'s Namespace) -> &'s str {
        &snapshot.app_id
    }

    fn key(&self, snapshot: &Namespace) -> Result<ResourceKey> {
        Ok(ResourceKey::new(&snapshot.app_id, &snapshot.id))
    }

    fn to_wire(&self, snapshot: &Namespace) -> WireNamespace {
        WireNamespace {
            id: snapshot.id.clone(),
            authenticated: snapshot.authenticated.unwrap_or_default(),
            persisted: snapshot.persisted.unwrap_or_default(),
            persist_last: snapshot.persist_last.unwrap_or_default(),
            push_enabled: snapshot.push_enabled.unwrap_or_default(),
            tls_only: snapshot.tls_only.unwrap_or_default(),
            expose_timeserial: snapshot.expose_timeserial,
        }
    }

    fn from_wire(&self, response: WireNamespace, fallback: Option<&Namespace>) -> Result<Namespace> {
        // Namespaces carry no app id on the wire
        let Some(fallback) = fallback else {
            return Err(Error::decode("response", "namespace has no app id"));
        };

        Ok(Namespace {
            app_id: fallback.app_id.clone(),
            id: response.id,
            authenticated: Some(response.authenticated),
            persisted: Some(response.persisted),
            persist_last: Some(response.persist_last),
            push_enabled: Some(response.push_enabled),
            tls_only: Some(response.tls_only),
            expose_timeserial: response.expose_timeserial.or(fallback.expose_timeserial),
        })
    }

    fn create(
        &self,
        client: &Client,
        app_id: &str,
        request: &WireNamespace,
    ) -> std::result::Result<WireNamespace, ApiError> {
        client.create_namespace(app_id, request).map_err(api_error)
    }

    fn read(
        &self,
        client: &Client,
        key: &ResourceKey,
    ) -> std::result::Result<WireNamespace, ApiError> {
        let namespaces = client.namespaces(&key.app_id).map_err(api_error)?;
        find_by_id(namespaces, &key.id, |ns| ns.id.as_str())
    }

    fn update(
        &self,
        client: &Client,
        key: &ResourceKey,
        request: &WireNamespace,
    ) -> std::result::Result<WireNamespace, ApiError> {
        // The name is immutable; always address the namespace known to state
        let mut request = request.clone();
        request.id.clone_from(&key.id);
        client
            .update_namespace(&key.app_id, &request)
            .map_err(api_error)
    }

    fn delete(&self, client: &Client, key: &ResourceKey) -> std::result::Result<(), ApiError> {
        client
            .delete_namespace(&key.app_id, &key.id)
            .map_err(api_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control::{ControlApi, MockControlApi};
    use lifecycle::{Handle, MemoryHost, OperationState, ProviderState, driver};
    use serde_json::json;

    fn provider(mock: &MockControlApi) -> ProviderState<Client> {
        ProviderState::Configured(Box::new(mock.clone()))
    }

    #[test]
    fn test_create_fills_unset_flags() {
        let mock = MockControlApi::new();
        let provider = provider(&mock);
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new().with_plan(json!({
            "app_id": "app1",
            "id": "chat",
            "persisted": true,
            "expose_timeserial": true
        }));

        let response = driver::create(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::Success);
        assert_eq!(
            host.state,
            Some(json!({
                "app_id": "app1",
                "id": "chat",
                "authenticated": false,
                "persisted": true,
                "persist_last": false,
                "push_enabled": false,
                "tls_only": false,
                "expose_timeserial": true
            }))
        );
    }

    #[test]
    fn test_read_scans_list() {
        let mock = MockControlApi::new();
        for id in ["alpha", "chat", "zeta"] {
            let ns = WireNamespace {
                id: id.to_string(),
                tls_only: id == "chat",
                ..Default::default()
            };
            mock.create_namespace("app1", &ns).unwrap();
        }
        let provider = provider(&mock);
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new().with_state(json!({"app_id": "app1", "id": "chat"}));

        let response = driver::read(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::Success);
        let state = host.state.unwrap();
        assert_eq!(state["tls_only"], true);
        assert_eq!(state["id"], "chat");
    }

    #[test]
    fn test_read_missing_namespace_removes_state() {
        let mock = MockControlApi::new();
        let provider = provider(&mock);
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new().with_state(json!({"app_id": "app1", "id": "chat"}));

        let response = driver::read(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::NotFound);
        assert!(!response.has_error());
        assert_eq!(host.remove_state_calls, 1);
        assert!(host.state.is_none());
    }

    #[test]
    fn test_update_addresses_state_name() {
        let mock = MockControlApi::new();
        mock.create_namespace(
            "app1",
            &WireNamespace {
                id: "chat".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let provider = provider(&mock);
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new()
            .with_state(json!({"app_id": "app1", "id": "chat"}))
            .with_plan(json!({"app_id": "app1", "id": "renamed", "push_enabled": true}));

        let response = driver::update(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::Success);
        assert!(mock.calls().contains(&"update_namespace app1,chat".to_string()));
        let all = mock.namespaces("app1").unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].push_enabled);
    }

    #[test]
    fn test_delete_missing_namespace_warns() {
        let mock = MockControlApi::new();
        let provider = provider(&mock);
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new().with_state(json!({"app_id": "app1", "id": "chat"}));

        let response = driver::delete(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::Success);
        assert_eq!(response.diagnostics.warnings().count(), 1);
        assert_eq!(response.diagnostics.errors().count(), 0);
        assert_eq!(host.remove_state_calls, 1);
    }

    #[test]
    fn test_unconfigured_provider() {
        let provider: ProviderState<Client> = ProviderState::Unconfigured;
        let handle = Handle::new(NamespaceKind.name(), &provider);
        let mut host = MemoryHost::new().with_plan(json!({"app_id": "app1", "id": "chat"}));

        let response = driver::create(&NamespaceKind, &handle, &mut host);

        assert_eq!(response.state, OperationState::NotConfigured);
        assert!(host.state.is_none());
    }

    #[test]
    fn test_schema_is_valid() {
        let schema = NamespaceKind.schema();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.attributes.len(), 8);
    }
}
