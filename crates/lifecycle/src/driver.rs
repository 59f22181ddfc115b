//! Lifecycle driver - runs create/read/update/delete/import for any kind
//!
//! Each operation is a pure function of its inputs (kind, handle, host)
//! plus at most one API call. On every exit path the returned response
//! carries a terminal [`OperationState`].

use crate::context::{Handle, Host};
use crate::error::{Error, Result};
use crate::import::parse_import_id;
use crate::resource::ResourceKind;
use crate::types::{Diagnostics, Operation, OperationResponse, OperationState};
use log::{debug, info, warn};
use serde_json::Value;

/// Create the resource declared in the host's plan
pub fn create<K, H>(kind: &K, handle: &Handle<'_, K::Client>, host: &mut H) -> OperationResponse
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    run(handle.name(), Operation::Create, |diags| {
        // Checked before anything else so an unconfigured provider never
        // reports plan problems first
        let client = handle.client()?;
        let plan = kind.decode_plan(require(host.plan(), "plan")?)?;
        let request = kind.to_wire(&plan);
        let app_id = kind.app_id(&plan);

        debug!("{}: create in app {} with {:?}", kind.name(), app_id, request);
        let response = kind.create(client, app_id, &request)?;

        let snapshot = kind.from_wire(response, Some(&plan))?;
        if let Err(err) = check_variant(kind, kind.variant(&plan), &snapshot) {
            // The remote object exists; keep its identity so it can be deleted
            track(kind, host, &snapshot, diags)?;
            return Err(err);
        }
        persist(kind, host, &snapshot, diags)?;
        Ok(settle(diags))
    })
}

/// Refresh persisted state from the API
///
/// A resource the API no longer knows is removed from state without error.
/// State that holds only identity attributes is filled in from the
/// response.
pub fn read<K, H>(kind: &K, handle: &Handle<'_, K::Client>, host: &mut H) -> OperationResponse
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    run(handle.name(), Operation::Read, |diags| {
        let client = handle.client()?;
        let value = require(host.state(), "state")?;
        let key = kind.decode_key(value)?;
        let fallback = match kind.decode_state(value) {
            Ok(state) => Some(state),
            Err(err) => {
                debug!("{}: reading {} without fallback ({err})", kind.name(), key);
                None
            }
        };

        debug!("{}: read {}", kind.name(), key);
        let response = match kind.read(client, &key) {
            Ok(response) => response,
            Err(err) if err.is_not_found() => {
                info!("{}: {} is gone, removing from state ({err})", kind.name(), key);
                diags.append(host.remove_state());
                return Ok(OperationState::NotFound);
            }
            Err(err) => return Err(err.into()),
        };

        let snapshot = kind.from_wire(response, fallback.as_ref())?;
        check_variant(kind, None, &snapshot)?;
        persist(kind, host, &snapshot, diags)?;
        Ok(settle(diags))
    })
}

/// Update the resource in place
///
/// The lookup key always comes from state; the request body from the plan.
pub fn update<K, H>(kind: &K, handle: &Handle<'_, K::Client>, host: &mut H) -> OperationResponse
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    run(handle.name(), Operation::Update, |diags| {
        let client = handle.client()?;
        let plan = kind.decode_plan(require(host.plan(), "plan")?)?;
        let key = kind.decode_key(require(host.state(), "state")?)?;
        let request = kind.to_wire(&plan);

        debug!("{}: update {} with {:?}", kind.name(), key, request);
        let response = kind.update(client, &key, &request)?;

        let snapshot = kind.from_wire(response, Some(&plan))?;
        check_variant(kind, kind.variant(&plan), &snapshot)?;
        persist(kind, host, &snapshot, diags)?;
        Ok(settle(diags))
    })
}

/// Delete the resource and drop it from state
///
/// A resource that is already gone yields a warning, not an error. Any
/// other failure leaves state untouched so the delete can be retried.
pub fn delete<K, H>(kind: &K, handle: &Handle<'_, K::Client>, host: &mut H) -> OperationResponse
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    let name = handle.name();
    run(name, Operation::Delete, |diags| {
        let client = handle.client()?;
        let key = kind.decode_key(require(host.state(), "state")?)?;

        debug!("{}: delete {}", kind.name(), key);
        if let Err(err) = kind.delete(client, &key) {
            if !err.is_not_found() {
                return Err(err.into());
            }
            warn!("{}: {} already deleted ({err})", kind.name(), key);
            diags.add_warning(
                format!("Resource '{name}' does not exist"),
                format!("Resource '{name}' does not exist, it may have already been deleted: {err}"),
            );
        }

        diags.append(host.remove_state());
        Ok(settle(diags))
    })
}

/// Adopt an existing remote resource by its composite identifier
///
/// Only the identity attributes are set; a subsequent read fills in the
/// rest.
pub fn import<K, H>(kind: &K, raw_id: &str, host: &mut H) -> OperationResponse
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    run(kind.name(), Operation::Import, |diags| {
        let fields = parse_import_id(raw_id, kind.import_fields())?;

        debug!("{}: import {raw_id}", kind.name());
        for (field, value) in fields {
            diags.append(host.set_attribute(field, Value::String(value)));
        }
        Ok(settle(diags))
    })
}

/// Run an operation body and turn its outcome into a response
fn run<F>(name: &str, operation: Operation, body: F) -> OperationResponse
where
    F: FnOnce(&mut Diagnostics) -> Result<OperationState>,
{
    let mut response = OperationResponse::new(operation);

    response.state = match body(&mut response.diagnostics) {
        Ok(state) => state,
        Err(err) => {
            debug!("{name}: {operation} failed: {err}");
            response
                .diagnostics
                .push(err.to_diagnostic(name, operation));
            terminal_state(&err)
        }
    };

    debug!("{name}: {operation} finished as {:?}", response.state);
    response
}

/// Map an error to the terminal state it leaves the operation in
fn terminal_state(err: &Error) -> OperationState {
    match err {
        Error::NotConfigured => OperationState::NotConfigured,
        Error::Decode {
            source_name: "response",
            ..
        } => OperationState::Failed,
        Error::Decode { .. } | Error::ImportFormat { .. } => OperationState::PlanInvalid,
        Error::NotFound(_)
        | Error::Api(_)
        | Error::Encode(_)
        | Error::UnknownVariant(_)
        | Error::VariantMismatch { .. } => OperationState::Failed,
    }
}

/// Success unless the host reported errors along the way
fn settle(diags: &Diagnostics) -> OperationState {
    if diags.has_error() {
        OperationState::Failed
    } else {
        OperationState::Success
    }
}

fn require<'v>(value: Option<&'v Value>, source_name: &'static str) -> Result<&'v Value> {
    value.ok_or_else(|| Error::decode(source_name, "no value supplied by host"))
}

fn persist<K, H>(kind: &K, host: &mut H, snapshot: &K::Snapshot, diags: &mut Diagnostics) -> Result<()>
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    let value = kind.encode(snapshot)?;
    diags.append(host.set_state(value));
    Ok(())
}

/// Write only the identity attributes of a snapshot
fn track<K, H>(kind: &K, host: &mut H, snapshot: &K::Snapshot, diags: &mut Diagnostics) -> Result<()>
where
    K: ResourceKind,
    H: Host + ?Sized,
{
    let key = kind.key(snapshot)?;
    diags.append(host.set_attribute("app_id", Value::String(key.app_id)));
    diags.append(host.set_attribute("id", Value::String(key.id)));
    Ok(())
}

/// A response must carry the kind's fixed variant, or the one requested
///
/// Checked before anything is persisted, so state never holds a target
/// the kind cannot decode again.
fn check_variant<K: ResourceKind>(
    kind: &K,
    requested: Option<&'static str>,
    snapshot: &K::Snapshot,
) -> Result<()> {
    match (kind.expected_variant().or(requested), kind.variant(snapshot)) {
        (Some(expected), Some(returned)) if expected != returned => Err(Error::VariantMismatch {
            requested: expected.to_string(),
            returned: returned.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemoryHost, ProviderState};
    use crate::error::ApiError;
    use crate::resource::{decode_value, encode_value};
    use crate::schema::{Attribute, Attributes, Schema, compose};
    use crate::types::ResourceKey;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(default)]
        id: Option<String>,
        app_id: String,
        #[serde(default)]
        status: Option<String>,
        variant: String,
        #[serde(default)]
        secret: Option<String>,
    }

    #[derive(Debug, Clone)]
    struct Body {
        status: Option<String>,
        variant: String,
        secret: Option<String>,
    }

    /// In-memory API; never echoes `secret`
    #[derive(Default)]
    struct FakeApi {
        items: RefCell<HashMap<String, Item>>,
        fail: Option<ApiError>,
        calls: RefCell<Vec<String>>,
        /// Variant the API answers with regardless of the request
        force_variant: Option<String>,
    }

    impl FakeApi {
        fn failing(err: ApiError) -> Self {
            Self {
                fail: Some(err),
                ..Default::default()
            }
        }

        fn with_item(self, id: &str, app_id: &str, variant: &str) -> Self {
            self.items.borrow_mut().insert(
                id.to_string(),
                Item {
                    id: Some(id.to_string()),
                    app_id: app_id.to_string(),
                    status: Some("enabled".to_string()),
                    variant: variant.to_string(),
                    secret: None,
                },
            );
            self
        }

        fn check(&self, call: String) -> std::result::Result<(), ApiError> {
            self.calls.borrow_mut().push(call);
            match &self.fail {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn store(&self, id: &str, app_id: &str, body: &Body) -> Item {
            let item = Item {
                id: Some(id.to_string()),
                app_id: app_id.to_string(),
                status: body.status.clone(),
                variant: self
                    .force_variant
                    .clone()
                    .unwrap_or_else(|| body.variant.clone()),
                secret: None,
            };
            self.items.borrow_mut().insert(id.to_string(), item.clone());
            item
        }
    }

    struct TestKind {
        pinned: Option<&'static str>,
    }

    /// Accepts whatever variant the API answers with on read
    const ANY: TestKind = TestKind { pinned: None };
    /// Every snapshot must carry variant "a"
    const PINNED: TestKind = TestKind { pinned: Some("a") };

    impl ResourceKind for TestKind {
        type Client = FakeApi;
        type Snapshot = Item;
        type Request = Body;
        type Response = Item;

        fn name(&self) -> &'static str {
            "test_rule"
        }

        fn schema(&self) -> Schema {
            compose(
                Attributes::from([("url".to_string(), Attribute::required_string("u"))]),
                "test",
            )
        }

        fn decode_plan(&self, value: &Value) -> Result<Item> {
            decode_value("plan", value)
        }

        fn decode_state(&self, value: &Value) -> Result<Item> {
            decode_value("state", value)
        }

        fn encode(&self, snapshot: &Item) -> Result<Value> {
            encode_value(snapshot)
        }

        fn app_id<'s>(&self, snapshot: &'s Item) -> &'s str {
            &snapshot.app_id
        }

        fn key(&self, snapshot: &Item) -> Result<ResourceKey> {
            let id = snapshot
                .id
                .as_deref()
                .ok_or_else(|| Error::decode("state", "missing id"))?;
            Ok(ResourceKey::new(&snapshot.app_id, id))
        }

        fn variant(&self, snapshot: &Item) -> Option<&'static str> {
            match snapshot.variant.as_str() {
                "a" => Some("a"),
                "b" => Some("b"),
                _ => None,
            }
        }

        fn expected_variant(&self) -> Option<&'static str> {
            self.pinned
        }

        fn to_wire(&self, snapshot: &Item) -> Body {
            Body {
                status: snapshot.status.clone(),
                variant: snapshot.variant.clone(),
                secret: snapshot.secret.clone(),
            }
        }

        fn from_wire(&self, response: Item, fallback: Option<&Item>) -> Result<Item> {
            Ok(Item {
                secret: response
                    .secret
                    .or_else(|| fallback.and_then(|f| f.secret.clone())),
                ..response
            })
        }

        fn create(
            &self,
            client: &FakeApi,
            app_id: &str,
            request: &Body,
        ) -> std::result::Result<Item, ApiError> {
            client.check(format!("create {app_id}"))?;
            Ok(client.store("rule1", app_id, request))
        }

        fn read(&self, client: &FakeApi, key: &ResourceKey) -> std::result::Result<Item, ApiError> {
            client.check(format!("read {key}"))?;
            client
                .items
                .borrow()
                .get(&key.id)
                .cloned()
                .ok_or_else(|| ApiError::not_found("HTTP 404"))
        }

        fn update(
            &self,
            client: &FakeApi,
            key: &ResourceKey,
            request: &Body,
        ) -> std::result::Result<Item, ApiError> {
            client.check(format!("update {key}"))?;
            Ok(client.store(&key.id, &key.app_id, request))
        }

        fn delete(&self, client: &FakeApi, key: &ResourceKey) -> std::result::Result<(), ApiError> {
            client.check(format!("delete {key}"))?;
            client
                .items
                .borrow_mut()
                .remove(&key.id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("HTTP 404"))
        }
    }

    fn configured(api: FakeApi) -> ProviderState<FakeApi> {
        ProviderState::Configured(api)
    }

    #[test]
    fn test_create_persists_server_id() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_plan(json!({
            "app_id": "app1",
            "status": "enabled",
            "variant": "a",
            "secret": "s3cret"
        }));

        let resp = create(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        assert!(resp.diagnostics.is_empty());
        let state = host.state.unwrap();
        assert_eq!(state["id"], "rule1");
        assert_eq!(state["variant"], "a");
        // not echoed by the API, backfilled from plan
        assert_eq!(state["secret"], "s3cret");
    }

    #[test]
    fn test_create_unconfigured_fails_before_decoding() {
        let provider: ProviderState<FakeApi> = ProviderState::Unconfigured;
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_plan(json!({"garbage": true}));

        let resp = create(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::NotConfigured);
        assert_eq!(resp.diagnostics.errors().count(), 1);
        assert_eq!(
            resp.diagnostics.iter().next().unwrap().summary,
            "Provider not configured"
        );
        assert_eq!(host.set_state_calls, 0);
    }

    #[test]
    fn test_create_invalid_plan() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_plan(json!({"status": "enabled"}));

        let resp = create(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::PlanInvalid);
        assert!(resp.has_error());
        assert!(provider.client().unwrap().calls.borrow().is_empty());
    }

    #[test]
    fn test_create_api_failure_reports_kind() {
        let provider = configured(FakeApi::failing(ApiError::other("HTTP 500")));
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_plan(json!({"app_id": "app1", "variant": "a"}));

        let resp = create(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        let diag = resp.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, "Error creating Resource 'test_rule'");
        assert!(diag.detail.contains("HTTP 500"));
        assert!(host.state.is_none());
    }

    #[test]
    fn test_create_variant_mismatch_fails() {
        let api = FakeApi {
            force_variant: Some("b".to_string()),
            ..Default::default()
        };
        let provider = configured(api);
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_plan(json!({"app_id": "app1", "variant": "a"}));

        let resp = create(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        assert!(resp.diagnostics.errors().next().unwrap().detail.contains("mismatch"));
        // the remote object exists, so its identity is still tracked
        assert_eq!(host.state, Some(json!({"app_id": "app1", "id": "rule1"})));
        assert_eq!(host.set_state_calls, 0);
    }

    #[test]
    fn test_update_variant_mismatch_keeps_state() {
        let api = FakeApi {
            force_variant: Some("b".to_string()),
            ..Default::default()
        };
        let provider = configured(api.with_item("rule1", "app1", "a"));
        let handle = Handle::new("test_rule", &provider);
        let state = json!({"id": "rule1", "app_id": "app1", "variant": "a"});
        let mut host = MemoryHost::new()
            .with_plan(json!({"app_id": "app1", "variant": "a"}))
            .with_state(state.clone());

        let resp = update(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        assert_eq!(host.state, Some(state));
        assert_eq!(host.set_state_calls, 0);
    }

    #[test]
    fn test_read_refreshes_state() {
        let provider = configured(FakeApi::default().with_item("rule1", "app1", "b"));
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_state(json!({
            "id": "rule1",
            "app_id": "app1",
            "variant": "a",
            "secret": "kept"
        }));

        let resp = read(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        let state = host.state.unwrap();
        // wire variant wins over stale state
        assert_eq!(state["variant"], "b");
        assert_eq!(state["secret"], "kept");
    }

    #[test]
    fn test_read_not_found_removes_state() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_state(json!({
            "id": "rule1",
            "app_id": "app1",
            "variant": "a"
        }));

        let resp = read(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::NotFound);
        assert_eq!(resp.diagnostics.errors().count(), 0);
        assert_eq!(host.remove_state_calls, 1);
        assert_eq!(host.set_state_calls, 0);
    }

    #[test]
    fn test_read_other_error_keeps_state() {
        let provider = configured(FakeApi::failing(ApiError::other("HTTP 503")));
        let handle = Handle::new("test_rule", &provider);
        let original = json!({"id": "rule1", "app_id": "app1", "variant": "a"});
        let mut host = MemoryHost::new().with_state(original.clone());

        let resp = read(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        assert_eq!(
            resp.diagnostics.errors().next().unwrap().summary,
            "Error reading Resource 'test_rule'"
        );
        assert_eq!(host.state, Some(original));
        assert_eq!(host.remove_state_calls, 0);
    }

    #[test]
    fn test_read_without_id_is_invalid() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new().with_state(json!({"app_id": "app1", "variant": "a"}));

        let resp = read(&ANY, &handle, &mut host);
        assert_eq!(resp.state, OperationState::PlanInvalid);
    }

    #[test]
    fn test_update_keys_by_state_and_uses_plan_variant() {
        let provider = configured(FakeApi::default().with_item("rule1", "app1", "a"));
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new()
            .with_plan(json!({"id": "other", "app_id": "app1", "variant": "b"}))
            .with_state(json!({"id": "rule1", "app_id": "app1", "variant": "a"}));

        let resp = update(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        let calls = provider.client().unwrap().calls.borrow().clone();
        assert_eq!(calls, vec!["update app1,rule1".to_string()]);
        let state = host.state.unwrap();
        assert_eq!(state["id"], "rule1");
        assert_eq!(state["variant"], "b");
    }

    #[test]
    fn test_update_failure_leaves_state() {
        let provider = configured(FakeApi::failing(ApiError::other("HTTP 400")));
        let handle = Handle::new("test_rule", &provider);
        let state = json!({"id": "rule1", "app_id": "app1", "variant": "a"});
        let mut host = MemoryHost::new()
            .with_plan(json!({"app_id": "app1", "variant": "a", "status": "disabled"}))
            .with_state(state.clone());

        let resp = update(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        assert_eq!(host.state, Some(state));
    }

    #[test]
    fn test_delete_removes_state() {
        let provider = configured(FakeApi::default().with_item("rule1", "app1", "a"));
        let handle = Handle::new("test_rule", &provider);
        let mut host =
            MemoryHost::new().with_state(json!({"id": "rule1", "app_id": "app1", "variant": "a"}));

        let resp = delete(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        assert!(resp.diagnostics.is_empty());
        assert_eq!(host.remove_state_calls, 1);
        assert!(provider.client().unwrap().items.borrow().is_empty());
    }

    #[test]
    fn test_delete_not_found_warns_and_removes() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);
        let mut host =
            MemoryHost::new().with_state(json!({"id": "rule1", "app_id": "app1", "variant": "a"}));

        let resp = delete(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        assert_eq!(resp.diagnostics.warnings().count(), 1);
        assert_eq!(resp.diagnostics.errors().count(), 0);
        assert_eq!(host.remove_state_calls, 1);
    }

    #[test]
    fn test_delete_failure_keeps_state() {
        let provider = configured(FakeApi::failing(ApiError::other("HTTP 500")));
        let handle = Handle::new("test_rule", &provider);
        let mut host =
            MemoryHost::new().with_state(json!({"id": "rule1", "app_id": "app1", "variant": "a"}));

        let resp = delete(&ANY, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Failed);
        assert_eq!(host.remove_state_calls, 0);
        assert!(host.state.is_some());
    }

    #[test]
    fn test_import_sets_identity_fields() {
        let mut host = MemoryHost::new();

        let resp = import(&ANY, "app123,rule456", &mut host);

        assert_eq!(resp.state, OperationState::Success);
        assert_eq!(host.state, Some(json!({"app_id": "app123", "id": "rule456"})));
    }

    #[test]
    fn test_read_after_import_fills_state() {
        let provider = configured(FakeApi::default().with_item("rule456", "app123", "a"));
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new();

        assert_eq!(import(&PINNED, "app123,rule456", &mut host).state, OperationState::Success);
        let resp = read(&PINNED, &handle, &mut host);

        assert_eq!(resp.state, OperationState::Success);
        assert!(resp.diagnostics.is_empty());
        let state = host.state.unwrap();
        assert_eq!(state["id"], "rule456");
        assert_eq!(state["variant"], "a");
        assert_eq!(state["status"], "enabled");
    }

    #[test]
    fn test_update_and_delete_after_import() {
        let provider = configured(FakeApi::default().with_item("rule456", "app123", "a"));
        let handle = Handle::new("test_rule", &provider);
        let mut host = MemoryHost::new();
        import(&ANY, "app123,rule456", &mut host);
        host.plan = Some(json!({"app_id": "app123", "variant": "a", "status": "disabled"}));

        let resp = update(&ANY, &handle, &mut host);
        assert_eq!(resp.state, OperationState::Success);
        assert_eq!(host.state.as_ref().unwrap()["status"], "disabled");

        host.state = Some(json!({"app_id": "app123", "id": "rule456"}));
        let resp = delete(&ANY, &handle, &mut host);
        assert_eq!(resp.state, OperationState::Success);
        assert!(provider.client().unwrap().items.borrow().is_empty());
    }

    #[test]
    fn test_read_of_foreign_variant_keeps_state_deletable() {
        let provider = configured(FakeApi::default().with_item("rule1", "app1", "b"));
        let handle = Handle::new("test_rule", &provider);
        let state = json!({"id": "rule1", "app_id": "app1", "variant": "a"});
        let mut host = MemoryHost::new().with_state(state.clone());

        for _ in 0..2 {
            let resp = read(&PINNED, &handle, &mut host);
            assert_eq!(resp.state, OperationState::Failed);
            assert!(resp.diagnostics.errors().next().unwrap().detail.contains("mismatch"));
            assert_eq!(host.state, Some(state.clone()));
        }
        assert_eq!(host.set_state_calls, 0);

        let resp = delete(&PINNED, &handle, &mut host);
        assert_eq!(resp.state, OperationState::Success);
        assert!(host.state.is_none());
        assert!(provider.client().unwrap().items.borrow().is_empty());
    }

    #[test]
    fn test_import_wrong_arity() {
        let mut host = MemoryHost::new();

        let resp = import(&ANY, "app123", &mut host);

        assert_eq!(resp.state, OperationState::PlanInvalid);
        let diag = resp.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, "Unexpected Import Identifier");
        assert!(diag.detail.contains("'app_id,id'"));
        assert!(host.state.is_none());
    }

    #[test]
    fn test_every_response_is_terminal() {
        let provider = configured(FakeApi::default());
        let handle = Handle::new("test_rule", &provider);

        let responses = vec![
            create(&ANY, &handle, &mut MemoryHost::new()),
            read(&ANY, &handle, &mut MemoryHost::new()),
            update(&ANY, &handle, &mut MemoryHost::new()),
            delete(&ANY, &handle, &mut MemoryHost::new()),
            import(&ANY, "", &mut MemoryHost::new()),
        ];

        for resp in responses {
            assert!(resp.state.is_terminal(), "{:?}", resp.operation);
        }
    }
}
