//! The Control API trait and an in-memory implementation.
//!
//! [`ControlApi`] abstracts the transport so resource code can be tested
//! without network access. [`crate::HttpClient`] is the real
//! implementation; [`MockControlApi`] keeps everything in memory.
//!
//! ```
//! use control::{ControlApi, MockControlApi, Namespace};
//!
//! let mock = MockControlApi::new();
//! let ns = Namespace { id: "chat".to_string(), persisted: true, ..Default::default() };
//! mock.create_namespace("app1", &ns).unwrap();
//!
//! let all = mock.namespaces("app1").unwrap();
//! assert_eq!(all.len(), 1);
//! ```

use crate::error::{Error, Result};
use crate::types::{Namespace, NewRule, Rule, RuleTarget};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Operations of the Control API used by the provider.
///
/// Namespaces have no single-item read; callers list and scan.
pub trait ControlApi: Send + Sync {
    fn create_rule(&self, app_id: &str, rule: &NewRule) -> Result<Rule>;

    fn rule(&self, app_id: &str, rule_id: &str) -> Result<Rule>;

    fn update_rule(&self, app_id: &str, rule_id: &str, rule: &NewRule) -> Result<Rule>;

    fn delete_rule(&self, app_id: &str, rule_id: &str) -> Result<()>;

    /// List every namespace of an app.
    fn namespaces(&self, app_id: &str) -> Result<Vec<Namespace>>;

    fn create_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace>;

    /// Update the namespace named by `namespace.id`.
    fn update_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace>;

    fn delete_namespace(&self, app_id: &str, namespace_id: &str) -> Result<()>;
}

impl<T: ControlApi + ?Sized> ControlApi for Box<T> {
    fn create_rule(&self, app_id: &str, rule: &NewRule) -> Result<Rule> {
        (**self).create_rule(app_id, rule)
    }

    fn rule(&self, app_id: &str, rule_id: &str) -> Result<Rule> {
        (**self).rule(app_id, rule_id)
    }

    fn update_rule(&self, app_id: &str, rule_id: &str, rule: &NewRule) -> Result<Rule> {
        (**self).update_rule(app_id, rule_id, rule)
    }

    fn delete_rule(&self, app_id: &str, rule_id: &str) -> Result<()> {
        (**self).delete_rule(app_id, rule_id)
    }

    fn namespaces(&self, app_id: &str) -> Result<Vec<Namespace>> {
        (**self).namespaces(app_id)
    }

    fn create_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        (**self).create_namespace(app_id, namespace)
    }

    fn update_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        (**self).update_namespace(app_id, namespace)
    }

    fn delete_namespace(&self, app_id: &str, namespace_id: &str) -> Result<()> {
        (**self).delete_namespace(app_id, namespace_id)
    }
}

#[derive(Debug, Default)]
struct MockState {
    rules: BTreeMap<(String, String), Rule>,
    namespaces: BTreeMap<(String, String), Namespace>,
    next_id: u64,
    fail_with: Option<Error>,
    calls: Vec<String>,
}

/// In-memory Control API for tests.
///
/// Behaves like the real API where it matters to callers: IDs are
/// server-assigned, missing resources yield a 404 error, and write-only
/// fields (`sslRootCert`) are never echoed back.
#[derive(Debug, Clone, Default)]
pub struct MockControlApi {
    state: Arc<Mutex<MockState>>,
}

impl MockControlApi {
    /// Create a new empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: Error) {
        self.lock().fail_with = Some(err);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        self.lock().fail_with = None;
    }

    /// Insert a rule directly, bypassing redaction.
    pub fn insert_rule(&self, rule: Rule) {
        let key = (rule.app_id.clone(), rule.id.clone());
        self.lock().rules.insert(key, rule);
    }

    /// Names of the calls made so far, e.g. "create_rule app1".
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of stored rules across all apps.
    pub fn rule_count(&self) -> usize {
        self.lock().rules.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call and return the injected failure, if any.
    fn enter(&self, call: String) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match &state.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str, app_id: &str, id: &str) -> Error {
    Error::api(404, 40400, format!("{what} '{id}' not found in app '{app_id}'"))
}

fn stored_rule(id: String, app_id: &str, rule: &NewRule) -> Rule {
    let mut target = rule.target.clone();
    if let RuleTarget::IngressPostgresOutbox(t) = &mut target {
        t.ssl_root_cert = None;
    }
    Rule {
        id,
        app_id: app_id.to_string(),
        status: rule.status.clone().unwrap_or_else(|| "enabled".to_string()),
        request_mode: rule.request_mode.clone(),
        source: rule.source.clone(),
        target,
    }
}

impl ControlApi for MockControlApi {
    fn create_rule(&self, app_id: &str, rule: &NewRule) -> Result<Rule> {
        let mut state = self.enter(format!("create_rule {app_id}"))?;
        state.next_id += 1;
        let id = format!("rule{}", state.next_id);
        let stored = stored_rule(id.clone(), app_id, rule);
        state
            .rules
            .insert((app_id.to_string(), id), stored.clone());
        Ok(stored)
    }

    fn rule(&self, app_id: &str, rule_id: &str) -> Result<Rule> {
        let state = self.enter(format!("rule {app_id},{rule_id}"))?;
        state
            .rules
            .get(&(app_id.to_string(), rule_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("rule", app_id, rule_id))
    }

    fn update_rule(&self, app_id: &str, rule_id: &str, rule: &NewRule) -> Result<Rule> {
        let mut state = self.enter(format!("update_rule {app_id},{rule_id}"))?;
        let key = (app_id.to_string(), rule_id.to_string());
        if !state.rules.contains_key(&key) {
            return Err(not_found("rule", app_id, rule_id));
        }
        let stored = stored_rule(rule_id.to_string(), app_id, rule);
        state.rules.insert(key, stored.clone());
        Ok(stored)
    }

    fn delete_rule(&self, app_id: &str, rule_id: &str) -> Result<()> {
        let mut state = self.enter(format!("delete_rule {app_id},{rule_id}"))?;
        state
            .rules
            .remove(&(app_id.to_string(), rule_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found("rule", app_id, rule_id))
    }

    fn namespaces(&self, app_id: &str) -> Result<Vec<Namespace>> {
        let state = self.enter(format!("namespaces {app_id}"))?;
        Ok(state
            .namespaces
            .iter()
            .filter(|((app, _), _)| app == app_id)
            .map(|(_, ns)| ns.clone())
            .collect())
    }

    fn create_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        let mut state = self.enter(format!("create_namespace {app_id}"))?;
        let key = (app_id.to_string(), namespace.id.clone());
        if state.namespaces.contains_key(&key) {
            return Err(Error::api(409, 40900, format!("namespace '{}' already exists", namespace.id)));
        }
        state.namespaces.insert(key, namespace.clone());
        Ok(namespace.clone())
    }

    fn update_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        let mut state = self.enter(format!("update_namespace {app_id},{}", namespace.id))?;
        let key = (app_id.to_string(), namespace.id.clone());
        if !state.namespaces.contains_key(&key) {
            return Err(not_found("namespace", app_id, &namespace.id));
        }
        state.namespaces.insert(key, namespace.clone());
        Ok(namespace.clone())
    }

    fn delete_namespace(&self, app_id: &str, namespace_id: &str) -> Result<()> {
        let mut state = self.enter(format!("delete_namespace {app_id},{namespace_id}"))?;
        state
            .namespaces
            .remove(&(app_id.to_string(), namespace_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found("namespace", app_id, namespace_id))
    }
}
