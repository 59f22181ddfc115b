//! Host boundary and provider configuration
//!
//! These types allow the lifecycle crate to be used without depending on a
//! specific plan/state host or a specific API client.

use crate::error::{Error, Result};
use crate::types::Diagnostics;
use serde_json::Value;

/// Host that owns plan and state snapshots
///
/// The host is a black box to the engine: it hands out the declared plan
/// and the last persisted state as raw JSON, and accepts new state to
/// persist. Every mutating call returns diagnostics which the engine
/// appends to its own response.
pub trait Host {
    /// Declared values for this evaluation, if any
    fn plan(&self) -> Option<&Value>;

    /// Last persisted values, if any
    fn state(&self) -> Option<&Value>;

    /// Persist a new state snapshot
    fn set_state(&mut self, value: Value) -> Diagnostics;

    /// Drop the resource from persisted state
    fn remove_state(&mut self) -> Diagnostics;

    /// Set a single root attribute on the persisted state
    fn set_attribute(&mut self, name: &str, value: Value) -> Diagnostics;
}

/// Configuration state of the provider
///
/// Passed explicitly into every operation instead of being read from a
/// shared flag.
#[derive(Debug, Clone)]
pub enum ProviderState<C> {
    /// No API client is available
    Unconfigured,
    /// A configured API client
    Configured(C),
}

impl<C> ProviderState<C> {
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Get the client, or `Error::NotConfigured`
    pub fn client(&self) -> Result<&C> {
        match self {
            Self::Configured(client) => Ok(client),
            Self::Unconfigured => Err(Error::NotConfigured),
        }
    }
}

impl<C> From<Option<C>> for ProviderState<C> {
    fn from(client: Option<C>) -> Self {
        match client {
            Some(c) => Self::Configured(c),
            None => Self::Unconfigured,
        }
    }
}

/// Capability bundle handed to the driver for one operation
pub struct Handle<'a, C> {
    name: &'static str,
    provider: &'a ProviderState<C>,
}

impl<'a, C> Handle<'a, C> {
    pub fn new(name: &'static str, provider: &'a ProviderState<C>) -> Self {
        Self { name, provider }
    }

    /// Resource kind name, e.g. "ably_rule_http"
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn client(&self) -> Result<&'a C> {
        self.provider.client()
    }
}

/// In-memory host that records every call
///
/// Used by tests and by callers that drive the engine without a
/// persistent backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub plan: Option<Value>,
    pub state: Option<Value>,
    /// Number of `set_state` calls
    pub set_state_calls: usize,
    /// Number of `remove_state` calls
    pub remove_state_calls: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan: Value) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

impl Host for MemoryHost {
    fn plan(&self) -> Option<&Value> {
        self.plan.as_ref()
    }

    fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    fn set_state(&mut self, value: Value) -> Diagnostics {
        self.set_state_calls += 1;
        self.state = Some(value);
        Diagnostics::new()
    }

    fn remove_state(&mut self) -> Diagnostics {
        self.remove_state_calls += 1;
        self.state = None;
        Diagnostics::new()
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Diagnostics {
        let state = self
            .state
            .get_or_insert_with(|| Value::Object(serde_json::Map::new()));
        match state.as_object_mut() {
            Some(obj) => {
                obj.insert(name.to_string(), value);
                Diagnostics::new()
            }
            None => {
                let mut diags = Diagnostics::new();
                diags.add_error(
                    "Invalid state",
                    format!("cannot set attribute '{name}' on non-object state"),
                );
                diags
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unconfigured_provider_reports_not_configured() {
        let provider: ProviderState<()> = ProviderState::Unconfigured;
        let handle = Handle::new("ably_namespace", &provider);
        assert!(!handle.is_configured());
        assert_eq!(handle.client().unwrap_err(), Error::NotConfigured);
    }

    #[test]
    fn test_configured_provider_hands_out_client() {
        let provider = ProviderState::from(Some(42_u8));
        let handle = Handle::new("ably_namespace", &provider);
        assert_eq!(*handle.client().unwrap(), 42);
        assert_eq!(handle.name(), "ably_namespace");
    }

    #[test]
    fn test_memory_host_set_attribute_creates_object() {
        let mut host = MemoryHost::new();
        let diags = host.set_attribute("app_id", json!("app1"));
        assert!(diags.is_empty());
        assert_eq!(host.state, Some(json!({"app_id": "app1"})));
    }

    #[test]
    fn test_memory_host_counts_calls() {
        let mut host = MemoryHost::new().with_state(json!({"id": "x"}));
        host.set_state(json!({"id": "y"}));
        host.remove_state();
        assert_eq!(host.set_state_calls, 1);
        assert_eq!(host.remove_state_calls, 1);
        assert!(host.state.is_none());
    }
}
