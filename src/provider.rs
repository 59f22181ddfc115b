//! Provider: the set of resource kinds and how to reach the API
//!
//! The CLI addresses kinds by name, so each [`ResourceKind`] is erased
//! behind [`Dispatch`] and looked up in a fixed registry.

use crate::config::ProviderConfig;
use crate::resources::{
    AmqpRuleKind, Client, HttpRuleKind, MongoRuleKind, NamespaceKind, PostgresOutboxRuleKind,
};
use control::HttpClient;
use lifecycle::{Handle, Host, OperationResponse, ProviderState, ResourceKind, Schema, driver};

/// Operations the CLI can run on a kind without knowing its types
pub trait Dispatch {
    fn name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn import_fields(&self) -> &'static [&'static str];
    fn create(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse;
    fn read(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse;
    fn update(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse;
    fn delete(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse;
    fn import(&self, raw_id: &str, host: &mut dyn Host) -> OperationResponse;
}

impl<K> Dispatch for K
where
    K: ResourceKind<Client = Client>,
{
    fn name(&self) -> &'static str {
        ResourceKind::name(self)
    }

    fn schema(&self) -> Schema {
        ResourceKind::schema(self)
    }

    fn import_fields(&self) -> &'static [&'static str] {
        ResourceKind::import_fields(self)
    }

    fn create(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse {
        driver::create(self, &Handle::new(ResourceKind::name(self), provider), host)
    }

    fn read(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse {
        driver::read(self, &Handle::new(ResourceKind::name(self), provider), host)
    }

    fn update(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse {
        driver::update(self, &Handle::new(ResourceKind::name(self), provider), host)
    }

    fn delete(&self, provider: &ProviderState<Client>, host: &mut dyn Host) -> OperationResponse {
        driver::delete(self, &Handle::new(ResourceKind::name(self), provider), host)
    }

    fn import(&self, raw_id: &str, host: &mut dyn Host) -> OperationResponse {
        driver::import(self, raw_id, host)
    }
}

/// Every resource kind this provider manages
pub fn kinds() -> Vec<Box<dyn Dispatch>> {
    vec![
        Box::new(MongoRuleKind::new()),
        Box::new(PostgresOutboxRuleKind::new()),
        Box::new(HttpRuleKind::new()),
        Box::new(AmqpRuleKind::new()),
        Box::new(NamespaceKind),
    ]
}

/// Look up a kind by name
pub fn find(name: &str) -> Option<Box<dyn Dispatch>> {
    kinds().into_iter().find(|k| k.name() == name)
}

/// Build the provider state from configuration
///
/// Without a token the provider stays unconfigured; every operation that
/// needs the API then fails with a "not configured" diagnostic.
pub fn configure(config: &ProviderConfig) -> ProviderState<Client> {
    match config.token.as_deref() {
        Some(token) if !token.is_empty() => {
            log::debug!("Using Control API at {}", config.url);
            let client: Client = Box::new(HttpClient::with_base_url(token, &config.url));
            ProviderState::Configured(client)
        }
        _ => {
            log::debug!("No account token configured");
            ProviderState::Unconfigured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control::MockControlApi;
    use lifecycle::{MemoryHost, OperationState};
    use serde_json::json;

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = kinds().iter().map(|k| k.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_find_kind() {
        assert!(find("ably_rule_http").is_some());
        assert!(find("ably_ingress_rule_postgres_outbox").is_some());
        assert!(find("ably_app").is_none());
    }

    #[test]
    fn test_every_schema_validates() {
        for kind in kinds() {
            assert!(kind.schema().validate().is_ok(), "{} schema invalid", kind.name());
        }
    }

    #[test]
    fn test_dispatch_runs_driver() {
        let mock = MockControlApi::new();
        let provider: ProviderState<Client> = ProviderState::Configured(Box::new(mock.clone()));
        let kind = find("ably_namespace").unwrap();
        let mut host = MemoryHost::new().with_plan(json!({"app_id": "app1", "id": "chat"}));

        let response = kind.create(&provider, &mut host);

        assert_eq!(response.state, OperationState::Success);
        assert_eq!(host.set_state_calls, 1);
    }

    #[test]
    fn test_configure_without_token_is_unconfigured() {
        let config = ProviderConfig::default();
        assert!(!configure(&config).is_configured());

        let config = ProviderConfig {
            token: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(configure(&config).is_configured());
    }
}
