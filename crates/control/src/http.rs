//! Blocking HTTP implementation of [`ControlApi`].
//!
//! Every request carries the account token as a bearer credential. Non-2xx
//! responses are decoded from the API's error body into [`Error::Api`] so
//! the status survives for classification.

use crate::api::ControlApi;
use crate::error::{Error, Result};
use crate::types::{ErrorBody, Namespace, NewRule, Rule};
use log::{debug, trace};
use serde::de::DeserializeOwned;
use ureq::Body;
use ureq::http::Response;
use url::Url;

/// Default Control API endpoint.
pub const DEFAULT_URL: &str = "https://control.ably.net/v1";

/// Sent as the User-Agent header.
const USER_AGENT: &str = concat!("ablyform/", env!("CARGO_PKG_VERSION"));

/// Control API client.
///
/// # Example
///
/// ```no_run
/// use control::{ControlApi, HttpClient};
///
/// let client = HttpClient::new("token");
/// let namespaces = client.namespaces("app1").unwrap();
/// println!("Found {} namespaces", namespaces.len());
/// ```
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl HttpClient {
    /// Create a client for the default endpoint.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, DEFAULT_URL)
    }

    /// Create a client for a custom endpoint (staging, local mocks).
    #[must_use]
    pub fn with_base_url(token: &str, base_url: impl Into<String>) -> Self {
        // Error statuses are decoded from the body instead of surfacing as
        // opaque transport errors
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        let base_url: String = base_url.into();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {token}"),
        }
    }

    /// Get the current base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Other(format!("invalid Control API URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| Error::Other(format!("Control API URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn rules_url(&self, app_id: &str) -> Result<String> {
        self.endpoint(&["apps", app_id, "rules"])
    }

    fn rule_url(&self, app_id: &str, rule_id: &str) -> Result<String> {
        self.endpoint(&["apps", app_id, "rules", rule_id])
    }

    fn namespaces_url(&self, app_id: &str) -> Result<String> {
        self.endpoint(&["apps", app_id, "namespaces"])
    }

    fn namespace_url(&self, app_id: &str, namespace_id: &str) -> Result<String> {
        self.endpoint(&["apps", app_id, "namespaces", namespace_id])
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", USER_AGENT)
            .call()?;
        read_json(response)
    }

    fn post<B: serde::Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        debug!("POST {url}");
        let response = self
            .agent
            .post(url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", USER_AGENT)
            .send_json(body)?;
        read_json(response)
    }

    fn patch<B: serde::Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        debug!("PATCH {url}");
        let response = self
            .agent
            .patch(url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", USER_AGENT)
            .send_json(body)?;
        read_json(response)
    }

    fn delete(&self, url: &str) -> Result<()> {
        debug!("DELETE {url}");
        let response = self
            .agent
            .delete(url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", USER_AGENT)
            .call()?;
        check_status(response).map(|_| ())
    }
}

/// Turn an error status into [`Error::Api`], passing successful responses through.
fn check_status(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.body_mut().read_to_string().unwrap_or_default();
    trace!("error body: {text}");
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = if body.message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.message
    };
    Err(Error::api(status.as_u16(), body.code, message))
}

fn read_json<T: DeserializeOwned>(response: Response<Body>) -> Result<T> {
    let mut response = check_status(response)?;
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::InvalidResponse(e.to_string()))?;
    trace!("response body: {text}");
    Ok(serde_json::from_str(&text)?)
}

impl ControlApi for HttpClient {
    fn create_rule(&self, app_id: &str, rule: &NewRule) -> Result<Rule> {
        self.post(&self.rules_url(app_id)?, rule)
    }

    fn rule(&self, app_id: &str, rule_id: &str) -> Result<Rule> {
        self.get(&self.rule_url(app_id, rule_id)?)
    }

    fn update_rule(&self, app_id: &str, rule_id: &str, rule: &NewRule) -> Result<Rule> {
        self.patch(&self.rule_url(app_id, rule_id)?, rule)
    }

    fn delete_rule(&self, app_id: &str, rule_id: &str) -> Result<()> {
        self.delete(&self.rule_url(app_id, rule_id)?)
    }

    fn namespaces(&self, app_id: &str) -> Result<Vec<Namespace>> {
        self.get(&self.namespaces_url(app_id)?)
    }

    fn create_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        self.post(&self.namespaces_url(app_id)?, namespace)
    }

    fn update_namespace(&self, app_id: &str, namespace: &Namespace) -> Result<Namespace> {
        self.patch(&self.namespace_url(app_id, &namespace.id)?, namespace)
    }

    fn delete_namespace(&self, app_id: &str, namespace_id: &str) -> Result<()> {
        self.delete(&self.namespace_url(app_id, namespace_id)?)
    }
}
