//! Resource kind trait for the lifecycle driver
//!
//! A `ResourceKind` is the small capability interface the driver is
//! written against. Each kind supplies how to decode host data, how to
//! translate to and from the API's wire structures, and how to reach the
//! API. The driver body is written once and instantiated per kind.

use crate::error::{ApiError, Error, Result};
use crate::schema::Schema;
use crate::types::ResourceKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Core trait for resource kinds
///
/// # Example
///
/// ```ignore
/// impl ResourceKind for NamespaceKind {
///     type Client = Box<dyn ControlApi>;
///     type Snapshot = Namespace;
///     type Request = control::Namespace;
///     type Response = control::Namespace;
///
///     fn name(&self) -> &'static str { "ably_namespace" }
///     // ...
/// }
/// ```
pub trait ResourceKind {
    /// API client the kind talks to
    type Client;
    /// Normalized, host-visible snapshot
    type Snapshot: Clone + fmt::Debug;
    /// Write request accepted by the API
    type Request: fmt::Debug;
    /// Wire resource returned by the API
    type Response;

    /// Resource kind name, e.g. "ably_rule_http"
    fn name(&self) -> &'static str;

    /// Attribute schema of this kind
    fn schema(&self) -> Schema;

    /// Field order of the import identifier
    fn import_fields(&self) -> &'static [&'static str] {
        &["app_id", "id"]
    }

    /// Decode a host plan into a snapshot
    fn decode_plan(&self, value: &Value) -> Result<Self::Snapshot>;

    /// Decode host state into a snapshot
    fn decode_state(&self, value: &Value) -> Result<Self::Snapshot>;

    /// Encode a snapshot for the host
    fn encode(&self, snapshot: &Self::Snapshot) -> Result<Value>;

    /// Owning application of a snapshot
    fn app_id<'s>(&self, snapshot: &'s Self::Snapshot) -> &'s str;

    /// Lookup key of a snapshot; fails while the id is still unknown
    fn key(&self, snapshot: &Self::Snapshot) -> Result<ResourceKey>;

    /// Lookup key straight from host state
    ///
    /// Needs only the identity attributes, so state holding nothing else
    /// (right after an import) can still be read, updated and deleted.
    fn decode_key(&self, value: &Value) -> Result<ResourceKey> {
        let identity: Identity = decode_value("state", value)?;
        match identity.id {
            Some(id) if !id.is_empty() => Ok(ResourceKey::new(identity.app_id, id)),
            _ => Err(Error::decode("state", "resource id is not known yet")),
        }
    }

    /// Target variant tag of a snapshot, for kinds that carry a target
    fn variant(&self, _snapshot: &Self::Snapshot) -> Option<&'static str> {
        None
    }

    /// Target variant every snapshot of this kind must carry, if fixed
    fn expected_variant(&self) -> Option<&'static str> {
        None
    }

    /// Build a write request from declared values
    fn to_wire(&self, snapshot: &Self::Snapshot) -> Self::Request;

    /// Build a snapshot from an API response, backfilling from `fallback`
    ///
    /// There is no fallback when state holds only identity attributes.
    fn from_wire(
        &self,
        response: Self::Response,
        fallback: Option<&Self::Snapshot>,
    ) -> Result<Self::Snapshot>;

    fn create(
        &self,
        client: &Self::Client,
        app_id: &str,
        request: &Self::Request,
    ) -> std::result::Result<Self::Response, ApiError>;

    fn read(
        &self,
        client: &Self::Client,
        key: &ResourceKey,
    ) -> std::result::Result<Self::Response, ApiError>;

    fn update(
        &self,
        client: &Self::Client,
        key: &ResourceKey,
        request: &Self::Request,
    ) -> std::result::Result<Self::Response, ApiError>;

    fn delete(&self, client: &Self::Client, key: &ResourceKey)
    -> std::result::Result<(), ApiError>;
}

/// Root identity attributes shared by every kind's state
#[derive(Deserialize)]
struct Identity {
    app_id: String,
    #[serde(default)]
    id: Option<String>,
}

/// Decode a JSON value into a typed model, reporting `source_name` on failure
pub fn decode_value<T: DeserializeOwned>(source_name: &'static str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::decode(source_name, e))
}

/// Encode a snapshot into a JSON value
pub fn encode_value<T: Serialize>(snapshot: &T) -> Result<Value> {
    Ok(serde_json::to_value(snapshot)?)
}

/// Find an item by id in a list response
///
/// Used by kinds whose API has no single-item read.
pub fn find_by_id<T, F>(items: Vec<T>, id: &str, id_of: F) -> std::result::Result<T, ApiError>
where
    F: Fn(&T) -> &str,
{
    items
        .into_iter()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| ApiError::not_found(format!("no item with id '{id}' in list response")))
}
