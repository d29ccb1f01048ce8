//! What request shapes share: an action name, a result shape and a bag of
//! per-request overrides that travel beside the fields.

use crate::protocol::query::QueryValue;
use crate::protocol::xml::XmlValue;
use crate::value_object::ValueObject;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-request settings outside the shape's fields. They take no part in
/// equality, hashing, rendering or JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    /// Extra HTTP headers, replacing any header of the same name.
    pub headers: BTreeMap<String, String>,
    /// Extra query parameters in the order they were added. They go after the
    /// shape's own members and replace any pair with the same key.
    pub query_params: Vec<(String, String)>,
    /// API version to send instead of the client's.
    pub api_version: Option<String>,
}

impl RequestOverrides {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.query_params.is_empty() && self.api_version.is_none()
    }
}

/// A request shape the client can send.
pub trait ServiceRequest: ValueObject + QueryValue + Serialize + DeserializeOwned {
    /// Query protocol action name.
    const ACTION: &'static str;
    /// Result shape the service answers with.
    type Output: ValueObject + XmlValue + Serialize + DeserializeOwned;

    fn overrides(&self) -> &RequestOverrides;

    fn overrides_mut(&mut self) -> &mut RequestOverrides;

    fn with_custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides_mut().headers.insert(name.into(), value.into());
        self
    }

    fn with_custom_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides_mut().query_params.push((name.into(), value.into()));
        self
    }

    fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.overrides_mut().api_version = Some(version.into());
        self
    }
}
