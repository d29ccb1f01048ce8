//! EC2 Query protocol marshalling.
//!
//! Members flatten to dotted keys: `Filter.1.Name`, `Filter.1.Value.1`. List
//! indexes start at 1; absent members and empty lists write nothing.

use super::join_key;
use crate::error::Result;
use crate::request::ServiceRequest;
use chrono::{DateTime, SecondsFormat, Utc};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::debug;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// A value that writes itself as one or more query parameters under `key`.
pub trait QueryValue {
    fn write_query(&self, key: &str, params: &mut QueryParams);
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Writes an optional member under `prefix.name`.
    pub fn member<T: QueryValue>(&mut self, prefix: &str, name: &str, value: &Option<T>) {
        if let Some(value) = value {
            value.write_query(&join_key(prefix, name), self);
        }
    }

    /// Drops every pair under `key`.
    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering, in insertion order.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .join("&")
    }
}

impl QueryValue for String {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, self.as_str());
    }
}

impl QueryValue for i32 {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, self.to_string());
    }
}

impl QueryValue for i64 {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, self.to_string());
    }
}

impl QueryValue for f64 {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, self.to_string());
    }
}

impl QueryValue for bool {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, if *self { "true" } else { "false" });
    }
}

impl QueryValue for DateTime<Utc> {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        params.push(key, self.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}

impl<T: QueryValue> QueryValue for Vec<T> {
    fn write_query(&self, key: &str, params: &mut QueryParams) {
        for (i, value) in self.iter().enumerate() {
            value.write_query(&format!("{key}.{}", i + 1), params);
        }
    }
}

/// A request flattened to Query parameters, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub action: String,
    pub version: String,
    /// `Action`, `Version`, the members, then custom parameters.
    pub params: QueryParams,
    pub headers: BTreeMap<String, String>,
}

impl QueryRequest {
    /// Marshals `request`; an API version in its overrides wins over `version`.
    /// Custom parameters replace the pairs they share a key with, `Action` and
    /// `Version` included.
    pub fn marshal<R: ServiceRequest>(request: &R, version: &str) -> Self {
        let overrides = request.overrides();
        let version = overrides.api_version.as_deref().unwrap_or(version);
        let mut params = QueryParams::new();
        params.push("Action", R::ACTION);
        params.push("Version", version);
        request.write_query("", &mut params);
        for (name, _) in &overrides.query_params {
            params.remove(name);
        }
        for (name, value) in &overrides.query_params {
            params.push(name.as_str(), value.as_str());
        }
        let action = params.get("Action").unwrap_or(R::ACTION).to_string();
        let version = params.get("Version").unwrap_or(version).to_string();
        debug!(%action, %version, params = params.len(), "marshalled request");
        QueryRequest { action, version, params, headers: overrides.headers.clone() }
    }

    pub fn body(&self) -> String {
        self.params.encode()
    }

    /// A form POST to `endpoint` carrying the encoded parameters. Custom
    /// headers replace headers of the same name.
    pub fn to_http(&self, endpoint: &str) -> Result<http::Request<String>> {
        let mut request = http::Request::builder().method(Method::POST).uri(endpoint).body(self.body())?;
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?;
            let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
            headers.insert(name, value);
        }
        Ok(request)
    }
}
