//! GraphQL request plumbing.
//!
//! Components that query the API depend on [`QueryTransport`] rather than on
//! the HTTP client, so the paging and parsing logic can run against an
//! in-memory transport.

use async_trait::async_trait;
use gh_blob_core::{BlobError, BlobResult, GraphQlEnvelope};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GitHubClient;

const ACCEPT_JSON: &str = "application/json";

/// A GraphQL operation ready to send.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Value,
    pub operation_name: String,
    /// Send the feature-flag header with this request
    #[serde(skip)]
    pub features: bool,
    #[serde(skip)]
    pub accept: String,
}

impl GraphQlRequest {
    pub fn new(operation_name: &str, query: &str, variables: Value) -> Self {
        Self {
            query: query.to_string(),
            variables,
            operation_name: operation_name.to_string(),
            features: false,
            accept: ACCEPT_JSON.to_string(),
        }
    }

    pub fn with_features(mut self) -> Self {
        self.features = true;
        self
    }

    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = accept.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Executes GraphQL operations and returns the `data` object.
///
/// Implementations surface a non-200 status or a non-empty `errors` array as
/// [`BlobError::Remote`].
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> BlobResult<Value>;
}

#[async_trait]
impl<T: QueryTransport + ?Sized> QueryTransport for &T {
    async fn execute(&self, request: GraphQlRequest) -> BlobResult<Value> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl QueryTransport for GitHubClient {
    async fn execute(&self, request: GraphQlRequest) -> BlobResult<Value> {
        let operation = request.operation_name.clone();
        let url = self.config().graphql_url();

        let builder = if request.features {
            self.feature_request(Method::POST, &url)
        } else {
            self.request(Method::POST, &url)
        };
        let builder = builder
            .header(ACCEPT, request.accept.as_str())
            .json(&request);

        let response = self
            .send_expecting(&operation, builder, StatusCode::OK)
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| BlobError::transport(operation.as_str(), e))?;

        extract_data(&operation, &body, self.config().envelope)
    }
}

/// Pull the data object out of a 200 response body.
///
/// The envelope shape is fixed by configuration: `Wrapped` reads `data`,
/// `Bare` takes the body itself. A non-empty top-level `errors` array is a
/// remote failure in both shapes; the first message is reported.
pub fn extract_data(operation: &str, body: &str, envelope: GraphQlEnvelope) -> BlobResult<Value> {
    let mut value: Value =
        serde_json::from_str(body).map_err(|e| BlobError::decode(operation, e))?;

    if let Some(errors) = value.get("errors").filter(|e| !e.is_null()) {
        let errors: Vec<GraphQlError> = serde_json::from_value(errors.clone())
            .map_err(|e| BlobError::decode(operation, e))?;
        if let Some(first) = errors.into_iter().next() {
            return Err(BlobError::remote(operation, StatusCode::OK.as_u16(), first.message));
        }
    }

    match envelope {
        GraphQlEnvelope::Wrapped => match value.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(BlobError::protocol(operation, "response carried no data")),
        },
        GraphQlEnvelope::Bare => Ok(value),
    }
}

/// Decode a typed view of a data object.
pub fn decode<T: DeserializeOwned>(operation: &str, data: Value) -> BlobResult<T> {
    serde_json::from_value(data).map_err(|e| BlobError::decode(operation, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapped_envelope_reads_data() {
        let body = r#"{"data":{"organization":{"login":"acme"}}}"#;
        let data = extract_data("op", body, GraphQlEnvelope::Wrapped).unwrap();
        assert_eq!(data, json!({"organization": {"login": "acme"}}));
    }

    #[test]
    fn bare_envelope_is_the_data() {
        let body = r#"{"organization":{"login":"acme"}}"#;
        let data = extract_data("op", body, GraphQlEnvelope::Bare).unwrap();
        assert_eq!(data, json!({"organization": {"login": "acme"}}));
    }

    #[test]
    fn first_error_message_is_reported() {
        let body = r#"{"data":null,"errors":[{"message":"Could not resolve to a node"},{"message":"second"}]}"#;
        let err = extract_data("QueryBlob", body, GraphQlEnvelope::Wrapped).unwrap_err();
        match err {
            BlobError::Remote { status, body, operation } => {
                assert_eq!(status, 200);
                assert_eq!(body, "Could not resolve to a node");
                assert_eq!(operation, "QueryBlob");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn empty_errors_array_is_not_an_error() {
        let body = r#"{"data":{"ok":true},"errors":[]}"#;
        assert!(extract_data("op", body, GraphQlEnvelope::Wrapped).is_ok());
    }

    #[test]
    fn missing_data_is_protocol_error() {
        let err = extract_data("op", r#"{"data":null}"#, GraphQlEnvelope::Wrapped).unwrap_err();
        assert!(matches!(err, BlobError::Protocol { .. }));
    }

    #[test]
    fn request_serializes_operation_name() {
        let request = GraphQlRequest::new("AllBlobs", "query AllBlobs { x }", json!({"first": 50}))
            .with_features();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["operationName"], "AllBlobs");
        assert_eq!(value["variables"]["first"], 50);
        assert!(value.get("features").is_none());
    }
}
