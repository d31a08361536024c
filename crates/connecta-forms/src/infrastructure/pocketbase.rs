//! PocketBase REST client
//!
//! Implements [`RecordStore`] over the PocketBase HTTP API. Requests are never
//! retried: a create that timed out may still have been stored.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::StoreError;
use crate::ports::{AuthSession, BatchCreate, ListQuery, Record, RecordPage, RecordStore};

pub const DEFAULT_BASE_URL: &str = "https://api.worldofconnecta.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PocketBaseConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PocketBaseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Error body returned by PocketBase.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: BTreeMap<String, FieldError>,
}

#[derive(Debug, Default, Deserialize)]
struct FieldError {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    method: &'static str,
    url: String,
    body: &'a Value,
}

#[derive(Deserialize)]
struct BatchResult {
    status: u16,
}

pub struct PocketBaseClient {
    base: Url,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl PocketBaseClient {
    pub fn new(config: PocketBaseConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| StoreError::Network(format!("invalid base URL {}: {}", config.base_url, e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            base,
            http,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Token of the last successful authentication.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("base URL cannot hold a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn records_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.url(&["api", "collections", collection, "records"])
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, StoreError> {
        debug!(method = %method, url = %url, "PocketBase request");
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = self.token() {
            request = request.header(header::AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()));
        }
        Err(error_from(status, &bytes, url.path()))
    }
}

fn error_from(status: StatusCode, bytes: &[u8], path: &str) -> StoreError {
    let body: ErrorBody = serde_json::from_slice(bytes).unwrap_or_default();
    warn!(status = status.as_u16(), path = %path, message = %body.message, "PocketBase error response");
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(if body.message.is_empty() {
            path.to_string()
        } else {
            body.message
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if body.data.is_empty() => {
            StoreError::Unauthorized(body.message)
        }
        _ => StoreError::Rejected {
            status: status.as_u16(),
            message: body.message,
            fields: body
                .data
                .into_iter()
                .filter(|(_, e)| !e.message.is_empty())
                .map(|(field, e)| (field, e.message))
                .collect(),
        },
    }
}

#[async_trait]
impl RecordStore for PocketBaseClient {
    async fn create(&self, collection: &str, payload: &Value) -> Result<Record, StoreError> {
        let url = self.records_url(collection)?;
        let record: Record = self.send(Method::POST, url, Some(payload)).await?;
        info!(collection = %collection, id = %record.id, "Record created");
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, payload: &Value) -> Result<Record, StoreError> {
        let url = self.url(&["api", "collections", collection, "records", id])?;
        let record: Record = self.send(Method::PATCH, url, Some(payload)).await?;
        info!(collection = %collection, id = %record.id, "Record updated");
        Ok(record)
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let mut url = self.records_url(collection)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("perPage", &query.per_page.to_string());
            if let Some(sort) = &query.sort {
                pairs.append_pair("sort", sort);
            }
            if let Some(filter) = &query.filter {
                pairs.append_pair("filter", &filter.to_expression());
            }
        }
        self.send(Method::GET, url, None::<&Value>).await
    }

    async fn authenticate(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthSession, StoreError> {
        let url = self.url(&["api", "collections", collection, "auth-with-password"])?;
        let body = json!({ "identity": identity, "password": password });
        let session: AuthSession = self.send(Method::POST, url, Some(&body)).await?;
        *self.token.write() = Some(session.token.clone());
        info!(collection = %collection, id = %session.record.id, "Authenticated");
        Ok(session)
    }

    async fn batch_create(&self, requests: &[BatchCreate]) -> Result<usize, StoreError> {
        let url = self.url(&["api", "batch"])?;
        let batch: Vec<BatchRequest<'_>> = requests
            .iter()
            .map(|r| BatchRequest {
                method: "POST",
                url: format!("/api/collections/{}/records", r.collection),
                body: &r.body,
            })
            .collect();
        let results: Vec<BatchResult> = self
            .send(Method::POST, url, Some(&json!({ "requests": batch })))
            .await?;
        Ok(results.iter().filter(|r| (200..300).contains(&r.status)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Filter;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PocketBaseClient {
        PocketBaseClient::new(PocketBaseConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/collections/users/records"))
            .and(body_json(json!({ "name": "Mona Adel" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123",
                "collectionName": "users",
                "created": "2025-03-04 10:11:12.123Z",
                "name": "Mona Adel"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client(&server)
            .create("users", &json!({ "name": "Mona Adel" }))
            .await
            .unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.str_field("name"), Some("Mona Adel"));
    }

    #[tokio::test]
    async fn test_field_errors_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "message": "Failed to create record.",
                "data": { "phoneNumber": { "code": "validation_not_unique", "message": "Value must be unique." } }
            })))
            .mount(&server)
            .await;

        let err = client(&server).create("users", &json!({})).await.unwrap_err();
        let StoreError::Rejected { status, message, fields } = err else {
            panic!("expected a rejection");
        };
        assert_eq!(status, 400);
        assert_eq!(message, "Failed to create record.");
        assert_eq!(fields.get("phoneNumber").map(String::as_str), Some("Value must be unique."));
    }

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 404, "message": "Missing collection context.", "data": {}
            })))
            .mount(&server)
            .await;

        let err = client(&server).create("game_developers", &json!({})).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("Missing collection context.".into()));
    }

    #[tokio::test]
    async fn test_list_sends_query_and_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/users/records"))
            .and(query_param("page", "1"))
            .and(query_param("perPage", "50"))
            .and(query_param("sort", "-created"))
            .and(query_param("filter", "phoneNumber = \"201012345678\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1, "perPage": 50, "totalItems": 1, "totalPages": 1,
                "items": [{ "id": "u1", "phoneNumber": "201012345678" }]
            })))
            .mount(&server)
            .await;

        let page = client(&server)
            .list(
                "users",
                &ListQuery {
                    page: 1,
                    per_page: 50,
                    sort: Some("-created".into()),
                    filter: Some(Filter::eq("phoneNumber", "201012345678")),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, "u1");
    }

    #[tokio::test]
    async fn test_auth_token_sent_afterwards() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/collections/admins/auth-with-password"))
            .and(body_json(json!({ "identity": "admin@connecta.com", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt-token",
                "record": { "id": "a1", "email": "admin@connecta.com" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/collections/users/records"))
            .and(header("Authorization", "jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1, "perPage": 30, "totalItems": 0, "totalPages": 0, "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.authenticate("admins", "admin@connecta.com", "secret").await.unwrap();
        assert_eq!(client.token().as_deref(), Some("jwt-token"));
        client.list("users", &ListQuery::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_counts_successes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/batch"))
            .and(body_json(json!({ "requests": [
                { "method": "POST", "url": "/api/collections/schools/records", "body": { "en_name": "A" } },
                { "method": "POST", "url": "/api/collections/universities/records", "body": { "en_name": "B" } }
            ]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "status": 200, "body": { "id": "s1" } },
                { "status": 400, "body": {} }
            ])))
            .mount(&server)
            .await;

        let created = client(&server)
            .batch_create(&[
                BatchCreate { collection: "schools".into(), body: json!({ "en_name": "A" }) },
                BatchCreate { collection: "universities".into(), body: json!({ "en_name": "B" }) },
            ])
            .await
            .unwrap();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = PocketBaseClient::new(PocketBaseConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let err = client.create("users", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
        assert_eq!(err.status(), 0);
    }
}
