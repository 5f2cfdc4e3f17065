use crate::scene::GalaxyPoint;
use crate::session::{Document, QueryResult, ScoredMatch, SessionId, Source};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

pub mod worker;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Source>>,
    #[serde(default)]
    results: Option<Vec<ScoredMatch>>,
    #[serde(default)]
    query_vector_3d: Option<[f32; 3]>,
}

impl ChatResponse {
    fn into_result(self, query: &str) -> QueryResult {
        QueryResult {
            query: query.to_string(),
            answer: self.answer.unwrap_or_default(),
            sources: self.sources.unwrap_or_default(),
            results: self.results.unwrap_or_default(),
            query_vector_3d: self.query_vector_3d.unwrap_or([0.0, 0.0, 0.0]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ScoredMatch>,
}

/// HTTP boundary to the FoundByMe backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

fn cache_buster() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis().to_string(),
        Err(_) => "0".to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: crate::config::normalize_base_url(&base_url.into()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let response = Self::check_status(response, endpoint)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn check_status(
        response: reqwest::Response,
        endpoint: &'static str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status { endpoint, status })
        }
    }

    /// Sends every file in one multipart request tagged with the session id.
    pub async fn upload(&self, session_id: SessionId, files: &[PathBuf]) -> Result<(), ApiError> {
        let mut form = Form::new();
        for path in files {
            let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
                path: path.clone(),
                source,
            })?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name(path)));
        }
        form = form.text("session_id", session_id.to_string());

        debug!(session_id = %session_id, count = files.len(), "POST /api/upload");
        let response = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response, "/api/upload")?;
        Ok(())
    }

    pub async fn reindex(&self, session_id: SessionId) -> Result<(), ApiError> {
        debug!(session_id = %session_id, "GET /api/reindex");
        let response = self
            .http
            .get(self.url("/api/reindex"))
            .query(&[("session_id", session_id.to_string())])
            .send()
            .await?;
        Self::check_status(response, "/api/reindex")?;
        Ok(())
    }

    pub async fn chat(&self, session_id: SessionId, query: &str) -> Result<QueryResult, ApiError> {
        debug!(session_id = %session_id, "POST /api/chat");
        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&ChatRequest {
                query,
                session_id: session_id.to_string(),
            })
            .send()
            .await?;
        let body: ChatResponse = Self::read_json(response, "/api/chat").await?;
        Ok(body.into_result(query))
    }

    pub async fn documents(&self, session_id: SessionId) -> Result<Vec<Document>, ApiError> {
        debug!(session_id = %session_id, "GET /api/documents");
        let response = self
            .http
            .get(self.url("/api/documents"))
            .query(&[
                ("session_id", session_id.to_string()),
                ("_t", cache_buster()),
            ])
            .send()
            .await?;
        let body: DocumentsResponse = Self::read_json(response, "/api/documents").await?;
        Ok(body.documents)
    }

    pub async fn galaxy(
        &self,
        session_id: SessionId,
        query: Option<&str>,
    ) -> Result<Vec<GalaxyPoint>, ApiError> {
        debug!(session_id = %session_id, has_query = query.is_some(), "GET /api/galaxy");
        let mut params = vec![("session_id", session_id.to_string())];
        if let Some(query) = query {
            params.push(("query", query.to_string()));
        }
        let response = self
            .http
            .get(self.url("/api/galaxy"))
            .query(&params)
            .send()
            .await?;
        Self::read_json(response, "/api/galaxy").await
    }

    pub async fn delete_session(&self, session_id: SessionId) -> Result<(), ApiError> {
        debug!(session_id = %session_id, "DELETE /api/session");
        let response = self
            .http
            .delete(self.url(&format!("/api/session/{session_id}")))
            .send()
            .await?;
        Self::check_status(response, "/api/session")?;
        Ok(())
    }

    pub async fn delete_all_sessions(&self) -> Result<(), ApiError> {
        debug!("DELETE /api/sessions");
        let response = self.http.delete(self.url("/api/sessions")).send().await?;
        Self::check_status(response, "/api/sessions")?;
        Ok(())
    }

    /// Legacy top-k vector search that predates the chat endpoint.
    pub async fn search(&self, query: &str, k: u32) -> Result<Vec<ScoredMatch>, ApiError> {
        debug!(k, "GET /search");
        let response = self
            .http
            .get(self.url("/search"))
            .query(&[("q", query.to_string()), ("k", k.to_string())])
            .send()
            .await?;
        let body: SearchResponse = Self::read_json(response, "/search").await?;
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiClient, ApiError};
    use crate::session::{SessionId, Source};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), Duration::from_secs(5)).expect("client should build")
    }

    #[tokio::test]
    async fn chat_fills_defaults_for_missing_optional_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({"query": "Q", "session_id": "17"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "A", "sources": [{"name": "doc1"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server)
            .chat(SessionId(17), "Q")
            .await
            .expect("chat should succeed");

        assert_eq!(result.query, "Q");
        assert_eq!(result.answer, "A");
        assert_eq!(result.sources, vec![Source::named("doc1")]);
        assert!(result.results.is_empty());
        assert_eq!(result.query_vector_3d, [0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn chat_keeps_detailed_results_and_query_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "A",
                "sources": ["lecture.pdf"],
                "results": [{"id": 1, "score": 0.9, "text": "chunk", "filename": "lecture.pdf", "page": 2}],
                "query_vector_3d": [1.0, -2.0, 0.5]
            })))
            .mount(&server)
            .await;

        let result = client(&server)
            .chat(SessionId(1), "Q")
            .await
            .expect("chat should succeed");

        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].page, Some(2));
        assert_eq!(result.query_vector_3d, [1.0, -2.0, 0.5]);
        assert_eq!(result.sources[0].name, "lecture.pdf");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let error = client(&server)
            .chat(SessionId(1), "Q")
            .await
            .expect_err("500 should fail");

        assert!(matches!(error, ApiError::Status { endpoint: "/api/chat", .. }));
    }

    #[tokio::test]
    async fn documents_sends_session_and_cache_buster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents"))
            .and(query_param("session_id", "99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{"id": "d1", "filename": "os.pdf"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let documents = client(&server)
            .documents(SessionId(99))
            .await
            .expect("documents should load");

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "os.pdf");
        let requests = server
            .received_requests()
            .await
            .expect("request recording should be enabled");
        assert!(requests[0].url.query().unwrap_or_default().contains("_t="));
    }

    #[tokio::test]
    async fn galaxy_passes_optional_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/galaxy"))
            .and(query_param("session_id", "5"))
            .and(query_param("query", "what is paging"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "q", "position": [0.0, 1.0, 2.0], "color": "#FDE047", "label": "what is paging", "isQuery": true},
                {"id": "d", "position": [3.0, 1.0, 2.0], "color": "#F43F5E", "label": "os.pdf", "isQuery": false, "url": "http://files/os.pdf", "page": 12}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let points = client(&server)
            .galaxy(SessionId(5), Some("what is paging"))
            .await
            .expect("galaxy should load");

        assert_eq!(points.len(), 2);
        assert!(points[0].is_query);
        assert_eq!(points[1].page, Some(12));
    }

    #[tokio::test]
    async fn upload_sends_all_files_and_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir should be created");
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.txt");
        std::fs::write(&first, b"pdf bytes").expect("fixture should write");
        std::fs::write(&second, b"txt bytes").expect("fixture should write");

        client(&server)
            .upload(SessionId(7), &[first, second])
            .await
            .expect("upload should succeed");

        let requests = server
            .received_requests()
            .await
            .expect("request recording should be enabled");
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"a.pdf\""));
        assert!(body.contains("filename=\"b.txt\""));
        assert!(body.contains("name=\"session_id\""));
        assert_eq!(body.matches("name=\"files\"").count(), 2);
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let error = client(&server)
            .upload(SessionId(7), &["/definitely/not/here.pdf".into()])
            .await
            .expect_err("missing file should fail");

        assert!(matches!(error, ApiError::Io { .. }));
    }

    #[tokio::test]
    async fn delete_endpoints_use_session_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/session/12"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/sessions"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        api.delete_session(SessionId(12))
            .await
            .expect("single delete should succeed");
        api.delete_all_sessions()
            .await
            .expect("bulk delete should succeed");
    }

    #[tokio::test]
    async fn legacy_search_reads_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "scheduling"))
            .and(query_param("k", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 3, "score": 0.42, "text": "round robin"}]
            })))
            .mount(&server)
            .await;

        let results = client(&server)
            .search("scheduling", 5)
            .await
            .expect("search should succeed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "round robin");
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/galaxy"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let error = client(&server)
            .galaxy(SessionId(1), None)
            .await
            .expect_err("bad body should fail");

        assert!(matches!(error, ApiError::Decode(_)));
    }
}
