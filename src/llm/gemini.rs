//! Google Gemini client (`generateContent`).

use serde::{Deserialize, Serialize};

use super::{send_error, LlmClient, LlmError};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini REST client.
///
/// The API key is sent as-is. An empty or wrong key is not rejected here;
/// it surfaces as `LlmError::Authentication` on the first call.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(DEFAULT_GEMINI_URL, api_key, timeout_secs)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model)
    }
}

/// Text of the first candidate; empty when the model produced nothing.
fn first_candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

impl LlmClient for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = self.endpoint(model);
        tracing::debug!(url = %url, "Gemini generateContent");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| send_error(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LlmError::Authentication(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.without_url().to_string()))?;

        Ok(first_candidate_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_does_not_embed_key() {
        let client = GeminiClient::new("secret-key", 5).unwrap();
        let url = client.endpoint("gemini-1.5-flash");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert!(!url.contains("secret-key"));
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn concatenates_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "Typoiad is "}, {"text": "caused by poor sanitation."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            first_candidate_text(response),
            "Typoiad is caused by poor sanitation."
        );
    }

    #[test]
    fn no_candidates_yields_empty_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_candidate_text(response), "");

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(first_candidate_text(blocked), "");
    }

    // ── Transport against a local stub ───────────────────────

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve_stub(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn generate_blocking(addr: SocketAddr, api_key: &str) -> Result<String, LlmError> {
        let base = format!("http://{addr}/models");
        let api_key = api_key.to_string();
        tokio::task::spawn_blocking(move || {
            GeminiClient::with_base_url(&base, &api_key, 5)?.generate("gemini-1.5-flash", "hello")
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_key_as_query_and_reads_candidate() {
        let seen: Arc<Mutex<Vec<(String, String, serde_json::Value)>>> = Arc::default();
        let sink = seen.clone();
        let app = Router::new().route(
            "/models/:call",
            post(
                move |Path(call): Path<String>,
                      Query(query): Query<HashMap<String, String>>,
                      Json(body): Json<serde_json::Value>| {
                    let sink = sink.clone();
                    async move {
                        let key = query.get("key").cloned().unwrap_or_default();
                        sink.lock().unwrap().push((call, key, body));
                        Json(serde_json::json!({
                            "candidates": [{"content": {"parts": [{"text": "Poor "}, {"text": "sanitation."}]}}]
                        }))
                    }
                },
            ),
        );
        let addr = serve_stub(app).await;

        let text = generate_blocking(addr, "test-key").await.unwrap();
        assert_eq!(text, "Poor sanitation.");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "gemini-1.5-flash:generateContent");
        assert_eq!(seen[0].1, "test-key");
        assert_eq!(seen[0].2["contents"][0]["parts"][0]["text"], "hello");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_key_is_authentication_error() {
        let app = Router::new().route(
            "/models/:call",
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let addr = serve_stub(app).await;

        let result = generate_blocking(addr, "").await;
        assert!(matches!(result, Err(LlmError::Authentication(403))), "{result:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_error_keeps_status_and_body() {
        let app = Router::new().route(
            "/models/:call",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let addr = serve_stub(app).await;

        match generate_blocking(addr, "k").await {
            Err(LlmError::Service { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }
}
