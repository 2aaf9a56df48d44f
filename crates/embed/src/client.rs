use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::format;
use crate::response::EmbeddingPayload;
use crate::{EmbedError, EmbedResult};

/// Default address of the embedding service.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080";

const DEFAULT_SUBPATH: &str = "/embed";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model identifier sent with every request.
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Endpoint subpath, resolved against `base_url`. `None` means the base
    /// URL itself is the endpoint.
    #[serde(default = "default_subpath")]
    pub subpath: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra request headers; on a name collision they win over the default
    /// `Content-Type`.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

fn default_base_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_subpath() -> Option<String> {
    Some(DEFAULT_SUBPATH.to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl EmbeddingConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: default_base_url(),
            subpath: default_subpath(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: None,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Client for a self-hosted text-embedding service.
///
/// Every call opens its own connection and drops it once the response is
/// read; concurrent calls share nothing. A slow service blocks the caller
/// for up to the configured timeout, then the transport error surfaces.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    model: String,
    endpoint: Url,
    timeout: Duration,
    headers: HeaderMap,
}

impl EmbeddingClient {
    /// Validates the endpoint and the extra headers up front; a bad URL or
    /// header never makes it to a request.
    pub fn new(config: EmbeddingConfig) -> EmbedResult<Self> {
        let subpath = config.subpath.as_deref().unwrap_or("").trim();
        let endpoint = Url::parse(&config.base_url)?.join(subpath)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(extra) = &config.headers {
            for (name, value) in extra {
                let header_name: HeaderName = name
                    .parse()
                    .map_err(|_| EmbedError::Header(name.clone()))?;
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| EmbedError::Header(name.clone()))?;
                headers.insert(header_name, header_value);
            }
        }

        Ok(Self {
            model: config.model,
            endpoint,
            timeout: Duration::from_secs(config.timeout_secs),
            headers,
        })
    }

    /// Embed one text, blocking until the service answers or the timeout
    /// elapses.
    pub fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        debug!(endpoint = %self.endpoint, model = %self.model, "requesting embedding");

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let body: Value = client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()?
            .error_for_status()?
            .json()?;

        Ok(EmbeddingPayload::decode(body)?.into_vector())
    }

    /// Async equivalent of [`embed`](Self::embed).
    pub async fn embed_async(&self, text: &str) -> EmbedResult<Vec<f32>> {
        debug!(endpoint = %self.endpoint, model = %self.model, "requesting embedding");

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let body: Value = client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(EmbeddingPayload::decode(body)?.into_vector())
    }

    /// Embed a retrieval query, with the model's query instruction applied.
    pub fn query_embedding(&self, query: &str) -> EmbedResult<Vec<f32>> {
        self.embed(&format::format_query(&self.model, query))
    }

    /// Embed a document text, with the model's document formatting applied.
    pub fn text_embedding(&self, text: &str) -> EmbedResult<Vec<f32>> {
        self.embed(&format::format_text(&self.model, text))
    }

    pub async fn query_embedding_async(&self, query: &str) -> EmbedResult<Vec<f32>> {
        self.embed_async(&format::format_query(&self.model, query))
            .await
    }

    pub async fn text_embedding_async(&self, text: &str) -> EmbedResult<Vec<f32>> {
        self.embed_async(&format::format_text(&self.model, text))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server_url: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: server_url.to_string(),
            ..EmbeddingConfig::new("bge-large-en")
        }
    }

    #[tokio::test]
    async fn flat_response_is_returned_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"input": "hello", "model": "bge-large-en"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.1, 0.2, 0.3])))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        let vector = client.embed_async("hello").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn wrapped_response_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"embedding": [0.4, 0.5]}]})),
            )
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        let vector = client.embed_async("hello").await.unwrap();

        assert_eq!(vector, vec![0.4, 0.5]);
    }

    #[tokio::test]
    async fn unexpected_object_shape_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": 1})))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        let err = client.embed_async("hello").await.unwrap_err();

        assert!(matches!(err, EmbedError::MissingField("data")));
    }

    #[tokio::test]
    async fn error_status_surfaces_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        let err = client.embed_async("hello").await.unwrap_err();

        assert!(matches!(err, EmbedError::Http(_)));
    }

    #[tokio::test]
    async fn subpath_resolves_against_the_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(EmbeddingConfig {
            subpath: Some("/v1/embed".to_string()),
            ..config(&server.uri())
        })
        .unwrap();

        assert!(client.embed_async("hello").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn extra_headers_reach_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(EmbeddingConfig {
            headers: Some(HashMap::from([(
                "x-api-key".to_string(),
                "secret".to_string(),
            )])),
            ..config(&server.uri())
        })
        .unwrap();

        assert!(client.embed_async("hello").await.is_ok());
    }

    #[tokio::test]
    async fn extra_headers_win_a_content_type_collision() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/vnd.embed+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(EmbeddingConfig {
            headers: Some(HashMap::from([(
                "content-type".to_string(),
                "application/vnd.embed+json".to_string(),
            )])),
            ..config(&server.uri())
        })
        .unwrap();

        assert!(client.embed_async("hello").await.is_ok());
    }

    #[tokio::test]
    async fn query_embedding_applies_the_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "input": "Represent this sentence for searching relevant passages: find orders",
                "model": "bge-large-en",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.1])))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        assert_eq!(
            client.query_embedding_async("find orders").await.unwrap(),
            vec![0.1]
        );
    }

    #[test]
    fn blocking_embed_round_trips() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/embed"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.1, 0.2])))
                .mount(&server),
        );

        let client = EmbeddingClient::new(config(&server.uri())).unwrap();
        assert_eq!(client.embed("hello").unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn invalid_base_url_fails_at_construction() {
        let err = EmbeddingClient::new(EmbeddingConfig {
            base_url: "not a url".to_string(),
            ..EmbeddingConfig::new("bge-large-en")
        })
        .unwrap_err();

        assert!(matches!(err, EmbedError::Endpoint(_)));
    }

    #[test]
    fn invalid_header_name_fails_at_construction() {
        let err = EmbeddingClient::new(EmbeddingConfig {
            headers: Some(HashMap::from([(
                "bad header".to_string(),
                "v".to_string(),
            )])),
            ..EmbeddingConfig::new("bge-large-en")
        })
        .unwrap_err();

        assert!(matches!(err, EmbedError::Header(_)));
    }

    #[test]
    fn missing_subpath_falls_back_to_the_base_url() {
        let client = EmbeddingClient::new(EmbeddingConfig {
            subpath: None,
            ..EmbeddingConfig::new("bge-large-en")
        })
        .unwrap();

        assert_eq!(client.endpoint.as_str(), "http://127.0.0.1:8080/");
    }
}
