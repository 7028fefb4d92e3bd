//! REST key-value backend (Upstash protocol).
//!
//! Every command is a `POST` to the endpoint root with the command and its
//! arguments as a JSON array, authenticated with a bearer token. Replies
//! are `{"result": ...}` on success and `{"error": "..."}` on failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::KvConfig;
use crate::error::KvError;
use crate::store::{KvStore, expiry_secs};

/// Reply envelope of the REST protocol.
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// A key-value store reached over HTTP.
pub struct RestKvStore {
    client: Client,
    config: KvConfig,
}

impl RestKvStore {
    /// Creates a new REST store from its configuration.
    pub fn new(config: KvConfig) -> Result<Self, KvError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bufete-kv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KvError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &KvConfig {
        &self.config
    }

    /// Sends one command and returns its `result` value.
    async fn command(&self, args: &[&str]) -> Result<Value, KvError> {
        let name = args.first().copied().unwrap_or_default();

        let response = self
            .client
            .post(self.config.url())
            .bearer_auth(self.config.token())
            .json(args)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        match serde_json::from_str::<CommandReply>(&body) {
            Ok(CommandReply {
                error: Some(message),
                ..
            }) => {
                warn!(command = %name, status = status.as_u16(), error = %message, "KV command rejected");
                Err(KvError::command(name, message))
            },
            Ok(reply) if status.is_success() => {
                debug!(command = %name, "KV command succeeded");
                Ok(reply.result.unwrap_or(Value::Null))
            },
            Err(e) if status.is_success() => Err(KvError::unexpected(name, e.to_string())),
            _ => Err(KvError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> KvError {
        if error.is_timeout() {
            KvError::Timeout {
                millis: self.config.timeout().as_millis() as u64,
            }
        } else {
            KvError::Http(error.to_string())
        }
    }
}

fn expect_ok(command: &str, value: Value) -> Result<(), KvError> {
    match value {
        Value::String(s) if s == "OK" => Ok(()),
        other => Err(KvError::unexpected(command, format!("expected OK, got {}", other))),
    }
}

fn expect_integer(command: &str, value: Value) -> Result<i64, KvError> {
    value
        .as_i64()
        .ok_or_else(|| KvError::unexpected(command, format!("expected integer, got {}", value)))
}

#[async_trait]
impl KvStore for RestKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(KvError::unexpected("GET", format!("expected string, got {}", other))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let reply = match ttl {
            Some(ttl) => {
                let secs = expiry_secs(ttl).to_string();
                self.command(&["SET", key, value, "EX", &secs]).await?
            },
            None => self.command(&["SET", key, value]).await?,
        };

        expect_ok("SET", reply)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, KvError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut args = Vec::with_capacity(keys.len() + 1);
        args.push("DEL");
        args.extend(keys.iter().map(String::as_str));

        let deleted = expect_integer("DEL", self.command(&args).await?)?;
        Ok(deleted.max(0) as u64)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        match self.command(&["KEYS", pattern]).await? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(KvError::unexpected(
                        "KEYS",
                        format!("expected string key, got {}", other),
                    )),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(KvError::unexpected("KEYS", format!("expected array, got {}", other))),
        }
    }

    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        expect_integer("INCR", self.command(&["INCR", key]).await?)
    }

    async fn flush_all(&self) -> Result<(), KvError> {
        expect_ok("FLUSHALL", self.command(&["FLUSHALL"]).await?)
    }

    async fn ping(&self) -> Result<(), KvError> {
        match self.command(&["PING"]).await? {
            Value::String(s) if s == "PONG" => Ok(()),
            other => Err(KvError::unexpected("PING", format!("expected PONG, got {}", other))),
        }
    }

    fn name(&self) -> &str {
        "rest"
    }
}

impl std::fmt::Debug for RestKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestKvStore")
            .field("url", &self.config.url())
            .field("timeout", &self.config.timeout())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use serde_json::json;

    fn store(server: &MockServer) -> RestKvStore {
        let config = KvConfig::builder()
            .url(server.base_url())
            .token("test-token")
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        RestKvStore::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_hit_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/")
                    .header("authorization", "Bearer test-token")
                    .json_body(json!(["GET", "public-blog-posts"]));
                then.status(200).json_body(json!({"result": "{\"success\":true}"}));
            })
            .await;

        let value = store(&server).get("public-blog-posts").await.unwrap();

        mock.assert_async().await;
        assert_eq!(value.as_deref(), Some("{\"success\":true}"));
    }

    #[tokio::test]
    async fn test_get_miss_returns_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").json_body(json!(["GET", "missing"]));
                then.status(200).json_body(json!({"result": null}));
            })
            .await;

        assert!(store(&server).get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_sends_expiry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .json_body(json!(["SET", "k", "v", "EX", "1800"]));
                then.status(200).json_body(json!({"result": "OK"}));
            })
            .await;

        store(&server)
            .set("k", "v", Some(Duration::from_secs(1800)))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_command_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(400)
                    .json_body(json!({"error": "ERR value is not an integer or out of range"}));
            })
            .await;

        let error = store(&server).incr("rate-limit:1.2.3.4").await.unwrap_err();

        assert!(matches!(error, KvError::Command { ref command, .. } if command == "INCR"));
    }

    #[tokio::test]
    async fn test_status_without_error_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(503).body("upstream unavailable");
            })
            .await;

        let error = store(&server).get("k").await.unwrap_err();

        assert!(matches!(error, KvError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_keys_and_del() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").json_body(json!(["KEYS", "blog:*"]));
                then.status(200)
                    .json_body(json!({"result": ["blog:1", "blog:2"]}));
            })
            .await;
        let del = server
            .mock_async(|when, then| {
                when.method("POST")
                    .json_body(json!(["DEL", "blog:1", "blog:2"]));
                then.status(200).json_body(json!({"result": 2}));
            })
            .await;

        let store = store(&server);
        let keys = store.keys("blog:*").await.unwrap();
        assert_eq!(keys, vec!["blog:1".to_string(), "blog:2".to_string()]);

        let deleted = store.del(&keys).await.unwrap();
        del.assert_async().await;
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_del_without_keys_skips_request() {
        // Sin mocks registrados: cualquier request recibiria un 404
        let server = MockServer::start_async().await;

        assert_eq!(store(&server).del(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_mapped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"result": "PONG"}));
            })
            .await;

        let error = store(&server).ping().await.unwrap_err();

        assert!(matches!(error, KvError::Timeout { millis: 500 }));
    }

    #[tokio::test]
    async fn test_flush_all_expects_ok() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").json_body(json!(["FLUSHALL"]));
                then.status(200).json_body(json!({"result": "OK"}));
            })
            .await;

        assert!(store(&server).flush_all().await.is_ok());
    }
}
