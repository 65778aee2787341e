use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::exchange::exchange::{ComponentExchange, ExchangeError};
use crate::exchange::{ComponentDeclaration, ComponentLocation};

/// Talks to a host that mounts components over HTTP.
///
/// Every render POSTs `{component, key, args}` to `endpoint`. The host answers
/// with the component value, or an empty/`null` body while the user has not
/// interacted yet. A 422 means the host could not marshal the arguments.
pub struct HttpExchange {
    client: Client,
    endpoint: String,
    declaration: ComponentDeclaration,
}

impl HttpExchange {
    pub fn new(endpoint: impl Into<String>, location: ComponentLocation) -> Self {
        Self::with_client(Client::new(), endpoint, location)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, location: ComponentLocation) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            declaration: ComponentDeclaration::new(location),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ComponentExchange for HttpExchange {
    async fn invoke(&self, args: Value, key: Option<&str>) -> Result<Option<Value>, ExchangeError> {
        let component = serde_json::to_value(&self.declaration)?;
        let body = json!({
            "component": component,
            "key": key,
            "args": args,
        });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ExchangeError::Marshall(text));
        }
        if !status.is_success() {
            log::warn!("Component host {} answered {}", self.endpoint, status);
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&text)?;
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

impl fmt::Debug for HttpExchange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HttpExchange")
            .field("endpoint", &self.endpoint)
            .field("declaration", &self.declaration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    async fn read_body(socket: &mut TcpStream) -> String {
        let mut buf: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    return text[head_end + 4..].to_string();
                }
            }
        }
        String::new()
    }

    /// Answers a single request and hands back its body.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_body(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{}/component", addr), handle)
    }

    fn exchange(endpoint: String) -> HttpExchange {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpExchange::with_client(client, endpoint, ComponentLocation::dev_server())
    }

    #[tokio::test]
    async fn posts_declaration_key_and_args() {
        let (endpoint, server) = serve_once("200 OK", r#"{"rowData": [], "selectedRows": []}"#).await;

        let value = exchange(endpoint)
            .invoke(json!({"height": 400}), Some("grid-1"))
            .await
            .unwrap();
        assert_eq!(value, Some(json!({"rowData": [], "selectedRows": []})));

        let request: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(request["component"]["name"], json!("agGrid"));
        assert_eq!(request["component"]["url"], json!("http://localhost:3001"));
        assert_eq!(request["key"], json!("grid-1"));
        assert_eq!(request["args"]["height"], json!(400));
    }

    #[tokio::test]
    async fn empty_body_means_no_value_yet() {
        let (endpoint, server) = serve_once("200 OK", "").await;
        assert_eq!(exchange(endpoint).invoke(json!({}), None).await.unwrap(), None);
        server.await.unwrap();

        let (endpoint, server) = serve_once("200 OK", "null").await;
        assert_eq!(exchange(endpoint).invoke(json!({}), None).await.unwrap(), None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unprocessable_args_are_a_marshall_error() {
        let (endpoint, server) = serve_once("422 Unprocessable Entity", "cannot marshal gridOptions").await;
        let err = exchange(endpoint).invoke(json!({}), None).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Marshall(ref m) if m == "cannot marshal gridOptions"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn other_failures_keep_status() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "busy").await;
        let err = exchange(endpoint).invoke(json!({}), None).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Status { status: 503, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_json_body_is_a_json_error() {
        let (endpoint, server) = serve_once("200 OK", "<html>oops</html>").await;
        let err = exchange(endpoint).invoke(json!({}), None).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Json(_)));
        server.await.unwrap();
    }
}
