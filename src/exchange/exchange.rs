use async_trait::async_trait;
use serde_json::Value;

use crate::codec::payload::OutboundPayload;
use crate::grid::jscode::find_js_code;

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The arguments could not be marshalled for the component.
    #[error("{0}")]
    Marshall(String),

    #[error("Component transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Component host answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Component value is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The single call crossing into the widget's host.
///
/// `invoke` resolves to `None` until the user has interacted with the grid.
#[async_trait]
pub trait ComponentExchange: Send + Sync {
    async fn invoke(&self, args: Value, key: Option<&str>) -> Result<Option<Value>, ExchangeError>;

    /// Serializes the payload. Executable code left in the grid options is
    /// refused.
    fn marshal(&self, payload: &OutboundPayload) -> Result<Value, ExchangeError> {
        let args = serde_json::to_value(payload)?;
        if let Some(path) = find_js_code(&args) {
            return Err(ExchangeError::Marshall(format!(
                "Could not convert component args to JSON: JsCode object found at {}",
                path
            )));
        }
        Ok(args)
    }

    async fn exchange(&self, payload: &OutboundPayload, key: Option<&str>) -> Result<Option<Value>, ExchangeError> {
        let args = self.marshal(payload)?;
        self.invoke(args, key).await
    }
}
