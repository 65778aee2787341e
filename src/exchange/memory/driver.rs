use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::exchange::exchange::{ComponentExchange, ExchangeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    /// Pop the next scripted value, `None` once the queue is empty.
    Scripted,
    /// Send the rows back as if the user accepted them unchanged.
    Echo,
}

/// In-process exchange for hosts that embed the grid directly.
///
/// Replies come from a queue of scripted component values or, in echo mode,
/// from the rows that were just sent.
#[derive(Debug)]
pub struct MemoryExchange {
    reply: Reply,
    responses: Mutex<VecDeque<Option<Value>>>,
    last_args: Mutex<Option<(Value, Option<String>)>>,
    calls: AtomicUsize,
}

impl MemoryExchange {
    /// An exchange whose user never interacts.
    pub fn new() -> Self {
        Self::with_responses(vec![])
    }

    pub fn with_responses(responses: Vec<Option<Value>>) -> Self {
        Self {
            reply: Reply::Scripted,
            responses: Mutex::new(responses.into()),
            last_args: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn echo() -> Self {
        Self {
            reply: Reply::Echo,
            ..Self::new()
        }
    }

    pub fn push_response(&self, response: Option<Value>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Arguments and key of the last call.
    pub fn last_args(&self) -> Option<(Value, Option<String>)> {
        self.last_args.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn echo_reply(args: &Value) -> Result<Value, ExchangeError> {
        let rows: Value = match args.get("row_data") {
            Some(Value::String(text)) => serde_json::from_str(text)?,
            _ => json!([]),
        };
        Ok(json!({
            "rowData": rows,
            "originalDtypes": args.get("frame_dtypes").cloned().unwrap_or_else(|| json!({})),
            "selectedRows": [],
        }))
    }
}

impl Default for MemoryExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComponentExchange for MemoryExchange {
    async fn invoke(&self, args: Value, key: Option<&str>) -> Result<Option<Value>, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = match self.reply {
            Reply::Echo => Some(Self::echo_reply(&args)?),
            Reply::Scripted => self
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .flatten(),
        };

        *self.last_args.lock().unwrap_or_else(PoisonError::into_inner) = Some((args, key.map(String::from)));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_then_nothing() {
        let exchange = MemoryExchange::with_responses(vec![None, Some(json!("first"))]);

        assert_eq!(exchange.invoke(json!({}), None).await.unwrap(), None);
        assert_eq!(exchange.invoke(json!({}), Some("k")).await.unwrap(), Some(json!("first")));
        assert_eq!(exchange.invoke(json!({}), None).await.unwrap(), None);
        assert_eq!(exchange.calls(), 3);
    }

    #[tokio::test]
    async fn echo_sends_rows_back() {
        let exchange = MemoryExchange::echo();
        let args = json!({
            "row_data": r#"[{"a": 1}]"#,
            "frame_dtypes": {"a": "signed-int"},
        });

        let reply = exchange.invoke(args.clone(), Some("grid")).await.unwrap().unwrap();
        assert_eq!(reply["rowData"], json!([{"a": 1}]));
        assert_eq!(reply["originalDtypes"], json!({"a": "signed-int"}));
        assert_eq!(exchange.last_args(), Some((args, Some("grid".to_string()))));
    }

    #[tokio::test]
    async fn poisoned_state_is_still_used() {
        let exchange = std::sync::Arc::new(MemoryExchange::new());
        let poisoner = exchange.clone();
        let _ = std::thread::spawn(move || {
            let _responses = poisoner.responses.lock().unwrap();
            let _args = poisoner.last_args.lock().unwrap();
            panic!("poison both locks");
        })
        .join();
        assert!(exchange.responses.is_poisoned());

        exchange.push_response(Some(json!("queued")));
        assert_eq!(exchange.invoke(json!({"a": 1}), None).await.unwrap(), Some(json!("queued")));
        assert_eq!(exchange.last_args(), Some((json!({"a": 1}), None)));
    }
}
