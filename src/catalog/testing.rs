//! Scripted transport for exercising catalog behavior without a network.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::query::CanonicalQuery;
use super::transport::{CatalogTransport, RawResponse};
use crate::error::CatalogError;

struct Rule {
    path: String,
    key: String,
    value: String,
    response: RawResponse,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Script {
    defaults: HashMap<String, RawResponse>,
    rules: Vec<Rule>,
    requests: Vec<(String, CanonicalQuery)>,
}

/// Answers requests from canned responses and records what was asked.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Response for any request to `path` not matched by a narrower rule.
    pub(crate) fn respond(&self, path: &str, response: RawResponse) {
        self.script
            .lock()
            .defaults
            .insert(path.to_string(), response);
    }

    /// Response for requests to `path` whose query has `key=value`.
    pub(crate) fn respond_when(&self, path: &str, key: &str, value: &str, response: RawResponse) {
        self.script.lock().rules.push(Rule {
            path: path.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            response,
            gate: None,
        });
    }

    /// Like [`respond_when`](Self::respond_when), but the first matching
    /// request is held until the returned sender fires or is dropped.
    pub(crate) fn respond_when_released(
        &self,
        path: &str,
        key: &str,
        value: &str,
        response: RawResponse,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().rules.push(Rule {
            path: path.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            response,
            gate: Some(rx),
        });
        tx
    }

    pub(crate) fn requests(&self) -> Vec<(String, CanonicalQuery)> {
        self.script.lock().requests.clone()
    }
}

#[async_trait]
impl CatalogTransport for ScriptedTransport {
    async fn get(&self, path: &str, query: &CanonicalQuery) -> Result<RawResponse, CatalogError> {
        let (response, gate) = {
            let mut guard = self.script.lock();
            let script = &mut *guard;
            script.requests.push((path.to_string(), query.clone()));
            let rule = script
                .rules
                .iter_mut()
                .find(|rule| rule.path == path && query.get(&rule.key) == Some(rule.value.as_str()));
            match rule {
                Some(rule) => (rule.response.clone(), rule.gate.take()),
                None => (
                    script
                        .defaults
                        .get(path)
                        .cloned()
                        .unwrap_or_else(|| RawResponse::new(500, format!("unscripted path {path}"))),
                    None,
                ),
            }
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(response)
    }
}
