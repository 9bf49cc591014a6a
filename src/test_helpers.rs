//! In-memory [`Transport`] for exercising the query flow without a network.

use crate::error::{AthenaError, Result};
use crate::transport::{Endpoint, Transport};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays a fixed script of responses and records every request body.
///
/// `Ok(value)` entries are returned as the decoded response; `Err(status)`
/// entries become an [`AthenaError::Transport`] with that status.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<Value, u16>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<std::result::Result<Value, u16>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests that carried a `page` field.
    pub fn page_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(_, body)| body.get("page").is_some())
            .count()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    async fn post<B>(&self, endpoint: Endpoint, body: &B) -> Result<Value>
    where
        B: Serialize + Sync,
    {
        let body = serde_json::to_value(body).unwrap();
        self.calls.lock().unwrap().push((endpoint, body.clone()));

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(status)) => Err(AthenaError::Transport {
                status: Some(status),
                message: format!("scripted failure for {endpoint}"),
            }),
            None => panic!("script exhausted; unexpected {endpoint} request: {body}"),
        }
    }
}

/// A minimal article JSON object.
pub fn article(title: &str, score: f64) -> Value {
    json!({"title": title, "url": format!("https://example.com/{title}"), "score": score})
}

/// The three responses of a chunk that finishes on its first poll and fits on one page.
pub fn one_page_chunk(query_id: &str, articles: Vec<Value>) -> Vec<std::result::Result<Value, u16>> {
    vec![
        Ok(json!({"state": "SUCCESS", "query_id": query_id})),
        Ok(json!({"state": "SUCCESS", "totalArticles": articles.len()})),
        Ok(json!({"state": "SUCCESS", "articles": articles})),
    ]
}
