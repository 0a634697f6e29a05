//! Scripted stand-in for the Slack reactions API.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reactji::error::ApiError;
use reactji::model::{Page, ReactedItem, Reaction};
use reactji::slack::ReactionsApi;

/// One recorded `list_reactions` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub user_id: String,
    pub count: u32,
    pub cursor: Option<String>,
}

/// Replays a fixed sequence of responses, one per call.
#[derive(Default)]
pub struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Page, ApiError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedApi {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<Page, ApiError>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ReactionsApi for ScriptedApi {
    async fn list_reactions(
        &self,
        user_id: &str,
        count: u32,
        cursor: Option<&str>,
    ) -> Result<Page, ApiError> {
        self.calls.lock().unwrap().push(Call {
            user_id: user_id.to_string(),
            count,
            cursor: cursor.map(str::to_owned),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Fatal("script exhausted".to_string())))
    }
}

pub fn message(ts: &str, reactions: Vec<Reaction>) -> ReactedItem {
    ReactedItem::Message {
        ts: ts.to_string(),
        reactions,
    }
}

pub fn page(items: Vec<ReactedItem>, next_cursor: Option<&str>) -> Result<Page, ApiError> {
    Ok(Page::new(items, next_cursor.map(str::to_owned)))
}

pub fn rate_limited(secs: u64) -> Result<Page, ApiError> {
    Err(ApiError::RateLimited {
        retry_after: Duration::from_secs(secs),
    })
}

pub fn transient() -> Result<Page, ApiError> {
    Err(ApiError::Transient("internal_error".to_string()))
}
