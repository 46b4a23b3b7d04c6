//! HTTP case store backed by a spreadsheet script endpoint.
//!
//! The backend is a single web-app URL that multiplexes every operation
//! through POST: the body is a JSON envelope `{"action": ..., ...}` sent
//! with a `text/plain` content type. The script cannot handle CORS
//! preflight, and a plain-text POST avoids triggering one; the script
//! parses the body itself. Failures come back as a JSON object carrying
//! an `error` field, with HTTP 200.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use oncotrack_core::models::{CategoryKey, ListItem, PatientCase};

use crate::store::{CaseStore, SetupOutcome, Snapshot, StoreError, StoreResult};

/// Content type that keeps the script endpoint preflight-free.
const WIRE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// [`CaseStore`] over the spreadsheet script's wire protocol.
#[derive(Debug, Clone)]
pub struct SheetStore {
    url: String,
    client: reqwest::Client,
}

impl SheetStore {
    /// A store talking to the given web-app URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The configured endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, payload: Value) -> StoreResult<T> {
        if self.url.is_empty() {
            return Err(StoreError::NotConfigured);
        }
        tracing::debug!(action, "calling script endpoint");

        let body = envelope(action, payload);
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, WIRE_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await?;

        let value: Value = response.json().await?;
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            tracing::warn!(action, error, "script endpoint rejected the call");
            return Err(StoreError::Rejected(error.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Build the wire envelope: the action name merged over the payload.
fn envelope(action: &str, payload: Value) -> Value {
    let mut body = match payload {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    body.insert("action".to_string(), Value::String(action.to_string()));
    Value::Object(body)
}

#[async_trait]
impl CaseStore for SheetStore {
    async fn fetch_all(&self) -> StoreResult<Snapshot> {
        self.call("getData", json!({})).await
    }

    async fn save_case(&self, case: &PatientCase) -> StoreResult<()> {
        let _: Value = self.call("saveCase", json!({ "data": case })).await?;
        Ok(())
    }

    async fn delete_case(&self, id: &str) -> StoreResult<()> {
        let _: Value = self.call("deleteCase", json!({ "id": id })).await?;
        Ok(())
    }

    async fn update_list(&self, key: CategoryKey, items: &[ListItem]) -> StoreResult<()> {
        let payload = json!({ "key": key.as_str(), "list": items });
        let _: Value = self.call("updateList", payload).await?;
        Ok(())
    }

    async fn setup_database(&self) -> StoreResult<SetupOutcome> {
        self.call("setupDatabase", json!({})).await
    }
}
