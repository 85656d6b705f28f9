//! Notion REST client backing the [`RecordStore`] trait.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Record;

use super::{PropertyPatch, Query, RecordStore, StoreError};

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const USER_AGENT: &str = "stagehand-cli";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP client for the Notion API.
pub struct NotionStore {
    agent: ureq::Agent,
    token: String,
    base_url: String,
}

impl NotionStore {
    /// Client against the public Notion API.
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, NOTION_API_BASE)
    }

    /// Client against an alternate endpoint, for tests and proxies.
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Notion-Version", NOTION_VERSION)
    }
}

impl RecordStore for NotionStore {
    fn query(&self, database_id: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        match self.request("POST", &url).send_json(query) {
            Ok(resp) => {
                let parsed: QueryResponse = resp
                    .into_json()
                    .map_err(|e| StoreError::Parse(e.to_string()))?;
                Ok(parsed.results)
            }
            Err(e) => Err(map_error(e)),
        }
    }

    fn update(&self, record_id: &str, patch: &PropertyPatch) -> Result<(), StoreError> {
        let url = format!("{}/pages/{}", self.base_url, record_id);
        let body = UpdateRequest { properties: patch };
        match self.request("PATCH", &url).send_json(&body) {
            Ok(_) => Ok(()),
            Err(e) => Err(map_error(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Record>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    properties: &'a PropertyPatch,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn map_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(401, _) => StoreError::Unauthorized,
        ureq::Error::Status(status, resp) => {
            api_error(status, resp.into_string().unwrap_or_default())
        }
        other => StoreError::Transport(other.to_string()),
    }
}

/// Build an [`StoreError::Api`] from a non-2xx response body, falling
/// back to the raw body when it is not the usual error JSON.
fn api_error(status: u16, body: String) -> StoreError {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => {
            let code = if parsed.code.is_empty() {
                "unknown".to_string()
            } else {
                parsed.code
            };
            let message = if parsed.message.is_empty() {
                body
            } else {
                parsed.message
            };
            StoreError::Api {
                status,
                code,
                message,
            }
        }
        Err(_) => StoreError::Api {
            status,
            code: "unknown".to_string(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response_parses_results() {
        let parsed: QueryResponse = serde_json::from_str(
            r#"{
                "object": "list",
                "results": [
                    {"id": "page-1", "properties": {}},
                    {"id": "page-2", "properties": {
                        "Выполнена": {"type": "checkbox", "checkbox": false}
                    }}
                ],
                "next_cursor": null,
                "has_more": false
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].id, "page-1");
        assert_eq!(parsed.results[1].checkbox("Выполнена"), Some(false));
    }

    #[test]
    fn query_response_defaults_to_empty() {
        let parsed: QueryResponse = serde_json::from_str(r#"{"object": "list"}"#).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn api_error_parses_notion_body() {
        let err = api_error(
            404,
            r#"{"object": "error", "status": 404, "code": "object_not_found", "message": "Could not find database"}"#
                .to_string(),
        );
        assert!(matches!(
            err,
            StoreError::Api { status: 404, ref code, ref message }
                if code == "object_not_found" && message == "Could not find database"
        ));
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(502, "Bad Gateway".to_string());
        assert!(matches!(
            err,
            StoreError::Api { status: 502, ref code, ref message }
                if code == "unknown" && message == "Bad Gateway"
        ));
    }

    #[test]
    fn api_error_handles_empty_error_object() {
        let err = api_error(400, "{}".to_string());
        assert!(matches!(
            err,
            StoreError::Api { status: 400, ref code, ref message }
                if code == "unknown" && message == "{}"
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = NotionStore::with_base_url("secret", "https://example.test/v1/");
        assert_eq!(store.base_url, "https://example.test/v1");
    }
}
