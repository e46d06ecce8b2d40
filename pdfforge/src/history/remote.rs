//! History store backed by a PostgREST-style REST table.
//!
//! Requests go to `<base_url>/rest/v1/<table>` with the API key in both the
//! `apikey` and `Authorization: Bearer` headers. Filters use the PostgREST
//! `column=eq.value` syntax.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::document::OperationKind;
use crate::error::{PdfForgeError, Result};
use crate::history::{HistoryRecord, HistoryStore, NewRecord, OperationData};
use crate::identity::OwnerId;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the remote history table over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteHistoryStore {
    client: Client,
    endpoint: String,
}

/// Body of an insert; the service fills in `created_at`.
#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    id: Uuid,
    user_id: &'a OwnerId,
    original_name: &'a str,
    file_url: &'a str,
    file_type: OperationKind,
    page_count: usize,
    operation_data: OperationData,
}

impl RemoteHistoryStore {
    /// Build a client for `table` at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::InvalidConfig`] if the key cannot be sent as
    /// a header or the HTTP client cannot be created.
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| PdfForgeError::invalid_config("API key contains invalid characters"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| PdfForgeError::invalid_config("API key contains invalid characters"))?;
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PdfForgeError::invalid_config(format!("Cannot create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: table_endpoint(base_url, table),
        })
    }

    /// The table URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `<base>/rest/v1/<table>`, tolerating a trailing slash on `base`.
pub fn table_endpoint(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

/// Query parameters listing one owner's records, newest first.
pub fn list_query(owner: &OwnerId) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{owner}")),
        ("order", "created_at.desc".to_string()),
    ]
}

/// Query parameters addressing one record.
pub fn delete_query(id: Uuid) -> Vec<(&'static str, String)> {
    vec![("id", format!("eq.{id}"))]
}

async fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PdfForgeError::persistence(format!(
        "{action} failed with {status}: {}",
        body.trim()
    )))
}

#[async_trait]
impl HistoryStore for RemoteHistoryStore {
    #[instrument(skip_all, fields(id = %record.id, kind = %record.kind))]
    async fn create_record(&self, record: NewRecord) -> Result<HistoryRecord> {
        let row = InsertRow {
            id: record.id,
            user_id: &record.owner,
            original_name: &record.source_names,
            file_url: &record.result_ref,
            file_type: record.kind,
            page_count: record.page_count,
            operation_data: OperationData::new(&record.detail, record.file_name.clone()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut rows: Vec<HistoryRecord> = check_status(response, "Create record").await?.json().await?;

        debug!("record created");
        rows.pop()
            .ok_or_else(|| PdfForgeError::persistence("Create record returned no row"))
    }

    #[instrument(skip_all, fields(owner = %owner))]
    async fn list_records(&self, owner: &OwnerId) -> Result<Vec<HistoryRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&list_query(owner))
            .send()
            .await?;
        let records: Vec<HistoryRecord> = check_status(response, "List records").await?.json().await?;
        debug!(count = records.len(), "records listed");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(&self.endpoint)
            .query(&delete_query(id))
            .send()
            .await?;
        check_status(response, "Delete record").await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OperationDetail;

    #[test]
    fn test_table_endpoint() {
        assert_eq!(
            table_endpoint("https://db.example.co/", "processed_files"),
            "https://db.example.co/rest/v1/processed_files"
        );
        assert_eq!(
            table_endpoint("https://db.example.co", "t"),
            "https://db.example.co/rest/v1/t"
        );
    }

    #[test]
    fn test_queries() {
        let query = list_query(&OwnerId::new("user-7"));
        assert!(query.contains(&("user_id", "eq.user-7".to_string())));
        assert!(query.contains(&("order", "created_at.desc".to_string())));

        let id = Uuid::new_v4();
        assert_eq!(delete_query(id), vec![("id", format!("eq.{id}"))]);
    }

    #[test]
    fn test_insert_row_shape() {
        let owner = OwnerId::new("user-7");
        let row = InsertRow {
            id: Uuid::nil(),
            user_id: &owner,
            original_name: "a.pdf",
            file_url: "/out/split_a.pdf",
            file_type: OperationKind::Split,
            page_count: 2,
            operation_data: OperationData::new(&OperationDetail::Split { pages: vec![2, 1] }, "split_a.pdf"),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["user_id"], "user-7");
        assert_eq!(value["file_type"], "split");
        assert_eq!(value["operation_data"]["pages"], serde_json::json!([2, 1]));
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_rejects_unsendable_key() {
        let err = RemoteHistoryStore::new("https://db.example.co", "bad\nkey", "t").unwrap_err();
        assert!(matches!(err, PdfForgeError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_persistence_error() {
        let store = RemoteHistoryStore::new("http://127.0.0.1:9", "key", "processed_files").unwrap();
        let err = store.list_records(&OwnerId::new("u")).await.unwrap_err();
        assert!(err.is_warning());
    }
}
