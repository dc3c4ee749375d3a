//! HTTP client for the nucleus API
//!
//! All API calls are `POST {base_url}/nucleus-api/api/{Endpoint}` with a JSON
//! body and a `{"data": ...}` response envelope. Presigned downloads go
//! through a second client that carries no credentials, since object
//! storage rejects presigned requests that also send an `authorization`
//! header.

use super::api::DataHubApi;
use super::models::{
    database_columns, DatabaseRow, DownloadUrl, Envelope, FileListingEntry, RowListing,
};
use crate::adapters::auth::Credentials;
use crate::config::ApiConfig;
use crate::domain::{
    BackupError, FileDescriptor, FileId, NucleusError, Result, RowDescriptor, RowId, RowType,
    Table,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, ORIGIN};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

const API_PREFIX: &str = "nucleus-api/api";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:130.0) Gecko/20100101 Firefox/130.0";

/// Authenticated nucleus API client
///
/// # Example
///
/// ```no_run
/// use eln_backup::adapters::auth::{AuthProvider, TokenFileAuth};
/// use eln_backup::adapters::nucleus::{DataHubApi, NucleusClient};
/// use eln_backup::config::ApiConfig;
/// use eln_backup::domain::RowType;
///
/// # async fn example() -> eln_backup::domain::Result<()> {
/// let config = ApiConfig::default();
/// let auth = TokenFileAuth::from_config(&config)?;
/// let client = NucleusClient::new(&config, auth.credentials()?)?;
///
/// let workspaces = client.list_rows(RowType::Workspace).await?;
/// # Ok(())
/// # }
/// ```
pub struct NucleusClient {
    base_url: String,
    client: Client,
    download_client: Client,
    timeout: Duration,
}

impl NucleusClient {
    /// Build a client for `config.base_url` using `credentials`
    ///
    /// # Errors
    ///
    /// Fails when the credentials cannot be sent as HTTP headers or the
    /// TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let timeout = Duration::from_secs(config.timeout_seconds);
        let connect_timeout = Duration::from_secs(config.connect_timeout_seconds);

        let headers = api_headers(&base_url, &credentials)?;

        let client = ClientBuilder::new()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| BackupError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let download_client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                BackupError::Configuration(format!("Failed to build download client: {e}"))
            })?;

        tracing::debug!(base_url = %base_url, timeout_s = timeout.as_secs(), "Created nucleus client");

        Ok(Self {
            base_url,
            client,
            download_client,
            timeout,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, endpoint)
    }

    /// POST `body` to `endpoint` and decode the `data` envelope
    async fn post_api<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        item_id: &str,
        body: Value,
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        tracing::trace!(endpoint, item_id, "Calling nucleus API");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NucleusError::Timeout {
                        context: format!("{endpoint} for {item_id}"),
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    NucleusError::ConnectionFailed {
                        endpoint: endpoint.to_string(),
                        item_id: item_id.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NucleusError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                item_id: item_id.to_string(),
                message: format!("Failed to read response body: {e}"),
            })?;

        if status != StatusCode::OK {
            return Err(NucleusError::RequestFailed {
                endpoint: endpoint.to_string(),
                item_id: item_id.to_string(),
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            NucleusError::InvalidResponse {
                endpoint: endpoint.to_string(),
                item_id: item_id.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(envelope.data)
    }

    async fn describe(&self, row_id: &RowId, fields: bool) -> Result<Value> {
        self.post_api(
            "DescribeRow",
            row_id.as_str(),
            json!({ "rowId": row_id.as_str(), "fields": fields }),
        )
        .await
    }

    async fn with_timeout<F, T>(&self, context: impl FnOnce() -> String, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            BackupError::from(NucleusError::Timeout {
                context: context(),
                seconds: self.timeout.as_secs(),
            })
        })
    }
}

fn api_headers(base_url: &str, credentials: &Credentials) -> Result<HeaderMap> {
    let invalid =
        |what: &str| BackupError::Authentication(format!("{what} is not a valid header value"));

    let mut authorization = HeaderValue::from_str(&format!(
        "Bearer {}",
        credentials.access_token.expose_secret().as_ref()
    ))
    .map_err(|_| invalid("Access token"))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(
        "x-org-id",
        HeaderValue::from_str(&credentials.organization_id)
            .map_err(|_| invalid("Organization id"))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    if let Ok(origin) = HeaderValue::from_str(base_url) {
        headers.insert(ORIGIN, origin);
    }
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    Ok(headers)
}

#[async_trait]
impl DataHubApi for NucleusClient {
    async fn list_rows(&self, row_type: RowType) -> Result<Vec<RowDescriptor>> {
        let rows: RowListing = self
            .post_api(
                "ListRows",
                row_type.as_str(),
                json!({ "filters": [{ "row": { "rowType": row_type.as_str() } }] }),
            )
            .await?;

        tracing::debug!(row_type = %row_type, count = rows.len(), "Listed rows");
        Ok(rows)
    }

    async fn list_files(&self) -> Result<Vec<FileDescriptor>> {
        let entries: Vec<FileListingEntry> = self
            .post_api("ListFiles", "*", json!({ "filters": [] }))
            .await?;

        tracing::debug!(count = entries.len(), "Listed files");
        Ok(entries.into_iter().map(|e| e.file).collect())
    }

    async fn get_dataframe(&self, database_id: &RowId) -> Result<Option<Table>> {
        let description = self.describe(database_id, false).await?;
        let Some(columns) = database_columns(&description) else {
            tracing::warn!(
                database_id = %database_id,
                "Database has no tabular schema, exporting empty table"
            );
            return Ok(None);
        };

        let rows: Vec<DatabaseRow> = self
            .post_api(
                "ListDatabaseRows",
                database_id.as_str(),
                json!({ "databaseRowId": database_id.as_str() }),
            )
            .await?;

        let mut table = Table::with_columns(columns.iter().map(|c| c.label().to_string()).collect());
        for row in rows {
            let cells = columns.iter().map(|c| row.value_of(&c.id)).collect();
            table.push_row(row.id, cells).map_err(|message| NucleusError::InvalidResponse {
                endpoint: "ListDatabaseRows".to_string(),
                item_id: database_id.to_string(),
                message,
            })?;
        }

        Ok(Some(table))
    }

    async fn describe_row(&self, row_id: &RowId) -> Result<Map<String, Value>> {
        match self.describe(row_id, false).await? {
            Value::Object(map) => Ok(map),
            other => Err(NucleusError::InvalidResponse {
                endpoint: "DescribeRow".to_string(),
                item_id: row_id.to_string(),
                message: format!("expected an object, got {other}"),
            }
            .into()),
        }
    }

    async fn get_row_notebook_json(&self, row_id: &RowId) -> Result<Value> {
        self.describe(row_id, true).await
    }

    async fn get_download_url(&self, file_id: &FileId) -> Result<String> {
        let url: DownloadUrl = self
            .post_api(
                "CreateFileDownloadUrl",
                file_id.as_str(),
                json!({ "fileId": file_id.as_str() }),
            )
            .await?;
        Ok(url.download_url)
    }

    async fn download_to(&self, url: &str, file_id: &FileId, dest: &Path) -> Result<u64> {
        let mut response = self
            .with_timeout(
                || format!("download of {file_id}"),
                self.download_client.get(url).send(),
            )
            .await?
            .map_err(|e| NucleusError::ConnectionFailed {
                endpoint: "download".to_string(),
                item_id: file_id.to_string(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(NucleusError::DownloadFailed {
                file_id: file_id.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            BackupError::Io(format!("Failed to create {}: {}", dest.display(), e))
        })?;

        let mut written: u64 = 0;
        loop {
            let chunk = self
                .with_timeout(|| format!("download of {file_id}"), response.chunk())
                .await?
                .map_err(|e| NucleusError::ConnectionFailed {
                    endpoint: "download".to_string(),
                    item_id: file_id.to_string(),
                    message: e.to_string(),
                })?;

            let Some(chunk) = chunk else {
                break;
            };
            file.write_all(&chunk).await.map_err(|e| {
                BackupError::Io(format!("Failed to write {}: {}", dest.display(), e))
            })?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        tracing::debug!(file_id = %file_id, bytes = written, "Downloaded file");
        Ok(written)
    }
}
