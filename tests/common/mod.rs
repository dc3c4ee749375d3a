//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use eln_backup::adapters::auth::{AuthProvider, AuthSettings, Tokens};
use eln_backup::adapters::nucleus::DataHubApi;
use eln_backup::config::secret_string;
use eln_backup::domain::{
    BackupError, FileDescriptor, FileId, NucleusError, Result, RowDescriptor, RowId, RowType, Table,
};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn row(id: &str, row_type: RowType) -> RowDescriptor {
    RowDescriptor::new(RowId::new(id).unwrap(), row_type).with_name(format!("{id} name"))
}

pub fn file(id: &str, len: u64) -> FileDescriptor {
    FileDescriptor::new(FileId::new(id).unwrap(), len).with_name(format!("{id}.bin"))
}

/// In-memory data hub
///
/// Every call is recorded; ids listed in `failing` fail with a 500.
#[derive(Default)]
pub struct FakeDataHub {
    pub rows: HashMap<RowType, Vec<RowDescriptor>>,
    pub tables: HashMap<String, Table>,
    pub metadata: HashMap<String, Map<String, Value>>,
    pub files: Vec<FileDescriptor>,
    pub failing: HashSet<String>,
    pub delay: Duration,
    pub calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeDataHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, row_type: RowType, rows: Vec<RowDescriptor>) -> Self {
        self.rows.insert(row_type, rows);
        self
    }

    pub fn with_table(mut self, database_id: &str, table: Table) -> Self {
        self.tables.insert(database_id.to_string(), table);
        self
    }

    pub fn with_metadata(mut self, row_id: &str, metadata: Value) -> Self {
        if let Value::Object(map) = metadata {
            self.metadata.insert(row_id.to_string(), map);
        }
        self
    }

    pub fn with_files(mut self, files: Vec<FileDescriptor>) -> Self {
        self.files = files;
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls whose name starts with `prefix`, in call order
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn enter(&self, endpoint: &str, item_id: &str) -> Result<()> {
        self.record(format!("{endpoint} {item_id}"));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(item_id) {
            return Err(NucleusError::RequestFailed {
                endpoint: endpoint.to_string(),
                item_id: item_id.to_string(),
                status: 500,
                body: "boom".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DataHubApi for FakeDataHub {
    async fn list_rows(&self, row_type: RowType) -> Result<Vec<RowDescriptor>> {
        self.record(format!("ListRows {}", row_type.as_str()));
        Ok(self.rows.get(&row_type).cloned().unwrap_or_default())
    }

    async fn list_files(&self) -> Result<Vec<FileDescriptor>> {
        self.record("ListFiles".to_string());
        Ok(self.files.clone())
    }

    async fn get_dataframe(&self, database_id: &RowId) -> Result<Option<Table>> {
        self.enter("ListDatabaseRows", database_id.as_str()).await?;
        Ok(self.tables.get(database_id.as_str()).cloned())
    }

    async fn describe_row(&self, row_id: &RowId) -> Result<Map<String, Value>> {
        self.enter("DescribeRow", row_id.as_str()).await?;
        Ok(self.metadata.get(row_id.as_str()).cloned().unwrap_or_default())
    }

    async fn get_row_notebook_json(&self, row_id: &RowId) -> Result<Value> {
        self.enter("Notebook", row_id.as_str()).await?;
        Ok(json!({"id": row_id.as_str(), "fields": []}))
    }

    async fn get_download_url(&self, file_id: &FileId) -> Result<String> {
        self.enter("CreateFileDownloadUrl", file_id.as_str()).await?;
        Ok(format!("memory://{file_id}"))
    }

    async fn download_to(&self, url: &str, file_id: &FileId, dest: &Path) -> Result<u64> {
        self.record(format!("download {url}"));
        let len = self
            .files
            .iter()
            .find(|f| &f.id == file_id)
            .map(|f| f.content_length)
            .ok_or_else(|| BackupError::Export(format!("Unknown file {file_id}")))?;
        tokio::fs::write(dest, vec![b'x'; len as usize]).await?;
        Ok(len)
    }
}

/// Auth provider with fixed answers
pub struct FakeAuth {
    pub has_tokens: bool,
}

impl FakeAuth {
    pub fn with_tokens() -> Self {
        Self { has_tokens: true }
    }

    pub fn without_tokens() -> Self {
        Self { has_tokens: false }
    }
}

impl AuthProvider for FakeAuth {
    fn tokens_exist(&self) -> bool {
        self.has_tokens
    }

    fn authenticate(&self) -> Result<()> {
        Err(BackupError::Authentication("not interactive".to_string()))
    }

    fn get_tokens(&self) -> Result<Tokens> {
        Ok(Tokens {
            access: secret_string("tok".to_string()),
            refresh: None,
        })
    }

    fn get_config(&self) -> Result<AuthSettings> {
        Ok(AuthSettings {
            organization_id: "org-1".to_string(),
        })
    }
}

/// Number of lines in a text file
pub fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path).unwrap().lines().count()
}
