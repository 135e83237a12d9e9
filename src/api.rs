// API client module: a small async HTTP client that talks to a CHILI-style
// publishing server. The RPC surface is pinned to the server's JSON REST
// rendering under `<url>/rest-api/...`; the generated page images come from
// the classic `download.aspx` endpoint and are streamed straight to disk.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

/// Resource type every call in this tool operates on.
pub const RESOURCE_NAME: &str = "Documents";

/// Per-page download timeout. Generated previews can take the server a very
/// long time to render, so this is deliberately generous (15 minutes).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(900);

/// Verified connection details, built exactly once by the session bootstrap
/// and read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub url: String,
    pub environment: String,
    pub api_key: String,
}

/// Result of an API-key issuance attempt that reached the server. Transport
/// failures are reported separately as `Err`.
#[derive(Debug, Clone)]
pub enum KeyOutcome {
    Issued(String),
    Rejected(String),
}

/// One entry of a resource tree level. The server encodes booleans as the
/// strings "true"/"false", so the wire field is kept string-typed.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "isFolder", default)]
    pub is_folder: String,
}

impl TreeItem {
    pub fn is_folder(&self) -> bool {
        self.is_folder == "true"
    }
}

#[derive(Debug, Deserialize)]
struct TreeLevel {
    #[serde(default)]
    items: Vec<TreeItem>,
}

/// Document definition metadata. `page_count` arrives string-typed and is
/// validated by the pipeline before use.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
    #[serde(rename = "pageCount")]
    pub page_count: String,
}

#[derive(Debug, Deserialize)]
struct ServerDate {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiKeyResponse {
    #[serde(default)]
    succeeded: String,
    key: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CopiedItem {
    id: String,
}

/// The remote calls this tool consumes. The session bootstrap and the preview
/// pipeline are written against this trait so tests can supply a scripted
/// backend instead of a live server.
#[async_trait(?Send)]
pub trait RemoteApi {
    /// Lightweight connectivity probe; succeeds iff the server answers with a
    /// date field.
    async fn server_date(&self) -> Result<String>;

    /// Exchange credentials for an environment-scoped API key. `Err` means a
    /// transport-level failure; an explicit server rejection is `Rejected`.
    async fn generate_api_key(
        &self,
        environment: &str,
        username: &str,
        password: &str,
    ) -> Result<KeyOutcome>;

    /// Toggle server-side automatic preview generation. Fire-and-forget: the
    /// response carries nothing this tool uses.
    async fn set_auto_preview_generation(&self, api_key: &str, enabled: bool) -> Result<()>;

    /// List one level of the Documents tree under `parent_folder`.
    async fn tree_level(&self, api_key: &str, parent_folder: &str) -> Result<Vec<TreeItem>>;

    /// Copy a document into `folder_path` under `new_name`; returns the id of
    /// the copy.
    async fn copy_item(
        &self,
        api_key: &str,
        source_id: &str,
        new_name: &str,
        folder_path: &str,
    ) -> Result<String>;

    /// Fetch a document's definition metadata (display name, page count).
    async fn item_definition(&self, api_key: &str, id: &str) -> Result<ItemDefinition>;

    /// GET `url` and stream the response body to `dest`.
    async fn download_to_file(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP implementation of [`RemoteApi`] holding a reqwest client and the
/// server base URL.
#[derive(Clone)]
pub struct ChiliClient {
    client: Client,
    base_url: String,
}

impl ChiliClient {
    /// Create a client for `url`. A trailing slash is stripped so endpoint
    /// paths can be appended uniformly.
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ChiliClient {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait(?Send)]
impl RemoteApi for ChiliClient {
    async fn server_date(&self) -> Result<String> {
        let url = format!("{}/rest-api/system/date", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach server date endpoint")?;
        if !res.status().is_success() {
            anyhow::bail!("Server date call failed: {}", res.status());
        }
        let parsed: ServerDate = res.json().await.context("Parsing server date response")?;
        parsed
            .date
            .ok_or_else(|| anyhow::anyhow!("Server response carried no date field"))
    }

    async fn generate_api_key(
        &self,
        environment: &str,
        username: &str,
        password: &str,
    ) -> Result<KeyOutcome> {
        let url = format!("{}/rest-api/apikey", self.base_url);
        let res = self
            .client
            .post(&url)
            .query(&[("environmentNameOrURL", environment)])
            .json(&serde_json::json!({
                "userName": username,
                "password": password,
            }))
            .send()
            .await
            .context("Failed to send API key request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().await.unwrap_or_else(|_| "".into());
            anyhow::bail!("API key call failed: {} - {}", status, txt);
        }
        let parsed: ApiKeyResponse = res.json().await.context("Parsing API key response")?;
        if parsed.succeeded == "true" {
            let key = parsed
                .key
                .ok_or_else(|| anyhow::anyhow!("Server reported success but sent no key"))?;
            Ok(KeyOutcome::Issued(key))
        } else {
            Ok(KeyOutcome::Rejected(
                parsed
                    .error_message
                    .unwrap_or_else(|| "No error message provided".into()),
            ))
        }
    }

    async fn set_auto_preview_generation(&self, api_key: &str, enabled: bool) -> Result<()> {
        let url = format!(
            "{}/rest-api/system/apikey/autopreviewgeneration",
            self.base_url
        );
        let res = self
            .client
            .put(&url)
            .query(&[
                ("apiKey", api_key),
                ("enabled", if enabled { "true" } else { "false" }),
            ])
            .send()
            .await
            .context("Failed to toggle auto preview generation")?;
        if !res.status().is_success() {
            anyhow::bail!("Auto preview generation toggle failed: {}", res.status());
        }
        Ok(())
    }

    async fn tree_level(&self, api_key: &str, parent_folder: &str) -> Result<Vec<TreeItem>> {
        let url = format!(
            "{}/rest-api/resources/{}/treelevel",
            self.base_url, RESOURCE_NAME
        );
        let res = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("parentFolder", parent_folder),
                ("numLevels", "1"),
            ])
            .send()
            .await
            .context("Failed to list tree level")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().await.unwrap_or_else(|_| "".into());
            anyhow::bail!("Tree level call failed: {} - {}", status, txt);
        }
        let parsed: TreeLevel = res.json().await.context("Parsing tree level response")?;
        Ok(parsed.items)
    }

    async fn copy_item(
        &self,
        api_key: &str,
        source_id: &str,
        new_name: &str,
        folder_path: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/rest-api/resources/{}/items/{}/copy",
            self.base_url, RESOURCE_NAME, source_id
        );
        let res = self
            .client
            .post(&url)
            .query(&[
                ("apiKey", api_key),
                ("newName", new_name),
                ("folderPath", folder_path),
            ])
            .send()
            .await
            .context("Failed to copy resource item")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().await.unwrap_or_else(|_| "".into());
            anyhow::bail!("Resource copy failed: {} - {}", status, txt);
        }
        let parsed: CopiedItem = res.json().await.context("Parsing resource copy response")?;
        Ok(parsed.id)
    }

    async fn item_definition(&self, api_key: &str, id: &str) -> Result<ItemDefinition> {
        let url = format!(
            "{}/rest-api/resources/{}/items/{}/definition",
            self.base_url, RESOURCE_NAME, id
        );
        let res = self
            .client
            .get(&url)
            .query(&[("apiKey", api_key)])
            .send()
            .await
            .context("Failed to fetch item definition")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().await.unwrap_or_else(|_| "".into());
            anyhow::bail!("Item definition call failed: {} - {}", status, txt);
        }
        let parsed: ItemDefinition = res.json().await.context("Parsing item definition")?;
        Ok(parsed)
    }

    async fn download_to_file(&self, url: &str, dest: &Path) -> Result<()> {
        let res = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .context("Failed to request page preview")?;
        if !res.status().is_success() {
            anyhow::bail!("Preview download failed: {}", res.status());
        }
        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed while streaming preview body")?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }
        Ok(())
    }
}
