//! REST object store — storage account operations over HTTP
//!
//! Hierarchical operations (ACL read/write, atomic rename) go to the
//! account's DFS endpoint; flat operations (copy, delete, metadata) go to
//! the blob endpoint. Every request carries the API version, a fresh
//! client request id, and a bearer token from the configured credential.
//! Response bodies quoted in error reasons pass through redaction first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use url::Url;
use uuid::Uuid;

use super::{ObjectStore, TokenCredential};
use crate::error::{Result, WardenError};
use crate::redact::redact;

const API_VERSION: &str = "2023-11-03";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_REQUEST_ID: &str = "x-ms-client-request-id";
const HEADER_PERMISSIONS: &str = "x-ms-permissions";
const HEADER_RENAME_SOURCE: &str = "x-ms-rename-source";
const HEADER_COPY_SOURCE: &str = "x-ms-copy-source";
const HEADER_COPY_STATUS: &str = "x-ms-copy-status";
const METADATA_PREFIX: &str = "x-ms-meta-";

/// REST store configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Storage account name, used to build the default endpoints
    pub account: String,

    /// DFS endpoint override (emulators, tests)
    pub dfs_endpoint: Option<String>,

    /// Blob endpoint override (emulators, tests)
    pub blob_endpoint: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Delay between copy status polls in milliseconds
    pub copy_poll_interval_ms: u64,

    /// Polls allowed before a still-pending copy is reported as failed
    pub copy_poll_max_attempts: u32,
}

impl RestConfig {
    /// Configuration for an account with default endpoints and timeouts
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            dfs_endpoint: None,
            blob_endpoint: None,
            timeout_secs: 30,
            copy_poll_interval_ms: 200,
            copy_poll_max_attempts: 10,
        }
    }

    fn dfs_base(&self) -> String {
        self.dfs_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.dfs.core.windows.net", self.account))
    }

    fn blob_base(&self) -> String {
        self.blob_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.blob.core.windows.net", self.account))
    }
}

/// [`ObjectStore`] backed by the storage account REST surface
pub struct RestStore {
    client: Client,
    config: RestConfig,
    credential: Arc<dyn TokenCredential>,
}

impl RestStore {
    /// Build a store from configuration and a credential
    pub fn new(config: RestConfig, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WardenError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            credential,
        })
    }

    /// Attach the headers every storage request carries
    async fn request(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.credential.token().await?;
        Ok(builder
            .header(HEADER_VERSION, API_VERSION)
            .header(HEADER_REQUEST_ID, Uuid::new_v4().to_string())
            .bearer_auth(token))
    }

    /// Send a request and map transport or status failures through `error`
    async fn execute(
        &self,
        builder: RequestBuilder,
        error: impl Fn(String) -> WardenError,
    ) -> Result<Response> {
        let builder = self.request(builder).await?;
        let response = builder
            .send()
            .await
            .map_err(|e| error(redact(&e.to_string()).into_owned()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error(format!(
            "status {}: {}",
            status.as_u16(),
            redact(&body)
        )))
    }
}

#[async_trait]
impl ObjectStore for RestStore {
    async fn get_access_control(&self, container: &str, path: &str) -> Result<String> {
        let error = |reason: String| WardenError::AclRead {
            path: path.to_string(),
            reason,
        };
        let mut url = object_url(&self.config.dfs_base(), container, path).map_err(&error)?;
        url.set_query(Some("action=getAccessControl"));

        let response = self.execute(self.client.head(url), &error).await?;
        header_value(&response, HEADER_PERMISSIONS).ok_or_else(|| {
            error(format!("response missing {} header", HEADER_PERMISSIONS))
        })
    }

    async fn set_access_control(
        &self,
        container: &str,
        path: &str,
        permissions: &str,
    ) -> Result<()> {
        let error = |reason: String| WardenError::AclWrite {
            path: path.to_string(),
            reason,
        };
        let mut url = object_url(&self.config.dfs_base(), container, path).map_err(&error)?;
        url.set_query(Some("action=setAccessControl"));

        self.execute(
            self.client.patch(url).header(HEADER_PERMISSIONS, permissions),
            &error,
        )
        .await?;

        tracing::debug!(container = container, path = path, "Access control written");
        Ok(())
    }

    async fn rename(&self, container: &str, from: &str, to: &str) -> Result<()> {
        let error = |reason: String| WardenError::Rename {
            path: from.to_string(),
            reason,
        };
        let url = object_url(&self.config.dfs_base(), container, to).map_err(&error)?;
        let source = format!("/{}/{}", container, from);

        self.execute(
            self.client.put(url).header(HEADER_RENAME_SOURCE, source),
            &error,
        )
        .await?;

        tracing::debug!(container = container, from = from, to = to, "Object renamed");
        Ok(())
    }

    async fn copy(&self, container: &str, from: &str, to: &str) -> Result<()> {
        let error = |reason: String| WardenError::Copy {
            path: from.to_string(),
            reason,
        };
        let source = object_url(&self.config.blob_base(), container, from).map_err(&error)?;
        let destination = object_url(&self.config.blob_base(), container, to).map_err(&error)?;

        let response = self
            .execute(
                self.client
                    .put(destination.clone())
                    .header(HEADER_COPY_SOURCE, source.as_str()),
                &error,
            )
            .await?;

        // The account may report the copy as pending; poll the destination
        // until it settles or the attempt budget runs out.
        let mut status = copy_status(&response);
        let mut polls = 0u32;
        while matches!(status.as_deref(), Some("pending")) {
            if polls >= self.config.copy_poll_max_attempts {
                return Err(error(format!("copy still pending after {} polls", polls)));
            }
            polls += 1;
            tokio::time::sleep(Duration::from_millis(self.config.copy_poll_interval_ms)).await;
            let probe = self
                .execute(self.client.head(destination.clone()), &error)
                .await?;
            status = copy_status(&probe);
        }

        match status.as_deref() {
            None | Some("success") => {
                tracing::debug!(container = container, from = from, to = to, "Object copied");
                Ok(())
            }
            Some(other) => Err(error(format!("copy ended with status {}", other))),
        }
    }

    async fn delete(&self, container: &str, path: &str) -> Result<()> {
        let error = |reason: String| WardenError::Delete {
            path: path.to_string(),
            reason,
        };
        let url = object_url(&self.config.blob_base(), container, path).map_err(&error)?;

        self.execute(self.client.delete(url), &error).await?;

        tracing::debug!(container = container, path = path, "Object deleted");
        Ok(())
    }

    async fn set_metadata(
        &self,
        container: &str,
        path: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let error = |reason: String| WardenError::Metadata {
            path: path.to_string(),
            reason,
        };
        let mut url = object_url(&self.config.blob_base(), container, path).map_err(&error)?;
        url.set_query(Some("comp=metadata"));

        let mut builder = self.client.put(url);
        for (key, value) in metadata {
            let name = format!("{}{}", METADATA_PREFIX, key);
            builder = builder.header(name.as_str(), value.as_str());
        }

        self.execute(builder, &error).await?;

        tracing::debug!(container = container, path = path, "Metadata written");
        Ok(())
    }
}

/// Build the URL of an object, percent-encoding each path segment
fn object_url(base: &str, container: &str, path: &str) -> std::result::Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid endpoint {}: {}", base, e))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("endpoint {} cannot carry a path", base))?;
        segments.push(container);
        for part in path.split('/') {
            segments.push(part);
        }
    }
    Ok(url)
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn copy_status(response: &Response) -> Option<String> {
    header_value(response, HEADER_COPY_STATUS).map(|v| v.to_ascii_lowercase())
}
