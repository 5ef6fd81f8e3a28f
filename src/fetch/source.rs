//! Where document and query points come from.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

use crate::data::{parse_document_points, parse_query_point, DataError};
use crate::{DocumentPoint, QueryPoint};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DataError,
    },
}

#[async_trait]
pub trait PointSource: Send + Sync {
    /// Loads the full document point set.
    async fn fetch_documents(&self) -> Result<Vec<DocumentPoint>, FetchError>;

    /// Loads the current query point. A payload without coordinates is `Ok`.
    async fn fetch_query(&self) -> Result<QueryPoint, FetchError>;
}

/// Appends a timestamp parameter so intermediaries never serve a cached copy.
pub fn cache_bust(url: &str, stamp: u128) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}t={stamp}")
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Joins a resource path onto a base URL with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(feature = "http")]
pub use http::HttpPointSource;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use reqwest::Client;

    /// Fetches both resources over HTTP GET.
    #[derive(Clone, Debug)]
    pub struct HttpPointSource {
        client: Client,
        documents_url: String,
        query_url: String,
        cache_bust_documents: bool,
    }

    impl HttpPointSource {
        pub fn new(
            base_url: &str,
            documents_path: &str,
            query_path: &str,
        ) -> Result<Self, FetchError> {
            let client = Client::builder()
                .user_agent("doc-globe/0.1")
                .build()
                .map_err(|err| FetchError::Transport {
                    url: base_url.to_string(),
                    message: err.to_string(),
                })?;
            Ok(HttpPointSource {
                client,
                documents_url: join_url(base_url, documents_path),
                query_url: join_url(base_url, query_path),
                cache_bust_documents: true,
            })
        }

        pub fn with_document_cache_busting(mut self, enabled: bool) -> Self {
            self.cache_bust_documents = enabled;
            self
        }

        pub fn documents_url(&self) -> &str {
            &self.documents_url
        }

        pub fn query_url(&self) -> &str {
            &self.query_url
        }

        async fn get(&self, url: String) -> Result<(String, Vec<u8>), FetchError> {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|err| FetchError::Transport {
                    url: url.clone(),
                    message: err.to_string(),
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await.map_err(|err| FetchError::Transport {
                url: url.clone(),
                message: err.to_string(),
            })?;
            Ok((url, body.to_vec()))
        }
    }

    #[async_trait]
    impl PointSource for HttpPointSource {
        async fn fetch_documents(&self) -> Result<Vec<DocumentPoint>, FetchError> {
            let url = if self.cache_bust_documents {
                cache_bust(&self.documents_url, now_millis())
            } else {
                self.documents_url.clone()
            };
            let (url, body) = self.get(url).await?;
            parse_document_points(&body).map_err(|source| FetchError::Decode { url, source })
        }

        async fn fetch_query(&self) -> Result<QueryPoint, FetchError> {
            let (url, body) = self.get(cache_bust(&self.query_url, now_millis())).await?;
            parse_query_point(&body).map_err(|source| FetchError::Decode { url, source })
        }
    }
}

/// Reads both resources from local files, re-reading on every call.
#[derive(Clone, Debug)]
pub struct FilePointSource {
    documents: PathBuf,
    query: PathBuf,
}

impl FilePointSource {
    pub fn new(documents: impl Into<PathBuf>, query: impl Into<PathBuf>) -> Self {
        FilePointSource {
            documents: documents.into(),
            query: query.into(),
        }
    }

    async fn read(path: &Path) -> Result<(String, Vec<u8>), FetchError> {
        let url = path.display().to_string();
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok((url, bytes)),
            Err(err) => Err(FetchError::Transport {
                url,
                message: err.to_string(),
            }),
        }
    }
}

#[async_trait]
impl PointSource for FilePointSource {
    async fn fetch_documents(&self) -> Result<Vec<DocumentPoint>, FetchError> {
        let (url, bytes) = Self::read(&self.documents).await?;
        parse_document_points(&bytes).map_err(|source| FetchError::Decode { url, source })
    }

    async fn fetch_query(&self) -> Result<QueryPoint, FetchError> {
        let (url, bytes) = Self::read(&self.query).await?;
        parse_query_point(&bytes).map_err(|source| FetchError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::write_query_point_to_file;
    use crate::Point3D;

    #[test]
    fn cache_bust_respects_existing_query() {
        assert_eq!(cache_bust("http://h/q.json", 42), "http://h/q.json?t=42");
        assert_eq!(cache_bust("http://h/q.json?v=1", 42), "http://h/q.json?v=1&t=42");
    }

    #[test]
    fn join_url_single_slash() {
        let want = "http://h/static/doc_points.json";
        assert_eq!(join_url("http://h/static/", "/doc_points.json"), want);
        assert_eq!(join_url("http://h/static", "doc_points.json"), want);
    }

    #[tokio::test]
    async fn file_source_reads_current_contents() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("doc_points.json");
        let query = dir.path().join("query_point.json");
        std::fs::write(&docs, r#"[{"x": 0, "y": 0, "z": 3, "doc": "only"}]"#).unwrap();
        std::fs::write(&query, "{}").unwrap();

        let source = FilePointSource::new(&docs, &query);
        assert_eq!(source.fetch_documents().await.unwrap().len(), 1);
        assert!(source.fetch_query().await.unwrap().point().is_none());

        write_query_point_to_file(Point3D::new(0.0, 0.0, 1.0), &query).unwrap();
        assert_eq!(
            source.fetch_query().await.unwrap().point(),
            Some(Point3D::new(0.0, 0.0, 1.0))
        );
    }

    #[tokio::test]
    async fn file_source_missing_file_is_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilePointSource::new(dir.path().join("a"), dir.path().join("b"));
        assert!(matches!(
            source.fetch_query().await,
            Err(FetchError::Transport { .. })
        ));
    }
}
