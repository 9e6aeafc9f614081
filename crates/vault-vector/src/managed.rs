//! Adapter for an external managed vector store.
//!
//! Talks to a Chroma-compatible REST API. Durability belongs to the remote
//! service, so `save()` does nothing. Scores are distances exactly as the
//! remote returns them (ascending, lower = closer) and are never re-sorted.
//!
//! Every call blocks the calling thread for the HTTP round trip. Construct,
//! use, and drop [`HttpCollectionClient`] off async worker threads (for
//! example inside `tokio::task::spawn_blocking`).

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vault_embeddings::Fingerprint;

use crate::error::IndexError;
use crate::index::{IndexStats, ScoreKind, SimilarityResult, VectorIndex};

/// Managed store configuration
#[derive(Debug, Clone)]
pub struct ManagedConfig {
    /// Base URL, e.g. "http://localhost:8000"
    pub base_url: String,
    /// Collection holding the fingerprints
    pub collection: String,
    /// Dimension reported in stats (the remote enforces its own)
    pub dimension: usize,
    pub timeout: Duration,
}

impl ManagedConfig {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            dimension,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Minimal collection API the adapter needs from a remote store.
pub trait CollectionClient: Send + Sync {
    fn add(&self, id: &str, embedding: &[f32]) -> Result<(), IndexError>;

    /// Nearest entries as `(id, distance)`, in the store's order.
    fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<(String, f32)>, IndexError>;

    fn count(&self) -> Result<usize, IndexError>;
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    ids: [&'a str; 1],
    embeddings: [&'a [f32]; 1],
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 1],
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Option<Vec<Vec<String>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

fn backend_err(context: &str, err: impl std::fmt::Display) -> IndexError {
    IndexError::BackendFailure(format!("{context}: {err}"))
}

/// Map a non-2xx response into the index error taxonomy.
fn check_status(context: &str, response: Response) -> Result<Response, IndexError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().unwrap_or_default();
    Err(IndexError::BackendFailure(format!(
        "{context}: HTTP {status}: {body}"
    )))
}

/// Blocking HTTP client for one remote collection.
pub struct HttpCollectionClient {
    client: Client,
    base_url: String,
    collection_id: String,
}

impl HttpCollectionClient {
    /// Connect and get-or-create the configured collection.
    pub fn connect(config: &ManagedConfig) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| backend_err("building HTTP client", e))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{base_url}/api/v1/collections"))
            .json(&CreateCollectionRequest {
                name: &config.collection,
                get_or_create: true,
            })
            .send()
            .map_err(|e| backend_err("creating collection", e))?;
        let collection: CollectionResponse = check_status("creating collection", response)?
            .json()
            .map_err(|e| backend_err("decoding collection", e))?;

        info!(url = %base_url, collection = %config.collection, "Connected to managed vector store");
        Ok(Self {
            client,
            base_url,
            collection_id: collection.id,
        })
    }

    fn url(&self, action: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection_id, action
        )
    }
}

impl CollectionClient for HttpCollectionClient {
    fn add(&self, id: &str, embedding: &[f32]) -> Result<(), IndexError> {
        let response = self
            .client
            .post(self.url("add"))
            .json(&AddRequest {
                ids: [id],
                embeddings: [embedding],
            })
            .send()
            .map_err(|e| backend_err("add", e))?;
        check_status("add", response)?;
        Ok(())
    }

    fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<(String, f32)>, IndexError> {
        let response = self
            .client
            .post(self.url("query"))
            .json(&QueryRequest {
                query_embeddings: [embedding],
                n_results,
                include: ["distances"],
            })
            .send()
            .map_err(|e| backend_err("query", e))?;
        let body: QueryResponse = check_status("query", response)?
            .json()
            .map_err(|e| backend_err("decoding query", e))?;

        let ids = body.ids.and_then(|v| v.into_iter().next()).unwrap_or_default();
        let distances = body
            .distances
            .and_then(|v| v.into_iter().next())
            .unwrap_or_default();
        Ok(ids.into_iter().zip(distances).collect())
    }

    fn count(&self) -> Result<usize, IndexError> {
        let response = self
            .client
            .get(self.url("count"))
            .send()
            .map_err(|e| backend_err("count", e))?;
        check_status("count", response)?
            .json()
            .map_err(|e| backend_err("decoding count", e))
    }
}

/// [`VectorIndex`] backed by a remote collection.
pub struct ManagedStoreIndex {
    client: Box<dyn CollectionClient>,
    dimension: usize,
}

impl ManagedStoreIndex {
    /// Connect over HTTP using `config`.
    pub fn connect(config: &ManagedConfig) -> Result<Self, IndexError> {
        let client = HttpCollectionClient::connect(config)?;
        Ok(Self::with_client(client, config.dimension))
    }

    /// Use an already constructed client.
    pub fn with_client(client: impl CollectionClient + 'static, dimension: usize) -> Self {
        Self {
            client: Box::new(client),
            dimension,
        }
    }
}

impl VectorIndex for ManagedStoreIndex {
    fn backend(&self) -> &'static str {
        "managed"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Distance
    }

    fn add(&self, id: &str, vector: &Fingerprint) -> Result<(), IndexError> {
        self.client.add(id, vector.as_slice())?;
        debug!(id = id, "Added vector to managed store");
        Ok(())
    }

    fn search(&self, query: &Fingerprint, k: usize) -> Result<Vec<SimilarityResult>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let results: Vec<SimilarityResult> = self
            .client
            .query(query.as_slice(), k)?
            .into_iter()
            .map(|(id, distance)| SimilarityResult::new(id, distance))
            .collect();
        debug!(k = k, found = results.len(), "Managed search complete");
        Ok(results)
    }

    fn save(&self) -> Result<(), IndexError> {
        Ok(())
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        Ok(IndexStats {
            total_vectors: self.client.count()?,
            dimension: self.dimension,
            pending_unsaved_count: 0,
        })
    }
}
