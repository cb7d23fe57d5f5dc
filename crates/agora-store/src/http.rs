use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use agora_types::ContentAddress;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ByteStream, ContentStore};

/// HTTP endpoint paths exposed by a blob gateway.
pub mod endpoints {
    pub const BLOB: &str = "/v1/blob";
}

/// Wire scheme used to reach the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProtocol {
    Http,
    Https,
}

impl std::fmt::Display for GatewayProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Connection parameters for a blob gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host name.
    pub host: String,
    /// Gateway port.
    pub port: u16,
    /// Wire scheme.
    pub protocol: GatewayProtocol,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "ipfs.infura.io".into(),
            port: 5001,
            protocol: GatewayProtocol::Https,
        }
    }
}

impl GatewayConfig {
    /// The gateway base URL.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Response body returned by the gateway on a successful store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreBlobResponse {
    address: String,
}

/// Thin HTTP binding to a blob gateway.
///
/// `POST /v1/blob` stores a blob; `GET /v1/blob/{hex}` retrieves one as a
/// byte stream. The gateway is trusted to store bytes verbatim, but the
/// address it returns is still checked against a locally computed one.
pub struct HttpContentStore {
    http: reqwest::Client,
    base: String,
}

impl HttpContentStore {
    /// Create a binding from gateway connection parameters.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.base_url(),
        }
    }

    fn blob_url(&self) -> String {
        format!("{}{}", self.base, endpoints::BLOB)
    }
}

#[async_trait::async_trait]
impl ContentStore for HttpContentStore {
    async fn store(&self, bytes: &[u8]) -> StoreResult<ContentAddress> {
        let expected = ContentAddress::from_bytes(bytes);
        let response = self
            .http
            .post(self.blob_url())
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        let body: StoreBlobResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let computed = ContentAddress::from_hex(&body.address).map_err(|e| {
            StoreError::Unavailable(format!("gateway returned an unparseable address: {e}"))
        })?;
        if computed != expected {
            return Err(StoreError::AddressMismatch { expected, computed });
        }
        Ok(expected)
    }

    async fn retrieve(&self, address: &ContentAddress) -> StoreResult<ByteStream> {
        let url = format!("{}/{}", self.blob_url(), address.to_hex());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(*address));
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
            .boxed())
    }
}
