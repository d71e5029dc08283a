//! Postal-code directory client (`ViaCEP`).
//!
//! Resolved CEPs are cached in memory for an hour. Not-found answers and
//! failures are not cached, so a retry always reaches the directory.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;
use vitrine_core::Cep;
use vitrine_core::checkout::{LookupOutcome, ResolvedAddress};

use crate::config::StorefrontConfig;

const CACHE_TTL: Duration = Duration::from_secs(3600);
const CACHE_CAPACITY: u64 = 10_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when querying the directory.
#[derive(Debug, Error)]
pub enum CepLookupError {
    /// HTTP request or body decoding failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Directory returned a non-success status.
    #[error("directory returned status {0}")]
    Status(u16),
}

/// Something that resolves CEPs to addresses.
pub trait AddressDirectory: Send + Sync {
    /// Look up `cep`. Transport problems are reported as
    /// [`LookupOutcome::Failed`], never as a panic or an error.
    fn lookup(&self, cep: &Cep) -> impl Future<Output = LookupOutcome> + Send;
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    /// `ViaCEP` flags unknown CEPs with `"erro": true` (or `"true"`).
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        }
    }

    fn into_address(self) -> ResolvedAddress {
        ResolvedAddress {
            street: self.logradouro,
            neighborhood: self.bairro,
            city: self.localidade,
            state: self.uf,
        }
    }
}

/// Client for the `ViaCEP` directory.
#[derive(Clone)]
pub struct CepClient {
    inner: Arc<CepClientInner>,
}

struct CepClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, ResolvedAddress>,
}

impl CepClient {
    /// Create a client for the directory at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, CepLookupError> {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            inner: Arc::new(CepClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Client for the directory at `CEP_DIRECTORY_URL`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, CepLookupError> {
        Self::new(&config.cep_directory_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Query the directory, bypassing the cache.
    ///
    /// Returns `Ok(None)` when the directory has no entry for the CEP.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be reached or answers with a
    /// non-success status or an unreadable body.
    #[instrument(skip(self), fields(cep = %cep))]
    pub async fn fetch(&self, cep: &Cep) -> Result<Option<ResolvedAddress>, CepLookupError> {
        let url = format!("{}/{}/json/", self.inner.base_url, cep.as_str());

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CepLookupError::Status(status.as_u16()));
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_not_found() {
            return Ok(None);
        }
        Ok(Some(body.into_address()))
    }
}

impl AddressDirectory for CepClient {
    async fn lookup(&self, cep: &Cep) -> LookupOutcome {
        if let Some(address) = self.inner.cache.get(cep.as_str()).await {
            debug!(cep = %cep, "Cache hit for CEP");
            return LookupOutcome::Found(address);
        }

        match self.fetch(cep).await {
            Ok(Some(address)) => {
                self.inner
                    .cache
                    .insert(cep.as_str().to_string(), address.clone())
                    .await;
                LookupOutcome::Found(address)
            }
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => {
                warn!(cep = %cep, error = %e, "CEP lookup failed");
                LookupOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_found() {
        let body: ViaCepResponse = serde_json::from_str(
            r#"{"cep":"01001-000","logradouro":"Praça da Sé","complemento":"lado ímpar",
                "bairro":"Sé","localidade":"São Paulo","uf":"SP","ibge":"3550308"}"#,
        )
        .unwrap();
        assert!(!body.is_not_found());

        let address = body.into_address();
        assert_eq!(address.street, "Praça da Sé");
        assert_eq!(address.neighborhood, "Sé");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");
    }

    #[test]
    fn test_parse_not_found_flags() {
        for raw in [r#"{"erro": true}"#, r#"{"erro": "true"}"#] {
            let body: ViaCepResponse = serde_json::from_str(raw).unwrap();
            assert!(body.is_not_found());
        }
        let body: ViaCepResponse = serde_json::from_str(r#"{"erro": false}"#).unwrap();
        assert!(!body.is_not_found());
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_failed() {
        let client = CepClient::new(&Url::parse("http://127.0.0.1:1/ws").unwrap()).unwrap();
        let cep = Cep::parse("01001000").unwrap();
        assert_eq!(client.lookup(&cep).await, LookupOutcome::Failed);
    }
}
