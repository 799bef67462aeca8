//! The capability set the runner needs from the Chaos service.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChaosError {
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),

    #[error("invalid status code received: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// One unit of a streamed subdomain response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Label relative to the requested domain.
    Subdomain(String),
    /// Response payload to be passed through untouched.
    Raw(Vec<u8>),
}

/// Lazily produced items; the first `Err` ends the stream.
pub type ItemStream = Box<dyn Iterator<Item = Result<Item, ChaosError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainsRequest {
    pub domain: String,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Statistics {
    pub subdomains: u64,
}

pub trait ChaosApi {
    fn get_subdomains(&self, req: &SubdomainsRequest) -> ItemStream;

    /// Each item is the raw JSON of one record.
    fn get_bbq_subdomains(&self, req: &SubdomainsRequest) -> ItemStream;

    fn put_subdomains(&self, contents: &mut dyn std::io::Read) -> Result<(), ChaosError>;

    fn get_statistics(&self, domain: &str) -> Result<Statistics, ChaosError>;
}
