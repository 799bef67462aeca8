use std::io::{self, BufRead, BufReader, Read};
use std::time::Instant;

use serde::Deserialize;
use tracing::debug;
use ureq::http::Response;
use ureq::{Agent, Body};
use url::Url;

use crate::client::{
    ChaosApi, ChaosError, Item, ItemStream, OutputFormat, Statistics, SubdomainsRequest,
};

#[derive(Debug, Deserialize)]
struct SubdomainsResponse {
    #[serde(default)]
    subdomains: Vec<String>,
}

/// Blocking client for the Chaos HTTP API.
pub struct HttpClient {
    agent: Agent,
    base_url: Url,
    api_key: String,
}

impl HttpClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ChaosError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ChaosError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ChaosError::InvalidUrl(base_url.to_string()));
        }

        // Status codes are checked by hand so the service's message reaches the user.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        Ok(Self {
            agent,
            base_url: parsed,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ChaosError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ChaosError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<Body, ChaosError> {
        let url = self.endpoint(segments)?;
        let start_time = Instant::now();
        let resp = self
            .agent
            .get(url.as_str())
            .header("Authorization", self.api_key.as_str())
            .call()?;
        debug!(
            action = "request",
            component = "http_client",
            method = "GET",
            url = %url,
            status = resp.status().as_u16(),
            duration_ms = start_time.elapsed().as_millis(),
            "Request completed"
        );
        check_status(resp)
    }
}

fn check_status(mut resp: Response<Body>) -> Result<Body, ChaosError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.into_body());
    }
    let body = resp.body_mut().read_to_string().unwrap_or_default();
    Err(ChaosError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

fn failed(err: ChaosError) -> ItemStream {
    Box::new(std::iter::once(Err(err)))
}

impl ChaosApi for HttpClient {
    fn get_subdomains(&self, req: &SubdomainsRequest) -> ItemStream {
        let body = match self.get(&["dns", &req.domain, "subdomains"]) {
            Ok(body) => body,
            Err(e) => return failed(e),
        };

        match req.format {
            OutputFormat::Json => {
                let mut raw = Vec::new();
                match body.into_reader().read_to_end(&mut raw) {
                    Ok(_) => Box::new(std::iter::once(Ok(Item::Raw(raw)))),
                    Err(e) => failed(e.into()),
                }
            }
            OutputFormat::Text => {
                match serde_json::from_reader::<_, SubdomainsResponse>(body.into_reader()) {
                    Ok(resp) => Box::new(
                        resp.subdomains
                            .into_iter()
                            .map(|label| Ok(Item::Subdomain(label))),
                    ),
                    Err(e) => failed(e.into()),
                }
            }
        }
    }

    fn get_bbq_subdomains(&self, req: &SubdomainsRequest) -> ItemStream {
        let body = match self.get(&["dns", &req.domain, "public-recon-data"]) {
            Ok(body) => body,
            Err(e) => return failed(e),
        };

        // One JSON record per line.
        let lines = BufReader::new(body.into_reader()).lines();
        Box::new(
            lines
                .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
                .map(|line: io::Result<String>| {
                    line.map(|l| Item::Raw(l.into_bytes()))
                        .map_err(ChaosError::from)
                }),
        )
    }

    fn put_subdomains(&self, contents: &mut dyn Read) -> Result<(), ChaosError> {
        let mut body = Vec::new();
        contents.read_to_end(&mut body)?;

        let url = self.endpoint(&["dns", "add"])?;
        let start_time = Instant::now();
        let resp = self
            .agent
            .post(url.as_str())
            .header("Authorization", self.api_key.as_str())
            .send(&body[..])?;
        debug!(
            action = "request",
            component = "http_client",
            method = "POST",
            url = %url,
            bytes = body.len(),
            status = resp.status().as_u16(),
            duration_ms = start_time.elapsed().as_millis(),
            "Request completed"
        );
        check_status(resp)?;
        Ok(())
    }

    fn get_statistics(&self, domain: &str) -> Result<Statistics, ChaosError> {
        let body = self.get(&["dns", domain])?;
        Ok(serde_json::from_reader(body.into_reader())?)
    }
}
