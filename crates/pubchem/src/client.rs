//! Blocking HTTP client for PubChem.
//!
//! Endpoints, relative to the REST base URL:
//! - search: `/pug/{kind}/name/{term}/{cids|sids}/JSON`
//! - record: `/pug_view/data/{kind}/{id}/JSON`
//!
//! The client issues exactly one request per call. It does not retry and does not throttle;
//! pacing is the caller's concern.

use crate::record::{Record, RecordEnvelope};
use crate::{
    decode_json, interpret_search, CompoundDatabase, PubChemError, PubChemResult,
    DEFAULT_REST_BASE_URL,
};
use drugchem_types::{ExternalId, LookupTerm, RecordKind};
use reqwest::Url;

const USER_AGENT: &str = concat!("drugchem/", env!("CARGO_PKG_VERSION"));

/// PubChem implementation of [`CompoundDatabase`].
#[derive(Clone, Debug)]
pub struct PubChemClient {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl PubChemClient {
    /// Client against the public PubChem service.
    pub fn new() -> PubChemResult<Self> {
        Self::with_base_url(DEFAULT_REST_BASE_URL)
    }

    /// Client against an alternative REST base URL (mirror, proxy or test server).
    ///
    /// # Errors
    ///
    /// Returns `PubChemError::InvalidUrl` if `base_url` does not parse or cannot carry path
    /// segments, and `PubChemError::Http` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> PubChemResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| PubChemError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PubChemError::InvalidUrl(format!(
                "{base_url}: cannot be used as a base URL"
            )));
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the identifier search for `term`. The term is percent-encoded as one segment.
    pub fn search_url(&self, kind: RecordKind, term: &LookupTerm) -> PubChemResult<Url> {
        self.endpoint(&[
            "pug",
            kind.as_str(),
            "name",
            term.as_str(),
            kind.id_list_segment(),
            "JSON",
        ])
    }

    /// URL of the full record view for `id`.
    pub fn record_url(&self, kind: RecordKind, id: ExternalId) -> PubChemResult<Url> {
        let id = id.to_string();
        self.endpoint(&["pug_view", "data", kind.as_str(), &id, "JSON"])
    }

    fn endpoint(&self, segments: &[&str]) -> PubChemResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PubChemError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: &Url) -> PubChemResult<(u16, String)> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl CompoundDatabase for PubChemClient {
    fn search(&self, kind: RecordKind, term: &LookupTerm) -> PubChemResult<Vec<ExternalId>> {
        let url = self.search_url(kind, term)?;
        let (status, body) = self.get(&url)?;
        interpret_search(kind, term.as_str(), status, url.as_str(), &body)
    }

    fn fetch(&self, kind: RecordKind, id: ExternalId) -> PubChemResult<Record> {
        let url = self.record_url(kind, id)?;
        let (status, body) = self.get(&url)?;
        if !(200..300).contains(&status) {
            return Err(PubChemError::Status {
                status,
                url: url.to_string(),
            });
        }
        let envelope: RecordEnvelope = decode_json(&body)?;
        Ok(envelope.record)
    }
}
