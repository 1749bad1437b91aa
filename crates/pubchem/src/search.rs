//! Identifier search response interpretation.
//!
//! A PUG REST name search answers with one of two shapes:
//!
//! ```json
//! {"IdentifierList": {"CID": [2244]}}
//! {"Fault": {"Code": "PUGREST.NotFound", "Message": "No CID found"}}
//! ```
//!
//! Faults arrive with a non-2xx status, so the body is inspected before the status.

use crate::{decode_json, PubChemError, PubChemResult, NOT_FOUND_FAULT_CODE};
use drugchem_types::{ExternalId, RecordKind};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    #[serde(default)]
    identifier_list: Option<IdentifierList>,
    #[serde(default)]
    fault: Option<Fault>,
}

#[derive(Debug, Default, Deserialize)]
struct IdentifierList {
    #[serde(rename = "CID", default)]
    cid: Vec<ExternalId>,
    #[serde(rename = "SID", default)]
    sid: Vec<ExternalId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Fault {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Turn a search response into candidate identifiers.
///
/// # Arguments
///
/// * `kind` - Collection that was searched; selects the `CID` or `SID` list.
/// * `term` - The search term, used in the not-found error.
/// * `status` - HTTP status code of the response.
/// * `url` - Request URL, used in status errors.
/// * `body` - Raw response body.
///
/// # Returns
///
/// The candidate identifiers in service order. The list is never empty.
///
/// # Errors
///
/// Returns [`PubChemError`] if:
/// - the service reports `PUGREST.NotFound`, answers 404, or returns no identifiers (`NotFound`),
/// - the service reports any other fault (`Fault`),
/// - the status is not 2xx and the body is not a recognised fault (`Status`),
/// - a 2xx body does not match the response schema (`Decode`).
pub fn interpret_search(
    kind: RecordKind,
    term: &str,
    status: u16,
    url: &str,
    body: &str,
) -> PubChemResult<Vec<ExternalId>> {
    let not_found = || PubChemError::NotFound {
        kind,
        term: term.to_owned(),
    };
    let success = (200..300).contains(&status);

    let response = match decode_json::<SearchResponse>(body) {
        Ok(response) => response,
        Err(_) if status == 404 => return Err(not_found()),
        Err(_) if !success => {
            return Err(PubChemError::Status {
                status,
                url: url.to_owned(),
            })
        }
        Err(err) => return Err(err),
    };

    if let Some(list) = response.identifier_list {
        let ids = match kind {
            RecordKind::Compound => list.cid,
            RecordKind::Substance => list.sid,
        };
        if !ids.is_empty() {
            return Ok(ids);
        }
    }

    match response.fault {
        Some(fault) if fault.code == NOT_FOUND_FAULT_CODE => Err(not_found()),
        Some(fault) => Err(PubChemError::Fault {
            code: fault.code,
            message: fault.message,
        }),
        None if status == 404 || success => Err(not_found()),
        None => Err(PubChemError::Status {
            status,
            url: url.to_owned(),
        }),
    }
}
