//! Session location parsing.
//!
//! The chunked upload endpoints hand back a location such as
//! `/organizations/1/gei/archive/blobs/uploads?part_number=2&guid=<guid>&upload_id=<id>`.
//! The session identifiers only exist in that query string, so it is tokenized
//! into key/value pairs rather than searched for literal substrings.

use gh_blob_core::{BlobError, BlobResult};

/// Identifiers of a chunked upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIds {
    pub guid: String,
    pub upload_id: String,
}

/// Split the query string of `location` into decoded key/value pairs, in order.
///
/// Anything before the first `?` and after a `#` is ignored. Pairs without `=`
/// get an empty value. Percent-escapes are decoded where they form valid UTF-8.
pub fn query_params(location: &str) -> Vec<(String, String)> {
    let Some((_, query)) = location.split_once('?') else {
        return Vec::new();
    };
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// First value of `name` in the location's query string.
pub fn query_param(location: &str, name: &str) -> Option<String> {
    query_params(location)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// Extract `guid` and `upload_id`, independent of parameter order.
pub fn parse_session_ids(location: &str) -> BlobResult<SessionIds> {
    let mut guid = None;
    let mut upload_id = None;
    for (key, value) in query_params(location) {
        match key.as_str() {
            "guid" if guid.is_none() => guid = Some(value),
            "upload_id" if upload_id.is_none() => upload_id = Some(value),
            _ => {}
        }
    }

    let missing = |name: &str| {
        BlobError::protocol(
            "chunked upload init",
            format!("location '{}' has no {} parameter", location, name),
        )
    };

    let guid = guid.filter(|g| !g.is_empty()).ok_or_else(|| missing("guid"))?;
    let upload_id = upload_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| missing("upload_id"))?;

    Ok(SessionIds { guid, upload_id })
}
