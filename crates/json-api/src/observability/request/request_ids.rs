//! Request ids: accepted from the caller when well formed, generated otherwise.

use salvo::{http::header::HeaderValue, prelude::Response};
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse the caller's id when it is short and made of token characters, so a
/// hostile header cannot smuggle control characters into the logs.
pub(super) fn resolve_request_id(incoming: Option<&str>) -> String {
    incoming
        .map(str::trim)
        .filter(|id| is_acceptable(id))
        .map_or_else(|| Uuid::now_v7().to_string(), str::to_owned)
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
}

pub(super) fn echo_request_id(res: &mut Response, request_id: &str) {
    // Ids that reach here are either generated or passed `is_acceptable`.
    if let Ok(value) = HeaderValue::from_str(request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_generated(id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    #[test]
    fn well_formed_ids_are_propagated() {
        assert_eq!(resolve_request_id(Some("abc-123")), "abc-123");
        assert_eq!(resolve_request_id(Some(" lb:7f3a.01 ")), "lb:7f3a.01");
    }

    #[test]
    fn missing_or_blank_ids_are_generated() {
        assert!(is_generated(&resolve_request_id(None)));
        assert!(is_generated(&resolve_request_id(Some("  "))));
    }

    #[test]
    fn hostile_ids_are_replaced() {
        let oversized = "a".repeat(MAX_REQUEST_ID_LEN + 1);

        for id in ["evil\nlevel=error", "has space", "ใบสั่ง", oversized.as_str()] {
            let resolved = resolve_request_id(Some(id));

            assert!(is_generated(&resolved), "expected {id:?} to be replaced");
        }
    }
}
