//! Status classification table tests.

use codegen_client::client::{classify_status, is_retryable_status};

#[test]
fn statuses_map_to_stable_classes() {
    let cases = [
        (400, "invalid_request"),
        (401, "authentication"),
        (403, "permission_denied"),
        (404, "not_found"),
        (408, "timeout"),
        (409, "conflict"),
        (413, "request_too_large"),
        (429, "rate_limited"),
        (500, "server_error"),
        (502, "server_error"),
        (503, "overloaded"),
        (529, "overloaded"),
        (418, "http_error"),
    ];
    for (status, class) in cases {
        assert_eq!(classify_status(status), class, "status {}", status);
    }
}

#[test]
fn only_rate_limits_and_server_errors_are_retryable() {
    for status in [429, 500, 502, 503, 529, 599] {
        assert!(is_retryable_status(status), "status {}", status);
    }
    for status in [400, 401, 403, 404, 408, 409, 413, 418] {
        assert!(!is_retryable_status(status), "status {}", status);
    }
}
