//! Error classification logic.

/// Map an HTTP status to a stable error class string.
///
/// Classes follow the common chat-completion provider taxonomy. Anything
/// unrecognized falls back to `http_error`.
pub fn classify_status(status: u16) -> &'static str {
    match status {
        400 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        503 | 529 => "overloaded",
        500..=599 => "server_error",
        _ => "http_error",
    }
}

/// Whether a status is worth retrying with backoff.
///
/// Transient server conditions (5xx) and rate limiting (429) are; every
/// other client error will fail identically on a retry.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}
