//! Human-readable classification of non-success upstream responses.

use reqwest::StatusCode;

/// Describes a non-success status the way an operator needs to read it in a
/// log line or an error body.
pub fn describe_status(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "HTTP 401: authentication required by repository".to_string(),
        StatusCode::FORBIDDEN => "HTTP 403: access to this repository is forbidden".to_string(),
        StatusCode::NOT_FOUND => {
            "HTTP 404: repository does not serve the dependency API".to_string()
        }
        StatusCode::TOO_MANY_REQUESTS => "HTTP 429: repository rate limit exceeded".to_string(),
        s if s.is_client_error() => format!("HTTP {}: request rejected", s.as_u16()),
        s if s.is_server_error() => format!("HTTP {}: repository server error", s.as_u16()),
        s => format!("HTTP {}: unexpected status", s.as_u16()),
    }
}
