//! Standardized error handling for registry HTTP responses

use crate::error::CleanerError;
use reqwest::StatusCode;

/// Standard error handler for HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Handle login-related HTTP errors
    pub fn handle_auth_error(status: StatusCode, error_text: &str) -> CleanerError {
        let error_msg = match status.as_u16() {
            400 => format!("Invalid login request: {}", error_text),
            401 => "Invalid username or password/personal access token".to_string(),
            403 => "Access denied - account may require a different login flow".to_string(),
            404 => "Login endpoint not found - check the registry URL".to_string(),
            429 => "Login rate limited by registry".to_string(),
            _ => format!("Login failed (status {}): {}", status, error_text),
        };

        CleanerError::Auth(error_msg)
    }

    /// Describe a failed registry response for the given operation
    pub fn describe_registry_error(status: StatusCode, error_text: &str, operation: &str) -> String {
        match status.as_u16() {
            401 => format!("Unauthorized to perform {}: {}", operation, error_text),
            403 => format!(
                "Forbidden: insufficient permissions for {}: {}",
                operation, error_text
            ),
            404 => format!("Resource not found for {}: {}", operation, error_text),
            429 => format!("Rate limited during {}: {}", operation, error_text),
            500 => format!("Registry server error during {}: {}", operation, error_text),
            502 | 503 => format!("Registry unavailable for {}: {}", operation, error_text),
            _ => format!("{} failed (status {}): {}", operation, status, error_text),
        }
    }
}

/// Network error categorization and handling
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    /// Categorize and format network errors with helpful context
    pub fn describe(error: &reqwest::Error, context: &str) -> String {
        if error.is_timeout() {
            format!("{} timed out: {}", context, error)
        } else if error.is_connect() {
            format!("Connection error during {}: {}", context, error)
        } else if error.is_decode() {
            format!("Unexpected response body during {}: {}", context, error)
        } else {
            format!("{} network error: {}", context, error)
        }
    }
}
