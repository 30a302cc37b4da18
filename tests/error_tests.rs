/// Error Handling Tests Module
///
/// This module contains tests for the error handling functionality,
/// focusing on error mapping and formatting.
///
use newsletter_client::errors::{ApiError, ConfigError, NavigationError};
use serde_json::json;

#[cfg(test)]
mod error_tests {
    use super::*;

    // Test ConfigError
    #[test]
    fn test_config_error() {
        let url_error = ConfigError::InvalidUrl {
            url: "ftp://x".to_string(),
            reason: "unsupported scheme 'ftp'".to_string(),
        };
        assert!(url_error.to_string().contains("ftp://x"));
        assert!(url_error.to_string().contains("unsupported scheme"));
    }

    // Test ApiError
    #[test]
    fn test_api_error() {
        let error = ApiError::Network("Failed to connect".to_string());
        assert!(error.to_string().contains("Failed to connect"));
        assert!(error.to_string().contains("Network error"));

        let error = ApiError::Parse("unexpected search response".to_string());
        assert!(error.to_string().contains("Response parse error"));

        let error = ApiError::Status {
            status: 404,
            message: "Email not found.".to_string(),
            body: Some(json!({"detail": "Email not found."})),
        };
        assert!(error.to_string().contains("404"));
        assert!(error.to_string().contains("Email not found."));
        assert_eq!(error.user_message("Failed to summarize email"), "Email not found.");
    }

    // Non-string detail values are not shown to the user
    #[test]
    fn test_structured_detail_falls_back() {
        let error = ApiError::Status {
            status: 422,
            message: "Unprocessable Entity".to_string(),
            body: Some(json!({"detail": [{"loc": ["query", "query"], "msg": "field required"}]})),
        };
        assert_eq!(error.detail(), None);
        assert_eq!(error.user_message("Failed to search emails"), "Failed to search emails");
    }

    #[test]
    fn test_navigation_error() {
        let error = NavigationError::Browser("no display".to_string());
        assert_eq!(error.to_string(), "Failed to open browser: no display");
    }
}
