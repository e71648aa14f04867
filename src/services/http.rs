//! Shared HTTP plumbing for the external services.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{AssistError, Result};

/// Build a blocking client with a request timeout.
pub fn build_client(service: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("b1assist/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| AssistError::ServiceConnection {
            service: service.to_string(),
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// `base` with `params` appended as a query string.
pub fn url_with_query(service: &str, base: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(base, params).map_err(|e| AssistError::ConfigValidationError {
        message: format!("invalid {} URL '{}': {}", service, base, e),
    })
}

/// Map a transport error into the service error taxonomy.
pub fn transport_error(service: &str, timeout: Duration, err: reqwest::Error) -> AssistError {
    if err.is_timeout() {
        AssistError::ServiceTimeout {
            service: service.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        AssistError::ServiceConnection {
            service: service.to_string(),
            message: err.to_string(),
        }
    }
}

/// Map a body decoding error.
pub fn response_error(service: &str, err: impl std::fmt::Display) -> AssistError {
    AssistError::ServiceResponse {
        service: service.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_encoded() {
        let url = url_with_query(
            "geocoding",
            "https://maps.example.com/geocode/json",
            &[("address", "Avenida Paulista, 1578"), ("key", "k")],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://maps.example.com/geocode/json?address=Avenida+Paulista%2C+1578&key=k"
        );
    }

    #[test]
    fn invalid_base_is_a_config_error() {
        let err = url_with_query("registry", "not a url", &[]).unwrap_err();
        assert!(matches!(err, AssistError::ConfigValidationError { .. }));
        assert!(err.to_string().contains("registry"));
    }

    #[test]
    fn connection_refused_maps_to_connection_error() {
        let client = build_client("registry", Duration::from_secs(1)).unwrap();
        let err = client.get("http://127.0.0.1:9/").send().unwrap_err();

        let mapped = transport_error("registry", Duration::from_secs(1), err);

        assert!(matches!(
            mapped,
            AssistError::ServiceConnection { .. } | AssistError::ServiceTimeout { .. }
        ));
    }
}
