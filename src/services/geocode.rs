//! Address geocoding.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{AssistError, Result};

use super::http::{build_client, response_error, transport_error, url_with_query};
use super::json_path::{extract, extract_string};

/// Service name used in errors and logs.
pub const GEOCODE_SERVICE: &str = "geocoding";

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Resolves addresses to coordinates.
pub trait Geocoder {
    fn geocode(&mut self, address: &str) -> Result<Coordinates>;
}

/// [`Geocoder`] over the geocoding JSON API.
pub struct GeocodeClient {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl GeocodeClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(GEOCODE_SERVICE, timeout)?,
            url: url.into(),
            api_key: api_key.into(),
            timeout,
        })
    }
}

impl Geocoder for GeocodeClient {
    fn geocode(&mut self, address: &str) -> Result<Coordinates> {
        let url = url_with_query(
            GEOCODE_SERVICE,
            &self.url,
            &[("address", address), ("key", &self.api_key)],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transport_error(GEOCODE_SERVICE, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Geocode {
                status: status.as_u16().to_string(),
                message: response.text().unwrap_or_default(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| response_error(GEOCODE_SERVICE, e))?;
        parse_response(&body, address)
    }
}

/// Interpret a geocoding response body.
pub fn parse_response(body: &Value, address: &str) -> Result<Coordinates> {
    match extract_string(body, "status").as_str() {
        "OK" => {
            let lat = extract(body, "results[0].geometry.location.lat").and_then(Value::as_f64);
            let lng = extract(body, "results[0].geometry.location.lng").and_then(Value::as_f64);
            match (lat, lng) {
                (Some(lat), Some(lng)) => {
                    debug!(address, lat, lng, "address geocoded");
                    Ok(Coordinates { lat, lng })
                }
                _ => Err(response_error(GEOCODE_SERVICE, "result without a location")),
            }
        }
        "ZERO_RESULTS" => Err(AssistError::GeocodeZeroResults {
            address: address.to_string(),
        }),
        other => {
            let message = extract_string(body, "error_message");
            Err(AssistError::Geocode {
                status: if other.is_empty() { "missing".to_string() } else { other.to_string() },
                message: if message.is_empty() {
                    "unspecified".to_string()
                } else {
                    message
                },
            })
        }
    }
}
