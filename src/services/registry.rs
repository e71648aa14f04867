//! Company registry lookups with tiered caching.
//!
//! The registry bills for fresh queries, so each lookup walks three cache
//! tiers and only pays when the cached tiers have nothing:
//!
//! | Tier | strategy         | maxAge (days) |
//! |------|------------------|---------------|
//! | 1    | `CACHE`          | 45            |
//! | 2    | `CACHE`          | 150           |
//! | 3    | `CACHE_IF_FRESH` | 1             |
//!
//! A 404 on a tier moves on to the next one after a pause. Any other
//! non-200 status ends the lookup.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::document::clean_document;
use crate::error::{AssistError, Result};
use crate::session::{Address, SessionData, EXEMPT_REGISTRATION};

use super::http::{build_client, response_error, transport_error, url_with_query};
use super::json_path::{extract, extract_array, extract_bool, extract_string};

/// Service name used in errors and logs.
pub const REGISTRY_SERVICE: &str = "registry";

/// One cache strategy of the tiered lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTier {
    pub strategy: &'static str,
    pub max_age_days: u32,
    pub description: &'static str,
}

/// Tiers in the order they are tried.
pub const CACHE_TIERS: [CacheTier; 3] = [
    CacheTier {
        strategy: "CACHE",
        max_age_days: 45,
        description: "cache up to 45 days",
    },
    CacheTier {
        strategy: "CACHE",
        max_age_days: 150,
        description: "cache up to 150 days",
    },
    CacheTier {
        strategy: "CACHE_IF_FRESH",
        max_age_days: 1,
        description: "online query (billed)",
    },
];

/// HTTP client for the commercial registry endpoint.
pub struct RegistryClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    tier_pause: Duration,
}

impl RegistryClient {
    /// Create a client. `base_url` is concatenated with the tax id digits.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        tier_pause: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(REGISTRY_SERVICE, timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
            tier_pause,
        })
    }

    /// Fetch the raw registry document for `tax_id`, walking the cache tiers.
    pub fn fetch(&self, tax_id: &str) -> Result<Value> {
        let digits = clean_document(tax_id);
        let endpoint = format!("{}{}", self.base_url, digits);

        for (index, tier) in CACHE_TIERS.iter().enumerate() {
            info!(tax_id = %digits, tier = tier.description, "querying registry");
            let max_age = tier.max_age_days.to_string();
            let url = url_with_query(
                REGISTRY_SERVICE,
                &endpoint,
                &[
                    ("simples", "true"),
                    ("registrations", "BR"),
                    ("strategy", tier.strategy),
                    ("maxAge", &max_age),
                ],
            )?;

            let response = self
                .client
                .get(url)
                .header("Authorization", &self.api_key)
                .send()
                .map_err(|e| transport_error(REGISTRY_SERVICE, self.timeout, e))?;

            match response.status() {
                StatusCode::OK => {
                    return response
                        .json::<Value>()
                        .map_err(|e| response_error(REGISTRY_SERVICE, e));
                }
                StatusCode::NOT_FOUND => {
                    warn!(tax_id = %digits, tier = tier.description, "no registry data on this tier");
                    if index + 1 < CACHE_TIERS.len() && !self.tier_pause.is_zero() {
                        thread::sleep(self.tier_pause);
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => return Err(AssistError::RegistryRateLimited),
                StatusCode::UNAUTHORIZED => return Err(AssistError::RegistryUnauthorized),
                status => {
                    let body = response.text().unwrap_or_default();
                    return Err(AssistError::RegistryUnexpected {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
        }

        Err(AssistError::RegistryNotFound { tax_id: digits })
    }
}

/// Normalized company data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub status: String,
    pub company_name: String,
    /// `YYYY-MM-DD` as returned by the registry.
    pub founded: String,
    /// Active registration for the company's own state, or `Isento`.
    pub state_registration: String,
    pub simples_optant: Option<bool>,
    pub suframa_valid: bool,
    pub suframa_number: String,
    pub partners: Vec<String>,
    pub address: Address,
}

impl CompanyRecord {
    /// Normalize a raw registry document.
    pub fn from_response(data: &Value) -> Self {
        let (street_type, street) = split_street(&extract_string(data, "address.street"));
        let address = Address {
            street_type,
            street,
            number: extract_string(data, "address.number"),
            complement: extract_string(data, "address.details"),
            district: extract_string(data, "address.district"),
            zip: clean_document(&extract_string(data, "address.zip")),
            city: extract_string(data, "address.city"),
            state: extract_string(data, "address.state"),
        };

        let partners = extract_array(data, "company.members")
            .iter()
            .map(|member| extract_string(member, "person.name"))
            .filter(|name| !name.is_empty())
            .collect();

        let suframa_approved = extract_bool(data, "suframa[0].approved").unwrap_or(false);
        let suframa_number = extract_string(data, "suframa[0].number");
        let suframa_valid = suframa_approved && !suframa_number.is_empty();

        let state_registration =
            select_state_registration(extract_array(data, "registrations"), &address.state);

        Self {
            status: extract_string(data, "status.text"),
            company_name: extract_string(data, "company.name"),
            founded: extract_string(data, "founded"),
            state_registration,
            simples_optant: extract_bool(data, "company.simples.optant"),
            suframa_valid,
            suframa_number: if suframa_valid { suframa_number } else { String::new() },
            partners,
            address,
        }
    }

    /// Copy the record into the session.
    pub fn apply_to(&self, session: &mut SessionData) {
        session.registry_status = self.status.clone();
        session.company_name = self.company_name.clone();
        session.founded = self.founded.clone();
        session.state_registration = self.state_registration.clone();
        session.simples_optant = self.simples_optant;
        session.partners = self.partners.clone();
        session.address = self.address.clone();
        session
            .extra
            .insert("suframa_valido".to_string(), json!(self.suframa_valid));
        session
            .extra
            .insert("suframa_numero".to_string(), json!(self.suframa_number));
    }
}

/// Split `"Rua das Flores"` into `("Rua", "das Flores")`.
///
/// A single word is treated as the street name with no type.
pub fn split_street(full: &str) -> (String, String) {
    let full = full.trim();
    match full.split_once(' ') {
        Some((kind, name)) => (kind.to_string(), name.trim().to_string()),
        None => (String::new(), full.to_string()),
    }
}

/// First enabled registration whose state matches `company_state`.
pub fn select_state_registration(registrations: &[Value], company_state: &str) -> String {
    if company_state.is_empty() {
        debug!("company state unknown, state registration left exempt");
        return EXEMPT_REGISTRATION.to_string();
    }

    for registration in registrations {
        let number = extract_string(registration, "number");
        let state = extract_string(registration, "state");
        let enabled = extract_bool(registration, "enabled").unwrap_or(false);

        if number.is_empty() || state.is_empty() {
            debug!(?registration, "registration ignored: incomplete");
        } else if !enabled {
            debug!(%number, %state, "registration ignored: inactive");
        } else if !state.eq_ignore_ascii_case(company_state) {
            debug!(%number, %state, company_state, "registration ignored: other state");
        } else {
            debug!(%number, %state, "registration selected");
            return number;
        }
    }

    EXEMPT_REGISTRATION.to_string()
}

/// Result of the last lookup, keyed by the normalized tax id.
#[derive(Debug, Default)]
pub struct LookupCache {
    entry: Option<(String, CompanyRecord)>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached record for `tax_id`, if it is the last one looked up.
    pub fn get(&self, tax_id: &str) -> Option<&CompanyRecord> {
        let key = clean_document(tax_id);
        self.entry
            .as_ref()
            .filter(|(cached, _)| *cached == key)
            .map(|(_, record)| record)
    }

    /// Replace the cached entry.
    pub fn store(&mut self, tax_id: &str, record: CompanyRecord) {
        self.entry = Some((clean_document(tax_id), record));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Resolves tax ids to normalized company records.
pub trait CompanyLookup {
    fn lookup(&mut self, tax_id: &str) -> Result<CompanyRecord>;
}

/// [`CompanyLookup`] over the registry, caching the last result.
pub struct RegistryLookup {
    client: RegistryClient,
    cache: LookupCache,
}

impl RegistryLookup {
    pub fn new(client: RegistryClient) -> Self {
        Self {
            client,
            cache: LookupCache::new(),
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }
}

impl CompanyLookup for RegistryLookup {
    fn lookup(&mut self, tax_id: &str) -> Result<CompanyRecord> {
        if let Some(record) = self.cache.get(tax_id) {
            debug!(tax_id, "registry cache hit");
            return Ok(record.clone());
        }

        let started = Instant::now();
        let raw = self.client.fetch(tax_id)?;
        if extract(&raw, "company").is_none() {
            warn!(tax_id, "registry response has no company block");
        }
        let record = CompanyRecord::from_response(&raw);
        info!(
            tax_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "registry lookup finished"
        );

        self.cache.store(tax_id, record.clone());
        Ok(record)
    }
}
