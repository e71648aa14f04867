//! Clients for the external services: company registry and geocoding.

pub mod geocode;
pub mod http;
pub mod json_path;
pub mod registry;

pub use geocode::{Coordinates, GeocodeClient, Geocoder, GEOCODE_SERVICE};
pub use registry::{
    CompanyLookup, CompanyRecord, LookupCache, RegistryClient, RegistryLookup, CACHE_TIERS,
    REGISTRY_SERVICE,
};
