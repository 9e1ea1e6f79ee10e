// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Approximate geographic origin for submissions.
//!
//! The backing database is optional. Every failure path collapses into
//! "no location", which callers treat as normal.

use maxminddb::geoip2;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geo database error: {0}")]
    Database(#[from] maxminddb::MaxMindDBError),
}

/// Country and city names, either of which may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub country: Option<String>,
    pub city: Option<String>,
}

impl Location {
    fn is_empty(&self) -> bool {
        self.country.as_deref().unwrap_or("").is_empty() && self.city.as_deref().unwrap_or("").is_empty()
    }
}

/// A source of location records keyed by IP.
pub trait LocationSource: Send + Sync {
    fn locate(&self, ip: IpAddr) -> Result<Location, GeoError>;
}

/// MaxMind GeoLite2/GeoIP2 City database.
pub struct MaxMindLookup {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl MaxMindLookup {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GeoError> {
        let reader = maxminddb::Reader::open_readfile(path)?;
        Ok(Self { reader })
    }
}

impl LocationSource for MaxMindLookup {
    fn locate(&self, ip: IpAddr) -> Result<Location, GeoError> {
        let record: geoip2::City = self.reader.lookup(ip)?;

        let country = record
            .country
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").map(|s| s.to_string()));
        let city = record
            .city
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").map(|s| s.to_string()));

        Ok(Location { country, city })
    }
}

/// Optional geo enrichment.
#[derive(Default)]
pub struct GeoEnricher {
    source: Option<Box<dyn LocationSource>>,
}

impl GeoEnricher {
    /// Enricher that never finds anything.
    pub fn disabled() -> Self {
        Self { source: None }
    }

    pub fn new(source: Box<dyn LocationSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Build from an optional database path.
    ///
    /// No path, or a path that does not exist, gives a disabled enricher. A
    /// file that exists but cannot be opened is an error.
    pub fn from_path(path: Option<&str>) -> Result<Self, GeoError> {
        let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
            info!("No geo database configured, location enrichment disabled");
            return Ok(Self::disabled());
        };
        if !Path::new(path).exists() {
            warn!(path = %path, "Geo database not found, location enrichment disabled");
            return Ok(Self::disabled());
        }
        let lookup = MaxMindLookup::open(path)?;
        info!(path = %path, "Loaded geo database");
        Ok(Self::new(Box::new(lookup)))
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Locate `address`. Never fails.
    pub fn lookup(&self, address: &str) -> Option<Location> {
        let source = self.source.as_ref()?;
        let ip: IpAddr = address.trim().parse().ok()?;

        match source.locate(ip) {
            Ok(location) if !location.is_empty() => Some(location),
            Ok(_) => None,
            Err(err) => {
                debug!(%ip, error = %err, "Geo lookup failed");
                None
            }
        }
    }
}
