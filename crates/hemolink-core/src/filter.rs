//! Client-side filtering of request listings

use chrono::{DateTime, Utc};

use crate::geo::{self, Coordinate, DEFAULT_NEARBY_RADIUS_KM};
use crate::request::{BloodType, DonationRequest, UrgencyLevel};

/// Geographic constraint for the "near me" toggle.
#[derive(Debug, Clone, Copy)]
pub struct NearbyFilter {
    pub origin: Coordinate,
    pub radius_km: f64,
}

impl NearbyFilter {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            radius_km: DEFAULT_NEARBY_RADIUS_KM,
        }
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Build a nearby filter from a position acquisition attempt.
    ///
    /// Denied or failed acquisition disables the filter rather than failing
    /// the listing.
    pub fn from_position<E>(position: Result<Coordinate, E>) -> Option<Self> {
        position.ok().map(Self::new)
    }
}

/// Listing filter, applied client-side after fetching.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub blood_type: Option<BloodType>,
    pub urgency: Option<UrgencyLevel>,
    /// Case-insensitive substring match on hospital name or address text.
    pub search: Option<String>,
    pub posted_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub nearby: Option<NearbyFilter>,
}

impl RequestFilter {
    pub fn matches(&self, request: &DonationRequest) -> bool {
        if let Some(blood_type) = self.blood_type {
            if request.blood_type != blood_type {
                return false;
            }
        }

        if let Some(urgency) = self.urgency {
            if request.urgency_level != urgency {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hospital = request.hospital_ref.name.to_lowercase();
            let address = request
                .location
                .as_ref()
                .and_then(|location| location.as_text())
                .unwrap_or("")
                .to_lowercase();
            if !hospital.contains(&needle) && !address.contains(&needle) {
                return false;
            }
        }

        if let Some((from, to)) = self.posted_between {
            if request.date_posted < from || request.date_posted > to {
                return false;
            }
        }

        if let Some(nearby) = self.nearby {
            // Requests without a resolvable coordinate are excluded from
            // nearby results but remain visible in unfiltered listings.
            let Some(coordinate) = request.location.as_ref().and_then(geo::resolve_coordinate)
            else {
                return false;
            };
            if !geo::is_nearby(nearby.origin, coordinate, nearby.radius_km) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, requests: Vec<DonationRequest>) -> Vec<DonationRequest> {
        requests
            .into_iter()
            .filter(|request| self.matches(request))
            .collect()
    }
}
