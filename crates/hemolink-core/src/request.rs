//! Donation request model and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::LocationDescriptor;
use crate::identity::Identity;

/// ABO/Rh blood groups accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Normal,
    Urgent,
    Critical,
}

/// The hospital's ruling on a donor's acceptance.
///
/// Produced exclusively by the hospital-admin side; this client only ever
/// observes it from server responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HospitalRuling {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRef {
    pub id: String,
    pub name: String,
}

/// A blood donation request as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub request_id: Uuid,
    pub hospital_ref: HospitalRef,
    pub blood_type: BloodType,
    pub urgency_level: UrgencyLevel,
    pub units_needed: u32,
    #[serde(default)]
    pub location: Option<LocationDescriptor>,
    pub date_posted: DateTime<Utc>,
    #[serde(default)]
    pub donor_acceptance: bool,
    #[serde(default)]
    pub hospital_ruling: HospitalRuling,
    #[serde(default)]
    pub accepted_by: Option<Identity>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Donor-visible lifecycle state, keyed by the acceptance flag and the
/// hospital's ruling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    /// No donor has volunteered yet.
    Available,
    /// A donor volunteered; the hospital has not ruled.
    PendingApproval,
    /// Terminal for this donor.
    Approved,
    /// Terminal for this donor.
    Rejected { reason: Option<String> },
}

impl DonationRequest {
    pub fn state(&self) -> RequestState {
        if !self.donor_acceptance {
            return RequestState::Available;
        }
        match self.hospital_ruling {
            HospitalRuling::Approved => RequestState::Approved,
            HospitalRuling::Rejected => RequestState::Rejected {
                reason: self.rejection_reason.clone(),
            },
            // An accepted request without a ruling is pending by definition.
            HospitalRuling::None | HospitalRuling::Pending => RequestState::PendingApproval,
        }
    }

    /// Approved and Rejected never regress through this client.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state(),
            RequestState::Approved | RequestState::Rejected { .. }
        )
    }
}
