//! Donor-side blood request lifecycle
//!
//! [`BloodRequestClient`] drives the donor's transitions (accepting a
//! request) and keeps a local view of every request it has seen. Hospital
//! rulings are only ever observed from server responses, never produced
//! here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hemolink_core::filter::RequestFilter;
use hemolink_core::request::{DonationRequest, RequestState};
use reqwest::StatusCode;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::executor::{ApiExecutor, RequestSpec};
use crate::{ExecutorError, Result};

pub struct BloodRequestClient {
    executor: Arc<ApiExecutor>,
    known: RwLock<HashMap<Uuid, DonationRequest>>,
}

impl BloodRequestClient {
    pub fn new(executor: Arc<ApiExecutor>) -> Self {
        Self {
            executor,
            known: RwLock::new(HashMap::new()),
        }
    }

    /// All open requests, with `filter` applied client-side.
    pub async fn list(&self, filter: &RequestFilter) -> Result<Vec<DonationRequest>> {
        let fetched: Vec<DonationRequest> = self
            .executor
            .execute_json(RequestSpec::get("/api/blood-requests").unauthenticated())
            .await?;
        let merged = fetched
            .into_iter()
            .map(|request| self.merge(request))
            .collect();
        Ok(filter.apply(merged))
    }

    pub async fn get(&self, request_id: Uuid) -> Result<DonationRequest> {
        let fetched: DonationRequest = self
            .executor
            .execute_json(
                RequestSpec::get(format!("/api/blood-requests/{}", request_id)).unauthenticated(),
            )
            .await?;
        Ok(self.merge(fetched))
    }

    /// The signed-in donor's own accepted requests.
    pub async fn my_requests(&self) -> Result<Vec<DonationRequest>> {
        let fetched: Vec<DonationRequest> = self
            .executor
            .execute_json(RequestSpec::get("/api/blood-requests/mine"))
            .await?;
        Ok(fetched
            .into_iter()
            .map(|request| self.merge(request))
            .collect())
    }

    /// Volunteer for a request.
    ///
    /// Idempotent from the caller's perspective: a request already past
    /// Available locally is returned as-is without a network call, and a
    /// conflict (another donor got there first) resolves to the refreshed
    /// server view rather than an error. A `SessionExpired` failure
    /// propagates so the caller can prompt for sign-in.
    #[instrument(skip(self))]
    pub async fn accept(&self, request_id: Uuid) -> Result<DonationRequest> {
        if let Some(existing) = self.lookup(request_id) {
            if existing.state() != RequestState::Available {
                debug!("Request {} already accepted, returning local state", request_id);
                return Ok(existing);
            }
        }

        let spec = RequestSpec::patch(format!("/api/blood-requests/{}/accept", request_id));
        match self.executor.execute_json::<DonationRequest>(spec).await {
            Ok(updated) => Ok(self.merge(updated)),
            Err(ExecutorError::Rejected { status, .. })
                if status == StatusCode::CONFLICT.as_u16() =>
            {
                debug!("Request {} already accepted elsewhere, refreshing view", request_id);
                self.get(request_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Locally known lifecycle state for a request, if it has been seen.
    pub fn state_of(&self, request_id: Uuid) -> Option<RequestState> {
        self.lookup(request_id).map(|request| request.state())
    }

    fn lookup(&self, request_id: Uuid) -> Option<DonationRequest> {
        self.known
            .read()
            .expect("request cache poisoned")
            .get(&request_id)
            .cloned()
    }

    /// Fold a server snapshot into the local view.
    ///
    /// Approved and Rejected are terminal for this donor: a snapshot that
    /// would regress a terminal request is ignored in favor of the local
    /// state.
    fn merge(&self, incoming: DonationRequest) -> DonationRequest {
        let mut known = self.known.write().expect("request cache poisoned");
        match known.get(&incoming.request_id) {
            Some(existing) if existing.is_terminal() && !incoming.is_terminal() => {
                debug!(
                    "Ignoring snapshot that would regress terminal request {}",
                    incoming.request_id
                );
                existing.clone()
            }
            _ => {
                known.insert(incoming.request_id, incoming.clone());
                incoming
            }
        }
    }
}
