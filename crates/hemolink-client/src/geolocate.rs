//! Position acquisition for the "near me" filter

use async_trait::async_trait;
use hemolink_core::filter::NearbyFilter;
use hemolink_core::geo::Coordinate;
use thiserror::Error;
use tracing::debug;

/// Why a position could not be produced.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Position permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Source of the observer's position.
///
/// Acquisition is asynchronous and user-permission-gated. A denial or
/// failure degrades the nearby toggle to disabled; it is never a hard error.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> std::result::Result<Coordinate, GeoError>;
}

/// Fixed-position provider for configuration-pinned origins and tests.
pub struct StaticLocationProvider(pub Coordinate);

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn current_position(&self) -> std::result::Result<Coordinate, GeoError> {
        Ok(self.0)
    }
}

/// Try to seed a nearby filter from `provider`. `None` means the toggle is
/// disabled for this listing.
pub async fn nearby_filter(provider: &dyn LocationProvider) -> Option<NearbyFilter> {
    let position = provider.current_position().await;
    if let Err(e) = &position {
        debug!("Nearby filter disabled: {}", e);
    }
    NearbyFilter::from_position(position)
}
