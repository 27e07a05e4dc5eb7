//! High-level service facade combining the backend and the location source.

use std::sync::Arc;

use tracing::{debug, info};

use crate::model::{Item, PermissionStatus, Point, PointDetail, PointId, PointsQuery, Position};
use crate::ports::{CollectionApi, LocationPort, PortError};

/// Public entry point for loading categories, points, and the device position.
pub struct EcoletaService {
    api: Arc<dyn CollectionApi>,
    location: Arc<dyn LocationPort>,
}

impl EcoletaService {
    /// Create a new service bound to the provided ports.
    #[must_use]
    pub fn new(api: Arc<dyn CollectionApi>, location: Arc<dyn LocationPort>) -> Self {
        Self { api, location }
    }

    /// List all item categories.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the backend call fails.
    pub async fn items(&self) -> Result<Vec<Item>, PortError> {
        let items = self.api.items().await?;
        debug!(count = items.len(), "loaded items");
        Ok(items)
    }

    /// List points matching the filter set.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the backend call fails.
    pub async fn points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
        let points = self.api.points(query).await?;
        debug!(
            city = %query.city,
            uf = %query.uf,
            items = ?query.items,
            count = points.len(),
            "loaded points"
        );
        Ok(points)
    }

    /// Load the detail record of a point.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the point is unknown or the backend call fails.
    pub async fn point(&self, id: PointId) -> Result<PointDetail, PortError> {
        self.api.point(id).await
    }

    /// Ask the location source for permission.
    pub async fn request_permission(&self) -> PermissionStatus {
        let status = self.location.request_permission().await;
        info!(?status, "location permission");
        status
    }

    /// Read the current device position.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if no position is available.
    pub async fn current_position(&self) -> Result<Position, PortError> {
        self.location.current_position().await
    }
}
