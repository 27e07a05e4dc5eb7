//! Traits describing backend and location capabilities and their error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{Item, PermissionStatus, Point, PointDetail, PointId, PointsQuery, Position};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the backend or the location provider.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The backend does not know the requested point.
    #[error("Point {0} not found")]
    PointNotFound(PointId),
    /// Location access was refused.
    #[error("Location permission denied")]
    PermissionDenied,
    /// The provider could not determine a position.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

#[async_trait]
/// Trait for the collection point backend.
pub trait CollectionApi: Send + Sync {
    /// List all item categories in backend order.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn items(&self) -> Result<Vec<Item>, PortError>;

    /// List the points matching the query.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError>;

    /// Load a single point and the items it accepts.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::PointNotFound`] for unknown ids, or another
    /// [`PortError`] when the request fails.
    async fn point(&self, id: PointId) -> Result<PointDetail, PortError>;
}

#[async_trait]
/// Trait for device location sources.
pub trait LocationPort: Send + Sync {
    /// Ask for permission to read the location.
    async fn request_permission(&self) -> PermissionStatus;

    /// Read the current position.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when access is denied or no fix is available.
    async fn current_position(&self) -> Result<Position, PortError>;
}
