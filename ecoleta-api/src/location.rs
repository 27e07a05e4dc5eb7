//! Location sources selectable from the configuration.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use ecoleta_core::{
    config::LocationConfig,
    model::{PermissionStatus, Position},
    ports::{LocationPort, PortError},
};

/// Source that always refuses access.
pub struct DisabledLocation;

#[async_trait]
impl LocationPort for DisabledLocation {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn current_position(&self) -> Result<Position, PortError> {
        Err(PortError::PermissionDenied)
    }
}

/// Source reporting a configured coordinate.
pub struct FixedLocation {
    position: Position,
}

impl FixedLocation {
    /// Create a source pinned to `position`.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationPort for FixedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Position, PortError> {
        Ok(self.position)
    }
}

/// Response of ip-api.com style endpoints.
#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    #[serde(default)]
    message: Option<String>,
}

impl IpLookup {
    fn into_position(self) -> Result<Position, PortError> {
        if self.status != "success" {
            let reason = self.message.unwrap_or(self.status);
            return Err(PortError::PositionUnavailable(reason));
        }
        Ok(Position::new(self.lat, self.lon))
    }
}

/// Source resolving the public IP address to a coarse position.
pub struct IpLocation {
    client: Client,
    endpoint: String,
}

impl IpLocation {
    /// Create a source querying `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
        }
    }
}

#[async_trait]
impl LocationPort for IpLocation {
    // Opting into this provider in the configuration is the consent.
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Position, PortError> {
        let lookup: IpLookup = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(status = %lookup.status, "ip geolocation lookup");
        lookup.into_position()
    }
}

/// Build the location port selected by the configuration.
#[must_use]
pub fn location_port(client: Client, config: &LocationConfig) -> Arc<dyn LocationPort> {
    match config {
        LocationConfig::Disabled => Arc::new(DisabledLocation),
        LocationConfig::Fixed {
            latitude,
            longitude,
        } => Arc::new(FixedLocation::new(Position::new(*latitude, *longitude))),
        LocationConfig::Ip { endpoint } => Arc::new(IpLocation::new(client, endpoint)),
    }
}
