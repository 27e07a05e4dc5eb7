//! HTTP client for the Ecoleta collection point backend.

mod location;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use ecoleta_core::{
    model::{Item, Point, PointDetail, PointId, PointsQuery},
    ports::{CollectionApi, PortError},
};

pub use location::{DisabledLocation, FixedLocation, IpLocation, location_port};

/// Backend implementation talking JSON over HTTP.
pub struct HttpCollectionApi {
    client: Client,
    base_url: String,
}

impl HttpCollectionApi {
    /// Create a backend client rooted at `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn items_request(&self) -> RequestBuilder {
        self.client.get(self.endpoint("items"))
    }

    fn points_request(&self, query: &PointsQuery) -> RequestBuilder {
        let mut req = self
            .client
            .get(self.endpoint("points"))
            .query(&[("city", query.city.as_str()), ("uf", query.uf.as_str())]);

        // The backend splits `items` on commas; an empty selection sends no filter.
        if let Some(items) = query.items_param() {
            req = req.query(&[("items", items)]);
        }
        req
    }

    fn point_request(&self, id: PointId) -> RequestBuilder {
        self.client.get(self.endpoint(&format!("points/{id}")))
    }
}

#[async_trait]
impl CollectionApi for HttpCollectionApi {
    async fn items(&self) -> Result<Vec<Item>, PortError> {
        fetch_json(self.items_request()).await
    }

    async fn points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
        fetch_json(self.points_request(query)).await
    }

    async fn point(&self, id: PointId) -> Result<PointDetail, PortError> {
        let resp = self.point_request(id).send().await?;

        // Unknown ids come back as 400 with a message body.
        if matches!(resp.status(), StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND) {
            return Err(PortError::PointNotFound(id));
        }

        resp.error_for_status()?
            .json()
            .await
            .map_err(PortError::from)
    }
}

/// Build the backend port for the given base URL.
#[must_use]
pub fn collection_api(client: Client, base_url: &str) -> Arc<dyn CollectionApi> {
    Arc::new(HttpCollectionApi::new(client, base_url))
}

// Fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;
    debug!(url = %resp.url(), status = %resp.status(), "backend response");
    resp.error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
