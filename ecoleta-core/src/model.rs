//! Domain data structures for categories, collection points, and positions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a recyclable item category.
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a collection point.
pub struct PointId(pub u32);

impl fmt::Display for PointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Recyclable material category usable as a points filter.
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Display title, e.g. "Lâmpadas".
    pub title: String,
    /// URL of the category icon.
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Collection point as returned by the filtered points listing.
pub struct Point {
    /// Unique identifier.
    pub id: PointId,
    /// Name of the establishment.
    pub name: String,
    /// Stored image file name.
    pub image: String,
    /// Public URL of the image.
    pub image_url: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Point {
    /// Coordinates of the point.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Full record of a single collection point.
pub struct PointInfo {
    /// Unique identifier.
    pub id: PointId,
    /// Name of the establishment.
    pub name: String,
    /// Stored image file name.
    pub image: String,
    /// Public URL of the image.
    pub image_url: String,
    /// Contact e-mail.
    pub email: String,
    /// WhatsApp number.
    pub whatsapp: String,
    /// City the point is located in.
    pub city: String,
    /// State abbreviation.
    pub uf: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Item title attached to a point detail.
pub struct ItemTitle {
    /// Display title.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Detail payload for a single point and the items it accepts.
pub struct PointDetail {
    /// Point record.
    pub point: PointInfo,
    /// Accepted item categories.
    pub items: Vec<ItemTitle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic coordinate pair.
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Position {
    /// Sentinel meaning "not located yet".
    pub const UNKNOWN: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Construct a position from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is the `(0, 0)` loading sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.latitude.abs() < f64::EPSILON && self.longitude.abs() < f64::EPSILON
    }
}

impl fmt::Display for Position {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Parameters the points screen is opened with.
pub struct RouteParams {
    /// State abbreviation.
    pub uf: String,
    /// City name.
    pub city: String,
}

impl RouteParams {
    /// Construct route params.
    #[must_use]
    pub fn new<U: Into<String>, C: Into<String>>(uf: U, city: C) -> Self {
        Self {
            uf: uf.into(),
            city: city.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Filter set of a single points request.
pub struct PointsQuery {
    /// City filter.
    pub city: String,
    /// State filter.
    pub uf: String,
    /// Selected item categories, in selection order.
    pub items: Vec<ItemId>,
}

impl PointsQuery {
    /// Build the query for a route and the current selection.
    #[must_use]
    pub fn new(route: &RouteParams, items: &[ItemId]) -> Self {
        Self {
            city: route.city.clone(),
            uf: route.uf.clone(),
            items: items.to_vec(),
        }
    }

    /// Comma-joined item ids, or `None` when nothing is selected.
    #[must_use]
    pub fn items_param(&self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let ids: Vec<String> = self.items.iter().map(ItemId::to_string).collect();
        Some(ids.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of a location permission request.
pub enum PermissionStatus {
    /// The user allowed access to the location.
    Granted,
    /// The user refused access to the location.
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Parameters of the point detail route.
pub struct DetailParams {
    /// Point to show.
    pub point_id: PointId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Navigation request produced by a screen.
pub enum Navigation {
    /// Pop the current screen.
    Back,
    /// Push the point detail screen.
    Detail(DetailParams),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Non-blocking notice shown to the user.
pub struct Alert {
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
}
