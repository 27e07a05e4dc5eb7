//! Headless screen controllers.
//!
//! A screen owns its state and is only mutated through handler methods.
//! Handlers never perform I/O; they return the [`Effect`]s the caller has to
//! run, and the results come back later as [`ScreenEvent`]s.

use tracing::{debug, info, warn};

use crate::model::{
    Alert, DetailParams, Item, ItemId, Navigation, PermissionStatus, Point, PointDetail, PointId,
    PointsQuery, Position, RouteParams,
};
use crate::ports::PortError;

/// Title of the alert raised when location access is refused.
pub const LOCATION_ALERT_TITLE: &str = "Oooops...";
/// Body of the alert raised when location access is refused.
pub const LOCATION_ALERT_MESSAGE: &str = "We need your permission to get your location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
/// Monotonic tag of an issued points request.
pub struct RequestSeq(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// A points request together with its sequence tag.
pub struct PointsRequest {
    /// Tag echoed back with the response.
    pub seq: RequestSeq,
    /// Filter set to send.
    pub query: PointsQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side effect requested by a screen.
pub enum Effect {
    /// Ask for location permission.
    RequestPermission,
    /// Read the device position.
    FetchPosition,
    /// Load the item categories.
    FetchItems,
    /// Load the points matching a filter set.
    FetchPoints(PointsRequest),
    /// Load a single point record.
    FetchDetail(PointId),
}

#[derive(Debug)]
/// Completion of an [`Effect`], delivered back to the screen.
pub enum ScreenEvent {
    /// Permission request finished.
    Permission(PermissionStatus),
    /// Position lookup finished.
    Position(Result<Position, PortError>),
    /// Items request finished.
    Items(Result<Vec<Item>, PortError>),
    /// Points request finished.
    Points {
        /// Tag of the request this answers.
        seq: RequestSeq,
        /// Response payload.
        result: Result<Vec<Point>, PortError>,
    },
    /// Point detail request finished.
    Detail(Result<PointDetail, PortError>),
}

/// Common lifecycle of a screen controller.
pub trait Screen {
    /// Called once when the screen becomes visible.
    fn mount(&mut self) -> Vec<Effect>;

    /// Apply the completion of a previously emitted effect.
    fn handle(&mut self, event: ScreenEvent) -> Vec<Effect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lifecycle phase of the points screen.
pub enum ScreenPhase {
    /// Constructed, not mounted.
    Init,
    /// Waiting for the permission answer.
    AwaitingLocation,
    /// Permission granted, waiting for coordinates.
    LocationGranted,
    /// Permission refused and the alert has not been dismissed yet.
    LocationDenied,
    /// Location flow finished.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Map marker derived from a point.
pub struct Marker<'a> {
    /// Point the marker opens.
    pub point_id: PointId,
    /// Marker coordinate.
    pub position: Position,
    /// Caption under the thumbnail.
    pub label: &'a str,
    /// Thumbnail URL.
    pub thumbnail: &'a str,
}

#[derive(Debug)]
/// Controller for the category filter and map of collection points.
pub struct PointsScreen {
    route: RouteParams,
    phase: ScreenPhase,
    items: Vec<Item>,
    points: Vec<Point>,
    selected_items: Vec<ItemId>,
    initial_position: Option<Position>,
    alert: Option<Alert>,
    location_error: Option<String>,
    items_error: Option<String>,
    points_error: Option<String>,
    points_seq: RequestSeq,
}

impl PointsScreen {
    /// Create an unmounted screen for the given route.
    #[must_use]
    pub fn new(route: RouteParams) -> Self {
        Self {
            route,
            phase: ScreenPhase::Init,
            items: Vec::new(),
            points: Vec::new(),
            selected_items: Vec::new(),
            initial_position: None,
            alert: None,
            location_error: None,
            items_error: None,
            points_error: None,
            points_seq: RequestSeq::default(),
        }
    }

    /// Route the screen was opened with.
    #[must_use]
    pub fn route(&self) -> &RouteParams {
        &self.route
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ScreenPhase {
        self.phase
    }

    /// Item categories in backend order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Points of the latest applied response.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Selected category ids in selection order.
    #[must_use]
    pub fn selected_items(&self) -> &[ItemId] {
        &self.selected_items
    }

    /// Whether a category is part of the filter.
    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selected_items.contains(&id)
    }

    /// Map center; `None` while the device has not been located.
    #[must_use]
    pub fn initial_position(&self) -> Option<Position> {
        self.initial_position
    }

    /// Pending alert, if any.
    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Message of a failed request that no later success has cleared.
    ///
    /// Each request kind keeps its own error, so a points success never hides
    /// an items failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.points_error
            .as_deref()
            .or(self.items_error.as_deref())
            .or(self.location_error.as_deref())
    }

    /// Message of the last failed items request, until items load again.
    #[must_use]
    pub fn items_error(&self) -> Option<&str> {
        self.items_error.as_deref()
    }

    /// Tag of the newest issued points request.
    #[must_use]
    pub fn latest_points_request(&self) -> RequestSeq {
        self.points_seq
    }

    /// One marker per point, in response order.
    pub fn markers(&self) -> impl Iterator<Item = Marker<'_>> {
        self.points.iter().map(|point| Marker {
            point_id: point.id,
            position: point.position(),
            label: point.name.as_str(),
            thumbnail: point.image_url.as_str(),
        })
    }

    /// Toggle a category in the filter and request the matching points.
    pub fn handle_selected_item(&mut self, id: ItemId) -> Vec<Effect> {
        if let Some(index) = self.selected_items.iter().position(|selected| *selected == id) {
            self.selected_items.remove(index);
        } else {
            self.selected_items.push(id);
        }
        debug!(item = %id, selected = ?self.selected_items, "toggled item");
        vec![self.next_points_request()]
    }

    /// Open the detail screen of a point.
    #[must_use]
    pub fn handle_navigate_to_detail(&self, id: PointId) -> Navigation {
        debug!(point = %id, city = %self.route.city, "navigate to detail");
        Navigation::Detail(DetailParams { point_id: id })
    }

    /// Leave the screen.
    #[must_use]
    pub fn handle_navigate_back(&self) -> Navigation {
        debug!(city = %self.route.city, "navigate back");
        Navigation::Back
    }

    /// Hide the current alert.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        if self.phase == ScreenPhase::LocationDenied {
            self.phase = ScreenPhase::Ready;
        }
    }

    /// Reload categories and points for the current filter.
    pub fn refresh(&mut self) -> Vec<Effect> {
        vec![Effect::FetchItems, self.next_points_request()]
    }

    fn next_points_request(&mut self) -> Effect {
        self.points_seq = RequestSeq(self.points_seq.0 + 1);
        Effect::FetchPoints(PointsRequest {
            seq: self.points_seq,
            query: PointsQuery::new(&self.route, &self.selected_items),
        })
    }

    fn on_permission(&mut self, status: PermissionStatus) -> Vec<Effect> {
        if self.phase != ScreenPhase::AwaitingLocation {
            debug!(?status, phase = ?self.phase, "ignoring late permission answer");
            return Vec::new();
        }
        match status {
            PermissionStatus::Granted => {
                self.phase = ScreenPhase::LocationGranted;
                vec![Effect::FetchPosition]
            }
            PermissionStatus::Denied => {
                self.phase = ScreenPhase::LocationDenied;
                self.alert = Some(Alert {
                    title: LOCATION_ALERT_TITLE.to_owned(),
                    message: LOCATION_ALERT_MESSAGE.to_owned(),
                });
                Vec::new()
            }
        }
    }

    fn on_position(&mut self, result: Result<Position, PortError>) {
        match result {
            Ok(position) if position.is_unknown() => {
                warn!("location provider returned the (0, 0) sentinel");
            }
            Ok(position) => {
                info!(%position, "located device");
                self.initial_position = Some(position);
            }
            Err(err) => {
                warn!(error = %err, "position lookup failed");
                self.location_error = Some(format!("Location unavailable: {err}"));
            }
        }
        self.phase = ScreenPhase::Ready;
    }

    fn on_items(&mut self, result: Result<Vec<Item>, PortError>) {
        match result {
            Ok(items) => {
                self.items = items;
                self.items_error = None;
            }
            Err(err) => {
                warn!(error = %err, "loading items failed");
                self.items_error = Some(format!("Failed to load items: {err}"));
            }
        }
    }

    fn on_points(&mut self, seq: RequestSeq, result: Result<Vec<Point>, PortError>) {
        if seq != self.points_seq {
            debug!(?seq, latest = ?self.points_seq, "dropping stale points response");
            return;
        }
        match result {
            Ok(points) => {
                self.points = points;
                self.points_error = None;
            }
            Err(err) => {
                warn!(error = %err, "loading points failed");
                self.points_error = Some(format!("Failed to load points: {err}"));
            }
        }
    }
}

impl Screen for PointsScreen {
    fn mount(&mut self) -> Vec<Effect> {
        if self.phase != ScreenPhase::Init {
            return Vec::new();
        }
        self.phase = ScreenPhase::AwaitingLocation;
        vec![
            Effect::RequestPermission,
            Effect::FetchItems,
            self.next_points_request(),
        ]
    }

    fn handle(&mut self, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Permission(status) => return self.on_permission(status),
            ScreenEvent::Position(result) => self.on_position(result),
            ScreenEvent::Items(result) => self.on_items(result),
            ScreenEvent::Points { seq, result } => self.on_points(seq, result),
            ScreenEvent::Detail(_) => debug!("points screen ignores detail responses"),
        }
        Vec::new()
    }
}

#[derive(Debug)]
/// Controller for the single point detail view.
pub struct DetailScreen {
    point_id: PointId,
    mounted: bool,
    detail: Option<PointDetail>,
    error: Option<String>,
}

impl DetailScreen {
    /// Create an unmounted detail screen.
    #[must_use]
    pub fn new(params: DetailParams) -> Self {
        Self {
            point_id: params.point_id,
            mounted: false,
            detail: None,
            error: None,
        }
    }

    /// Point shown by this screen.
    #[must_use]
    pub fn point_id(&self) -> PointId {
        self.point_id
    }

    /// Loaded record, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&PointDetail> {
        self.detail.as_ref()
    }

    /// Load failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the record is still being fetched.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.detail.is_none() && self.error.is_none()
    }

    /// Leave the screen.
    #[must_use]
    pub fn handle_navigate_back(&self) -> Navigation {
        debug!(point = %self.point_id, "navigate back");
        Navigation::Back
    }
}

impl Screen for DetailScreen {
    fn mount(&mut self) -> Vec<Effect> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        vec![Effect::FetchDetail(self.point_id)]
    }

    fn handle(&mut self, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Detail(Ok(detail)) => {
                self.detail = Some(detail);
                self.error = None;
            }
            ScreenEvent::Detail(Err(err)) => {
                warn!(point = %self.point_id, error = %err, "loading point failed");
                self.error = Some(err.to_string());
            }
            other => debug!(?other, "detail screen ignores event"),
        }
        Vec::new()
    }
}
