use std::sync::Arc;

use ecoleta_core::{
    model::{Navigation, RouteParams},
    screen::{DetailScreen, PointsScreen},
    service::EcoletaService,
    session::Session,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    Home,
    Points,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HomeField {
    Uf,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointsFocus {
    Items,
    Markers,
}

pub(crate) struct App {
    pub(crate) service: Arc<EcoletaService>,

    pub(crate) uf_input: String,
    pub(crate) city_input: String,
    pub(crate) home_field: HomeField,
    pub(crate) home_error: Option<String>,

    pub(crate) points: Option<Session<PointsScreen>>,
    pub(crate) points_focus: PointsFocus,
    pub(crate) item_index: usize,
    pub(crate) marker_index: usize,

    pub(crate) detail: Option<Session<DetailScreen>>,
}

impl App {
    pub(crate) fn new(service: Arc<EcoletaService>, uf: Option<String>, city: Option<String>) -> Self {
        Self {
            service,
            uf_input: uf.unwrap_or_default(),
            city_input: city.unwrap_or_default(),
            home_field: HomeField::Uf,
            home_error: None,
            points: None,
            points_focus: PointsFocus::Items,
            item_index: 0,
            marker_index: 0,
            detail: None,
        }
    }

    pub(crate) fn page(&self) -> Page {
        if self.detail.is_some() {
            Page::Detail
        } else if self.points.is_some() {
            Page::Points
        } else {
            Page::Home
        }
    }

    pub(crate) fn has_prefilled_route(&self) -> bool {
        !self.uf_input.trim().is_empty() && !self.city_input.trim().is_empty()
    }

    pub(crate) fn route_from_inputs(&self) -> Result<RouteParams, &'static str> {
        let uf = self.uf_input.trim().to_uppercase();
        let city = self.city_input.trim();

        if uf.len() != 2 || !uf.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err("Enter the two-letter state abbreviation (UF)");
        }
        if city.is_empty() {
            return Err("Enter a city");
        }
        Ok(RouteParams::new(uf, city))
    }

    /// Mount the points page for the typed route. Returns whether it opened.
    pub(crate) fn open_points(&mut self) -> bool {
        match self.route_from_inputs() {
            Ok(route) => {
                info!(uf = %route.uf, city = %route.city, "opening points");
                self.home_error = None;
                self.points_focus = PointsFocus::Items;
                self.item_index = 0;
                self.marker_index = 0;
                self.points = Some(Session::mount(
                    Arc::clone(&self.service),
                    PointsScreen::new(route),
                ));
                true
            }
            Err(msg) => {
                self.home_error = Some(msg.to_owned());
                false
            }
        }
    }

    pub(crate) fn navigate(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::Back => {
                if self.detail.take().is_some() {
                    return;
                }
                if let Some(mut points) = self.points.take() {
                    points.cancel();
                }
            }
            Navigation::Detail(params) => {
                self.detail = Some(Session::mount(
                    Arc::clone(&self.service),
                    DetailScreen::new(params),
                ));
            }
        }
    }

    pub(crate) fn navigate_back(&mut self) {
        let navigation = if let Some(detail) = &self.detail {
            detail.screen().handle_navigate_back()
        } else if let Some(points) = &self.points {
            points.screen().handle_navigate_back()
        } else {
            return;
        };
        self.navigate(navigation);
    }

    /// Apply finished requests of every mounted page.
    pub(crate) fn pump(&mut self) {
        if let Some(points) = &mut self.points {
            points.pump();
        }
        if let Some(detail) = &mut self.detail {
            detail.pump();
        }
        self.clamp_cursors();
    }

    pub(crate) fn is_busy(&self) -> bool {
        match self.page() {
            Page::Home => false,
            Page::Points => self.points.as_ref().is_some_and(Session::is_busy),
            Page::Detail => self.detail.as_ref().is_some_and(Session::is_busy),
        }
    }

    pub(crate) fn switch_points_focus(&mut self) {
        self.points_focus = match self.points_focus {
            PointsFocus::Items => PointsFocus::Markers,
            PointsFocus::Markers => PointsFocus::Items,
        };
    }

    pub(crate) fn move_cursor(&mut self, forward: bool) {
        let cursor = match self.points_focus {
            PointsFocus::Items => &mut self.item_index,
            PointsFocus::Markers => &mut self.marker_index,
        };
        if forward {
            *cursor = cursor.saturating_add(1);
        } else {
            *cursor = cursor.saturating_sub(1);
        }
        self.clamp_cursors();
    }

    pub(crate) fn activate_cursor(&mut self) {
        match self.points_focus {
            PointsFocus::Items => self.toggle_current_item(),
            PointsFocus::Markers => self.open_current_marker(),
        }
    }

    pub(crate) fn toggle_current_item(&mut self) {
        let Some(points) = &mut self.points else {
            return;
        };
        let Some(id) = points
            .screen()
            .items()
            .get(self.item_index)
            .map(|item| item.id)
        else {
            return;
        };
        points.update(|screen| screen.handle_selected_item(id));
    }

    pub(crate) fn open_current_marker(&mut self) {
        let Some(points) = &self.points else {
            return;
        };
        let Some(marker) = points.screen().markers().nth(self.marker_index) else {
            return;
        };
        let navigation = points.screen().handle_navigate_to_detail(marker.point_id);
        self.navigate(navigation);
    }

    pub(crate) fn dismiss_alert(&mut self) -> bool {
        let Some(points) = &mut self.points else {
            return false;
        };
        if points.screen().alert().is_none() {
            return false;
        }
        points.update(|screen| {
            screen.dismiss_alert();
            Vec::new()
        });
        true
    }

    pub(crate) fn refresh(&mut self) {
        if let Some(points) = &mut self.points {
            points.update(PointsScreen::refresh);
        }
    }

    fn clamp_cursors(&mut self) {
        let Some(points) = &self.points else {
            return;
        };
        let screen = points.screen();
        self.item_index = self.item_index.min(screen.items().len().saturating_sub(1));
        self.marker_index = self.marker_index.min(screen.points().len().saturating_sub(1));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use ecoleta_core::{
        model::{
            Item, ItemId, ItemTitle, PermissionStatus, Point, PointDetail, PointId, PointInfo,
            PointsQuery, Position,
        },
        ports::{CollectionApi, LocationPort, PortError},
    };

    use super::*;

    pub(crate) struct FakeApi;

    pub(crate) fn item(id: u32, title: &str) -> Item {
        Item {
            id: ItemId(id),
            title: title.to_owned(),
            image_url: format!("http://localhost:3333/uploads/item-{id}.svg"),
        }
    }

    #[async_trait]
    impl CollectionApi for FakeApi {
        async fn items(&self) -> Result<Vec<Item>, PortError> {
            Ok(vec![
                item(1, "Lâmpadas"),
                item(2, "Pilhas e Baterias"),
                item(3, "Papéis e Papelão"),
            ])
        }

        async fn points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
            Ok(query
                .items
                .iter()
                .map(|id| Point {
                    id: PointId(id.0 + 6),
                    name: format!("Mercado {id}"),
                    image: "mercado.jpg".to_owned(),
                    image_url: "http://localhost:3333/uploads/mercado.jpg".to_owned(),
                    latitude: 10.001,
                    longitude: 20.001,
                })
                .collect())
        }

        async fn point(&self, id: PointId) -> Result<PointDetail, PortError> {
            Ok(PointDetail {
                point: PointInfo {
                    id,
                    name: "Mercado do Seu Lourenço".to_owned(),
                    image: "mercado.jpg".to_owned(),
                    image_url: "http://localhost:3333/uploads/mercado.jpg".to_owned(),
                    email: "contato@lourenco.com".to_owned(),
                    whatsapp: "5547999999999".to_owned(),
                    city: "Rio do Sul".to_owned(),
                    uf: "SC".to_owned(),
                    latitude: 10.001,
                    longitude: 20.001,
                },
                items: vec![ItemTitle {
                    title: "Lâmpadas".to_owned(),
                }],
            })
        }
    }

    pub(crate) struct FakeLocation(pub(crate) PermissionStatus);

    #[async_trait]
    impl LocationPort for FakeLocation {
        async fn request_permission(&self) -> PermissionStatus {
            self.0
        }

        async fn current_position(&self) -> Result<Position, PortError> {
            Ok(Position::new(10.0, 20.0))
        }
    }

    pub(crate) fn app(status: PermissionStatus) -> App {
        let service = Arc::new(EcoletaService::new(
            Arc::new(FakeApi),
            Arc::new(FakeLocation(status)),
        ));
        App::new(service, Some("sc".to_owned()), Some("Rio do Sul".to_owned()))
    }

    pub(crate) async fn settle(app: &mut App) {
        if let Some(points) = &mut app.points {
            points.settle().await;
        }
        if let Some(detail) = &mut app.detail {
            detail.settle().await;
        }
        app.pump();
    }

    #[test]
    fn route_validation_rejects_bad_uf() {
        let mut app = app(PermissionStatus::Granted);
        app.uf_input = "São".to_owned();
        assert!(app.route_from_inputs().is_err(), "uf must be two letters");

        app.uf_input = " sc ".to_owned();
        app.city_input = "  ".to_owned();
        assert!(app.route_from_inputs().is_err(), "city required");

        app.city_input = "Rio do Sul".to_owned();
        assert_eq!(
            app.route_from_inputs(),
            Ok(RouteParams::new("SC", "Rio do Sul")),
            "uf upper-cased"
        );
    }

    #[tokio::test]
    async fn full_navigation_flow() {
        let mut app = app(PermissionStatus::Granted);
        assert_eq!(app.page(), Page::Home, "starts at home");

        assert!(app.open_points(), "route accepted");
        assert_eq!(app.page(), Page::Points, "points page");
        settle(&mut app).await;

        app.item_index = 1;
        app.toggle_current_item();
        settle(&mut app).await;

        let screen = app.points.as_ref().expect("points mounted").screen();
        assert_eq!(screen.selected_items(), [ItemId(2)], "second item selected");
        assert_eq!(screen.points().len(), 1, "filtered points loaded");

        app.switch_points_focus();
        app.activate_cursor();
        assert_eq!(app.page(), Page::Detail, "marker opened detail");
        let point_id = app.detail.as_ref().expect("detail mounted").screen().point_id();
        assert_eq!(point_id, PointId(8), "point of the marker");

        app.navigate_back();
        assert_eq!(app.page(), Page::Points, "back to points");
        app.navigate_back();
        assert_eq!(app.page(), Page::Home, "back to home");
    }

    #[tokio::test]
    async fn alert_dismissal_is_reported() {
        let mut app = app(PermissionStatus::Denied);
        assert!(app.open_points(), "route accepted");
        settle(&mut app).await;

        assert!(app.dismiss_alert(), "alert was shown");
        assert!(!app.dismiss_alert(), "nothing left to dismiss");
    }
}
