//! Runs screen effects as tasks whose lifetime is bound to the screen.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::screen::{Effect, Screen, ScreenEvent};
use crate::service::EcoletaService;

/// A mounted screen together with its in-flight effects.
///
/// Every effect runs in its own task and reports back through a channel; the
/// owner applies completions with [`Session::pump`] from the UI loop, so the
/// screen itself is never shared between tasks. Dropping the session aborts
/// whatever is still running.
pub struct Session<S> {
    screen: S,
    service: Arc<EcoletaService>,
    events_tx: mpsc::UnboundedSender<ScreenEvent>,
    events_rx: mpsc::UnboundedReceiver<ScreenEvent>,
    tasks: JoinSet<()>,
}

impl<S: Screen> Session<S> {
    /// Mount `screen` and start the effects it asks for.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(service: Arc<EcoletaService>, mut screen: S) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let effects = screen.mount();
        let mut session = Self {
            screen,
            service,
            events_tx,
            events_rx,
            tasks: JoinSet::new(),
        };
        session.spawn_all(effects);
        session
    }

    /// Shared access to the screen state.
    #[must_use]
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Run a handler against the screen and start the effects it returns.
    pub fn update<F>(&mut self, handler: F)
    where
        F: FnOnce(&mut S) -> Vec<Effect>,
    {
        let effects = handler(&mut self.screen);
        self.spawn_all(effects);
    }

    /// Apply every completion that is already available, without waiting.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        self.reap();
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait until no effect is in flight, applying completions as they arrive.
    pub async fn settle(&mut self) {
        loop {
            if let Ok(event) = self.events_rx.try_recv() {
                self.apply(event);
                continue;
            }
            if self.tasks.is_empty() {
                break;
            }
            tokio::select! {
                Some(event) = self.events_rx.recv() => self.apply(event),
                Some(joined) = self.tasks.join_next() => log_join(joined),
                else => break,
            }
        }
    }

    /// Whether any effect is still running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Abort every in-flight effect; their completions are never applied.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
        while self.events_rx.try_recv().is_ok() {}
    }

    fn apply(&mut self, event: ScreenEvent) {
        let effects = self.screen.handle(event);
        self.spawn_all(effects);
    }

    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            log_join(joined);
        }
    }

    fn spawn_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        debug!(?effect, "spawning effect");
        let service = Arc::clone(&self.service);
        let events_tx = self.events_tx.clone();
        self.tasks.spawn(async move {
            let event = run_effect(&service, effect).await;
            if events_tx.send(event).is_err() {
                debug!("screen gone before effect completed");
            }
        });
    }
}

async fn run_effect(service: &EcoletaService, effect: Effect) -> ScreenEvent {
    match effect {
        Effect::RequestPermission => ScreenEvent::Permission(service.request_permission().await),
        Effect::FetchPosition => ScreenEvent::Position(service.current_position().await),
        Effect::FetchItems => ScreenEvent::Items(service.items().await),
        Effect::FetchPoints(request) => ScreenEvent::Points {
            seq: request.seq,
            result: service.points(&request.query).await,
        },
        Effect::FetchDetail(id) => ScreenEvent::Detail(service.point(id).await),
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(err) = joined
        && err.is_panic()
    {
        warn!(error = %err, "effect task panicked");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::model::{
        DetailParams, Item, ItemId, ItemTitle, PermissionStatus, Point, PointDetail, PointId,
        PointInfo, PointsQuery, Position, RouteParams,
    };
    use crate::ports::{CollectionApi, LocationPort, PortError};
    use crate::screen::{DetailScreen, PointsScreen, ScreenPhase};

    #[derive(Default)]
    struct FakeApi {
        queries: Mutex<Vec<PointsQuery>>,
        item_calls: Mutex<usize>,
        gate: Option<Arc<Notify>>,
        released: AtomicBool,
        answered: AtomicBool,
    }

    // Marks the gated request as released when its future is dropped.
    struct InFlight<'a>(&'a AtomicBool);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl FakeApi {
        fn queries(&self) -> Vec<PointsQuery> {
            self.queries.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl CollectionApi for FakeApi {
        async fn items(&self) -> Result<Vec<Item>, PortError> {
            *self.item_calls.lock().expect("lock") += 1;
            Ok(vec![
                Item {
                    id: ItemId(1),
                    title: "Lâmpadas".to_owned(),
                    image_url: "lampadas.svg".to_owned(),
                },
                Item {
                    id: ItemId(2),
                    title: "Pilhas e Baterias".to_owned(),
                    image_url: "baterias.svg".to_owned(),
                },
            ])
        }

        async fn points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
            self.queries.lock().expect("lock").push(query.clone());
            if let Some(gate) = &self.gate {
                let _in_flight = InFlight(&self.released);
                gate.notified().await;
                self.answered.store(true, Ordering::SeqCst);
            }
            let id = u32::try_from(query.items.len()).unwrap_or_default();
            Ok(vec![Point {
                id: PointId(id),
                name: format!("Matches {id}"),
                image: "p.jpg".to_owned(),
                image_url: "http://localhost/p.jpg".to_owned(),
                latitude: -23.5,
                longitude: -46.6,
            }])
        }

        async fn point(&self, id: PointId) -> Result<PointDetail, PortError> {
            Ok(PointDetail {
                point: PointInfo {
                    id,
                    name: "Mercado".to_owned(),
                    image: "p.jpg".to_owned(),
                    image_url: "http://localhost/p.jpg".to_owned(),
                    email: "contato@mercado.com".to_owned(),
                    whatsapp: "5511999999999".to_owned(),
                    city: "São Paulo".to_owned(),
                    uf: "SP".to_owned(),
                    latitude: -23.5,
                    longitude: -46.6,
                },
                items: vec![ItemTitle {
                    title: "Lâmpadas".to_owned(),
                }],
            })
        }
    }

    struct FakeLocation {
        status: PermissionStatus,
        position: Position,
    }

    #[async_trait]
    impl LocationPort for FakeLocation {
        async fn request_permission(&self) -> PermissionStatus {
            self.status
        }

        async fn current_position(&self) -> Result<Position, PortError> {
            match self.status {
                PermissionStatus::Granted => Ok(self.position),
                PermissionStatus::Denied => Err(PortError::PermissionDenied),
            }
        }
    }

    fn service(api: Arc<FakeApi>, status: PermissionStatus) -> Arc<EcoletaService> {
        let location = Arc::new(FakeLocation {
            status,
            position: Position::new(10.0, 20.0),
        });
        Arc::new(EcoletaService::new(api, location))
    }

    fn route() -> RouteParams {
        RouteParams::new("SP", "São Paulo")
    }

    #[tokio::test]
    async fn mounted_points_screen_settles_ready() {
        let api = Arc::new(FakeApi::default());
        let mut session = Session::mount(
            service(Arc::clone(&api), PermissionStatus::Granted),
            PointsScreen::new(route()),
        );
        session.settle().await;

        let screen = session.screen();
        assert_eq!(screen.phase(), ScreenPhase::Ready, "location flow finished");
        assert_eq!(
            screen.initial_position(),
            Some(Position::new(10.0, 20.0)),
            "located"
        );
        assert_eq!(screen.items().len(), 2, "items loaded");
        assert_eq!(screen.points().len(), 1, "points loaded");
        assert_eq!(*api.item_calls.lock().expect("lock"), 1, "items fetched once");
        assert!(!session.is_busy(), "nothing in flight");
    }

    #[tokio::test]
    async fn denied_location_still_loads_data() {
        let api = Arc::new(FakeApi::default());
        let mut session = Session::mount(
            service(Arc::clone(&api), PermissionStatus::Denied),
            PointsScreen::new(route()),
        );
        session.settle().await;

        let screen = session.screen();
        assert!(screen.alert().is_some(), "alert raised");
        assert_eq!(screen.initial_position(), None, "no position");
        assert_eq!(screen.items().len(), 2, "items loaded anyway");
    }

    #[tokio::test]
    async fn toggling_sends_one_request_with_updated_filter() {
        let api = Arc::new(FakeApi::default());
        let mut session = Session::mount(
            service(Arc::clone(&api), PermissionStatus::Granted),
            PointsScreen::new(route()),
        );
        session.settle().await;
        assert_eq!(api.queries().len(), 1, "initial request");

        session.update(|screen| screen.handle_selected_item(ItemId(2)));
        session.settle().await;

        let queries = api.queries();
        assert_eq!(queries.len(), 2, "exactly one new request");
        let last = queries.last().expect("latest query");
        assert_eq!(last.items, [ItemId(2)], "carries the selection");
        assert_eq!(last.uf, "SP", "carries the uf");
        assert_eq!(session.screen().points().first().map(|point| point.id), Some(PointId(1)), "applied");
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_requests() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(FakeApi {
            gate: Some(Arc::clone(&gate)),
            ..FakeApi::default()
        });
        let mut session = Session::mount(
            service(Arc::clone(&api), PermissionStatus::Granted),
            PointsScreen::new(route()),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _applied = session.pump();
        assert!(session.is_busy(), "points request blocked on the gate");

        session.cancel();
        gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _applied = session.pump();

        assert!(!session.is_busy(), "tasks aborted");
        assert!(session.screen().points().is_empty(), "cancelled response never applied");
    }

    #[tokio::test]
    async fn dropping_the_session_aborts_in_flight_requests() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(FakeApi {
            gate: Some(Arc::clone(&gate)),
            ..FakeApi::default()
        });
        let mut session = Session::mount(
            service(Arc::clone(&api), PermissionStatus::Granted),
            PointsScreen::new(route()),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _applied = session.pump();
        assert!(session.is_busy(), "points request blocked on the gate");
        assert!(!api.released.load(Ordering::SeqCst), "request still pending");

        drop(session);
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(api.released.load(Ordering::SeqCst), "request future dropped");
        assert!(!api.answered.load(Ordering::SeqCst), "request never answered");
    }

    #[tokio::test]
    async fn detail_session_loads_point() {
        let api = Arc::new(FakeApi::default());
        let mut session = Session::mount(
            service(api, PermissionStatus::Granted),
            DetailScreen::new(DetailParams {
                point_id: PointId(7),
            }),
        );
        session.settle().await;

        let detail = session.screen().detail().expect("detail loaded");
        assert_eq!(detail.point.id, PointId(7), "requested point");
        assert_eq!(detail.items.len(), 1, "items attached");
    }
}
