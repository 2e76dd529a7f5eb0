//! Runs a [`RouteSession`] as a tokio task.
//!
//! The task owns the session and handles one message at a time: user
//! events from a bounded queue and completions from the service calls it
//! spawned. Every state change is therefore serialized on this one task.
//! After each message the current [`SessionSnapshot`] is published on a
//! watch channel for readers.

use std::sync::Arc;

use geo::Point;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain::Node;
use crate::route::{RouteFilters, RouteProvider};
use crate::spatial::NodeResolver;

use super::config::SessionConfig;
use super::controller::{Command, Completion, RouteSession, SessionSnapshot};
use super::display::EdgeTooltip;
use super::error::{SessionClosed, SessionError};
use super::marker::Role;
use super::retry::RetryPolicy;
use super::throttle::DragThrottle;

/// Stage of a marker drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Begin,
    Continue,
    End,
}

/// A pointer event on one of the markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub role: Role,
    pub phase: DragPhase,
    pub position: Point,
}

/// Input to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Drag(DragEvent),
    SetFilters(RouteFilters),
    Place { role: Role, node: Node },
}

/// Handle to a running session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    hover_tolerance: f64,
}

impl SessionHandle {
    /// Queue an event for the session.
    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionClosed> {
        self.events.send(event).await.map_err(|_| SessionClosed)
    }

    /// Bind both markers to known nodes, which routes between them.
    pub async fn place_markers(&self, source: Node, target: Node) -> Result<(), SessionClosed> {
        self.send(SessionEvent::Place {
            role: Role::Source,
            node: source,
        })
        .await?;
        self.send(SessionEvent::Place {
            role: Role::Target,
            node: target,
        })
        .await
    }

    /// The most recently published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Tooltip for the displayed route edge nearest to `position`.
    pub fn hover(&self, position: Point) -> Option<EdgeTooltip> {
        self.snapshots
            .borrow()
            .route
            .as_ref()?
            .tooltip_at(position, self.hover_tolerance)
    }
}

/// Start a session task using `resolver` and `provider` for service calls.
///
/// The task runs until every [`SessionHandle`] has been dropped.
pub fn spawn_session<R, P>(resolver: Arc<R>, provider: Arc<P>, config: SessionConfig) -> SessionHandle
where
    R: NodeResolver,
    P: RouteProvider,
{
    let (events_tx, events_rx) = mpsc::channel(config.queue_capacity);
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();

    // The tokio clock so paused-time tests drive the throttle too.
    let epoch = tokio::time::Instant::now().into_std();
    let throttle = DragThrottle::starting_at(epoch, config.throttle_period);
    let hover_tolerance = config.hover_tolerance;
    let retry = config.retry_policy();

    let session = RouteSession::new(config, throttle);
    let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());

    let driver = SessionDriver {
        session,
        resolver,
        provider,
        retry,
        completions: completions_tx,
        snapshots: snapshots_tx,
    };
    tokio::spawn(driver.run(events_rx, completions_rx));

    SessionHandle {
        events: events_tx,
        snapshots: snapshots_rx,
        hover_tolerance,
    }
}

struct SessionDriver<R, P> {
    session: RouteSession,
    resolver: Arc<R>,
    provider: Arc<P>,
    retry: RetryPolicy,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl<R: NodeResolver, P: RouteProvider> SessionDriver<R, P> {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
            self.publish();
        }
        info!("route session stopped");
    }

    fn handle_event(&mut self, event: SessionEvent) {
        let commands = match event {
            SessionEvent::Drag(DragEvent {
                role,
                phase,
                position,
            }) => match phase {
                DragPhase::Begin => {
                    self.session.begin_drag(role);
                    Vec::new()
                }
                DragPhase::Continue => {
                    let now = tokio::time::Instant::now().into_std();
                    self.session.continue_drag(role, position, now)
                }
                DragPhase::End => self.session.end_drag(role, position),
            },
            SessionEvent::SetFilters(filters) => self.session.set_filters(filters),
            SessionEvent::Place { role, node } => self.session.place_marker(role, node),
        };
        self.dispatch(commands);
    }

    fn handle_completion(&mut self, completion: Completion) {
        match self.session.complete(completion) {
            Ok(commands) => self.dispatch(commands),
            Err(SessionError::StaleResponse(request)) => {
                debug!(%request, "discarded stale response");
            }
            Err(err @ (SessionError::ResolutionEmpty { .. } | SessionError::RouteEmpty { .. })) => {
                debug!(error = %err, "nothing to display");
            }
            Err(err) => warn!(error = %err, "service call failed"),
        }
    }

    fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            let completions = self.completions.clone();
            let retry = self.retry;

            match command {
                Command::Resolve {
                    request,
                    role,
                    intent,
                    position,
                    tolerance,
                } => {
                    debug!(%request, %role, ?intent, "resolving marker position");
                    let resolver = Arc::clone(&self.resolver);
                    tokio::spawn(async move {
                        let result = retry
                            .run(|| resolver.nearest_node(position, tolerance))
                            .await;
                        // Send fails only once the session has stopped.
                        let _ = completions.send(Completion::Resolved {
                            request,
                            role,
                            result,
                        });
                    });
                }
                Command::Route {
                    request,
                    query,
                    preview,
                } => {
                    debug!(
                        %request,
                        source = %query.source,
                        target = %query.target,
                        preview,
                        "requesting route"
                    );
                    let provider = Arc::clone(&self.provider);
                    tokio::spawn(async move {
                        let result = retry.run(|| provider.route(&query)).await;
                        let _ = completions.send(Completion::Routed { request, result });
                    });
                }
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if current.revision == snapshot.revision {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, Mode, NodeId};
    use crate::wfs::MockNetwork;
    use geo::{line_string, point};
    use std::time::Duration;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new(NodeId(1), "Belgrade", 10, point!(x: 0.0, y: 0.0)),
            Node::new(NodeId(2), "Nis", 7, point!(x: 0.0, y: -200_000.0)),
            Node::new(NodeId(3), "Sofia", 9, point!(x: 150_000.0, y: -300_000.0)),
        ]
    }

    fn edge(id: &str, from: &str, to: &str, mode: Mode, cost: f64) -> Edge {
        Edge::new(id, from, to, mode, cost).unwrap()
    }

    async fn network() -> MockNetwork {
        let network = MockNetwork::new(nodes());
        network
            .add_route(
                NodeId(1),
                NodeId(2),
                vec![edge("route.1", "Belgrade", "Nis", Mode::Rail, 5.0)],
            )
            .await;
        network
            .add_route(
                NodeId(1),
                NodeId(3),
                vec![
                    edge("route.1", "Belgrade", "Nis", Mode::Rail, 5.0),
                    edge("route.2", "Nis", "Sofia", Mode::Chaussee, 12.0),
                ],
            )
            .await;
        network
    }

    fn spawn(network: &MockNetwork) -> SessionHandle {
        let config = SessionConfig::default().with_retry(0, Duration::ZERO);
        spawn_session(Arc::new(network.clone()), Arc::new(network.clone()), config)
    }

    async fn wait_until(
        handle: &SessionHandle,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        let mut rx = handle.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(30), rx.wait_for(|s| predicate(s)))
            .await
            .expect("session did not reach expected state")
            .expect("session stopped")
            .clone();
        snapshot
    }

    fn drag(role: Role, phase: DragPhase, x: f64, y: f64) -> SessionEvent {
        SessionEvent::Drag(DragEvent {
            role,
            phase,
            position: point!(x: x, y: y),
        })
    }

    async fn place_both(handle: &SessionHandle, network: &MockNetwork) {
        let source = network.index().get(NodeId(1)).unwrap().clone();
        let target = network.index().get(NodeId(2)).unwrap().clone();
        handle.place_markers(source, target).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn placing_markers_displays_route() {
        let network = network().await;
        let handle = spawn(&network);

        place_both(&handle, &network).await;

        let snapshot = wait_until(&handle, |s| s.route.is_some()).await;
        let itinerary = snapshot.itinerary().unwrap();
        assert_eq!(itinerary.origin(), Some("Belgrade"));
        assert_eq!(itinerary.destination(), Some("Nis"));
        assert_eq!(network.route_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn startup_places_markers_on_leading_nodes() {
        let network = network().await;
        let handle = spawn(&network);

        let (source, target) = network.index().initial_pair().unwrap();
        handle.place_markers(source, target).await.unwrap();

        let snapshot = wait_until(&handle, |s| s.route.is_some()).await;
        assert_eq!(snapshot.source.bound.as_ref().unwrap().name, "Belgrade");
        assert_eq!(snapshot.target.bound.as_ref().unwrap().name, "Sofia");
        assert_eq!(snapshot.target.position, point!(x: 150_000.0, y: -300_000.0));
        assert_eq!(snapshot.itinerary().unwrap().destination(), Some("Sofia"));
    }

    #[tokio::test(start_paused = true)]
    async fn release_snaps_to_nearest_node() {
        let network = network().await;
        let handle = spawn(&network);
        place_both(&handle, &network).await;
        wait_until(&handle, |s| s.route.is_some()).await;

        handle
            .send(drag(Role::Target, DragPhase::Begin, 0.0, -200_000.0))
            .await
            .unwrap();
        handle
            .send(drag(Role::Target, DragPhase::End, 140_000.0, -290_000.0))
            .await
            .unwrap();

        let snapshot = wait_until(&handle, |s| {
            s.route
                .as_ref()
                .is_some_and(|r| r.query.target == NodeId(3))
        })
        .await;

        assert_eq!(
            snapshot.target.position,
            point!(x: 150_000.0, y: -300_000.0)
        );
        assert_eq!(snapshot.itinerary().unwrap().segments().len(), 2);
        assert!(!snapshot.route.unwrap().preview);
    }

    #[tokio::test(start_paused = true)]
    async fn release_far_from_any_node_clears_route() {
        let network = network().await;
        let handle = spawn(&network);
        place_both(&handle, &network).await;
        wait_until(&handle, |s| s.route.is_some()).await;

        handle
            .send(drag(Role::Source, DragPhase::Begin, 0.0, 0.0))
            .await
            .unwrap();
        handle
            .send(drag(Role::Source, DragPhase::End, 9e6, 9e6))
            .await
            .unwrap();

        let snapshot = wait_until(&handle, |s| !s.source.is_bound()).await;
        assert!(snapshot.route.is_none());
        assert!(matches!(
            snapshot.last_error,
            Some(SessionError::ResolutionEmpty {
                role: Role::Source,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn drag_updates_are_throttled() {
        let network = network().await;
        let handle = spawn(&network);

        handle
            .send(drag(Role::Source, DragPhase::Begin, 0.0, 0.0))
            .await
            .unwrap();
        for i in 0..5 {
            handle
                .send(drag(Role::Source, DragPhase::Continue, i as f64, 0.0))
                .await
                .unwrap();
        }
        wait_until(&handle, |s| s.source.position == point!(x: 4.0, y: 0.0)).await;
        tokio::task::yield_now().await;
        assert_eq!(network.resolve_calls(), 1);

        tokio::time::advance(Duration::from_millis(30)).await;
        handle
            .send(drag(Role::Source, DragPhase::Continue, 5.0, 0.0))
            .await
            .unwrap();
        wait_until(&handle, |s| s.source.position == point!(x: 5.0, y: 0.0)).await;
        tokio::task::yield_now().await;
        assert_eq!(network.resolve_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_route_is_discarded() {
        let network = network().await;
        // The first route is slow; the user moves on before it answers.
        network
            .add_slow_route(
                NodeId(1),
                NodeId(2),
                vec![edge("route.9", "Belgrade", "Nis", Mode::Road, 40.0)],
                Duration::from_secs(3),
            )
            .await;
        let handle = spawn(&network);
        place_both(&handle, &network).await;

        handle
            .send(drag(Role::Target, DragPhase::Begin, 0.0, -200_000.0))
            .await
            .unwrap();
        handle
            .send(drag(Role::Target, DragPhase::End, 150_000.0, -300_000.0))
            .await
            .unwrap();

        wait_until(&handle, |s| {
            s.route
                .as_ref()
                .is_some_and(|r| r.query.target == NodeId(3))
        })
        .await;

        // Let the slow response arrive.
        tokio::time::sleep(Duration::from_secs(5)).await;

        let snapshot = handle.snapshot();
        let route = snapshot.route.unwrap();
        assert_eq!(route.query.target, NodeId(3));
        assert_eq!(route.itinerary.total_cost(), 17.0);
        assert_eq!(network.route_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn network_failure_is_reported_not_fatal() {
        let network = network().await;
        let handle = spawn(&network);
        place_both(&handle, &network).await;
        wait_until(&handle, |s| s.route.is_some()).await;

        network.set_failing(true);
        handle
            .send(SessionEvent::SetFilters(RouteFilters::from_parts([Mode::Metro], None)))
            .await
            .unwrap();

        let snapshot = wait_until(&handle, |s| s.last_error.is_some()).await;
        assert!(matches!(
            snapshot.last_error,
            Some(SessionError::NetworkFailure(_))
        ));
        assert!(snapshot.route.is_some());

        network.set_failing(false);
        handle
            .send(SessionEvent::SetFilters(RouteFilters::new()))
            .await
            .unwrap();
        wait_until(&handle, |s| s.last_error.is_none()).await;
    }

    #[tokio::test(start_paused = true)]
    async fn hover_over_displayed_route() {
        let network = network().await;
        network
            .add_route(
                NodeId(1),
                NodeId(2),
                vec![
                    edge("route.1", "Belgrade", "Nis", Mode::Rail, 5.0).with_line(
                        line_string![(x: 0.0, y: 0.0), (x: 0.0, y: -200_000.0)],
                    ),
                ],
            )
            .await;
        let handle = spawn(&network);
        assert_eq!(handle.hover(point!(x: 0.0, y: -100_000.0)), None);

        place_both(&handle, &network).await;
        wait_until(&handle, |s| s.route.is_some()).await;

        let tooltip = handle.hover(point!(x: 1_000.0, y: -100_000.0)).unwrap();
        assert_eq!(tooltip.title, "Belgrade - Nis");
        assert_eq!(tooltip.detail, "5 hours by rail");
        assert_eq!(handle.hover(point!(x: 90_000.0, y: -100_000.0)), None);
    }
}
