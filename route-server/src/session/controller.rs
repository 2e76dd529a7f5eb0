//! The route session state machine.
//!
//! [`RouteSession`] owns both markers, the filters and the displayed route.
//! It performs no I/O: every input returns the [`Command`]s (resolver and
//! route calls) the caller must run, and every finished call is fed back as
//! a [`Completion`]. Each command carries a [`RequestId`]; a completion is
//! only applied if it answers the latest request for its marker (resolves)
//! or for the session (routes). Anything older is stale and changes nothing.
//!
//! Drags:
//! - `continue_drag` is throttled. An admitted update resolves the pointer
//!   position and, on a hit, previews a route to the tentative node without
//!   rebinding the marker.
//! - `end_drag` is never throttled. It resolves the release position; a hit
//!   snaps and rebinds the marker, a miss unbinds it and clears the route.
//!   Releasing also invalidates any route still in flight, so a slow preview
//!   can never overwrite the committed result. If the release lookup fails,
//!   the marker returns to its bound node and a previewed route gives way to
//!   the last committed route for the bound pair.

use std::fmt;
use std::time::Instant;

use geo::Point;
use tracing::{debug, trace};

use crate::domain::{Edge, Node};
use crate::itinerary::{self, Itinerary};
use crate::route::{RouteFilters, RouteQuery};

use super::config::SessionConfig;
use super::display::{DisplayedRoute, EdgeTooltip};
use super::error::SessionError;
use super::marker::{Marker, Role};
use super::throttle::DragThrottle;

/// Sequence number of a resolver or route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a resolve is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Tentative lookup during a drag; never rebinds.
    Preview,
    /// Lookup on release; rebinds or unbinds the marker.
    Commit,
}

/// A service call the session needs made.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Resolve {
        request: RequestId,
        role: Role,
        intent: Intent,
        position: Point,
        tolerance: f64,
    },
    Route {
        request: RequestId,
        query: RouteQuery,
        preview: bool,
    },
}

impl Command {
    pub fn request(&self) -> RequestId {
        match self {
            Command::Resolve { request, .. } | Command::Route { request, .. } => *request,
        }
    }
}

/// The result of a [`Command`], fed back into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Resolved {
        request: RequestId,
        role: Role,
        result: Result<Option<Node>, SessionError>,
    },
    Routed {
        request: RequestId,
        result: Result<Vec<Edge>, SessionError>,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingResolve {
    request: RequestId,
    intent: Intent,
}

#[derive(Debug, Clone)]
struct PendingRoute {
    request: RequestId,
    query: RouteQuery,
    preview: bool,
    from: String,
    to: String,
}

/// Everything the presentation layer needs to draw the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub source: Marker,
    pub target: Marker,
    pub filters: RouteFilters,
    pub route: Option<DisplayedRoute>,
    pub last_error: Option<SessionError>,
    /// Bumped on every visible change.
    pub revision: u64,
}

impl SessionSnapshot {
    pub fn marker(&self, role: Role) -> &Marker {
        match role {
            Role::Source => &self.source,
            Role::Target => &self.target,
        }
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.route.as_ref().map(|r| &r.itinerary)
    }
}

/// Interactive route session between two draggable markers.
#[derive(Debug)]
pub struct RouteSession {
    config: SessionConfig,
    throttle: DragThrottle,
    filters: RouteFilters,
    markers: [Marker; 2],
    pending_resolve: [Option<PendingResolve>; 2],
    pending_route: Option<PendingRoute>,
    displayed: Option<DisplayedRoute>,
    /// Last non-preview route shown.
    committed: Option<DisplayedRoute>,
    last_error: Option<SessionError>,
    next_request: u64,
    revision: u64,
}

impl RouteSession {
    /// A session with both markers unbound at the origin.
    pub fn new(config: SessionConfig, throttle: DragThrottle) -> Self {
        let origin = Point::new(0.0, 0.0);
        Self {
            config,
            throttle,
            filters: RouteFilters::new(),
            markers: [Marker::new(Role::Source, origin), Marker::new(Role::Target, origin)],
            pending_resolve: [None, None],
            pending_route: None,
            displayed: None,
            committed: None,
            last_error: None,
            next_request: 0,
            revision: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn marker(&self, role: Role) -> &Marker {
        &self.markers[role.index()]
    }

    pub fn filters(&self) -> &RouteFilters {
        &self.filters
    }

    pub fn displayed(&self) -> Option<&DisplayedRoute> {
        self.displayed.as_ref()
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.displayed.as_ref().map(|r| &r.itinerary)
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Tooltip for the displayed route edge nearest to `position`.
    pub fn tooltip_at(&self, position: Point, tolerance: f64) -> Option<EdgeTooltip> {
        self.displayed.as_ref()?.tooltip_at(position, tolerance)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.markers[0].clone(),
            target: self.markers[1].clone(),
            filters: self.filters.clone(),
            route: self.displayed.clone(),
            last_error: self.last_error.clone(),
            revision: self.revision,
        }
    }

    /// The user picked up a marker.
    pub fn begin_drag(&mut self, role: Role) {
        self.markers[role.index()].dragging = true;
        self.touch();
    }

    /// The pointer moved while dragging.
    ///
    /// Returns a preview resolve when the throttle admits the update, and
    /// nothing otherwise. Updates for a marker that is not being dragged
    /// are ignored.
    pub fn continue_drag(&mut self, role: Role, position: Point, now: Instant) -> Vec<Command> {
        let marker = &mut self.markers[role.index()];
        if !marker.dragging {
            trace!(%role, "drag update for a marker that is not being dragged");
            return Vec::new();
        }
        marker.position = position;
        self.touch();

        if !self.throttle.admit_at(now) {
            trace!(%role, "drag update throttled");
            return Vec::new();
        }

        vec![self.issue_resolve(role, Intent::Preview, position)]
    }

    /// The user released a marker at `position`.
    pub fn end_drag(&mut self, role: Role, position: Point) -> Vec<Command> {
        let marker = &mut self.markers[role.index()];
        marker.dragging = false;
        marker.position = position;
        self.pending_route = None;
        self.touch();

        vec![self.issue_resolve(role, Intent::Commit, position)]
    }

    /// Bind a marker directly to a known node.
    pub fn place_marker(&mut self, role: Role, node: Node) -> Vec<Command> {
        let marker = &mut self.markers[role.index()];
        marker.dragging = false;
        marker.bind(node);
        self.pending_resolve[role.index()] = None;
        self.pending_route = None;
        self.touch();

        self.route_between_bound().into_iter().collect()
    }

    /// Replace the mode and year filters, re-routing when both markers are
    /// bound.
    pub fn set_filters(&mut self, filters: RouteFilters) -> Vec<Command> {
        self.filters = filters;
        self.touch();

        self.route_between_bound().into_iter().collect()
    }

    /// Apply the result of an earlier command.
    ///
    /// Returns the follow-up commands. An `Err` reports why the completion
    /// did not produce a route: a stale response (nothing changed) or a
    /// failure that is now recorded as the session's last error.
    pub fn complete(&mut self, completion: Completion) -> Result<Vec<Command>, SessionError> {
        match completion {
            Completion::Resolved {
                request,
                role,
                result,
            } => self.complete_resolve(request, role, result),
            Completion::Routed { request, result } => self.complete_route(request, result),
        }
    }

    fn complete_resolve(
        &mut self,
        request: RequestId,
        role: Role,
        result: Result<Option<Node>, SessionError>,
    ) -> Result<Vec<Command>, SessionError> {
        let slot = &mut self.pending_resolve[role.index()];
        let pending = match slot {
            Some(pending) if pending.request == request => *pending,
            _ => {
                debug!(%request, %role, "dropping stale resolve");
                return Err(SessionError::StaleResponse(request));
            }
        };
        *slot = None;

        let node = match result {
            Ok(Some(node)) => node,
            Ok(None) => {
                let err = SessionError::ResolutionEmpty {
                    role,
                    tolerance: self.config.tolerance,
                };
                if pending.intent == Intent::Commit {
                    self.markers[role.index()].unbind();
                }
                self.clear_route();
                return Err(self.fail(err));
            }
            Err(err) => {
                if pending.intent == Intent::Commit {
                    self.revert_to_binding(role);
                }
                return Err(self.fail(err));
            }
        };

        match pending.intent {
            Intent::Commit => {
                debug!(%role, node = %node.id, name = %node.name, "marker bound");
                self.markers[role.index()].bind(node);
                self.last_error = None;
                self.touch();
                Ok(self.route_between_bound().into_iter().collect())
            }
            Intent::Preview => {
                let other = self.markers[role.other().index()].bound.clone();
                let Some(other) = other else {
                    return Ok(Vec::new());
                };
                let (source, target) = match role {
                    Role::Source => (&node, &other),
                    Role::Target => (&other, &node),
                };
                Ok(vec![self.issue_route(source, target, true)])
            }
        }
    }

    fn complete_route(
        &mut self,
        request: RequestId,
        result: Result<Vec<Edge>, SessionError>,
    ) -> Result<Vec<Command>, SessionError> {
        let pending = match self.pending_route.take() {
            Some(pending) if pending.request == request => pending,
            other => {
                self.pending_route = other;
                debug!(%request, "dropping stale route");
                return Err(SessionError::StaleResponse(request));
            }
        };

        let edges = match result {
            Ok(edges) => edges,
            Err(err) => return Err(self.fail(err)),
        };

        if edges.is_empty() {
            self.clear_route();
            return Err(self.fail(SessionError::RouteEmpty {
                from: pending.from,
                to: pending.to,
            }));
        }

        let itinerary = if self.config.merge_display_aliases {
            itinerary::build_for_display(&edges)
        } else {
            itinerary::build(&edges)
        };
        debug!(
            %request,
            edges = edges.len(),
            segments = itinerary.segments().len(),
            preview = pending.preview,
            "route displayed"
        );

        let route = DisplayedRoute {
            edges,
            itinerary,
            preview: pending.preview,
            query: pending.query,
        };
        if !route.preview {
            self.committed = Some(route.clone());
        }
        self.displayed = Some(route);
        self.last_error = None;
        self.touch();
        Ok(Vec::new())
    }

    fn next_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn issue_resolve(&mut self, role: Role, intent: Intent, position: Point) -> Command {
        let request = self.next_request();
        self.pending_resolve[role.index()] = Some(PendingResolve { request, intent });
        Command::Resolve {
            request,
            role,
            intent,
            position,
            tolerance: self.config.tolerance,
        }
    }

    fn issue_route(&mut self, source: &Node, target: &Node, preview: bool) -> Command {
        let request = self.next_request();
        let query = RouteQuery::new(source.id, target.id, &self.filters);
        self.pending_route = Some(PendingRoute {
            request,
            query: query.clone(),
            preview,
            from: source.name.clone(),
            to: target.name.clone(),
        });
        Command::Route {
            request,
            query,
            preview,
        }
    }

    /// Route between the two bound nodes, if both markers are bound.
    fn route_between_bound(&mut self) -> Option<Command> {
        let source = self.markers[0].bound.clone()?;
        let target = self.markers[1].bound.clone()?;
        Some(self.issue_route(&source, &target, false))
    }

    /// Undo what a drag showed after its release could not be resolved.
    fn revert_to_binding(&mut self, role: Role) {
        let marker = &mut self.markers[role.index()];
        if let Some(node) = &marker.bound {
            marker.position = node.position;
        }
        if self.displayed.as_ref().is_some_and(|route| route.preview) {
            debug!(%role, "release failed, withdrawing preview");
            self.displayed = self.committed_for_bound();
        }
        self.touch();
    }

    /// The last committed route, if it still answers the bound pair under
    /// the current filters.
    fn committed_for_bound(&self) -> Option<DisplayedRoute> {
        let source = self.markers[0].bound.as_ref()?;
        let target = self.markers[1].bound.as_ref()?;
        let query = RouteQuery::new(source.id, target.id, &self.filters);
        self.committed.clone().filter(|route| route.query == query)
    }

    fn clear_route(&mut self) {
        self.displayed = None;
        self.pending_route = None;
        self.touch();
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        self.last_error = Some(err.clone());
        self.touch();
        err
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
