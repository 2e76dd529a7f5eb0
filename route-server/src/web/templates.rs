//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::trip_time;
use crate::itinerary::{Itinerary, RouteSegment};

// ============================================================================
// Fragment Templates (AJAX responses)
// ============================================================================

/// Itinerary panel fragment.
#[derive(Template)]
#[template(path = "itinerary.html")]
pub struct ItineraryTemplate {
    pub itinerary: Option<ItineraryView>,
    /// Shown instead of the itinerary when there is no route
    pub message: String,
}

impl ItineraryTemplate {
    pub fn new(itinerary: Option<&Itinerary>, message: impl Into<String>) -> Self {
        Self {
            itinerary: itinerary
                .filter(|i| !i.is_empty())
                .map(ItineraryView::from_itinerary),
            message: message.into(),
        }
    }
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Itinerary view model for templates.
#[derive(Debug, Clone)]
pub struct ItineraryView {
    /// `"<origin> to <destination>"`
    pub heading: String,
    pub segments: Vec<SegmentView>,
    pub total_time: String,
}

impl ItineraryView {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            heading: format!(
                "{} to {}",
                itinerary.origin().unwrap_or_default(),
                itinerary.destination().unwrap_or_default()
            ),
            segments: itinerary
                .segments()
                .iter()
                .map(SegmentView::from_segment)
                .collect(),
            total_time: trip_time(itinerary.total_cost()),
        }
    }
}

/// Segment view model for templates.
#[derive(Debug, Clone)]
pub struct SegmentView {
    pub entry: String,
    pub exit: String,
    /// Pass-through stops between entry and exit
    pub stops: Vec<String>,
    pub mode: String,
    pub time: String,
}

impl SegmentView {
    pub fn from_segment(segment: &RouteSegment) -> Self {
        Self {
            entry: segment.entry().to_string(),
            exit: segment.exit().to_string(),
            stops: segment.stops().to_vec(),
            mode: segment.mode().to_string(),
            time: trip_time(segment.cost()),
        }
    }

    /// `"via a, b"`, or nothing for a segment without intermediate stops.
    pub fn via(&self) -> Option<String> {
        if self.stops.is_empty() {
            None
        } else {
            Some(format!("via {}", self.stops.join(", ")))
        }
    }

    /// One itinerary line: `"<entry> to <exit> [via ...] (<mode>, <time>)"`.
    pub fn line(&self) -> String {
        match self.via() {
            Some(via) => format!(
                "{} to {} {} ({}, {})",
                self.entry, self.exit, via, self.mode, self.time
            ),
            None => format!("{} to {} ({}, {})", self.entry, self.exit, self.mode, self.time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, Mode};
    use crate::itinerary::build;

    fn itinerary() -> Itinerary {
        build(&[
            Edge::new("1", "Salonica", "Veria", Mode::Rail, 1.5).unwrap(),
            Edge::new("2", "Veria", "Edessa", Mode::Rail, 1.0).unwrap(),
            Edge::new("3", "Edessa", "Florina", Mode::Rail, 1.0).unwrap(),
            Edge::new("4", "Florina", "Bitola", Mode::Chaussee, 3.0).unwrap(),
        ])
    }

    #[test]
    fn segment_lines() {
        let view = ItineraryView::from_itinerary(&itinerary());

        assert_eq!(view.heading, "Salonica to Bitola");
        assert_eq!(
            view.segments[0].line(),
            "Salonica to Florina via Veria, Edessa (rail, 3 hours, 30 minutes)"
        );
        assert_eq!(view.segments[1].line(), "Florina to Bitola (chaussee, 3 hours)");
        assert_eq!(view.total_time, "6 hours, 30 minutes");
    }

    #[test]
    fn render_itinerary() {
        let itinerary = itinerary();
        let html = ItineraryTemplate::new(Some(&itinerary), "No route")
            .render()
            .unwrap();

        assert!(html.contains("Salonica to Bitola"));
        assert!(html.contains("via Veria, Edessa"));
        assert!(html.contains("Total trip time: 6 hours, 30 minutes"));
        assert!(!html.contains("No route"));
    }

    #[test]
    fn render_without_route() {
        let html = ItineraryTemplate::new(None, "No route between Sofia & Varna")
            .render()
            .unwrap();
        assert!(html.contains("No route between Sofia &amp; Varna"));

        let empty = Itinerary::empty();
        let html = ItineraryTemplate::new(Some(&empty), "No route").render().unwrap();
        assert!(html.contains("No route"));
    }
}
