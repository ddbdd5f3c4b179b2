//! Orthogonal connectors between dependent task bars.
//!
//! A connector leaves the predecessor at its right-center, runs horizontally
//! to the midpoint between the two bars, vertically to the successor's row and
//! horizontally into the successor's left-center, where an arrowhead sits.

use std::collections::HashMap;

use serde::Serialize;

use super::{Bar, Point, Rect};
use crate::model::Task;

const ARROW_LENGTH: f32 = 8.0;
const ARROW_HALF_WIDTH: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentAxis {
    Horizontal,
    Vertical,
}

/// One straight piece of a connector. Zero-length segments are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub axis: SegmentAxis,
    pub start: Point,
    pub end: Point,
}

impl Segment {
    fn horizontal(start: Point, end_x: f32) -> Self {
        Self {
            axis: SegmentAxis::Horizontal,
            start,
            end: Point::new(end_x, start.y),
        }
    }

    fn vertical(start: Point, end_y: f32) -> Self {
        Self {
            axis: SegmentAxis::Vertical,
            start,
            end: Point::new(start.x, end_y),
        }
    }

    /// Signed extent along the segment's axis.
    pub fn delta(&self) -> f32 {
        match self.axis {
            SegmentAxis::Horizontal => self.end.x - self.start.x,
            SegmentAxis::Vertical => self.end.y - self.start.y,
        }
    }

    pub fn length(&self) -> f32 {
        self.delta().abs()
    }

    /// Bounding box with non-negative width and height.
    pub fn rect(&self) -> Rect {
        let x = self.start.x.min(self.end.x);
        let y = self.start.y.min(self.end.y);
        Rect::new(x, y, (self.end.x - self.start.x).abs(), (self.end.y - self.start.y).abs())
    }
}

/// Right-pointing triangle whose tip touches the successor bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrowhead {
    pub tip: Point,
    /// Tip, upper base corner, lower base corner.
    pub points: [Point; 3],
}

impl Arrowhead {
    fn at(tip: Point) -> Self {
        let base_x = tip.x - ARROW_LENGTH;
        Self {
            tip,
            points: [
                tip,
                Point::new(base_x, tip.y - ARROW_HALF_WIDTH),
                Point::new(base_x, tip.y + ARROW_HALF_WIDTH),
            ],
        }
    }
}

/// A routed dependency edge, always horizontal, vertical, horizontal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorPath {
    /// Predecessor task id.
    pub from: String,
    /// Successor task id.
    pub to: String,
    pub segments: [Segment; 3],
    pub arrow: Arrowhead,
}

/// Route a connector between two laid-out bars.
pub fn route_connector(predecessor: Rect, successor: Rect) -> ([Segment; 3], Arrowhead) {
    let exit = predecessor.right_center();
    let entry = successor.left_center();
    let mid_x = exit.x + (entry.x - exit.x) / 2.0;

    let segments = [
        Segment::horizontal(exit, mid_x),
        Segment::vertical(Point::new(mid_x, exit.y), entry.y),
        Segment::horizontal(Point::new(mid_x, entry.y), entry.x),
    ];
    (segments, Arrowhead::at(entry))
}

/// Route every dependency edge whose both ends are visible.
///
/// Edges naming a filtered-out or nonexistent task are skipped.
pub(crate) fn route_all(visible: &[&Task], bars: &[Bar]) -> Vec<ConnectorPath> {
    let rects: HashMap<&str, Rect> = bars.iter().map(|b| (b.id.as_str(), b.rect())).collect();

    let mut paths = Vec::new();
    for task in visible {
        let Some(&successor) = rects.get(task.id.as_str()) else {
            continue;
        };
        for predecessor_id in &task.depends_on {
            let Some(&predecessor) = rects.get(predecessor_id.as_str()) else {
                continue;
            };
            let (segments, arrow) = route_connector(predecessor, successor);
            paths.push(ConnectorPath {
                from: predecessor_id.clone(),
                to: task.id.clone(),
                segments,
                arrow,
            });
        }
    }
    paths
}
