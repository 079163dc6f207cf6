//! Stroke tracking: turns a stream of candidate cells into a path
//!
//! A stroke starts on a point, grows one orthogonal step at a time (diagonal
//! pointer jumps are split into an L-shaped pair of steps), retracts when the
//! pointer retraces its last step, and on release either becomes the color's
//! committed path or is thrown away.

use crate::path_store::PathStore;
use crate::types::{Cell, Color, PointId, PointSet};
use std::collections::BTreeSet;
use tracing::debug;

/// Effect of a single tracker call on the stroke and the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrokeChange {
    /// The active stroke's cell list changed
    pub moved: bool,
    /// Committed paths deleted by this call
    pub removed: Vec<Color>,
}

impl StrokeChange {
    /// Deleting committed paths is an unsaved change
    pub fn is_dirty(&self) -> bool {
        !self.removed.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        !self.moved && self.removed.is_empty()
    }
}

/// Result of releasing the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeFinish {
    pub color: Color,
    /// The stroke became the color's path
    pub committed: bool,
    /// The store differs from before the release
    pub dirty: bool,
}

/// Which L-shaped route a diagonal jump took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalRoute {
    /// Horizontal first: `(target.x, last.y)` then target
    HorizontalFirst,
    /// Vertical first: `(last.x, target.y)` then target
    VerticalFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveStroke {
    color: Color,
    segments: Vec<Cell>,
    completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum StrokeState {
    #[default]
    Idle,
    Drawing(ActiveStroke),
}

struct RouteEval {
    blocked: bool,
    deletions: BTreeSet<Color>,
    steps: [Cell; 2],
}

/// Single-stroke state machine (`Idle -> Drawing -> Idle`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrokeTracker {
    state: StrokeState,
}

impl StrokeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing(_))
    }

    pub fn active_color(&self) -> Option<&Color> {
        match &self.state {
            StrokeState::Drawing(stroke) => Some(&stroke.color),
            StrokeState::Idle => None,
        }
    }

    /// Cells of the stroke in progress (empty while idle)
    pub fn segments(&self) -> &[Cell] {
        match &self.state {
            StrokeState::Drawing(stroke) => &stroke.segments,
            StrokeState::Idle => &[],
        }
    }

    /// The stroke reached its partner endpoint and ignores further moves
    pub fn is_complete(&self) -> bool {
        matches!(&self.state, StrokeState::Drawing(stroke) if stroke.completed)
    }

    /// Begin a stroke on the point at `cell`.
    ///
    /// Returns `None` when no point sits there. An existing path of the same
    /// color is deleted straight away.
    pub fn start(&mut self, cell: Cell, points: &PointSet, store: &mut PathStore) -> Option<StrokeChange> {
        let point = points.at(cell)?;
        let color = point.color.clone();

        let mut change = StrokeChange {
            moved: true,
            removed: Vec::new(),
        };
        if store.remove(&color).is_some() {
            debug!(%color, "restarting stroke, previous path removed");
            change.removed.push(color.clone());
        }

        debug!(%color, %cell, "stroke started");
        self.state = StrokeState::Drawing(ActiveStroke {
            color,
            segments: vec![cell],
            completed: false,
        });
        Some(change)
    }

    /// Feed the cell currently under the pointer
    pub fn extend(&mut self, target: Cell, points: &PointSet, store: &mut PathStore) -> StrokeChange {
        let mut change = StrokeChange::default();
        let StrokeState::Drawing(stroke) = &mut self.state else {
            return change;
        };
        if stroke.completed {
            return change;
        }
        let Some(&last) = stroke.segments.last() else {
            return change;
        };
        if target == last {
            return change;
        }

        let (dx, dy) = last.delta_to(target);
        let steps: Vec<Cell> = match (dx.abs(), dy.abs()) {
            (1, 0) | (0, 1) => vec![target],
            (1, 1) => match choose_diagonal(last, target, &stroke.color, points, store) {
                Some((_, steps)) => steps.to_vec(),
                None => return change,
            },
            _ => return change,
        };

        for step in steps {
            if stroke.completed {
                break;
            }

            let n = stroke.segments.len();
            if n > 1 && stroke.segments[n - 2] == step {
                stroke.segments.pop();
                change.moved = true;
                continue;
            }

            if stroke.segments.contains(&step) {
                break;
            }

            let point = points.at(step);
            if point.is_some_and(|p| p.color != stroke.color) {
                break;
            }

            let occupant = store
                .occupant_at(step, Some(&stroke.color))
                .map(|path| path.color.clone());
            if let Some(occupant) = occupant {
                debug!(color = %occupant, cell = %step, "path cut by crossing stroke");
                store.remove(&occupant);
                change.removed.push(occupant);
            }

            stroke.segments.push(step);
            change.moved = true;

            if let Some(point) = point {
                if reaches_partner(&stroke.segments, point.id, &stroke.color, points) {
                    debug!(color = %stroke.color, "stroke reached its partner endpoint");
                    stroke.completed = true;
                }
            }
        }

        change
    }

    /// Release the pointer: commit the stroke if it is a valid connection,
    /// otherwise drop it together with any stale path of its color.
    pub fn finish(&mut self, points: &PointSet, store: &mut PathStore) -> Option<StrokeFinish> {
        let StrokeState::Drawing(stroke) = std::mem::take(&mut self.state) else {
            return None;
        };

        if is_valid_connection(&stroke.segments, &stroke.color, points) {
            debug!(color = %stroke.color, cells = stroke.segments.len(), "stroke committed");
            store.set(stroke.color.clone(), stroke.segments);
            return Some(StrokeFinish {
                color: stroke.color,
                committed: true,
                dirty: true,
            });
        }

        let removed = store.remove(&stroke.color).is_some();
        debug!(color = %stroke.color, removed, "stroke discarded");
        Some(StrokeFinish {
            color: stroke.color,
            committed: false,
            dirty: removed,
        })
    }

    /// Abandon the stroke without touching the store
    pub fn cancel(&mut self) -> Option<Color> {
        match std::mem::take(&mut self.state) {
            StrokeState::Drawing(stroke) => Some(stroke.color),
            StrokeState::Idle => None,
        }
    }
}

/// Pick the L-shaped route for a diagonal jump from `last` to `target`.
///
/// Routes through a foreign point are invalid. Between two valid routes the
/// one deleting fewer other paths wins, ties go to the horizontal-first route.
pub fn choose_diagonal(
    last: Cell,
    target: Cell,
    color: &Color,
    points: &PointSet,
    store: &PathStore,
) -> Option<(DiagonalRoute, [Cell; 2])> {
    let horizontal = evaluate_route([Cell::new(target.x, last.y), target], color, points, store);
    let vertical = evaluate_route([Cell::new(last.x, target.y), target], color, points, store);

    match (horizontal.blocked, vertical.blocked) {
        (false, true) => Some((DiagonalRoute::HorizontalFirst, horizontal.steps)),
        (true, false) => Some((DiagonalRoute::VerticalFirst, vertical.steps)),
        (false, false) => {
            if horizontal.deletions.len() <= vertical.deletions.len() {
                Some((DiagonalRoute::HorizontalFirst, horizontal.steps))
            } else {
                Some((DiagonalRoute::VerticalFirst, vertical.steps))
            }
        }
        (true, true) => None,
    }
}

fn evaluate_route(steps: [Cell; 2], color: &Color, points: &PointSet, store: &PathStore) -> RouteEval {
    let mut deletions = BTreeSet::new();
    for cell in steps {
        if points.at(cell).is_some_and(|p| &p.color != color) {
            return RouteEval {
                blocked: true,
                deletions,
                steps,
            };
        }
        if let Some(path) = store.occupant_at(cell, Some(color)) {
            deletions.insert(path.color.clone());
        }
    }
    RouteEval {
        blocked: false,
        deletions,
        steps,
    }
}

/// The stroke just stepped onto `reached`, the partner of the point it
/// started from, and the color is an ordinary pair.
fn reaches_partner(segments: &[Cell], reached: PointId, color: &Color, points: &PointSet) -> bool {
    let Some(&start) = segments.first() else {
        return false;
    };
    if segments.len() < 2 {
        return false;
    }
    let Some(start_point) = points.at(start) else {
        return false;
    };
    if start_point.id == reached {
        return false;
    }
    match points.pair_of(color) {
        Some((p1, p2)) => {
            (start_point.id == p1.id && reached == p2.id) || (start_point.id == p2.id && reached == p1.id)
        }
        None => false,
    }
}

/// Release-time acceptance rule.
///
/// Both ends must be distinct points of the stroke's color. A paired color
/// must join exactly its two points; a color with more than two points is
/// accepted once that much holds.
fn is_valid_connection(segments: &[Cell], color: &Color, points: &PointSet) -> bool {
    if segments.len() < 2 {
        return false;
    }
    let (Some(&first), Some(&last)) = (segments.first(), segments.last()) else {
        return false;
    };
    let (Some(start), Some(end)) = (points.at(first), points.at(last)) else {
        return false;
    };
    if &start.color != color || &end.color != color || start.id == end.id {
        return false;
    }

    let count = points.count_of(color);
    if count == 2 {
        match points.pair_of(color) {
            Some((p1, p2)) => {
                (start.id == p1.id && end.id == p2.id) || (start.id == p2.id && end.id == p1.id)
            }
            None => false,
        }
    } else {
        count > 2
    }
}
