//! Win-condition checking

use crate::path_store::PathStore;
use crate::types::{BoardConfig, Cell, PointSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// How a status message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Outcome of a solution check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub solved: bool,
    pub message: String,
    pub severity: Severity,
}

impl Verdict {
    fn solved(message: impl Into<String>) -> Self {
        Self {
            solved: true,
            message: message.into(),
            severity: Severity::Success,
        }
    }

    fn unsolved(message: impl Into<String>) -> Self {
        Self {
            solved: false,
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Decide whether the committed paths solve the board.
///
/// Every color with exactly two points needs a path joining its two points,
/// and those paths together must cover each cell of the grid exactly once.
/// Checks run in a fixed order and the first failure is reported.
#[instrument(level = "debug", skip_all, fields(rows = board.rows, cols = board.cols, paths = store.size()))]
pub fn check_solution(board: &BoardConfig, points: &PointSet, store: &PathStore) -> Verdict {
    if points.is_empty() {
        return Verdict::solved("Empty board is considered solved.");
    }

    let required = points.paired_colors();
    if required.is_empty() {
        return Verdict::unsolved("No valid (paired) points found on the board to connect.");
    }

    if required.len() != store.size() {
        return Verdict::unsolved("Not all required colors have a path.");
    }
    if let Some(missing) = required.iter().find(|c| !store.contains(c)) {
        return Verdict::unsolved(format!("Path for color {missing} is missing."));
    }

    for color in &required {
        let Some(path) = store.get(color) else {
            return Verdict::unsolved(format!("Path for color {color} is missing."));
        };
        let Some((start, end)) = path.endpoints().filter(|_| path.len() >= 2) else {
            return Verdict::unsolved(format!("Path for color {color} is too short."));
        };
        let Some((p1, p2)) = points.pair_of(color) else {
            return Verdict::unsolved(format!(
                "Color {color} does not have exactly two endpoints defined for checking."
            ));
        };
        let forward = start == p1.cell() && end == p2.cell();
        let backward = start == p2.cell() && end == p1.cell();
        if !(forward || backward) {
            return Verdict::unsolved(format!(
                "Path for color {color} does not connect its designated endpoints."
            ));
        }
    }

    let mut visited: HashSet<Cell> = HashSet::with_capacity(board.cell_count());
    for color in &required {
        let Some(path) = store.get(color) else {
            continue;
        };
        for cell in &path.segments {
            if !visited.insert(*cell) {
                return Verdict::unsolved("Paths overlap.");
            }
        }
    }

    let total = board.cell_count();
    if visited.len() != total {
        return Verdict::unsolved(format!(
            "Not all grid cells are covered. Covered: {}, Total: {}",
            visited.len(),
            total
        ));
    }

    Verdict::solved("Congratulations! Puzzle solved!")
}
