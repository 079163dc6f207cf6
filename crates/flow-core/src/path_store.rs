//! Committed paths keyed by color

use crate::error::PathError;
use crate::types::{BoardConfig, Cell, Color, Path, PointSet};
use std::collections::{HashMap, HashSet};

/// In-memory map of color to committed path.
///
/// No cell should be claimed by two colors at once. Drawing code keeps that
/// true by evicting occupants before extending a stroke; the store itself does
/// not enforce it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStore {
    paths: HashMap<Color, Path>,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the path for `color`
    pub fn set(&mut self, color: Color, segments: Vec<Cell>) {
        self.paths.insert(color.clone(), Path::new(color, segments));
    }

    pub fn get(&self, color: &Color) -> Option<&Path> {
        self.paths.get(color)
    }

    pub fn contains(&self, color: &Color) -> bool {
        self.paths.contains_key(color)
    }

    /// The path of some other color covering `cell`
    pub fn occupant_at(&self, cell: Cell, excluding: Option<&Color>) -> Option<&Path> {
        self.paths
            .iter()
            .filter(|(color, _)| Some(*color) != excluding)
            .map(|(_, path)| path)
            .find(|path| path.contains(cell))
    }

    pub fn remove(&mut self, color: &Color) -> Option<Path> {
        self.paths.remove(color)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Number of committed colors
    pub fn size(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn colors(&self) -> impl Iterator<Item = &Color> {
        self.paths.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    /// All paths ordered by color
    pub fn snapshot(&self) -> Vec<Path> {
        let mut paths: Vec<Path> = self.paths.values().cloned().collect();
        paths.sort_by(|a, b| a.color.cmp(&b.color));
        paths
    }
}

impl FromIterator<Path> for PathStore {
    fn from_iter<T: IntoIterator<Item = Path>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().map(|p| (p.color.clone(), p)).collect(),
        }
    }
}

/// Full structural check of a single committed path against the board.
///
/// Stricter than what drawing enforces: colors must be paired, every step must
/// be orthogonal, and no cell may repeat.
pub fn validate_path(board: &BoardConfig, points: &PointSet, path: &Path) -> Result<(), PathError> {
    let color = &path.color;

    let found = points.count_of(color);
    if found == 0 {
        return Err(PathError::UnknownColor {
            color: color.clone(),
        });
    }
    let Some((p1, p2)) = points.pair_of(color) else {
        return Err(PathError::NotPaired {
            color: color.clone(),
            found,
        });
    };

    let Some((start, end)) = path.endpoints().filter(|_| path.len() >= 2) else {
        return Err(PathError::TooShort {
            color: color.clone(),
        });
    };

    if let Some(cell) = path.segments.iter().find(|c| !board.contains(**c)) {
        return Err(PathError::OutOfBounds {
            color: color.clone(),
            cell: *cell,
            rows: board.rows,
            cols: board.cols,
        });
    }

    let forward = start == p1.cell() && end == p2.cell();
    let backward = start == p2.cell() && end == p1.cell();
    if !(forward || backward) {
        return Err(PathError::WrongEndpoints {
            color: color.clone(),
        });
    }

    for pair in path.segments.windows(2) {
        if !pair[0].is_adjacent(pair[1]) {
            return Err(PathError::NotContiguous {
                color: color.clone(),
                from: pair[0],
                to: pair[1],
            });
        }
    }

    let mut seen = HashSet::with_capacity(path.len());
    for cell in &path.segments {
        if !seen.insert(*cell) {
            return Err(PathError::SelfIntersects {
                color: color.clone(),
                cell: *cell,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    fn board_and_points() -> (BoardConfig, PointSet) {
        (
            BoardConfig::new(3, 3),
            PointSet::new(vec![
                Point::new(1, 1, 1, "red"),
                Point::new(2, 3, 1, "red"),
                Point::new(3, 1, 3, "blue"),
                Point::new(4, 1, 2, "gold"),
                Point::new(5, 2, 2, "gold"),
                Point::new(6, 3, 2, "gold"),
            ]),
        )
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut store = PathStore::new();
        let red = Color::from("red");
        store.set(red.clone(), cells(&[(1, 1), (2, 1)]));
        store.set(red.clone(), cells(&[(1, 1), (1, 2)]));
        assert_eq!(store.size(), 1);
        assert_eq!(store.get(&red).unwrap().segments, cells(&[(1, 1), (1, 2)]));
    }

    #[test]
    fn test_occupant_at_skips_excluded_color() {
        let mut store = PathStore::new();
        let red = Color::from("red");
        let blue = Color::from("blue");
        store.set(red.clone(), cells(&[(1, 1), (2, 1)]));
        store.set(blue.clone(), cells(&[(1, 2), (2, 2)]));

        assert_eq!(
            store.occupant_at(Cell::new(2, 1), None).map(|p| &p.color),
            Some(&red)
        );
        assert!(store.occupant_at(Cell::new(2, 1), Some(&red)).is_none());
        assert_eq!(
            store.occupant_at(Cell::new(2, 2), Some(&red)).map(|p| &p.color),
            Some(&blue)
        );
        assert!(store.occupant_at(Cell::new(3, 3), None).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = PathStore::new();
        store.set(Color::from("red"), cells(&[(1, 1), (2, 1)]));
        store.set(Color::from("blue"), cells(&[(1, 2), (2, 2)]));

        assert!(store.remove(&Color::from("red")).is_some());
        assert!(store.remove(&Color::from("red")).is_none());
        assert_eq!(store.size(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut store = PathStore::new();
        store.set(Color::from("red"), cells(&[(1, 1), (2, 1)]));
        store.set(Color::from("blue"), cells(&[(1, 2), (2, 2)]));
        let colors: Vec<_> = store.snapshot().into_iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![Color::from("blue"), Color::from("red")]);
    }

    #[test]
    fn test_validate_accepts_either_direction() {
        let (board, points) = board_and_points();
        let red = Color::from("red");
        let forward = Path::new(red.clone(), cells(&[(1, 1), (2, 1), (3, 1)]));
        let backward = Path::new(red, cells(&[(3, 1), (2, 1), (1, 1)]));
        assert_eq!(validate_path(&board, &points, &forward), Ok(()));
        assert_eq!(validate_path(&board, &points, &backward), Ok(()));
    }

    #[test]
    fn test_validate_rejections() {
        let (board, points) = board_and_points();
        let red = Color::from("red");

        let short = Path::new(red.clone(), cells(&[(1, 1)]));
        assert!(matches!(
            validate_path(&board, &points, &short),
            Err(PathError::TooShort { .. })
        ));

        let gap = Path::new(red.clone(), cells(&[(1, 1), (3, 1)]));
        assert!(matches!(
            validate_path(&board, &points, &gap),
            Err(PathError::NotContiguous { .. })
        ));

        let wrong_end = Path::new(red.clone(), cells(&[(1, 1), (2, 1)]));
        assert!(matches!(
            validate_path(&board, &points, &wrong_end),
            Err(PathError::WrongEndpoints { .. })
        ));

        let looping = Path::new(
            red.clone(),
            cells(&[(1, 1), (2, 1), (2, 2), (2, 1), (3, 1)]),
        );
        assert_eq!(
            validate_path(&board, &points, &looping),
            Err(PathError::SelfIntersects {
                color: red.clone(),
                cell: Cell::new(2, 1),
            })
        );

        let outside = Path::new(red, cells(&[(1, 1), (1, 0), (3, 1)]));
        assert!(matches!(
            validate_path(&board, &points, &outside),
            Err(PathError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_validate_color_membership() {
        let (board, points) = board_and_points();

        let unknown = Path::new(Color::from("teal"), cells(&[(1, 1), (2, 1)]));
        assert!(matches!(
            validate_path(&board, &points, &unknown),
            Err(PathError::UnknownColor { .. })
        ));

        let single = Path::new(Color::from("blue"), cells(&[(1, 3), (2, 3)]));
        assert_eq!(
            validate_path(&board, &points, &single),
            Err(PathError::NotPaired {
                color: Color::from("blue"),
                found: 1,
            })
        );

        let group = Path::new(Color::from("gold"), cells(&[(1, 2), (2, 2), (3, 2)]));
        assert!(matches!(
            validate_path(&board, &points, &group),
            Err(PathError::NotPaired { found: 3, .. })
        ));
    }
}
