//! Board, point and path value types

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A grid cell, 1-indexed: `x` in `1..=cols`, `y` in `1..=rows`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Signed offset from `self` to `other`
    pub fn delta_to(&self, other: Cell) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(&self, other: Cell) -> bool {
        let (dx, dy) = self.delta_to(other);
        dx.abs() + dy.abs() == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A path color as the board defines it (usually a CSS hex string)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned to a point by the board owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

/// A colored endpoint placed on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

impl Point {
    pub fn new(id: u64, x: i32, y: i32, color: impl Into<Color>) -> Self {
        Self {
            id: PointId(id),
            x,
            y,
            color: color.into(),
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

/// All points on the current board, in the order the board lists them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// First point occupying `cell`, if any
    pub fn at(&self, cell: Cell) -> Option<&Point> {
        self.points.iter().find(|p| p.cell() == cell)
    }

    /// Points of one color, in board order
    pub fn of_color<'a>(&'a self, color: &'a Color) -> impl Iterator<Item = &'a Point> + 'a {
        self.points.iter().filter(move |p| &p.color == color)
    }

    pub fn count_of(&self, color: &Color) -> usize {
        self.of_color(color).count()
    }

    /// The two endpoints of a color that has exactly two points
    pub fn pair_of(&self, color: &Color) -> Option<(&Point, &Point)> {
        let mut iter = self.points.iter().filter(|p| &p.color == color);
        let first = iter.next()?;
        let second = iter.next()?;
        if iter.next().is_some() {
            return None;
        }
        Some((first, second))
    }

    /// Every distinct color present on the board
    pub fn colors(&self) -> BTreeSet<Color> {
        self.points.iter().map(|p| p.color.clone()).collect()
    }

    /// Colors with exactly two points, in order of first appearance; only
    /// these must be connected to win
    pub fn paired_colors(&self) -> Vec<Color> {
        let mut paired: Vec<Color> = Vec::new();
        for point in &self.points {
            if !paired.contains(&point.color) && self.count_of(&point.color) == 2 {
                paired.push(point.color.clone());
            }
        }
        paired
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Board dimensions, fixed for the lifetime of a drawing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub name: String,
}

impl BoardConfig {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 1 && cell.y >= 1 && cell.x as u32 <= self.cols && cell.y as u32 <= self.rows
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EngineError::InvalidBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

/// A committed, validated stroke for one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub color: Color,
    pub segments: Vec<Cell>,
}

impl Path {
    pub fn new(color: Color, segments: Vec<Cell>) -> Self {
        Self { color, segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    /// First and last cell
    pub fn endpoints(&self) -> Option<(Cell, Cell)> {
        Some((*self.segments.first()?, *self.segments.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> PointSet {
        PointSet::new(vec![
            Point::new(1, 1, 1, "red"),
            Point::new(2, 3, 3, "red"),
            Point::new(3, 1, 3, "blue"),
            Point::new(4, 2, 2, "green"),
            Point::new(5, 3, 1, "gold"),
            Point::new(6, 2, 1, "gold"),
            Point::new(7, 1, 2, "gold"),
        ])
    }

    #[test]
    fn test_paired_colors_excludes_singles_and_groups() {
        let points = sample_points();
        assert_eq!(points.paired_colors(), vec![Color::from("red")]);
        assert_eq!(points.colors().len(), 4);
    }

    #[test]
    fn test_paired_colors_keep_board_order() {
        let points = PointSet::new(vec![
            Point::new(1, 1, 1, "zinc"),
            Point::new(2, 2, 1, "amber"),
            Point::new(3, 1, 2, "zinc"),
            Point::new(4, 2, 2, "amber"),
        ]);
        assert_eq!(points.paired_colors(), vec![Color::from("zinc"), Color::from("amber")]);
    }

    #[test]
    fn test_pair_of_outlives_color_key() {
        let points = sample_points();
        let (a, b) = {
            let key = Color::from("red");
            points.pair_of(&key).unwrap()
        };
        assert_eq!((a.cell(), b.cell()), (Cell::new(1, 1), Cell::new(3, 3)));
    }

    #[test]
    fn test_pair_of() {
        let points = sample_points();
        let (a, b) = points.pair_of(&Color::from("red")).unwrap();
        assert_eq!(a.cell(), Cell::new(1, 1));
        assert_eq!(b.cell(), Cell::new(3, 3));
        assert!(points.pair_of(&Color::from("blue")).is_none());
        assert!(points.pair_of(&Color::from("gold")).is_none());
    }

    #[test]
    fn test_point_lookup() {
        let points = sample_points();
        assert_eq!(points.at(Cell::new(2, 2)).map(|p| p.id), Some(PointId(4)));
        assert!(points.at(Cell::new(2, 3)).is_none());
    }

    #[test]
    fn test_board_contains() {
        let board = BoardConfig::new(2, 3);
        assert!(board.contains(Cell::new(3, 2)));
        assert!(!board.contains(Cell::new(0, 1)));
        assert!(!board.contains(Cell::new(4, 1)));
        assert!(!board.contains(Cell::new(1, 3)));
        assert_eq!(board.cell_count(), 6);
    }

    #[test]
    fn test_board_validate() {
        assert!(BoardConfig::new(5, 5).validate().is_ok());
        assert_eq!(
            BoardConfig::new(0, 5).validate(),
            Err(EngineError::InvalidBoard { rows: 0, cols: 5 })
        );
    }

    #[test]
    fn test_cell_adjacency() {
        let c = Cell::new(2, 2);
        assert!(c.is_adjacent(Cell::new(2, 3)));
        assert!(c.is_adjacent(Cell::new(1, 2)));
        assert!(!c.is_adjacent(Cell::new(3, 3)));
        assert!(!c.is_adjacent(c));
        assert_eq!(c.delta_to(Cell::new(1, 3)), (-1, 1));
    }

    #[test]
    fn test_color_serializes_as_plain_string() {
        let json = serde_json::to_string(&Point::new(9, 2, 4, "#ff0000")).unwrap();
        assert_eq!(json, r##"{"id":9,"x":2,"y":4,"color":"#ff0000"}"##);
    }
}
