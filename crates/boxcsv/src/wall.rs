//! Walls with a shape-shaped hole.
//!
//! A wall is a 9×9 sheet of unit boxes in the z = 0 plane, centred on the
//! origin. Every cell that the source shape occupies in (x, y) is left open,
//! so shape and wall together tile the sheet exactly.
//!
//! Footprints are expected to be unit boxes on integer coordinates inside the
//! grid. Coordinates are truncated toward zero; cells outside the grid are
//! skipped with a warning. [`footprint_issues`] reports shapes that break the
//! expectation without changing how the wall is built.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{read_file, write_file, BoxInstance, ShapeError};

/// Cells per side.
pub const GRID_SIZE: usize = 9;
/// Offset from world coordinate to grid index (`index = coord + GRID_OFFSET`).
pub const GRID_OFFSET: i32 = 4;
/// Appended to a shape's file stem to name its wall.
pub const WALL_SUFFIX: &str = " - WALL.csv";

const SHAPE_EXTENSION: &str = ".csv";

/// Occupancy of the wall sheet, `cells[y + 4][x + 4]`; `true` means filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallLayout {
    cells: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl Default for WallLayout {
    fn default() -> Self {
        Self::full()
    }
}

#[inline]
fn cell_index(x: i32, y: i32) -> Option<(usize, usize)> {
    let col = usize::try_from(x + GRID_OFFSET).ok()?;
    let row = usize::try_from(y + GRID_OFFSET).ok()?;
    (col < GRID_SIZE && row < GRID_SIZE).then_some((row, col))
}

/// Integer (x, y) cell a box sits on.
#[inline]
pub fn footprint_cell(b: &BoxInstance) -> (i32, i32) {
    (b.position[0] as i32, b.position[1] as i32)
}

impl WallLayout {
    /// A wall without any opening.
    pub const fn full() -> Self {
        Self {
            cells: [[true; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Open one cell for every (x, y) the shape occupies.
    pub fn from_footprint(boxes: &[BoxInstance]) -> Self {
        let mut layout = Self::full();
        for b in boxes {
            let (x, y) = footprint_cell(b);
            if !layout.open(x, y) {
                warn!(
                    "box at ({}, {}) lies outside the {}x{} wall grid; ignored",
                    x, y, GRID_SIZE, GRID_SIZE
                );
            }
        }
        layout
    }

    /// Clear a cell. Returns `false` when (x, y) is off the grid.
    pub fn open(&mut self, x: i32, y: i32) -> bool {
        match cell_index(x, y) {
            Some((row, col)) => {
                self.cells[row][col] = false;
                true
            }
            None => false,
        }
    }

    /// Cells off the grid are never filled.
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        cell_index(x, y).is_some_and(|(row, col)| self.cells[row][col])
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }

    /// Open cells in row-major order, as world (x, y).
    pub fn open_cells(&self) -> Vec<(i32, i32)> {
        self.iter_cells()
            .filter(|&(_, _, filled)| !filled)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// One unit box per filled cell at z = 0, row-major from y = -4.
    pub fn to_boxes(&self) -> Vec<BoxInstance> {
        self.iter_cells()
            .filter(|&(_, _, filled)| filled)
            .map(|(x, y, _)| BoxInstance::unit_at(x as f32, y as f32, 0.0))
            .collect()
    }

    fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, bool)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter().enumerate().map(move |(col, &filled)| {
                (col as i32 - GRID_OFFSET, row as i32 - GRID_OFFSET, filled)
            })
        })
    }
}

/// `<dir>/<stem> - WALL.csv` for `<dir>/<stem>.csv`.
pub fn wall_path_for(shape: &Path) -> PathBuf {
    let name = shape
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(SHAPE_EXTENSION).unwrap_or(&name);
    shape.with_file_name(format!("{stem}{WALL_SUFFIX}"))
}

pub fn is_wall_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(WALL_SUFFIX))
}

/// Write the wall matching `shape` next to it and return the wall's path.
pub fn build_wall(shape: &Path) -> Result<PathBuf, ShapeError> {
    let boxes = read_file(shape)?;
    let layout = WallLayout::from_footprint(&boxes);
    let wall = wall_path_for(shape);

    write_file(&wall, &layout.to_boxes())?;

    debug!("open cells for {}: {:?}", shape.display(), layout.open_cells());
    info!(
        "Built wall {} ({} filled / {} open)",
        wall.display(),
        layout.filled_count(),
        GRID_SIZE * GRID_SIZE - layout.filled_count()
    );

    Ok(wall)
}

/// A footprint box that does not fit the unit-grid expectation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FootprintIssue {
    #[error("box {index}: scale {scale:?} is not 1x1x1")]
    NotUnitScale { index: usize, scale: [f32; 3] },
    #[error("box {index}: position ({x}, {y}) is not on integer coordinates")]
    OffGrid { index: usize, x: f32, y: f32 },
    #[error("box {index}: cell ({x}, {y}) is outside the wall grid")]
    OutsideGrid { index: usize, x: i32, y: i32 },
}

/// Advisory check of a shape against the wall grid.
pub fn footprint_issues(boxes: &[BoxInstance]) -> Vec<FootprintIssue> {
    let mut issues = Vec::new();

    for (index, b) in boxes.iter().enumerate() {
        if b.scale != [1.0; 3] {
            issues.push(FootprintIssue::NotUnitScale {
                index,
                scale: b.scale,
            });
        }

        let [px, py, _] = b.position;
        if px.fract() != 0.0 || py.fract() != 0.0 {
            issues.push(FootprintIssue::OffGrid { index, x: px, y: py });
        }

        let (x, y) = footprint_cell(b);
        if cell_index(x, y).is_none() {
            issues.push(FootprintIssue::OutsideGrid { index, x, y });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn shape(cells: &[(i32, i32)]) -> Vec<BoxInstance> {
        cells
            .iter()
            .map(|&(x, y)| BoxInstance::unit_at(x as f32, y as f32, 0.0))
            .collect()
    }

    #[test]
    fn test_full_wall() {
        let wall = WallLayout::full();
        assert_eq!(wall.filled_count(), 81);
        assert!(wall.open_cells().is_empty());
        assert_eq!(wall.to_boxes().len(), 81);
    }

    #[test]
    fn test_open_cells_match_footprint() {
        let cells = [(0, 0), (1, 0), (-1, 0), (0, 1), (4, -4), (-4, 4)];
        let wall = WallLayout::from_footprint(&shape(&cells));

        let open: BTreeSet<_> = wall.open_cells().into_iter().collect();
        let expected: BTreeSet<_> = cells.iter().copied().collect();
        assert_eq!(open, expected);
        assert_eq!(wall.filled_count(), 81 - cells.len());
    }

    #[test]
    fn test_duplicate_footprint_collapses() {
        // Two boxes stacked along z share one cell.
        let boxes = vec![
            BoxInstance::unit_at(2.0, 1.0, 0.0),
            BoxInstance::unit_at(2.0, 1.0, 1.0),
            BoxInstance::unit_at(2.0, 1.0, -3.0),
        ];
        let wall = WallLayout::from_footprint(&boxes);
        assert_eq!(wall.open_cells(), vec![(2, 1)]);
        assert_eq!(wall.filled_count(), 80);
    }

    #[test]
    fn test_coordinates_truncate_toward_zero() {
        let boxes = vec![
            BoxInstance::unit_at(1.9, -0.7, 0.0),
            BoxInstance::unit_at(-2.5, 3.2, 0.0),
        ];
        let wall = WallLayout::from_footprint(&boxes);
        assert!(!wall.is_filled(1, 0));
        assert!(!wall.is_filled(-2, 3));
        assert_eq!(wall.filled_count(), 79);
    }

    #[test]
    fn test_outside_cells_are_skipped() {
        let wall = WallLayout::from_footprint(&shape(&[(5, 0), (0, -5), (0, 0)]));
        assert_eq!(wall.open_cells(), vec![(0, 0)]);
        assert!(!wall.is_filled(5, 0));
    }

    #[test]
    fn test_wall_boxes_are_row_major() {
        let wall = WallLayout::from_footprint(&shape(&[(-4, -4)]));
        let boxes = wall.to_boxes();

        assert_eq!(boxes.len(), 80);
        assert_eq!(boxes[0], BoxInstance::unit_at(-3.0, -4.0, 0.0));
        assert_eq!(boxes[7], BoxInstance::unit_at(4.0, -4.0, 0.0));
        assert_eq!(boxes[8], BoxInstance::unit_at(-4.0, -3.0, 0.0));
        assert_eq!(boxes[79], BoxInstance::unit_at(4.0, 4.0, 0.0));
    }

    #[test]
    fn test_wall_path() {
        assert_eq!(
            wall_path_for(Path::new("assets/shapes/Tee.csv")),
            PathBuf::from("assets/shapes/Tee - WALL.csv")
        );
        assert_eq!(wall_path_for(Path::new("bar")), PathBuf::from("bar - WALL.csv"));
        assert!(is_wall_file(Path::new("x/Tee - WALL.csv")));
        assert!(!is_wall_file(Path::new("x/Tee.csv")));
    }

    #[test]
    fn test_build_wall_writes_complement() {
        let dir = tempfile::tempdir().unwrap();
        let shape_path = dir.path().join("Ell.csv");
        std::fs::write(
            &shape_path,
            "0,0,0,1,1,1,\n0,1,0,1,1,1,\n0,2,0,1,1,1,\n1,0,0,1,1,1,\n",
        )
        .unwrap();

        let wall = build_wall(&shape_path).unwrap();
        assert_eq!(wall, dir.path().join("Ell - WALL.csv"));

        let boxes = read_file(&wall).unwrap();
        assert_eq!(boxes.len(), 77);
        assert!(boxes.iter().all(|b| b.scale == [1.0; 3] && b.position[2] == 0.0));

        let rebuilt = WallLayout::from_footprint(&boxes);
        let open: BTreeSet<_> = rebuilt.open_cells().into_iter().collect();
        let filled_in_original: BTreeSet<_> = [(0, 0), (0, 1), (0, 2), (1, 0)]
            .into_iter()
            .filter(|c| open.contains(c))
            .collect();
        // Opening the wall's own cells leaves exactly the shape's cells filled.
        assert_eq!(rebuilt.filled_count(), 4);
        assert!(filled_in_original.is_empty());
    }

    #[test]
    fn test_build_wall_missing_shape() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_wall(&dir.path().join("ghost.csv")).is_err());
    }

    #[test]
    fn test_footprint_issues() {
        let boxes = vec![
            BoxInstance::unit_at(0.0, 0.0, 0.0),
            BoxInstance::new([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
            BoxInstance::unit_at(0.5, 0.0, 0.0),
            BoxInstance::unit_at(7.0, 0.0, 0.0),
        ];
        let issues = footprint_issues(&boxes);
        assert_eq!(
            issues,
            vec![
                FootprintIssue::NotUnitScale {
                    index: 1,
                    scale: [2.0, 1.0, 1.0]
                },
                FootprintIssue::OffGrid {
                    index: 2,
                    x: 0.5,
                    y: 0.0
                },
                FootprintIssue::OutsideGrid { index: 3, x: 7, y: 0 },
            ]
        );
    }
}
