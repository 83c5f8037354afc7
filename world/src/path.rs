//! Static path geometry shared by every subsystem.

use std::collections::BTreeMap;

use deck_defence_core::{CellCoord, Direction};
use thiserror::Error;

const STANDARD_COLUMNS: u32 = 8;
const STANDARD_ROWS: u32 = 3;
const STANDARD_PATH: [(u32, u32); 14] = [
    (0, 0),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, 2),
    (3, 2),
    (3, 1),
    (3, 0),
    (4, 0),
    (5, 0),
    (5, 1),
    (5, 2),
    (6, 2),
    (7, 2),
];

/// Reasons a path layout fails validation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The layout does not contain both an entry and an exit.
    #[error("path needs at least two cells, got {length}")]
    TooShort {
        /// Number of cells supplied.
        length: usize,
    },
    /// A path cell lies outside the grid.
    #[error("cell ({}, {}) lies outside the {columns}x{rows} grid", cell.column(), cell.row())]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Grid width.
        columns: u32,
        /// Grid height.
        rows: u32,
    },
    /// Two consecutive path cells are not orthogonal neighbours.
    #[error("cells ({}, {}) and ({}, {}) are not adjacent", from.column(), from.row(), to.column(), to.row())]
    Disconnected {
        /// Earlier cell.
        from: CellCoord,
        /// Later cell.
        to: CellCoord,
    },
    /// The same cell was listed twice.
    #[error("cell ({}, {}) appears more than once", cell.column(), cell.row())]
    Repeated {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Ordered traversable route through the grid. Every other cell is buildable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMap {
    columns: u32,
    rows: u32,
    cells: Vec<CellCoord>,
    headings: Vec<Option<Direction>>,
    index: BTreeMap<CellCoord, u32>,
}

impl PathMap {
    /// Validates the layout and builds the path. Index zero is the entry.
    pub fn new(columns: u32, rows: u32, cells: Vec<CellCoord>) -> Result<Self, PathError> {
        if cells.len() < 2 {
            return Err(PathError::TooShort {
                length: cells.len(),
            });
        }

        let mut index = BTreeMap::new();
        for (cell, position) in cells.iter().copied().zip(0_u32..) {
            if cell.column() >= columns || cell.row() >= rows {
                return Err(PathError::OutOfBounds {
                    cell,
                    columns,
                    rows,
                });
            }
            if index.insert(cell, position).is_some() {
                return Err(PathError::Repeated { cell });
            }
        }

        let mut headings = Vec::with_capacity(cells.len());
        for pair in cells.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let Some(direction) = direction_between(from, to) else {
                return Err(PathError::Disconnected { from, to });
            };
            headings.push(Some(direction));
        }
        headings.push(None);

        Ok(Self {
            columns,
            rows,
            cells,
            headings,
            index,
        })
    }

    /// Serpentine 8x3 layout used by default sessions.
    #[must_use]
    pub fn standard() -> Self {
        let cells: Vec<CellCoord> = STANDARD_PATH
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect();
        let index = cells
            .iter()
            .zip(0_u32..)
            .map(|(cell, position)| (*cell, position))
            .collect();
        let mut headings: Vec<Option<Direction>> = cells
            .windows(2)
            .map(|pair| direction_between(pair[0], pair[1]))
            .collect();
        headings.push(None);

        Self {
            columns: STANDARD_COLUMNS,
            rows: STANDARD_ROWS,
            cells,
            headings,
            index,
        }
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of cells along the path.
    #[must_use]
    pub fn len(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    /// Always false; a valid path holds at least two cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ordered path cells from entry to exit.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Cell at the provided path index.
    #[must_use]
    pub fn cell_at(&self, path_index: u32) -> Option<CellCoord> {
        usize::try_from(path_index)
            .ok()
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Path index of the provided cell, if it lies on the path.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<u32> {
        self.index.get(&cell).copied()
    }

    /// Step direction from `cell` to its successor; `None` at the exit and off the path.
    #[must_use]
    pub fn direction_at(&self, cell: CellCoord) -> Option<Direction> {
        let position = self.index_of(cell)?;
        let position = usize::try_from(position).ok()?;
        self.headings.get(position).copied().flatten()
    }

    /// Reports whether the cell belongs to the path.
    #[must_use]
    pub fn is_path(&self, cell: CellCoord) -> bool {
        self.index.contains_key(&cell)
    }

    /// Reports whether the cell lies inside the grid and off the path.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.is_path(cell)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Buildable cells in row-major order.
    pub fn buildable_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns)
                .map(move |column| CellCoord::new(column, row))
                .filter(move |cell| !self.is_path(*cell))
        })
    }
}

impl Default for PathMap {
    fn default() -> Self {
        Self::standard()
    }
}

fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let column_diff = from.column().abs_diff(to.column());
    let row_diff = from.row().abs_diff(to.row());

    if column_diff + row_diff != 1 {
        return None;
    }

    if column_diff == 1 {
        if to.column() > from.column() {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if to.row() > from.row() {
        Some(Direction::South)
    } else {
        Some(Direction::North)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_passes_validation() {
        let standard = PathMap::standard();
        let validated = PathMap::new(
            standard.columns(),
            standard.rows(),
            standard.cells().to_vec(),
        )
        .expect("standard layout is valid");
        assert_eq!(validated, standard);
        assert_eq!(standard.len(), 14);
    }

    #[test]
    fn path_and_buildable_partition_the_grid() {
        let path = PathMap::standard();
        let buildable = path.buildable_cells().count();
        assert_eq!(buildable + path.cells().len(), 24);
        for cell in path.buildable_cells() {
            assert!(path.is_buildable(cell));
            assert!(!path.is_path(cell));
        }
    }

    #[test]
    fn headings_follow_the_serpentine() {
        let path = PathMap::standard();
        assert_eq!(path.direction_at(CellCoord::new(0, 0)), Some(Direction::East));
        assert_eq!(path.direction_at(CellCoord::new(1, 0)), Some(Direction::South));
        assert_eq!(path.direction_at(CellCoord::new(3, 2)), Some(Direction::North));
        assert_eq!(path.direction_at(CellCoord::new(7, 2)), None);
        assert_eq!(path.direction_at(CellCoord::new(0, 1)), None);
    }

    #[test]
    fn out_of_grid_cells_are_not_buildable() {
        let path = PathMap::standard();
        assert!(!path.is_buildable(CellCoord::new(8, 0)));
        assert!(!path.is_buildable(CellCoord::new(0, 3)));
        assert!(path.is_buildable(CellCoord::new(0, 1)));
    }

    #[test]
    fn rejects_short_paths() {
        let error = PathMap::new(2, 2, vec![CellCoord::new(0, 0)]).expect_err("too short");
        assert_eq!(error, PathError::TooShort { length: 1 });
    }

    #[test]
    fn rejects_gaps_and_repeats() {
        let gap = PathMap::new(4, 1, vec![CellCoord::new(0, 0), CellCoord::new(2, 0)]);
        assert_eq!(
            gap,
            Err(PathError::Disconnected {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(2, 0),
            })
        );

        let repeat = PathMap::new(
            2,
            1,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 0),
            ],
        );
        assert_eq!(
            repeat,
            Err(PathError::Repeated {
                cell: CellCoord::new(0, 0),
            })
        );
    }

    #[test]
    fn rejects_cells_outside_grid() {
        let result = PathMap::new(2, 1, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        assert!(matches!(result, Err(PathError::OutOfBounds { .. })));
    }
}
