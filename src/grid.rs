use core::fmt;
use fxhash::FxHashSet;
use grid_util::Point;
use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use thiserror::Error;

use crate::N_SMALLVEC_SIZE;

/// Classification of a single grid cell, decoded from the integer cell codes of the source table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free,
    Start,
    End,
    Obstacle,
}

impl CellKind {
    pub fn from_code(code: i32) -> Option<CellKind> {
        match code {
            0 => Some(CellKind::Free),
            1 => Some(CellKind::Start),
            2 => Some(CellKind::End),
            3 => Some(CellKind::Obstacle),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            CellKind::Free => 0,
            CellKind::Start => 1,
            CellKind::End => 2,
            CellKind::Obstacle => 3,
        }
    }

    fn symbol(self) -> char {
        match self {
            CellKind::Free => '.',
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Obstacle => '#',
        }
    }
}

/// A single addressable location. Cells are plain values: two cells are the same cell when their
/// indices are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub index: usize,
    pub point: Point,
    pub kind: CellKind,
}

/// Reasons a table of cell codes does not describe a valid grid. Positions are `(row, col)`
/// indices into the source table.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid cell code {code} at row {row}, column {col}")]
    InvalidCode { row: usize, col: usize, code: i32 },
    #[error("grid has no start cell")]
    MissingStart,
    #[error("grid has a second start cell at {second:?} (first at {first:?})")]
    DuplicateStart {
        first: (usize, usize),
        second: (usize, usize),
    },
    #[error("grid has no end cell")]
    MissingEnd,
    #[error("grid has a second end cell at {second:?} (first at {first:?})")]
    DuplicateEnd {
        first: (usize, usize),
        second: (usize, usize),
    },
}

/// The playing field. Built once from a table of cell codes and immutable afterwards; all
/// per-search attributes live in the solvers' own state so a [Grid] can be searched any number of
/// times.
///
/// Table position `(i, j)` maps to the point `(rows - i - 1, j)`, so the first row of the table
/// ends up with the largest `x`. Cells are stored densely with index `x * cols + y`.
/// Connected components of the non-obstacle cells are computed with a [UnionFind] during
/// construction, which answers reachability queries without running a search.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    kinds: Vec<CellKind>,
    start: usize,
    end: usize,
    obstacles: Vec<usize>,
    components: UnionFind<usize>,
}

impl Grid {
    /// Builds a grid from a row-major table of cell codes (`0` free, `1` start, `2` end,
    /// `3` obstacle).
    pub fn from_codes<R: AsRef<[i32]>>(codes: &[R]) -> Result<Grid, GridError> {
        let rows = codes.len();
        let cols = codes.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        let mut kinds = vec![CellKind::Free; rows * cols];
        let mut start: Option<(usize, usize)> = None;
        let mut end: Option<(usize, usize)> = None;
        let mut obstacles = Vec::new();
        for (i, row) in codes.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (j, &code) in row.iter().enumerate() {
                let kind = CellKind::from_code(code).ok_or(GridError::InvalidCode {
                    row: i,
                    col: j,
                    code,
                })?;
                match kind {
                    CellKind::Start => {
                        if let Some(first) = start {
                            return Err(GridError::DuplicateStart {
                                first,
                                second: (i, j),
                            });
                        }
                        start = Some((i, j));
                    }
                    CellKind::End => {
                        if let Some(first) = end {
                            return Err(GridError::DuplicateEnd {
                                first,
                                second: (i, j),
                            });
                        }
                        end = Some((i, j));
                    }
                    _ => {}
                }
                let ix = (rows - i - 1) * cols + j;
                if kind == CellKind::Obstacle {
                    obstacles.push(ix);
                }
                kinds[ix] = kind;
            }
        }
        let (si, sj) = start.ok_or(GridError::MissingStart)?;
        let (ei, ej) = end.ok_or(GridError::MissingEnd)?;
        obstacles.sort_unstable();
        let mut grid = Grid {
            rows,
            cols,
            kinds,
            start: (rows - si - 1) * cols + sj,
            end: (rows - ei - 1) * cols + ej,
            obstacles,
            components: UnionFind::new(0),
        };
        grid.generate_components();
        info!(
            "Built {}x{} grid with {} obstacles",
            rows,
            cols,
            grid.obstacles.len()
        );
        Ok(grid)
    }

    /// Links every non-obstacle cell to its non-obstacle neighbours above and to the right.
    fn generate_components(&mut self) {
        self.components = UnionFind::new(self.len());
        for ix in 0..self.len() {
            if self.is_obstacle(ix) {
                continue;
            }
            let (x, y) = self.coords(ix);
            if y + 1 < self.cols && !self.is_obstacle(ix + 1) {
                self.components.union(ix, ix + 1);
            }
            if x + 1 < self.rows && !self.is_obstacle(ix + self.cols) {
                self.components.union(ix, ix + self.cols);
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }
    /// Always `false`: [Grid::from_codes] rejects tables without cells.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
    pub fn start(&self) -> Cell {
        self.cell(self.start)
    }
    pub fn end(&self) -> Cell {
        self.cell(self.end)
    }
    pub fn start_index(&self) -> usize {
        self.start
    }
    pub fn end_index(&self) -> usize {
        self.end
    }
    /// Indices of all obstacle cells in ascending order.
    pub fn obstacles(&self) -> &[usize] {
        &self.obstacles
    }

    fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn point(&self, index: usize) -> Point {
        let (x, y) = self.coords(index);
        Point::new(x as i32, y as i32)
    }

    pub fn kind(&self, index: usize) -> CellKind {
        self.kinds[index]
    }

    pub fn is_obstacle(&self, index: usize) -> bool {
        self.kinds[index] == CellKind::Obstacle
    }

    /// # Panics
    /// If `index` is not below [len](Self::len).
    pub fn cell(&self, index: usize) -> Cell {
        Cell {
            index,
            point: self.point(index),
            kind: self.kinds[index],
        }
    }

    /// Dense index of the point `(x, y)`, if it lies on the grid.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.rows && (y as usize) < self.cols {
            Some(x as usize * self.cols + y as usize)
        } else {
            None
        }
    }

    pub fn lookup(&self, x: i32, y: i32) -> Option<Cell> {
        self.index_of(x, y).map(|ix| self.cell(ix))
    }

    pub fn lookup_point(&self, point: Point) -> Option<Cell> {
        self.lookup(point.x, point.y)
    }

    /// The in-bounds axis-aligned neighbours of a cell, obstacles included, in the order
    /// `(x, y + 1)`, `(x, y - 1)`, `(x - 1, y)`, `(x + 1, y)`.
    pub fn neighbours(&self, index: usize) -> SmallVec<[usize; N_SMALLVEC_SIZE]> {
        let p = self.point(index);
        [(0, 1), (0, -1), (-1, 0), (1, 0)]
            .into_iter()
            .filter_map(|(dx, dy)| self.index_of(p.x + dx, p.y + dy))
            .collect()
    }

    /// Neighbours a search may move to.
    pub fn open_neighbours(&self, index: usize) -> SmallVec<[usize; N_SMALLVEC_SIZE]> {
        let mut neighbours = self.neighbours(index);
        neighbours.retain(|ix| !self.is_obstacle(*ix));
        neighbours
    }

    /// Kind of the cell at table position `(row, col)`.
    pub fn kind_at(&self, row: usize, col: usize) -> Option<CellKind> {
        if row < self.rows && col < self.cols {
            Some(self.kinds[(self.rows - row - 1) * self.cols + col])
        } else {
            None
        }
    }

    /// Cell code at table position `(row, col)`.
    pub fn code_at(&self, row: usize, col: usize) -> Option<i32> {
        self.kind_at(row, col).map(CellKind::code)
    }

    /// Reproduces the table of cell codes the grid was built from.
    pub fn to_codes(&self) -> Vec<Vec<i32>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.kinds[(self.rows - row - 1) * self.cols + col].code())
                    .collect()
            })
            .collect()
    }

    /// Retrieves the component id a given cell belongs to.
    pub fn component(&self, index: usize) -> usize {
        self.components.find(index)
    }

    /// Checks whether `b` can be reached from `a` by moving through non-obstacle cells.
    pub fn reachable(&self, a: usize, b: usize) -> bool {
        !self.is_obstacle(a) && !self.is_obstacle(b) && self.components.equiv(a, b)
    }

    pub fn end_reachable(&self) -> bool {
        self.reachable(self.start, self.end)
    }

    /// ASCII picture of the grid with the given cells marked `*`. Start and end keep their
    /// own symbols.
    pub fn render_path(&self, path: &[Cell]) -> String {
        let on_path: FxHashSet<usize> = path.iter().map(|c| c.index).collect();
        self.render(|ix| match self.kinds[ix] {
            CellKind::Free if on_path.contains(&ix) => '*',
            kind => kind.symbol(),
        })
    }

    fn render<F: Fn(usize) -> char>(&self, symbol: F) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for x in (0..self.rows).rev() {
            out.extend((0..self.cols).map(|y| symbol(x * self.cols + y)));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(|ix| self.kinds[ix].symbol()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        // S . #
        // . . E
        Grid::from_codes(&[vec![1, 0, 3], vec![0, 0, 2]]).unwrap()
    }

    #[test]
    fn vertical_flip() {
        let grid = corridor();
        assert_eq!(grid.start().point, Point::new(1, 0));
        assert_eq!(grid.end().point, Point::new(0, 2));
        assert_eq!(grid.lookup(1, 2).unwrap().kind, CellKind::Obstacle);
        assert_eq!(grid.obstacles(), &[5]);
        assert_eq!(grid.kind_at(0, 0), Some(CellKind::Start));
        assert_eq!(grid.code_at(0, 2), Some(3));
        assert_eq!(grid.code_at(1, 2), Some(2));
        assert_eq!(grid.code_at(2, 0), None);
        assert_eq!(grid.lookup_point(Point::new(1, 0)), Some(grid.start()));
        assert_eq!(grid.lookup_point(Point::new(0, 2)), Some(grid.end()));
        assert_eq!(grid.lookup_point(Point::new(1, 3)), None);
        assert_eq!(grid.len(), 6);
        assert!(!grid.is_empty());
        assert_eq!(grid.to_codes(), vec![vec![1, 0, 3], vec![0, 0, 2]]);
    }

    #[test]
    fn lookup_out_of_bounds() {
        let grid = corridor();
        assert!(grid.lookup(-1, 0).is_none());
        assert!(grid.lookup(2, 0).is_none());
        assert!(grid.lookup(0, 3).is_none());
        assert_eq!(grid.lookup(0, 1).unwrap().index, 1);
    }

    #[test]
    fn neighbour_order() {
        let grid = Grid::from_codes(&[vec![0, 0, 0], vec![1, 0, 3], vec![0, 0, 2]]).unwrap();
        let centre = grid.index_of(1, 1).unwrap();
        let points: Vec<Point> = grid
            .neighbours(centre)
            .into_iter()
            .map(|ix| grid.point(ix))
            .collect();
        assert_eq!(
            points,
            vec![
                Point::new(1, 2),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(2, 1)
            ]
        );
        assert_eq!(grid.open_neighbours(centre).len(), 3);
        let corner = grid.index_of(0, 0).unwrap();
        assert_eq!(grid.neighbours(corner).len(), 2);
    }

    #[test]
    fn rejects_malformed_tables() {
        let empty: [Vec<i32>; 0] = [];
        assert_eq!(Grid::from_codes(&empty).unwrap_err(), GridError::Empty);
        assert_eq!(
            Grid::from_codes(&[Vec::<i32>::new()]).unwrap_err(),
            GridError::Empty
        );
        assert_eq!(
            Grid::from_codes(&[vec![1, 0], vec![1, 2]]).unwrap_err(),
            GridError::DuplicateStart {
                first: (0, 0),
                second: (1, 0)
            }
        );
        assert_eq!(
            Grid::from_codes(&[vec![2, 0, 2, 1]]).unwrap_err(),
            GridError::DuplicateEnd {
                first: (0, 0),
                second: (0, 2)
            }
        );
        assert_eq!(
            Grid::from_codes(&[vec![1, 0], vec![0, 3]]).unwrap_err(),
            GridError::MissingEnd
        );
        assert_eq!(
            Grid::from_codes(&[vec![2, 0]]).unwrap_err(),
            GridError::MissingStart
        );
        assert_eq!(
            Grid::from_codes(&[vec![1, 4, 2]]).unwrap_err(),
            GridError::InvalidCode {
                row: 0,
                col: 1,
                code: 4
            }
        );
        assert_eq!(
            Grid::from_codes(&[vec![1, 0], vec![2]]).unwrap_err(),
            GridError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_component_generation() {
        // S # .
        // # # E
        let walled = Grid::from_codes(&[vec![1, 3, 0], vec![3, 3, 2]]).unwrap();
        assert!(!walled.end_reachable());
        let top_right = walled.index_of(1, 2).unwrap();
        assert!(walled.reachable(top_right, walled.end_index()));
        assert!(!walled.reachable(walled.start_index(), walled.obstacles()[0]));
        assert_eq!(
            walled.component(top_right),
            walled.component(walled.end_index())
        );
        assert_ne!(
            walled.component(walled.start_index()),
            walled.component(walled.end_index())
        );
        assert!(corridor().end_reachable());
    }

    #[test]
    fn renders_top_row_first() {
        let grid = corridor();
        assert_eq!(grid.to_string(), "S.#\n..E\n");
        let path = [0, 1, 2, 3]
            .iter()
            .map(|&ix| grid.cell(ix))
            .collect::<Vec<_>>();
        assert_eq!(grid.render_path(&path), "S.#\n**E\n");
    }
}
