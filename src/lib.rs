//! # raster_pathfinding
//!
//! Shortest paths on a 4-connected raster grid with a single start, a single goal and blocking
//! obstacle cells. Two interchangeable solvers are provided:
//! [uniform-cost search](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm) and
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) guided by the Manhattan distance.
//! Every move costs 1.
//!
//! A search reports its progress through a [ProgressObserver]: one call per cell as it is
//! closed, followed by exactly one terminal call with either the path or the absence of one.
//! The closing order is deterministic for a given [Grid] and [Algorithm], which makes it usable
//! as an animation sequence.
//!
//! ```
//! use raster_pathfinding::{search, Algorithm, Grid, SearchOutcome};
//!
//! // Row 0 is the top of the grid.
//! let grid = Grid::from_codes(&[
//!     vec![0, 0, 2],
//!     vec![0, 3, 0],
//!     vec![1, 0, 0],
//! ])
//! .unwrap();
//! match search(&grid, Algorithm::HeuristicGuided, &mut ()).unwrap() {
//!     SearchOutcome::Found(result) => assert_eq!(result.total_cost, 4),
//!     SearchOutcome::NoPath => unreachable!(),
//! }
//! ```
pub mod frontier;
pub mod grid;
pub mod observer;
pub mod solver;

pub use crate::frontier::{Frontier, FrontierEntry, FrontierError};
pub use crate::grid::{Cell, CellKind, Grid, GridError};
pub use crate::observer::{ProgressEvent, ProgressObserver, RecordingObserver};
pub use crate::solver::{
    astar::AstarSolver, dijkstra::DijkstraSolver, search, Algorithm, GridSolver, SearchError,
    SearchOutcome, SearchResult, SearchStats,
};
pub use grid_util::Point;

/// Integer path cost; every axis-aligned move costs [MOVE_COST].
pub type Cost = u32;

/// Cost of a single move between adjacent cells.
pub const MOVE_COST: Cost = 1;

/// Stand-in for an infinite cost. Never produced by a relaxation since grid sizes stay far below it.
pub const INFINITE_COST: Cost = Cost::MAX;

pub(crate) const N_SMALLVEC_SIZE: usize = 4;
