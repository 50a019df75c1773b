use core::fmt;
use std::str::FromStr;

use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::{
    Cell, Cost, Frontier, FrontierError, Grid, Point, ProgressObserver, INFINITE_COST, MOVE_COST,
};

pub mod astar;
pub mod dijkstra;

use astar::AstarSolver;
use dijkstra::DijkstraSolver;

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Failures that can only come from a bug in a solver, never from the grid itself. An unreachable
/// end cell is reported as [SearchOutcome::NoPath] instead.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("search loop polled its frontier after exhausting it: {0}")]
    EmptyFrontier(#[from] FrontierError),
    #[error("parent chain from the end cell {end:?} does not lead back to the start")]
    BrokenParentChain { end: Point },
}

/// Counters collected during a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of times a cell entered the closed set, reopened cells counted again.
    pub cells_closed: usize,
    pub cells_reopened: usize,
    pub frontier_pushes: usize,
    /// Popped entries discarded because their cell was already closed.
    pub stale_pops: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Cells from start to end, both included.
    pub path: Vec<Cell>,
    pub total_cost: Cost,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn points(&self) -> Vec<Point> {
        self.path.iter().map(|c| c.point).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SearchResult),
    /// The grid is valid but the end cell is walled off from the start.
    NoPath,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Found(result) => Some(result),
            SearchOutcome::NoPath => None,
        }
    }
    pub fn total_cost(&self) -> Option<Cost> {
        self.result().map(|r| r.total_cost)
    }
}

/// Search attributes of one cell for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellState {
    /// Priority of the cell: `g + h`.
    pub cost: Cost,
    /// Best known distance from the start.
    pub g: Cost,
    /// Heuristic estimate of the remaining distance, fixed for the run.
    pub h: Cost,
    pub parent: Option<usize>,
}

/// Everything a run mutates. Created fresh by [GridSolver::solve], so the [Grid] itself is never
/// written to and can be searched again right away.
pub struct SearchContext<'a> {
    pub grid: &'a Grid,
    pub state: Vec<CellState>,
    pub frontier: Frontier<Cost>,
    pub closed: FxIndexSet<usize>,
    pub stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    pub fn new<FH>(grid: &'a Grid, mut heuristic: FH) -> SearchContext<'a>
    where
        FH: FnMut(usize) -> Cost,
    {
        let start = grid.start_index();
        let state = (0..grid.len())
            .map(|ix| {
                let g = if ix == start { 0 } else { INFINITE_COST };
                let h = heuristic(ix);
                CellState {
                    cost: g.saturating_add(h),
                    g,
                    h,
                    parent: None,
                }
            })
            .collect();
        SearchContext {
            grid,
            state,
            frontier: Frontier::new(),
            closed: FxIndexSet::default(),
            stats: SearchStats::default(),
        }
    }

    /// Queues a cell with its current cost.
    pub fn push(&mut self, index: usize) {
        let CellState { cost, g, .. } = self.state[index];
        self.frontier.push(index, cost, g);
        self.stats.frontier_pushes += 1;
    }

    pub fn is_closed(&self, index: usize) -> bool {
        self.closed.contains(&index)
    }
}

/// A best-first search over a [Grid]. Implementors supply the heuristic, the relaxation rule and
/// the stopping rule; the search loop with lazy deletion of stale frontier entries, progress
/// reporting and path reconstruction is shared.
pub trait GridSolver {
    fn name(&self) -> &'static str;

    fn heuristic(&self, grid: &Grid, index: usize) -> Cost;

    /// Whether the run ends the moment the end cell is closed rather than when the frontier
    /// runs dry.
    fn stops_at_end(&self) -> bool;

    /// Updates the open neighbours of the freshly closed cell `current` and queues them.
    fn relax(&self, ctx: &mut SearchContext<'_>, current: usize);

    /// The cost reported for the path, read from the end cell's state.
    fn total_cost(&self, end: &CellState) -> Cost;

    fn solve<O>(&self, grid: &Grid, observer: &mut O) -> Result<SearchOutcome, SearchError>
    where
        O: ProgressObserver + ?Sized,
    {
        let start = grid.start_index();
        let end = grid.end_index();
        info!(
            "{}: searching from {:?} to {:?}",
            self.name(),
            grid.point(start),
            grid.point(end)
        );
        let mut ctx = SearchContext::new(grid, |ix| self.heuristic(grid, ix));
        ctx.push(start);
        let mut reached_end = false;
        while !ctx.frontier.is_empty() {
            let entry = ctx.frontier.pop_min()?;
            if ctx.is_closed(entry.index) {
                ctx.stats.stale_pops += 1;
                continue;
            }
            ctx.closed.insert(entry.index);
            ctx.stats.cells_closed += 1;
            trace!(
                "Closed {:?} at cost {}",
                grid.point(entry.index),
                entry.estimated_cost
            );
            observer.on_cell_finalized(grid.cell(entry.index));
            if self.stops_at_end() && entry.index == end {
                // The popped entry must carry the end cell's current distance and nothing left
                // in the frontier may promise a shorter one.
                debug_assert_eq!(entry.cost, ctx.state[end].g);
                debug_assert!(ctx
                    .frontier
                    .peek_min()
                    .map_or(true, |next| next.estimated_cost >= ctx.state[end].g));
                reached_end = true;
                break;
            }
            self.relax(&mut ctx, entry.index);
        }
        let stats = ctx.stats;
        debug!("{}: {:?}", self.name(), stats);

        let found = reached_end || start == end || ctx.state[end].parent.is_some();
        if found != grid.end_reachable() {
            warn!(
                "{}: search outcome disagrees with the connected components, are the components correct?",
                self.name()
            );
        }
        debug_assert_eq!(found, grid.end_reachable());
        if !found {
            info!("{}: no path", self.name());
            observer.on_no_path();
            return Ok(SearchOutcome::NoPath);
        }
        let path = reconstruct_path(grid, &ctx.state)?;
        let total_cost = self.total_cost(&ctx.state[end]);
        debug_assert_eq!(path_cost(&path), Some(total_cost));
        info!(
            "{}: path of cost {} after closing {} cells",
            self.name(),
            total_cost,
            stats.cells_closed
        );
        observer.on_path_found(&path, total_cost);
        Ok(SearchOutcome::Found(SearchResult {
            path,
            total_cost,
            stats,
        }))
    }
}

/// Follows the parent links from the end cell back to the start and returns the cells in
/// start-to-end order.
pub fn reconstruct_path(grid: &Grid, state: &[CellState]) -> Result<Vec<Cell>, SearchError> {
    let end = grid.end_index();
    // A chain longer than the grid has a cycle
    let mut path: Vec<Cell> = std::iter::successors(Some(end), |&ix| state[ix].parent)
        .take(grid.len())
        .map(|ix| grid.cell(ix))
        .collect();
    if path.last().map(|c| c.index) != Some(grid.start_index()) {
        return Err(SearchError::BrokenParentChain {
            end: grid.point(end),
        });
    }
    path.reverse();
    Ok(path)
}

/// Number of moves along `path`, or [None] if two consecutive cells are not adjacent.
pub fn path_cost(path: &[Cell]) -> Option<Cost> {
    path.iter().tuple_windows().try_fold(0, |total, (a, b)| {
        let dist = (a.point.x - b.point.x).abs() + (a.point.y - b.point.y).abs();
        (dist == 1).then_some(total + MOVE_COST)
    })
}

/// Selects which solver [search] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Dijkstra's algorithm: expands every reachable cell in order of distance.
    UniformCost,
    /// A* with the Manhattan distance to the end cell as heuristic.
    HeuristicGuided,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::UniformCost, Algorithm::HeuristicGuided];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::UniformCost => DijkstraSolver.name(),
            Algorithm::HeuristicGuided => AstarSolver.name(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown algorithm {0:?}, expected one of dijkstra, astar")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" | "uniform" | "ucs" => Ok(Algorithm::UniformCost),
            "astar" | "a*" | "heuristic" => Ok(Algorithm::HeuristicGuided),
            _ => Err(ParseAlgorithmError(s.to_owned())),
        }
    }
}

/// Runs `algorithm` on `grid`, reporting every closed cell and the final outcome to `observer`.
pub fn search<O>(
    grid: &Grid,
    algorithm: Algorithm,
    observer: &mut O,
) -> Result<SearchOutcome, SearchError>
where
    O: ProgressObserver + ?Sized,
{
    match algorithm {
        Algorithm::UniformCost => DijkstraSolver.solve(grid, observer),
        Algorithm::HeuristicGuided => AstarSolver.solve(grid, observer),
    }
}
