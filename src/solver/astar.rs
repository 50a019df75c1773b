use log::trace;

use crate::{
    solver::{CellState, GridSolver, SearchContext},
    Cost, Grid, MOVE_COST,
};

/// A* search guided by the Manhattan distance to the end cell, which never overestimates on a
/// 4-connected grid with unit moves. Stops as soon as the end cell is closed.
///
/// Closed cells are still relaxed. A closed cell whose `g + h` drops below its recorded cost is
/// taken out of the closed set again so it can be expanded once more.
#[derive(Clone, Copy, Debug, Default)]
pub struct AstarSolver;

impl GridSolver for AstarSolver {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn heuristic(&self, grid: &Grid, index: usize) -> Cost {
        let p = grid.point(index);
        let end = grid.end().point;
        ((p.x - end.x).abs() + (p.y - end.y).abs()) as Cost
    }

    fn stops_at_end(&self) -> bool {
        true
    }

    fn relax(&self, ctx: &mut SearchContext<'_>, current: usize) {
        let new_g = ctx.state[current].g + MOVE_COST;
        for neighbour in ctx.grid.open_neighbours(current) {
            let state = &mut ctx.state[neighbour];
            if new_g < state.g {
                state.g = new_g;
                state.parent = Some(current);
            }
            let estimate = state.g.saturating_add(state.h);
            let improved = estimate < state.cost;
            state.cost = estimate;
            if improved && ctx.closed.swap_remove(&neighbour) {
                trace!("Reopened {:?}", ctx.grid.point(neighbour));
                ctx.stats.cells_reopened += 1;
            }
            if !ctx.is_closed(neighbour) {
                ctx.push(neighbour);
            }
        }
    }

    fn total_cost(&self, end: &CellState) -> Cost {
        end.g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{solver::dijkstra::DijkstraSolver, RecordingObserver};

    /// Asserts that the case in which start and goal are adjacent is handled correctly.
    #[test]
    fn adjacent_start_goal() {
        let grid = Grid::from_codes(&[vec![2], vec![1]]).unwrap();
        let outcome = AstarSolver.solve(&grid, &mut ()).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.total_cost, 1);
        assert_eq!(result.path.len(), 2);
        assert_eq!(result.stats.cells_closed, 2);
    }

    #[test]
    fn heuristic_is_manhattan_distance() {
        let grid = Grid::from_codes(&[vec![0, 0, 2], vec![0, 3, 0], vec![1, 0, 0]]).unwrap();
        assert_eq!(AstarSolver.heuristic(&grid, grid.start_index()), 4);
        assert_eq!(AstarSolver.heuristic(&grid, grid.end_index()), 0);
        let below_end = grid.index_of(1, 2).unwrap();
        assert_eq!(AstarSolver.heuristic(&grid, below_end), 1);
    }

    /// On an open field A* walks straight towards the goal.
    #[test]
    fn open_field_closes_only_the_path() {
        let mut codes = vec![vec![0; 8]; 8];
        codes[7][0] = 1;
        codes[0][7] = 2;
        let grid = Grid::from_codes(&codes).unwrap();
        let mut observer = RecordingObserver::new();
        let outcome = AstarSolver.solve(&grid, &mut observer).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.total_cost, 14);
        assert_eq!(observer.closed(), result.path);
    }

    #[test]
    fn test_complex() {
        // . . . . . E
        // . # # # # .
        // . # . . # .
        // . # . . . .
        // S . . # . .
        let grid = Grid::from_codes(&[
            vec![0, 0, 0, 0, 0, 2],
            vec![0, 3, 3, 3, 3, 0],
            vec![0, 3, 0, 0, 3, 0],
            vec![0, 3, 0, 0, 0, 0],
            vec![1, 0, 0, 3, 0, 0],
        ])
        .unwrap();
        let astar = AstarSolver.solve(&grid, &mut ()).unwrap();
        let dijkstra = DijkstraSolver.solve(&grid, &mut ()).unwrap();
        assert_eq!(astar.total_cost(), Some(9));
        assert_eq!(dijkstra.total_cost(), Some(9));
        assert!(
            astar.result().unwrap().stats.cells_closed
                <= dijkstra.result().unwrap().stats.cells_closed
        );
    }

    #[test]
    fn consistent_heuristic_never_reopens() {
        let grid = Grid::from_codes(&[
            vec![0, 0, 0, 0, 0],
            vec![0, 3, 3, 3, 0],
            vec![0, 0, 2, 3, 0],
            vec![3, 3, 3, 3, 0],
            vec![1, 0, 0, 0, 0],
        ])
        .unwrap();
        let outcome = AstarSolver.solve(&grid, &mut ()).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.total_cost, 16);
        assert_eq!(result.stats.cells_reopened, 0);
    }

    /// A closed cell reached again with a smaller `g` leaves the closed set, takes the new
    /// parent and is queued again.
    #[test]
    fn shorter_route_reopens_closed_cell() {
        // S . E
        let grid = Grid::from_codes(&[vec![1, 0, 2]]).unwrap();
        let mut ctx = SearchContext::new(&grid, |index| AstarSolver.heuristic(&grid, index));
        ctx.closed.insert(0);
        ctx.closed.insert(1);
        ctx.state[1].g = 5;
        ctx.state[1].cost = 5 + ctx.state[1].h;
        ctx.state[1].parent = Some(2);

        AstarSolver.relax(&mut ctx, 0);

        assert!(ctx.is_closed(0));
        assert!(!ctx.is_closed(1));
        assert_eq!(ctx.state[1].parent, Some(0));
        assert_eq!(ctx.state[1].g, 1);
        assert_eq!(ctx.state[1].cost, 2);
        assert_eq!(ctx.frontier.len(), 1);
        assert_eq!(ctx.frontier.peek_min().map(|entry| entry.index), Some(1));
        assert_eq!(ctx.stats.frontier_pushes, 1);
        assert_eq!(ctx.stats.cells_reopened, 1);
    }
}
