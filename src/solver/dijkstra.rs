use crate::{
    solver::{CellState, GridSolver, SearchContext},
    Cost, Grid, MOVE_COST,
};

/// Uniform-cost search. Runs until every reachable cell is closed; a cell's cost is final the
/// first time it is closed, so closed cells are never touched again.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraSolver;

impl GridSolver for DijkstraSolver {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn heuristic(&self, _: &Grid, _: usize) -> Cost {
        0
    }

    fn stops_at_end(&self) -> bool {
        false
    }

    fn relax(&self, ctx: &mut SearchContext<'_>, current: usize) {
        let new_cost = ctx.state[current].cost + MOVE_COST;
        for neighbour in ctx.grid.open_neighbours(current) {
            if ctx.is_closed(neighbour) {
                continue;
            }
            let state = &mut ctx.state[neighbour];
            if new_cost < state.cost {
                state.cost = new_cost;
                state.g = new_cost;
                state.parent = Some(current);
            }
            // Queued even without an improvement, the closed set filters the duplicates
            ctx.push(neighbour);
        }
    }

    fn total_cost(&self, end: &CellState) -> Cost {
        end.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordingObserver, SearchOutcome};

    /// Asserts that the optimal 4 step solution is found.
    #[test]
    fn solve_simple_problem() {
        let grid = Grid::from_codes(&[vec![0, 0, 2], vec![0, 3, 0], vec![1, 0, 0]]).unwrap();
        let outcome = DijkstraSolver.solve(&grid, &mut ()).unwrap();
        assert_eq!(outcome.total_cost(), Some(4));
    }

    #[test]
    fn closes_cells_in_distance_order() {
        // . . . E
        // . # # .
        // S . . .
        let grid = Grid::from_codes(&[vec![0, 0, 0, 2], vec![0, 3, 3, 0], vec![1, 0, 0, 0]])
            .unwrap();
        let mut observer = RecordingObserver::new();
        let outcome = DijkstraSolver.solve(&grid, &mut observer).unwrap();
        let SearchOutcome::Found(result) = outcome else {
            panic!("expected a path");
        };
        assert_eq!(result.total_cost, 5);
        let start = grid.start().point;
        let distances: Vec<i32> = observer
            .closed()
            .iter()
            .map(|c| (c.point.x - start.x).abs() + (c.point.y - start.y).abs())
            .collect();
        // Around the wall the grid distance equals the Manhattan distance
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(distances.len(), 10);
        assert_eq!(result.stats.cells_reopened, 0);
    }

    #[test]
    fn detour_around_wall() {
        // E . .
        // # # .
        // S . .
        let grid = Grid::from_codes(&[vec![2, 0, 0], vec![3, 3, 0], vec![1, 0, 0]]).unwrap();
        let outcome = DijkstraSolver.solve(&grid, &mut ()).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.total_cost, 6);
        assert_eq!(result.path.len(), 7);
        assert!(result.path.iter().all(|c| !grid.is_obstacle(c.index)));
    }
}
