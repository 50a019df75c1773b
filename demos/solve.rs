use rand::{rngs::StdRng, SeedableRng};
use raster_pathfinding::{search, Algorithm, RecordingObserver, SearchOutcome};
use raster_pathfinding_io::{
    load_grid, random_grid, write_path, DEFAULT_COLS, DEFAULT_DENSITY, DEFAULT_ROWS,
};

// Solves a map with both algorithms and prints the result.
//
//   cargo run --example solve -- maps/mazes/pocket.csv
//   cargo run --example solve -- random 42
//
// S marks the start, E the end, # an obstacle and * a cell on the path.
fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let grid = match args.first().map(String::as_str) {
        None | Some("random") => {
            let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
            let mut rng = StdRng::seed_from_u64(seed);
            random_grid(DEFAULT_ROWS, DEFAULT_COLS, DEFAULT_DENSITY, &mut rng).unwrap()
        }
        Some(path) => load_grid(path).unwrap(),
    };
    println!("{}", grid);
    for algorithm in Algorithm::ALL {
        let mut observer = RecordingObserver::new();
        match search(&grid, algorithm, &mut observer).unwrap() {
            SearchOutcome::Found(result) => {
                println!(
                    "{}: cost {}, closed {} cells",
                    algorithm,
                    result.total_cost,
                    observer.closed().len()
                );
                println!("{}", grid.render_path(&result.path));
                write_path(std::io::stdout(), &result.path).unwrap();
            }
            SearchOutcome::NoPath => println!("{}: no path", algorithm),
        }
    }
}
