//! Grid source and sink for `raster_pathfinding`: comma-separated tables of cell codes, path
//! export and the random map generator.
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::{debug, info};
use rand::Rng;
use raster_pathfinding::{Cell, Grid, GridError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 20;
/// Probability of a cell becoming an obstacle in [random_codes].
pub const DEFAULT_DENSITY: f64 = 0.05;

#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("cannot parse {value:?} at row {row}, column {col} as a cell code")]
    Parse {
        row: usize,
        col: usize,
        value: String,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, IoError>;

/// One step of an exported path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub step: usize,
    pub x: i32,
    pub y: i32,
}

// Spreadsheets tend to export integer columns as `3.0`
fn parse_code(value: &str) -> Option<i32> {
    value.parse::<i32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && v.abs() <= i32::MAX as f64)
            .map(|v| v as i32)
    })
}

/// Reads a headerless table of cell codes. Row lengths are not checked here, that is left to
/// [Grid::from_codes].
pub fn read_codes<R: Read>(reader: R) -> Result<Vec<Vec<i32>>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut codes = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let values = record
            .iter()
            .enumerate()
            .map(|(col, value)| {
                parse_code(value).ok_or_else(|| IoError::Parse {
                    row,
                    col,
                    value: value.to_owned(),
                })
            })
            .collect::<Result<Vec<i32>>>()?;
        codes.push(values);
    }
    Ok(codes)
}

pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    debug!("Loading grid from {}", path.display());
    let file = File::open(path)?;
    let codes = read_codes(BufReader::new(file))?;
    Ok(Grid::from_codes(&codes)?)
}

/// Writes the table of cell codes `grid` was built from, top row first.
pub fn write_codes<W: Write>(writer: W, grid: &Grid) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    for row in grid.to_codes() {
        csv_writer.write_record(row.iter().map(|code| code.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_grid<P: AsRef<Path>>(path: P, grid: &Grid) -> Result<()> {
    let file = File::create(path)?;
    write_codes(BufWriter::new(file), grid)
}

/// Writes `path` as `step,x,y` records with a header line.
pub fn write_path<W: Write>(writer: W, path: &[Cell]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    for (step, cell) in path.iter().enumerate() {
        csv_writer.serialize(PathRecord {
            step,
            x: cell.point.x,
            y: cell.point.y,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_path<R: Read>(reader: R) -> Result<Vec<PathRecord>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let records = csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<PathRecord>, csv::Error>>()?;
    Ok(records)
}

/// Loads every `*.csv` map below `root`, named by their path relative to `root` without the
/// extension, e.g. `mazes/spiral`.
pub fn load_grid_dir<P: AsRef<Path>>(root: P) -> Result<Vec<(String, Grid)>> {
    let root = root.as_ref();
    let mut maps = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "csv") {
            continue;
        }
        let name = path
            .strip_prefix(root)
            .unwrap_or(path)
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/");
        maps.push((name, load_grid(path)?));
    }
    info!("Loaded {} maps from {}", maps.len(), root.display());
    Ok(maps)
}

/// A table with the start in the bottom-left corner, the end in the top-right corner and every
/// other cell an obstacle with probability `density`.
pub fn random_codes<R: Rng>(rows: usize, cols: usize, density: f64, rng: &mut R) -> Vec<Vec<i32>> {
    let density = density.clamp(0.0, 1.0);
    (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| {
                    if i == rows - 1 && j == 0 {
                        1
                    } else if i == 0 && j == cols - 1 {
                        2
                    } else if rng.gen_bool(density) {
                        3
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Fails for tables too small to hold both a start and an end cell.
pub fn random_grid<R: Rng>(rows: usize, cols: usize, density: f64, rng: &mut R) -> Result<Grid> {
    Ok(Grid::from_codes(&random_codes(rows, cols, density, rng))?)
}
