//! Progress reporting for searches.
use crate::{Cell, Cost};

/// Receives the steps of a search as they happen. Calls are made inline on the searching thread;
/// all [on_cell_finalized](Self::on_cell_finalized) calls of a run precede its single terminal
/// call. A* may finalize a reopened cell more than once.
pub trait ProgressObserver {
    fn on_cell_finalized(&mut self, _cell: Cell) {}
    fn on_path_found(&mut self, _path: &[Cell], _total_cost: Cost) {}
    fn on_no_path(&mut self) {}
}

/// Ignores every event.
impl ProgressObserver for () {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Finalized(Cell),
    PathFound { path: Vec<Cell>, total_cost: Cost },
    NoPath,
}

/// Stores every event in order, e.g. to replay a search as an animation.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<ProgressEvent>,
}

impl RecordingObserver {
    pub fn new() -> RecordingObserver {
        RecordingObserver::default()
    }

    /// The finalized cells in closing order.
    pub fn closed(&self) -> Vec<Cell> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Finalized(cell) => Some(*cell),
                _ => None,
            })
            .collect()
    }

    pub fn terminal(&self) -> Option<&ProgressEvent> {
        self.events
            .last()
            .filter(|e| !matches!(e, ProgressEvent::Finalized(_)))
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_cell_finalized(&mut self, cell: Cell) {
        self.events.push(ProgressEvent::Finalized(cell));
    }
    fn on_path_found(&mut self, path: &[Cell], total_cost: Cost) {
        self.events.push(ProgressEvent::PathFound {
            path: path.to_vec(),
            total_cost,
        });
    }
    fn on_no_path(&mut self) {
        self.events.push(ProgressEvent::NoPath);
    }
}
