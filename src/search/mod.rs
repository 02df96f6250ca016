//! Single-leg search strategies.
//!
//! Every strategy walks the same 8-connected grid under the same rules.
//! On reaching a cell the agent first perceives its surroundings, then the cell's safety is checked, then whether it holds the target, and only then is it expanded.
//! A lethal cell which was perceived beforehand is simply avoided; one which was not ends the game with [`Captured`].

use ndarray::Array2;
use tracing::debug;

pub use astar::{AStar, Heuristic};
pub use backtracking::{Backtracking, BacktrackingMode, CancellationToken};
pub use bfs::BreadthFirst;

use crate::cell::Tag;
use crate::error::Captured;
use crate::grid::Grid;
use crate::location::Location;
use crate::perception::{DetectedDanger, Perception};

mod astar;
mod backtracking;
mod bfs;

/// Everything a strategy needs to know about one leg of a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LegRequest {
    /// Where the leg begins.
    pub start: Location,
    /// The leg ends on the first cell found holding this tag.
    pub target: Tag,
    /// Whether the agent holds the concealment item, making plain danger cells walkable.
    pub concealed: bool,
    /// How the agent perceives danger along the way.
    pub perception: Perception,
    /// Forget previously perceived danger before starting.
    pub reset_detection: bool,
}

impl LegRequest {
    /// A fresh, unconcealed leg from `start` to `target` which forgets previously perceived danger.
    pub fn new(start: Location, target: Tag, perception: Perception) -> Self {
        Self {
            start,
            target,
            concealed: false,
            perception,
            reset_detection: true,
        }
    }

    /// Set whether the agent is concealed on this leg.
    pub fn concealed(mut self, concealed: bool) -> Self {
        self.concealed = concealed;
        self
    }

    /// Set whether previously perceived danger is forgotten.
    pub fn reset_detection(mut self, reset_detection: bool) -> Self {
        self.reset_detection = reset_detection;
        self
    }
}

/// A strategy finding a single leg of a route.
pub trait PathFinder {
    /// Find a path from `request.start` to a cell holding `request.target`, both ends included.
    ///
    /// Returns `Ok(None)` if the search is exhausted without reaching the target, and [`Captured`] if it walked onto a lethal cell it had not perceived.
    /// Danger perceived along the way is added to `detected`.
    fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured>;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Whether searches were stopped early, so an `Ok(None)` proves nothing about the grid.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: PathFinder + ?Sized> PathFinder for &F {
    fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured> {
        (**self).find_path(grid, request, detected)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Whether the agent survives standing on `location`.
pub fn is_safe(grid: &Grid, location: Location, concealed: bool) -> bool {
    grid.get_cell(location).is_some_and(|cell| match concealed {
        true => !cell.is_observer(),
        false => !cell.is_danger_or_observer(),
    })
}

/// Walk the back-pointers in `previous` from `end` until a cell with none, returning the cells visited in forward order.
pub fn restore_path(previous: &Array2<Option<Location>>, end: Location) -> Vec<Location> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prior) = previous.get(current.as_index()).copied().flatten() {
        path.push(prior);
        current = prior;
    }

    path.reverse();
    path
}

/// Prepare `detected` for a new leg. Returns `false` if the leg cannot be searched at all.
pub(crate) fn begin_leg(grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger, strategy: &str) -> bool {
    if request.reset_detection {
        detected.clear();
    }

    debug!(strategy, start = %request.start, target = %request.target, concealed = request.concealed, "starting leg");
    grid.contains(request.start)
}

/// Perceive from `at`, then check whether standing there is survivable.
///
/// Returns `Ok(false)` for a lethal cell the agent saw coming, which the search should simply not expand.
pub(crate) fn arrive(grid: &Grid, at: Location, request: &LegRequest, detected: &mut DetectedDanger) -> Result<bool, Captured> {
    detected.observe(grid, at, request.perception);

    if is_safe(grid, at, request.concealed) {
        Ok(true)
    } else if detected.contains(at) {
        Ok(false)
    } else {
        Err(Captured { at })
    }
}

pub(crate) fn finish_leg(strategy: &str, expanded: usize, path: &Option<Vec<Location>>) {
    match path {
        Some(path) => debug!(strategy, expanded, steps = path.len() - 1, "leg found"),
        None => debug!(strategy, expanded, "no path"),
    }
}
