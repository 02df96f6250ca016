use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use tracing::{trace, warn};

use crate::error::Captured;
use crate::grid::Grid;
use crate::location::Location;
use crate::perception::DetectedDanger;
use crate::search::{arrive, begin_leg, finish_leg, restore_path, LegRequest, PathFinder};
use crate::step::Step;

/// When a [`Backtracking`] search stops.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum BacktrackingMode {
    /// Stop at the first path found.
    #[default]
    FirstSuccess,
    /// Keep searching for shorter paths until the search space is exhausted.
    Shortest,
}

/// A shared flag asking a running [`Backtracking`] search to stop.
///
/// Clones share the same flag, so one can be handed to another thread while the search holds the other.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Construct a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) has been called on this token or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Exhaustive depth-first search, trying steps toward the target's position first.
///
/// The search space grows exponentially with the size of the grid, so long searches should be given a [`CancellationToken`] and cancelled from elsewhere.
/// A cancelled search returns the best path found so far rather than an error.
#[derive(Clone, Debug, Default)]
pub struct Backtracking {
    /// When to stop.
    pub mode: BacktrackingMode,
    cancel: CancellationToken,
}

impl Backtracking {
    /// Construct a new [`Self`] with a fresh [`CancellationToken`].
    pub fn new(mode: BacktrackingMode) -> Self {
        Self::with_cancellation(mode, CancellationToken::new())
    }

    /// Construct a new [`Self`] which stops once `cancel` is cancelled.
    pub fn with_cancellation(mode: BacktrackingMode, cancel: CancellationToken) -> Self {
        Self { mode, cancel }
    }

    /// A clone of the token this search polls.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

enum Halt {
    Cancelled,
    Captured(Captured),
}

impl From<Captured> for Halt {
    fn from(value: Captured) -> Self {
        Self::Captured(value)
    }
}

struct Attempt<'a> {
    grid: &'a Grid,
    request: &'a LegRequest,
    goal: Location,
    mode: BacktrackingMode,
    cancel: &'a CancellationToken,
    detected: &'a mut DetectedDanger,
    visited: Array2<bool>,
    previous: Array2<Option<Location>>,
    best: Option<Vec<Location>>,
    best_len: usize,
    expanded: usize,
}

impl Attempt<'_> {
    /// Returns whether the target was reached at or below `at` with a new best path.
    fn descend(&mut self, at: Location, depth: usize) -> Result<bool, Halt> {
        if self.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }

        if !arrive(self.grid, at, self.request, self.detected)? {
            return Ok(false);
        }

        if self.grid.cell(at).contains(self.request.target) {
            if depth < self.best_len {
                trace!(depth, "new best");
                self.best = Some(restore_path(&self.previous, at));
                self.best_len = depth;
                return Ok(true);
            }
            return Ok(false);
        }

        // the next step could at best tie the current best
        if self.visited[at.as_index()] || depth + 1 >= self.best_len {
            return Ok(false);
        }

        self.visited[at.as_index()] = true;
        self.expanded += 1;

        for step in Step::toward(at, self.goal) {
            let next = step.attempt_from(at);
            if !self.grid.contains(next) || self.visited[next.as_index()] {
                continue;
            }

            self.previous[next.as_index()] = Some(at);
            if self.descend(next, depth + 1)? && self.mode == BacktrackingMode::FirstSuccess {
                self.visited[at.as_index()] = false;
                return Ok(true);
            }
        }

        self.visited[at.as_index()] = false;
        Ok(false)
    }
}

impl PathFinder for Backtracking {
    fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured> {
        if !begin_leg(grid, request, detected, self.name()) {
            return Ok(None);
        }

        let Some(goal) = grid.position_of(request.target) else {
            return Ok(None);
        };

        let size = grid.size();
        let mut attempt = Attempt {
            grid,
            request,
            goal,
            mode: self.mode,
            cancel: &self.cancel,
            detected,
            visited: Array2::from_elem((size, size), false),
            previous: Array2::from_elem((size, size), None),
            best: None,
            best_len: usize::MAX,
            expanded: 0,
        };

        match attempt.descend(request.start, 0) {
            Ok(_) => {}
            Err(Halt::Cancelled) => warn!(found = attempt.best.is_some(), expanded = attempt.expanded, "backtracking cancelled"),
            Err(Halt::Captured(captured)) => return Err(captured),
        }

        finish_leg(self.name(), attempt.expanded, &attempt.best);
        Ok(attempt.best)
    }

    fn name(&self) -> &'static str {
        match self.mode {
            BacktrackingMode::FirstSuccess => "backtracking",
            BacktrackingMode::Shortest => "backtracking-shortest",
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
