//! Validated construction of a [`Grid`](crate::Grid) from waypoints and observers.

use itertools::Itertools;
use ndarray::Array2;
use tracing::debug;

use crate::cell::{Cell, Tag};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::location::{Dimension, Location};

/// A builder for [`Grid`]s.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// The first problem encountered is kept and reported by [`build`](Self::build); later calls do nothing once the builder is invalid.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    size: Dimension,
    start: Option<Location>,
    objective: Option<Location>,
    concealment: Option<Location>,
    exit: Option<Location>,
    observers: Vec<(Location, usize)>,
    invalid_reason: Option<ConfigError>,
}

impl GridBuilder {
    /// Construct a new [`Self`] for a `size`×`size` grid.
    pub fn with_size(size: Dimension) -> Self {
        Self {
            size,
            start: None,
            objective: None,
            concealment: None,
            exit: None,
            observers: Vec::with_capacity(2),
            invalid_reason: None,
        }
    }

    /// Whether `location` may be placed, invalidating the builder if it is out of bounds.
    fn accepts(&mut self, location: Location) -> bool {
        if self.invalid_reason.is_some() {
            return false;
        }

        if location.0 >= self.size.get() || location.1 >= self.size.get() {
            self.invalid_reason = Some(ConfigError::OutOfBounds(location));
            return false;
        }

        true
    }

    /// Set where the agent begins.
    pub fn start(&mut self, location: Location) -> &mut Self {
        if self.accepts(location) {
            self.start = Some(location);
        }
        self
    }

    /// Set the primary target.
    pub fn objective(&mut self, location: Location) -> &mut Self {
        if self.accepts(location) {
            self.objective = Some(location);
        }
        self
    }

    /// Set where the concealment item lies.
    pub fn concealment(&mut self, location: Location) -> &mut Self {
        if self.accepts(location) {
            self.concealment = Some(location);
        }
        self
    }

    /// Set the exit. May not coincide with the objective.
    pub fn exit(&mut self, location: Location) -> &mut Self {
        if self.accepts(location) {
            self.exit = Some(location);
        }
        self
    }

    /// Add an observer watching every cell within Chebyshev distance `radius` of `location`.
    ///
    /// Observers are expanded in the order they are added.
    pub fn add_observer(&mut self, location: Location, radius: usize) -> &mut Self {
        if self.accepts(location) {
            self.observers.push((location, radius));
        }
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid so far, `Some(&ConfigError)` otherwise.
    /// Overlaps are only detected by [`build`](Self::build).
    pub fn is_valid(&self) -> Option<&ConfigError> {
        self.invalid_reason.as_ref()
    }

    /// Place every tag and expand every observer's danger zone, yielding a [`Grid`].
    pub fn build(&self) -> Result<Grid, ConfigError> {
        if let Some(reason) = self.invalid_reason {
            return Err(reason);
        }

        let start = self.start.ok_or(ConfigError::MissingWaypoint(Tag::Start))?;
        let objective = self.objective.ok_or(ConfigError::MissingWaypoint(Tag::Objective))?;
        let concealment = self.concealment.ok_or(ConfigError::MissingWaypoint(Tag::Concealment))?;
        let exit = self.exit.ok_or(ConfigError::MissingWaypoint(Tag::Exit))?;

        let size = self.size.get();
        let mut cells = Array2::from_shape_simple_fn((size, size), Cell::default);

        cells[start.as_index()].insert(Tag::Start);
        cells[objective.as_index()].insert(Tag::Objective);
        cells[concealment.as_index()].insert(Tag::Concealment);
        if cells[exit.as_index()].contains(Tag::Objective) {
            return Err(ConfigError::Overlap(Tag::Objective, Tag::Exit));
        }
        cells[exit.as_index()].insert(Tag::Exit);

        // an agent starting on the concealment item already holds it
        let pre_concealed = start == concealment;

        for (observer, radius) in &self.observers {
            let rows = observer.0.saturating_sub(*radius)..=(observer.0 + radius).min(size - 1);
            let cols = observer.1.saturating_sub(*radius)..=(observer.1 + radius).min(size - 1);

            for index in rows.cartesian_product(cols) {
                let cell = &mut cells[index];
                if let Some(critical) = cell.first_critical() {
                    if !pre_concealed {
                        return Err(ConfigError::Overlap(critical, Tag::Danger));
                    }
                }
                if !cell.is_observer() {
                    cell.insert(Tag::Danger);
                }
            }

            let own = &mut cells[observer.as_index()];
            own.remove(Tag::Danger);
            own.insert(Tag::Observer);
        }

        cells.map_inplace(|cell| if cell.is_untagged() {
            cell.insert(Tag::Empty);
        });

        if cells[start.as_index()].is_danger_or_observer() {
            return Err(ConfigError::StartCaptured);
        }

        debug!(size, observers = self.observers.len(), "built grid");

        Ok(Grid {
            cells,
            size: self.size,
            start,
            objective,
            concealment,
            exit,
        })
    }
}
