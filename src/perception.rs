use std::collections::HashSet;

use itertools::Itertools;

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::location::Location;

/// How far, and in what pattern, the agent can see danger around itself.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Perception {
    /// Radius 1: every neighboring cell is perceived, dangerous or not.
    #[default]
    Adjacent,
    /// Radius 2: only the hollow ring at distance 2 is inspected, corners excluded,
    /// and only cells which are actually dangerous are reported.
    Ring,
}

impl TryFrom<usize> for Perception {
    type Error = ConfigError;

    fn try_from(radius: usize) -> Result<Self, Self::Error> {
        match radius {
            1 => Ok(Self::Adjacent),
            2 => Ok(Self::Ring),
            _ => Err(ConfigError::UnsupportedRadius(radius)),
        }
    }
}

impl Perception {
    /// The radius this perception corresponds to.
    pub fn radius(&self) -> usize {
        match self {
            Self::Adjacent => 1,
            Self::Ring => 2,
        }
    }

    fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            Self::Adjacent => (-1..=1).cartesian_product(-1..=1)
                .filter(|offset| *offset != (0, 0))
                .collect_vec(),
            Self::Ring => (-1..=1)
                .flat_map(|i| [(i, -2), (i, 2), (-2, i), (2, i)])
                .collect_vec(),
        }
    }

    /// Cells perceived from `at`. Out-of-range cells are dropped.
    pub fn perceive(&self, grid: &Grid, at: Location) -> HashSet<Location> {
        self.offsets().into_iter()
            .map(|offset| at.offset_by(offset))
            .filter(|location| match self {
                Self::Adjacent => grid.contains(*location),
                Self::Ring => grid.get_cell(*location).is_some_and(|cell| cell.is_danger_or_observer()),
            })
            .collect()
    }
}

/// Cells perceived from `at` with vision `radius`. Only radii 1 and 2 are supported.
pub fn detect_danger(grid: &Grid, at: Location, radius: usize) -> Result<HashSet<Location>, ConfigError> {
    Ok(Perception::try_from(radius)?.perceive(grid, at))
}

/// Every cell the agent has perceived so far. Stepping onto a lethal cell in this set is survivable, since the agent saw it coming.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectedDanger(HashSet<Location>);

impl DetectedDanger {
    /// Construct an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Perceive from `at`, adding whatever is seen.
    pub fn observe(&mut self, grid: &Grid, at: Location, perception: Perception) {
        self.0.extend(perception.perceive(grid, at));
    }

    /// Whether `location` has been perceived.
    pub fn contains(&self, location: Location) -> bool {
        self.0.contains(&location)
    }

    /// Forget everything perceived.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of perceived cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been perceived.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over perceived cells in no particular order.
    pub fn iter(&self) -> impl Iterator<Item=&Location> {
        self.0.iter()
    }
}
