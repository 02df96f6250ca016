use itertools::Itertools;
use strum::VariantArray;

use crate::location::Location;

/// One king move on the grid.
///
/// Variants are declared in the order neighbors are expanded: row offset `-1..=1` outer, column offset `-1..=1` inner.
/// Searches rely on this order to break ties, so it is part of the observable behavior.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Step {
    /// `(-1, -1)`
    UpLeft,
    /// `(-1, 0)`
    Up,
    /// `(-1, 1)`
    UpRight,
    /// `(0, -1)`
    Left,
    /// `(0, 1)`
    Right,
    /// `(1, -1)`
    DownLeft,
    /// `(1, 0)`
    Down,
    /// `(1, 1)`
    DownRight,
}

impl Step {
    /// The `(row, column)` offset of this step.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Self::UpLeft => (-1, -1),
            Self::Up => (-1, 0),
            Self::UpRight => (-1, 1),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::DownLeft => (1, -1),
            Self::Down => (1, 0),
            Self::DownRight => (1, 1),
        }
    }

    /// Attempt the step from `location` and return the resultant [`Location`], which may lie outside the grid.
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.offset())
    }

    /// The step with the given offset, if any. `(0, 0)` and offsets longer than one cell have none.
    pub fn from_offset(offset: (isize, isize)) -> Option<Self> {
        Self::VARIANTS.iter().find(|step| step.offset() == offset).copied()
    }

    /// Determine the direction from `a` to `b`. Works only on two adjacent [`Location`]s and returns [`None`] otherwise.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|step| step.attempt_from(a) == b).copied()
    }

    /// All eight steps, ordered so that the ones heading toward `goal` come first.
    ///
    /// Along each axis the preferred offsets are `[sign, 0, -sign]` of the remaining distance, or `[0, 1, -1]` once that axis is aligned.
    /// The row preference is the outer loop.
    pub fn toward(from: Location, goal: Location) -> Vec<Self> {
        fn preference(delta: isize) -> [isize; 3] {
            match delta.signum() {
                0 => [0, 1, -1],
                sign => [sign, 0, -sign],
            }
        }

        let (dr, dc) = from.delta_to(goal);
        preference(dr).into_iter()
            .cartesian_product(preference(dc))
            .filter_map(Self::from_offset)
            .collect_vec()
    }
}
