use std::fmt::{Display, Formatter};
use std::num::NonZero;
use std::str::FromStr;

use ndarray::Ix;

pub(crate) type Coord = usize;
/// Side length of a (square) [`Grid`](crate::Grid).
pub type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(row, column)` on a grid. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    /// Wrapping offset; stepping off the top or left edge produces a huge coordinate which every bounds check rejects.
    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Signed `(row, column)` difference from `self` to `other`.
    pub(crate) fn delta_to(self, other: Self) -> (isize, isize) {
        (other.0 as isize - self.0 as isize, other.1 as isize - self.1 as isize)
    }

    /// Number of king moves between `self` and `other` on an open board.
    pub fn chebyshev(self, other: Self) -> usize {
        self.0.abs_diff(other.0).max(self.1.abs_diff(other.1))
    }

    /// Straight-line distance between `self` and `other`.
    pub fn euclidean(self, other: Self) -> f64 {
        let (dr, dc) = (self.0.abs_diff(other.0), self.1.abs_diff(other.1));
        ((dr * dr + dc * dc) as f64).sqrt()
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.0, self.1)
    }
}

/// Reasons a string may fail to parse as a [`Location`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseLocationError {
    /// The input is not of the form `[row,column]`.
    #[error("expected `[row,column]`, got `{0}`")]
    Malformed(String),
    /// One of the two components is not a non-negative integer.
    #[error("`{0}` is not a valid coordinate")]
    BadCoordinate(String),
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ParseLocationError::Malformed(s.to_owned()))?;

        let (row, column) = inner.split_once(',')
            .ok_or_else(|| ParseLocationError::Malformed(s.to_owned()))?;

        let parse = |part: &str| part.trim().parse::<Coord>()
            .map_err(|_| ParseLocationError::BadCoordinate(part.trim().to_owned()));

        Ok(Self(parse(row)?, parse(column)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_pairs() {
        assert_eq!("[4,2]".parse::<Location>(), Ok(Location(4, 2)));
        assert_eq!(" [0, 8] ".parse::<Location>(), Ok(Location(0, 8)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!("4,2".parse::<Location>(), Err(ParseLocationError::Malformed(_))));
        assert!(matches!("[4;2]".parse::<Location>(), Err(ParseLocationError::Malformed(_))));
        assert_eq!("[-1,2]".parse::<Location>(), Err(ParseLocationError::BadCoordinate("-1".to_owned())));
    }

    #[test]
    fn distances() {
        assert_eq!(Location(4, 8).chebyshev(Location(7, 0)), 8);
        assert!(Location(4, 8).euclidean(Location(7, 0)) > 8.0);
        assert_eq!(Location(0, 0).euclidean(Location(3, 4)), 5.0);
    }

    #[test]
    fn display_round_trips() {
        let location = Location(7, 4);
        assert_eq!(location.to_string().parse::<Location>(), Ok(location));
    }
}
