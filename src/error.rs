use crate::cell::Tag;
use crate::location::Location;

/// Reasons a [`Grid`](crate::Grid) configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two tags which may not share a cell ended up on the same cell.
    #[error("{0} and {1} may not share a cell")]
    Overlap(Tag, Tag),
    /// A feature was placed outside the grid.
    #[error("{0} lies outside the grid")]
    OutOfBounds(Location),
    /// Only perception radii 1 and 2 are modelled.
    #[error("unsupported perception radius {0}")]
    UnsupportedRadius(usize),
    /// The agent would begin inside a danger zone.
    #[error("the start cell is watched by an observer")]
    StartCaptured,
    /// The grid has no cells.
    #[error("the grid must have at least one cell")]
    EmptyGrid,
    /// A builder was finished without placing a required waypoint.
    #[error("no {0} was placed")]
    MissingWaypoint(Tag),
}

/// The agent stepped onto a lethal cell it had not perceived beforehand. Ends the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("captured at {at}")]
pub struct Captured {
    /// Where the agent was caught.
    pub at: Location,
}
