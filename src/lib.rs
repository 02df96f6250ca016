#![warn(missing_docs)]

//! # `cloakpath`
//!
//! Stealth-aware pathfinding on a square grid watched by two stationary observers.
//! Begin by building a [`Grid`] with [`Grid::new`] or a [`GridBuilder`].
//! Pick a strategy implementing [`PathFinder`], such as [`BreadthFirst`], [`AStar`] or [`Backtracking`], and hand it to a [`ScenarioSolver`], which yields the shortest [`Route`] from the start through the objective to the exit.
//!
//! # Rules
//! Every observer makes the cells within its radius dangerous. An agent standing on a dangerous cell is caught, unless it holds the concealment item, which protects from everything but the observer's own cell.
//! The agent does not know where danger lies in advance. It perceives its surroundings as it moves, with one of two [`Perception`]s:
//! 1. [`Adjacent`](Perception::Adjacent) reveals all eight neighbors.
//! 2. [`Ring`](Perception::Ring) reveals only dangerous cells exactly two steps away, excluding the corners of that square; neighbors remain unseen.
//!
//! A search never expands a lethal cell. If the cell had been perceived, the agent simply does not go there.
//! If it had not, the agent stepped into the unknown and was caught, which ends the game with [`Captured`].
//!
//! # Scenarios
//! The concealment item may be collected before the objective, after it, or not at all.
//! [`ScenarioSolver`] tries each [`Scenario`] leg by leg, carrying the agent's position and concealment forward, and keeps the ordering with the fewest total moves.
//! Perceived danger accumulates over the legs of one scenario and is forgotten between scenarios.

pub use builder::GridBuilder;
pub use cell::{Cell, Tag};
pub use error::{Captured, ConfigError};
pub use grid::Grid;
pub use location::{Dimension, Location, ParseLocationError};
pub use perception::{detect_danger, DetectedDanger, Perception};
pub use scenario::{solve, Leg, Route, Scenario, ScenarioSolver};
pub use search::{AStar, Backtracking, BacktrackingMode, BreadthFirst, CancellationToken, Heuristic, LegRequest, PathFinder};
pub use step::Step;

pub mod builder;
mod cell;
mod error;
mod grid;
mod location;
mod perception;
mod scenario;
pub mod search;
mod step;
mod tests;
