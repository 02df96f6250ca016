use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Array2;
use strum::VariantArray;

use crate::builder::GridBuilder;
use crate::cell::{Cell, Tag};
use crate::error::ConfigError;
use crate::location::{Dimension, Location};
use crate::step::Step;

// drawn over path cells which carry no waypoint of their own
const PATH_MARKER: char = 'o';

/// A square grid of tagged cells with two observers and four waypoints.
///
/// [`Grid`]s are immutable once built. Build one with a [`GridBuilder`] or [`Grid::new`].
#[derive(Clone, Debug)]
pub struct Grid {
    pub(crate) cells: Array2<Cell>,
    pub(crate) size: Dimension,
    pub(crate) start: Location,
    pub(crate) objective: Location,
    pub(crate) concealment: Location,
    pub(crate) exit: Location,
}

impl Grid {
    /// Build a `size`×`size` grid from the six input coordinates and the two observers' radii.
    ///
    /// Equivalent to filling a [`GridBuilder`] with the same values, observer 1 first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        size: usize,
        observer1_radius: usize,
        observer2_radius: usize,
        start: Location,
        observer1: Location,
        observer2: Location,
        objective: Location,
        concealment: Location,
        exit: Location,
    ) -> Result<Self, ConfigError> {
        let size = NonZero::new(size).ok_or(ConfigError::EmptyGrid)?;

        GridBuilder::with_size(size)
            .start(start)
            .add_observer(observer1, observer1_radius)
            .add_observer(observer2, observer2_radius)
            .objective(objective)
            .concealment(concealment)
            .exit(exit)
            .build()
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Whether `location` lies on the grid.
    pub fn contains(&self, location: Location) -> bool {
        location.0 < self.size() && location.1 < self.size()
    }

    /// The cell at `location`.
    ///
    /// # Panics
    /// If `location` is out of bounds. See [`Self::get_cell`] for a checked variant.
    pub fn cell(&self, location: Location) -> Cell {
        self.cells[location.as_index()]
    }

    /// The cell at `location`, if it lies on the grid.
    pub fn get_cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// Where the agent begins.
    pub fn start(&self) -> Location {
        self.start
    }

    /// The unique position of a waypoint tag: [`Start`](Tag::Start), [`Objective`](Tag::Objective),
    /// [`Concealment`](Tag::Concealment) or [`Exit`](Tag::Exit). Other tags have no unique position.
    pub fn position_of(&self, tag: Tag) -> Option<Location> {
        match tag {
            Tag::Start => Some(self.start),
            Tag::Objective => Some(self.objective),
            Tag::Concealment => Some(self.concealment),
            Tag::Exit => Some(self.exit),
            Tag::Empty | Tag::Danger | Tag::Observer => None,
        }
    }

    /// In-bounds king-move neighbors of `location`, in [`Step`] declaration order.
    pub fn neighbors(&self, location: Location) -> impl Iterator<Item=(Step, Location)> + '_ {
        Step::VARIANTS.iter()
            .map(move |step| (*step, step.attempt_from(location)))
            .filter(move |(_, neighbor)| self.contains(*neighbor))
    }

    /// Every cell holding `tag`, in row-major order.
    pub fn locations_with(&self, tag: Tag) -> impl Iterator<Item=Location> + '_ {
        self.cells.indexed_iter()
            .filter(move |(_, cell)| cell.contains(tag))
            .map(|(index, _)| Location::from(index))
    }

    /// Dump the grid as [`Display`] does, additionally marking the cells of `path` which hold no waypoint.
    pub fn render_with_path(&self, path: &[Location]) -> String {
        let mut symbols = self.cells.map(Cell::symbol);
        for location in path {
            let Some(cell) = self.get_cell(*location) else { continue };
            if cell.has_critical() || cell.contains(Tag::Start) {
                continue;
            }
            symbols[location.as_index()] = PATH_MARKER;
        }

        print(&symbols)
    }
}

fn print(board: &Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    for row in board.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(&self.cells.map(Cell::symbol)))
    }
}
