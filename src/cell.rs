use itertools::Itertools;
use strum::VariantArray;

/// A semantic tag which may be placed on a grid cell. One cell may carry several.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, VariantArray, strum::Display)]
pub enum Tag {
    /// Nothing of note.
    Empty,
    /// Where the agent begins.
    Start,
    /// The primary target.
    Objective,
    /// Picking this up grants immunity to plain danger cells.
    Concealment,
    /// Where the agent must finish.
    Exit,
    /// Inside an observer's radius.
    Danger,
    /// The observer's own cell, lethal under any circumstances.
    Observer,
}

impl Tag {
    /// Integer severity used when comparing how hazardous a cell is.
    /// Waypoints are negative, hazards positive.
    pub fn severity(&self) -> i8 {
        match self {
            Self::Empty | Self::Start => 0,
            Self::Objective | Self::Concealment | Self::Exit => -1,
            Self::Danger => 1,
            Self::Observer => 2,
        }
    }

    /// Whether the tag marks a waypoint which must never be swallowed by a danger zone.
    pub fn is_critical(&self) -> bool {
        self.severity() < 0
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }

    pub(crate) fn symbol(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::Start => 'S',
            Self::Objective => 'G',
            Self::Concealment => 'C',
            Self::Exit => 'E',
            Self::Danger => 'x',
            Self::Observer => 'W',
        }
    }
}

// order in which a cell picks the tag it is drawn as
const DISPLAY_PRIORITY: [Tag; 7] = [Tag::Observer, Tag::Objective, Tag::Concealment, Tag::Exit, Tag::Start, Tag::Danger, Tag::Empty];

/// The set of [`Tag`]s held by one grid cell.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Cell(u8);

impl Cell {
    /// Whether `tag` is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Every tag on this cell, in declaration order.
    pub fn tags(&self) -> Vec<Tag> {
        Tag::VARIANTS.iter()
            .copied()
            .filter(|tag| self.contains(*tag))
            .collect_vec()
    }

    /// Lethal even while concealed.
    pub fn is_observer(&self) -> bool {
        self.contains(Tag::Observer)
    }

    /// Lethal while not concealed.
    pub fn is_danger_or_observer(&self) -> bool {
        self.contains(Tag::Danger) || self.contains(Tag::Observer)
    }

    /// Holds an [`Objective`](Tag::Objective), [`Concealment`](Tag::Concealment) or [`Exit`](Tag::Exit).
    pub fn has_critical(&self) -> bool {
        self.first_critical().is_some()
    }

    /// The first critical tag present, in declaration order.
    pub fn first_critical(&self) -> Option<Tag> {
        Tag::VARIANTS.iter()
            .copied()
            .find(|tag| tag.is_critical() && self.contains(*tag))
    }

    /// Highest severity among the tags present, or 0 for an untagged cell.
    pub fn severity(&self) -> i8 {
        self.tags().iter().map(Tag::severity).max().unwrap_or(0)
    }

    /// Whether no tag at all has been placed yet. A cell tagged [`Tag::Empty`] is not empty in this sense.
    pub(crate) fn is_untagged(&self) -> bool {
        self.0 == 0
    }

    pub(crate) fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    pub(crate) fn remove(&mut self, tag: Tag) {
        self.0 &= !tag.bit();
    }

    pub(crate) fn symbol(&self) -> char {
        DISPLAY_PRIORITY.iter()
            .find(|tag| self.contains(**tag))
            .map_or(' ', Tag::symbol)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.tags()).finish()
    }
}

impl FromIterator<Tag> for Cell {
    fn from_iter<T: IntoIterator<Item=Tag>>(iter: T) -> Self {
        let mut cell = Self::default();
        for tag in iter {
            cell.insert(tag);
        }
        cell
    }
}
