use std::collections::HashSet;

use itertools::Itertools;
use strum::VariantArray;
use tracing::{debug, warn};

use crate::cell::Tag;
use crate::error::Captured;
use crate::grid::Grid;
use crate::location::Location;
use crate::perception::{DetectedDanger, Perception};
use crate::search::{LegRequest, PathFinder};

/// An ordering of the waypoints visited after leaving the start.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, VariantArray, strum::Display)]
pub enum Scenario {
    /// Objective, then exit.
    Direct,
    /// Concealment, then objective, then exit.
    ConcealmentFirst,
    /// Objective, then concealment, then exit.
    ConcealmentSecond,
}

impl Scenario {
    /// The targets of each leg, in order.
    pub fn waypoints(&self) -> &'static [Tag] {
        match self {
            Self::Direct => &[Tag::Objective, Tag::Exit],
            Self::ConcealmentFirst => &[Tag::Concealment, Tag::Objective, Tag::Exit],
            Self::ConcealmentSecond => &[Tag::Objective, Tag::Concealment, Tag::Exit],
        }
    }
}

/// One leg of a [`Route`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leg {
    /// What this leg was heading for.
    pub target: Tag,
    /// Every cell walked, both ends included.
    pub path: Vec<Location>,
}

impl Leg {
    /// Number of moves made on this leg.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// A complete route from the start to the exit, as chosen by a [`ScenarioSolver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    scenario: Scenario,
    legs: Vec<Leg>,
}

impl Route {
    /// The ordering this route follows.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Each leg in order. Every leg begins where the previous one ended.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Total number of moves over every leg.
    pub fn steps(&self) -> usize {
        self.legs.iter().map(Leg::steps).sum()
    }

    /// Every leg's path in order.
    pub fn into_legs(self) -> Vec<Vec<Location>> {
        self.legs.into_iter().map(|leg| leg.path).collect_vec()
    }
}

/// Tries every [`Scenario`] leg by leg with one strategy and keeps the route with the fewest total steps.
///
/// Scenarios found to be impossible are remembered and skipped by later calls to [`solve`](Self::solve).
pub struct ScenarioSolver<'g> {
    grid: &'g Grid,
    perception: Perception,
    infeasible: HashSet<Scenario>,
}

impl<'g> ScenarioSolver<'g> {
    /// Construct a new [`Self`] over `grid`.
    pub fn new(grid: &'g Grid, perception: Perception) -> Self {
        Self {
            grid,
            perception,
            infeasible: HashSet::with_capacity(Scenario::VARIANTS.len()),
        }
    }

    /// Whether `scenario` has been found impossible by an earlier run.
    pub fn is_infeasible(&self, scenario: Scenario) -> bool {
        self.infeasible.contains(&scenario)
    }

    /// Walk a single scenario with `finder`, starting from the grid's start cell with no danger perceived.
    ///
    /// Returns `Ok(None)` if any leg has no path, marking the scenario infeasible unless `finder` was cancelled.
    pub fn evaluate<F: PathFinder + ?Sized>(&mut self, scenario: Scenario, finder: &F) -> Result<Option<Route>, Captured> {
        let mut detected = DetectedDanger::new();
        let mut at = self.grid.start();
        let mut concealed = false;
        let mut legs = Vec::with_capacity(scenario.waypoints().len());

        for (index, target) in scenario.waypoints().iter().enumerate() {
            let request = LegRequest::new(at, *target, self.perception)
                .concealed(concealed)
                .reset_detection(index == 0);

            let Some(path) = finder.find_path(self.grid, &request, &mut detected)? else {
                if finder.is_cancelled() {
                    debug!(%scenario, %target, strategy = finder.name(), "leg cancelled");
                } else {
                    debug!(%scenario, %target, strategy = finder.name(), "scenario infeasible");
                    self.infeasible.insert(scenario);
                }
                return Ok(None);
            };

            if let Some(end) = path.last() {
                at = *end;
            }
            if *target == Tag::Concealment {
                concealed = true;
            }
            legs.push(Leg { target: *target, path });
        }

        let route = Route { scenario, legs };
        debug!(%scenario, steps = route.steps(), strategy = finder.name(), "scenario evaluated");
        Ok(Some(route))
    }

    /// Evaluate every scenario not known to be infeasible, in declaration order, returning the route with the fewest steps.
    /// Ties keep the earlier scenario.
    ///
    /// Returns `Ok(None)` if no scenario succeeds. A capture on any leg aborts the whole solve.
    pub fn solve<F: PathFinder + ?Sized>(&mut self, finder: &F) -> Result<Option<Route>, Captured> {
        let mut best: Option<Route> = None;

        for scenario in Scenario::VARIANTS {
            if self.is_infeasible(*scenario) {
                continue;
            }

            let route = self.evaluate(*scenario, finder).inspect_err(|captured| {
                warn!(%scenario, at = %captured.at, strategy = finder.name(), "captured, aborting solve");
            })?;

            if let Some(route) = route {
                if best.as_ref().map_or(true, |best| route.steps() < best.steps()) {
                    best = Some(route);
                }
            }
        }

        Ok(best)
    }
}

/// Shorthand for a single [`ScenarioSolver::solve`] on a fresh solver.
pub fn solve<F: PathFinder + ?Sized>(grid: &Grid, perception: Perception, finder: &F) -> Result<Option<Route>, Captured> {
    ScenarioSolver::new(grid, perception).solve(finder)
}
