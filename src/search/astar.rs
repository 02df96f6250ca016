use itertools::Itertools;
use ndarray::Array2;
use tracing::trace;

use crate::error::Captured;
use crate::grid::Grid;
use crate::location::Location;
use crate::perception::DetectedDanger;
use crate::search::{arrive, begin_leg, finish_leg, restore_path, LegRequest, PathFinder};

/// Estimate of the remaining distance used to order the open list.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Heuristic {
    /// Straight-line distance.
    ///
    /// Diagonal moves cost the same as straight ones, so this overestimates and the resulting path is not always the shortest.
    #[default]
    Euclidean,
    /// King-move distance. Exact on an open board, so paths are always of minimum step count.
    Chebyshev,
}

impl Heuristic {
    fn estimate(&self, from: Location, to: Location) -> f64 {
        match self {
            Self::Euclidean => from.euclidean(to),
            Self::Chebyshev => from.chebyshev(to) as f64,
        }
    }
}

/// Best-first search guided by a [`Heuristic`] toward the target's position.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStar {
    /// Distance estimate used for ordering.
    pub heuristic: Heuristic,
}

impl AStar {
    /// Construct a new [`Self`] using `heuristic`.
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    fn search(&self, grid: &Grid, request: &LegRequest, goal: Location, detected: &mut DetectedDanger, expanded: &mut usize) -> Result<Option<Vec<Location>>, Captured> {
        let size = grid.size();
        let mut g = Array2::from_elem((size, size), 0usize);
        let mut h = Array2::from_elem((size, size), 0f64);
        let mut in_open = Array2::from_elem((size, size), false);
        let mut closed = Array2::from_elem((size, size), false);
        let mut previous = Array2::from_elem((size, size), None);

        // insertion order breaks ties between equal estimates
        let mut open = vec![request.start];
        in_open[request.start.as_index()] = true;
        h[request.start.as_index()] = self.heuristic.estimate(request.start, goal);

        let f = |g: &Array2<usize>, h: &Array2<f64>, location: &Location| g[location.as_index()] as f64 + h[location.as_index()];

        while let Some(best) = open.iter().position_min_by(|a, b| f(&g, &h, a).total_cmp(&f(&g, &h, b))) {
            let current = open.remove(best);
            in_open[current.as_index()] = false;
            closed[current.as_index()] = true;

            if !arrive(grid, current, request, detected)? {
                continue;
            }

            if current == goal {
                return Ok(Some(restore_path(&previous, current)));
            }

            *expanded += 1;
            let cost = g[current.as_index()] + 1;
            for (_, neighbor) in grid.neighbors(current) {
                let index = neighbor.as_index();
                if closed[index] {
                    continue;
                }

                if in_open[index] {
                    if cost < g[index] {
                        g[index] = cost;
                        previous[index] = Some(current);
                    }
                } else {
                    g[index] = cost;
                    h[index] = self.heuristic.estimate(neighbor, goal);
                    previous[index] = Some(current);
                    in_open[index] = true;
                    open.push(neighbor);
                }
            }

            trace!(%current, open = open.len(), "expanded");
        }

        Ok(None)
    }
}

impl PathFinder for AStar {
    fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured> {
        if !begin_leg(grid, request, detected, self.name()) {
            return Ok(None);
        }

        let Some(goal) = grid.position_of(request.target) else {
            return Ok(None);
        };

        let mut expanded = 0;
        let path = self.search(grid, request, goal, detected, &mut expanded)?;
        finish_leg(self.name(), expanded, &path);
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "astar"
    }
}
