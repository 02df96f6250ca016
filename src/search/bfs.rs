use std::collections::VecDeque;

use ndarray::Array2;
use tracing::trace;

use crate::error::Captured;
use crate::grid::Grid;
use crate::location::Location;
use crate::perception::DetectedDanger;
use crate::search::{arrive, begin_leg, finish_leg, is_safe, restore_path, LegRequest, PathFinder};

/// Uninformed level-order search. Always finds a path of minimum step count, if any exists.
#[derive(Copy, Clone, Debug, Default)]
pub struct BreadthFirst;

impl BreadthFirst {
    fn search(grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger, expanded: &mut usize) -> Result<Option<Vec<Location>>, Captured> {
        let size = grid.size();
        let mut visited = Array2::from_elem((size, size), false);
        let mut previous = Array2::from_elem((size, size), None);
        let mut queue = VecDeque::from([request.start]);
        visited[request.start.as_index()] = true;

        while let Some(current) = queue.pop_front() {
            if !arrive(grid, current, request, detected)? {
                continue;
            }

            if grid.cell(current).contains(request.target) {
                return Ok(Some(restore_path(&previous, current)));
            }

            *expanded += 1;
            for (_, neighbor) in grid.neighbors(current) {
                if visited[neighbor.as_index()] {
                    continue;
                }

                visited[neighbor.as_index()] = true;
                previous[neighbor.as_index()] = Some(current);
                queue.push_back(neighbor);

                // nothing queued later can be closer
                if grid.cell(neighbor).contains(request.target) && is_safe(grid, neighbor, request.concealed) {
                    return Ok(Some(restore_path(&previous, neighbor)));
                }
            }

            trace!(%current, queued = queue.len(), "expanded");
        }

        Ok(None)
    }
}

impl PathFinder for BreadthFirst {
    fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured> {
        if !begin_leg(grid, request, detected, self.name()) {
            return Ok(None);
        }

        let mut expanded = 0;
        let path = Self::search(grid, request, detected, &mut expanded)?;
        finish_leg(self.name(), expanded, &path);
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "bfs"
    }
}
