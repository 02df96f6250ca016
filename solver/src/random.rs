use anyhow::{bail, Result};
use cloakpath::{Grid, Location};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::Rng,
};
use tracing::trace;

// every placement failing this often means the parameters admit no valid grid
const MAX_ATTEMPTS: usize = 10_000;

fn random_location(rng: &mut ChaCha8Rng, size: usize) -> Location {
    let row = rng.next_u64() as usize % size;
    let col = rng.next_u64() as usize % size;
    Location(row, col)
}

/// Draw coordinates until they form a valid grid whose exit differs from its objective.
///
/// Coordinates are returned in input order: start, observer 1, observer 2, objective, concealment, exit.
pub fn random_grid(rng: &mut ChaCha8Rng, size: usize, radii: (usize, usize)) -> Result<(Grid, [Location; 6])> {
    if size == 0 {
        bail!("cannot place anything on an empty grid");
    }

    for attempt in 0..MAX_ATTEMPTS {
        let coords: [Location; 6] = std::array::from_fn(|_| random_location(rng, size));
        let [start, observer1, observer2, objective, concealment, exit] = coords;
        if exit == objective {
            continue;
        }

        match Grid::new(size, radii.0, radii.1, start, observer1, observer2, objective, concealment, exit) {
            Ok(grid) => return Ok((grid, coords)),
            Err(reason) => trace!(attempt, %reason, "rejected random grid"),
        }
    }

    bail!("no valid {size}x{size} grid found after {MAX_ATTEMPTS} attempts")
}
