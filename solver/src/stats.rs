use std::fmt::{Display, Formatter};
use std::time::Duration;

use cloakpath::{Captured, Route};

/// How one game ended.
#[derive(Debug)]
pub enum Outcome {
    /// The agent reached the exit.
    Escaped(Route),
    /// Every scenario was impossible.
    NoRoute,
    /// The agent was caught.
    Captured(Captured),
}

impl From<Result<Option<Route>, Captured>> for Outcome {
    fn from(value: Result<Option<Route>, Captured>) -> Self {
        match value {
            Ok(Some(route)) => Self::Escaped(route),
            Ok(None) => Self::NoRoute,
            Err(captured) => Self::Captured(captured),
        }
    }
}

/// Tally of outcomes and running times over many games with one strategy.
#[derive(Debug, Default)]
pub struct Stats {
    wins: usize,
    losses: usize,
    no_route: usize,
    millis: Vec<f64>,
}

impl Stats {
    pub fn record(&mut self, outcome: &Outcome, elapsed: Duration) {
        match outcome {
            Outcome::Escaped(_) => self.wins += 1,
            Outcome::Captured(_) => self.losses += 1,
            Outcome::NoRoute => self.no_route += 1,
        }
        self.millis.push(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn games(&self) -> usize {
        self.millis.len()
    }

    pub fn mean(&self) -> f64 {
        if self.millis.is_empty() {
            return 0.0;
        }
        self.millis.iter().sum::<f64>() / self.millis.len() as f64
    }

    /// Sample variance, zero for fewer than two games.
    pub fn variance(&self) -> f64 {
        if self.millis.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.millis.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (self.millis.len() - 1) as f64
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "games: {}, wins: {}, captured: {}, no route: {}, mean time: {:.3} ms, variance: {:.3} ms^2",
            self.games(),
            self.wins,
            self.losses,
            self.no_route,
            self.mean(),
            self.variance(),
        )
    }
}
