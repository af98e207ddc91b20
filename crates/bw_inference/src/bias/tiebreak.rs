//! Randomness used by the keyword scorer when it has no signal to go on.
//!
//! The keyword tier historically nudged signal-free articles toward a mild
//! lean some of the time. That is kept, but only through an injected
//! `TieBreaker`, so callers choose between the randomized behavior and a
//! fully deterministic scorer.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance of leaning away from center when the randomized tie-break is on.
pub const DEFAULT_LEAN_PROBABILITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Center,
    Left,
    Right,
}

pub trait TieBreaker: Send + Sync + fmt::Debug {
    fn lean(&self) -> Lean;
}

/// Always stays at center.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTieBreak;

impl TieBreaker for NoTieBreak {
    fn lean(&self) -> Lean {
        Lean::Center
    }
}

/// Always returns the same lean.
#[derive(Debug, Clone, Copy)]
pub struct FixedTieBreak(pub Lean);

impl TieBreaker for FixedTieBreak {
    fn lean(&self) -> Lean {
        self.0
    }
}

/// Leans left or right (evenly) with the given probability, else center.
#[derive(Debug)]
pub struct RandomTieBreak {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomTieBreak {
    pub fn new(probability: f64) -> Self {
        Self::from_rng(probability, StdRng::from_entropy())
    }

    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::from_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn from_rng(probability: f64, rng: StdRng) -> Self {
        Self {
            probability: if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 },
            rng: Mutex::new(rng),
        }
    }
}

impl TieBreaker for RandomTieBreak {
    fn lean(&self) -> Lean {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        if !rng.gen_bool(self.probability) {
            return Lean::Center;
        }
        if rng.gen_bool(0.5) {
            Lean::Left
        } else {
            Lean::Right
        }
    }
}

/// Configuration-level choice of tie-break behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TieBreakMode {
    Random { probability: f64 },
    Off,
}

impl Default for TieBreakMode {
    fn default() -> Self {
        Self::Random {
            probability: DEFAULT_LEAN_PROBABILITY,
        }
    }
}

impl TieBreakMode {
    pub fn build(&self) -> Arc<dyn TieBreaker> {
        match *self {
            Self::Random { probability } => Arc::new(RandomTieBreak::new(probability)),
            Self::Off => Arc::new(NoTieBreak),
        }
    }
}

impl FromStr for TieBreakMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "random" => Ok(Self::default()),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|p| (0.0..=1.0).contains(p))
                .map(|probability| Self::Random { probability })
                .ok_or_else(|| format!("Invalid tie-break mode: {} (use off, random, or a probability)", s)),
        }
    }
}
