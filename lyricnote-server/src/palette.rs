//! Comment highlight colors
//!
//! New comments get a color from a fixed palette. The choice goes through
//! [`ColorSource`] so tests can pin it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Highlight palette (red, orange, yellow, green, blue)
pub const COMMENT_COLORS: [&str; 5] = [
    "rgba(255, 154, 162, 0.7)",
    "rgba(255, 183, 107, 0.7)",
    "rgba(255, 229, 127, 0.7)",
    "rgba(142, 223, 168, 0.7)",
    "rgba(131, 203, 238, 0.7)",
];

/// Picks the color for a new comment
pub trait ColorSource: Send + Sync {
    fn pick(&self) -> &'static str;
}

/// Uniform random choice from [`COMMENT_COLORS`]
pub struct RandomColors {
    rng: Mutex<StdRng>,
}

impl RandomColors {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ColorSource for RandomColors {
    fn pick(&self) -> &'static str {
        let index = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..COMMENT_COLORS.len()),
            // A poisoned lock only means another picker panicked mid-draw
            Err(poisoned) => poisoned.into_inner().gen_range(0..COMMENT_COLORS.len()),
        };
        COMMENT_COLORS[index]
    }
}

/// Always returns the same palette entry
pub struct FixedColor(pub usize);

impl ColorSource for FixedColor {
    fn pick(&self) -> &'static str {
        COMMENT_COLORS[self.0 % COMMENT_COLORS.len()]
    }
}
