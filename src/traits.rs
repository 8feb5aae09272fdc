use rand::Rng;

/// A random source the simulator can draw from.
/// Any `rand` generator qualifies; seeded generators give reproducible draws.
pub trait RandomSource: Rng {}

// Blanket implementation for every rand generator
impl<R> RandomSource for R where R: Rng + ?Sized {}
