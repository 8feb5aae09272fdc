use crate::traits::RandomSource;

/// Multiplicative perturbation `1 + U(-½, ½) × 2w`, uniform on `[1 - w, 1 + w)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    half_width: f64,
}

impl Perturbation {
    /// Creates a perturbation with fractional half-width `half_width`.
    ///
    /// # Example
    /// ```rust
    /// use optiweight::distributions::Perturbation;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let thirty_percent = Perturbation::new(0.3);
    /// let factor = thirty_percent.sample(&mut StdRng::seed_from_u64(1));
    /// assert!((0.7..1.3).contains(&factor));
    /// ```
    #[must_use]
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Draws one multiplicative factor.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        let centred = rng.random::<f64>() - 0.5;
        1.0 + centred * self.half_width * 2.0
    }

    /// Applies a fresh factor to `value`.
    pub fn perturb<R: RandomSource + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        value * self.sample(rng)
    }
}
