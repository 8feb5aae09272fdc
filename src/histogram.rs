#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use serde::Serialize;
use std::num::NonZeroUsize;

/// One equal-width bin: `[lower, upper)`, the last bin closed on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Bin {
    /// Bin edges rounded to whole currency units, e.g. `"1200–1350"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:.0}–{:.0}", self.lower, self.upper)
    }
}

/// Binned frequency table over the range of a set of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    bins: Vec<Bin>,
    total: usize,
}

impl Histogram {
    /// Partitions `values` into `bin_count` equal-width bins spanning
    /// `[min, max]` of the finite values.
    ///
    /// Every value is counted: when the range has zero width all values land in
    /// the first bin, and non-finite values are clamped to the outer bins.
    ///
    /// # Example
    /// ```rust
    /// use optiweight::histogram::Histogram;
    /// use std::num::NonZeroUsize;
    ///
    /// let bins = NonZeroUsize::new(2).unwrap();
    /// let histogram = Histogram::from_values(&[0.0, 1.0, 3.0, 4.0], bins);
    /// let counts: Vec<usize> = histogram.bins().iter().map(|b| b.count).collect();
    /// assert_eq!(counts, vec![2, 2]);
    /// ```
    #[must_use]
    pub fn from_values(values: &[f64], bin_count: NonZeroUsize) -> Self {
        let bin_count = bin_count.get();
        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range: Option<(f64, f64)>, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 0.0));

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| Bin {
                lower: min + i as f64 * width,
                upper: if i + 1 == bin_count {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count: 0,
            })
            .collect();

        for &value in values {
            let index = if width > 0.0 {
                // NaN casts to 0; +inf saturates and is clamped to the last bin.
                (((value - min) / width).floor() as usize).min(bin_count - 1)
            } else {
                0
            };
            bins[index].count += 1;
        }

        Self {
            bins,
            total: values.len(),
        }
    }

    #[must_use]
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of values binned; always the sum of the bin counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// `(label, count)` pairs in bin order.
    #[must_use]
    pub fn labelled_counts(&self) -> Vec<(String, usize)> {
        self.bins.iter().map(|bin| (bin.label(), bin.count)).collect()
    }

    /// Count of the fullest bin.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}
