//! Reproducible stochastic thinning of the spot × scan grid.
//!
//! Every pass over the grid builds its own generator from [`THINNING_SEED`]
//! and draws exactly one value per (spot, scan) pair, in raster order. The
//! counting pass and the assembly pass therefore see the same retain/drop
//! pattern without sharing state, and re-running a file gives the same
//! locations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seed of every thinning pass.
pub const THINNING_SEED: u64 = 42;

/// Order in which (spot, scan) pairs are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterOrder {
    /// Outer loop over spots, inner loop over scans.
    SpotMajor,
    /// Outer loop over scans, inner loop over spots.
    ScanMajor,
}

/// One visited grid position and its thinning decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridVisit {
    pub spot: usize,
    pub scan: usize,
    pub retained: bool,
}

/// Retain/drop decisions for a grid of `n_spots × n_scans` pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReproducibleThinner {
    threshold: Option<f64>,
    order: RasterOrder,
    n_spots: usize,
    n_scans: usize,
}

impl ReproducibleThinner {
    /// A thinner retaining pairs whose draw is strictly above `threshold`.
    pub fn new(threshold: f64, order: RasterOrder, n_spots: usize, n_scans: usize) -> Self {
        Self {
            threshold: Some(threshold),
            order,
            n_spots,
            n_scans,
        }
    }

    /// A thinner that retains every pair and draws nothing.
    pub fn disabled(order: RasterOrder, n_spots: usize, n_scans: usize) -> Self {
        Self {
            threshold: None,
            order,
            n_spots,
            n_scans,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn order(&self) -> RasterOrder {
        self.order
    }

    /// A fresh pass over the grid, with its own generator.
    pub fn visits(&self) -> ThinningPass {
        ThinningPass {
            rng: ChaCha8Rng::seed_from_u64(THINNING_SEED),
            threshold: self.threshold,
            order: self.order,
            n_spots: self.n_spots,
            n_scans: self.n_scans,
            next: 0,
        }
    }

    /// Counting pass: how many pairs are retained.
    pub fn count_retained(&self) -> usize {
        self.visits().filter(|v| v.retained).count()
    }

    /// Retained pairs as `(spot, scan)`, in visit order.
    pub fn retained(&self) -> impl Iterator<Item = (usize, usize)> {
        self.visits()
            .filter(|v| v.retained)
            .map(|v| (v.spot, v.scan))
    }
}

/// Iterator over one pass of the grid. See [`ReproducibleThinner::visits`].
pub struct ThinningPass {
    rng: ChaCha8Rng,
    threshold: Option<f64>,
    order: RasterOrder,
    n_spots: usize,
    n_scans: usize,
    next: usize,
}

impl Iterator for ThinningPass {
    type Item = GridVisit;

    fn next(&mut self) -> Option<GridVisit> {
        if self.next >= self.n_spots * self.n_scans {
            return None;
        }
        let (spot, scan) = match self.order {
            RasterOrder::SpotMajor => (self.next / self.n_scans, self.next % self.n_scans),
            RasterOrder::ScanMajor => (self.next % self.n_spots, self.next / self.n_spots),
        };
        self.next += 1;

        let retained = match self.threshold {
            // One draw per pair, uniform in [0, 1)
            Some(threshold) => self.rng.gen::<f64>() > threshold,
            None => true,
        };

        Some(GridVisit {
            spot,
            scan,
            retained,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_spots * self.n_scans - self.next;
        (remaining, Some(remaining))
    }
}
