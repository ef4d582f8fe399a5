//! Limb-darkening coefficient grid and trilinear lookup.
//!
//! The reference table samples the coefficient on a regular 3-D grid:
//!
//! ```text
//! teff  : 3500, 3600, ..., 6900   (35 nodes)
//! logg  : 3.0,  3.1,  ..., 4.9    (20 nodes)
//! [M/H] : -0.5, -0.4, ..., 0.5    (11 nodes)
//! ```
//!
//! Interpolation inside the volume is `interpn`'s multilinear rectilinear
//! method. Queries outside the tabulated range return
//! [`FALLBACK_COEFFICIENT`] instead of extrapolating.

use interpn::multilinear::rectilinear;
use tracing::warn;

use crate::error::AppError;

/// Coefficient returned for any query outside the tabulated range.
pub const FALLBACK_COEFFICIENT: f64 = 0.6;

pub const TEFF_NODES: usize = 35;
pub const LOGG_NODES: usize = 20;
pub const MH_NODES: usize = 11;

/// Number of rows the reference table must contain.
pub const GRID_SIZE: usize = TEFF_NODES * LOGG_NODES * MH_NODES;

/// One uniformly spaced grid axis.
///
/// Node values are computed as `(origin + i) / scale` from integers so that
/// e.g. `4.9` is the nearest double to 4.9 and not the result of nineteen
/// additions of `0.1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    fn scaled(origin: i32, count: usize, stride: i32, scale: f64) -> Self {
        let values = (0..count as i32)
            .map(|i| f64::from(origin + i * stride) / scale)
            .collect();
        Self { values }
    }

    pub fn temperature() -> Self {
        Self::scaled(3500, TEFF_NODES, 100, 1.0)
    }

    pub fn surface_gravity() -> Self {
        Self::scaled(30, LOGG_NODES, 1, 10.0)
    }

    pub fn metallicity() -> Self {
        Self::scaled(-5, MH_NODES, 1, 10.0)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Inclusive range check. NaN is never in range.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min() && x <= self.max()
    }
}

/// Immutable limb-darkening coefficient volume.
///
/// Storage is flat, row-major, temperature outermost and metallicity
/// innermost, matching the row order of the reference table and the layout
/// `interpn` expects.
#[derive(Debug, Clone)]
pub struct LimbDarkeningGrid {
    teff: Axis,
    logg: Axis,
    mh: Axis,
    values: Vec<f64>,
}

impl LimbDarkeningGrid {
    /// Build the grid from the flattened coefficient column.
    ///
    /// Fails unless exactly [`GRID_SIZE`] finite values are supplied.
    pub fn from_values(values: Vec<f64>) -> Result<Self, AppError> {
        if values.len() != GRID_SIZE {
            return Err(AppError::new(
                3,
                format!(
                    "Limb-darkening table has {} rows; expected {GRID_SIZE} \
                     ({TEFF_NODES} teff x {LOGG_NODES} logg x {MH_NODES} [M/H]).",
                    values.len()
                ),
            ));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(AppError::new(
                3,
                format!("Limb-darkening table value #{} is not finite.", idx + 1),
            ));
        }

        Ok(Self {
            teff: Axis::temperature(),
            logg: Axis::surface_gravity(),
            mh: Axis::metallicity(),
            values,
        })
    }

    /// Stored coefficient at node `[ti][gi][mi]`.
    pub fn value_at(&self, ti: usize, gi: usize, mi: usize) -> f64 {
        self.values[(ti * LOGG_NODES + gi) * MH_NODES + mi]
    }

    /// Whether the query would be interpolated rather than answered with the
    /// fallback.
    pub fn in_range(&self, teff: f64, logg: f64, mh: f64) -> bool {
        self.teff.contains(teff) && self.logg.contains(logg) && self.mh.contains(mh)
    }

    /// Limb-darkening coefficient for `(teff, logg, [M/H])`.
    ///
    /// Axes are checked in order temperature, gravity, metallicity; the first
    /// one out of range short-circuits to [`FALLBACK_COEFFICIENT`]. `interpn`
    /// would extrapolate, so nothing out of range may reach it.
    pub fn coefficient_for(&self, teff: f64, logg: f64, mh: f64) -> f64 {
        if !self.teff.contains(teff) {
            return FALLBACK_COEFFICIENT;
        }
        if !self.logg.contains(logg) {
            return FALLBACK_COEFFICIENT;
        }
        if !self.mh.contains(mh) {
            return FALLBACK_COEFFICIENT;
        }

        let grids = [self.teff.values(), self.logg.values(), self.mh.values()];
        let (t, g, m) = ([teff], [logg], [mh]);
        let obs = [&t[..], &g[..], &m[..]];
        let mut out = [0.0];
        match rectilinear::interpn(&grids, &self.values, &obs, &mut out) {
            Ok(()) => out[0],
            Err(err) => {
                // Only reachable if the axes and the value count disagree.
                warn!(?err, teff, logg, mh, "limb-darkening interpolation failed");
                FALLBACK_COEFFICIENT
            }
        }
    }
}
