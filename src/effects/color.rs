//! Film-like exposure curves and fixed color matrices.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Display value in `[0, 1)` to linear light.
pub fn to_linear(x: f64, exposure: f64, gamma: f64) -> f64 {
    -(-x.powf(gamma)).ln_1p() / exposure
}

/// Linear light back to a display value; inverse of [`to_linear`].
pub fn to_nonlinear(x: f64, exposure: f64, gamma: f64) -> f64 {
    (-(-exposure * x).exp_m1()).powf(1.0 / gamma)
}

/// Exposure/gamma pair, validated once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSpaceConverter {
    exposure: f64,
    gamma: f64,
}

impl ColorSpaceConverter {
    /// Build a converter; both values must be finite and positive.
    pub fn new(exposure: f64, gamma: f64) -> RasterFxResult<Self> {
        if !(exposure.is_finite() && exposure > 0.0) {
            return Err(RasterFxError::validation("exposure must be finite and > 0"));
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(RasterFxError::validation("gamma must be finite and > 0"));
        }
        Ok(Self { exposure, gamma })
    }

    /// [`to_linear`] with this exposure and gamma.
    pub fn to_linear(&self, x: f64) -> f64 {
        to_linear(x, self.exposure, self.gamma)
    }

    /// [`to_nonlinear`] with this exposure and gamma.
    pub fn to_nonlinear(&self, x: f64) -> f64 {
        to_nonlinear(x, self.exposure, self.gamma)
    }

    /// Shared lookup table for integer inputs of `bit_depth` bits.
    pub fn table(&self, bit_depth: u32) -> RasterFxResult<Arc<LinearTable>> {
        LinearTable::shared(bit_depth, self.exposure as f32, self.gamma as f32)
    }
}

/// [`to_linear`] sampled at the centers of `2^bit_depth` equal bins.
///
/// Entry `i` is `to_linear((i + 0.5) / 2^bit_depth)`, so the top code never maps to infinity.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearTable {
    bit_depth: u32,
    table: Box<[f32]>,
}

type TableKey = (u32, u32, u32);

/// Tables kept alive by [`LinearTable::shared`].
pub const TABLE_CACHE_CAPACITY: usize = 8;

static TABLES: Lazy<TableCache> = Lazy::new(|| TableCache::new(TABLE_CACHE_CAPACITY));

/// Bounded cache of linear tables; the least recently used one is evicted first.
///
/// Callers holding an evicted table keep it alive until they drop it.
#[derive(Debug)]
pub struct TableCache {
    capacity: usize,
    /// Most recently used last.
    entries: Mutex<VecDeque<(TableKey, Arc<LinearTable>)>>,
}

impl TableCache {
    /// Build an empty cache holding at most `capacity` tables (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Cached table for these parameters, building it on a miss.
    pub fn get_or_build(
        &self,
        bit_depth: u32,
        exposure: f32,
        gamma: f32,
    ) -> RasterFxResult<Arc<LinearTable>> {
        let key = (bit_depth, exposure.to_bits(), gamma.to_bits());
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RasterFxError::compute("linear table cache poisoned"))?;
        if let Some(i) = entries.iter().position(|(k, _)| *k == key)
            && let Some(entry) = entries.remove(i)
        {
            let table = Arc::clone(&entry.1);
            entries.push_back(entry);
            return Ok(table);
        }
        let table = Arc::new(LinearTable::new(bit_depth, exposure, gamma)?);
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back((key, Arc::clone(&table)));
        tracing::debug!(bit_depth, exposure, gamma, "built linear table");
        Ok(table)
    }

    /// Number of tables currently held.
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Return `true` when no table is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound on [`TableCache::len`].
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl LinearTable {
    /// Sample a fresh table; `bit_depth` must be in `1..=16`.
    pub fn new(bit_depth: u32, exposure: f32, gamma: f32) -> RasterFxResult<Self> {
        if !(1..=16).contains(&bit_depth) {
            return Err(RasterFxError::validation(format!(
                "linear table bit depth must be in 1..=16, got {bit_depth}"
            )));
        }
        let conv = ColorSpaceConverter::new(f64::from(exposure), f64::from(gamma))?;
        let size = 1usize << bit_depth;
        let scale = 1.0 / size as f64;
        let table = (0..size)
            .map(|i| conv.to_linear((i as f64 + 0.5) * scale) as f32)
            .collect();
        Ok(Self { bit_depth, table })
    }

    /// Process-wide table for these parameters, built on first request.
    pub fn shared(bit_depth: u32, exposure: f32, gamma: f32) -> RasterFxResult<Arc<Self>> {
        TABLES.get_or_build(bit_depth, exposure, gamma)
    }

    /// The cache behind [`LinearTable::shared`].
    pub fn shared_cache() -> &'static TableCache {
        &TABLES
    }

    /// Input code width in bits.
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Number of entries, `2^bit_depth`.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Return `true` when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Linear value of an integer code; codes past the end clamp to the last entry.
    pub fn get(&self, code: usize) -> f32 {
        self.table[code.min(self.table.len() - 1)]
    }
}

impl std::ops::Index<usize> for LinearTable {
    type Output = f32;

    fn index(&self, code: usize) -> &f32 {
        &self.table[code]
    }
}

/// Luma of a BGR(A) pixel.
pub fn to_gray(px: [f32; 4]) -> f32 {
    0.306 * px[2] + 0.601 * px[1] + 0.117 * px[0]
}

/// BGR to XYZ; alpha passes through.
pub fn to_xyz(bgra: [f32; 4]) -> [f32; 4] {
    let [b, g, r, a] = bgra;
    [
        0.6069 * r + 0.1735 * g + 0.2003 * b,
        0.2989 * r + 0.5866 * g + 0.1145 * b,
        0.0000 * r + 0.0661 * g + 1.1162 * b,
        a,
    ]
}

/// XYZ to BGR; alpha passes through.
pub fn to_bgr(xyza: [f32; 4]) -> [f32; 4] {
    let [x, y, z, a] = xyza;
    [
        0.0585 * x - 0.1187 * y + 0.9017 * z,
        -0.9844 * x + 1.9985 * y - 0.0279 * z,
        1.9104 * x - 0.5338 * y - 0.2891 * z,
        a,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
