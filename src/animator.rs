//! Noise sampling and path synthesis for one wave layer.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use glam::DVec2;
use tracing::{debug, trace};

use crate::noise::NoiseField;
use crate::path::{build_path, WavePath};
use crate::wave::WaveShapeParameters;

/// Divisor between sample seeds and noise-space coordinates.
const NOISE_SCALE: f64 = 100.0;
/// Phase advances by pi per this many elapsed milliseconds.
const PHASE_SCALE: f64 = 1000.0;
/// Upper bound on memoized noise lookups before the cache is reset.
const CACHE_CAPACITY: usize = 1024;
const MAX_PREALLOCATED_POINTS: usize = 4096;

/// Turns a [`NoiseField`] and a layer's shape parameters into a wave outline.
///
/// The container size is pushed in from outside via [`WaveAnimator::resize`];
/// until it is measured the animator produces empty paths.
#[derive(Debug)]
pub struct WaveAnimator {
    noise: Arc<NoiseField>,
    params: WaveShapeParameters,
    width: f64,
    height: f64,
    edge_bleed: f64,
    elapsed_ms: f64,
    path: WavePath,
    cache: NoiseCache,
}

impl WaveAnimator {
    pub fn new(noise: Arc<NoiseField>, params: WaveShapeParameters) -> Self {
        Self {
            noise,
            params,
            width: 0.0,
            height: 0.0,
            edge_bleed: 0.0,
            elapsed_ms: 0.0,
            path: WavePath::empty(),
            cache: NoiseCache::default(),
        }
    }

    /// Extend the closing corners this far outside the container.
    pub fn with_edge_bleed(mut self, bleed: f64) -> Self {
        self.edge_bleed = bleed;
        self
    }

    /// Record the latest container measurement.
    pub fn resize(&mut self, width: f64, height: f64) {
        debug!(width, height, "wave container resized");
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn params(&self) -> &WaveShapeParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut WaveShapeParameters {
        &mut self.params
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.params.paused = paused;
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Elapsed time of the last rendered frame.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// The most recently built path.
    pub fn path(&self) -> &WavePath {
        &self.path
    }

    /// Render the frame for `elapsed_ms` of animation time.
    ///
    /// The result depends only on `elapsed_ms`, the current parameter values
    /// and the container size, so repeating a call reproduces the same path.
    pub fn on_frame(&mut self, elapsed_ms: f64) -> &WavePath {
        self.elapsed_ms = elapsed_ms;
        self.redraw()
    }

    /// Rebuild the path at the current elapsed time, re-reading parameters.
    pub fn redraw(&mut self) -> &WavePath {
        let points = self.sample_points(self.elapsed_ms);
        self.path = build_path(&points, self.width, self.height, self.edge_bleed);
        trace!(
            elapsed_ms = self.elapsed_ms,
            points = points.len(),
            "wave path rebuilt"
        );
        &self.path
    }

    /// Sample the wave at `elapsed_ms`.
    ///
    /// Returns no points until the container has a positive size, or when the
    /// point count is not a positive finite number.
    pub fn sample_points(&mut self, elapsed_ms: f64) -> Vec<DVec2> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Vec::new();
        }
        let point_count = self.params.point_count;
        if !(point_count.is_finite() && point_count > 0.0) {
            return Vec::new();
        }

        let speed = self.params.speed.resolve();
        let base_height = self.params.base_height.resolve();
        let amplitude = self.params.amplitude.resolve();

        let phase = elapsed_ms * PI / PHASE_SCALE;
        let segment_width = self.width / point_count;
        let step_factor = (speed / NOISE_SCALE) * segment_width;

        let capacity = (point_count as usize).saturating_add(1).min(MAX_PREALLOCATED_POINTS);
        let mut points = Vec::with_capacity(capacity);

        let mut i = 0.0;
        while i <= point_count {
            let seed = phase * i + step_factor;
            let value = self.cache.sample(&self.noise, seed / NOISE_SCALE, 1.0);
            points.push(DVec2::new(i * segment_width, value * amplitude + base_height));
            i += 1.0;
        }

        points
    }
}

/// Bounded memo of `gradient_noise2` lookups keyed by exact coordinate bits.
#[derive(Debug, Default)]
struct NoiseCache {
    entries: HashMap<(u64, u64), f64>,
}

impl NoiseCache {
    fn sample(&mut self, noise: &NoiseField, x: f64, y: f64) -> f64 {
        let key = (x.to_bits(), y.to_bits());
        if let Some(&value) = self.entries.get(&key) {
            return value;
        }

        let value = noise.gradient_noise2(x, y);
        if self.entries.len() >= CACHE_CAPACITY {
            self.entries.clear();
        }
        self.entries.insert(key, value);
        value
    }
}
