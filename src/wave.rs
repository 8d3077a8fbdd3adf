use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::param::Param;

/// Frame rate used when a layer does not ask for a usable one.
pub const DEFAULT_TARGET_FPS: f64 = 30.0;

/// Shape parameters for a single wave layer
#[derive(Debug, Clone)]
pub struct WaveShapeParameters {
    /// Number of segments across the container. Fractional counts are kept
    /// as-is: the last sample sits at the largest whole index not above it.
    pub point_count: f64,
    pub amplitude: Param,
    pub base_height: Param,
    pub speed: Param,
    /// Frozen layers keep their elapsed time while the frame loop runs on.
    pub paused: bool,
    pub target_fps: f64,
}

impl Default for WaveShapeParameters {
    fn default() -> Self {
        Self {
            point_count: 3.0,
            amplitude: Param::Constant(10.0),
            base_height: Param::Constant(50.0),
            speed: Param::Constant(0.1),
            paused: false,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl WaveShapeParameters {
    /// Minimum time between accepted frames, in milliseconds.
    ///
    /// Non-positive or non-finite frame rates fall back to [`DEFAULT_TARGET_FPS`].
    pub fn frame_interval_ms(&self) -> f64 {
        let fps = if self.target_fps.is_finite() && self.target_fps > 0.0 {
            self.target_fps
        } else {
            DEFAULT_TARGET_FPS
        };
        1000.0 / fps
    }
}

/// One generated layer of a parallax stack
#[derive(Debug, Clone)]
pub struct LayerSpec {
    /// Seed for this layer's noise field.
    pub seed: f64,
    /// 0 is the front layer.
    pub depth: usize,
    pub params: WaveShapeParameters,
}

/// Generate a stack of wave layers from one master seed.
///
/// Every layer gets its own explicit noise seed. Deeper layers are calmer:
/// smaller amplitude, slower drift and a baseline pushed further down.
pub fn generate_layers(
    count: usize,
    point_count: f64,
    base_amplitude: f64,
    base_height: f64,
    base_speed: f64,
    seed: u64,
) -> Vec<LayerSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut layers = Vec::with_capacity(count);

    for depth in 0..count {
        let d = depth as f64;

        // Amplitude decays with depth, jittered so layers never line up
        let amplitude = base_amplitude * f64::exp(-0.3 * d) * rng.gen_range(0.8..1.2);

        // Further layers drift slower
        let speed = base_speed / (1.0 + d * 0.5);

        let height = base_height * (1.0 + d * 0.25);

        let layer_seed = f64::from(rng.gen::<u32>());

        layers.push(LayerSpec {
            seed: layer_seed,
            depth,
            params: WaveShapeParameters {
                point_count,
                amplitude: Param::Constant(amplitude),
                base_height: Param::Constant(height),
                speed: Param::Constant(speed),
                ..WaveShapeParameters::default()
            },
        });
    }

    layers
}
