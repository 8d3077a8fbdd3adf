//! Scene descriptions: a container plus a stack of wave layers.
//!
//! Scenes are either loaded from YAML or generated from a master seed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animator::WaveAnimator;
use crate::export::{Frame, FrameLayer};
use crate::noise::{seed_key, NoiseField};
use crate::param::{Interpolated, LiveValue, Param};
use crate::scheduler::{FrameLoop, ManualHost};
use crate::wave::{generate_layers, WaveShapeParameters, DEFAULT_TARGET_FPS};

/// Errors raised while loading or validating a scene
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid scene: {0}")]
    Invalid(String),
}

/// A layer value that is either fixed or follows scroll progress.
///
/// In YAML this is either a plain number or `{ from: .., to: .. }`, where
/// `from` applies at the top of the page and `to` at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    Fixed(f64),
    Scroll { from: f64, to: f64 },
}

impl ValueSpec {
    pub fn to_param(self, scroll: &LiveValue) -> Param {
        match self {
            ValueSpec::Fixed(value) => Param::Constant(value),
            ValueSpec::Scroll { from, to } => {
                Interpolated::new(scroll.clone(), (0.0, 1.0), (from, to)).into()
            }
        }
    }

    fn is_finite(self) -> bool {
        match self {
            ValueSpec::Fixed(value) => value.is_finite(),
            ValueSpec::Scroll { from, to } => from.is_finite() && to.is_finite(),
        }
    }
}

/// One wave layer of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Noise seed; every layer names its own.
    pub seed: f64,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: ValueSpec,
    #[serde(default = "default_height")]
    pub height: ValueSpec,
    #[serde(default = "default_speed")]
    pub speed: ValueSpec,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "default_fill")]
    pub fill: String,
}

fn default_points() -> f64 {
    3.0
}

fn default_amplitude() -> ValueSpec {
    ValueSpec::Fixed(10.0)
}

fn default_height() -> ValueSpec {
    ValueSpec::Fixed(50.0)
}

fn default_speed() -> ValueSpec {
    ValueSpec::Fixed(0.1)
}

fn default_fps() -> f64 {
    DEFAULT_TARGET_FPS
}

fn default_fill() -> String {
    "#0077be".to_string()
}

/// Largest accepted `points` per layer.
pub const MAX_LAYER_POINTS: f64 = 4096.0;

fn default_display_hz() -> f64 {
    60.0
}

fn default_duration_ms() -> f64 {
    2000.0
}

/// Container, timing and layers. Layers are painted in order, back first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    /// Simulated display refresh rate driving the frame loops.
    #[serde(default = "default_display_hz")]
    pub display_hz: f64,
    /// Scroll progress runs from 0 to 1 over this span.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default)]
    pub edge_bleed: f64,
    pub layers: Vec<LayerConfig>,
}

/// Per-layer starting values for generated scenes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTemplate {
    pub points: f64,
    pub amplitude: f64,
    pub height: f64,
    pub speed: f64,
    pub fps: f64,
}

impl Default for LayerTemplate {
    fn default() -> Self {
        Self {
            points: 3.0,
            amplitude: 10.0,
            height: 50.0,
            speed: 0.1,
            fps: DEFAULT_TARGET_FPS,
        }
    }
}

/// A ready-to-run layer
#[derive(Debug)]
pub struct SceneLayer {
    pub fill: String,
    pub animator: WaveAnimator,
}

impl Scene {
    /// Read and validate a YAML scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_yaml(&content)?;
        debug!(path = %path.display(), layers = scene.layers.len(), "scene loaded");
        Ok(scene)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_yaml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Build a parallax stack from one master seed.
    ///
    /// While scrolling, every layer's wave grows and its baseline rises;
    /// front layers rise the most.
    pub fn generated(
        width: f64,
        height: f64,
        layer_count: usize,
        template: LayerTemplate,
        seed: u64,
    ) -> Result<Self, SceneError> {
        let specs = generate_layers(
            layer_count,
            template.points,
            template.amplitude,
            template.height,
            template.speed,
            seed,
        );

        let layers = specs
            .iter()
            .rev()
            .map(|spec| {
                let depth = spec.depth as f64;
                let amplitude = spec.params.amplitude.resolve();
                let baseline = spec.params.base_height.resolve();
                let lift = baseline * 0.4 / (1.0 + depth);
                let alpha = (0.9 - 0.2 * depth).max(0.2);

                LayerConfig {
                    seed: spec.seed,
                    points: spec.params.point_count,
                    amplitude: ValueSpec::Scroll {
                        from: amplitude,
                        to: amplitude * 1.5,
                    },
                    height: ValueSpec::Scroll {
                        from: baseline,
                        to: baseline - lift,
                    },
                    speed: ValueSpec::Fixed(spec.params.speed.resolve()),
                    fps: template.fps,
                    paused: false,
                    fill: format!("rgba(0, 119, 190, {alpha:.2})"),
                }
            })
            .collect();

        let scene = Scene {
            width,
            height,
            display_hz: default_display_hz(),
            duration_ms: default_duration_ms(),
            edge_bleed: 0.0,
            layers,
        };
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(invalid(format!("width must be positive, got {}", self.width)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(invalid(format!("height must be positive, got {}", self.height)));
        }
        if !(self.display_hz.is_finite() && self.display_hz > 0.0) {
            return Err(invalid(format!(
                "display_hz must be positive, got {}",
                self.display_hz
            )));
        }
        if !(self.duration_ms.is_finite() && self.duration_ms >= 0.0) {
            return Err(invalid(format!(
                "duration_ms must be non-negative, got {}",
                self.duration_ms
            )));
        }
        if !self.edge_bleed.is_finite() {
            return Err(invalid("edge_bleed must be finite".to_string()));
        }
        if self.layers.is_empty() {
            return Err(invalid("scene has no layers".to_string()));
        }

        for (index, layer) in self.layers.iter().enumerate() {
            if !layer.seed.is_finite() {
                return Err(invalid(format!("layer {index}: seed must be finite")));
            }
            if !(layer.points > 0.0 && layer.points <= MAX_LAYER_POINTS) {
                return Err(invalid(format!(
                    "layer {index}: points must be in (0, {MAX_LAYER_POINTS}], got {}",
                    layer.points
                )));
            }
            if !(layer.fps.is_finite() && layer.fps > 0.0) {
                return Err(invalid(format!(
                    "layer {index}: fps must be positive, got {}",
                    layer.fps
                )));
            }
            if !(layer.amplitude.is_finite() && layer.height.is_finite() && layer.speed.is_finite())
            {
                return Err(invalid(format!("layer {index}: shape values must be finite")));
            }
        }

        Ok(())
    }

    /// Create measured animators for every layer, with scroll-driven values
    /// reading from `scroll`. Layers with the same seed share one noise field.
    pub fn build_layers(&self, scroll: &LiveValue) -> Vec<SceneLayer> {
        let mut fields: HashMap<u64, Arc<NoiseField>> = HashMap::new();

        self.layers
            .iter()
            .map(|layer| {
                let noise = fields
                    .entry(seed_key(layer.seed))
                    .or_insert_with(|| Arc::new(NoiseField::new(layer.seed)))
                    .clone();

                let params = WaveShapeParameters {
                    point_count: layer.points,
                    amplitude: layer.amplitude.to_param(scroll),
                    base_height: layer.height.to_param(scroll),
                    speed: layer.speed.to_param(scroll),
                    paused: layer.paused,
                    target_fps: layer.fps,
                };

                let mut animator = WaveAnimator::new(noise, params).with_edge_bleed(self.edge_bleed);
                animator.resize(self.width, self.height);

                SceneLayer {
                    fill: layer.fill.clone(),
                    animator,
                }
            })
            .collect()
    }

    /// Play the scene headlessly.
    ///
    /// A simulated display refreshes at `display_hz` for `duration_ms` while
    /// scroll progress runs from 0 to 1. Every layer gets its own frame loop;
    /// a [`Frame`] is recorded whenever at least one layer accepted a tick,
    /// holding every layer's current outline in painting order.
    pub fn render(&self) -> Vec<Frame> {
        let scroll = LiveValue::new(0.0);
        let mut layers: Vec<(String, FrameLoop<ManualHost>)> = self
            .build_layers(&scroll)
            .into_iter()
            .map(|layer| (layer.fill, FrameLoop::start(layer.animator, ManualHost::new())))
            .collect();

        let refresh_ms = 1000.0 / self.display_hz;
        let ticks = (self.duration_ms / refresh_ms).floor() as usize;
        let mut frames = Vec::new();

        for tick in 0..=ticks {
            let now = tick as f64 * refresh_ms;
            if self.duration_ms > 0.0 {
                scroll.set(now / self.duration_ms);
            }

            // Layers are independent; each one's ticks stay in order.
            let accepted: Vec<bool> = layers
                .par_iter_mut()
                .map(|(_, frame_loop)| {
                    let mut accepted = false;
                    for _ in frame_loop.host_mut().take_pending() {
                        accepted |= frame_loop.on_host_tick(now).is_some();
                    }
                    accepted
                })
                .collect();

            if accepted.iter().any(|&a| a) {
                frames.push(Frame {
                    index: frames.len(),
                    timestamp_ms: now,
                    layers: layers
                        .iter()
                        .map(|(fill, frame_loop)| FrameLayer {
                            fill: fill.clone(),
                            path: frame_loop.animator().path().to_string(),
                        })
                        .collect(),
                });
            }
        }

        for (_, frame_loop) in &mut layers {
            frame_loop.teardown();
        }
        debug!(frames = frames.len(), ticks, "scene rendered");

        frames
    }
}

fn invalid(message: String) -> SceneError {
    SceneError::Invalid(message)
}
