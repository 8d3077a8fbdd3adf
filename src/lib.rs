// Export main modules
pub mod noise;
pub mod param;
pub mod scheduler;
pub mod wave;
mod animator;
mod clock;
mod export;
mod path;
mod scene;

// Re-export everything for public use
pub use animator::WaveAnimator;
pub use clock::{AnimationClock, Tick};
pub use export::{export_frames, write_json, write_svg, ExportError, ExportFormat, Frame, FrameLayer};
pub use noise::NoiseField;
pub use param::{Interpolated, LiveValue, Param, ParamSource};
pub use path::{build_path, WavePath};
pub use scene::{LayerConfig, LayerTemplate, Scene, SceneError, SceneLayer, ValueSpec, MAX_LAYER_POINTS};
pub use scheduler::{FrameHost, FrameLoop, FrameRequest, ManualHost};
pub use wave::{generate_layers, LayerSpec, WaveShapeParameters};

pub mod prelude {
    pub use crate::animator::WaveAnimator;
    pub use crate::clock::AnimationClock;
    pub use crate::export::{export_frames, ExportFormat, Frame, FrameLayer};
    pub use crate::noise::NoiseField;
    pub use crate::param::{Interpolated, LiveValue, Param};
    pub use crate::path::WavePath;
    pub use crate::scene::{LayerTemplate, Scene};
    pub use crate::scheduler::{FrameHost, FrameLoop, ManualHost};
    pub use crate::wave::WaveShapeParameters;
}
