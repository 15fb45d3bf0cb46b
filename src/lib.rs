// replay-features: highlight Harris / FAST features on replayed luminance
// sequences
//
// Core: Gaussian smoothing, Harris and segment-test corner detection, binary
// descriptors and descriptor-matching persistence tracking. Ambient layers
// handle configuration, logging and on-disk playback.

pub mod frame;
pub mod convolution;
pub mod gaussian;
pub mod gradient;
pub mod harris;
pub mod fast;
pub mod brief;
pub mod tracker;
pub mod pipeline;

pub mod config;
pub mod error;
pub mod logging;
pub mod playback;

pub use error::{Error, Result};
pub use frame::Frame;
pub use pipeline::{DetectionStrategy, FeaturePipeline, FrameStats};
