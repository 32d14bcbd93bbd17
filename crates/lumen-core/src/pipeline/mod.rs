//! Image processing pipeline components.
//!
//! This module contains all the stages of the batch adjustment pipeline:
//! - **adjust**: Pixel transforms (brightness/contrast, HSL, RGB scale, sharpen)
//! - **presets**: Size/quality presets and named style presets
//! - **transcode**: Decode, resize, and re-encode one image
//! - **batch**: Coordinates passes across the whole collection
//! - **debounce**: Last-write-wins gating for preview regeneration
//! - **discovery**: Find image files in directories
//! - **watermark**: Overlay compositing after adjustments

pub mod adjust;
pub mod batch;
pub mod debounce;
pub mod discovery;
pub mod presets;
pub mod transcode;
pub mod watermark;

// Re-exports for convenient access
pub use adjust::apply_adjustments;
pub use batch::{BatchContext, BatchCoordinator, BatchFailure, BatchOutcome};
pub use debounce::PreviewGate;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use presets::{style_preset, Preset, PresetCatalog, STYLE_PRESET_IDS};
pub use transcode::ImageTranscoder;
