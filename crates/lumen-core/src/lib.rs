//! Lumen Core - Batch product-photo adjustment library.
//!
//! Lumen takes a collection of product photos and applies one set of
//! adjustments uniformly across all of them, rendering fast thumbnail
//! previews while editing and full-resolution exports on demand.
//!
//! # Architecture
//!
//! ```text
//! Load → Matting (optional) → Adjust → Resize/Encode → Package (zip)
//!                  ↑ previews debounce, last write wins ↑
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{BatchContext, BatchCoordinator, Config, ExportFormat};
//!
//! #[tokio::main]
//! async fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let coordinator = BatchCoordinator::new(&config);
//!
//!     let mut images = vec![/* loaded via coordinator.transcoder().load(..) */];
//!     let ctx = BatchContext {
//!         adjustments: lumen_core::style_preset("vivid").unwrap(),
//!         preset: None,
//!         selected_id: None,
//!         apply_to_all: true,
//!         format: ExportFormat::Jpeg,
//!         watermark: None,
//!     };
//!     let outcome = coordinator.run_commit(&mut images, &ctx).await;
//!     println!("{} rendered, {} failed", outcome.processed.len(), outcome.failures.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod collab;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use collab::{apply_matting, assign_names, BackgroundMatting, NamingProvider};
pub use config::Config;
pub use error::{ConfigError, LumenError, PipelineError, PipelineResult, Result};
pub use export::{MetadataFile, PackagingExporter};
pub use pipeline::{
    style_preset, BatchContext, BatchCoordinator, BatchFailure, BatchOutcome, ImageTranscoder,
    Preset, PresetCatalog, PreviewGate, STYLE_PRESET_IDS,
};
pub use types::{
    AdjustmentSet, AppliedPreset, EncodedOutput, ExportFormat, SourceImage, WatermarkKind,
    WatermarkPlacement, WatermarkSettings,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
