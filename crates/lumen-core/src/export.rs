//! Archive packaging for processed batches.
//!
//! Bundles full-resolution outputs into a single deflate-compressed zip,
//! naming each entry from the image's export stem and actual encoded format.
//! Name collisions are resolved with numeric suffixes so no entry is ever
//! silently overwritten.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PipelineError, PipelineResult};
use crate::types::SourceImage;

/// A plain-text sidecar entry (generated product description, notes)
/// appended to the archive alongside the images.
#[derive(Debug, Clone)]
pub struct MetadataFile {
    /// Entry name inside the archive, extension included
    pub name: String,
    pub contents: String,
}

/// Packages processed images into downloadable archives.
pub struct PackagingExporter {
    /// Include a machine-readable manifest entry in the archive
    pub include_manifest: bool,
}

impl Default for PackagingExporter {
    fn default() -> Self {
        Self {
            include_manifest: true,
        }
    }
}

impl PackagingExporter {
    pub fn new(include_manifest: bool) -> Self {
        Self { include_manifest }
    }

    /// Build a zip of every image that has a full-resolution output, plus
    /// optional plain-text metadata entries.
    ///
    /// Alpha-preserving images that were never committed still ship: their
    /// matted source bytes go in as `.png`. Other images without a render
    /// (never committed, or failed) are skipped with a warning. Entry names
    /// come from `export_stem()` plus the extension of the format the bytes
    /// were actually encoded in, so a forced-PNG output lands as `.png`
    /// regardless of the requested batch format.
    pub fn build_archive(
        &self,
        images: &[SourceImage],
        metadata_files: &[MetadataFile],
    ) -> PipelineResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut used_names: Vec<String> = Vec::new();
        let mut manifest = Vec::new();

        for image in images {
            let (name, bytes, entry) = match &image.full {
                Some(output) => {
                    let name = unique_name(
                        &mut used_names,
                        image.export_stem(),
                        output.format.extension(),
                    );
                    let entry = serde_json::json!({
                        "file": name,
                        "source": image.file_name,
                        "id": image.id,
                        "width": output.width,
                        "height": output.height,
                        "format": output.format,
                        "forced_png": output.forced_png,
                        "rendered": true,
                        "preset": image.applied_preset,
                    });
                    (name, output.bytes.as_slice(), entry)
                }
                // No render yet, but the matted transparent source is
                // itself a deliverable
                None if image.alpha_preserving => {
                    let name = unique_name(&mut used_names, image.export_stem(), "png");
                    let entry = serde_json::json!({
                        "file": name,
                        "source": image.file_name,
                        "id": image.id,
                        "width": image.width,
                        "height": image.height,
                        "format": "png",
                        "rendered": false,
                    });
                    (name, image.bytes.as_slice(), entry)
                }
                None => {
                    tracing::warn!("Skipping {} in archive: no rendered output", image.id);
                    continue;
                }
            };

            writer
                .start_file(&name, options)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            writer
                .write_all(bytes)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            manifest.push(entry);
        }

        if manifest.is_empty() {
            return Err(PipelineError::Archive(
                "No rendered outputs to package".to_string(),
            ));
        }

        for file in metadata_files {
            writer
                .start_file(&file.name, options)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            writer
                .write_all(file.contents.as_bytes())
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
        }

        if self.include_manifest {
            let body = serde_json::to_string_pretty(&manifest)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            writer
                .start_file("manifest.json", options)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            writer
                .write_all(body.as_bytes())
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| PipelineError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Build a zip of the matted working sources (always PNG) for every
    /// alpha-preserving image. Lets users take the background-removed
    /// originals without committing a render pass.
    pub fn build_matted_archive(&self, images: &[SourceImage]) -> PipelineResult<Vec<u8>> {
        let matted: Vec<&SourceImage> =
            images.iter().filter(|img| img.alpha_preserving).collect();
        if matted.is_empty() {
            return Err(PipelineError::Archive(
                "No background-removed images to package".to_string(),
            ));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut used_names: Vec<String> = Vec::new();

        for image in matted {
            let name = unique_name(&mut used_names, image.export_stem(), "png");
            writer
                .start_file(&name, options)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            writer
                .write_all(&image.bytes)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| PipelineError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Pick `{stem}.{ext}`, appending `-2`, `-3`, ... until the name is free.
fn unique_name(used: &mut Vec<String>, stem: &str, ext: &str) -> String {
    let mut candidate = format!("{stem}.{ext}");
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{stem}-{suffix}.{ext}");
        suffix += 1;
    }
    used.push(candidate.clone());
    candidate
}
