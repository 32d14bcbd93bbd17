//! The `lumen process` command: discover, adjust, render, and package.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use lumen_core::collab::{apply_matting, assign_names, HttpMattingProvider, HttpNamingProvider};
use lumen_core::{
    style_preset, AdjustmentSet, BatchContext, BatchCoordinator, Config, ExportFormat,
    PackagingExporter, PresetCatalog, SourceImage,
};

use lumen_core::pipeline::FileDiscovery;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image file or directory to process
    pub input: PathBuf,

    /// Output archive path
    #[arg(short, long, default_value = "lumen-export.zip")]
    pub output: PathBuf,

    /// Style preset to start from (see `lumen presets`)
    #[arg(long)]
    pub style: Option<String>,

    /// Brightness offset (-100 to 100)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contrast offset (-100 to 100)
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Sharpen amount (0 to 2)
    #[arg(long)]
    pub sharpen: Option<f32>,

    /// Hue (100 = no shift, each unit is 3.6 degrees)
    #[arg(long)]
    pub hue: Option<f32>,

    /// Saturation percentage (100 = unchanged)
    #[arg(long)]
    pub saturation: Option<f32>,

    /// Lightness percentage (100 = unchanged)
    #[arg(long)]
    pub lightness: Option<f32>,

    /// Red channel multiplier (1.0 = unchanged)
    #[arg(long)]
    pub red: Option<f32>,

    /// Green channel multiplier (1.0 = unchanged)
    #[arg(long)]
    pub green: Option<f32>,

    /// Blue channel multiplier (1.0 = unchanged)
    #[arg(long)]
    pub blue: Option<f32>,

    /// Size preset id (see `lumen presets`)
    #[arg(long, default_value = "standard")]
    pub preset: String,

    /// Custom target width (overrides --preset)
    #[arg(long)]
    pub width: Option<u32>,

    /// Custom target height (with --width; omit to preserve aspect ratio)
    #[arg(long)]
    pub height: Option<u32>,

    /// Custom encode quality 0-100 (with --width)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Output format: jpg, png, or webp (defaults to config)
    #[arg(long)]
    pub format: Option<String>,

    /// Remove backgrounds via the matting collaborator before adjusting
    #[arg(long)]
    pub remove_background: bool,

    /// Suggest descriptive export names via the naming collaborator
    #[arg(long)]
    pub suggest_names: bool,

    /// Package the background-removed sources instead of rendered outputs
    #[arg(long, requires = "remove_background")]
    pub export_matted: bool,

    /// Skip the manifest.json entry in the archive
    #[arg(long)]
    pub no_manifest: bool,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let adjustments = build_adjustments(&args)?;
    let preset = resolve_preset(&args)?;
    let format: ExportFormat = match &args.format {
        Some(value) => value
            .parse()
            .map_err(|e: String| anyhow::anyhow!("--format: {e}"))?,
        None => config
            .export
            .format
            .parse()
            .map_err(|e: String| anyhow::anyhow!("config export.format: {e}"))?,
    };

    // Discover inputs
    let discovery = FileDiscovery::new(config.export.clone());
    let files = discovery.discover(&args.input);
    if files.is_empty() {
        anyhow::bail!("No supported images found at {:?}", args.input);
    }
    tracing::info!("Found {} image(s)", files.len());

    let coordinator = BatchCoordinator::new(&config);
    let start_time = std::time::Instant::now();
    let progress = create_progress_bar(files.len() as u64);
    progress.set_message("loading...");

    // Load
    let mut images: Vec<SourceImage> = Vec::with_capacity(files.len());
    let mut load_failed: u64 = 0;
    for file in &files {
        let bytes = tokio::fs::read(&file.path).await?;
        let file_name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let media_type = media_type_for(&file.path);

        match coordinator.transcoder().load(&file_name, media_type, bytes).await {
            Ok(image) => images.push(image),
            Err(e) => {
                load_failed += 1;
                tracing::error!("Failed to load {:?}: {}", file.path, e);
            }
        }
        progress.inc(1);
    }
    if images.is_empty() {
        progress.finish_and_clear();
        anyhow::bail!("All {} input(s) failed to load", files.len());
    }

    // Optional background matting: a failure leaves that image on its
    // original source and the batch continues
    let mut matting_failed: u64 = 0;
    if args.remove_background {
        progress.set_message("removing backgrounds...");
        let matting_config = config.collaborators.matting.clone().unwrap_or_default();
        let provider = HttpMattingProvider::new(
            &matting_config,
            Duration::from_millis(config.limits.collaborator_timeout_ms),
        );
        for image in images.iter_mut() {
            if let Err(e) = apply_matting(&provider, image, &config.retry).await {
                matting_failed += 1;
                tracing::warn!("Matting failed for {}: {}", image.id, e);
            }
        }
    }

    // Optional descriptive naming: falls back to positional names internally
    if args.suggest_names {
        progress.set_message("naming...");
        let naming_config = config.collaborators.naming.clone().unwrap_or_default();
        let provider = HttpNamingProvider::new(
            &naming_config,
            Duration::from_millis(config.limits.collaborator_timeout_ms),
        );
        assign_names(Some(&provider), &mut images, &config.retry).await;
    }

    // Render
    progress.set_message("rendering...");
    let ctx = BatchContext {
        adjustments,
        preset: Some(preset),
        selected_id: None,
        apply_to_all: true,
        format,
        watermark: None,
    };
    let outcome = coordinator.run_commit(&mut images, &ctx).await;
    for failure in &outcome.failures {
        tracing::error!("Render failed for {}: {}", failure.image_id, failure.error);
    }

    // Package
    let exporter = PackagingExporter::new(!args.no_manifest);
    let archive = if args.export_matted {
        exporter.build_matted_archive(&images)?
    } else {
        exporter.build_archive(&images, &[])?
    };
    std::fs::write(&args.output, &archive)?;
    progress.finish_and_clear();
    tracing::info!("Archive written to {:?}", args.output);

    print_summary(
        outcome.processed.len() as u64,
        load_failed + outcome.failures.len() as u64,
        matting_failed,
        archive.len() as u64,
        start_time.elapsed(),
    );

    Ok(())
}

/// Start from the style preset (or identity) and layer slider overrides.
fn build_adjustments(args: &ProcessArgs) -> anyhow::Result<AdjustmentSet> {
    let mut adj = match &args.style {
        Some(id) => style_preset(id).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown style preset {:?}. Run `lumen presets` to list them.",
                id
            )
        })?,
        None => AdjustmentSet::default(),
    };

    if let Some(v) = args.brightness {
        adj.brightness = v;
    }
    if let Some(v) = args.contrast {
        adj.contrast = v;
    }
    if let Some(v) = args.sharpen {
        adj.sharpen = v;
    }
    if let Some(v) = args.hue {
        adj.hue = v;
    }
    if let Some(v) = args.saturation {
        adj.saturation = v;
    }
    if let Some(v) = args.lightness {
        adj.lightness = v;
    }
    if let Some(v) = args.red {
        adj.red_scale = v;
    }
    if let Some(v) = args.green {
        adj.green_scale = v;
    }
    if let Some(v) = args.blue {
        adj.blue_scale = v;
    }
    Ok(adj)
}

/// Resolve --preset / --width into a concrete size preset.
fn resolve_preset(args: &ProcessArgs) -> anyhow::Result<lumen_core::Preset> {
    let mut catalog = PresetCatalog::new();
    if let Some(width) = args.width {
        let preset = catalog.set_custom(width, args.height, args.quality.unwrap_or(85));
        return Ok(preset.clone());
    }
    catalog
        .get(&args.preset)
        .cloned()
        .ok_or_else(|| {
            let ids: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
            anyhow::anyhow!(
                "Unknown size preset {:?}. Available: {}",
                args.preset,
                ids.join(", ")
            )
        })
}

/// MIME type from file extension, for collaborator requests.
fn media_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tiff") | Some("tif") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(
    succeeded: u64,
    failed: u64,
    matting_failed: u64,
    archive_bytes: u64,
    elapsed: std::time::Duration,
) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        succeeded as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    let archive_mb = archive_bytes as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Rendered:     {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    if matting_failed > 0 {
        eprintln!("    No matte:     {:>8}", matting_failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Archive:      {:>7.1} MB", archive_mb);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
