//! The `lumen presets` command: list size and style presets.

use clap::Args;
use lumen_core::{style_preset, PresetCatalog, STYLE_PRESET_IDS};

/// Arguments for the `presets` command.
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Show the slider values behind each style preset
    #[arg(long)]
    pub values: bool,
}

/// Execute the presets command.
pub async fn execute(args: PresetsArgs) -> anyhow::Result<()> {
    let catalog = PresetCatalog::new();

    println!("Size presets:");
    for preset in catalog.all() {
        let height = preset
            .height
            .map(|h| h.to_string())
            .unwrap_or_else(|| "auto".to_string());
        println!(
            "  {:<14} {:>5} x {:<5} q{:<4} {}",
            preset.id, preset.width, height, preset.quality, preset.description
        );
    }

    println!();
    println!("Style presets:");
    for id in STYLE_PRESET_IDS {
        if args.values {
            let adj = style_preset(id).expect("style preset ids are exhaustive");
            println!(
                "  {:<14} brightness {:>5.1}  contrast {:>5.1}  sharpen {:>4.2}  \
                 sat {:>5.1}  light {:>5.1}  rgb {:.2}/{:.2}/{:.2}",
                id,
                adj.brightness,
                adj.contrast,
                adj.sharpen,
                adj.saturation,
                adj.lightness,
                adj.red_scale,
                adj.green_scale,
                adj.blue_scale,
            );
        } else {
            println!("  {id}");
        }
    }

    Ok(())
}
