use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use atlas_studio_core::prelude::*;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend::CommandBackend;

mod backend;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-studio",
    about = "Pack images into a texture atlas through an external packer backend",
    version
)]
struct Cli {
    /// Input image files (repeat for multiple)
    #[arg(short, long, required = true, num_args = 1)]
    input: Vec<String>,
    /// Output atlas file
    #[arg(short, long)]
    output: String,
    /// Packer backend command to invoke
    #[arg(long, default_value = "atlas-packer")]
    backend: String,
    /// Atlas width (used when auto sizing is off)
    #[arg(long, default_value_t = 512)]
    width: u32,
    /// Atlas height (used when auto sizing is off)
    #[arg(long, default_value_t = 512)]
    height: u32,
    /// Padding between packed frames
    #[arg(short, long, default_value_t = 0)]
    padding: u32,
    /// Automatically calculate atlas dimensions
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    auto_size: bool,
    /// Pack everything into a single unified page
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    unified: bool,
    /// Also write the generated preview bytes to this path
    #[arg(long)]
    preview: Option<PathBuf>,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let studio = AtlasStudio::new(Arc::new(CommandBackend::new(cli.backend.clone())));

    // Settings first: the image set is still empty, so nothing generates
    // until the inputs land.
    studio.set_padding(cli.padding).await;
    studio.set_auto_size(cli.auto_size).await;
    studio.set_width(cli.width).await;
    studio.set_height(cli.height).await;
    studio.set_unified(cli.unified).await;
    studio.set_output_path(cli.output.clone()).await;

    studio
        .replace_images(cli.input.clone())
        .await
        .context("loading input images")?;

    let snapshot = studio.snapshot();
    if let Some(err) = snapshot.last_error {
        bail!("atlas generation failed: {err}");
    }
    let preview = snapshot
        .preview_atlas
        .context("backend returned no preview")?;
    info!(bytes = preview.len(), "generated atlas preview");

    if let Some(path) = &cli.preview {
        std::fs::write(path, &preview)
            .with_context(|| format!("writing preview to {}", path.display()))?;
        info!(path = %path.display(), "preview written");
    }

    studio.save_atlas().await.context("saving atlas")?;
    info!("atlas saved to {}", cli.output);
    Ok(())
}
