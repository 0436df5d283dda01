// img2mass - Turn a floor plan or height map image into box massing (OBJ)
//
// Pipeline:
//   1. Load config (optional TOML), apply CLI overrides
//   2. Decode + sample the image into a height grid
//   3. Greedy row merge into spans
//   4. Build one box per span, export OBJ
//   5. Optionally dump the span snapshot as JSON
//
// Usage: cargo run --bin img2mass -- <image> [--complexity N] [--threshold N]
//        [--mode floorplan|heightmap] [--invert] [-o model.obj] [--spans spans.json]

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use massing_engine::{MalformedPolicy, SampleMode, Studio, StudioConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "img2mass", version, about = "Convert an image into a box massing model")]
struct Args {
    /// Input image (PNG, JPEG, GIF, BMP)
    image: PathBuf,

    /// TOML config file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid resolution driver: resolution = min(256, complexity * 10)
    #[arg(long)]
    complexity: Option<u32>,

    /// Luminance cut-off (0-255); darker cells become columns
    #[arg(short, long)]
    threshold: Option<u32>,

    /// floorplan or heightmap
    #[arg(short, long)]
    mode: Option<SampleMode>,

    /// Treat light pixels as solid
    #[arg(long)]
    invert: bool,

    /// Height of a full column in world units
    #[arg(long)]
    height_multiplier: Option<f32>,

    /// Width of the whole site in world units
    #[arg(long)]
    site_width: Option<f32>,

    /// Skip malformed geometry with a warning instead of failing
    #[arg(long)]
    lenient: bool,

    /// OBJ output path
    #[arg(short, long, default_value = "massing.obj")]
    output: PathBuf,

    /// Also write the {style, params, spans} snapshot as JSON
    #[arg(long)]
    spans: Option<PathBuf>,

    /// Style label stored in the snapshot
    #[arg(long, default_value = "blueprint")]
    style: String,
}

impl Args {
    fn load_config(&self) -> Result<StudioConfig> {
        let mut config = match &self.config {
            Some(path) => StudioConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => StudioConfig::default(),
        };

        if let Some(c) = self.complexity { config.ingest.complexity = c; }
        if let Some(t) = self.threshold { config.ingest.threshold = t; }
        if let Some(m) = self.mode { config.ingest.mode = m; }
        if self.invert { config.ingest.invert = true; }
        if let Some(h) = self.height_multiplier { config.massing.height_multiplier = h; }
        if let Some(w) = self.site_width { config.massing.site_width = w; }
        if self.lenient { config.export.policy = MalformedPolicy::Truncate; }

        config.validate().context("Invalid parameters")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "img2mass=info,massing_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let p = config.ingest;

    println!(
        "Processing {} ({} mode, {}x{}, threshold {}{})...",
        args.image.display(),
        p.mode,
        p.resolution(),
        p.resolution(),
        p.threshold,
        if p.invert { ", inverted" } else { "" },
    );

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    println!("  Sampling + meshing...");
    let mut studio = Studio::new(config)?;
    let outcome = studio.ingest_async(bytes).await?;
    match outcome.fresh() {
        Some(ingested) if studio.commit(ingested.clone()) => {}
        _ => bail!("ingest was superseded"),
    }

    let metrics = studio.metrics();
    output::print_summary(&metrics, studio.resolution());

    println!("  Exporting...");
    let doc = studio.export().context("Export failed")?;
    for w in &doc.warnings {
        eprintln!("  warning: {}", w);
    }
    doc.write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("  Wrote {} ({} vertices, {} faces)", args.output.display(), doc.vertex_count, doc.face_count);

    if let Some(path) = &args.spans {
        output::write_snapshot(path, &studio.snapshot(args.style.as_str()))?;
        println!("  Wrote {}", path.display());
    }

    println!("Done!");
    Ok(())
}
