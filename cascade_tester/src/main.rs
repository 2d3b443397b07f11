use anyhow::{bail, Context, Result};
use cascade_vision::core_modules::pixel::pixel::ColorSample;
use cascade_vision::core_modules::utils::image_helper::image_helper;
use cascade_vision::{ClassificationResult, ClassifierPool, Domain, EngineConfig, OutputFormat};
use clap::{Parser, Subcommand};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cascade_tester", version, about = "Classify images with the cascade and build covert-code fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more image files
    Classify {
        /// expression | shield (overrides the config file)
        #[arg(long)]
        domain: Option<Domain>,
        /// TOML engine config
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        workers: Option<usize>,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Write a PNG fixture carrying a covert code
    Embed {
        #[arg(long, default_value = "shield")]
        domain: Domain,
        #[arg(long)]
        code: u16,
        #[arg(long, default_value_t = 64)]
        width: u32,
        #[arg(long, default_value_t = 64)]
        height: u32,
        /// Fill color as r,g,b
        #[arg(long, default_value = "128,128,128", value_parser = parse_rgb)]
        fill: ColorSample,
        /// Embed into this image instead of a solid fill
        #[arg(long, conflicts_with_all = ["width", "height", "fill"])]
        base: Option<PathBuf>,
        output: PathBuf,
    },
    /// List covert codes and catalog entries for a domain
    Labels {
        #[arg(long, default_value = "shield")]
        domain: Domain,
    },
}

fn parse_rgb(s: &str) -> Result<ColorSample, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected r,g,b, got {s:?}"));
    };
    let channel = |v: &str| v.parse::<u8>().map_err(|e| format!("{v:?}: {e}"));
    Ok(ColorSample::new(channel(*r)?, channel(*g)?, channel(*b)?))
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { domain, config, workers, json, paths } => {
            // --- 1. Configuration ---
            let mut engine = match &config {
                Some(path) => EngineConfig::load_from_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => EngineConfig::default(),
            };
            if let Some(domain) = domain {
                engine.domain = domain;
            }
            if let Some(workers) = workers {
                engine.workers = workers;
            }
            if json {
                engine.output = OutputFormat::Json;
            }
            engine.validate()?;
            init_tracing(&engine.log_filter);

            classify(&engine, paths).await
        }
        Commands::Embed { domain, code, width, height, fill, base, output } => {
            init_tracing("info");
            let image = carrier_image(base.as_deref(), width, height, fill)?;
            embed(domain, code, image, output)
        }
        Commands::Labels { domain } => {
            labels(domain);
            Ok(())
        }
    }
}

async fn classify(engine: &EngineConfig, paths: Vec<PathBuf>) -> Result<()> {
    // --- 2. Read inputs ---
    let mut items = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        items.push((path.display().to_string(), bytes));
    }

    // --- 3. Fan out over the pool ---
    let pool = ClassifierPool::new(engine.domain, engine.workers);
    info!(domain = %engine.domain, workers = pool.worker_count(), files = items.len(), "classifying");
    let results = pool.classify_batch(items).await;
    pool.shutdown().await;

    // --- 4. Report ---
    let mut errors = 0;
    for result in results {
        let result = result?;
        if result.is_error() {
            errors += 1;
        }
        print_result(&result, engine.output)?;
    }
    if errors > 0 {
        warn!(errors, "some files could not be decoded");
    }
    Ok(())
}

fn print_result(result: &ClassificationResult, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text => println!("{result}"),
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
    }
    Ok(())
}

fn carrier_image(base: Option<&Path>, width: u32, height: u32, fill: ColorSample) -> Result<RgbImage> {
    match base {
        Some(path) => Ok(image::open(path)
            .with_context(|| format!("opening {}", path.display()))?
            .to_rgb8()),
        None => Ok(image_helper::solid(width, height, fill)),
    }
}

fn embed(domain: Domain, code: u16, mut image: RgbImage, output: PathBuf) -> Result<()> {
    let covert = &domain.profile().covert;
    let Some(entry) = covert.lookup(code) else {
        bail!("code {code} is not in the {domain} table");
    };

    if !covert.embed(&mut image, code) {
        bail!("{}x{} is smaller than the covert grid", image.width(), image.height());
    }
    image_helper::save(&output, &image).with_context(|| format!("writing {}", output.display()))?;
    info!(code, label = entry.label, path = %output.display(), "fixture written");
    Ok(())
}

fn labels(domain: Domain) {
    let profile = domain.profile();
    println!("covert codes ({domain}, {:?} channel):", profile.covert.channel());
    for entry in profile.covert.table() {
        println!("  {:>3}  {:<20} {}", entry.code, entry.label, entry.category);
    }
    println!("catalog ({} entries):", profile.catalog.len());
    for entry in profile.catalog.entries() {
        println!(
            "  {:<12} {:<12} {:<12} {}",
            entry.label,
            entry.category,
            entry.shape.as_str(),
            entry.emblem.unwrap_or("-")
        );
    }
}
