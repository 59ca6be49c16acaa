use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use layermint::{
    BatchReport, CatalogOrder, ConsumeOpts, Fingerprint, GenerateOpts, MintConfig, Pacing,
};

#[derive(Parser, Debug)]
#[command(name = "layermint", version)]
struct Cli {
    /// JSON config file. Missing fields take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trait catalog root (one subdirectory per category).
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    /// Output root for the manifest, images and metadata.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate, shuffle and write the order manifest.
    Generate(GenerateArgs),
    /// Composite one PNG per manifest position.
    Render(ConsumeArgs),
    /// Write one metadata JSON per manifest position.
    Metadata(ConsumeArgs),
    /// Print the fingerprint of the current manifest.
    Fingerprint,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Overwrite an existing manifest (reshuffles every position).
    #[arg(long)]
    force: bool,

    /// Shuffle with a seeded generator instead of the OS CSPRNG. Debugging only.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep directory enumeration order instead of sorting variants.
    #[arg(long)]
    filesystem_order: bool,
}

#[derive(Args, Debug)]
struct ConsumeArgs {
    /// Refuse to run unless the manifest has this SHA-256 fingerprint.
    #[arg(long)]
    expect_fingerprint: Option<String>,

    /// Overwrite outputs produced from a different manifest.
    #[arg(long)]
    force: bool,

    /// Delay between items in milliseconds (overrides the config).
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Exit with an error if any item failed.
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Generate(args) => cmd_generate(cfg, args),
        Command::Render(args) => {
            let report = layermint::render_images(&cfg, &consume_opts(&args)?)?;
            finish("render", &report, args.strict)
        }
        Command::Metadata(args) => {
            let report = layermint::emit_metadata(&cfg, &consume_opts(&args)?)?;
            finish("metadata", &report, args.strict)
        }
        Command::Fingerprint => {
            println!("{}", layermint::manifest_fingerprint(&cfg)?);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<MintConfig> {
    let mut cfg = match &cli.config {
        Some(path) => MintConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => MintConfig::default(),
    };
    if let Some(images) = &cli.images {
        cfg.layout.images_root = images.clone();
    }
    if let Some(output) = &cli.output {
        cfg.layout.output_root = output.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_generate(mut cfg: MintConfig, args: GenerateArgs) -> anyhow::Result<()> {
    if args.filesystem_order {
        cfg.catalog_order = CatalogOrder::FileSystem;
    }
    let opts = GenerateOpts {
        force: args.force,
        seed: args.seed,
    };
    let summary = layermint::generate(&cfg, &opts)?;
    let (face, top, bottom) = summary.category_sizes;
    eprintln!(
        "wrote {} ({} records = {face} face x {top} top x {bottom} bottom)",
        summary.manifest_path.display(),
        summary.records,
    );
    println!("{}", summary.fingerprint);
    Ok(())
}

fn consume_opts(args: &ConsumeArgs) -> anyhow::Result<ConsumeOpts> {
    let expect_fingerprint = args
        .expect_fingerprint
        .as_deref()
        .map(Fingerprint::parse)
        .transpose()?;
    Ok(ConsumeOpts {
        expect_fingerprint,
        force: args.force,
        pacing: args.delay_ms.map(Pacing::from_millis),
    })
}

fn finish(phase: &str, report: &BatchReport, strict: bool) -> anyhow::Result<()> {
    let ok = report.succeeded().count();
    eprintln!("{phase}: {ok}/{} items written", report.len());
    for failure in report.failed() {
        if let Err(reason) = &failure.result {
            eprintln!("  #{}: {reason}", failure.position);
        }
    }
    if strict && !report.is_clean() {
        anyhow::bail!(
            "{phase}: {} item(s) failed: {:?}",
            report.failed().count(),
            report.failed_positions()
        );
    }
    Ok(())
}
