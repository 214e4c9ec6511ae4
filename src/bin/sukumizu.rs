use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use sukumizu_renderer::{
    CodecScheme, Configuration, Customizer, CustomizerOptions, DirectoryLoader, ShareLink,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sukumizu", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a configuration to a PNG.
    Render(RenderArgs),
    /// Encode a JSON configuration as a token or share link.
    Encode(EncodeArgs),
    /// Decode a token or share link to JSON.
    Decode(DecodeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory holding the layer assets.
    #[arg(long)]
    assets: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Configuration token. Without a token, link or preset the colours are random.
    #[arg(long, conflicts_with_all = ["link", "preset"])]
    token: Option<String>,

    /// Share link carrying the configuration.
    #[arg(long, conflicts_with = "preset")]
    link: Option<Url>,

    /// JSON preset file.
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Seed for the random colours.
    #[arg(long)]
    seed: Option<u64>,

    /// Token encoding.
    #[arg(long, default_value_t = CodecScheme::Positional)]
    scheme: CodecScheme,

    /// Export at twice the logical size, like the download button.
    #[arg(long)]
    hires: bool,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Token encoding.
    #[arg(long, default_value_t = CodecScheme::Positional)]
    scheme: CodecScheme,

    /// Print a full share link based on this URL instead of the bare token.
    #[arg(long)]
    base_url: Option<Url>,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// A token, or a URL carrying one.
    input: String,

    /// Token encoding.
    #[arg(long, default_value_t = CodecScheme::Positional)]
    scheme: CodecScheme,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
    }
}

fn read_preset(path: &Path) -> anyhow::Result<Configuration> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("read preset '{}'", path.display()))?;
    Configuration::from_json(&json).with_context(|| "parse preset JSON")
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let options = CustomizerOptions {
        scheme: args.scheme,
        ..CustomizerOptions::default()
    };
    let mut customizer = Customizer::new(options);

    if let Some(token) = &args.token {
        customizer = customizer.with_initial_configuration(args.scheme.decode(token));
    } else if let Some(path) = &args.preset {
        customizer = customizer.with_initial_configuration(read_preset(path)?);
    } else if let Some(link) = &args.link {
        customizer = customizer.with_link(link.clone());
    }

    customizer
        .load_all(&DirectoryLoader::new(&args.assets))
        .with_context(|| format!("load assets from '{}'", args.assets.display()))?;

    let configured = args.token.is_some()
        || args.preset.is_some()
        || customizer.link().is_some_and(|l| l.configuration().is_some());
    if let (Some(seed), false) = (args.seed, configured) {
        customizer.randomize(&mut StdRng::seed_from_u64(seed));
    }

    let png = if args.hires {
        customizer.download_png()?
    } else {
        customizer.surface().to_png()?
    };

    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    fs::write(&args.out, png).with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    println!("{}", customizer.serialize());
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let configuration = read_preset(&args.in_path)?;

    match args.base_url {
        Some(url) => {
            let mut link = ShareLink::new(url, args.scheme);
            link.update(&configuration);
            println!("{link}");
        }
        None => println!("{}", args.scheme.encode(&configuration)),
    }
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let codec = args.scheme.codec();
    let configuration = match Url::parse(&args.input) {
        Ok(url) => codec
            .read_url(&url)
            .with_context(|| format!("no configuration in '{url}'"))?,
        Err(_) => codec
            .try_decode(&args.input)
            .with_context(|| "decode token")?,
    };

    println!("{}", configuration.to_json_pretty()?);
    Ok(())
}
