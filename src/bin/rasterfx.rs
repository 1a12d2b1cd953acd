use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use rasterfx::buffer::image_io::{load_image, save_png};
use rasterfx::effects::bloom::bloom;
use rasterfx::effects::hash::buffer_hash;
use rasterfx::effects::noise::octave_noise;
use rasterfx::fx::builtin::noise::OCTAVES_MAX;
use rasterfx::{Builtin, Depth, HostRect, MemoryHost, PixelBuffer, Point, RenderSettings, TileStorage};

#[derive(Parser, Debug)]
#[command(name = "rasterfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize multi-octave gray noise.
    Noise(NoiseArgs),
    /// Add a multi-scale glow to an image.
    Bloom(BloomArgs),
    /// Run a built-in effect through the full host callback path.
    Fx(FxArgs),
}

#[derive(Parser, Debug)]
struct NoiseArgs {
    #[arg(long, default_value_t = 256)]
    width: u32,

    #[arg(long, default_value_t = 256)]
    height: u32,

    #[arg(long, default_value_t = 4)]
    octaves: u32,

    /// Amplitude of the first octave.
    #[arg(long, default_value_t = 0.5)]
    amplitude: f32,

    /// Amplitude ratio between consecutive octaves.
    #[arg(long, default_value_t = 0.5)]
    persistence: f32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BloomArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 4)]
    levels: u32,

    #[arg(long, default_value_t = 1)]
    radius: u32,

    /// Work at 16 bits per channel.
    #[arg(long, default_value_t = false)]
    deep: bool,
}

#[derive(Parser, Debug)]
struct FxArgs {
    /// Input image, placed with its top-left corner at the origin.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// blur, salt-and-pepper, bloom or noise.
    #[arg(long)]
    effect: Builtin,

    /// Parameter override, repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,

    /// Render settings JSON file.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, default_value_t = 0.0)]
    frame: f64,

    /// Pixels added around the input to form the destination tile.
    #[arg(long, default_value_t = 0)]
    margin: u32,
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for '{name}': {e}"))?;
    Ok((name.trim().to_owned(), value))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Noise(args) => cmd_noise(args),
        Command::Bloom(args) => cmd_bloom(args),
        Command::Fx(args) => cmd_fx(args),
    }
}

fn write_output(buf: &PixelBuffer, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    save_png(buf, out).with_context(|| format!("write png '{}'", out.display()))?;
    println!("{:016x}", buffer_hash(buf));
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_noise(args: NoiseArgs) -> anyhow::Result<()> {
    let octaves = args.octaves.clamp(1, *OCTAVES_MAX);
    if octaves != args.octaves {
        tracing::info!(requested = args.octaves, octaves, "octave count clamped");
    }
    let amps: Vec<f32> = (0..octaves as i32)
        .map(|i| args.amplitude * args.persistence.powi(i))
        .collect();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let field = octave_noise(&mut rng, args.width, args.height, 1, &amps)?;

    let mut buf = PixelBuffer::new(args.width, args.height, Depth::U8);
    for y in 0..args.height {
        for x in 0..args.width {
            let v = (0.5 + field.at(x, y)[0]).clamp(0.0, 1.0);
            buf.set_pixel_unit(x, y, [v, v, v, 1.0]);
        }
    }
    write_output(&buf, &args.out)
}

fn cmd_bloom(args: BloomArgs) -> anyhow::Result<()> {
    let depth = if args.deep { Depth::U16 } else { Depth::U8 };
    tracing::info!(?depth, "bloom working depth");
    let img = load_image(&args.in_path, depth)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let glow = bloom(&img.to_float(), args.levels, args.radius)?;
    let out = PixelBuffer::from_float(&glow, depth)?;
    write_output(&out, &args.out)
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<RenderSettings> {
    let Some(path) = path else {
        return Ok(RenderSettings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read settings '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse settings '{}'", path.display()))
}

fn cmd_fx(args: FxArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let element_type = settings.element_type();
    let depth = element_type
        .depth()
        .with_context(|| format!("unsupported bpp {}", settings.bpp))?;
    tracing::info!(?element_type, "destination format");

    let img = load_image(&args.in_path, depth)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));

    let plugin = Arc::new(args.effect.plugin());
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin))?;
    if let Some(port) = plugin.meta().port_name(0) {
        let src = host.add_source(img, Point::ZERO);
        host.connect(node, port, src)?;
    }
    for (name, value) in &args.params {
        host.set_param(node, name, *value)
            .with_context(|| format!("effect '{}' has no parameter '{name}'", args.effect))?;
    }

    let m = f64::from(args.margin);
    let rect = HostRect::new(-m, -m, w + m, h + m);
    let mut tile = host
        .render(node, &settings, args.frame, rect)
        .with_context(|| format!("render '{}'", args.effect))?;
    tracing::debug!(rect = ?tile.rect(), "tile rendered");
    let out = tile.to_buffer()?;
    write_output(&out, &args.out)
}
