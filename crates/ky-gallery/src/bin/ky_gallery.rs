use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{ImageBuffer, Luma};
use kymograph::memory::{MemoryImage, MemoryKymograph, MemoryPixels, MemoryRois, MemorySink};
use kymograph::{
    AffineRotator, ChannelInfo, Image, Interpolation, KymographCalibration, KymographParams,
    LineSampler, PlaneIndex, Point2f, RoiRecord, Segment2f, SourceCalibration, process_images,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ky_gallery")]
#[command(about = "Build kymographs from PNG frame fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch over one fixture movie and its ROIs.
    #[command(name = "build")]
    Build(BuildArgs),
    /// Sample a single strip along a segment of one image.
    #[command(name = "strip")]
    Strip(StripArgs),
}

#[derive(Args, Debug, Clone)]
struct BuildArgs {
    #[arg(long, required = true)]
    fixture: PathBuf,
    #[arg(long, default_value = "out/kymographs")]
    out: PathBuf,
    #[arg(long, default_value_t = 4)]
    line_width: usize,
    /// Only sample timepoints that carry their own shape.
    #[arg(long)]
    sparse: bool,
    #[arg(long, default_value_t = Interpolation::Bicubic)]
    interpolation: Interpolation,
    #[arg(long)]
    time_increment: Option<f64>,
    #[arg(long)]
    pixel_size: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct StripArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    x1: f32,
    #[arg(long, allow_hyphen_values = true)]
    y1: f32,
    #[arg(long, allow_hyphen_values = true)]
    x2: f32,
    #[arg(long, allow_hyphen_values = true)]
    y2: f32,
    #[arg(long, default_value_t = 4)]
    width: usize,
    #[arg(long, default_value_t = Interpolation::Bicubic)]
    interpolation: Interpolation,
    #[arg(long, required = true)]
    out: PathBuf,
}

/// Movie fixture: per-channel frame lists, paths relative to the fixture.
#[derive(Debug, Clone, Deserialize)]
struct Fixture {
    id: i64,
    name: String,
    channels: Vec<FixtureChannel>,
    #[serde(default)]
    calibration: SourceCalibration,
    #[serde(default)]
    rois: Vec<RoiRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureChannel {
    #[serde(flatten)]
    info: ChannelInfo,
    frames: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct KymographMeta<'a> {
    id: i64,
    name: &'a str,
    description: &'a str,
    source_image_id: i64,
    width: usize,
    height: usize,
    channels: &'a [ChannelInfo],
    calibration: KymographCalibration,
    planes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct StripMeta {
    p1: [f32; 2],
    p2: [f32; 2],
    width: usize,
    length: usize,
    interpolation: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Build(args) => run_build(args),
        Command::Strip(args) => run_strip(args),
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    ensure_file_exists(&args.fixture, "fixture")?;
    let fixture: Fixture = read_json(&args.fixture)?;
    let base = args.fixture.parent().unwrap_or(Path::new("."));

    let image = load_movie(&fixture, base)?;
    let mut rois = MemoryRois::new();
    for roi in fixture.rois {
        rois.insert(fixture.id, roi);
    }

    let params = KymographParams {
        line_width: args.line_width,
        use_all_timepoints: !args.sparse,
        time_increment: args.time_increment,
        pixel_size: args.pixel_size,
        interpolation: args.interpolation,
    };
    let mut sink = MemorySink::new();
    let report = process_images(std::slice::from_ref(&image), &rois, &mut sink, &params)
        .context("running kymograph batch")?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;
    for k in &report.created {
        save_kymograph(&args.out, k)?;
    }

    println!("{}", report.message);
    Ok(())
}

fn run_strip(args: StripArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    let frame = load_input_u16(&args.input)?;
    let pixels = MemoryPixels::from_channels(vec![vec![frame]])
        .context("wrapping input as a single plane")?;

    let seg = Segment2f::new(Point2f::new(args.x1, args.y1), Point2f::new(args.x2, args.y2));
    let sampler = LineSampler::new(AffineRotator::new(args.interpolation));
    let strip = sampler
        .sample(&pixels, PlaneIndex::default(), seg, args.width)
        .context("sampling strip")?;

    save_i32_as_u16(&args.out, &strip)?;
    write_json(
        args.out.with_extension("json"),
        &StripMeta {
            p1: [args.x1, args.y1],
            p2: [args.x2, args.y2],
            width: strip.height(),
            length: strip.width(),
            interpolation: args.interpolation.to_string(),
        },
    )?;
    info!(
        width = strip.width(),
        height = strip.height(),
        out = %args.out.display(),
        "strip written"
    );
    Ok(())
}

fn load_movie(fixture: &Fixture, base: &Path) -> Result<MemoryImage<u16>> {
    if fixture.channels.is_empty() {
        bail!("fixture '{}' has no channels.", fixture.name);
    }

    let mut channels = Vec::with_capacity(fixture.channels.len());
    for ch in &fixture.channels {
        let frames = ch
            .frames
            .iter()
            .map(|p| load_input_u16(&base.join(p)))
            .collect::<Result<Vec<_>>>()?;
        channels.push(frames);
    }

    let pixels = MemoryPixels::from_channels(channels)
        .with_context(|| format!("frames of fixture '{}' differ in count or size", fixture.name))?;
    let mut image = MemoryImage::new(fixture.id, fixture.name.clone(), pixels);
    image.channels = fixture.channels.iter().map(|ch| ch.info.clone()).collect();
    image.calibration = fixture.calibration;
    Ok(image)
}

fn save_kymograph(out: &Path, k: &MemoryKymograph<i32>) -> Result<()> {
    let mut planes = Vec::with_capacity(k.planes.len());
    for (c, plane) in k.planes.iter().enumerate() {
        let file = format!("{}_c{c}.png", k.name);
        save_i32_as_u16(&out.join(&file), plane)?;
        planes.push(file);
    }

    let (width, height) = k
        .planes
        .first()
        .map_or((0, 0), |p| (p.width(), p.height()));
    write_json(
        out.join(format!("{}.json", k.name)),
        &KymographMeta {
            id: k.id,
            name: &k.name,
            description: &k.description,
            source_image_id: k.source_image_id,
            width,
            height,
            channels: &k.channels,
            calibration: k.calibration,
            planes,
        },
    )
}

fn load_input_u16(path: &Path) -> Result<Image<u16>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma16();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing plane from {}", path.display()))
}

fn save_i32_as_u16(path: &Path, img: &Image<i32>) -> Result<()> {
    let data: Vec<u16> = img
        .data()
        .iter()
        .map(|&v| v.clamp(0, u16::MAX as i32) as u16)
        .collect();
    let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(img.width() as u32, img.height() as u32, data)
            .context("constructing 16-bit image from raw samples")?;
    buf.save(path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
