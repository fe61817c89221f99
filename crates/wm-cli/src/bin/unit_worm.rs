use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wm_cohort::{
    BatchReport, CENTERLINE_EXPORT_POINTS, CohortAverage, CohortConfig, CohortFilter, WormRecord,
    WormStore, canonical_profile, centerline_positions, format_xy, landmark_positions,
    straighten_all,
};
use wm_core::{BorderMode, Image, Pixel};
use wm_warp::{CanonicalProfile, Warp, WarpConfig, render_body_mask};

#[derive(Parser, Debug)]
#[command(name = "unit_worm")]
#[command(about = "Straighten worm images along their centerline and build unit worms")]
struct Cli {
    /// Pixel depth images are read and written at.
    #[arg(long, value_enum, default_value_t = BitDepth::Sixteen, global = true)]
    bit_depth: BitDepth,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Body masks, straightened warps, centerlines and landmarks for a data set.
    #[command(name = "warps")]
    Warps(WarpsArgs),
    /// Warp every worm in the age cohort onto the cohort-average shape.
    #[command(name = "unit-worms")]
    UnitWorms(UnitWormsArgs),
    /// Compute the cohort-average profile only.
    #[command(name = "profile")]
    Profile(ProfileArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum BitDepth {
    #[value(name = "8")]
    Eight,
    #[value(name = "16")]
    Sixteen,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    Reflect,
    Clamp,
    Zero,
}

#[derive(Args, Debug, Clone)]
struct WarpArgs {
    #[arg(long, default_value_t = 1.0)]
    longitudinal_step: f64,
    #[arg(long, default_value_t = 1.0)]
    transverse_step: f64,
    #[arg(long, default_value_t = 2.0)]
    width_margin: f64,
    #[arg(long, value_enum, default_value_t = Border::Reflect)]
    border: Border,
}

impl WarpArgs {
    fn to_config(&self) -> Result<WarpConfig> {
        let cfg = WarpConfig {
            longitudinal_step: self.longitudinal_step,
            transverse_step: self.transverse_step,
            width_margin: self.width_margin,
            border: match self.border {
                Border::Reflect => BorderMode::Reflect,
                Border::Clamp => BorderMode::Clamp,
                Border::Zero => BorderMode::Constant(0.0),
            },
            ..WarpConfig::default()
        };
        cfg.validate().context("validating warp options")?;
        Ok(cfg)
    }
}

#[derive(Args, Debug, Clone)]
struct CohortArgs {
    /// Cohort ages are strictly greater than this (days).
    #[arg(long, default_value_t = 3.0)]
    age_min: f64,
    /// Cohort ages are strictly less than this (days).
    #[arg(long, default_value_t = 8.0)]
    age_max: f64,
    #[arg(long, default_value_t = 100)]
    width_samples: usize,
}

impl CohortArgs {
    fn to_config(&self) -> CohortConfig {
        CohortConfig {
            filter: CohortFilter {
                age_min: self.age_min,
                age_max: self.age_max,
            },
            width_samples: self.width_samples,
            ..CohortConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
struct WarpsArgs {
    /// Directory holding `metadata/` and `images/`.
    #[arg(long, required = true)]
    data_dir: PathBuf,
    #[command(flatten)]
    warp: WarpArgs,
}

#[derive(Args, Debug, Clone)]
struct UnitWormsArgs {
    #[arg(long, required = true)]
    metadata_dir: PathBuf,
    #[arg(long, required = true)]
    image_dir: PathBuf,
    #[arg(long, required = true)]
    out_dir: PathBuf,
    #[command(flatten)]
    cohort: CohortArgs,
    #[command(flatten)]
    warp: WarpArgs,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    #[arg(long, required = true)]
    metadata_dir: PathBuf,
    /// Write the profile here instead of printing it.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    cohort: CohortArgs,
}

#[derive(Debug, Clone, Serialize)]
struct TckDto {
    t: Vec<f64>,
    c: Vec<f64>,
    k: usize,
}

#[derive(Debug, Clone, Serialize)]
struct ProfileDto {
    age_min: f64,
    age_max: f64,
    members: Vec<String>,
    length: f64,
    width_samples: Vec<f64>,
    width_tck: TckDto,
}

impl ProfileDto {
    fn new(profile: &CanonicalProfile, average: &CohortAverage, filter: &CohortFilter) -> Self {
        let width = profile.width();
        Self {
            age_min: filter.age_min,
            age_max: filter.age_max,
            members: average.members.clone(),
            length: profile.length(),
            width_samples: average.width_samples.clone(),
            width_tck: TckDto {
                t: width.knots().to_vec(),
                c: width.coeffs().iter().map(|[w]| *w).collect(),
                k: width.degree(),
            },
        }
    }
}

/// Grayscale pixel types the driver reads and writes.
trait LumaPixel: Pixel {
    fn load(path: &Path) -> Result<Image<Self>>;
    fn save(path: &Path, img: &Image<Self>) -> Result<()>;
}

impl LumaPixel for u8 {
    fn load(path: &Path) -> Result<Image<u8>> {
        let luma = open_image(path)?.to_luma8();
        let (w, h) = luma.dimensions();
        Image::from_vec(w as usize, h as usize, luma.into_raw())
            .with_context(|| format!("constructing image from {}", path.display()))
    }

    fn save(path: &Path, img: &Image<u8>) -> Result<()> {
        let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
            .context("constructing GrayImage from raw bytes")?;
        gray.save(path)
            .with_context(|| format!("saving image {}", path.display()))
    }
}

impl LumaPixel for u16 {
    fn load(path: &Path) -> Result<Image<u16>> {
        let luma = open_image(path)?.to_luma16();
        let (w, h) = luma.dimensions();
        Image::from_vec(w as usize, h as usize, luma.into_raw())
            .with_context(|| format!("constructing image from {}", path.display()))
    }

    fn save(path: &Path, img: &Image<u16>) -> Result<()> {
        let gray: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
                .context("constructing 16-bit image from raw samples")?;
        gray.save(path)
            .with_context(|| format!("saving image {}", path.display()))
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).with_context(|| format!("opening input image {}", path.display()))
}

/// Output layout of the `warps` command under one data directory.
struct WarpDirs<T> {
    images: PathBuf,
    masks: PathBuf,
    warps: PathBuf,
    centerlines: PathBuf,
    landmarks: PathBuf,
    _pixel: PhantomData<T>,
}

impl<T> WarpDirs<T> {
    fn create(data_dir: &Path) -> Result<Self> {
        let dirs = Self {
            images: data_dir.join("images"),
            masks: data_dir.join("masks"),
            warps: data_dir.join("warps"),
            centerlines: data_dir.join("centerlines"),
            landmarks: data_dir.join("landmarks"),
            _pixel: PhantomData,
        };
        for dir in [&dirs.masks, &dirs.warps, &dirs.centerlines, &dirs.landmarks] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }
        Ok(dirs)
    }
}

impl<T: LumaPixel> WormStore for WarpDirs<T> {
    type Pixel = T;
    type Error = anyhow::Error;

    fn load_image(&mut self, record: &WormRecord) -> Result<Image<T>> {
        T::load(&find_image(&self.images, record.name())?)
    }

    fn store_warp(&mut self, record: &WormRecord, source: &Image<T>, warp: &Warp<T>) -> Result<()> {
        let name = record.name();
        let mask = render_body_mask(
            record.centerline(),
            record.width(),
            source.width(),
            source.height(),
        );
        u8::save(&self.masks.join(format!("{name}.png")), &mask)?;
        T::save(
            &self.warps.join(format!("{name}.png")),
            &warp.masked().transposed(),
        )?;

        let centerline = centerline_positions(record, CENTERLINE_EXPORT_POINTS);
        write_text(
            &self.centerlines.join(format!("{name}.txt")),
            &format_xy(&centerline),
        )?;
        match landmark_positions(record) {
            Ok(points) => write_text(
                &self.landmarks.join(format!("{name}.txt")),
                &format_xy(&points),
            )?,
            Err(err) => debug!(worm = name, %err, "no landmarks written"),
        }
        Ok(())
    }
}

struct UnitWormDir<T> {
    images: PathBuf,
    out: PathBuf,
    _pixel: PhantomData<T>,
}

impl<T: LumaPixel> WormStore for UnitWormDir<T> {
    type Pixel = T;
    type Error = anyhow::Error;

    fn load_image(&mut self, record: &WormRecord) -> Result<Image<T>> {
        T::load(&find_image(&self.images, record.name())?)
    }

    fn store_warp(&mut self, record: &WormRecord, _source: &Image<T>, warp: &Warp<T>) -> Result<()> {
        let path = self.out.join(format!("{}_unit_worm.png", record.name()));
        info!(path = %path.display(), "writing unit worm");
        T::save(&path, &warp.masked().transposed())
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.bit_depth {
        BitDepth::Eight => run::<u8>(cli.cmd),
        BitDepth::Sixteen => run::<u16>(cli.cmd),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run<T: LumaPixel>(cmd: Command) -> Result<()> {
    match cmd {
        Command::Warps(args) => run_warps::<T>(args),
        Command::UnitWorms(args) => run_unit_worms::<T>(args),
        Command::Profile(args) => run_profile(args),
    }
}

fn run_warps<T: LumaPixel>(args: WarpsArgs) -> Result<()> {
    let cfg = args.warp.to_config()?;
    let records = load_catalog(&args.data_dir.join("metadata"))?;
    let mut store = WarpDirs::<T>::create(&args.data_dir)?;

    let report = straighten_all(&records, &mut store, &cfg);
    finish(&report)
}

fn run_unit_worms<T: LumaPixel>(args: UnitWormsArgs) -> Result<()> {
    let cfg = args.warp.to_config()?;
    let cohort = args.cohort.to_config();
    let records = load_catalog(&args.metadata_dir)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let mut store = UnitWormDir::<T> {
        images: args.image_dir.clone(),
        out: args.out_dir.clone(),
        _pixel: PhantomData,
    };
    let run = wm_cohort::run_unit_worms(&records, &mut store, &cohort, &cfg)
        .context("building unit worms")?;

    write_json(
        &args.out_dir.join("profile.json"),
        &ProfileDto::new(&run.profile, &run.average, &cohort.filter),
    )?;
    finish(&run.report)
}

fn run_profile(args: ProfileArgs) -> Result<()> {
    let cohort = args.cohort.to_config();
    let records = load_catalog(&args.metadata_dir)?;
    let (profile, average) =
        canonical_profile(&records, &cohort).context("averaging cohort profile")?;
    let dto = ProfileDto::new(&profile, &average, &cohort.filter);

    match args.out {
        Some(path) => write_json(&path, &dto),
        None => {
            println!(
                "{}",
                serde_json::to_string_pretty(&dto).context("serializing json")?
            );
            Ok(())
        }
    }
}

fn finish(report: &BatchReport) -> Result<()> {
    for skipped in &report.skipped {
        warn!(worm = %skipped.name, reason = %skipped.reason, "not written");
    }
    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "done"
    );
    if report.written.is_empty() && !report.skipped.is_empty() {
        bail!("every worm failed; nothing was written");
    }
    Ok(())
}

/// Parses every `*.json` file in `dir`, named by file stem, in file name
/// order. Unparseable metadata is logged and left out.
fn load_catalog(dir: &Path) -> Result<Vec<WormRecord>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing metadata directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(file = %path.display(), "skipping metadata with a non UTF-8 name");
            continue;
        };
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping unreadable metadata");
                continue;
            }
        };
        match WormRecord::from_json(name, &bytes) {
            Ok(record) => records.push(record),
            Err(err) => warn!(file = %path.display(), %err, "skipping metadata"),
        }
    }

    info!(dir = %dir.display(), worms = records.len(), "metadata loaded");
    Ok(records)
}

/// `<name>.png` if present, otherwise the first file (by name) that is
/// `name` followed by a separator, e.g. `<name>.tif` or `<name>_bf.png`.
fn find_image(dir: &Path, name: &str) -> Result<PathBuf> {
    let exact = dir.join(format!("{name}.png"));
    if exact.is_file() {
        return Ok(exact);
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing image directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|f| is_image_of(f, name))
        })
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .with_context(|| format!("no image for {name} in {}", dir.display()))
}

fn is_image_of(file_name: &str, name: &str) -> bool {
    file_name
        .strip_prefix(name)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_alphanumeric())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{BitDepth, Border, Cli, Command, find_image, is_image_of, load_catalog};
    use clap::{CommandFactory, Parser};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("unit_worm_{tag}_{nanos}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    const RECORD: &str = r#"{
        "spine_tck": {"t": [0, 0, 1, 1], "c": [[0, 0], [100, 0]], "k": 1},
        "width_tck": {"t": [0, 0, 1, 1], "c": [4, 4], "k": 1},
        "age_days": 5.0
    }"#;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_bit_depth_and_defaults() {
        let cli = Cli::try_parse_from(["unit_worm", "--bit-depth", "8", "warps", "--data-dir", "d"])
            .expect("valid arguments");
        assert_eq!(cli.bit_depth, BitDepth::Eight);
        let Command::Warps(args) = cli.cmd else {
            panic!("expected warps");
        };
        let cfg = args.warp.to_config().expect("valid config");
        assert_eq!(cfg.width_margin, 2.0);
        assert_eq!(args.warp.border, Border::Reflect);

        let cli = Cli::try_parse_from([
            "unit_worm",
            "unit-worms",
            "--metadata-dir",
            "m",
            "--image-dir",
            "i",
            "--out-dir",
            "o",
            "--age-min",
            "2.5",
        ])
        .expect("valid arguments");
        assert_eq!(cli.bit_depth, BitDepth::Sixteen);
        let Command::UnitWorms(args) = cli.cmd else {
            panic!("expected unit-worms");
        };
        let cohort = args.cohort.to_config();
        assert_eq!(cohort.filter.age_min, 2.5);
        assert_eq!(cohort.filter.age_max, 8.0);
        assert_eq!(cohort.width_samples, 100);
    }

    #[test]
    fn rejects_unknown_bit_depth_and_bad_steps() {
        let twelve = ["unit_worm", "--bit-depth", "12", "profile", "--metadata-dir", "m"];
        assert!(Cli::try_parse_from(twelve).is_err());

        let cli = Cli::try_parse_from([
            "unit_worm",
            "warps",
            "--data-dir",
            "d",
            "--transverse-step",
            "0",
        ])
        .expect("valid arguments");
        let Command::Warps(args) = cli.cmd else {
            panic!("expected warps");
        };
        assert!(args.warp.to_config().is_err());
    }

    #[test]
    fn image_lookup_does_not_take_a_longer_name() {
        assert!(is_image_of("w1.tif", "w1"));
        assert!(is_image_of("w1_bf.png", "w1"));
        assert!(!is_image_of("w10.png", "w1"));
        assert!(!is_image_of("w1", "w1"));
        assert!(!is_image_of("x1.png", "w1"));

        let dir = unique_temp_dir("images");
        fs::write(dir.join("w10.png"), b"").expect("write");
        assert!(find_image(&dir, "w1").is_err());
        fs::write(dir.join("w1.tif"), b"").expect("write");
        assert_eq!(find_image(&dir, "w1").expect("found"), dir.join("w1.tif"));
        fs::write(dir.join("w1.png"), b"").expect("write");
        assert_eq!(find_image(&dir, "w1").expect("found"), dir.join("w1.png"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn catalog_skips_unreadable_and_malformed_metadata() {
        let dir = unique_temp_dir("catalog");
        fs::write(dir.join("good.json"), RECORD).expect("write");
        fs::write(dir.join("broken.json"), "{ not json").expect("write");
        fs::create_dir(dir.join("unreadable.json")).expect("mkdir");

        let records = load_catalog(&dir).expect("directory is listable");
        let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["good"]);
        fs::remove_dir_all(&dir).ok();
    }
}
