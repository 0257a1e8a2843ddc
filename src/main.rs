use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use pdf_inspector::coords::OriginMode;
use pdf_inspector::panic_handler::initialize_panic_handler;
use pdf_inspector::pdf::{DEFAULT_TIMEOUT, MupdfBackend, PixelBuffer};
use pdf_inspector::settings::Settings;
use pdf_inspector::units::{Unit, UnitSet};
use pdf_inspector::viewer::Viewer;

/// Inspect PDF pages: coordinates in physical units and fonts under a point
#[derive(Parser, Debug)]
#[command(name = "pdf_inspector")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vertical origin for reported coordinates (top-left or bottom-left)
    #[arg(long, global = true, value_parser = parse_origin)]
    origin: Option<OriginMode>,

    /// Comma-separated units to report (px, pt, in, cm, mm, pc)
    #[arg(long, global = true, value_delimiter = ',', value_parser = parse_unit)]
    units: Option<Vec<Unit>>,

    /// Device pixel ratio used for rendering
    #[arg(long, global = true)]
    dpr: Option<f64>,

    #[arg(long, global = true, default_value = "pdf_inspector.log")]
    log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page count, and size and rotation of one page
    Info {
        file: PathBuf,
        #[arg(long)]
        page: Option<usize>,
    },

    /// Map a point on the rendered page to PDF space and detect its font
    Probe {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        scale: Option<f64>,
        /// Horizontal position on the rendered page, in pixels
        #[arg(long)]
        x: f64,
        /// Vertical position from the top of the rendered page, in pixels
        #[arg(long)]
        y: f64,
    },

    /// List the font families used on a page
    Fonts {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Rasterise a page to PNG
    Render {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        scale: Option<f64>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_origin(value: &str) -> Result<OriginMode, String> {
    OriginMode::parse(value).ok_or_else(|| format!("unknown origin '{value}'"))
}

fn parse_unit(value: &str) -> Result<Unit, String> {
    Unit::parse(value).ok_or_else(|| format!("unknown unit '{value}'"))
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|_| anyhow!("invalid log level '{}'", cli.log_level))?;

    let file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) if path.exists() => Settings::load_from_path(path),
        Some(path) => bail!("Config file {} does not exist", path.display()),
        None => Settings::load(),
    };

    if let Some(origin) = cli.origin {
        settings.origin = origin;
    }
    if let Some(units) = &cli.units {
        settings.units = UnitSet::from_units(units.iter().copied());
    }
    if let Some(dpr) = cli.dpr {
        settings.device_pixel_ratio = dpr;
    }
    Ok(settings)
}

fn open(file: &Path, settings: &Settings) -> Result<(Viewer, usize)> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let mut viewer = Viewer::with_config(
        MupdfBackend,
        settings.service_config(),
        settings.view_options(),
    );
    let page_count = viewer
        .open_blocking(bytes, DEFAULT_TIMEOUT)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    info!("Opened {} ({page_count} pages)", file.display());
    Ok((viewer, page_count))
}

/// Make `page` the displayed page at `scale` and wait for its render
fn show_page(viewer: &mut Viewer, page: usize, scale: f64) -> Result<()> {
    let service = viewer.service_mut();
    if !service.set_page(page) {
        bail!(
            "Page {page} is out of range (document has {} pages)",
            service.session().page_count
        );
    }
    service.set_scale(scale);

    let scale = service.session().scale();
    match service.render_page_blocking(page, scale, DEFAULT_TIMEOUT)? {
        Some(_) => Ok(()),
        None => bail!("Page {page} was not rendered"),
    }
}

fn write_png(path: &Path, image: &PixelBuffer) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .context("Failed to write PNG header")?;
    writer
        .write_image_data(&image.pixels)
        .context("Failed to write PNG data")?;
    Ok(())
}

fn run(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Info { file, page } => {
            let (mut viewer, page_count) = open(&file, settings)?;
            println!("Pages: {page_count}");

            if let Some(page) = page {
                show_page(&mut viewer, page, 1.0)?;
                let (width_pt, height_pt) = viewer.session().page_size_pt();
                if let Some(info) = viewer.page_info() {
                    println!(
                        "Page {page}: {} ({width_pt:.2} × {height_pt:.2} pt), rotation {}",
                        info.size_label(),
                        info.rotation_label()
                    );
                }
            }
        }

        Commands::Probe {
            file,
            page,
            scale,
            x,
            y,
        } => {
            let (mut viewer, _) = open(&file, settings)?;
            show_page(&mut viewer, page, scale.unwrap_or_else(|| settings.scale()))?;

            println!("Origin: {}", settings.origin.as_str());
            match viewer.pointer_moved(x, y) {
                Some(readout) => {
                    for line in readout.lines(&settings.units) {
                        println!("{line}");
                    }
                }
                None => println!("Point ({x}, {y}) is outside the page"),
            }
            println!();
            println!("{}", viewer.clicked(x, y));
        }

        Commands::Fonts { file, page } => {
            let (mut viewer, _) = open(&file, settings)?;
            show_page(&mut viewer, page, 1.0)?;

            let fonts = viewer.fonts();
            if fonts.is_empty() {
                let runs = viewer.service().fonts().runs().len();
                println!("No font names reported for page {page} ({runs} text runs)");
            }
            for family in fonts {
                println!("{family}");
            }
        }

        Commands::Render {
            file,
            page,
            scale,
            output,
        } => {
            let (mut viewer, _) = open(&file, settings)?;
            show_page(&mut viewer, page, scale.unwrap_or_else(|| settings.scale()))?;

            let frame = viewer
                .service()
                .current_frame()
                .context("No rendered page to write")?;
            write_png(&output, &frame.image)?;
            println!(
                "Wrote page {page} ({}x{}) to {}",
                frame.image.width,
                frame.image.height,
                output.display()
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    initialize_panic_handler();

    info!("Starting pdf_inspector");
    let settings = load_settings(&cli)?;
    run(cli.command, &settings)
}
