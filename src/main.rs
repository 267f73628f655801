use std::{path::PathBuf, process};

use clap::Parser;
use log::{error, info, LevelFilter};

use escpos_img::{
    print_file, test_pattern, Config, DitherAlgorithm, Error, Layout, OutputKind,
    DEFAULT_DEBUG_IMAGE_PATH,
};

//
// escpos-img --image photo.jpg
// escpos-img --image photo.jpg --output network --network-addr 192.168.1.100:9100
// escpos-img --image photo.jpg --dithering threshold --debug-output
// escpos-img --image photo.jpg --print-mode bit-image
//
#[derive(Parser, Debug)]
#[command(name = "escpos-img", version = escpos_img::VERSION)]
#[command(about = "Processes images for ESC/POS thermal printers")]
struct Cli {
    /// Path to the image file
    #[arg(long, required_unless_present = "test_pattern")]
    image: Option<PathBuf>,

    /// Paper width in millimeters
    #[arg(long, default_value_t = 80)]
    paper_width: u32,

    /// Printer DPI
    #[arg(long, default_value_t = 203)]
    dpi: u32,

    /// Dithering algorithm (floyd-steinberg, atkinson, threshold, bayer, burkes,
    /// sierra-lite, jarvis-judice-ninke, shadura)
    #[arg(long, default_value = "floyd-steinberg")]
    dithering: String,

    /// ESC/POS print mode (raster, bit-image)
    #[arg(long, default_value = "raster")]
    print_mode: String,

    /// Save dithered image for debugging
    #[arg(long)]
    debug_output: bool,

    /// Path to save debug image
    #[arg(long, default_value = DEFAULT_DEBUG_IMAGE_PATH)]
    debug_image: PathBuf,

    /// Optional text to print before the image
    #[arg(long, default_value = "")]
    debug_text: String,

    /// Send paper cut command after printing
    #[arg(long)]
    cut: bool,

    /// Output method (stdout, network, file)
    #[arg(long, default_value = "stdout")]
    output: String,

    /// Network address for network output (e.g. 192.168.1.100:9100)
    #[arg(long)]
    network_addr: Option<String>,

    /// File path for file output
    #[arg(long)]
    file_path: Option<PathBuf>,

    /// Print a checkerboard test page instead of an image
    #[arg(long)]
    test_pattern: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    if let Err(err) = run(cli) {
        error!("{}", err);
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            error!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let dithering: DitherAlgorithm = cli.dithering.parse()?;
    let layout: Layout = cli.print_mode.parse()?;
    let kind: OutputKind = cli.output.parse()?;

    let mut config = Config::new()
        .paper_width_mm(cli.paper_width)
        .dpi(cli.dpi)
        .dithering(dithering)
        .layout(layout)
        .caption(cli.debug_text)
        .cut_paper(cli.cut);
    if cli.debug_output {
        config = config.debug_capture(cli.debug_image);
    }
    config.validate()?;

    // Connect before any image work so an unreachable printer fails fast.
    let mut output = escpos_img::open_output(
        kind,
        cli.network_addr.as_deref(),
        cli.file_path.as_deref(),
    )?;

    if cli.test_pattern {
        let commands = test_pattern(config.pixel_width() as usize, 64);
        output.write(commands.as_bytes())?;
        output.close()?;
        info!("Test pattern sent");
        return Ok(());
    }

    match cli.image {
        Some(image) => {
            print_file(&image, &config, output.as_mut())?;
            info!("Image processed successfully");
            Ok(())
        }
        None => Err(Error::InvalidConfig("--image is required".to_string())),
    }
}
