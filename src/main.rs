use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use simple_catalog::imaging::{self, OutputFormat, RustBackend};
use simple_catalog::optimize::{self, OptimizeEvent, OptimizeOptions};
use simple_catalog::{catalog, config, generate, output};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-catalog")]
#[command(about = "Static product-catalog generator")]
#[command(long_about = "\
Static product-catalog generator

Your filesystem is the data source. Category directories hold product
directories; each product has an info.txt and an imagenes/ folder.

Catalog structure:

  Catalogo/
  ├── catalog.toml                 # Config (optional, see gen-config)
  ├── Sillas/                      # Category (lower-cased in the catalog)
  │   ├── SillaRoja/               # Product
  │   │   ├── info.txt             # name / price / description...
  │   │   └── imagenes/
  │   │       ├── 1.jpg            # Natural order: 1, 2, 10
  │   │       └── 2.HEIC           # Legacy format, see `convert`
  │   └── SillaAzul/
  └── Mesas/

info.txt:

  Silla Roja                       # Name
  15.000                           # Price (thousands separators allowed)
  Comoda silla de madera           # Description (one or more lines)

Run 'simple-catalog gen-config' to generate a documented catalog.toml.")]
#[command(version = version_string())]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Catalog root directory
    #[arg(long, default_value = "Catalogo", global = true)]
    source: PathBuf,

    /// Directory for catalogo.json and index.html
    #[arg(long, default_value = ".", global = true)]
    output: PathBuf,

    /// Mirrored directory for optimized images
    #[arg(long, default_value = "CatalogoOptimizado", global = true)]
    optimized: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the catalog and write catalogo.json
    Build {
        /// Also render index.html
        #[arg(long)]
        render: bool,
    },
    /// Validate the catalog without writing anything
    Check,
    /// Render index.html from an existing catalogo.json
    Render,
    /// Optimize every raster image into the mirrored tree
    Optimize,
    /// Write one file per configured width bucket for a single image
    Sizes {
        /// Source image
        image: PathBuf,
        /// Output directory (defaults to the optimized directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert HEIC/HEIF images into the mirrored tree
    #[command(alias = "convertir")]
    Convert {
        /// Target format
        #[arg(value_enum)]
        format: OutputFormat,
    },
    /// Report HEIC/HEIF files without converting them
    #[command(alias = "analizar")]
    Analyze,
    /// Compare source and optimized tree sizes
    Report,
    /// Print a stock catalog.toml with all options documented
    GenConfig,
    /// Print usage
    #[command(alias = "ayuda")]
    Help,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            err.print()?;
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    let command = match cli.command {
        Some(command) => command,
        None => {
            Cli::command().print_long_help()?;
            return Ok(());
        }
    };

    match command {
        Command::Build { render } => {
            let config = config::load_config(&cli.source)?;
            let catalog_path = cli.output.join(&config.catalog.output_file);

            println!("==> Building {}", cli.source.display());
            let build = catalog::build_catalog(&cli.source, &catalog_path, &config)?;
            output::print_catalog_output(
                &build.records,
                &build.summary,
                &config.site.currency_symbol,
            );
            println!("==> Wrote {}", build.output.display());

            if render {
                let page = generate::generate(&catalog_path, &cli.output, &config.site)?;
                println!("==> Rendered {}", page.display());
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let report = simple_catalog::scan::scan(&cli.source, &config.scan_rules())?;
            let summary = catalog::CatalogSummary::from_records(&report.products, report.skipped);
            output::print_catalog_output(&report.products, &summary, &config.site.currency_symbol);
            if summary.skipped.is_empty() {
                println!("==> Catalog is valid");
            } else {
                println!("==> {} products skipped", summary.skipped.len());
            }
        }
        Command::Render => {
            let config = config::load_config(&cli.source)?;
            let catalog_path = cli.output.join(&config.catalog.output_file);
            let page = generate::generate(&catalog_path, &cli.output, &config.site)?;
            println!("==> Rendered {}", page.display());
        }
        Command::Optimize => {
            let config = config::load_config(&cli.source)?;
            let options = OptimizeOptions::from_config(&config.optimize);
            println!(
                "==> Optimizing {} → {} ({})",
                cli.source.display(),
                cli.optimized.display(),
                options.encode.format
            );
            let (tx, printer) = spawn_printer();
            let result = optimize::optimize_tree(
                &RustBackend::new(),
                &cli.source,
                &cli.optimized,
                &options,
                Some(tx),
            );
            join_printer(printer);
            output::print_optimize_result(&result?);
        }
        Command::Sizes { image, out } => {
            let config = config::load_config(&cli.source)?;
            let out_dir = out.unwrap_or_else(|| cli.optimized.clone());
            std::fs::create_dir_all(&out_dir)?;
            let stem = file_stem(&image)?;
            let result = imaging::generate_sizes(
                &RustBackend::new(),
                &image,
                &out_dir,
                &stem,
                &config.optimize.sizes,
                config.optimize.encode_spec(config.optimize.format),
            )?;
            output::print_sizes_output(&result);
            if result.variants.is_empty() && !result.failed.is_empty() {
                return Err(format!("no sizes written for {}", image.display()).into());
            }
        }
        Command::Convert { format } => {
            let config = config::load_config(&cli.source)?;
            if !imaging::heic_supported() {
                tracing::warn!("built without the `heic` feature; HEIC/HEIF files will fail to decode");
            }
            println!(
                "==> Converting HEIC/HEIF in {} → {} ({})",
                cli.source.display(),
                cli.optimized.display(),
                format
            );
            let (tx, printer) = spawn_printer();
            let result = optimize::convert_legacy(
                &RustBackend::new(),
                &cli.source,
                &cli.optimized,
                config.convert.encode_spec(format),
                Some(tx),
            );
            join_printer(printer);
            output::print_optimize_result(&result?);
        }
        Command::Analyze => {
            let report = optimize::analyze_legacy(&cli.source)?;
            output::print_legacy_report(&report);
        }
        Command::Report => {
            let report = optimize::size_report(&cli.source, &cli.optimized)?;
            output::print_size_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Help => {
            Cli::command().print_long_help()?;
        }
    }

    Ok(())
}

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print optimizer events as they arrive, on their own thread.
fn spawn_printer() -> (Sender<OptimizeEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_optimize_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

fn join_printer(printer: JoinHandle<()>) {
    if printer.join().is_err() {
        tracing::warn!("progress printer panicked");
    }
}

fn file_stem(path: &Path) -> Result<String, std::io::Error> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", path.display()),
            )
        })
}
