use clap::{Parser, Subcommand, ValueEnum};
use composure::codec::{ImageCodec, RustCodec, encode_png};
use composure::style::{BackgroundSpec, InsetMode, OutputShape};
use composure::{batch, compose, config, output};
use std::io::Write;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "composure")]
#[command(about = "Beautify screenshots: trim, round, shadow and frame on a background")]
#[command(long_about = "\
Beautify screenshots: trim, round, shadow and frame on a background

Each screenshot goes through the same pipeline:

  shot.png
  ├── trim         uniform borders and window chrome are cut away
  ├── corners      content gets anti-aliased rounded corners
  ├── shadow       a blurred, tinted copy of the silhouette is offset below
  ├── background   solid, linear, radial or a built-in preset
  └── compose      everything is layered onto a padded canvas

Settings come from, in increasing priority:
  stock defaults → ~/.config/composure/config.toml (or --config)
                 → --preset FILE → command-line flags

Run 'composure gen-config' to print a documented config.toml.
Run 'composure presets' to list the built-in backgrounds and platform sizes.

Pipe straight to the clipboard with:
  composure render shot.png -o - | wl-copy")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ~/.config/composure/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Style preset file: a TOML `[style]` table applied on top of the config
    #[arg(long, global = true)]
    preset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single screenshot
    Render(RenderArgs),
    /// Render every screenshot in a directory
    Batch {
        /// Directory of screenshots (not searched recursively)
        dir: PathBuf,

        /// Output directory (default: next to the screenshots)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Ignore the render cache and re-render everything
        #[arg(long)]
        no_cache: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// List built-in background presets and platform sizes
    Presets,
    /// Load and validate the layered configuration
    CheckConfig,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Screenshot to render
    input: PathBuf,

    /// Output file, or `-` for PNG on stdout (default: <input>-composed.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Padding around the content, in pixels
    #[arg(long)]
    padding: Option<i32>,

    /// Corner radius, in pixels
    #[arg(long)]
    radius: Option<f32>,

    /// Background preset name (see `composure presets`)
    #[arg(long)]
    background: Option<String>,

    /// Fixed canvas for a social platform (see `composure presets`)
    #[arg(long)]
    platform: Option<String>,

    /// Disable the drop shadow
    #[arg(long)]
    no_shadow: bool,

    /// Border trimming
    #[arg(long, value_enum)]
    inset: Option<InsetArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum InsetArg {
    Auto,
    None,
}

impl RenderArgs {
    /// Command-line flags are the last config layer.
    fn apply(&self, config: &mut config::Config) {
        let style = &mut config.style;
        if let Some(padding) = self.padding {
            style.padding = padding;
        }
        if let Some(radius) = self.radius {
            style.radius = radius;
        }
        if let Some(name) = &self.background {
            style.background = BackgroundSpec::preset(name);
        }
        if let Some(name) = &self.platform {
            style.output = OutputShape::Platform { name: name.clone() };
        }
        if self.no_shadow {
            style.shadow.opacity = 0.0;
        }
        match self.inset {
            Some(InsetArg::Auto) => style.inset = InsetMode::Auto,
            Some(InsetArg::None) => style.inset = InsetMode::None,
            None => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let mut cfg = config::load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            args.apply(&mut cfg);
            cfg.validate()?;
            init_thread_pool(&cfg.processing);

            let codec = RustCodec::new();
            let source = codec.decode(&args.input)?;
            let rendered = compose::render_detailed(&source, &cfg.style)?;

            let destination = match &args.output {
                Some(path) if path.as_os_str() == "-" => None,
                Some(path) => Some(path.clone()),
                None => Some(default_render_output(&args.input)?),
            };
            match &destination {
                Some(path) => codec.encode(&rendered.image, path)?,
                None => {
                    let png = encode_png(&rendered.image)?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&png)?;
                    stdout.flush()?;
                }
            }
            output::print_render_output(
                &args.input,
                source.dimensions(),
                &rendered,
                destination.as_deref(),
            );
        }
        Command::Batch {
            dir,
            output: output_dir,
            no_cache,
        } => {
            let cfg = config::load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            init_thread_pool(&cfg.processing);
            let output_dir = output_dir.unwrap_or_else(|| dir.clone());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::batch(&dir, &output_dir, &cfg.style, !no_cache, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let result = result?;
            output::print_batch_summary(&result);
            if !result.failures.is_empty() {
                return Err(format!("{} screenshot(s) failed", result.failures.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Presets => {
            output::print_presets();
        }
        Command::CheckConfig => {
            let cfg = config::load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            output::print_config_summary(&cfg);
            println!("==> Config is valid");
        }
    }

    Ok(())
}

/// `shot.png` → `shot-composed.png`, next to the input.
fn default_render_output(input: &Path) -> Result<PathBuf, String> {
    let name = batch::output_name(input)
        .ok_or_else(|| format!("cannot derive an output name from {}", input.display()))?;
    Ok(input.with_file_name(name))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
