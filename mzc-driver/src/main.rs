//! MinZ C Backend Driver
//!
//! Command-line entry point: compiles a JSON unit description to C, or
//! emits one of the built-in sample units.

use clap::{Parser, Subcommand};
use log::{debug, info};
use mzc_backend::{generate_c, lower_unit, CodegenOptions, GeneratedUnit, ManglingMode, RuntimeMode};
use mzc_common::ErrorReporter;
use mzc_ir::{samples, Unit};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mzc")]
#[command(about = "MinZ C backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log lowering and emission details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON unit description to C
    Compile {
        /// Input unit (JSON)
        input: PathBuf,

        /// Output C file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Code generation options (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print the lowered register form to stderr before emitting
        #[arg(long)]
        print_lowered: bool,
    },

    /// Emit a built-in sample unit
    Demo {
        /// Which sample: simple_add or add_numbers
        #[arg(short, long, default_value = "simple_add")]
        name: String,

        /// Directory path used in the sample's function identities
        #[arg(long, default_value = samples::SAMPLE_PATH)]
        path: String,

        /// Output C file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line adjustments applied on top of the loaded options
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// Keep `-` and `.` from paths and modules verbatim in symbols
    #[arg(long)]
    legacy_mangling: bool,

    /// Declare runtime helpers instead of defining them
    #[arg(long)]
    extern_runtime: bool,

    /// Source name of the start function wrapped by `main`
    #[arg(long)]
    entry: Option<String>,

    /// Do not emit a `main` wrapper
    #[arg(long, conflicts_with = "entry")]
    no_entry: bool,
}

impl Overrides {
    fn apply(&self, options: &mut CodegenOptions) {
        if self.legacy_mangling {
            options.mangling = ManglingMode::Legacy;
        }
        if self.extern_runtime {
            options.runtime = RuntimeMode::Extern;
        }
        if let Some(entry) = &self.entry {
            options.entry_point = Some(entry.clone());
        }
        if self.no_entry {
            options.entry_point = None;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Compile { input, output, config, overrides, print_lowered } => {
            compile_command(&input, output.as_deref(), config.as_deref(), &overrides, print_lowered)
        }
        Commands::Demo { name, path, output, overrides } => {
            demo_command(&name, &path, output.as_deref(), &overrides)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_options(config: Option<&Path>) -> Result<CodegenOptions, Box<dyn std::error::Error>> {
    let options = match config {
        Some(path) => {
            debug!("Loading options from {}", path.display());
            serde_json::from_str(&fs::read_to_string(path)?)?
        }
        None => CodegenOptions::default(),
    };
    Ok(options)
}

fn compile_command(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    overrides: &Overrides,
    print_lowered: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Compiling {}", input.display());
    let unit: Unit = serde_json::from_str(&fs::read_to_string(input)?)?;

    let mut options = load_options(config)?;
    overrides.apply(&mut options);
    options.validate()?;

    if print_lowered {
        let lowered = lower_unit(&unit, &options)?;
        for function in &lowered.functions {
            eprintln!("{}", function);
        }
    }

    let generated = generate_c(&unit, &options)?;
    finish(generated, output)
}

fn sample_unit(name: &str, path: &str) -> Result<Unit, String> {
    match name {
        "simple_add" => Ok(samples::simple_add_unit(path)),
        "add_numbers" => Ok(samples::add_numbers_driver_unit(path, &[(10, 20), (42, 13), (100, 200)])),
        _ => Err(format!("Unknown sample: {}", name)),
    }
}

fn demo_command(
    name: &str,
    path: &str,
    output: Option<&Path>,
    overrides: &Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let unit = sample_unit(name, path)?;
    let mut options = CodegenOptions::default();
    overrides.apply(&mut options);

    let generated = generate_c(&unit, &options)?;
    finish(generated, output)
}

/// Report diagnostics and write the C text
fn finish(generated: GeneratedUnit, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = ErrorReporter::new();
    for diagnostic in generated.diagnostics {
        reporter.report(diagnostic);
    }
    if !reporter.diagnostics().is_empty() {
        reporter.print_diagnostics();
        eprintln!("{}", reporter.summary());
    }

    match output {
        Some(path) => {
            fs::write(path, &generated.code)?;
            info!("C written to {}", path.display());
        }
        None => print!("{}", generated.code),
    }
    Ok(())
}
