//! Observable Registry Demo CLI
//!
//! Command-line demonstration of the observable-registry library. It wires a notice
//! board subject to console observers and runs a script of registry operations:
//! - Register / unregister observers
//! - Publish notices to one or all observers
//! - Run the observable's custom action
//! - Look observers up by id

use anyhow::Result;
use clap::Parser;
use observable_registry::SubjectKind;
use std::path::PathBuf;

mod config;
mod console;
mod notice;
mod report;
mod runner;

use config::DemoScript;
use runner::Runner;

/// Observable Demo - run scripted observer registry scenarios
#[derive(Parser, Debug)]
#[command(name = "observable-cli")]
#[command(about = "Run scripted observer registry scenarios", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a script file (script.toml); the built-in demo runs without one
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the number of observer slots
    #[arg(long, value_name = "COUNT")]
    capacity: Option<usize>,

    /// Override the subject kind (transaction, trigger, custom_first, custom_second)
    #[arg(long, value_name = "KIND")]
    kind: Option<SubjectKind>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Observable CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using registry library v{}", observable_registry::VERSION);

    let mut script = match &args.config {
        Some(path) => {
            log::info!("Loading script from: {:?}", path);
            config::load_config(path)?
        }
        None => DemoScript::builtin(),
    };

    if let Some(capacity) = args.capacity {
        script.registry.capacity = capacity;
    }
    if let Some(kind) = args.kind {
        script.registry.kind = kind;
    }
    script.validate()?;

    // Console lines would corrupt the JSON document.
    let echo = !args.json && !args.quiet;
    let report = Runner::new(&script, echo)?.run(&script.steps);

    if args.json {
        println!("{}", report.to_json()?);
    } else if !args.quiet {
        println!("\n{}", report);
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
