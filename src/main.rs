use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hdlrun_config::{RunManifest, MANIFEST_NAME};
use hdlrun_ports::flatten_ports;
use hdlrun_runner::{DesignInput, RunOptions};
use hdlrun_sim::{available_simulators, WaveformOutput};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

/// hdlrun - run HDL designs and sources through external simulators
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and run a simulation
    Run(RunArgs),

    /// Show the files and commands a run would use, without running them
    Plan(RunArgs),

    /// Print the flattened toplevel ports of the design
    Ports {
        /// Run manifest
        #[arg(short, long, default_value = MANIFEST_NAME)]
        config: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported simulators
    Simulators,
}

#[derive(Args)]
struct RunArgs {
    /// Run manifest
    #[arg(short, long, default_value = MANIFEST_NAME)]
    config: PathBuf,

    /// Simulator to use instead of the manifest's
    #[arg(long)]
    simulator: Option<String>,

    /// Waveform output file (.vcd or .fst)
    #[arg(long)]
    waveform: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Build directory
    #[arg(long)]
    build_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Run(args) => run(&args)?,
        Commands::Plan(args) => plan(&args)?,
        Commands::Ports { config, json } => print_ports(&config, json)?,
        Commands::Simulators => list_simulators(),
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<RunManifest> {
    info!("Loading manifest {}", path.display());
    hdlrun_config::from_path(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Directory relative manifest paths are resolved against
fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the manifest and apply command-line overrides
fn load_run(args: &RunArgs) -> Result<(RunOptions, Option<DesignInput>)> {
    let mut manifest = load_manifest(&args.config)?;
    if let Some(simulator) = &args.simulator {
        manifest.run.simulator = Some(simulator.clone());
    }
    if args.waveform.is_some() {
        manifest.run.waveform = None;
        manifest.run.vcd_file = None;
    }
    manifest
        .validate()
        .with_context(|| format!("Invalid manifest {}", args.config.display()))?;

    let design = manifest.design_input()?;
    let mut options = manifest.into_options(&manifest_dir(&args.config))?;
    if let Some(waveform) = &args.waveform {
        options.waveform_file = Some(waveform.clone());
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(build_dir) = &args.build_dir {
        options.build_dir = Some(build_dir.clone());
    }
    Ok((options, design))
}

fn run(args: &RunArgs) -> Result<()> {
    let (options, design) = load_run(args)?;

    let runtime = Runtime::new()?;
    let outcome = runtime
        .block_on(hdlrun_runner::run(&options, design.as_ref()))
        .context("Simulation failed")?;

    println!(
        "{} run complete ({} steps)",
        outcome.simulator,
        outcome.steps.len()
    );
    if let Some(waveform) = &outcome.waveform {
        println!("Waveform: {}", waveform.display());
    }
    Ok(())
}

fn plan(args: &RunArgs) -> Result<()> {
    let (options, design) = load_run(args)?;
    let build_dir = options
        .build_dir
        .clone()
        .unwrap_or_else(|| manifest_dir(&args.config).join("build"));

    let prepared = hdlrun_runner::prepare(&options, design.as_ref(), &build_dir)?;
    let plan = prepared.plan()?;

    println!("simulator: {}", plan.simulator);
    println!("toplevel:  {}", prepared.job.toplevel);
    println!("build dir: {}", build_dir.display());
    for file in &plan.files {
        println!("write  {}", file.path.display());
    }
    for cmd in &plan.build {
        println!("build  {}", cmd);
    }
    for cmd in &plan.run {
        println!("run    {}", cmd);
    }
    match &plan.waveform {
        Some(WaveformOutput::Direct(path)) => println!("wave   {}", path.display()),
        Some(WaveformOutput::Copy { from, to }) => {
            println!("wave   {} -> {}", from.display(), to.display())
        }
        None => {}
    }
    Ok(())
}

fn print_ports(config: &Path, json: bool) -> Result<()> {
    let manifest = load_manifest(config)?;
    let Some(spec) = manifest.port_spec()? else {
        bail!("{} has no [design] section", config.display());
    };
    let ports = flatten_ports(&spec).context("Invalid port specification")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    for entry in &ports {
        let signal = &entry.signal;
        println!(
            "{:<16} {:<5} {:>4}{} {:<16} {}",
            entry.name,
            signal.direction().vhdl_mode(),
            signal.width(),
            if signal.is_signed() { "s" } else { " " },
            signal.name(),
            entry.path
        );
    }
    Ok(())
}

fn list_simulators() {
    for kind in available_simulators() {
        let languages: Vec<_> = kind
            .languages()
            .iter()
            .map(|language| language.name())
            .collect();
        println!("{:<10} {}", kind.name(), languages.join(", "));
    }
}
