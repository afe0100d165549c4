//! Validation, build directory preparation and dispatch

use crate::design::DesignInput;
use crate::options::RunOptions;
use crate::platform::Platform;
use crate::{language_list, RunnerError, RunnerResult};
use hdlrun_ports::{flatten_ports, PortList};
use hdlrun_sim::{
    create_simulator, HdlLanguage, SimJob, SimOutcome, SimPlan, Simulator, SimulatorKind,
    WaveformFormat,
};
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Toplevel name used for structured designs when none is given
pub const DEFAULT_TOPLEVEL: &str = "top";

/// File stem of the design's HDL output inside the build directory
pub const DESIGN_OUTPUT_STEM: &str = "hdlrun_output";

/// A validated run, ready to be planned or executed
pub struct PreparedRun {
    pub simulator: Box<dyn Simulator>,
    pub job: SimJob,
    /// Flattened toplevel ports of the structured design, if any
    pub ports: Option<PortList>,
}

impl PreparedRun {
    /// Files and commands the simulator would use
    pub fn plan(&self) -> RunnerResult<SimPlan> {
        Ok(self.simulator.plan(&self.job)?)
    }

    /// Build and run the simulation
    pub async fn execute(&self) -> RunnerResult<SimOutcome> {
        Ok(self.simulator.build_and_run(&self.job).await?)
    }
}

impl fmt::Debug for PreparedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRun")
            .field("simulator", &self.simulator.kind())
            .field("job", &self.job)
            .field("ports", &self.ports)
            .finish()
    }
}

/// Validate `options`, write generated files into `build_dir` and assemble
/// the simulation job
pub fn prepare(
    options: &RunOptions,
    design: Option<&DesignInput>,
    build_dir: &Path,
) -> RunnerResult<PreparedRun> {
    let toplevel = match (&options.toplevel, design) {
        (Some(toplevel), _) => toplevel.clone(),
        (None, Some(_)) => DEFAULT_TOPLEVEL.to_string(),
        (None, None) => return Err(RunnerError::MissingToplevel),
    };

    let kind = resolve_simulator(options, design.is_some())?;
    let mut sources = collect_sources(options, kind)?;

    fs::create_dir_all(build_dir).map_err(RunnerError::io(build_dir))?;
    debug!("Build directory: {}", build_dir.display());

    if let Some(platform) = &options.platform {
        write_extra_files(platform, kind, build_dir, &mut sources)?;
    }

    let ports = match design {
        Some(input) => Some(emit_design(
            input,
            options.language,
            kind,
            &toplevel,
            build_dir,
            &mut sources,
        )?),
        None => None,
    };

    sources.retain(|_, files| !files.is_empty());
    if sources.is_empty() {
        return Err(RunnerError::NoHdlInput);
    }

    let waveform = match (&options.waveform_file, &options.vcd_file) {
        (Some(_), Some(_)) => return Err(RunnerError::ConflictingWaveform),
        (Some(file), None) | (None, Some(file)) => {
            WaveformFormat::from_path(file)?;
            Some(file.clone())
        }
        (None, None) => None,
    };

    let mut job = SimJob::new(toplevel, build_dir);
    job.sources = sources;
    job.parameters = options.parameters.clone();
    job.waveform = waveform;
    job.seed = options.seed;
    job.timescale = options.timescale;
    job.extra_env = options.extra_env.clone();
    job.extra_args = options.extra_args.clone();

    Ok(PreparedRun {
        simulator: create_simulator(kind),
        job,
        ports,
    })
}

/// Prepare and execute a run
///
/// Without a build directory in `options` the run happens in a temporary
/// directory that is removed once the simulation is over.
pub async fn run(options: &RunOptions, design: Option<&DesignInput>) -> RunnerResult<SimOutcome> {
    match &options.build_dir {
        Some(dir) => prepare(options, design, dir)?.execute().await,
        None => {
            let temp = tempfile::Builder::new()
                .prefix("hdlrun-")
                .tempdir()
                .map_err(RunnerError::io(std::env::temp_dir()))?;
            let outcome = prepare(options, design, temp.path())?.execute().await;
            drop(temp);
            outcome
        }
    }
}

fn resolve_simulator(options: &RunOptions, has_design: bool) -> RunnerResult<SimulatorKind> {
    let kind: SimulatorKind = options
        .simulator
        .parse()
        .map_err(|_| RunnerError::UnknownSimulator(options.simulator.clone()))?;

    if let (true, Some(language)) = (has_design, options.language) {
        if !kind.supports(language) {
            return Err(RunnerError::UnsupportedLanguage {
                simulator: kind,
                language,
                supported: language_list(kind.languages()),
            });
        }
    }
    Ok(kind)
}

fn collect_sources(
    options: &RunOptions,
    kind: SimulatorKind,
) -> RunnerResult<IndexMap<HdlLanguage, Vec<PathBuf>>> {
    let mut sources: IndexMap<HdlLanguage, Vec<PathBuf>> = kind
        .languages()
        .iter()
        .map(|language| (*language, Vec::new()))
        .collect();

    for (language, files) in &options.sources {
        if files.is_empty() {
            continue;
        }
        if !kind.supports(*language) {
            return Err(RunnerError::UnsupportedSources {
                simulator: kind,
                language: *language,
            });
        }
        sources
            .entry(*language)
            .or_default()
            .extend(files.iter().cloned());
    }
    Ok(sources)
}

fn write_extra_files(
    platform: &Platform,
    kind: SimulatorKind,
    build_dir: &Path,
    sources: &mut IndexMap<HdlLanguage, Vec<PathBuf>>,
) -> RunnerResult<()> {
    for (name, contents) in platform.extra_files() {
        let path = build_dir.join(name);
        if path.is_file() {
            // Left behind by an earlier run into the same build directory
            let existing = fs::read(&path).map_err(RunnerError::io(&path))?;
            if existing != contents {
                return Err(RunnerError::NameCollision(name.to_string()));
            }
            debug!("Reusing extra file {}", path.display());
        } else {
            fs::write(&path, contents).map_err(RunnerError::io(&path))?;
        }

        let language = HdlLanguage::from_path(&path)
            .filter(|language| kind.supports(*language))
            .ok_or_else(|| RunnerError::UnknownFileLanguage {
                simulator: kind,
                name: name.to_string(),
            })?;
        debug!("Extra {} file: {}", language, path.display());
        sources.entry(language).or_default().push(path);
    }
    Ok(())
}

fn emit_design(
    input: &DesignInput,
    language: Option<HdlLanguage>,
    kind: SimulatorKind,
    toplevel: &str,
    build_dir: &Path,
    sources: &mut IndexMap<HdlLanguage, Vec<PathBuf>>,
) -> RunnerResult<PortList> {
    let design = &input.design;
    let candidates = match language {
        Some(language) => vec![language],
        None => kind.languages().to_vec(),
    };
    let language = candidates
        .iter()
        .copied()
        .find(|language| design.can_emit(*language))
        .ok_or_else(|| RunnerError::NoDesignLanguage {
            options: language_list(&candidates),
        })?;

    let ports = flatten_ports(&input.ports)?;
    let hdl = design.emit(language, toplevel, &ports)?;

    let path = build_dir.join(format!(
        "{}.{}",
        DESIGN_OUTPUT_STEM,
        language.default_extension()
    ));
    fs::write(&path, hdl).map_err(RunnerError::io(&path))?;
    info!(
        "Emitted design '{}' as {} toplevel '{}' with {} ports",
        design.name_hint(),
        language,
        toplevel,
        ports.len()
    );

    sources.entry(language).or_default().push(path);
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::WrapperDesign;
    use hdlrun_ports::{PortValue, Signal};
    use hdlrun_sim::SimError;

    fn adder_input() -> DesignInput {
        DesignInput::new(
            WrapperDesign::new("adder_core"),
            PortValue::mapping([
                ("a", Signal::input("a", 8)),
                ("b", Signal::input("b", 8)),
                ("o", Signal::output("o", 9)),
            ]),
        )
    }

    #[test]
    fn test_missing_toplevel() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new().with_sources(HdlLanguage::Verilog, ["adder.v"]);
        assert!(matches!(
            prepare(&options, None, dir.path()),
            Err(RunnerError::MissingToplevel)
        ));
    }

    #[test]
    fn test_design_defaults_toplevel() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = prepare(&RunOptions::new(), Some(&adder_input()), dir.path()).unwrap();
        assert_eq!(prepared.job.toplevel, DEFAULT_TOPLEVEL);

        let output = dir.path().join("hdlrun_output.v");
        assert_eq!(
            prepared.job.sources_for(HdlLanguage::Verilog),
            [output.clone()]
        );
        let hdl = fs::read_to_string(output).unwrap();
        assert!(hdl.starts_with("module top ("));
        assert!(hdl.contains("adder_core inner ("));
        assert_eq!(prepared.ports.map(|ports| ports.len()), Some(3));
    }

    #[test]
    fn test_unknown_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_simulator("questa")
            .with_sources(HdlLanguage::Verilog, ["adder.v"]);
        let err = prepare(&options, None, dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown simulator: questa");
    }

    #[test]
    fn test_design_language_must_match_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new().with_language(HdlLanguage::Vhdl);
        let err = prepare(&options, Some(&adder_input()), dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Simulator icarus only supports verilog, can't use requested language vhdl"
        );

        // Without a design the language is not checked
        let options = options
            .with_toplevel("adder")
            .with_sources(HdlLanguage::Verilog, ["adder.v"]);
        assert!(prepare(&options, None, dir.path()).is_ok());
    }

    #[test]
    fn test_unsupported_sources() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_simulator("ghdl")
            .with_sources(HdlLanguage::Verilog, ["adder.v"]);
        assert!(matches!(
            prepare(&options, None, dir.path()),
            Err(RunnerError::UnsupportedSources {
                simulator: SimulatorKind::Ghdl,
                language: HdlLanguage::Verilog,
            })
        ));

        // Empty lists for other languages are fine
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_simulator("ghdl")
            .with_sources(HdlLanguage::Verilog, Vec::<PathBuf>::new())
            .with_sources(HdlLanguage::Vhdl, ["adder.vhd"]);
        assert!(prepare(&options, None, dir.path()).is_ok());
    }

    #[test]
    fn test_build_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let build_dir = dir.path().join("nested").join("build");
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_sources(HdlLanguage::Verilog, ["adder.v"]);
        let prepared = prepare(&options, None, &build_dir).unwrap();
        assert!(build_dir.is_dir());
        assert_eq!(prepared.job.build_dir, build_dir);
    }

    #[test]
    fn test_extra_files() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::new()
            .with_file("pll.v", "module pll; endmodule\n")
            .with_file("ram.sv", "module ram; endmodule\n");
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_sources(HdlLanguage::Verilog, ["/rtl/adder.v"])
            .with_platform(platform);

        let prepared = prepare(&options, None, dir.path()).unwrap();
        assert_eq!(
            prepared.job.sources_for(HdlLanguage::Verilog),
            [
                PathBuf::from("/rtl/adder.v"),
                dir.path().join("pll.v"),
                dir.path().join("ram.sv"),
            ]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("pll.v")).unwrap(),
            "module pll; endmodule\n"
        );
    }

    #[test]
    fn test_extra_file_collision() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pll.v"), "").unwrap();
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_platform(Platform::new().with_file("pll.v", "module pll; endmodule\n"));
        let err = prepare(&options, None, dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "Name collision for file: pll.v");
    }

    #[test]
    fn test_prepare_twice_in_same_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new()
            .with_platform(Platform::new().with_file("pll.v", "module pll; endmodule\n"));

        let first = prepare(&options, Some(&adder_input()), dir.path()).unwrap();
        let second = prepare(&options, Some(&adder_input()), dir.path()).unwrap();
        assert_eq!(first.job.sources, second.job.sources);
        assert_eq!(
            second.job.sources_for(HdlLanguage::Verilog),
            [dir.path().join("pll.v"), dir.path().join("hdlrun_output.v")]
        );

        // Changed contents under the same name still collide
        let changed = RunOptions::new()
            .with_platform(Platform::new().with_file("pll.v", "module pll2; endmodule\n"));
        assert!(matches!(
            prepare(&changed, Some(&adder_input()), dir.path()),
            Err(RunnerError::NameCollision(name)) if name == "pll.v"
        ));
    }

    #[test]
    fn test_extra_file_language() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_platform(Platform::new().with_file("pkg.vhd", "package pkg is end;\n"));
        assert!(matches!(
            prepare(&options, None, dir.path()),
            Err(RunnerError::UnknownFileLanguage { simulator: SimulatorKind::Icarus, name }) if name == "pkg.vhd"
        ));
    }

    #[test]
    fn test_no_design_language() {
        let dir = tempfile::tempdir().unwrap();
        let input = DesignInput::new(
            WrapperDesign::new("core").with_languages([HdlLanguage::Verilog]),
            Signal::input("a", 1),
        );
        let options = RunOptions::new().with_simulator("nvc");
        let err = prepare(&options, Some(&input), dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to select HDL language for design output from options: vhdl"
        );
    }

    #[test]
    fn test_port_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let input = DesignInput::new(
            WrapperDesign::new("core"),
            PortValue::sequence([PortValue::from(Signal::input("a", 1)), PortValue::Null]),
        );
        let err = prepare(&RunOptions::new(), Some(&input), dir.path()).unwrap_err();
        assert!(matches!(err, RunnerError::Ports(_)));
        assert_eq!(
            err.to_string(),
            "Invalid port specification: unsupported port type at ports[1]: null"
        );
    }

    #[test]
    fn test_no_hdl_input() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new().with_toplevel("adder");
        assert!(matches!(
            prepare(&options, None, dir.path()),
            Err(RunnerError::NoHdlInput)
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn test_waveform_options() {
        let dir = tempfile::tempdir().unwrap();
        let base = RunOptions::new()
            .with_toplevel("adder")
            .with_sources(HdlLanguage::Verilog, ["adder.v"]);

        let both = base
            .clone()
            .with_waveform("a.fst")
            .with_vcd_file("a.vcd");
        assert!(matches!(
            prepare(&both, None, dir.path()),
            Err(RunnerError::ConflictingWaveform)
        ));

        let legacy = base.clone().with_vcd_file("a.vcd");
        let prepared = prepare(&legacy, None, dir.path()).unwrap();
        assert_eq!(prepared.job.waveform, Some(PathBuf::from("a.vcd")));

        let invalid = base.with_waveform("a.ghw");
        assert!(matches!(
            prepare(&invalid, None, dir.path()),
            Err(RunnerError::Sim(SimError::InvalidWaveform { .. }))
        ));
    }

    #[test]
    fn test_job_carries_options() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new()
            .with_toplevel("adder")
            .with_simulator("Verilator")
            .with_sources(HdlLanguage::Verilog, ["adder.v"])
            .with_parameter("WIDTH", 8)
            .with_seed(5)
            .with_env("N_TESTS", "3")
            .with_extra_args(["-DSIM"]);
        let prepared = prepare(&options, None, dir.path()).unwrap();

        assert_eq!(prepared.simulator.kind(), SimulatorKind::Verilator);
        assert_eq!(prepared.job.seed, Some(5));
        assert_eq!(prepared.job.extra_env["N_TESTS"], "3");
        assert_eq!(prepared.job.extra_args, ["-DSIM"]);

        let plan = prepared.plan().unwrap();
        assert!(plan.build[0].has_arg("-GWIDTH=8"));
        assert!(prepared.ports.is_none());
    }

    #[tokio::test]
    async fn test_run_validates_before_simulating() {
        let options = RunOptions::new().with_toplevel("adder");
        assert!(matches!(
            run(&options, None).await,
            Err(RunnerError::NoHdlInput)
        ));
    }
}
