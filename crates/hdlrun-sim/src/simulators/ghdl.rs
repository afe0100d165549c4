//! GHDL integration
//!
//! Imports and makes the design in a work directory inside the build
//! directory, then elaborates and runs it with `ghdl -r`. GHDL writes the
//! requested waveform file itself.

use crate::plan::{path_arg, SimPlan, ToolInvocation, WaveformOutput};
use crate::{HdlLanguage, SimJob, SimResult, Simulator, SimulatorKind};
use tracing::debug;

const STD: &str = "--std=08";

/// GHDL simulator
pub struct Ghdl;

#[async_trait::async_trait]
impl Simulator for Ghdl {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::Ghdl
    }

    fn plan(&self, job: &SimJob) -> SimResult<SimPlan> {
        job.check_languages(self.kind())?;
        let format = job.waveform_format()?;
        let env = job.environment();
        let mut plan = SimPlan::new(self.kind());

        // VHDL identifiers are case-insensitive; GHDL stores them lowercased
        let toplevel = job.toplevel.to_lowercase();
        let workdir = format!("--workdir={}", path_arg(&job.build_dir));
        debug!("ghdl ignores timescale {}", job.timescale);

        plan.build.push(
            ToolInvocation::new("ghdl", &job.build_dir)
                .envs(&env)
                .arg("-i")
                .arg(STD)
                .arg(&workdir)
                .args(job.extra_args.iter().cloned())
                .paths(job.sources_for(HdlLanguage::Vhdl)),
        );
        plan.build.push(
            ToolInvocation::new("ghdl", &job.build_dir)
                .envs(&env)
                .arg("-m")
                .arg(STD)
                .arg(&workdir)
                .args(job.extra_args.iter().cloned())
                .arg(&toplevel),
        );

        let mut run = ToolInvocation::new("ghdl", &job.build_dir)
            .envs(&env)
            .arg("-r")
            .arg(STD)
            .arg(&workdir)
            .arg(&toplevel);
        for (name, value) in &job.parameters {
            run = run.arg(format!("-g{}={}", name, value.vhdl_literal()));
        }
        if let (Some(format), Some(target)) = (format, job.absolute_waveform()?) {
            run = run.arg(format!("--{}={}", format.extension(), path_arg(&target)));
            plan.waveform = Some(WaveformOutput::Direct(target));
        }
        plan.run.push(run);

        Ok(plan)
    }
}
