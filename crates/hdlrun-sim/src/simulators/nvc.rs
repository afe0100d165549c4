//! NVC integration
//!
//! Analyses into a `work` library inside the build directory, elaborates the
//! toplevel, then runs it. NVC only writes FST waveforms, directly to the
//! requested file.

use crate::plan::{path_arg, SimPlan, ToolInvocation, WaveformOutput};
use crate::{
    HdlLanguage, SimError, SimJob, SimResult, Simulator, SimulatorKind, WaveformFormat,
};
use tracing::debug;

const STD: &str = "--std=2008";
// Elaboration heap size
const HEAP_SIZE: &str = "256m";

/// NVC simulator
pub struct Nvc;

#[async_trait::async_trait]
impl Simulator for Nvc {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::Nvc
    }

    fn plan(&self, job: &SimJob) -> SimResult<SimPlan> {
        job.check_languages(self.kind())?;
        let format = job.waveform_format()?;
        if let Some(format) = format.filter(|f| *f != WaveformFormat::Fst) {
            return Err(SimError::UnsupportedWaveform {
                simulator: self.kind(),
                format,
                supported: WaveformFormat::Fst,
            });
        }

        let env = job.environment();
        let mut plan = SimPlan::new(self.kind());
        let toplevel = job.toplevel.to_lowercase();
        let work = format!("--work={}", path_arg(&job.build_path("work")));
        debug!("nvc ignores timescale {}", job.timescale);

        let global = |cmd: ToolInvocation| {
            cmd.envs(&env)
                .arg(STD)
                .arg("-M")
                .arg(HEAP_SIZE)
                .arg(&work)
        };

        plan.build.push(
            global(ToolInvocation::new("nvc", &job.build_dir))
                .arg("-a")
                .args(job.extra_args.iter().cloned())
                .paths(job.sources_for(HdlLanguage::Vhdl)),
        );

        let mut elaborate = global(ToolInvocation::new("nvc", &job.build_dir)).arg("-e");
        for (name, value) in &job.parameters {
            elaborate = elaborate.arg(format!("-g{}={}", name, value.vhdl_literal()));
        }
        plan.build.push(elaborate.arg(&toplevel));

        let mut run = ToolInvocation::new("nvc", &job.build_dir)
            .envs(&env)
            .arg(STD)
            .arg(&work)
            .arg("-r")
            .arg(&toplevel);
        if let Some(target) = job.absolute_waveform()? {
            run = run.arg(format!("--wave={}", path_arg(&target)));
            plan.waveform = Some(WaveformOutput::Direct(target));
        }
        plan.run.push(run.arg("--dump-arrays"));

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulators::test_support::vhdl_job;
    use std::path::PathBuf;

    #[test]
    fn test_analyse_and_elaborate() {
        let plan = Nvc.plan(&vhdl_job()).unwrap();

        assert_eq!(
            plan.build[0].args,
            [
                "--std=2008",
                "-M",
                "256m",
                "--work=/work/build/work",
                "-a",
                "/work/rtl/adder.vhd",
            ]
        );
        assert_eq!(
            plan.build[1].args,
            [
                "--std=2008",
                "-M",
                "256m",
                "--work=/work/build/work",
                "-e",
                "-gWIDTH=8",
                "adder",
            ]
        );
    }

    #[test]
    fn test_run_with_fst() {
        let plan = Nvc
            .plan(&vhdl_job().with_waveform("/out/adder.fst"))
            .unwrap();
        assert_eq!(
            plan.run[0].args,
            [
                "--std=2008",
                "--work=/work/build/work",
                "-r",
                "adder",
                "--wave=/out/adder.fst",
                "--dump-arrays",
            ]
        );
        assert_eq!(
            plan.waveform,
            Some(WaveformOutput::Direct(PathBuf::from("/out/adder.fst")))
        );
    }

    #[test]
    fn test_rejects_vcd() {
        let err = Nvc
            .plan(&vhdl_job().with_waveform("adder.vcd"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "nvc doesn't support .vcd waveforms, only .fst"
        );
    }
}
