//! Verilator integration
//!
//! Builds a standalone executable with `verilator --binary` and runs it.
//! Tracing is enabled at build time and switched on with `+trace`; the
//! design's default dump file is `dump.vcd` or `dump.fst`.

use crate::plan::{SimPlan, ToolInvocation, WaveformOutput};
use crate::{HdlLanguage, SimJob, SimResult, Simulator, SimulatorKind, WaveformFormat};

/// Verilator simulator
pub struct Verilator;

#[async_trait::async_trait]
impl Simulator for Verilator {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::Verilator
    }

    fn plan(&self, job: &SimJob) -> SimResult<SimPlan> {
        job.check_languages(self.kind())?;
        let format = job.waveform_format()?;
        let env = job.environment();
        let mut plan = SimPlan::new(self.kind());

        let obj_dir = job.build_path("obj_dir");
        let executable = format!("V{}", job.toplevel);

        let mut build = ToolInvocation::new("verilator", &job.build_dir)
            .envs(&env)
            .arg("--binary")
            .arg("-Mdir")
            .path(&obj_dir)
            .arg("--top-module")
            .arg(&job.toplevel)
            .arg("-o")
            .arg(&executable)
            .arg("--timescale")
            .arg(job.timescale.to_string())
            .arg("-Wno-fatal");
        for (name, value) in &job.parameters {
            build = build.arg(format!("-G{}={}", name, value.verilog_literal()));
        }
        if let Some(format) = format {
            build = build.arg("--trace-structs").arg(match format {
                WaveformFormat::Fst => "--trace-fst",
                WaveformFormat::Vcd => "--trace",
            });
        }
        build = build
            .args(job.extra_args.iter().cloned())
            .paths(job.sources_for(HdlLanguage::Verilog));
        plan.build.push(build);

        let mut run = ToolInvocation::new(
            obj_dir.join(&executable).to_string_lossy().into_owned(),
            &job.build_dir,
        )
        .envs(&env);
        if let (Some(format), Some(target)) = (format, &job.waveform) {
            run = run.arg("+trace");
            plan.waveform = Some(WaveformOutput::Copy {
                from: job.build_path(format!("dump.{}", format.extension())),
                to: target.clone(),
            });
        }
        if let Some(seed) = job.seed {
            run = run.arg(format!("+verilator+seed+{}", seed));
        }
        plan.run.push(run);

        Ok(plan)
    }
}
