//! Icarus Verilog integration
//!
//! Compiles with `iverilog` into a `vvp` image and runs it with `vvp`.
//! Waveforms are produced by an extra root module that calls `$dumpfile` and
//! `$dumpvars`; the dump format is selected at run time with `-fst`/`-vcd`.

use crate::plan::{GeneratedFile, SimPlan, ToolInvocation, WaveformOutput};
use crate::{HdlLanguage, SimJob, SimResult, Simulator, SimulatorKind, WaveformFormat};

/// Name of the generated waveform dump module
pub const DUMP_MODULE: &str = "hdlrun_iverilog_dump";

/// Icarus Verilog simulator
pub struct Icarus;

fn dump_module(toplevel: &str, dump_file: &str) -> String {
    format!(
        "module {}();\ninitial begin\n    $dumpfile(\"{}\");\n    $dumpvars(0, {});\nend\nendmodule\n",
        DUMP_MODULE, dump_file, toplevel
    )
}

#[async_trait::async_trait]
impl Simulator for Icarus {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::Icarus
    }

    fn plan(&self, job: &SimJob) -> SimResult<SimPlan> {
        job.check_languages(self.kind())?;
        let format = job.waveform_format()?;
        let env = job.environment();
        let mut plan = SimPlan::new(self.kind());

        let cmds_file = job.build_path("cmds.f");
        plan.files.push(GeneratedFile::new(
            cmds_file.clone(),
            format!("+timescale+{}\n", job.timescale),
        ));

        let image = job.build_path("sim.vvp");
        let mut sources = job.sources_for(HdlLanguage::Verilog).to_vec();
        let mut build = ToolInvocation::new("iverilog", &job.build_dir)
            .envs(&env)
            .arg("-o")
            .path(&image)
            .arg("-s")
            .arg(&job.toplevel);

        // The dump file keeps the .fst name; vvp picks the actual format
        let dump_file = format!("{}.fst", job.toplevel);
        if let (Some(_), Some(target)) = (format, &job.waveform) {
            let dump_source = job.build_path(format!("{}.v", DUMP_MODULE));
            plan.files.push(GeneratedFile::new(
                dump_source.clone(),
                dump_module(&job.toplevel, &dump_file),
            ));
            sources.push(dump_source);
            build = build.arg("-s").arg(DUMP_MODULE);
            plan.waveform = Some(WaveformOutput::Copy {
                from: job.build_path(&dump_file),
                to: target.clone(),
            });
        }

        build = build.arg("-g2012").arg("-f").path(&cmds_file);
        for (name, value) in &job.parameters {
            build = build.arg(format!(
                "-P{}.{}={}",
                job.toplevel,
                name,
                value.verilog_literal()
            ));
        }
        // Uninitialized register workaround; must follow -g2012 to override it
        build = build.args(job.extra_args.iter().cloned()).arg("-g2005");
        plan.build.push(build.paths(&sources));

        let dump_flag = match format {
            Some(WaveformFormat::Fst) => "-fst",
            Some(WaveformFormat::Vcd) => "-vcd",
            None => "-none",
        };
        plan.run.push(
            ToolInvocation::new("vvp", &job.build_dir)
                .envs(&env)
                .arg("-n")
                .path(&image)
                .arg(dump_flag),
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulators::test_support::verilog_job;
    use crate::SimError;
    use std::path::PathBuf;

    #[test]
    fn test_build_command() {
        let job = verilog_job().with_extra_args(["-DSIM"]);
        let plan = Icarus.plan(&job).unwrap();

        assert_eq!(plan.build.len(), 1);
        let build = &plan.build[0];
        assert_eq!(build.program, "iverilog");
        assert_eq!(
            build.args,
            [
                "-o",
                "/work/build/sim.vvp",
                "-s",
                "adder",
                "-g2012",
                "-f",
                "/work/build/cmds.f",
                "-Padder.WIDTH=8",
                "-DSIM",
                "-g2005",
                "/work/rtl/adder.v",
            ]
        );
        assert_eq!(plan.files[0].contents, "+timescale+1ns/1ps\n");
    }

    #[test]
    fn test_no_waveform_runs_with_none() {
        let plan = Icarus.plan(&verilog_job()).unwrap();

        assert!(plan.waveform.is_none());
        assert_eq!(plan.files.len(), 1);
        let run = &plan.run[0];
        assert_eq!(run.program, "vvp");
        assert_eq!(run.args, ["-n", "/work/build/sim.vvp", "-none"]);
    }

    #[test]
    fn test_vcd_waveform() {
        let job = verilog_job().with_waveform("/out/adder.vcd");
        let plan = Icarus.plan(&job).unwrap();

        let dump = plan
            .files
            .iter()
            .find(|file| file.path.ends_with("hdlrun_iverilog_dump.v"))
            .unwrap();
        assert!(dump.contents.contains("$dumpfile(\"adder.fst\");"));
        assert!(dump.contents.contains("$dumpvars(0, adder);"));

        let build = &plan.build[0];
        assert!(build.has_arg(DUMP_MODULE));
        assert!(build
            .args
            .last()
            .unwrap()
            .ends_with("hdlrun_iverilog_dump.v"));
        assert!(plan.run[0].has_arg("-vcd"));
        assert_eq!(
            plan.waveform,
            Some(WaveformOutput::Copy {
                from: PathBuf::from("/work/build/adder.fst"),
                to: PathBuf::from("/out/adder.vcd"),
            })
        );
    }

    #[test]
    fn test_fst_waveform() {
        let plan = Icarus
            .plan(&verilog_job().with_waveform("adder.fst"))
            .unwrap();
        assert!(plan.run[0].has_arg("-fst"));
        assert!(!plan.run[0].has_arg("-none"));
    }

    #[test]
    fn test_seed_and_env_reach_every_command() {
        let job = verilog_job().with_seed(99).with_env("N_TESTS", "5");
        let plan = Icarus.plan(&job).unwrap();
        for cmd in plan.commands() {
            assert_eq!(cmd.env["RANDOM_SEED"], "99");
            assert_eq!(cmd.env["N_TESTS"], "5");
            assert_eq!(cmd.cwd, PathBuf::from("/work/build"));
        }
    }

    #[test]
    fn test_rejects_vhdl_sources() {
        let job = verilog_job().with_source(HdlLanguage::Vhdl, "x.vhd");
        assert!(matches!(
            Icarus.plan(&job),
            Err(SimError::UnsupportedLanguage { .. })
        ));
    }
}
