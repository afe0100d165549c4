//! Execution of simulation plans

use crate::plan::{SimPlan, ToolInvocation, WaveformOutput};
use crate::{SimError, SimResult, SimulatorKind};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Record of one executed command
#[derive(Debug, Clone)]
pub struct StepReport {
    pub command: String,
    pub success: bool,
    pub elapsed: Duration,
}

/// Result of a completed simulation
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub simulator: SimulatorKind,
    /// Waveform file written by the run, if one was requested and found
    pub waveform: Option<PathBuf>,
    pub steps: Vec<StepReport>,
}

fn command(step: &ToolInvocation) -> Command {
    let mut cmd = Command::new(&step.program);
    cmd.args(&step.args)
        .current_dir(&step.cwd)
        .envs(step.env.iter())
        .kill_on_drop(true);
    cmd
}

fn spawn_error(step: &ToolInvocation, err: std::io::Error) -> SimError {
    if err.kind() == ErrorKind::NotFound {
        SimError::ToolNotFound(step.program.clone())
    } else {
        SimError::Io(err)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Write the generated files, build, run, and collect the waveform
///
/// Build output is captured and only surfaced on failure. Run steps inherit
/// the terminal. A failed run still collects whatever waveform was written
/// before reporting the failure.
pub async fn execute(plan: &SimPlan) -> SimResult<SimOutcome> {
    let mut steps = Vec::new();

    for file in &plan.files {
        if let Some(parent) = file.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Writing {}", file.path.display());
        tokio::fs::write(&file.path, &file.contents).await?;
    }

    for step in &plan.build {
        let command_line = step.command_line();
        info!("[{}] {}", plan.simulator, command_line);
        let started = Instant::now();
        let output = command(step)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(step, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!("[{}] {}", step.program, line);
        }

        steps.push(StepReport {
            command: command_line.clone(),
            success: output.status.success(),
            elapsed: started.elapsed(),
        });

        if !output.status.success() {
            return Err(SimError::BuildFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
    }

    let mut failure = None;
    for step in &plan.run {
        let command_line = step.command_line();
        info!("[{}] {}", plan.simulator, command_line);
        let started = Instant::now();
        let status = command(step)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| spawn_error(step, e))?;

        steps.push(StepReport {
            command: command_line.clone(),
            success: status.success(),
            elapsed: started.elapsed(),
        });

        if !status.success() {
            failure = Some(SimError::TestFailed {
                command: command_line,
                status: status.to_string(),
            });
            break;
        }
    }

    let waveform = match &plan.waveform {
        Some(output) => collect_waveform(output).await?,
        None => None,
    };

    match failure {
        Some(err) => Err(err),
        None => Ok(SimOutcome {
            simulator: plan.simulator,
            waveform,
            steps,
        }),
    }
}

async fn collect_waveform(output: &WaveformOutput) -> SimResult<Option<PathBuf>> {
    match output {
        WaveformOutput::Direct(path) => {
            if exists(path).await {
                Ok(Some(path.clone()))
            } else {
                warn!("Failed to find waveform output file: {}", path.display());
                Ok(None)
            }
        }
        WaveformOutput::Copy { from, to } => {
            if !exists(from).await {
                warn!("Failed to find waveform output file: {}", from.display());
                return Ok(None);
            }
            if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(from, to).await?;
            debug!("Copied waveform {} -> {}", from.display(), to.display());
            Ok(Some(to.clone()))
        }
    }
}
