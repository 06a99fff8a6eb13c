//! External tool invocation
//! Author: kartik4091

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ExternalToolError, Result};

/// Runs `program` with `args` to completion, mapping any abnormal exit to
/// [`ExternalToolError`]. Standard error is kept for the error message.
pub fn run_tool<I, S>(program: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let name = program.display().to_string();
    debug!(
        "+ {} {}",
        name,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(program)
        .args(&args)
        .output()
        .map_err(|e| ExternalToolError::Spawn {
            program: name.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ExternalToolError::Failed {
            program: name,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Fails with [`ExternalToolError::MissingOutput`] when a tool exited cleanly
/// without writing `path`
pub fn expect_output(program: &Path, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ExternalToolError::MissingOutput {
            program: program.display().to_string(),
            path: path.to_path_buf(),
        }
        .into())
    }
}
