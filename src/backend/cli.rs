//! Backend that shells out to the `codex` executable.
//!
//! Each prompt runs `codex exec --model <model> <prompt>` with stdin closed.
//! Trimmed stdout is the reply. This variant has no conversation support.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{BackendError, BackendInvoker, InvokeRequest};
use crate::error::{CodexError, Result};

/// Invoker running one `codex exec` process per prompt.
#[derive(Debug, Clone)]
pub struct CodexCliInvoker {
    program: PathBuf,
}

impl CodexCliInvoker {
    /// Locates `program` on `PATH` (or at the given path) and builds the invoker.
    ///
    /// Fails with [`CodexError::ConfigurationMissing`] when the executable
    /// cannot be found.
    pub fn discover(program: &str) -> Result<Self> {
        let path = env::var_os("PATH").unwrap_or_default();
        find_executable(program, &path)
            .map(|program| Self { program })
            .ok_or_else(|| {
                CodexError::ConfigurationMissing(format!(
                    "`{program}` not found on PATH; install the codex CLI or set CODEX_BIN"
                ))
            })
    }

    /// Uses an already resolved executable path.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The resolved executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Resolves `program` against a `PATH`-style list of directories.
///
/// Names containing a path separator are checked directly.
pub fn find_executable(program: &str, search_path: &std::ffi::OsStr) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[async_trait]
impl BackendInvoker for CodexCliInvoker {
    async fn invoke(&self, request: InvokeRequest) -> std::result::Result<String, BackendError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .arg("exec")
            .arg("--model")
            .arg(&request.model)
            .arg(&request.prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BackendError::Spawn {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BackendError::Exit {
                program,
                code: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if reply.is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(reply)
    }

    fn supports_history(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "codex-cli"
    }
}
