//! Rendering of document elements into bundle artifacts.
//!
//! External tools are reached through the [`Converter`] trait. The
//! [`Dispatcher`] owns the per-element bookkeeping (deterministic output
//! paths, work directories, failure isolation) and never knows which
//! concrete tool sits behind a converter.
//!
//! # Architecture
//!
//! - [`LatexConverter`]: `latex` + `dvisvgm`, text block → SVG
//! - [`ManimConverter`]: `manim`, scene body → video clip
//! - [`Dispatcher`]: one converter call (or file copy) per element, in order

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;
use tracing::debug;

mod dispatch;
mod latex;
mod manim;

pub use dispatch::Dispatcher;
pub use latex::{LatexConfig, LatexConverter};
pub use manim::{ManimConfig, ManimConverter};

/// Number of trailing diagnostic lines kept from a failing tool.
const DIAGNOSTIC_LINES: usize = 20;

/// Input for a single conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertRequest<'a> {
    /// Position of the element in the document.
    pub index: usize,
    /// Text or code to convert.
    pub source: &'a str,
    /// Scratch directory owned by this conversion alone.
    pub workdir: &'a Path,
    /// Where the artifact should end up. Converters that cannot choose
    /// their output location use only its file name as a hint.
    pub output: &'a Path,
}

/// Failure of one conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {}", describe_status(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        diagnostic: String,
    },

    #[error("{tool} produced no output")]
    MissingOutput { tool: String, diagnostic: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    /// Captured tool output explaining the failure, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ConvertError::Failed { diagnostic, .. }
            | ConvertError::MissingOutput { diagnostic, .. } => {
                Some(diagnostic.as_str()).filter(|d| !d.is_empty())
            }
            ConvertError::Spawn { .. } | ConvertError::Io(_) => None,
        }
    }
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// An external tool that turns one element into one artifact file.
pub trait Converter {
    /// Human-readable tool name used in error entries, e.g. `"LaTeX"`.
    fn name(&self) -> &str;

    /// Convert `request.source`, returning the path of the produced file.
    fn convert(&self, request: &ConvertRequest<'_>) -> Result<PathBuf, ConvertError>;
}

/// Run `program` in `cwd`, capturing its output.
///
/// A non-zero exit becomes [`ConvertError::Failed`] carrying the tail of
/// stderr, or of stdout when stderr is empty.
pub(crate) fn run_tool(program: &str, args: &[&str], cwd: &Path) -> Result<Output, ConvertError> {
    debug!(program, ?args, cwd = %cwd.display(), "running external tool");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ConvertError::Spawn {
            tool: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ConvertError::Failed {
            tool: program.to_string(),
            code: output.status.code(),
            diagnostic: diagnostic_tail(&output),
        });
    }
    Ok(output)
}

/// Last lines of a tool's stderr (falling back to stdout).
pub(crate) fn diagnostic_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };

    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConvertError::Failed {
            tool: "latex".to_string(),
            code: Some(1),
            diagnostic: "! Undefined control sequence.".to_string(),
        };
        assert_eq!(err.to_string(), "latex exited with status 1");
        assert_eq!(err.diagnostic(), Some("! Undefined control sequence."));

        let err = ConvertError::MissingOutput {
            tool: "manim".to_string(),
            diagnostic: String::new(),
        };
        assert_eq!(err.to_string(), "manim produced no output");
        assert_eq!(err.diagnostic(), None);
    }

    #[test]
    fn test_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_tool("pandora-no-such-tool", &[], dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to run pandora-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_tool_keeps_stderr_tail() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = "for i in $(seq 1 30); do echo line$i >&2; done; exit 3";
        let err = run_tool("sh", &["-c", script], dir.path()).unwrap_err();

        match &err {
            ConvertError::Failed { code, diagnostic, .. } => {
                assert_eq!(*code, Some(3));
                assert_eq!(diagnostic.lines().count(), DIAGNOSTIC_LINES);
                assert!(diagnostic.ends_with("line30"));
                assert!(diagnostic.starts_with("line11"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_used_when_stderr_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_tool("sh", &["-c", "echo '! LaTeX Error'; exit 1"], dir.path()).unwrap_err();
        assert_eq!(err.diagnostic(), Some("! LaTeX Error"));
    }
}
