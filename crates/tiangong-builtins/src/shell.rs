use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tiangong_core::{TiangongResult, ToolCall, ToolResult};
use tiangong_skills::skill::{Skill, SkillDescriptor};
use tracing::{info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_STDOUT_CHARS: usize = 50_000;
const MAX_STDERR_CHARS: usize = 10_000;

/// Shell execution skill (`run_shell`).
///
/// Runs `sh -c <command>` in the configured working directory and reports
/// `{command, exit_code, stdout, stderr, cwd}`. A non-zero exit code marks
/// the result as an error.
pub struct ShellSkill {
    descriptor: SkillDescriptor,
    workdir: PathBuf,
}

impl ShellSkill {
    /// Skill running commands in the process's current directory.
    pub fn new() -> Self {
        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_workdir(workdir)
    }

    /// Skill running commands in `workdir`.
    pub fn with_workdir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            descriptor: SkillDescriptor {
                name: "run_shell".to_string(),
                description: "Execute a shell command inside the workspace environment."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "command": {
                            "type": "string",
                            "description": "The shell command to execute"
                        },
                        "timeout_secs": {
                            "type": "integer",
                            "description": "Timeout in seconds (default: 30, max: 300)",
                            "default": DEFAULT_TIMEOUT_SECS
                        }
                    },
                    "required": ["command"]
                }),
            },
            workdir: workdir.into(),
        }
    }

    /// Directory commands run in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl Default for ShellSkill {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Skill for ShellSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        let command = call.arguments["command"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        if command.trim().is_empty() {
            return Ok(ToolResult::error(&call.id, "Empty command"));
        }

        let timeout_secs = call.arguments["timeout_secs"]
            .as_u64()
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .min(MAX_TIMEOUT_SECS);

        info!(command = %command, timeout = timeout_secs, cwd = %self.workdir.display(), "Executing shell command");

        // Sanitize: block dangerous patterns
        let dangerous = ["rm -rf /", "mkfs", "dd if=", ":(){ :|:& };:"];
        for pattern in &dangerous {
            if command.contains(pattern) {
                warn!(command = %command, "Blocked dangerous command");
                return Ok(ToolResult::error(
                    &call.id,
                    format!("Command blocked: contains dangerous pattern '{pattern}'"),
                ));
            }
        }

        let mut process = tokio::process::Command::new("sh");
        process
            .arg("-c")
            .arg(&command)
            .current_dir(&self.workdir)
            .kill_on_drop(true);

        let result = tokio::time::timeout(Duration::from_secs(timeout_secs), process.output()).await;

        match result {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                let response = serde_json::json!({
                    "command": command,
                    "exit_code": exit_code,
                    "stdout": truncate_output(&String::from_utf8_lossy(&output.stdout), MAX_STDOUT_CHARS),
                    "stderr": truncate_output(&String::from_utf8_lossy(&output.stderr), MAX_STDERR_CHARS),
                    "cwd": self.workdir.display().to_string(),
                });

                if output.status.success() {
                    Ok(ToolResult::success(&call.id, response.to_string()))
                } else {
                    Ok(ToolResult::error(&call.id, response.to_string()))
                }
            }
            Ok(Err(e)) => Ok(ToolResult::error(
                &call.id,
                format!("Failed to execute command: {e}"),
            )),
            Err(_) => Ok(ToolResult::error(
                &call.id,
                format!("Command timed out after {timeout_secs}s"),
            )),
        }
    }
}

/// Cut `s` to at most `max_chars` characters, noting the original size.
pub(crate) fn truncate_output(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated, {} total bytes]", &s[..idx], s.len()),
        None => s.to_string(),
    }
}
