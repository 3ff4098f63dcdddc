use crate::shell::truncate_output;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tiangong_core::{TiangongResult, ToolCall, ToolResult};
use tiangong_skills::skill::{Skill, SkillDescriptor};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_CHARS: usize = 50_000;

/// Python execution skill (`run_python`).
///
/// Feeds the code to the interpreter on stdin and reports
/// `{code, stdout, stderr, exit_code}`. Exceptions surface as a traceback on
/// stderr with a non-zero exit code; the call itself still succeeds.
pub struct PythonSkill {
    descriptor: SkillDescriptor,
    interpreter: String,
    timeout: Duration,
}

impl PythonSkill {
    /// Skill using `python3`.
    pub fn new() -> Self {
        Self::with_interpreter(DEFAULT_INTERPRETER)
    }

    /// Skill using a specific interpreter binary.
    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            descriptor: SkillDescriptor {
                name: "run_python".to_string(),
                description: "Execute Python code in a fresh interpreter process. \
                              Variables do not persist between calls."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Python source to execute"
                        }
                    },
                    "required": ["code"]
                }),
            },
            interpreter: interpreter.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Limit each run to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Interpreter binary.
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    async fn run(&self, code: &str) -> std::io::Result<std::process::Output> {
        let mut child = tokio::process::Command::new(&self.interpreter)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        child.wait_with_output().await
    }
}

impl Default for PythonSkill {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Skill for PythonSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        let Some(code) = call.arguments["code"].as_str() else {
            return Ok(ToolResult::error(&call.id, "Missing 'code' argument"));
        };
        let code = dedent(code);

        info!(interpreter = %self.interpreter, lines = code.lines().count(), "Executing Python code");

        match tokio::time::timeout(self.timeout, self.run(&code)).await {
            Ok(Ok(output)) => {
                let response = serde_json::json!({
                    "code": code,
                    "stdout": truncate_output(&String::from_utf8_lossy(&output.stdout), MAX_OUTPUT_CHARS),
                    "stderr": truncate_output(&String::from_utf8_lossy(&output.stderr), MAX_OUTPUT_CHARS),
                    "exit_code": output.status.code().unwrap_or(-1),
                });
                Ok(ToolResult::success(&call.id, response.to_string()))
            }
            Ok(Err(e)) => Ok(ToolResult::error(
                &call.id,
                format!("Failed to run {}: {e}", self.interpreter),
            )),
            Err(_) => Ok(ToolResult::error(
                &call.id,
                format!("Python execution timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }
}

/// Strip the whitespace prefix shared by every non-blank line.
fn dedent(code: &str) -> String {
    let indent = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    code.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
