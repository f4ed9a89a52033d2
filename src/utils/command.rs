use crate::error::{AppError, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Запуск внешней утилиты с ограничением по времени.
///
/// Все обращения к xsel/xdotool/apertium/dict идут через этот тип, чтобы
/// таймаут и разбор ошибок были одинаковыми.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Выполнить команду и вернуть stdout (ненулевой код возврата - ошибка)
    pub async fn output(&self) -> Result<String> {
        let timeout_ms = self.timeout.as_millis() as u64;
        match tokio::time::timeout(self.timeout, self.run()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::CommandTimeout {
                program: self.program.clone(),
                timeout_ms,
            }),
        }
    }

    async fn run(&self) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::ToolNotFound(self.program.clone()),
            _ => AppError::CommandFailed {
                program: self.program.clone(),
                message: format!("не удалось запустить: {}", e),
            },
        })?;

        // stdin пишется одновременно с чтением stdout, иначе большой ввод
        // упрётся в заполненный канал
        let input = self.stdin.as_deref().unwrap_or_default();
        let pipe = child.stdin.take();
        let writer = async move {
            if let Some(mut pipe) = pipe {
                pipe.write_all(input.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} вернул ошибку: {}", self.program, stderr);
            return Err(AppError::CommandFailed {
                program: self.program.clone(),
                message: if stderr.is_empty() {
                    format!("код возврата {}", output.status)
                } else {
                    stderr
                },
            });
        }

        // Утилита могла завершиться успешно, не дочитав ввод
        if let Err(e) = written {
            debug!("{}: stdin не записан полностью: {}", self.program, e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let result = ToolCommand::new("definitely-not-installed-tool-xyz")
            .arg("--version")
            .output()
            .await;
        assert!(matches!(result, Err(AppError::ToolNotFound(p)) if p == "definitely-not-installed-tool-xyz"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_failure() {
        let result = ToolCommand::new("false").output().await;
        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_stdin_is_forwarded() {
        let output = ToolCommand::new("cat")
            .stdin("hello")
            .timeout(Duration::from_secs(2))
            .output()
            .await
            .unwrap();
        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn test_large_stdin_does_not_block() {
        // Больше буфера канала в обе стороны
        let input = "selection ".repeat(100_000);
        let output = ToolCommand::new("cat")
            .stdin(input.clone())
            .timeout(Duration::from_secs(5))
            .output()
            .await
            .unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let result = ToolCommand::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(50))
            .output()
            .await;
        assert!(matches!(result, Err(AppError::CommandTimeout { timeout_ms: 50, .. })));
    }
}
