use async_trait::async_trait;
use envkey_core::{CommandArguments, EnvironmentVariables, Error, Result};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

#[cfg(any(test, feature = "testing"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "testing"))]
use std::sync::{Arc, Mutex, PoisonError};

/// Per-invocation settings beyond the argument list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Working directory for the child; inherits ours when `None`
    pub cwd: Option<PathBuf>,
    /// Kill the child and fail once this elapses; waits forever when `None`
    pub timeout: Option<Duration>,
}

/// Trait for executing external commands
/// This abstraction allows for testing without mocking by providing
/// different implementations for production and test environments
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command whose environment is exactly `env`
    async fn execute_with_env(
        &self,
        cmd: &str,
        args: &CommandArguments,
        env: EnvironmentVariables,
        options: &ExecutionOptions,
    ) -> Result<Output>;
}

/// Production implementation that executes real commands
pub struct SystemCommandExecutor;

#[async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn execute_with_env(
        &self,
        cmd: &str,
        args: &CommandArguments,
        env: EnvironmentVariables,
        options: &ExecutionOptions,
    ) -> Result<Output> {
        let mut command = Command::new(cmd);
        command
            .args(args.as_slice())
            .env_clear()
            .envs(env.into_inner())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = &options.cwd {
            command.current_dir(dir);
        }

        wait_for_output(cmd, args, command.output(), options.timeout).await
    }
}

/// Await `output`, bounded by `timeout`. Dropping the future on expiry kills
/// the child because it was spawned with `kill_on_drop`.
async fn wait_for_output<F>(
    cmd: &str,
    args: &CommandArguments,
    output: F,
    timeout: Option<Duration>,
) -> Result<Output>
where
    F: Future<Output = io::Result<Output>>,
{
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, output)
            .await
            .map_err(|_| Error::timeout(cmd, limit))?,
        None => output.await,
    };

    result.map_err(|e| {
        Error::command_execution(
            cmd,
            args.clone().into_inner(),
            format!("failed to execute command: {e}"),
            None,
        )
    })
}

/// Test implementation that simulates command execution
/// This provides deterministic behavior for testing
#[cfg(any(test, feature = "testing"))]
#[derive(Clone, Default)]
pub struct TestCommandExecutor {
    responses: Arc<Mutex<HashMap<String, TestResponse>>>,
    invocations: Arc<Mutex<Vec<TestInvocation>>>,
}

#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, Default)]
pub struct TestResponse {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status_code: i32,
    /// Simulated run time, checked against the invocation's timeout
    pub delay: Option<Duration>,
}

#[cfg(any(test, feature = "testing"))]
impl TestResponse {
    #[must_use]
    pub fn success(stdout: &str) -> Self {
        Self {
            stdout: stdout.as_bytes().to_vec(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(status_code: i32, stderr: &str) -> Self {
        Self {
            stderr: stderr.as_bytes().to_vec(),
            status_code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One recorded call
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct TestInvocation {
    pub command: String,
    pub args: CommandArguments,
    pub env: EnvironmentVariables,
    pub options: ExecutionOptions,
}

#[cfg(any(test, feature = "testing"))]
impl TestCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `cmd` invoked with exactly `args`
    pub fn add_response(&self, cmd: &str, args: &[String], response: TestResponse) {
        let key = format!("{} {}", cmd, args.join(" "));
        lock(&self.responses).insert(key, response);
    }

    /// Respond to `cmd` regardless of its arguments
    pub fn add_command_response(&self, cmd: &str, response: TestResponse) {
        lock(&self.responses).insert(cmd.to_string(), response);
    }

    /// Every call made so far, oldest first
    pub fn invocations(&self) -> Vec<TestInvocation> {
        lock(&self.invocations).clone()
    }

    pub fn invocation_count(&self) -> usize {
        lock(&self.invocations).len()
    }

    fn lookup(&self, cmd: &str, args: &CommandArguments) -> Result<TestResponse> {
        let key = format!("{} {}", cmd, args.as_slice().join(" "));
        let responses = lock(&self.responses);
        responses
            .get(&key)
            .or_else(|| responses.get(cmd))
            .cloned()
            .ok_or_else(|| {
                Error::command_execution(
                    cmd,
                    args.clone().into_inner(),
                    format!("failed to execute command: no test response configured for {key}"),
                    None,
                )
            })
    }

    async fn respond(
        &self,
        cmd: &str,
        args: &CommandArguments,
        env: EnvironmentVariables,
        options: &ExecutionOptions,
    ) -> Result<Output> {
        lock(&self.invocations).push(TestInvocation {
            command: cmd.to_string(),
            args: args.clone(),
            env,
            options: options.clone(),
        });

        let response = self.lookup(cmd, args)?;
        if let Some(delay) = response.delay {
            match options.timeout {
                Some(limit) if delay > limit => {
                    tokio::time::sleep(limit).await;
                    return Err(Error::timeout(cmd, limit));
                }
                _ => tokio::time::sleep(delay).await,
            }
        }

        Ok(Output {
            status: exit_status::from_code(response.status_code),
            stdout: response.stdout,
            stderr: response.stderr,
        })
    }
}

#[cfg(any(test, feature = "testing"))]
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl CommandExecutor for TestCommandExecutor {
    async fn execute_with_env(
        &self,
        cmd: &str,
        args: &CommandArguments,
        env: EnvironmentVariables,
        options: &ExecutionOptions,
    ) -> Result<Output> {
        self.respond(cmd, args, env, options).await
    }
}

#[cfg(any(test, feature = "testing"))]
mod exit_status {
    use std::process::ExitStatus;

    /// An `ExitStatus` reporting `code` as the exit code
    #[cfg(unix)]
    pub fn from_code(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        // Raw values are wait statuses; the exit code lives in the second byte
        ExitStatus::from_raw((code & 0xff) << 8)
    }

    #[cfg(windows)]
    pub fn from_code(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

/// Factory for creating command executors
pub struct CommandExecutorFactory;

impl CommandExecutorFactory {
    /// Create a production command executor
    pub fn system() -> Box<dyn CommandExecutor> {
        Box::new(SystemCommandExecutor)
    }

    /// Create a test command executor
    #[cfg(any(test, feature = "testing"))]
    pub fn test() -> TestCommandExecutor {
        TestCommandExecutor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(executor: &TestCommandExecutor, cmd: &str, args: &[&str]) -> Result<Output> {
        let args = CommandArguments::from_vec(args.iter().map(|a| a.to_string()).collect());
        executor
            .execute_with_env(cmd, &args, EnvironmentVariables::new(), &ExecutionOptions::default())
            .await
    }

    #[tokio::test]
    async fn test_test_executor_exact_args_win() {
        let executor = CommandExecutorFactory::test();
        executor.add_command_response("resolver", TestResponse::success("{}"));
        executor.add_response(
            "resolver",
            &["--json".to_string()],
            TestResponse::success(r#"{"A":"1"}"#),
        );

        let output = run(&executor, "resolver", &["--json"]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), r#"{"A":"1"}"#);

        let output = run(&executor, "resolver", &["--cache"]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "{}");
    }

    #[tokio::test]
    async fn test_test_executor_failure_response() {
        let executor = CommandExecutorFactory::test();
        executor.add_command_response("resolver", TestResponse::failure(2, "command failed"));

        let output = run(&executor, "resolver", &[]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stderr), "command failed");
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(2));
    }

    #[tokio::test]
    async fn test_test_executor_missing_response() {
        let executor = CommandExecutorFactory::test();

        let result = run(&executor, "unknown", &["cmd"]).await;
        assert!(result.is_err());
        assert_eq!(executor.invocation_count(), 1);
    }

    #[tokio::test]
    async fn test_test_executor_records_env() {
        let executor = CommandExecutorFactory::test();
        executor.add_command_response("resolver", TestResponse::success("{}"));

        let mut env = EnvironmentVariables::new();
        env.insert("ENVKEY", "secret");
        let args = CommandArguments::from_vec(vec!["--json".to_string()]);
        executor
            .execute_with_env("resolver", &args, env, &ExecutionOptions::default())
            .await
            .unwrap();

        let calls = executor.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "resolver");
        let recorded = &calls[0].env;
        assert_eq!(recorded.get("ENVKEY").map(String::as_str), Some("secret"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_executor_honours_timeout() {
        let executor = CommandExecutorFactory::test();
        executor.add_command_response(
            "slow",
            TestResponse::success("{}").with_delay(Duration::from_secs(30)),
        );

        let options = ExecutionOptions {
            timeout: Some(Duration::from_secs(1)),
            ..ExecutionOptions::default()
        };
        let err = executor
            .execute_with_env("slow", &CommandArguments::new(), EnvironmentVariables::new(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_executor_runs_with_exact_env() {
        let executor = SystemCommandExecutor;
        let mut env = EnvironmentVariables::new();
        env.insert("ONLY_VAR", "present");

        let args = CommandArguments::from_vec(vec![
            "-c".to_string(),
            "printf '%s' \"$ONLY_VAR\"".to_string(),
        ]);
        let output = executor
            .execute_with_env("/bin/sh", &args, env, &ExecutionOptions::default())
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "present");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_executor_times_out() {
        let executor = SystemCommandExecutor;
        let args = CommandArguments::from_vec(vec!["-c".to_string(), "sleep 5".to_string()]);
        let mut env = EnvironmentVariables::new();
        if let Ok(path) = std::env::var("PATH") {
            env.insert("PATH", path);
        }
        let options = ExecutionOptions {
            timeout: Some(Duration::from_millis(100)),
            ..ExecutionOptions::default()
        };

        let err = executor
            .execute_with_env("/bin/sh", &args, env, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_system_executor_missing_binary() {
        let executor = SystemCommandExecutor;
        let err = executor
            .execute_with_env(
                "/definitely/not/a/real/binary",
                &CommandArguments::new(),
                EnvironmentVariables::new(),
                &ExecutionOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandExecution { .. }));
    }
}
