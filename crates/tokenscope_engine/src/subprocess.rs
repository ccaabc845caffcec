use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use tokio::process::Command;

use crate::parse::parse_provider_output;
use crate::{ProviderError, TokenQuery, TokenResult, TokenizerProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessSettings {
    pub program: String,
    /// Arguments placed before the positional `(text, provider, model, visualize)` ones.
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for SubprocessSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-u".to_string(), "backend/token_counter.py".to_string()],
            working_dir: None,
            timeout: None,
        }
    }
}

/// Runs an external tokenizer once per query and reads its single JSON line.
#[derive(Debug, Clone)]
pub struct SubprocessTokenizer {
    settings: SubprocessSettings,
}

impl SubprocessTokenizer {
    pub fn new(settings: SubprocessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SubprocessSettings {
        &self.settings
    }

    /// Full argument list for `query`: configured prefix, then text, provider,
    /// model and `"true"`/`"false"`.
    pub fn command_args(&self, query: &TokenQuery) -> Vec<String> {
        let mut args = self.settings.args.clone();
        args.push(query.text.clone());
        args.push(query.provider.clone());
        args.push(query.model.clone());
        args.push(if query.visualize { "true" } else { "false" }.to_string());
        args
    }
}

#[async_trait::async_trait]
impl TokenizerProvider for SubprocessTokenizer {
    async fn count(&self, query: &TokenQuery) -> Result<TokenResult, ProviderError> {
        let mut command = Command::new(&self.settings.program);
        command
            .args(self.command_args(query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.settings.working_dir {
            command.current_dir(dir);
        }

        engine_debug!(
            "Spawning tokenizer program={} provider={} model={} text_len={}",
            self.settings.program,
            query.provider,
            query.model,
            query.text.len()
        );
        let child = command.spawn().map_err(|source| ProviderError::Spawn {
            program: self.settings.program.clone(),
            source,
        })?;

        // Dropping the child on timeout kills it.
        let output = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ProviderError::Timeout(limit))??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            engine_warn!("Tokenizer exited with {}: {}", output.status, stderr);
            return Err(ProviderError::ProcessFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(ProviderError::NoOutput)?;
        parse_provider_output(line)
    }
}
