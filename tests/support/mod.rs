#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_cmd::Command;
use async_trait::async_trait;
use procdesk::config::{Config, TasksConfig};
use procdesk::suggest::{CompletionBackend, CompletionRequest, SuggestError, SuggestionClient};
use tempfile::TempDir;

/// A scratch directory holding a config file. Commands run inside it with no
/// credential in the environment.
pub struct TestEnv {
    dir: TempDir,
    config: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join(".procdesk.toml");
        config.save(&path).expect("failed to write config");
        Self { dir, config: path }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = procdesk_cmd();
        cmd.current_dir(self.dir.path())
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

pub fn procdesk_cmd() -> Command {
    let mut cmd = Command::cargo_bin("procdesk").expect("binary");
    cmd.env_remove("API_KEY")
        .env_remove("PROCDESK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// What a [`ScriptedBackend`] does on every call.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail(SuggestError),
    Slow(Duration),
}

/// In-process backend that records prompts and answers from a script.
pub struct ScriptedBackend {
    credential: bool,
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            credential: true,
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn without_credential() -> Arc<Self> {
        Arc::new(Self {
            credential: false,
            reply: Reply::Text(String::new()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, SuggestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(r#"{"category": "Logical Bugs"}"#.to_string())
            }
        }
    }
}

pub fn client(backend: Arc<ScriptedBackend>) -> SuggestionClient {
    client_with_timeout(backend, Duration::from_secs(5))
}

pub fn client_with_timeout(backend: Arc<ScriptedBackend>, timeout: Duration) -> SuggestionClient {
    SuggestionClient::new(backend, "test-model", timeout, TasksConfig::default())
}
