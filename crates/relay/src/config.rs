//! Command-line / environment configuration for the relay binary.
//!
//! Every flag can also be set through the environment variable named next
//! to it; a `.env` file in the working directory is honoured.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chatbot_relay_core::{CluConfig, FallbackPolicy, DEFAULT_CONFIDENCE_THRESHOLD};
use clap::{Parser, ValueEnum};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),

    #[error("fallback threshold must be at least 1")]
    ZeroFallbackThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Parser)]
#[command(name = "chatbot-relay", version, about = "Websocket chat relay with intent-based canned replies")]
pub struct RelayConfig {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// JSON object mapping intent labels to reply text.
    #[arg(long, env = "RESPONSES_PATH", default_value = "responses.json")]
    pub responses_path: PathBuf,

    /// Directory of static chat UI assets; skipped if it does not exist.
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// CLU `:analyze-conversations` endpoint URL.
    #[arg(long, env = "CLU_ENDPOINT")]
    pub clu_endpoint: String,

    #[arg(long, env = "CLU_API_KEY", hide_env_values = true)]
    pub clu_api_key: String,

    #[arg(long, env = "CLU_PROJECT_NAME", default_value = "deggbot_intent_recog")]
    pub clu_project_name: String,

    #[arg(long, env = "CLU_DEPLOYMENT_NAME", default_value = "degbot_model_1_dep")]
    pub clu_deployment_name: String,

    #[arg(long, env = "CLU_TIMEOUT_SECS", default_value_t = 10)]
    pub clu_timeout_secs: u64,

    /// Minimum top-intent confidence accepted as a classification.
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub confidence_threshold: f64,

    /// Consecutive unresolved messages before a hard fallback.
    #[arg(long, env = "FALLBACK_THRESHOLD", default_value_t = 3)]
    pub fallback_threshold: u32,

    /// Delay between a generic hard fallback and the clear signal.
    #[arg(long, env = "CLEAR_DELAY_MS", default_value_t = 4000)]
    pub clear_delay_ms: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("responses_path", &self.responses_path)
            .field("static_dir", &self.static_dir)
            .field("clu_endpoint", &self.clu_endpoint)
            .field("clu_api_key", &"<redacted>")
            .field("clu_project_name", &self.clu_project_name)
            .field("clu_deployment_name", &self.clu_deployment_name)
            .field("clu_timeout_secs", &self.clu_timeout_secs)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("fallback_threshold", &self.fallback_threshold)
            .field("clear_delay_ms", &self.clear_delay_ms)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ConfidenceOutOfRange(self.confidence_threshold));
        }
        if self.fallback_threshold == 0 {
            return Err(ConfigError::ZeroFallbackThreshold);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn static_dir(&self) -> Option<PathBuf> {
        self.static_dir
            .is_dir()
            .then(|| self.static_dir.clone())
    }

    pub fn clu_config(&self) -> CluConfig {
        CluConfig {
            endpoint: self.clu_endpoint.clone(),
            api_key: self.clu_api_key.clone(),
            project_name: self.clu_project_name.clone(),
            deployment_name: self.clu_deployment_name.clone(),
            timeout: Duration::from_secs(self.clu_timeout_secs),
        }
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            escalation_threshold: self.fallback_threshold,
            clear_delay: Duration::from_millis(self.clear_delay_ms),
        }
    }
}
