use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use restock_core::{CooldownPolicy, QuirkRule, QuirkTable};
use restock_engine::{
    ConsoleNotifier, FetchSettings, Notifier, ProbeSettings, WebhookNotifier,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub targets_path: PathBuf,
    pub state_path: PathBuf,
    /// Root for load-failure and in-stock captures; `None` disables them.
    pub screenshot_dir: Option<PathBuf>,
    pub operational_log: PathBuf,
    pub diagnostics_log: PathBuf,
    pub cooldown_secs: u64,
    pub presence_timeout_secs: u64,
    pub phrase_timeout_secs: u64,
    pub network_idle_timeout_secs: u64,
    pub screenshot_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_millis: u64,
    pub user_agent: Option<String>,
    pub quirks: Vec<QuirkConfig>,
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            targets_path: PathBuf::from("urls.csv"),
            state_path: PathBuf::from("instock.csv"),
            screenshot_dir: Some(PathBuf::from("screenshots")),
            operational_log: PathBuf::from("logfile.txt"),
            diagnostics_log: PathBuf::from("debug.txt"),
            cooldown_secs: CooldownPolicy::DEFAULT_COOLDOWN.as_secs(),
            presence_timeout_secs: 30,
            phrase_timeout_secs: 5,
            network_idle_timeout_secs: 60,
            screenshot_timeout_secs: 10,
            request_timeout_secs: 30,
            poll_interval_millis: 500,
            user_agent: None,
            quirks: QuirkTable::builtin()
                .rules()
                .iter()
                .map(QuirkConfig::from)
                .collect(),
            notifier: NotifierConfig::Console,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuirkConfig {
    pub pattern: String,
    #[serde(default)]
    pub wait_for_network_idle: bool,
    #[serde(default)]
    pub debounce_threshold: u32,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<&QuirkRule> for QuirkConfig {
    fn from(rule: &QuirkRule) -> Self {
        Self {
            pattern: rule.pattern.clone(),
            wait_for_network_idle: rule.wait_for_network_idle,
            debounce_threshold: rule.debounce_threshold,
            source: rule.source.clone(),
        }
    }
}

impl From<&QuirkConfig> for QuirkRule {
    fn from(config: &QuirkConfig) -> Self {
        QuirkRule {
            pattern: config.pattern.clone(),
            wait_for_network_idle: config.wait_for_network_idle,
            debounce_threshold: config.debounce_threshold,
            source: config.source.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifierConfig {
    /// Log notifications only.
    Console,
    Webhook {
        url: String,
        #[serde(default)]
        verify_url: Option<String>,
        /// Name of the environment variable holding the bearer token.
        #[serde(default)]
        token_env: Option<String>,
    },
}

impl AppConfig {
    /// A missing file at the default location means "all defaults";
    /// a missing file that was asked for explicitly is an error.
    pub fn load(path: &Path, explicit: bool) -> anyhow::Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        Self::parse(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(raw)?)
    }

    pub fn quirk_table(&self) -> QuirkTable {
        QuirkTable::new(self.quirks.iter().map(QuirkRule::from).collect())
    }

    pub fn cooldown(&self) -> CooldownPolicy {
        CooldownPolicy::new(Duration::from_secs(self.cooldown_secs))
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            presence_timeout: Duration::from_secs(self.presence_timeout_secs),
            phrase_timeout: Duration::from_secs(self.phrase_timeout_secs),
            network_idle_timeout: Duration::from_secs(self.network_idle_timeout_secs),
            capture_timeout: Duration::from_secs(self.screenshot_timeout_secs),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_millis),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent.clone()),
            ..defaults
        }
    }

    /// Secrets come from the environment; a named but unset variable is an error.
    pub fn build_notifier(
        &self,
        dry_run: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Box<dyn Notifier>> {
        if dry_run {
            return Ok(Box::new(ConsoleNotifier::new()));
        }
        match &self.notifier {
            NotifierConfig::Console => Ok(Box::new(ConsoleNotifier::new())),
            NotifierConfig::Webhook {
                url,
                verify_url,
                token_env,
            } => {
                let mut notifier = WebhookNotifier::new(url.clone());
                if let Some(verify_url) = verify_url {
                    notifier = notifier.with_verify_url(verify_url.clone());
                }
                if let Some(var) = token_env {
                    let Some(token) = env(var).filter(|token| !token.is_empty()) else {
                        bail!("notifier token variable {var} is not set");
                    };
                    notifier = notifier.with_token(token);
                }
                Ok(Box::new(notifier))
            }
        }
    }
}
