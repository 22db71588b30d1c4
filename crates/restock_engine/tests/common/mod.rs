#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use restock_core::{PresenceSelector, Timestamp};
use restock_engine::{
    Browser, Capture, Clock, Notifier, NotifyError, Page, ProbeError, ProbeFailure, TextMatch,
};

pub const MINUTE: i64 = 60 * 1_000_000_000;
pub const START: i64 = 1_700_000_000_000_000_000;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// How a scripted page answers each probe step.
#[derive(Debug, Clone)]
pub struct PageScript {
    pub presence: Result<(), ProbeError>,
    pub network_idle: Result<(), ProbeError>,
    pub texts: HashMap<String, Result<TextMatch, ProbeError>>,
}

impl PageScript {
    pub fn rendered() -> Self {
        Self {
            presence: Ok(()),
            network_idle: Ok(()),
            texts: HashMap::new(),
        }
    }

    pub fn out_of_stock(phrase: &str) -> Self {
        Self::rendered().with_text(phrase, Ok(TextMatch::Found))
    }

    pub fn presence_timeout() -> Self {
        Self {
            presence: Err(ProbeError::timeout("scripted timeout")),
            ..Self::rendered()
        }
    }

    pub fn with_text(mut self, phrase: &str, result: Result<TextMatch, ProbeError>) -> Self {
        self.texts.insert(phrase.to_string(), result);
        self
    }

    pub fn with_presence(mut self, result: Result<(), ProbeError>) -> Self {
        self.presence = result;
        self
    }

    pub fn with_network_idle(mut self, result: Result<(), ProbeError>) -> Self {
        self.network_idle = result;
        self
    }
}

pub struct FakePage {
    script: PageScript,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl Page for FakePage {
    async fn wait_for_element(
        &self,
        selector: &PresenceSelector,
        _timeout: Duration,
    ) -> Result<(), ProbeError> {
        self.record(format!("presence:{}", selector.element));
        self.script.presence.clone()
    }

    async fn search_text(&self, phrase: &str, _timeout: Duration) -> Result<TextMatch, ProbeError> {
        self.record(format!("search:{phrase}"));
        self.script
            .texts
            .get(phrase)
            .cloned()
            .unwrap_or(Ok(TextMatch::NotFound))
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), ProbeError> {
        self.record("network_idle".to_string());
        self.script.network_idle.clone()
    }

    async fn capture(&self, _timeout: Duration) -> Result<Capture, ProbeError> {
        self.record("capture".to_string());
        Ok(Capture {
            bytes: b"<html>snapshot</html>".to_vec(),
            extension: "html".to_string(),
        })
    }
}

/// Serves scripted pages by URL; unknown URLs fail to open.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<Mutex<HashMap<String, PageScript>>>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, script: PageScript) {
        self.pages.lock().unwrap().insert(url.to_string(), script);
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn open(&self, url: &str) -> Result<Box<dyn Page>, ProbeError> {
        self.opened.lock().unwrap().push(url.to_string());
        let script = self.pages.lock().unwrap().get(url).cloned();
        match script {
            Some(script) => Ok(Box::new(FakePage::new(script))),
            None => Err(ProbeError::new(ProbeFailure::Network, "connection refused")),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.to_string());
        if *self.failing.lock().unwrap() {
            return Err(NotifyError::Delivery("channel down".to_string()));
        }
        Ok(())
    }
}

/// Manually advanced clock.
#[derive(Clone)]
pub struct TestClock {
    nanos: Arc<AtomicI64>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            nanos: Arc::new(AtomicI64::new(START)),
        }
    }

    pub fn set_offset(&self, offset_nanos: i64) {
        self.nanos.store(START + offset_nanos, Ordering::SeqCst);
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    pub fn clock(&self) -> Clock {
        let nanos = self.nanos.clone();
        Arc::new(move || Timestamp::from_nanos(nanos.load(Ordering::SeqCst)))
    }
}
