#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{Clock, HttpTransport, NetworkError, ProxyConfig, Sleeper};
use moonbix::{BrowserHeaders, TransportProvider};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

pub const TOKEN: &str = "T1";
pub const GAME_TAG: &str = "G1f3a9c2e7b4d8a1c6e5f0b3d7a2c9e4";

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    AccessToken,
    Start,
    Complete,
}

impl Endpoint {
    fn from_url(url: &str) -> Self {
        if url.ends_with("/access/accessToken") {
            Endpoint::AccessToken
        } else if url.ends_with("/game/start") {
            Endpoint::Start
        } else if url.ends_with("/game/complete") {
            Endpoint::Complete
        } else {
            panic!("unexpected url {}", url)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub growth_token: Option<String>,
    pub body: Value,
}

type Reply = Box<dyn Fn(&Value) -> Result<Value, NetworkError> + Send + Sync>;

/// Scripted transport that records every call and enforces protocol order.
pub struct MockTransport {
    access_token: Reply,
    start: Reply,
    complete: Reply,
    calls: Mutex<Vec<RecordedCall>>,
    issued_token: Mutex<Option<String>>,
    started: Mutex<bool>,
}

impl MockTransport {
    /// Every step succeeds: token T1, code 000000 with GAME_TAG, success=true.
    pub fn happy() -> Self {
        Self {
            access_token: Box::new(|_| Ok(json!({ "data": { "accessToken": TOKEN } }))),
            start: Box::new(|_| Ok(json!({ "code": "000000", "data": { "gameTag": GAME_TAG } }))),
            complete: Box::new(|_| Ok(json!({ "success": true }))),
            calls: Mutex::new(Vec::new()),
            issued_token: Mutex::new(None),
            started: Mutex::new(false),
        }
    }

    pub fn on_access_token(
        mut self,
        reply: impl Fn(&Value) -> Result<Value, NetworkError> + Send + Sync + 'static,
    ) -> Self {
        self.access_token = Box::new(reply);
        self
    }

    pub fn on_start(
        mut self,
        reply: impl Fn(&Value) -> Result<Value, NetworkError> + Send + Sync + 'static,
    ) -> Self {
        self.start = Box::new(reply);
        self
    }

    pub fn on_complete(
        mut self,
        reply: impl Fn(&Value) -> Result<Value, NetworkError> + Send + Sync + 'static,
    ) -> Self {
        self.complete = Box::new(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    /// Query strings sent to the access-token endpoint, in call order.
    pub fn query_strings(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == Endpoint::AccessToken)
            .map(|c| c.body["queryString"].as_str().unwrap().to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, NetworkError> {
        let endpoint = Endpoint::from_url(url);
        let growth_token = headers
            .iter()
            .find(|(name, _)| *name == "X-Growth-Token")
            .map(|(_, value)| value.to_string());

        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.clone(),
            growth_token: growth_token.clone(),
            body: body.clone(),
        });

        match endpoint {
            Endpoint::AccessToken => {
                *self.started.lock().unwrap() = false;
                let reply = (self.access_token)(body);
                let token = reply
                    .as_ref()
                    .ok()
                    .and_then(|v| v.pointer("/data/accessToken"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                *self.issued_token.lock().unwrap() = token;
                reply
            }
            Endpoint::Start => {
                let issued = self.issued_token.lock().unwrap().clone();
                assert!(issued.is_some(), "game/start called without an access token");
                assert_eq!(growth_token, issued, "game/start sent the wrong growth token");

                let reply = (self.start)(body);
                let ok = reply
                    .as_ref()
                    .map(|v| v["code"] == "000000")
                    .unwrap_or(false);
                *self.started.lock().unwrap() = ok;
                reply
            }
            Endpoint::Complete => {
                assert!(
                    *self.started.lock().unwrap(),
                    "game/complete called without a successful game/start"
                );
                assert_eq!(
                    growth_token,
                    self.issued_token.lock().unwrap().clone(),
                    "game/complete sent the wrong growth token"
                );
                (self.complete)(body)
            }
        }
    }
}

/// Hands out the same mock transport and counts how often it was asked.
pub struct MockProvider {
    pub transport: Arc<MockTransport>,
    pub provided: AtomicUsize,
    pub user_agents: Mutex<Vec<String>>,
    pub proxies: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            provided: AtomicUsize::new(0),
            user_agents: Mutex::new(Vec::new()),
            proxies: Mutex::new(Vec::new()),
        }
    }

    pub fn provided(&self) -> usize {
        self.provided.load(Ordering::SeqCst)
    }
}

impl TransportProvider for MockProvider {
    fn provide(
        &self,
        headers: &BrowserHeaders,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Arc<dyn HttpTransport>, NetworkError> {
        self.provided.fetch_add(1, Ordering::SeqCst);
        self.user_agents
            .lock()
            .unwrap()
            .push(headers.user_agent.clone());
        self.proxies
            .lock()
            .unwrap()
            .push(proxy.map(ProxyConfig::base_url));
        let transport: Arc<dyn HttpTransport> = self.transport.clone();
        Ok(transport)
    }
}

/// Refuses to build any client.
pub struct BrokenProvider;

impl TransportProvider for BrokenProvider {
    fn provide(
        &self,
        _headers: &BrowserHeaders,
        _proxy: Option<&ProxyConfig>,
    ) -> Result<Arc<dyn HttpTransport>, NetworkError> {
        Err(NetworkError::ClientBuild {
            reason: "tls backend unavailable".to_string(),
        })
    }
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Returns immediately and records every requested pause.
#[derive(Default)]
pub struct InstantSleeper {
    pub pauses: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone)]
pub struct CapturedLine {
    pub level: Level,
    pub message: String,
    /// Names of the spans the event was seen inside, outermost first.
    pub scope: Vec<String>,
}

/// Collects formatted log messages for assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<CapturedLine>>>,
}

impl LogCapture {
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Same as [`LogCapture::install`], but only sees what `directives` lets through.
    pub fn install_filtered(directives: &str) -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry()
            .with(capture.clone().with_filter(EnvFilter::new(directives)));
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.level == level && l.message.contains(needle))
    }

    pub fn find(&self, needle: &str) -> Option<CapturedLine> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.message.contains(needle))
            .cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.message.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        let scope = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();
        self.lines.lock().unwrap().push(CapturedLine {
            level: *event.metadata().level(),
            message: visitor.0,
            scope,
        });
    }
}
