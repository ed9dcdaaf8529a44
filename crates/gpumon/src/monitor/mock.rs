//! Test doubles for the monitor's collaborators

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::notify::Notifier;
use crate::notify::NotifyError;
use crate::telemetry::TelemetryError;
use crate::telemetry::TelemetrySource;

type Script = VecDeque<Result<Vec<u64>, TelemetryError>>;

/// Replays a fixed list of fetch results, then reports no devices.
#[derive(Clone)]
pub struct ScriptedTelemetry {
    script: Arc<Mutex<Script>>,
    fetches: Arc<AtomicUsize>,
    on_exhausted: Option<CancellationToken>,
}

impl ScriptedTelemetry {
    pub fn new(script: impl IntoIterator<Item = Result<Vec<u64>, TelemetryError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            fetches: Arc::new(AtomicUsize::new(0)),
            on_exhausted: None,
        }
    }

    /// Cancels `token` when the last scripted result is handed out.
    pub fn cancel_when_exhausted(mut self, token: CancellationToken) -> Self {
        self.on_exhausted = Some(token);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetrySource for ScriptedTelemetry {
    async fn fetch(&self) -> Result<Vec<u64>, TelemetryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        let next = script.pop_front().unwrap_or(Err(TelemetryError::NoDevices));
        if script.is_empty() {
            if let Some(token) = &self.on_exhausted {
                token.cancel();
            }
        }
        next
    }
}

#[derive(Clone, Copy, Default)]
enum Failure {
    #[default]
    None,
    MissingCredentials,
    RejectedCredentials,
}

/// Records every notify call; optionally fails all of them or takes a while.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<(Vec<u32>, String)>>>,
    failure: Failure,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failure: Failure::MissingCredentials,
            ..Self::default()
        }
    }

    pub fn rejecting_credentials() -> Self {
        Self {
            failure: Failure::RejectedCredentials,
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(Vec<u32>, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn device_ids(&self) -> Vec<Vec<u32>> {
        self.calls().into_iter().map(|(ids, _)| ids).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, device_ids: &[u32], message: &str) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap()
            .push((device_ids.to_vec(), message.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure {
            Failure::None => Ok(()),
            Failure::MissingCredentials => Err(NotifyError::MissingCredentials),
            Failure::RejectedCredentials => Err(NotifyError::Auth {
                reason: "535 5.7.8 Username and Password not accepted".to_string(),
            }),
        }
    }
}

/// In-memory log sink for asserting on emitted lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
