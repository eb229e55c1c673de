use crate::source::{Sample, SampleSource};
use biosignal_core::{Measurement, MonitoringDomain, RecentWindow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

const MIN_WINDOW: usize = 3;
const MAX_WINDOW: usize = 50;

/// Per-session overrides. Anything left unset falls back to the domain's
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub interval_ms: Option<u64>,
    pub window: Option<usize>,
    pub channel_capacity: usize,
    /// End the session on its own after this many measurements.
    pub max_samples: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval_ms: None,
            window: None,
            channel_capacity: 64,
            max_samples: None,
        }
    }
}

impl SessionConfig {
    pub fn interval_ms(&self, domain: MonitoringDomain) -> u64 {
        self.interval_ms
            .unwrap_or_else(|| domain.default_interval_ms())
            .max(1)
    }

    pub fn window(&self, domain: MonitoringDomain) -> usize {
        self.window
            .unwrap_or_else(|| domain.default_window())
            .clamp(MIN_WINDOW, MAX_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Stops a session. Safe to call any number of times, from any clone, before
/// or after the first measurement.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiving side of a session. Yields measurements in acquisition order and
/// `None` once the session has ended or been cancelled.
#[derive(Debug)]
pub struct MeasurementStream {
    domain: MonitoringDomain,
    rx: mpsc::Receiver<Measurement>,
    cancelled: watch::Receiver<bool>,
}

impl MeasurementStream {
    pub fn domain(&self) -> MonitoringDomain {
        self.domain
    }

    pub async fn next(&mut self) -> Option<Measurement> {
        if *self.cancelled.borrow() {
            self.rx.close();
            return None;
        }
        self.rx.recv().await
    }
}

/// A running acquisition loop for one domain.
#[derive(Debug)]
pub struct MonitorSession {
    id: SessionId,
    stream: MeasurementStream,
    cancel: CancelHandle,
}

impl MonitorSession {
    /// Spawns the loop on the current runtime. The join handle resolves once
    /// the source has been closed.
    pub(crate) fn spawn(
        id: SessionId,
        source: Box<dyn SampleSource>,
        config: &SessionConfig,
    ) -> (Self, JoinHandle<()>) {
        let domain = source.domain();
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let acquisition = Acquisition {
            id,
            domain,
            interval_ms: config.interval_ms(domain),
            window: RecentWindow::new(config.window(domain)),
            max_samples: config.max_samples,
        };
        let handle = tokio::spawn(acquisition.run(source, tx, cancel_rx.clone()));

        let session = Self {
            id,
            stream: MeasurementStream {
                domain,
                rx,
                cancelled: cancel_rx,
            },
            cancel: CancelHandle {
                tx: Arc::new(cancel_tx),
            },
        };
        (session, handle)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn domain(&self) -> MonitoringDomain {
        self.stream.domain
    }

    pub async fn next(&mut self) -> Option<Measurement> {
        self.stream.next().await
    }

    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn split(self) -> (MeasurementStream, CancelHandle) {
        (self.stream, self.cancel)
    }
}

struct Acquisition {
    id: SessionId,
    domain: MonitoringDomain,
    interval_ms: u64,
    window: RecentWindow,
    max_samples: Option<u64>,
}

impl Acquisition {
    async fn run(
        mut self,
        mut source: Box<dyn SampleSource>,
        tx: mpsc::Sender<Measurement>,
        mut cancelled: watch::Receiver<bool>,
    ) {
        info!(session = %self.id, domain = %self.domain, interval_ms = self.interval_ms, "session started");

        let epoch_ms = chrono::Utc::now().timestamp_millis();
        let started = Instant::now();
        let mut ticker = time::interval(time::Duration::from_millis(self.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let policy = self.domain.confidence_policy();
        let mut emitted: u64 = 0;

        loop {
            if *cancelled.borrow() {
                break;
            }
            if self.max_samples.is_some_and(|max| emitted >= max) {
                break;
            }

            tokio::select! {
                biased;
                changed = cancelled.changed() => {
                    if changed.is_err() || *cancelled.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let now_ms = epoch_ms + started.elapsed().as_millis() as i64;
            let raw = match source.next_sample(now_ms) {
                Sample::Warming(raw_value) => {
                    self.window.push(raw_value);
                    continue;
                }
                Sample::Ready(raw) => raw,
            };
            self.window.push(raw.raw_value);
            let confidence = self.window.estimate(policy, raw.raw_value);
            let measurement = Measurement::new(raw.input, raw.raw_value, confidence, now_ms);

            tokio::select! {
                biased;
                _ = cancelled.changed() => break,
                sent = tx.send(measurement) => {
                    if sent.is_err() {
                        debug!(session = %self.id, "receiver dropped");
                        break;
                    }
                }
            }
            emitted += 1;
        }

        source.close();
        info!(session = %self.id, domain = %self.domain, emitted, "session stopped");
    }
}
