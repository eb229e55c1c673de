use crate::error::SessionError;
use crate::permission::{AlwaysGrant, PermissionProvider, PermissionStatus, SensorResource};
use crate::session::{CancelHandle, MonitorSession, SessionConfig, SessionId};
use crate::simulated::SimulatedSources;
use crate::source::SourceProvider;
use biosignal_core::MonitoringDomain;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct ActiveSession {
    id: SessionId,
    domain: MonitoringDomain,
    resource: SensorResource,
    cancel: CancelHandle,
    handle: JoinHandle<()>,
}

impl ActiveSession {
    /// Audio sessions share one microphone; any two of them conflict.
    fn conflicts_with(&self, domain: MonitoringDomain, resource: SensorResource) -> bool {
        self.domain == domain
            || (self.resource == SensorResource::Microphone && resource == SensorResource::Microphone)
    }

    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(session = %self.id, domain = %self.domain, error = %e, "session task did not shut down cleanly");
        }
    }
}

/// Single owner of every running session. At most one session per domain and
/// at most one microphone session overall; starting a conflicting session
/// first tears the old one down and waits for its source to close.
pub struct SessionManager {
    permissions: Arc<dyn PermissionProvider>,
    sources: Arc<dyn SourceProvider>,
    active: Vec<ActiveSession>,
    next_id: u64,
}

impl SessionManager {
    pub fn new(permissions: Arc<dyn PermissionProvider>, sources: Arc<dyn SourceProvider>) -> Self {
        Self {
            permissions,
            sources,
            active: Vec::new(),
            next_id: 1,
        }
    }

    /// Simulated sources with every permission granted.
    pub fn simulated(seed: Option<u64>) -> Self {
        Self::new(Arc::new(AlwaysGrant), Arc::new(SimulatedSources::new(seed)))
    }

    pub async fn start(
        &mut self,
        domain: MonitoringDomain,
        config: &SessionConfig,
    ) -> Result<MonitorSession, SessionError> {
        self.reap();
        let resource = SensorResource::for_domain(domain);

        let (conflicting, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|s| s.conflicts_with(domain, resource));
        self.active = kept;
        for old in conflicting {
            info!(session = %old.id, domain = %old.domain, replacement = %domain, "tearing down conflicting session");
            old.shutdown().await;
        }

        if resource.requires_permission()
            && self.permissions.request(resource).await == PermissionStatus::Denied
        {
            warn!(%domain, %resource, "permission denied");
            return Err(SessionError::PermissionDenied(resource));
        }

        let source = self.sources.open(domain)?;
        if source.domain() != domain {
            return Err(SessionError::Source {
                domain,
                reason: format!("provider opened a {} source", source.domain()),
            });
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;
        let (session, handle) = MonitorSession::spawn(id, source, config);
        self.active.push(ActiveSession {
            id,
            domain,
            resource,
            cancel: session.cancel_handle(),
            handle,
        });
        Ok(session)
    }

    /// Stops the session for `domain` and waits for its source to close.
    /// Returns `false` when nothing was running.
    pub async fn stop(&mut self, domain: MonitoringDomain) -> bool {
        self.reap();
        let Some(pos) = self.active.iter().position(|s| s.domain == domain) else {
            return false;
        };
        self.active.remove(pos).shutdown().await;
        true
    }

    pub async fn stop_all(&mut self) {
        for session in std::mem::take(&mut self.active) {
            session.shutdown().await;
        }
    }

    pub fn active_domains(&mut self) -> Vec<MonitoringDomain> {
        self.reap();
        self.active
            .iter()
            .filter(|s| !s.cancel.is_cancelled())
            .map(|s| s.domain)
            .collect()
    }

    pub fn is_active(&mut self, domain: MonitoringDomain) -> bool {
        self.active_domains().contains(&domain)
    }

    /// Forgets sessions whose task has already closed its source. A session
    /// cancelled through its own handle stays until then, so a conflicting
    /// start still waits for it.
    fn reap(&mut self) {
        self.active.retain(|s| !s.handle.is_finished());
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        for session in &self.active {
            session.cancel.cancel();
        }
    }
}
