//! Service lifecycle orchestration.
//!
//! An [`Application`] owns an ordered list of services. Services start
//! sequentially in registration order and a start failure halts the pass.
//! Stopping is best-effort: every registered service is asked to stop, in
//! registration order, and failures are collected instead of
//! short-circuiting.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ForgeError, ForgeResult};
use crate::service::{Service, ServiceError, ServiceState};
use crate::signal::shutdown_signal;

/// Process-wide application state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// A service failure collected during a stop pass.
#[derive(Debug)]
pub struct ServiceFailure {
    pub service: String,
    pub error: ServiceError,
}

/// Outcome of [`Application::stop`].
#[derive(Debug, Default)]
pub struct StopReport {
    /// Services that were asked to stop, in order.
    pub stopped: Vec<String>,
    pub failures: Vec<ServiceFailure>,
}

impl StopReport {
    /// True when every stop call succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct ServiceSlot {
    service: Box<dyn Service>,
    state: ServiceState,
}

/// Ordered collection of services with a shared lifecycle.
#[derive(Default)]
pub struct Application {
    slots: Vec<ServiceSlot>,
    state: AppState,
    /// Index of the next service the stop pass visits.
    stop_cursor: usize,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration, for use before the application starts.
    pub fn with_service(mut self, service: impl Service + 'static) -> Self {
        self.slots.push(ServiceSlot {
            service: Box::new(service),
            state: ServiceState::Stopped,
        });
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Name and lifecycle state of every service, in registration order.
    pub fn service_states(&self) -> Vec<(String, ServiceState)> {
        self.slots
            .iter()
            .map(|slot| (slot.service.name().to_string(), slot.state))
            .collect()
    }

    /// Register a service.
    ///
    /// While the application is idle the service is only appended. While it
    /// is running the service is appended and started immediately. Once the
    /// application has stopped, registration is rejected.
    pub async fn register(&mut self, service: impl Service + 'static) -> ForgeResult<()> {
        self.register_boxed(Box::new(service)).await
    }

    pub async fn register_boxed(&mut self, service: Box<dyn Service>) -> ForgeResult<()> {
        if self.state == AppState::Stopped {
            return Err(ForgeError::ApplicationStopped(format!(
                "cannot register '{}'",
                service.name()
            )));
        }

        debug!(service = service.name(), "Registering service");
        self.slots.push(ServiceSlot {
            service,
            state: ServiceState::Stopped,
        });

        if self.state == AppState::Running {
            let index = self.slots.len() - 1;
            self.start_slot(index).await?;
        }
        Ok(())
    }

    /// Start every registered service, sequentially, in registration order.
    ///
    /// The first failure is returned and later services are not started.
    /// Services that already started are left running; call [`stop`] to
    /// release them.
    ///
    /// [`stop`]: Application::stop
    pub async fn start(&mut self) -> ForgeResult<()> {
        if self.state == AppState::Stopped {
            return Err(ForgeError::ApplicationStopped("cannot start".to_string()));
        }
        self.state = AppState::Running;
        info!(services = self.slots.len(), "Starting application");

        for index in 0..self.slots.len() {
            if self.slots[index].state == ServiceState::Stopped {
                self.start_slot(index).await?;
            }
        }
        Ok(())
    }

    async fn start_slot(&mut self, index: usize) -> ForgeResult<()> {
        let slot = &mut self.slots[index];
        let name = slot.service.name().to_string();

        // A failed start leaves the slot in `Starting` until the next stop pass.
        slot.state = ServiceState::Starting;
        debug!(service = %name, "Starting service");

        match slot.service.start().await {
            Ok(()) => {
                slot.state = ServiceState::Running;
                info!(service = %name, "Service started");
                Ok(())
            }
            Err(e) => {
                error!(service = %name, error = %e, "Service failed to start");
                Err(ForgeError::ServiceStart {
                    service: name,
                    source: e,
                })
            }
        }
    }

    /// Stop every registered service, in registration order.
    ///
    /// Services that never started are stopped too, since `Service::stop`
    /// tolerates that. Failures are logged and collected so one failing
    /// service does not keep the others running. Once the application has
    /// stopped, further calls are no-ops.
    ///
    /// Each service is asked to stop at most once. If a stop pass is dropped
    /// part way, the next call resumes after the service it was waiting on.
    /// The report then covers only the services visited by that call.
    pub async fn stop(&mut self) -> StopReport {
        let mut report = StopReport::default();
        if self.state == AppState::Stopped {
            debug!("Application already stopped");
            return report;
        }

        if self.stop_cursor > 0 {
            info!(resume_at = self.stop_cursor, "Resuming interrupted stop");
        } else {
            info!("Stopping application");
        }

        while self.stop_cursor < self.slots.len() {
            let slot = &mut self.slots[self.stop_cursor];
            self.stop_cursor += 1;
            let name = slot.service.name().to_string();
            slot.state = ServiceState::Stopping;
            debug!(service = %name, "Stopping service");

            if let Err(e) = slot.service.stop().await {
                warn!(service = %name, error = %e, "Service failed to stop cleanly");
                report.failures.push(ServiceFailure {
                    service: name.clone(),
                    error: e,
                });
            }
            slot.state = ServiceState::Stopped;
            report.stopped.push(name);
        }

        self.state = AppState::Stopped;
        info!(
            stopped = report.stopped.len(),
            failures = report.failures.len(),
            "Application stopped"
        );
        report
    }

    /// Start all services, wait for Ctrl-C or SIGTERM, then stop.
    pub async fn run(self) -> ForgeResult<StopReport> {
        self.run_until(shutdown_signal()).await
    }

    /// Start all services, wait for `shutdown`, then stop.
    ///
    /// `stop` runs on every exit path: after `shutdown` resolves, after a
    /// start failure (the start error is returned), and when this future is
    /// dropped before completing, in which case the stop pass is spawned
    /// onto the current runtime.
    pub async fn run_until<F>(self, shutdown: F) -> ForgeResult<StopReport>
    where
        F: Future<Output = ()>,
    {
        let mut guard = StopOnDrop::new(self);

        if let Err(e) = guard.app.start().await {
            guard.app.stop().await;
            guard.disarm();
            return Err(e);
        }

        shutdown.await;
        info!("Shutdown requested");

        let report = guard.app.stop().await;
        guard.disarm();
        Ok(report)
    }
}

/// Runs a stop pass if dropped while still armed.
struct StopOnDrop {
    app: Application,
    armed: bool,
}

impl StopOnDrop {
    fn new(app: Application) -> Self {
        Self { app, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut app = std::mem::take(&mut self.app);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Run cancelled; stopping services in the background");
                handle.spawn(async move {
                    app.stop().await;
                });
            }
            Err(_) => {
                error!("Run cancelled outside a runtime; services were not stopped");
            }
        }
    }
}
