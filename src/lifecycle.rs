//! Startup and shutdown of the dashboard.
//!
//! The controller acquires the terminal first, then starts one sampler thread
//! per metric source, runs the render loop on the calling thread, and on the
//! way out cancels the samplers, waits a bounded time for them, and releases
//! the terminal.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::collector::{CpuSource, DiskSource, MemorySource, MetricSource, RealFs};
use crate::config::{ConfigError, DashboardConfig};
use crate::model::ResourceKind;
use crate::queue::UpdateQueue;
use crate::sampler::{Sampler, SamplerStats, StateWatch};
use crate::tui::{Dashboard, EventHandler, Surface};

/// Fatal dashboard failures.
#[derive(Debug)]
pub enum DashboardError {
    /// The terminal could not be put into dashboard mode.
    SurfaceInit(io::Error),
    /// A sampler or input thread could not be started.
    Spawn(io::Error),
    /// Drawing to the terminal failed.
    Render(io::Error),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::SurfaceInit(e) => write!(f, "cannot initialise terminal: {}", e),
            DashboardError::Spawn(e) => write!(f, "cannot start thread: {}", e),
            DashboardError::Render(e) => write!(f, "terminal error: {}", e),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::SurfaceInit(e) | DashboardError::Spawn(e) | DashboardError::Render(e) => {
                Some(e)
            }
        }
    }
}

/// Samplers that did not acknowledge cancellation within the grace period.
///
/// Their threads are detached, not joined. Logged, never escalated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownTimeout {
    pub abandoned: Vec<ResourceKind>,
}

impl std::fmt::Display for ShutdownTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<&str> = self.abandoned.iter().map(|k| k.label()).collect();
        write!(
            f,
            "samplers did not stop within the grace period: {}",
            kinds.join(", ")
        )
    }
}

impl std::error::Error for ShutdownTimeout {}

/// What shutdown observed.
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Final counters of the samplers that stopped in time.
    pub stopped: Vec<SamplerStats>,
    pub timeout: Option<ShutdownTimeout>,
}

/// Sends the sampler's index when dropped, so a panicking sampler still
/// acknowledges its exit.
struct ExitAck {
    index: usize,
    tx: Sender<usize>,
}

impl Drop for ExitAck {
    fn drop(&mut self) {
        let _ = self.tx.send(self.index);
    }
}

/// The running sampler threads.
pub struct SamplerPool {
    token: CancellationToken,
    handles: Vec<(ResourceKind, StateWatch, JoinHandle<SamplerStats>)>,
    acks: Receiver<usize>,
}

impl SamplerPool {
    /// Starts one named thread per source.
    ///
    /// If a thread cannot be started, `token` is cancelled so the ones
    /// already running stop on their own.
    pub fn spawn(
        sources: Vec<Box<dyn MetricSource>>,
        interval: Duration,
        queue: Arc<UpdateQueue>,
        token: CancellationToken,
    ) -> io::Result<Self> {
        let (ack_tx, acks) = mpsc::channel();
        let mut handles = Vec::with_capacity(sources.len());

        for (index, source) in sources.into_iter().enumerate() {
            let kind = source.kind();
            let sampler = Sampler::new(source, interval);
            let watch = sampler.watch();
            let queue = Arc::clone(&queue);
            let thread_token = token.clone();
            let ack = ExitAck {
                index,
                tx: ack_tx.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("sampler-{}", kind.label().to_lowercase()))
                .spawn(move || {
                    let _ack = ack;
                    sampler.run(&queue, &thread_token)
                });

            match spawned {
                Ok(handle) => handles.push((kind, watch, handle)),
                Err(e) => {
                    error!(%kind, error = %e, "failed to start sampler");
                    token.cancel();
                    return Err(e);
                }
            }
        }

        info!(samplers = handles.len(), interval = ?interval, "samplers started");
        Ok(Self {
            token,
            handles,
            acks,
        })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels every sampler and waits up to `grace` for them to exit.
    pub fn shutdown(self, grace: Duration) -> ShutdownReport {
        let Self {
            token,
            handles,
            acks,
        } = self;

        token.cancel();

        let deadline = Instant::now().checked_add(grace);
        let mut exited = vec![false; handles.len()];
        let mut remaining = handles.len();
        while remaining > 0 {
            let wait = deadline.map_or(Duration::MAX, |d| {
                d.saturating_duration_since(Instant::now())
            });
            match acks.recv_timeout(wait) {
                Ok(index) => {
                    if let Some(flag) = exited.get_mut(index)
                        && !*flag
                    {
                        *flag = true;
                        remaining -= 1;
                    }
                }
                Err(_) => break,
            }
        }

        let mut report = ShutdownReport::default();
        let mut abandoned = Vec::new();
        for ((kind, watch, handle), exited) in handles.into_iter().zip(exited) {
            if !exited {
                // Dropping the handle detaches the thread.
                warn!(%kind, state = ?watch.get(), "abandoning sampler");
                abandoned.push(kind);
                continue;
            }
            match handle.join() {
                Ok(stats) => report.stopped.push(stats),
                Err(_) => error!(%kind, "sampler panicked"),
            }
        }

        if !abandoned.is_empty() {
            report.timeout = Some(ShutdownTimeout { abandoned });
        }
        report
    }
}

/// Owns the cancellation token and sequences startup and shutdown.
pub struct Lifecycle {
    config: DashboardConfig,
    token: CancellationToken,
}

impl Lifecycle {
    pub fn new(config: DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            token: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The token that stops the dashboard; hand clones to signal handlers.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The CPU, memory and disk sources for the configured paths.
    pub fn default_sources(&self) -> Vec<Box<dyn MetricSource>> {
        let fs = RealFs::new();
        vec![
            Box::new(CpuSource::new(fs, &self.config.proc_path)),
            Box::new(MemorySource::new(fs, &self.config.proc_path)),
            Box::new(DiskSource::new(&self.config.disk_path)),
        ]
    }

    /// Runs the dashboard on the real terminal until shutdown.
    ///
    /// The terminal is acquired before any thread is started, so a terminal
    /// failure aborts with nothing to clean up.
    pub fn run(
        self,
        sources: Vec<Box<dyn MetricSource>>,
    ) -> Result<ShutdownReport, DashboardError> {
        let mut surface = Surface::acquire().map_err(DashboardError::SurfaceInit)?;
        let events = EventHandler::new(self.config.interval, self.token.clone())
            .map_err(DashboardError::Spawn)?;

        let mut dashboard = Dashboard::new(self.config.stale_threshold());
        let report = self.run_on(surface.terminal_mut(), &events, &mut dashboard, sources)?;

        surface.release().map_err(DashboardError::Render)?;
        Ok(report)
    }

    /// Runs the samplers and the render loop against `terminal`.
    ///
    /// Returns after the loop stops and the samplers have been shut down.
    pub fn run_on<B: Backend>(
        &self,
        terminal: &mut Terminal<B>,
        events: &EventHandler,
        dashboard: &mut Dashboard,
        sources: Vec<Box<dyn MetricSource>>,
    ) -> Result<ShutdownReport, DashboardError> {
        let queue = Arc::new(UpdateQueue::with_waker(events.waker()));
        let pool = SamplerPool::spawn(
            sources,
            self.config.interval,
            Arc::clone(&queue),
            self.token.clone(),
        )
        .map_err(DashboardError::Spawn)?;

        let outcome = dashboard.run(terminal, &queue, events, &self.token);

        // Stop the samplers whether the loop ended cleanly or not.
        self.token.cancel();
        let report = pool.shutdown(self.config.shutdown_grace);
        log_report(&report);

        outcome.map_err(DashboardError::Render)?;
        Ok(report)
    }
}

fn log_report(report: &ShutdownReport) {
    for stats in &report.stopped {
        debug!(
            kind = %stats.kind,
            published = stats.published,
            skipped = stats.skipped,
            "sampler exited"
        );
    }
    if let Some(timeout) = &report.timeout {
        warn!("{}", timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{ScriptedSource, Unavailable};
    use crate::model::Reading;
    use crate::tui::Event;
    use crossterm::event::{KeyCode, KeyEvent};
    use ratatui::backend::TestBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Blocks inside `sample` for a fixed time.
    struct SlowSource {
        delay: Duration,
    }

    impl MetricSource for SlowSource {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Disk
        }

        fn sample(&mut self) -> Result<Reading, Unavailable> {
            thread::sleep(self.delay);
            Err(Unavailable::Missing("slow".into()))
        }
    }

    fn scripted_sources() -> (Vec<Box<dyn MetricSource>>, Vec<Arc<AtomicUsize>>) {
        let cpu = ScriptedSource::new(ResourceKind::Cpu).then(Reading::cpu(42.5));
        let mem = ScriptedSource::new(ResourceKind::Memory).then(Reading::memory(
            60.0,
            6_000_000_000,
            10_000_000_000,
        ));
        let disk = ScriptedSource::new(ResourceKind::Disk).then(Reading::disk(
            75.0,
            75_000_000_000,
            100_000_000_000,
        ));
        let calls = vec![cpu.calls(), mem.calls(), disk.calls()];
        let sources: Vec<Box<dyn MetricSource>> = vec![Box::new(cpu), Box::new(mem), Box::new(disk)];
        (sources, calls)
    }

    fn wait_for_calls(calls: &[Arc<AtomicUsize>], at_least: usize) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while calls.iter().any(|c| c.load(Ordering::SeqCst) < at_least) {
            assert!(Instant::now() < deadline, "samplers did not run");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_pool_shutdown_collects_stats() {
        let (sources, calls) = scripted_sources();
        let queue = Arc::new(UpdateQueue::new());
        let token = CancellationToken::new();
        let pool =
            SamplerPool::spawn(sources, Duration::from_millis(10), queue, token.clone()).unwrap();
        assert_eq!(pool.len(), 3);

        wait_for_calls(&calls, 2);
        let report = pool.shutdown(Duration::from_secs(2));

        assert!(token.is_cancelled());
        assert!(report.timeout.is_none());
        assert_eq!(report.stopped.len(), 3);
        assert!(report.stopped.iter().all(|s| s.published >= 2));
    }

    #[test]
    fn test_pool_abandons_sampler_stuck_in_sample() {
        let sources: Vec<Box<dyn MetricSource>> = vec![
            Box::new(ScriptedSource::new(ResourceKind::Cpu).then(Reading::cpu(1.0))),
            Box::new(SlowSource {
                delay: Duration::from_secs(3),
            }),
        ];
        let queue = Arc::new(UpdateQueue::new());
        let pool = SamplerPool::spawn(
            sources,
            Duration::from_millis(10),
            queue,
            CancellationToken::new(),
        )
        .unwrap();

        // Let the slow sampler enter its first sample.
        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        let report = pool.shutdown(Duration::from_millis(100));

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(
            report.timeout,
            Some(ShutdownTimeout {
                abandoned: vec![ResourceKind::Disk]
            })
        );
        assert_eq!(report.stopped.len(), 1);
        assert_eq!(report.stopped[0].kind, ResourceKind::Cpu);
    }

    #[test]
    fn test_shutdown_timeout_display() {
        let timeout = ShutdownTimeout {
            abandoned: vec![ResourceKind::Cpu, ResourceKind::Disk],
        };
        assert_eq!(
            timeout.to_string(),
            "samplers did not stop within the grace period: CPU, Disk"
        );
    }

    #[test]
    fn test_lifecycle_rejects_invalid_config() {
        let config = DashboardConfig::default().with_interval(Duration::ZERO);
        assert!(matches!(
            Lifecycle::new(config),
            Err(ConfigError::ZeroInterval)
        ));

        let config = DashboardConfig::default().with_interval(Duration::from_secs(u64::MAX));
        assert!(matches!(
            Lifecycle::new(config),
            Err(ConfigError::IntervalTooLong(_))
        ));
    }

    #[test]
    fn test_run_on_renders_samples_and_stops_on_quit() {
        let lifecycle = Lifecycle::new(
            DashboardConfig::default().with_interval(Duration::from_millis(10)),
        )
        .unwrap();
        let (sources, calls) = scripted_sources();
        let events = EventHandler::manual();
        let tx = events.sender();

        let quitter = {
            let calls = calls.clone();
            thread::spawn(move || {
                wait_for_calls(&calls, 2);
                tx.send(Event::Key(KeyEvent::from(KeyCode::Char('q'))))
                    .unwrap();
            })
        };

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let mut dashboard = Dashboard::new(Duration::from_secs(60));
        let report = lifecycle
            .run_on(&mut terminal, &events, &mut dashboard, sources)
            .unwrap();
        quitter.join().unwrap();

        assert!(lifecycle.token().is_cancelled());
        assert!(report.timeout.is_none());
        assert_eq!(report.stopped.len(), 3);

        let state = dashboard.state();
        assert_eq!(state.slot(ResourceKind::Cpu).text(), "CPU Usage: 42.50%");
        assert_eq!(
            state.slot(ResourceKind::Memory).text(),
            "Memory Usage: 60.00% (Used: 6.00 GB / Total: 10.00 GB)"
        );
        assert_eq!(
            state.slot(ResourceKind::Disk).text(),
            "Disk Usage: 75.00% (Used: 75.00 GB / Total: 100.00 GB)"
        );
    }

    #[test]
    fn test_cancel_while_samplers_sleep_stops_within_interval_and_grace() {
        let interval = Duration::from_secs(1);
        let grace = Duration::from_millis(500);
        let lifecycle = Lifecycle::new(
            DashboardConfig::default()
                .with_interval(interval)
                .with_shutdown_grace(grace),
        )
        .unwrap();
        let token = lifecycle.token();
        let (sources, calls) = scripted_sources();
        let events = EventHandler::manual();
        let tx = events.sender();

        let canceller = thread::spawn(move || {
            // Every sampler has sampled once and is now sleeping.
            wait_for_calls(&calls, 1);
            thread::sleep(Duration::from_millis(50));
            let cancelled_at = Instant::now();
            token.cancel();
            tx.send(Event::Shutdown).unwrap();
            cancelled_at
        });

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let mut dashboard = Dashboard::new(Duration::from_secs(60));
        let report = lifecycle
            .run_on(&mut terminal, &events, &mut dashboard, sources)
            .unwrap();
        let cancelled_at = canceller.join().unwrap();

        assert!(cancelled_at.elapsed() < interval + grace);
        assert!(report.timeout.is_none());
        assert_eq!(report.stopped.len(), 3);
        assert!(report.stopped.iter().all(|s| s.published == 1));
    }

    #[test]
    fn test_unavailable_source_keeps_placeholder() {
        let lifecycle = Lifecycle::new(
            DashboardConfig::default().with_interval(Duration::from_millis(5)),
        )
        .unwrap();
        let disk = ScriptedSource::always_unavailable(ResourceKind::Disk);
        let calls = vec![disk.calls()];
        let cpu = ScriptedSource::new(ResourceKind::Cpu).then(Reading::cpu(3.0));
        let sources: Vec<Box<dyn MetricSource>> = vec![Box::new(cpu), Box::new(disk)];
        let events = EventHandler::manual();
        let tx = events.sender();

        let quitter = thread::spawn(move || {
            wait_for_calls(&calls, 20);
            tx.send(Event::Key(KeyEvent::from(KeyCode::Esc))).unwrap();
        });

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let mut dashboard = Dashboard::new(Duration::from_secs(60));
        let report = lifecycle
            .run_on(&mut terminal, &events, &mut dashboard, sources)
            .unwrap();
        quitter.join().unwrap();

        let disk_slot = dashboard.state().slot(ResourceKind::Disk);
        assert!(disk_slot.reading().is_none());
        assert_eq!(disk_slot.text(), "Disk Usage: waiting for data");

        let disk_stats = report
            .stopped
            .iter()
            .find(|s| s.kind == ResourceKind::Disk)
            .unwrap();
        assert_eq!(disk_stats.published, 0);
        assert!(disk_stats.skipped >= 20);
    }
}
