use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};

use crate::simulation::{Frame, Simulation};

/// Simulation shared between the tick loop and the input tasks.
pub type SharedSimulation = Arc<RwLock<Simulation>>;

/// Fixed rate scheduler for a simulation.
///
/// The runtime owns the only tick loop. Other tasks may write the target and
/// the step factor through the shared simulation; every write happens either
/// before or after a whole tick.
pub struct Runtime {
    simulation: SharedSimulation,
    shutdown: broadcast::Sender<()>,
}

impl Runtime {
    pub fn new(simulation: Simulation) -> Self {
        let (shutdown, _) = broadcast::channel(1);

        Self {
            simulation: Arc::new(RwLock::new(simulation)),
            shutdown,
        }
    }

    /// Stop the runtime on Ctrl-C.
    pub fn with_shutdown(self) -> Self {
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for termination signal: {}", e);
                return;
            }

            info!("Termination requested");

            shutdown.send(()).ok();
        });

        self
    }

    /// Handle to the shared simulation.
    #[inline]
    pub fn simulation(&self) -> SharedSimulation {
        self.simulation.clone()
    }

    /// Sender half of the shutdown signal.
    #[inline]
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown.clone()
    }

    /// Listen for shutdown signal.
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    /// Request the runtime to stop.
    pub fn shutdown(&self) {
        self.shutdown.send(()).ok();
    }

    /// Spawn an asynchronous task in the background.
    ///
    /// The task will be terminated when the shutdown signal is received.
    pub fn spawn_background_task<T>(&self, task: T)
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_signal();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("Shutting down background task");
                }
                _ = task => {}
            }
        });
    }

    /// Tick the simulation at a fixed interval.
    ///
    /// Runs until the shutdown signal is received or, when a limit is given,
    /// until that many ticks have completed. Missed ticks are skipped rather
    /// than run back to back. Each frame is passed to `on_frame` after the
    /// tick completes. Returns the number of ticks run.
    pub async fn run_interval<F>(
        &self,
        duration: Duration,
        limit: Option<u64>,
        mut on_frame: F,
    ) -> u64
    where
        F: FnMut(&Frame),
    {
        let mut shutdown = self.shutdown_signal();

        let mut interval = tokio::time::interval(duration);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ticks = 0;

        debug!("Ticking every {}ms", duration.as_millis());

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("Tick loop stopped after {} ticks", ticks);
                    break;
                }
                _ = interval.tick() => {
                    let start = std::time::Instant::now();

                    let frame = self.simulation.write().await.tick();

                    let elapsed = start.elapsed();
                    if elapsed > duration {
                        warn!("Tick took {}ms, longer than the interval", elapsed.as_millis());
                    }

                    on_frame(&frame);

                    ticks += 1;
                    if limit.is_some_and(|limit| ticks >= limit) {
                        debug!("Tick limit of {} reached", ticks);
                        break;
                    }
                }
            }
        }

        ticks
    }
}
