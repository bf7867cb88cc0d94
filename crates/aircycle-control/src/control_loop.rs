//! The periodic louver/setpoint control loop.

use std::future::Future;
use std::time::Duration;

use aircycle_core::LouverPosition;
use tokio_util::sync::CancellationToken;
use tracing::Level;

use crate::advisor::advise;
use crate::error::ControlError;
use crate::ports::{DeviceControl, OutsideTemperature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Authenticating,
    InitialCycle,
    Waiting,
    RunningCycle,
    Stopped,
}

/// What the weather step of a cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Disabled,
    Unchanged { outside: f64, setpoint: f64 },
    Raised { outside: f64, from: f64, to: f64 },
    Failed(String),
}

/// Summary of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Position read at the start; `None` if the read failed.
    pub observed_position: Option<String>,
    pub weather: WeatherOutcome,
    pub sent_position: LouverPosition,
    pub position_written: bool,
}

/// Drives one unit: authenticate once, then cycle every `interval` until
/// cancelled.
///
/// A cycle runs to completion before the next wait starts, and all device
/// calls go through `&mut self`, so cycles never overlap.
pub struct ControlLoop<D, W> {
    device: D,
    weather: Option<W>,
    positions: Vec<LouverPosition>,
    interval: Duration,
    cursor: usize,
    cycles: u64,
    state: LoopState,
    cancel: CancellationToken,
}

/// Run a network step unless cancellation arrives first.
async fn guarded<T, E, F>(cancel: &CancellationToken, step: F) -> Result<T, ControlError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ControlError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ControlError::Cancelled),
        result = step => result.map_err(Into::into),
    }
}

/// Level a failed cycle step is logged at. Steps cut short by shutdown are
/// routine.
fn failure_level(error: &ControlError) -> Level {
    match error {
        ControlError::Cancelled => Level::DEBUG,
        _ => Level::WARN,
    }
}

fn log_step_failure(step: &'static str, error: &ControlError) {
    if failure_level(error) == Level::DEBUG {
        tracing::debug!(step, "Cycle step interrupted by shutdown");
    } else {
        tracing::warn!(step, transient = error.is_transient(), error = %error, "Cycle step failed");
    }
}

impl<D, W> ControlLoop<D, W>
where
    D: DeviceControl,
    W: OutsideTemperature,
{
    /// `weather` is `None` when weather control is disabled.
    ///
    /// # Errors
    /// `ControlError::Configuration` for an empty position list or a zero
    /// interval.
    pub fn new(
        device: D,
        weather: Option<W>,
        positions: Vec<LouverPosition>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<Self, ControlError> {
        if positions.is_empty() {
            return Err(ControlError::Configuration(
                "louver position list is empty".into(),
            ));
        }
        if interval.is_zero() {
            return Err(ControlError::Configuration("cycle interval is zero".into()));
        }

        Ok(Self {
            device,
            weather,
            positions,
            interval,
            cursor: 0,
            cycles: 0,
            state: LoopState::Starting,
            cancel,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Index of the position the next cycle sends.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Authenticate, run the initial cycle, then keep cycling until
    /// cancelled.
    ///
    /// # Errors
    /// Only a failed initial authentication is returned; everything later is
    /// logged and retried on the next cycle.
    pub async fn run(mut self) -> Result<(), ControlError> {
        let cancel = self.cancel.clone();

        self.set_state(LoopState::Authenticating);
        match guarded(&cancel, self.device.login()).await {
            Ok(()) => tracing::info!("Authenticated with device cloud"),
            Err(ControlError::Cancelled) => {
                self.set_state(LoopState::Stopped);
                return Ok(());
            }
            Err(e) => {
                tracing::error!(error = %e, "Initial authentication failed");
                self.set_state(LoopState::Stopped);
                return Err(e);
            }
        }

        self.set_state(LoopState::InitialCycle);
        self.run_cycle().await;

        loop {
            self.set_state(LoopState::Waiting);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            self.set_state(LoopState::RunningCycle);
            self.run_cycle().await;
        }

        self.set_state(LoopState::Stopped);
        tracing::info!(cycles = self.cycles, "Control loop stopped");
        Ok(())
    }

    /// One cycle: read position, adjust setpoint, send the next position.
    ///
    /// Each step is best-effort; failures are logged and the cycle goes on.
    /// The cursor always advances.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cancel = self.cancel.clone();

        let observed_position = match guarded(&cancel, self.device.get_louver_position()).await {
            Ok(position) => {
                tracing::info!(position = %position, "Current louver position");
                Some(position)
            }
            Err(e) => {
                log_step_failure("read louver position", &e);
                None
            }
        };

        let weather = self.adjust_for_weather(&cancel).await;

        let sent_position = self.positions[self.cursor];
        let position_written = match guarded(
            &cancel,
            self.device.set_louver_position(&sent_position.as_value()),
        )
        .await
        {
            Ok(()) => {
                tracing::info!(position = %sent_position, "Sent louver position");
                true
            }
            Err(e) => {
                log_step_failure("send louver position", &e);
                false
            }
        };

        self.cursor = (self.cursor + 1) % self.positions.len();
        self.cycles += 1;

        CycleReport {
            observed_position,
            weather,
            sent_position,
            position_written,
        }
    }

    async fn adjust_for_weather(&mut self, cancel: &CancellationToken) -> WeatherOutcome {
        let Some(weather) = self.weather.as_ref() else {
            return WeatherOutcome::Disabled;
        };

        let outside = match guarded(cancel, weather.outside_temperature()).await {
            Ok(reading) => reading.temperature,
            Err(e) => {
                log_step_failure("weather check", &e);
                return WeatherOutcome::Failed(e.to_string());
            }
        };

        let setpoint = match guarded(cancel, self.device.get_temperature()).await {
            Ok(setpoint) => setpoint,
            Err(e) => {
                log_step_failure("read setpoint", &e);
                return WeatherOutcome::Failed(e.to_string());
            }
        };

        let Some(target) = advise(outside, setpoint) else {
            tracing::info!(outside, setpoint, "Setpoint unchanged");
            return WeatherOutcome::Unchanged { outside, setpoint };
        };

        match guarded(cancel, self.device.set_temperature(target)).await {
            Ok(()) => {
                tracing::info!(outside, from = setpoint, to = target, "Raised setpoint");
                WeatherOutcome::Raised {
                    outside,
                    from: setpoint,
                    to: target,
                }
            }
            Err(e) => {
                log_step_failure("raise setpoint", &e);
                WeatherOutcome::Failed(e.to_string())
            }
        }
    }

    fn set_state(&mut self, next: LoopState) {
        tracing::info!(from = ?self.state, to = ?next, "Control loop state");
        self.state = next;
    }
}
