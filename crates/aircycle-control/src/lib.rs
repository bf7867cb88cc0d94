//! Louver cycling and weather-driven setpoint control.

pub mod advisor;
pub mod control_loop;
pub mod error;
pub mod ports;

pub use advisor::advise;
pub use control_loop::{ControlLoop, CycleReport, LoopState, WeatherOutcome};
pub use error::ControlError;
pub use ports::{DeviceControl, OutsideTemperature};
