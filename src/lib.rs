//! Checks a Tello drone's battery before flight.
//!
//! Connects to the drone over its UDP SDK, reads the battery once and
//! reports whether there is enough charge to take off.
//!
//! ``` no_run
//! # async fn check() -> tello_battery::Result<()> {
//! use tello_battery::{gatekeeper, BatteryGate, Tello};
//!
//! let drone = Tello::new()
//!     .wait_for_wifi().await?
//!     .connect().await?;
//!
//! gatekeeper::run(drone, &BatteryGate::default(), &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

mod battery;
mod drone;
mod errors;
mod options;
mod tello;
mod wifi;

pub mod gatekeeper;

pub use battery::{BatteryGate, BatteryLevel, TakeoffDecision, DEFAULT_BATTERY_THRESHOLD};
pub use drone::Drone;
pub use errors::{TelloError, Result};
pub use options::TelloOptions;
pub use tello::{Tello, NoWifi, Disconnected, Connected};
