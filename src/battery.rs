use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, TelloError};

/// Takeoff is refused below this charge.
pub const DEFAULT_BATTERY_THRESHOLD:u8 = 20;

/// Battery charge as a percentage, 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    pub fn new(percent: u8) -> Result<Self> {
        if percent > 100 {
            return Err(TelloError::ParseError { msg: format!("battery {percent}%") });
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl FromStr for BatteryLevel {
    type Err = TelloError;

    /// Parses the drone's reply to `battery?`, eg "87\r\n".
    fn from_str(s: &str) -> Result<Self> {
        let percent = s.trim().parse::<u8>()
            .map_err(|_| TelloError::ParseError { msg: s.to_string() })?;
        Self::new(percent)
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffDecision {
    Denied,
    Permitted
}

/// Maps a battery reading to a takeoff decision.
#[derive(Debug, Clone, Copy)]
pub struct BatteryGate {
    threshold: u8
}

impl Default for BatteryGate {
    fn default() -> Self {
        Self { threshold: DEFAULT_BATTERY_THRESHOLD }
    }
}

impl BatteryGate {
    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn decide(&self, level: BatteryLevel) -> TakeoffDecision {
        if level.percent() < self.threshold {
            TakeoffDecision::Denied
        }
        else {
            TakeoffDecision::Permitted
        }
    }
}
