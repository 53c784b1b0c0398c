use async_trait::async_trait;

use crate::battery::BatteryLevel;
use crate::errors::Result;

/// The device-control operations the battery check needs from a drone
/// session.
///
/// `end` takes the session by value, so once it has been called the session
/// can no longer be used or ended again.
#[async_trait]
pub trait Drone: Send + Sync + Sized {
    /// Current battery charge.
    async fn battery(&self) -> Result<BatteryLevel>;

    /// Takes off and hovers.
    async fn take_off(&self) -> Result<()>;

    /// Lands and stops the motors.
    async fn land(&self) -> Result<()>;

    /// Ends the session, landing first if still in the air.
    async fn end(self) -> Result<()>;
}
