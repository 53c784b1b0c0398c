use std::io::Write;

use log::{info, warn};

use crate::battery::{BatteryGate, TakeoffDecision};
use crate::drone::Drone;
use crate::errors::Result;

/// Reads the battery once, writes the report to `out` and ends the session.
///
/// The session is ended on every path. If reading the battery or writing
/// the report fails, that error is returned once the session has ended.
///
/// Example report for a drone at 15%:
/// ```text
/// Battery: 15%
/// Battery too low for takeoff. Please charge.
/// Battery is 15
/// ```
pub async fn run<D, W>(drone: D, gate: &BatteryGate, out: &mut W) -> Result<TakeoffDecision>
where
    D: Drone,
    W: Write,
{
    let outcome = check(&drone, gate, out).await;

    let ended = drone.end().await;
    if let (Err(_), Err(e)) = (&outcome, &ended) {
        warn!("[Gate] failed to end session - {e}");
    }

    let decision = outcome?;
    ended?;
    Ok(decision)
}

async fn check<D, W>(drone: &D, gate: &BatteryGate, out: &mut W) -> Result<TakeoffDecision>
where
    D: Drone,
    W: Write,
{
    let battery = drone.battery().await?;
    writeln!(out, "Battery: {battery}%")?;

    let decision = gate.decide(battery);
    info!("[Gate] battery {battery}%, threshold {}% → {decision:?}", gate.threshold());

    if decision == TakeoffDecision::Denied {
        writeln!(out, "Battery too low for takeoff. Please charge.")?;
    }
    writeln!(out, "Battery is {battery}")?;

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::battery::BatteryLevel;
    use crate::errors::TelloError;

    struct FakeDrone {
        battery: Option<u8>,
        fail_end: bool,
        battery_reads: Arc<AtomicUsize>,
        flights: Arc<AtomicUsize>,
        ends: Arc<AtomicUsize>,
    }

    impl FakeDrone {
        fn new(battery: Option<u8>) -> Self {
            Self {
                battery,
                fail_end: false,
                battery_reads: Arc::default(),
                flights: Arc::default(),
                ends: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Drone for FakeDrone {
        async fn battery(&self) -> Result<BatteryLevel> {
            self.battery_reads.fetch_add(1, Ordering::SeqCst);
            match self.battery {
                Some(b) => BatteryLevel::new(b),
                None => Err(TelloError::Timeout { command: "battery?".to_string() })
            }
        }

        async fn take_off(&self) -> Result<()> {
            self.flights.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn land(&self) -> Result<()> {
            self.flights.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn end(self) -> Result<()> {
            self.ends.fetch_add(1, Ordering::SeqCst);
            if self.fail_end {
                return Err(TelloError::Generic { msg: "socket gone".to_string() });
            }
            Ok(())
        }
    }

    async fn report(battery: u8) -> (TakeoffDecision, String) {
        let mut out = Vec::new();
        let decision = run(FakeDrone::new(Some(battery)), &BatteryGate::default(), &mut out)
            .await
            .unwrap();
        (decision, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn low_battery_is_refused() {
        let (decision, out) = report(15).await;
        assert_eq!(decision, TakeoffDecision::Denied);
        assert_eq!(out, "Battery: 15%\nBattery too low for takeoff. Please charge.\nBattery is 15\n");
    }

    #[tokio::test]
    async fn good_battery_is_permitted() {
        let (decision, out) = report(85).await;
        assert_eq!(decision, TakeoffDecision::Permitted);
        assert_eq!(out, "Battery: 85%\nBattery is 85\n");
    }

    #[tokio::test]
    async fn threshold_is_permitted() {
        let (decision, out) = report(20).await;
        assert_eq!(decision, TakeoffDecision::Permitted);
        assert!(!out.contains("too low"));

        let (decision, out) = report(19).await;
        assert_eq!(decision, TakeoffDecision::Denied);
        assert!(out.contains("Battery too low for takeoff. Please charge."));
    }

    #[tokio::test]
    async fn reads_once_ends_once_and_never_flies() {
        let drone = FakeDrone::new(Some(85));
        let (reads, flights, ends) = (drone.battery_reads.clone(), drone.flights.clone(), drone.ends.clone());

        run(drone, &BatteryGate::default(), &mut Vec::new()).await.unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(flights.load(Ordering::SeqCst), 0);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_read_still_ends_session() {
        let drone = FakeDrone::new(None);
        let ends = drone.ends.clone();
        let mut out = Vec::new();

        let r = run(drone, &BatteryGate::default(), &mut out).await;

        assert!(matches!(r, Err(TelloError::Timeout { .. })));
        assert!(out.is_empty());
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn read_error_wins_over_end_error() {
        let mut drone = FakeDrone::new(None);
        drone.fail_end = true;

        let r = run(drone, &BatteryGate::default(), &mut Vec::new()).await;
        assert!(matches!(r, Err(TelloError::Timeout { .. })));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_report_still_ends_session() {
        let drone = FakeDrone::new(Some(85));
        let ends = drone.ends.clone();

        let r = run(drone, &BatteryGate::default(), &mut BrokenPipe).await;

        assert!(matches!(r, Err(TelloError::IoError(_))));
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn end_error_is_reported_after_good_read() {
        let mut drone = FakeDrone::new(Some(50));
        drone.fail_end = true;
        let ends = drone.ends.clone();

        let r = run(drone, &BatteryGate::default(), &mut Vec::new()).await;
        assert!(matches!(r, Err(TelloError::Generic { .. })));
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }
}
