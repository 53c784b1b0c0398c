use tello_battery::{gatekeeper, BatteryGate, Result, Tello};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // the drone may be reached over any network, so go straight to it
    let drone = Tello::new()
        .assume_wifi()
        .connect().await?;

    gatekeeper::run(drone, &BatteryGate::default(), &mut std::io::stdout()).await?;

    Ok(())
}
