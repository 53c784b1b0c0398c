use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout, Duration};

use crate::battery::BatteryLevel;
use crate::drone::Drone;
use crate::errors::{Result, TelloError};
use crate::options::TelloOptions;
use crate::wifi::wait_for_wifi;

const MAX_RESPONSE_SIZE:usize = 1024;
const CONNECT_RETRY_INTERVAL:Duration = Duration::from_millis(100);

// states
#[derive(Debug)]
pub struct NoWifi;

#[derive(Debug)]
pub struct Disconnected;

#[derive(Debug)]
pub struct Connected {
    sock: UdpSocket,
    flying: AtomicBool,
}

#[derive(Debug)]
pub struct Tello<S = NoWifi> {
    options: TelloOptions,
    state: S
}

impl Tello<NoWifi> {
    pub fn new() -> Self {
        Self::with_options(TelloOptions::default())
    }

    pub fn with_options(options: TelloOptions) -> Self {
        Self { options, state: NoWifi }
    }

    pub async fn wait_for_wifi(self) -> Result<Tello<Disconnected>> {
        info!("[Tello] waiting for WiFi {}...", self.options.ssid_prefix);
        wait_for_wifi(&self.options.ssid_prefix, self.options.wifi_timeout).await?;
        Ok(Tello { options: self.options, state: Disconnected })
    }

    /// Skips the WiFi check, eg when the drone is reached over another
    /// network.
    pub fn assume_wifi(self) -> Tello<Disconnected> {
        Tello { options: self.options, state: Disconnected }
    }
}

impl Default for Tello<NoWifi> {
    fn default() -> Self {
        Self::new()
    }
}

impl Tello<Disconnected> {
    /// Opens the control socket and puts the drone into command mode.
    pub async fn connect(self) -> Result<Tello<Connected>> {
        let local_address = self.options.local_address();
        let drone_address = self.options.drone_address();

        info!("[Tello] CONNECT {local_address} → {drone_address}");

        debug!("[Tello] binding local {local_address}...");
        let sock = UdpSocket::bind(&local_address).await?;

        debug!("[Tello] connecting to drone at {drone_address}...");
        let attempts = self.options.connect_attempts.max(1);
        let mut i = 0;
        loop {
            i += 1;
            match sock.connect(&drone_address).await {
                Ok(_) => break,
                Err(err) if i < attempts => {
                    warn!("[Tello] connection attempt #{i} failed ({err}), retrying...");
                    sleep(CONNECT_RETRY_INTERVAL).await;
                }
                Err(err) => return Err(err.into())
            }
        }

        let drone = Tello {
            options: self.options,
            state: Connected { sock, flying: AtomicBool::new(false) }
        };

        debug!("[Tello] putting drone in command mode...");
        drone.send_command("command").await?;

        info!("[Tello] CONNECTED");

        Ok(drone)
    }
}

impl Tello<Connected> {
    /// Sends a message and waits for the reply, once.
    pub async fn send(&self, msg:&str) -> Result<String> {
        self.discard_queued_replies()?;

        debug!("[Tello] SEND {msg}");
        let s = &self.state.sock;
        s.send(msg.as_bytes()).await?;

        let mut buf = vec![0; MAX_RESPONSE_SIZE];
        let n = timeout(self.options.response_timeout, s.recv(&mut buf))
            .await
            .map_err(|_| TelloError::Timeout { command: msg.to_string() })??;
        buf.truncate(n);
        let response = String::from_utf8(buf)?.trim().to_string();

        debug!("[Tello] RECEIVED {response}");

        Ok(response)
    }

    /// Sends a control command, which the drone acknowledges with "ok".
    pub async fn send_command(&self, command:&str) -> Result<()> {
        let response = self.send_with_retry(command).await?;
        if response.eq_ignore_ascii_case("ok") {
            Ok(())
        }
        else {
            Err(TelloError::CommandFailed { command: command.to_string(), response })
        }
    }

    /// Sends a read command, eg "battery?", returning the value.
    pub async fn send_query(&self, query:&str) -> Result<String> {
        let response = self.send_with_retry(query).await?;
        if response.starts_with("error") {
            return Err(TelloError::CommandFailed { command: query.to_string(), response });
        }
        Ok(response)
    }

    async fn send_with_retry(&self, msg:&str) -> Result<String> {
        let attempts = self.options.retry_count.max(1);
        let mut i = 0;
        loop {
            i += 1;
            match self.send(msg).await {
                Err(TelloError::Timeout { .. }) if i < attempts => {
                    warn!("[Tello] no response to {msg} (attempt #{i}), retrying...");
                }
                Ok(response) if i > 1 => {
                    // earlier attempts may still be answered
                    self.discard_late_replies(i - 1).await?;
                    return Ok(response)
                }
                r => return r
            }
        }
    }

    /// Drops replies already waiting on the socket.
    fn discard_queued_replies(&self) -> Result<()> {
        let mut buf = vec![0; MAX_RESPONSE_SIZE];
        loop {
            match self.state.sock.try_recv(&mut buf) {
                Ok(n) => debug!("[Tello] DISCARDED {}", String::from_utf8_lossy(&buf[..n]).trim()),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into())
            }
        }
    }

    /// Waits for up to `count` replies to timed-out attempts and drops them,
    /// giving each one response timeout to arrive.
    async fn discard_late_replies(&self, count: u32) -> Result<()> {
        let mut buf = vec![0; MAX_RESPONSE_SIZE];
        for _ in 0..count {
            match timeout(self.options.response_timeout, self.state.sock.recv(&mut buf)).await {
                Ok(n) => {
                    let n = n?;
                    debug!("[Tello] DISCARDED {}", String::from_utf8_lossy(&buf[..n]).trim());
                }
                Err(_) => break
            }
        }
        Ok(())
    }

    pub fn is_flying(&self) -> bool {
        self.state.flying.load(Ordering::Relaxed)
    }

    pub async fn battery(&self) -> Result<BatteryLevel> {
        self.send_query("battery?").await?.parse()
    }

    pub async fn take_off(&self) -> Result<()> {
        self.send_command("takeoff").await?;
        self.state.flying.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub async fn land(&self) -> Result<()> {
        self.send_command("land").await?;
        self.state.flying.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Ends the session, landing first if needed, and closes the control
    /// socket so the drone drops out of command mode.
    pub async fn end(self) -> Tello<Disconnected> {
        if self.is_flying() {
            info!("[Tello] still flying, landing before disconnecting...");
            if let Err(e) = self.land().await {
                warn!("[Tello] failed to land - {e}");
            }
        }

        info!("[Tello] DISCONNECTED");

        Tello { options: self.options, state: Disconnected }
    }
}

#[async_trait]
impl Drone for Tello<Connected> {
    async fn battery(&self) -> Result<BatteryLevel> {
        Tello::<Connected>::battery(self).await
    }

    async fn take_off(&self) -> Result<()> {
        Tello::<Connected>::take_off(self).await
    }

    async fn land(&self) -> Result<()> {
        Tello::<Connected>::land(self).await
    }

    async fn end(self) -> Result<()> {
        Tello::<Connected>::end(self).await;
        Ok(())
    }
}
