use tokio::time::Duration;

pub(crate) const DEFAULT_DRONE_HOST:&str = "192.168.10.1";
pub(crate) const CONTROL_UDP_PORT:u16 = 8889;

const DEFAULT_RESPONSE_TIMEOUT:Duration = Duration::from_secs(7);
const DEFAULT_RETRY_COUNT:u32 = 3;
const DEFAULT_CONNECT_ATTEMPTS:u32 = 10;
const DEFAULT_SSID_PREFIX:&str = "TELLO";

/// Tello drone connection options.
///
/// The defaults match a drone in AP mode, ie with the host joined to the
/// drone's own WiFi network.
#[derive(Debug, Clone)]
pub struct TelloOptions {
    pub(crate) drone_host: String,
    pub(crate) control_port: u16,
    pub(crate) local_port: u16,
    pub(crate) response_timeout: Duration,
    pub(crate) retry_count: u32,
    pub(crate) connect_attempts: u32,
    pub(crate) ssid_prefix: String,
    pub(crate) wifi_timeout: Option<Duration>,
}

impl Default for TelloOptions {
    fn default() -> Self {
        Self {
            drone_host: DEFAULT_DRONE_HOST.to_string(),
            control_port: CONTROL_UDP_PORT,
            local_port: CONTROL_UDP_PORT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            ssid_prefix: DEFAULT_SSID_PREFIX.to_string(),
            wifi_timeout: None,
        }
    }
}

impl TelloOptions {
    /// Address of the drone, `192.168.10.1` by default.
    pub fn with_host(mut self, host: &str) -> Self {
        self.drone_host = host.to_string();
        self
    }

    /// UDP port the drone listens for commands on.
    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    /// Local UDP port to bind. The drone replies to 8889 in AP mode, use 0
    /// to let the OS pick one.
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// How long to wait for each reply before giving up on an attempt.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Attempts per command when the drone does not reply. At least one
    /// attempt is always made.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    /// Network name prefix to wait for, `TELLO` by default.
    pub fn with_ssid_prefix(mut self, prefix: &str) -> Self {
        self.ssid_prefix = prefix.to_string();
        self
    }

    /// Stop waiting for the WiFi after this long. Waits forever if unset.
    pub fn with_wifi_timeout(mut self, timeout: Duration) -> Self {
        self.wifi_timeout = Some(timeout);
        self
    }

    pub(crate) fn drone_address(&self) -> String {
        format!("{}:{}", self.drone_host, self.control_port)
    }

    pub(crate) fn local_address(&self) -> String {
        format!("0.0.0.0:{}", self.local_port)
    }
}
