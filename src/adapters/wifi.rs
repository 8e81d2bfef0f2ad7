//! WiFi station-mode adapter.
//!
//! Brings the node onto the network before the WebSocket server starts,
//! and re-associates if the link drops later.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests. The host
//!   is assumed to be online already, so credentials are optional.
//!
//! ## Retry policy
//!
//! Association is retried indefinitely at a fixed interval (1 s). Each
//! failed attempt toggles the green LED as a heartbeat; a successful
//! association leaves it solid on.

use core::fmt;
use core::time::Duration;
use std::net::Ipv4Addr;

use log::{info, warn};

use crate::alert::OutputMask;
use crate::drivers::outputs::AlertOutputs;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl ConnectivityError {
    /// Whether another attempt could succeed without new credentials.
    pub fn is_retryable(self) -> bool {
        self == Self::ConnectionFailed
    }
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32, next_try_ms: u64 },
}

/// Delay between association attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    retry_interval: Duration,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: remaining attempts that will fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            retry_interval: RETRY_INTERVAL,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            retry_interval: RETRY_INTERVAL,
            sim_failures: 0,
            sim_link_up: false,
        }
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Station IP address once associated.
    pub fn local_ip(&self) -> Option<Ipv4Addr> {
        if self.state != WifiState::Connected {
            return None;
        }
        self.platform_local_ip()
    }

    /// One association attempt.
    pub fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() && Self::CREDENTIALS_REQUIRED {
            return Err(ConnectivityError::NoCredentials);
        }
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = WifiState::Disconnected;
                Err(e)
            }
        }
    }

    /// Retry [`connect`](Self::connect) until it succeeds, toggling the
    /// green LED on every failed attempt. Returns the number of attempts.
    ///
    /// Only non-retryable errors (missing or invalid credentials) return
    /// early.
    pub fn connect_blocking(&mut self, heartbeat: &mut AlertOutputs) -> Result<u32, ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.connect() {
                Ok(()) => {
                    heartbeat.set(OutputMask::GREEN, true);
                    info!("WiFi: connected after {} attempt(s)", attempts);
                    return Ok(attempts);
                }
                Err(e) if e.is_retryable() => {
                    heartbeat.toggle(OutputMask::GREEN);
                    std::thread::sleep(self.retry_interval);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Link supervision. Call once per control-loop pass.
    pub fn poll(&mut self, now_ms: u64, heartbeat: &mut AlertOutputs) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting {
                        attempt: 0,
                        next_try_ms: now_ms,
                    };
                }
            }
            WifiState::Reconnecting {
                attempt,
                next_try_ms,
            } if now_ms >= next_try_ms => {
                info!("WiFi: reconnect attempt {}", attempt + 1);
                match self.platform_connect() {
                    Ok(()) => {
                        self.state = WifiState::Connected;
                        heartbeat.set(OutputMask::GREEN, true);
                        info!("WiFi: reconnected");
                    }
                    Err(_) => {
                        heartbeat.toggle(OutputMask::GREEN);
                        self.state = WifiState::Reconnecting {
                            attempt: attempt + 1,
                            next_try_ms: now_ms + self.retry_interval.as_millis() as u64,
                        };
                    }
                }
            }
            _ => {}
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    const CREDENTIALS_REQUIRED: bool = true;

    #[cfg(not(target_os = "espidf"))]
    const CREDENTIALS_REQUIRED: bool = false;

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        self.wifi
            .set_configuration(&config)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .start()
                .map_err(|_| ConnectivityError::ConnectionFailed)?;
        }
        if let Err(e) = self.wifi.connect().and_then(|()| self.wifi.wait_netif_up()) {
            warn!("WiFi(espidf): association failed: {}", e);
            let _ = self.wifi.disconnect();
            return Err(ConnectivityError::ConnectionFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            warn!("WiFi(sim): simulated association failure");
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): using host network");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::LOCALHOST)
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Make the next `n` association attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    /// Drop the simulated link; the next `poll` notices.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}
