//! AEGIS Shield Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single-threaded control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink    UptimeClock   WifiAdapter  │
//! │  (Sensor+Output)    (EventSink)                                │
//! │  WsServer ─── TransportChannels ─── ChannelTransport           │
//! │  (I/O side)                         (TransportPort)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  Sessions · Alert sequencer · Broadcast scheduler      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use aegis::adapters::hardware::HardwareAdapter;
use aegis::adapters::log_sink::LogEventSink;
use aegis::adapters::time::UptimeClock;
use aegis::adapters::wifi::WifiAdapter;
use aegis::adapters::ws_server::WsServer;
use aegis::app::service::MonitorService;
use aegis::config::SystemConfig;
use aegis::drivers::hw_init;
use aegis::drivers::outputs::AlertOutputs;
use aegis::error::Error;
use aegis::pins;
use aegis::sensors::flame::FlameSensor;
use aegis::sensors::gas::GasSensor;
use aegis::sensors::vitals::SimulatedVitals;
use aegis::sensors::SensorHub;
use aegis::transport::bridge::ChannelTransport;
use aegis::transport::channels::CHANNELS;

#[cfg(not(target_os = "espidf"))]
use aegis::app::ports::ConfigPort;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AEGIS Shield v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;

    // ── 3. Peripherals + self-test ────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let vitals = match config.sim_seed {
        Some(seed) => {
            info!("Vitals: fixed seed {}", seed);
            SimulatedVitals::new(seed)
        }
        None => SimulatedVitals::from_entropy(),
    };
    let sensor_hub = SensorHub::new(
        FlameSensor::new(pins::FLAME_SENSOR_GPIO),
        GasSensor::new(pins::MQ2_ADC_CHANNEL),
        vitals,
    );
    let mut hw = HardwareAdapter::new(sensor_hub, AlertOutputs::new());
    hw.outputs_mut().startup_self_test();

    // ── 4. WiFi ───────────────────────────────────────────────
    let mut wifi = build_wifi()?;
    if !config.wifi_ssid.is_empty() {
        wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
            .map_err(Error::from)?;
    }
    wifi.connect_blocking(hw.outputs_mut()).map_err(Error::from)?;

    // ── 5. WebSocket server ───────────────────────────────────
    let server = start_server(config.ws_port)?;

    match wifi.local_ip() {
        Some(ip) => info!("WebSocket server ready at ws://{}:{}", ip, config.ws_port),
        None => info!("WebSocket server ready on port {}", config.ws_port),
    }

    // ── 6. App service ────────────────────────────────────────
    let clock = UptimeClock::new();
    let mut log_sink = LogEventSink::new();
    let mut transport = ChannelTransport::new(&CHANNELS);
    let mut service = MonitorService::new(config.clone());
    service.start(&mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    let loop_interval = std::time::Duration::from_millis(u64::from(config.control_loop_interval_ms));

    loop {
        let now_ms = clock.uptime_ms();

        CHANNELS.drain_events(|event| {
            service.handle_transport_event(event, now_ms, &mut hw, &mut transport, &mut log_sink);
        });

        let _ = service.tick(now_ms, &mut hw, &mut transport, &mut log_sink);

        #[cfg(target_os = "espidf")]
        server.pump_outbound();
        #[cfg(not(target_os = "espidf"))]
        if server.is_finished() {
            anyhow::bail!("WS I/O thread exited");
        }

        wifi.poll(now_ms, hw.outputs_mut());

        std::thread::sleep(loop_interval);
    }
}

// ── Platform setup ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))
}

/// Device builds run on defaults; credentials may be baked in at build time.
#[cfg(target_os = "espidf")]
fn load_config() -> Result<SystemConfig> {
    let mut config = SystemConfig::default();
    if let Some(ssid) = option_env!("AEGIS_WIFI_SSID") {
        config.wifi_ssid = heapless::String::try_from(ssid)
            .map_err(|_| anyhow::anyhow!("AEGIS_WIFI_SSID too long"))?;
    }
    if let Some(password) = option_env!("AEGIS_WIFI_PASSWORD") {
        config.wifi_password = heapless::String::try_from(password)
            .map_err(|_| anyhow::anyhow!("AEGIS_WIFI_PASSWORD too long"))?;
    }
    config.validate().map_err(Error::from)?;
    Ok(config)
}

#[cfg(not(target_os = "espidf"))]
fn load_config() -> Result<SystemConfig> {
    use aegis::adapters::config_file::FileConfig;

    match FileConfig::from_env().load() {
        Ok(config) => Ok(config),
        Err(e) => {
            log::warn!("Config load failed ({}), refusing to start", e);
            Err(Error::from(e).into())
        }
    }
}

#[cfg(target_os = "espidf")]
fn build_wifi() -> Result<WifiAdapter> {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    Ok(WifiAdapter::new(wifi))
}

#[cfg(not(target_os = "espidf"))]
fn build_wifi() -> Result<WifiAdapter> {
    Ok(WifiAdapter::new())
}

#[cfg(target_os = "espidf")]
fn start_server(port: u16) -> Result<WsServer> {
    Ok(WsServer::start(port, &CHANNELS).map_err(Error::from)?)
}

/// Bind the listener and hand it to the I/O thread.
#[cfg(not(target_os = "espidf"))]
fn start_server(port: u16) -> Result<std::thread::JoinHandle<()>> {
    let server = WsServer::bind(port).map_err(Error::from)?;
    let handle = aegis::transport::io_task::spawn(server, &CHANNELS)?;
    Ok(handle)
}
