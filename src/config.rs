//! Probe configuration.
//!
//! The port of the application's readiness endpoint is read once at startup
//! from an optional INI file shipped next to the loader executable. Every
//! other knob is a fixed constant; nothing re-reads the file later.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, File, FileFormat};
use tracing::warn;

/// Fallback port when the system config file or the port key is absent.
pub const DEFAULT_PORT: u16 = 5010;

/// Wall-clock budget for the whole startup sequence.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause between readiness probes. Short enough to keep perceived startup
/// latency low without busy-spinning.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on a single probe request, so a hung connection attempt
/// cannot stall a cycle past the overall startup timeout.
pub const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_millis(1500);

/// Location of the system config file, relative to the loader executable.
pub const SYSTEM_CONFIG_RELATIVE: &str = "config/system.ini";

// Lookup path into the INI file: `FLASK_PORT_NO` under `[System]`.
// The config crate lowercases keys on load.
const PORT_KEY: &str = "system.flask_port_no";

/// Immutable probe settings, constructed once and passed by reference into
/// the readiness prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub port: u16,
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            startup_timeout: STARTUP_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            request_timeout: PROBE_REQUEST_TIMEOUT,
        }
    }
}

impl ProbeConfig {
    /// Loads the probe configuration, taking the port from `path` when the
    /// file and key exist. A missing or broken file is never fatal.
    pub fn load(path: &Path) -> Self {
        Self {
            port: read_port(path).unwrap_or(DEFAULT_PORT),
            ..Self::default()
        }
    }

    /// Loads using the system config file next to the loader executable.
    pub fn load_near_executable() -> Self {
        match system_config_path() {
            Some(path) => Self::load(&path),
            None => Self::default(),
        }
    }

    /// URL of the application's liveness endpoint.
    pub fn ping_url(&self) -> String {
        format!("http://localhost:{}/ping", self.port)
    }
}

/// `<loader dir>/config/system.ini`, if the loader's own path is resolvable.
fn system_config_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(SYSTEM_CONFIG_RELATIVE))
}

fn read_port(path: &Path) -> Option<u16> {
    let settings = match Config::builder()
        .add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Ini)
                .required(false),
        )
        .build()
    {
        Ok(settings) => settings,
        Err(err) => {
            warn!("unreadable system config {}: {err}", path.display());
            return None;
        }
    };

    let raw = match settings.get_int(PORT_KEY) {
        Ok(raw) => raw,
        // An absent key is the normal case and stays quiet.
        Err(ConfigError::NotFound(_)) => return None,
        Err(err) => {
            warn!("ignoring invalid port value in {}: {err}", path.display());
            return None;
        }
    };
    match u16::try_from(raw) {
        Ok(port) if port > 0 => Some(port),
        _ => {
            warn!("ignoring out-of-range port {raw} in {}", path.display());
            None
        }
    }
}
