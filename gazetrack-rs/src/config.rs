use std::path::PathBuf;
use std::time::Duration;

use crate::stream::WaitPolicy;

/// Most devices the simulated backend will expose.
pub const MAX_SIM_DEVICES: usize = 64;

/// Runtime settings, read from `GAZETRACK_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Re-check interval for predicate waits (`GAZETRACK_POLL_INTERVAL_MS`).
    pub poll_interval: Duration,
    /// Upper bound for predicate waits; `None` waits forever
    /// (`GAZETRACK_WAIT_TIMEOUT_MS`, unset or 0 = no limit).
    pub wait_timeout: Option<Duration>,
    /// Where calibration blobs are saved (`GAZETRACK_CALIBRATION_FILE`).
    pub calibration_file: PathBuf,
    /// Devices exposed by the simulated backend (`GAZETRACK_SIM_DEVICES`),
    /// clamped to [`MAX_SIM_DEVICES`].
    pub sim_devices: usize,
    /// Initial gaze output frequency of simulated devices (`GAZETRACK_SIM_FREQUENCY_HZ`).
    pub sim_frequency_hz: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            wait_timeout: None,
            calibration_file: PathBuf::from("saved_calibration.bin"),
            sim_devices: 1,
            sim_frequency_hz: 60.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let poll_ms = read_u64(&lookup, "GAZETRACK_POLL_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .unwrap_or(defaults.poll_interval.as_millis() as u64);
        let wait_timeout = read_u64(&lookup, "GAZETRACK_WAIT_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        let calibration_file = read_string(&lookup, "GAZETRACK_CALIBRATION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.calibration_file);
        let sim_devices = read_u64(&lookup, "GAZETRACK_SIM_DEVICES")
            .map(|n| {
                if n > MAX_SIM_DEVICES as u64 {
                    log::warn!(
                        "Clamping GAZETRACK_SIM_DEVICES={} to {}",
                        n,
                        MAX_SIM_DEVICES
                    );
                    MAX_SIM_DEVICES
                } else {
                    n as usize
                }
            })
            .unwrap_or(defaults.sim_devices);
        let sim_frequency_hz = lookup("GAZETRACK_SIM_FREQUENCY_HZ")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .unwrap_or(defaults.sim_frequency_hz);

        Self {
            poll_interval: Duration::from_millis(poll_ms),
            wait_timeout,
            calibration_file,
            sim_devices,
            sim_frequency_hz,
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: self.poll_interval,
            timeout: self.wait_timeout,
        }
    }
}

fn read_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let value = lookup(name)?;
    match value.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}='{}': not an unsigned integer", name, value);
            None
        }
    }
}

fn read_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.wait_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GAZETRACK_POLL_INTERVAL_MS", "25"),
            ("GAZETRACK_WAIT_TIMEOUT_MS", "5000"),
            ("GAZETRACK_CALIBRATION_FILE", " /tmp/cal.bin "),
            ("GAZETRACK_SIM_DEVICES", "3"),
            ("GAZETRACK_SIM_FREQUENCY_HZ", "120"),
        ]));
        assert_eq!(config.poll_interval, Duration::from_millis(25));
        assert_eq!(config.wait_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.calibration_file, PathBuf::from("/tmp/cal.bin"));
        assert_eq!(config.sim_devices, 3);
        assert_eq!(config.sim_frequency_hz, 120.0);
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("GAZETRACK_POLL_INTERVAL_MS", "fast"),
            ("GAZETRACK_WAIT_TIMEOUT_MS", "0"),
            ("GAZETRACK_SIM_FREQUENCY_HZ", "-3"),
        ]));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.wait_timeout.is_none());
        assert_eq!(config.sim_frequency_hz, 60.0);
    }

    #[test]
    fn test_sim_devices_clamped() {
        let config = Config::from_lookup(lookup_from(&[(
            "GAZETRACK_SIM_DEVICES",
            "99999999999",
        )]));
        assert_eq!(config.sim_devices, MAX_SIM_DEVICES);

        let config = Config::from_lookup(lookup_from(&[("GAZETRACK_SIM_DEVICES", "64")]));
        assert_eq!(config.sim_devices, 64);
    }
}
