//! Game settings and preferences
//!
//! Read from the page URL (`?preset=canvas&driver=interval`) on web; nothing is
//! stored between visits.

use serde::{Deserialize, Serialize};

use crate::tuning::Preset;

/// What drives the simulation clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DriverKind {
    /// requestAnimationFrame with a fixed-step accumulator
    #[default]
    Frame,
    /// One tick per timer interval
    Interval,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Frame => "Frame",
            DriverKind::Interval => "Interval",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "frame" | "raf" => Some(DriverKind::Frame),
            "interval" | "timer" => Some(DriverKind::Interval),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Physics/geometry preset
    pub preset: Preset,
    /// Simulation driver
    pub driver: DriverKind,
    /// Show FPS counter
    pub show_fps: bool,
    /// Draw the bird without tilt
    pub reduced_motion: bool,
    /// Every key flaps, not just Space/ArrowUp
    pub any_key_flaps: bool,
    /// Start in demo mode
    pub autopilot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Classic,
            driver: DriverKind::Frame,
            show_fps: false,
            reduced_motion: false,
            any_key_flaps: false,
            autopilot: false,
        }
    }
}

impl Settings {
    /// Parse a URL query string. Unknown keys and bad values are skipped.
    ///
    /// Without an explicit `any_key`, the canvas preset flaps on every key.
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        let mut any_key = None;
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
            match key {
                "preset" => match Preset::from_str(value) {
                    Some(preset) => settings.preset = preset,
                    None => log::warn!("Unknown preset '{}'", value),
                },
                "driver" => match DriverKind::from_str(value) {
                    Some(driver) => settings.driver = driver,
                    None => log::warn!("Unknown driver '{}'", value),
                },
                "fps" => settings.show_fps = parse_flag(value),
                "reduced_motion" => settings.reduced_motion = parse_flag(value),
                "any_key" => any_key = Some(parse_flag(value)),
                "demo" => settings.autopilot = parse_flag(value),
                _ => log::debug!("Ignoring query key '{}'", key),
            }
        }

        settings.any_key_flaps = any_key.unwrap_or(settings.preset == Preset::Canvas);
        settings
    }

    /// Load settings from the page URL (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let query = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let settings = Self::from_query(&query);
        log::info!(
            "Settings: preset={} driver={}",
            settings.preset.as_str(),
            settings.driver.as_str()
        );
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

/// Whether a `KeyboardEvent.key` value should flap
pub fn is_flap_key(key: &str, any_key_flaps: bool) -> bool {
    any_key_flaps || matches!(key, " " | "Spacebar" | "ArrowUp")
}
