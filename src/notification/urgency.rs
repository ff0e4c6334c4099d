//! Urgency levels and the timing policy derived from them
//!
//! The urgency level decides how a notification animates and how it competes
//! for a stack slot:
//! - LOW: shortest total duration, smallest burst
//! - NORMAL: default
//! - CRITICAL: held on screen until explicitly closed, never evicted
//!
//! `UrgencyTable::timing` is the only place durations come from.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Urgency level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "LOW",
            Urgency::Normal => "NORMAL",
            Urgency::Critical => "CRITICAL",
        }
    }

    /// Map the freedesktop `urgency` hint byte (0, 1, 2)
    ///
    /// Unknown values fall back to NORMAL, the same way notification daemons
    /// treat an out-of-range hint.
    pub fn from_hint(byte: u8) -> Self {
        match byte {
            0 => Urgency::Low,
            2 => Urgency::Critical,
            _ => Urgency::Normal,
        }
    }

    /// CRITICAL notifications are never force-closed to make room
    pub fn is_evictable(&self) -> bool {
        !matches!(self, Urgency::Critical)
    }
}

impl FromStr for Urgency {
    type Err = String;

    /// Case-insensitive; accepts names and hint bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "0" => Ok(Urgency::Low),
            "normal" | "1" => Ok(Urgency::Normal),
            "critical" | "2" => Ok(Urgency::Critical),
            other => Err(format!("unknown urgency: {other}")),
        }
    }
}

/// Timing and burst parameters for one urgency level
///
/// Durations are stored in milliseconds so the table reads naturally in a
/// config file. A `show_ms` of 0 means "hold until closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyTiming {
    pub slide_in_ms: u64,
    pub break_ms: u64,
    pub show_ms: u64,
    pub slide_out_ms: u64,
    pub particle_burst: usize,
    pub max_particle_lifespan_ms: u64,
}

impl UrgencyTiming {
    pub fn slide_in(&self) -> Duration {
        Duration::from_millis(self.slide_in_ms)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_ms)
    }

    /// `None` when the notification is held until an explicit close
    pub fn show(&self) -> Option<Duration> {
        (self.show_ms > 0).then(|| Duration::from_millis(self.show_ms))
    }

    pub fn slide_out(&self) -> Duration {
        Duration::from_millis(self.slide_out_ms)
    }

    pub fn max_particle_lifespan(&self) -> Duration {
        Duration::from_millis(self.max_particle_lifespan_ms)
    }

    /// Total on-screen time, `None` for held notifications
    pub fn total(&self) -> Option<Duration> {
        self.show()
            .map(|show| self.slide_in() + self.break_duration() + show + self.slide_out())
    }
}

/// Per-urgency timing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyTable {
    pub low: UrgencyTiming,
    pub normal: UrgencyTiming,
    pub critical: UrgencyTiming,
}

impl Default for UrgencyTable {
    fn default() -> Self {
        Self {
            low: UrgencyTiming {
                slide_in_ms: 250,
                break_ms: 200,
                show_ms: 3000,
                slide_out_ms: 250,
                particle_burst: 24,
                max_particle_lifespan_ms: 600,
            },
            normal: UrgencyTiming {
                slide_in_ms: 400,
                break_ms: 350,
                show_ms: 5000,
                slide_out_ms: 400,
                particle_burst: 48,
                max_particle_lifespan_ms: 900,
            },
            critical: UrgencyTiming {
                slide_in_ms: 450,
                break_ms: 500,
                show_ms: 0,
                slide_out_ms: 450,
                particle_burst: 96,
                max_particle_lifespan_ms: 1400,
            },
        }
    }
}

impl UrgencyTable {
    pub fn timing(&self, urgency: Urgency) -> UrgencyTiming {
        match urgency {
            Urgency::Low => self.low,
            Urgency::Normal => self.normal,
            Urgency::Critical => self.critical,
        }
    }
}
