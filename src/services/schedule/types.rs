use serde::{Deserialize, Serialize};

use super::evaluator::parse_clock;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_LOCALE: &str = "pt-BR";
pub const DEFAULT_AUTO_REPLY_TEMPLATE: &str =
    "Olá! No momento estamos fora do horário de atendimento. Retornaremos {dia}, das {start} às {end}.";

/// Opening window for one weekday (0 = Sunday).
///
/// `start` and `end` are same-day `HH:MM` clock times; overnight windows are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: u8,
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl DaySchedule {
    pub fn new(day: u8, enabled: bool, start: &str, end: &str) -> Self {
        Self {
            day,
            enabled,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Window bounds in minutes since midnight
    pub fn window(&self) -> Result<(u32, u32), ScheduleEntryError> {
        Ok((parse_clock(&self.start)?, parse_clock(&self.end)?))
    }
}

/// Business-hours record for one desk owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub is_enabled: bool,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Supports `{start}`, `{end}` and `{dia}` placeholders
    #[serde(default = "default_template")]
    pub auto_reply_template: String,
    #[serde(default)]
    pub schedule: Vec<DaySchedule>,
    /// Language used for the `{dia}` placeholder ("pt-BR" or "en")
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_template() -> String {
    DEFAULT_AUTO_REPLY_TEMPLATE.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let schedule = (0..7u8)
            .map(|day| {
                let weekday = (1..=5).contains(&day);
                DaySchedule::new(day, weekday, "09:00", "18:00")
            })
            .collect();

        Self {
            is_enabled: false,
            timezone: default_timezone(),
            auto_reply_template: default_template(),
            schedule,
            locale: default_locale(),
        }
    }
}

impl ScheduleConfig {
    /// Strict check applied before a record is saved.
    ///
    /// Evaluation stays lenient and skips bad entries; saving refuses them.
    pub fn validate(&self) -> Result<(), ScheduleEntryError> {
        for entry in &self.schedule {
            if entry.day > 6 {
                return Err(ScheduleEntryError::DayOutOfRange(entry.day));
            }

            let (start, end) = entry.window()?;
            if entry.enabled && start > end {
                return Err(ScheduleEntryError::InvertedWindow {
                    day: entry.day,
                    start: entry.start.clone(),
                    end: entry.end.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfigPatch {
    pub is_enabled: Option<bool>,
    pub timezone: Option<String>,
    pub auto_reply_template: Option<String>,
    pub schedule: Option<Vec<DaySchedule>>,
    pub locale: Option<String>,
}

impl ScheduleConfigPatch {
    pub fn apply(self, mut base: ScheduleConfig) -> ScheduleConfig {
        if let Some(is_enabled) = self.is_enabled {
            base.is_enabled = is_enabled;
        }
        if let Some(timezone) = self.timezone {
            base.timezone = timezone;
        }
        if let Some(template) = self.auto_reply_template {
            base.auto_reply_template = template;
        }
        if let Some(schedule) = self.schedule {
            base.schedule = schedule;
        }
        if let Some(locale) = self.locale {
            base.locale = locale;
        }
        base
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleEntryError {
    #[error("Invalid clock time: {0:?} (expected HH:MM)")]
    InvalidClock(String),

    #[error("Day out of range: {0} (expected 0-6)")]
    DayOutOfRange(u8),

    #[error("Window for day {day} starts after it ends: {start} > {end}")]
    InvertedWindow { day: u8, start: String, end: String },
}
