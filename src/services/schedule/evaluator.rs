use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use super::types::{DaySchedule, ScheduleConfig, ScheduleEntryError};

const WEEKDAYS_PT_BR: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

const WEEKDAYS_EN: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Parse `HH:MM` (or `H:MM`) into minutes since midnight
pub fn parse_clock(value: &str) -> Result<u32, ScheduleEntryError> {
    let invalid = || ScheduleEntryError::InvalidClock(value.to_string());

    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Resolve an IANA timezone name, falling back to UTC for unknown names
pub fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!("Unknown timezone {:?}, evaluating schedule in UTC", name);
            Tz::UTC
        }
    }
}

/// Display name used for the `{dia}` placeholder
pub fn weekday_name(locale: &str, day: u8) -> &'static str {
    let names = if locale.eq_ignore_ascii_case("en") || locale.to_ascii_lowercase().starts_with("en-") {
        &WEEKDAYS_EN
    } else {
        &WEEKDAYS_PT_BR
    };
    names[usize::from(day % 7)]
}

/// Opening window for `day`, taken from the first entry for that day in declaration order.
///
/// A disabled first entry closes the day regardless of its clock times. Enabled
/// entries whose clock times do not parse are skipped, not fatal.
fn open_window_for_day(config: &ScheduleConfig, day: u8) -> Option<(&DaySchedule, u32, u32)> {
    for entry in config.schedule.iter().filter(|entry| entry.day == day) {
        if !entry.enabled {
            return None;
        }
        match entry.window() {
            Ok((start, end)) => return Some((entry, start, end)),
            Err(e) => tracing::warn!("Skipping schedule entry for day {}: {}", day, e),
        }
    }
    None
}

fn local_weekday(local: &DateTime<Tz>) -> u32 {
    local.weekday().num_days_from_sunday()
}

/// Whether `instant` falls inside the configured opening window.
///
/// A disabled configuration never restricts, so it always reports open.
/// Both window bounds are inclusive at minute granularity.
pub fn is_open(config: &ScheduleConfig, instant: DateTime<Utc>) -> bool {
    if !config.is_enabled {
        return true;
    }

    let local = instant.with_timezone(&resolve_timezone(&config.timezone));
    let day = local_weekday(&local) as u8;

    let Some((_, start, end)) = open_window_for_day(config, day) else {
        return false;
    };

    let minutes = local.hour() * 60 + local.minute();
    (start..=end).contains(&minutes)
}

/// Auto-reply text for a message arriving at `instant`, or `None` while open.
///
/// Looks 1 to 7 days ahead for the next enabled day and fills the template
/// with that day's window. When no day is enabled the template is returned
/// untouched.
pub fn next_open_message(config: &ScheduleConfig, instant: DateTime<Utc>) -> Option<String> {
    if is_open(config, instant) {
        return None;
    }

    let local = instant.with_timezone(&resolve_timezone(&config.timezone));
    let today = local_weekday(&local);

    for offset in 1..=7 {
        let day = ((today + offset) % 7) as u8;
        if let Some((entry, _, _)) = open_window_for_day(config, day) {
            return Some(render_template(config, entry));
        }
    }

    Some(config.auto_reply_template.clone())
}

fn render_template(config: &ScheduleConfig, entry: &DaySchedule) -> String {
    config
        .auto_reply_template
        .replace("{start}", &entry.start)
        .replace("{end}", &entry.end)
        .replace("{dia}", weekday_name(&config.locale, entry.day))
}
