mod types;
mod evaluator;

pub use types::{
    DaySchedule, ScheduleConfig, ScheduleConfigPatch, ScheduleEntryError,
    DEFAULT_AUTO_REPLY_TEMPLATE, DEFAULT_LOCALE, DEFAULT_TIMEZONE,
};
pub use evaluator::{is_open, next_open_message, parse_clock, resolve_timezone, weekday_name};
