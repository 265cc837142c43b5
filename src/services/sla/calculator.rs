use chrono::{DateTime, Duration, Utc};

use super::types::{SlaConfig, SlaKind, SlaVerdict, WARNING_BAND_RATIO};

/// Deadline multiplier for `priority`.
///
/// Unknown labels, and stored multipliers that are not positive finite numbers, scale by 1.0.
pub fn effective_multiplier(config: &SlaConfig, priority: &str) -> f64 {
    match config.priority_multiplier.get(priority) {
        Some(multiplier) if multiplier.is_finite() && *multiplier > 0.0 => *multiplier,
        Some(multiplier) => {
            tracing::warn!(
                "Ignoring invalid SLA multiplier {} for priority {:?}",
                multiplier,
                priority
            );
            1.0
        }
        None => 1.0,
    }
}

/// Compute the SLA verdict for a ticket at `now`.
///
/// Returns `None` while SLA tracking is inactive. Before the first response the
/// first-response deadline applies, afterwards the resolution deadline. Elapsed
/// time is always measured from `created_at`, for both kinds.
pub fn compute_verdict(
    config: &SlaConfig,
    created_at: DateTime<Utc>,
    first_responded_at: Option<DateTime<Utc>>,
    priority: &str,
    now: DateTime<Utc>,
) -> Option<SlaVerdict> {
    if !config.is_active {
        return None;
    }

    let multiplier = effective_multiplier(config, priority);
    let (kind, base_minutes) = match first_responded_at {
        None => (SlaKind::FirstResponse, config.first_response_minutes),
        Some(_) => (SlaKind::Resolution, config.resolution_minutes),
    };

    let deadline_minutes = f64::from(base_minutes) * multiplier;
    let elapsed_minutes = (now - created_at).num_milliseconds() as f64 / 60_000.0;
    let remaining = deadline_minutes - elapsed_minutes;

    let is_breached = remaining <= 0.0;
    let is_warning = remaining > 0.0 && remaining <= deadline_minutes * WARNING_BAND_RATIO;

    Some(SlaVerdict {
        kind,
        is_breached,
        is_warning,
        remaining_minutes: remaining.round() as i64,
        deadline_minutes,
        due_at: due_at(created_at, deadline_minutes),
    })
}

/// Wall-clock deadline, or `None` when it falls outside the representable date range
fn due_at(created_at: DateTime<Utc>, deadline_minutes: f64) -> Option<DateTime<Utc>> {
    let millis = (deadline_minutes * 60_000.0).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    created_at.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}
