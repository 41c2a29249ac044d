//! Recurrence rules and next-occurrence arithmetic.
//!
//! A rule may be serialized as JSON (`{"unit":"week","interval":2}`) or as a
//! constrained English pattern (`every 2 weeks`, `every monday 09:00`).
//! Parsing tries JSON first and falls back to the pattern form; anything
//! unparseable means "no recurrence", never an error.
//!
//! The engine is a pure function over (previous status, next status, rule,
//! reference time): it fires only on a transition into Done, and produces
//! the next incarnation's field values. Writing them back is entirely the
//! host store's business.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TaskStatus;

/// Upper bound on month-stepping iterations, to keep malformed rules from
/// looping forever.
const MONTH_STEP_GUARD: u32 = 1200;

/// Recurrence stepping unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurUnit {
    Day,
    Week,
    Month,
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub unit: RecurUnit,

    /// Step width in units; always at least 1.
    pub interval: u32,

    /// Anchored weekday for week rules ("every monday").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,

    /// Fixed time of day, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,

    /// Stop after this many occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,

    /// Stop once the next date would pass this point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,

    /// How many times this task has already occurred; starts at 1.
    pub occurrence: u32,
}

impl RecurrenceRule {
    /// A bare rule with the given unit and interval.
    pub fn new(unit: RecurUnit, interval: u32) -> Self {
        Self {
            unit,
            interval: interval.max(1),
            weekday: None,
            hour: None,
            minute: None,
            max_count: None,
            end_at: None,
            occurrence: 1,
        }
    }
}

/// Field values for the next incarnation of a recurring task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextValues {
    /// Reset status for the new occurrence.
    pub status: TaskStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Occurrence counter for the new incarnation.
    pub occurrence: u32,
}

/// Parse a raw rule string, JSON first, then the English pattern form.
/// Returns None for anything unparseable.
pub fn parse_rule(raw: &str) -> Option<RecurrenceRule> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => parse_json_rule(&value),
            Err(err) => {
                tracing::debug!(error = %err, "recurrence rule is not valid JSON");
                None
            }
        };
    }
    parse_pattern(trimmed)
}

fn parse_json_rule(value: &Value) -> Option<RecurrenceRule> {
    let obj = value.as_object()?;

    let unit_raw = obj
        .get("unit")
        .or_else(|| obj.get("frequency"))
        .and_then(Value::as_str)?;
    let unit = parse_unit(unit_raw)?;

    let interval = obj
        .get("interval")
        .or_else(|| obj.get("every"))
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .clamp(1, 3650) as u32;

    let weekday = match obj.get("weekday") {
        Some(Value::String(s)) => parse_weekday(s),
        // JS-style numbering: 0 = Sunday through 6 = Saturday.
        Some(Value::Number(n)) => n.as_u64().and_then(weekday_from_js_index),
        _ => None,
    };

    let hour = obj.get("hour").and_then(Value::as_u64).map(|h| h.min(23) as u32);
    let minute = obj
        .get("minute")
        .and_then(Value::as_u64)
        .map(|m| m.min(59) as u32);

    let max_count = obj
        .get("maxCount")
        .or_else(|| obj.get("max_count"))
        .or_else(|| obj.get("count"))
        .and_then(Value::as_u64)
        .map(|c| c.max(1) as u32);

    let end_at = obj
        .get("endAt")
        .or_else(|| obj.get("end_at"))
        .or_else(|| obj.get("until"))
        .and_then(parse_datetime_value);

    let occurrence = obj
        .get("occurrence")
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .max(1) as u32;

    Some(RecurrenceRule {
        unit,
        interval,
        weekday,
        hour,
        minute,
        max_count,
        end_at,
        occurrence,
    })
}

/// Constrained English patterns: `daily`, `weekly`, `monthly`,
/// `every [N] day(s)|week(s)|month(s)`, `every <weekday> [HH:MM]`,
/// `every N weeks [on] <weekday> [at] [HH:MM]`.
fn parse_pattern(raw: &str) -> Option<RecurrenceRule> {
    let lower = raw.to_lowercase();
    let mut interval: Option<u32> = None;
    let mut unit: Option<RecurUnit> = None;
    let mut weekday: Option<Weekday> = None;
    let mut time: Option<(u32, u32)> = None;

    for token in lower.split_whitespace() {
        match token {
            "every" | "on" | "at" => continue,
            "daily" => unit = Some(RecurUnit::Day),
            "weekly" => unit = Some(RecurUnit::Week),
            "monthly" => unit = Some(RecurUnit::Month),
            _ => {
                if let Some(u) = parse_unit(token) {
                    unit = Some(u);
                } else if let Some(wd) = parse_weekday(token) {
                    weekday = Some(wd);
                } else if let Ok(n) = token.parse::<u32>() {
                    interval = Some(n.clamp(1, 3650));
                } else if let Some(t) = parse_clock(token) {
                    time = Some(t);
                } else {
                    return None;
                }
            }
        }
    }

    // "every monday" implies a weekly rule.
    let unit = match (unit, weekday) {
        (Some(u), _) => u,
        (None, Some(_)) => RecurUnit::Week,
        (None, None) => return None,
    };

    let mut rule = RecurrenceRule::new(unit, interval.unwrap_or(1));
    rule.weekday = weekday;
    if let Some((h, m)) = time {
        rule.hour = Some(h);
        rule.minute = Some(m);
    }
    Some(rule)
}

fn parse_unit(token: &str) -> Option<RecurUnit> {
    match token {
        "day" | "days" | "daily" => Some(RecurUnit::Day),
        "week" | "weeks" | "weekly" => Some(RecurUnit::Week),
        "month" | "months" | "monthly" => Some(RecurUnit::Month),
        _ => None,
    }
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_from_js_index(index: u64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn parse_clock(token: &str) -> Option<(u32, u32)> {
    let (h, m) = token.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn parse_datetime_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Compute the next incarnation of a recurring task, or None when the rule
/// does not fire.
///
/// Fires only on a transition from a non-terminal status into Done; a task
/// already Done moving to Done again does not re-trigger. Termination by
/// `max_count` is checked before any date math, termination by `end_at`
/// after.
pub fn next_recurrence(
    previous_status: TaskStatus,
    next_status: TaskStatus,
    rule: &RecurrenceRule,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<NextValues> {
    if previous_status == TaskStatus::Done || next_status != TaskStatus::Done {
        return None;
    }
    if let Some(max_count) = rule.max_count {
        if rule.occurrence >= max_count {
            return None;
        }
    }

    let mut next_start = match start_time {
        Some(anchor) => Some(advance(anchor, rule, now)?),
        None => None,
    };
    let mut next_end = match end_time {
        Some(anchor) => Some(advance(anchor, rule, now)?),
        None => None,
    };

    // With no usable anchor at all, the very next occurrence hangs off now.
    if next_start.is_none() && next_end.is_none() {
        next_end = Some(advance(now, rule, now)?);
        next_start = None;
    }

    if let Some(end_at) = rule.end_at {
        let primary = next_end.or(next_start)?;
        if primary > end_at {
            return None;
        }
    }

    Some(NextValues {
        status: TaskStatus::Todo,
        start_time: next_start,
        end_time: next_end,
        occurrence: rule.occurrence.saturating_add(1),
    })
}

/// Advance one anchor date to the first grid point strictly after `now`,
/// always at least one step past the anchor.
fn advance(anchor: DateTime<Utc>, rule: &RecurrenceRule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let interval = rule.interval.max(1);
    match rule.unit {
        RecurUnit::Week if rule.weekday.is_some() => {
            Some(advance_to_weekday(anchor, rule, interval, now))
        }
        RecurUnit::Day | RecurUnit::Week => {
            let step_days = match rule.unit {
                RecurUnit::Day => interval as i64,
                _ => interval as i64 * 7,
            };
            Some(advance_by_days(anchor, rule, step_days, now))
        }
        RecurUnit::Month => advance_by_months(anchor, rule, interval, now),
    }
}

fn advance_by_days(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    step_days: i64,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let step = Duration::days(step_days);
    let mut candidate = apply_time(anchor + step, rule);
    if candidate <= now {
        // Jump whole steps instead of looping through a long backlog.
        let behind = (now - candidate).num_milliseconds();
        let step_ms = step.num_milliseconds();
        let jumps = behind / step_ms + 1;
        candidate += Duration::milliseconds(jumps * step_ms);
        while candidate <= now {
            candidate += step;
        }
    }
    candidate
}

fn advance_to_weekday(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    interval: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let weekday = rule.weekday.expect("caller checked weekday");
    let reference = if anchor > now { anchor } else { now };

    // Land on the wanted weekday at the wanted time, strictly after the
    // reference, then keep stepping whole intervals if needed.
    let base = apply_time(with_date_time_of(reference, anchor, rule), rule);
    let ahead = (weekday.num_days_from_monday() + 7
        - reference.weekday().num_days_from_monday())
        % 7;
    let mut candidate = base + Duration::days(ahead as i64);
    if candidate <= reference {
        candidate += Duration::days(7);
    }
    let step = Duration::days(interval as i64 * 7);
    while candidate <= now {
        candidate += step;
    }
    candidate
}

fn advance_by_months(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    interval: u32,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    // The original day-of-month is preserved across clamped steps, so a
    // rule anchored on the 31st lands on the 31st again whenever the month
    // allows it.
    let preserved_day = anchor.day();
    let mut candidate = add_months(apply_time(anchor, rule), interval, preserved_day)?;
    let mut guard = 0;
    while candidate <= now {
        candidate = add_months(candidate, interval, preserved_day)?;
        guard += 1;
        if guard > MONTH_STEP_GUARD {
            tracing::debug!(anchor = %anchor, "month recurrence exceeded step guard");
            return None;
        }
    }
    Some(candidate)
}

/// Add `months` to a date, clamping the preserved day-of-month to the
/// target month's length.
fn add_months(value: DateTime<Utc>, months: u32, preserved_day: u32) -> Option<DateTime<Utc>> {
    let naive = value.naive_utc();
    let mut year = naive.year();
    let mut month = naive.month() as i32 + months as i32;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    let month = month as u32;
    let day = preserved_day.clamp(1, days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let next = date.and_hms_opt(naive.hour(), naive.minute(), naive.second())?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(next, Utc))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    for day in (28..=31).rev() {
        if NaiveDate::from_ymd_opt(year, month, day).is_some() {
            return day;
        }
    }
    28
}

/// Apply the rule's fixed time of day, when configured.
fn apply_time(value: DateTime<Utc>, rule: &RecurrenceRule) -> DateTime<Utc> {
    if rule.hour.is_none() && rule.minute.is_none() {
        return value;
    }
    let hour = rule.hour.unwrap_or(0).min(23);
    let minute = rule.minute.unwrap_or(0).min(59);
    value
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(value)
}

/// Take the date from `reference` but the time-of-day from `anchor`, unless
/// the rule pins its own time.
fn with_date_time_of(
    reference: DateTime<Utc>,
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
) -> DateTime<Utc> {
    if rule.hour.is_some() || rule.minute.is_some() {
        return reference;
    }
    reference
        .date_naive()
        .and_hms_opt(anchor.hour(), anchor.minute(), anchor.second())
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_json_rule() {
        let rule = parse_rule(r#"{"unit":"week","interval":2,"maxCount":4,"occurrence":2}"#)
            .expect("rule should parse");
        assert_eq!(rule.unit, RecurUnit::Week);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.max_count, Some(4));
        assert_eq!(rule.occurrence, 2);
    }

    #[test]
    fn test_parse_json_weekday_and_time() {
        let rule = parse_rule(r#"{"unit":"week","weekday":"mon","hour":9,"minute":0}"#).unwrap();
        assert_eq!(rule.weekday, Some(Weekday::Mon));
        assert_eq!(rule.hour, Some(9));
        assert_eq!(rule.minute, Some(0));
    }

    #[test]
    fn test_parse_json_numeric_weekday_is_js_style() {
        let rule = parse_rule(r#"{"unit":"week","weekday":0}"#).unwrap();
        assert_eq!(rule.weekday, Some(Weekday::Sun));
        let rule = parse_rule(r#"{"unit":"week","weekday":1}"#).unwrap();
        assert_eq!(rule.weekday, Some(Weekday::Mon));
    }

    #[test]
    fn test_parse_json_end_at_rfc3339() {
        let rule = parse_rule(r#"{"unit":"day","endAt":"2026-06-01T00:00:00Z"}"#).unwrap();
        assert_eq!(rule.end_at, Some(ts(2026, 6, 1, 0, 0)));
    }

    #[test]
    fn test_parse_pattern_every_n_weeks() {
        let rule = parse_rule("every 2 weeks").unwrap();
        assert_eq!(rule.unit, RecurUnit::Week);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.weekday, None);
    }

    #[test]
    fn test_parse_pattern_weekday_with_time() {
        let rule = parse_rule("every Monday 09:00").unwrap();
        assert_eq!(rule.unit, RecurUnit::Week);
        assert_eq!(rule.weekday, Some(Weekday::Mon));
        assert_eq!(rule.hour, Some(9));
        assert_eq!(rule.minute, Some(0));
    }

    #[test]
    fn test_parse_pattern_single_words() {
        assert_eq!(parse_rule("daily").unwrap().unit, RecurUnit::Day);
        assert_eq!(parse_rule("weekly").unwrap().unit, RecurUnit::Week);
        assert_eq!(parse_rule("every month").unwrap().unit, RecurUnit::Month);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_rule("").is_none());
        assert!(parse_rule("whenever I feel like it").is_none());
        assert!(parse_rule(r#"{"unit":"fortnight"}"#).is_none());
        assert!(parse_rule("{not json").is_none());
    }

    #[test]
    fn test_parse_clamps_zero_interval() {
        let rule = parse_rule(r#"{"unit":"day","interval":0}"#).unwrap();
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn test_fires_only_on_transition_into_done() {
        let rule = RecurrenceRule::new(RecurUnit::Day, 1);
        let now = ts(2026, 3, 2, 12, 0);
        let anchor = Some(ts(2026, 3, 1, 9, 0));

        assert!(next_recurrence(TaskStatus::Todo, TaskStatus::Done, &rule, None, anchor, now).is_some());
        assert!(next_recurrence(TaskStatus::Done, TaskStatus::Done, &rule, None, anchor, now).is_none());
        assert!(next_recurrence(TaskStatus::Todo, TaskStatus::Doing, &rule, None, anchor, now).is_none());
    }

    #[test]
    fn test_max_count_termination() {
        let mut rule = RecurrenceRule::new(RecurUnit::Day, 1);
        rule.max_count = Some(3);
        rule.occurrence = 3;
        let now = ts(2026, 3, 2, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 3, 1, 9, 0)),
            now,
        );
        assert!(next.is_none());

        rule.occurrence = 2;
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 3, 1, 9, 0)),
            now,
        )
        .unwrap();
        assert_eq!(next.occurrence, 3);
    }

    #[test]
    fn test_end_at_termination() {
        let mut rule = RecurrenceRule::new(RecurUnit::Day, 1);
        rule.end_at = Some(ts(2026, 3, 2, 0, 0));
        let now = ts(2026, 3, 2, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 3, 1, 9, 0)),
            now,
        );
        assert!(next.is_none());
    }

    #[test]
    fn test_weekly_monday_lands_strictly_after_now() {
        // Anchor Monday Jan 5 2026 09:00, long past; now Wednesday Mar 4.
        let mut rule = RecurrenceRule::new(RecurUnit::Week, 1);
        rule.weekday = Some(Weekday::Mon);
        rule.hour = Some(9);
        rule.minute = Some(0);
        let now = ts(2026, 3, 4, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 1, 5, 9, 0)),
            now,
        )
        .unwrap();
        let end = next.end_time.unwrap();
        assert!(end > now);
        assert_eq!(end, ts(2026, 3, 9, 9, 0));
        assert_eq!(end.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_weekly_monday_now_is_monday_before_time() {
        // Monday 08:00 now, rule time 09:00: same day still qualifies.
        let mut rule = RecurrenceRule::new(RecurUnit::Week, 1);
        rule.weekday = Some(Weekday::Mon);
        rule.hour = Some(9);
        rule.minute = Some(0);
        let now = ts(2026, 3, 9, 8, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 1, 5, 9, 0)),
            now,
        )
        .unwrap();
        assert_eq!(next.end_time.unwrap(), ts(2026, 3, 9, 9, 0));
    }

    #[test]
    fn test_day_unit_catches_up_on_grid() {
        let rule = RecurrenceRule::new(RecurUnit::Day, 3);
        let anchor = ts(2026, 2, 20, 8, 0);
        let now = ts(2026, 3, 2, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(anchor),
            now,
        )
        .unwrap();
        let end = next.end_time.unwrap();
        assert!(end > now);
        assert_eq!((end - anchor).num_hours() % 72, 0);
        assert_eq!(end, ts(2026, 3, 4, 8, 0));
    }

    #[test]
    fn test_future_anchor_steps_once() {
        let rule = RecurrenceRule::new(RecurUnit::Week, 1);
        let anchor = ts(2026, 3, 6, 10, 0);
        let now = ts(2026, 3, 2, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(anchor),
            now,
        )
        .unwrap();
        assert_eq!(next.end_time.unwrap(), ts(2026, 3, 13, 10, 0));
    }

    #[test]
    fn test_month_end_clamps() {
        // Jan 31 + 1 month = Feb 28 in a non-leap year, not Mar 3.
        let rule = RecurrenceRule::new(RecurUnit::Month, 1);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 1, 31, 10, 0)),
            ts(2026, 2, 1, 0, 0),
        )
        .unwrap();
        assert_eq!(next.end_time.unwrap(), ts(2026, 2, 28, 10, 0));
    }

    #[test]
    fn test_month_end_clamps_leap_year() {
        let rule = RecurrenceRule::new(RecurUnit::Month, 1);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2028, 1, 31, 10, 0)),
            ts(2028, 2, 1, 0, 0),
        )
        .unwrap();
        assert_eq!(next.end_time.unwrap(), ts(2028, 2, 29, 10, 0));
    }

    #[test]
    fn test_month_preserves_original_day_after_clamp() {
        // Stepping past February recovers the 31st in March.
        let rule = RecurrenceRule::new(RecurUnit::Month, 1);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            None,
            Some(ts(2026, 1, 31, 10, 0)),
            ts(2026, 3, 1, 0, 0),
        )
        .unwrap();
        assert_eq!(next.end_time.unwrap(), ts(2026, 3, 31, 10, 0));
    }

    #[test]
    fn test_no_dates_anchors_on_now() {
        let rule = RecurrenceRule::new(RecurUnit::Day, 2);
        let now = ts(2026, 3, 2, 12, 0);
        let next =
            next_recurrence(TaskStatus::Doing, TaskStatus::Done, &rule, None, None, now).unwrap();
        assert_eq!(next.start_time, None);
        assert_eq!(next.end_time.unwrap(), ts(2026, 3, 4, 12, 0));
        assert_eq!(next.occurrence, 2);
        assert_eq!(next.status, TaskStatus::Todo);
    }

    #[test]
    fn test_both_start_and_end_shift() {
        let rule = RecurrenceRule::new(RecurUnit::Week, 1);
        let now = ts(2026, 3, 2, 12, 0);
        let next = next_recurrence(
            TaskStatus::Todo,
            TaskStatus::Done,
            &rule,
            Some(ts(2026, 3, 1, 9, 0)),
            Some(ts(2026, 3, 2, 17, 0)),
            now,
        )
        .unwrap();
        assert_eq!(next.start_time.unwrap(), ts(2026, 3, 8, 9, 0));
        assert_eq!(next.end_time.unwrap(), ts(2026, 3, 9, 17, 0));
    }
}
