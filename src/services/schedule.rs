//! Recurring-meeting occurrence generator.
//!
//! Pure date arithmetic; the caller injects `now`, so every rule here is
//! unit-testable against a fixed clock.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Frequency;

/// Upper bound on how many meetings a single generate call may create.
pub const MAX_GENERATED_MEETINGS: u32 = 52;

/// Computes `count` future occurrence timestamps for a recurring schedule.
///
/// The first occurrence is the next occurrence of `day_of_week` (0 = Sunday
/// through 6 = Saturday) at `time` ("HH:MM", UTC). Today's occurrence counts
/// only if it is strictly in the future; otherwise the schedule rolls
/// forward one full period. Subsequent occurrences step by the frequency's
/// period.
pub fn compute_occurrences(
    now: DateTime<Utc>,
    frequency: Frequency,
    day_of_week: u8,
    time: &str,
    count: u32,
) -> DomainResult<Vec<DateTime<Utc>>> {
    if day_of_week > 6 {
        return Err(DomainError::Validation(format!(
            "day_of_week must be between 0 and 6, got {day_of_week}"
        )));
    }
    if count == 0 || count > MAX_GENERATED_MEETINGS {
        return Err(DomainError::Validation(format!(
            "count must be between 1 and {MAX_GENERATED_MEETINGS}, got {count}"
        )));
    }
    let time = parse_time(time)?;

    let today = now.weekday().num_days_from_sunday();
    let days_ahead = i64::from((u32::from(day_of_week) + 7 - today) % 7);
    let mut first = (now.date_naive() + Duration::days(days_ahead))
        .and_time(time)
        .and_utc();
    if first <= now {
        first += Duration::days(frequency.period_days());
    }

    Ok((0..count)
        .map(|i| first + Duration::days(frequency.period_days() * i64::from(i)))
        .collect())
}

fn parse_time(time: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| DomainError::Validation(format!("Invalid time '{time}', expected HH:MM")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn monday_9am() -> DateTime<Utc> {
        // 2024-01-01 is a Monday
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_same_day_occurrence_still_ahead_is_first() {
        let occurrences =
            compute_occurrences(monday_9am(), Frequency::Weekly, 1, "10:00", 3).unwrap();
        assert_eq!(
            occurrences,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_same_day_occurrence_already_passed_rolls_forward() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        let occurrences = compute_occurrences(now, Frequency::Weekly, 1, "10:00", 1).unwrap();
        assert_eq!(
            occurrences,
            vec![Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap()]
        );
    }

    #[test]
    fn test_exact_now_is_not_strictly_future() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let occurrences = compute_occurrences(now, Frequency::Weekly, 1, "10:00", 1).unwrap();
        assert_eq!(
            occurrences,
            vec![Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap()]
        );
    }

    #[test]
    fn test_biweekly_steps_fourteen_days() {
        let occurrences =
            compute_occurrences(monday_9am(), Frequency::Biweekly, 3, "14:30", 2).unwrap();
        assert_eq!(
            occurrences,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 3, 14, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 17, 14, 30, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let now = monday_9am();
        assert!(compute_occurrences(now, Frequency::Weekly, 7, "10:00", 1).is_err());
        assert!(compute_occurrences(now, Frequency::Weekly, 1, "25:00", 1).is_err());
        assert!(compute_occurrences(now, Frequency::Weekly, 1, "10am", 1).is_err());
        assert!(compute_occurrences(now, Frequency::Weekly, 1, "10:00", 0).is_err());
        assert!(compute_occurrences(
            now,
            Frequency::Weekly,
            1,
            "10:00",
            MAX_GENERATED_MEETINGS + 1
        )
        .is_err());
    }

    proptest! {
        #[test]
        fn prop_occurrences_are_future_spaced_and_on_day(
            day_of_week in 0u8..=6,
            hour in 0u32..24,
            minute in 0u32..60,
            count in 1u32..=12,
            weekly in any::<bool>(),
            offset_secs in 0i64..(14 * 24 * 3600),
        ) {
            let now = monday_9am() + Duration::seconds(offset_secs);
            let frequency = if weekly { Frequency::Weekly } else { Frequency::Biweekly };
            let time = format!("{hour:02}:{minute:02}");

            let occurrences =
                compute_occurrences(now, frequency, day_of_week, &time, count).unwrap();

            prop_assert_eq!(occurrences.len(), count as usize);
            prop_assert!(occurrences[0] > now);
            for window in occurrences.windows(2) {
                prop_assert_eq!(
                    window[1] - window[0],
                    Duration::days(frequency.period_days())
                );
            }
            for occurrence in &occurrences {
                prop_assert_eq!(
                    occurrence.weekday().num_days_from_sunday(),
                    u32::from(day_of_week)
                );
            }
        }
    }
}
