//! Simplified SM-2 scheduling and study streaks.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::store::WordEntry;

pub const DEFAULT_EASE: f64 = 2.5;
pub const MIN_EASE: f64 = 1.3;
/// Lowest quality that counts as a successful recall.
pub const PASSING_QUALITY: u8 = 3;
pub const MAX_QUALITY: u8 = 5;

/// Apply one review of quality `q` (0 to 5) at `now`.
pub fn review(entry: &mut WordEntry, quality: u8, now: DateTime<Utc>) {
    let q = quality.min(MAX_QUALITY);
    if q >= PASSING_QUALITY {
        entry.interval = match entry.repetitions {
            0 => 1,
            1 => 6,
            _ => (f64::from(entry.interval) * entry.ease_factor).floor() as u32,
        };
        entry.repetitions += 1;
        let miss = f64::from(MAX_QUALITY - q);
        entry.ease_factor = (entry.ease_factor + 0.1 - miss * (0.08 + miss * 0.02)).max(MIN_EASE);
    } else {
        entry.repetitions = 0;
        entry.interval = 1;
    }
    entry.next_review = now + Duration::days(i64::from(entry.interval));
}

/// Streak after studying on `today`, given the previous study date.
pub fn next_streak(streak: u32, last: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last {
        Some(day) if day == today => streak,
        Some(day) if day.succ_opt() == Some(today) => streak + 1,
        _ => 1,
    }
}
