//! Daily video limit evaluation
//!
//! Pure function of (today's stats, configured ceilings, candidate duration).
//! No I/O and no shared state, so the controller can call it while holding
//! the session lock and tests can cover every boundary directly.

use crate::models::VideoStats;

/// Verdict of a limit check.
///
/// `is_last` is meaningful only when `allowed` is true; `reason` only when
/// it is false.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitVerdict {
    pub allowed: bool,
    pub is_last: bool,
    pub reason: String,
}

impl LimitVerdict {
    fn allow(is_last: bool) -> Self {
        Self {
            allowed: true,
            is_last,
            reason: String::new(),
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            is_last: false,
            reason,
        }
    }
}

/// Decide whether another video may play today and whether it would be the
/// last one allowed.
///
/// Deny order is fixed: count ceiling first, then minutes ceiling. When
/// allowed, the candidate is the last if accepting it reaches the count
/// ceiling or its projected minutes reach the minutes ceiling.
pub fn check_video_limit(
    stats: VideoStats,
    max_count: u32,
    max_minutes: u32,
    video_duration_s: i64,
) -> LimitVerdict {
    if stats.count >= max_count {
        return LimitVerdict::deny(format!("Video limit reached ({} today)", max_count));
    }

    if stats.total_minutes >= max_minutes as f64 {
        return LimitVerdict::deny(format!(
            "Video time limit reached ({} min today)",
            max_minutes
        ));
    }

    let projected_minutes = stats.total_minutes + video_duration_s as f64 / 60.0;

    let last_by_count = stats.count + 1 >= max_count;
    let last_by_time = projected_minutes >= max_minutes as f64;

    LimitVerdict::allow(last_by_count || last_by_time)
}
