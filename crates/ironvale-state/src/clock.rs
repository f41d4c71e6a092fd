//! Wall-clock helper for ground-item timers.

/// Current unix time in seconds.
///
/// Millisecond resolution; drop timers are second-scale so the f64
/// precision loss past 2^53 milliseconds is irrelevant.
#[allow(clippy::cast_precision_loss)]
pub fn unix_now() -> f64 {
    (chrono::Utc::now().timestamp_millis() as f64) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_now_is_recent() {
        let now = unix_now();
        // Sometime after 2020 and before 2100.
        assert!(now > 1_577_836_800.0);
        assert!(now < 4_102_444_800.0);
    }
}
