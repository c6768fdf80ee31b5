/// Minimum number of timestamped events needed for a meaningful estimate.
const MIN_TIMED_EVENTS: usize = 5;

/// Sessions at or below this duration are too short to assess pacing.
const MIN_ASSESSABLE_DURATION_SECONDS: f64 = 10.0;

/// Pacing estimate over one session's ordered kill elapsed times.
///
/// Compares second-half to first-half kill counts around the session's
/// midpoint: ~100 means even pacing, below 100 means kill-rate decay
/// (fatigue), above 100 means acceleration. Returns `0.0` whenever the
/// session is too short or too sparse to assess.
pub fn stamina_index(kill_times: &[f64]) -> f64 {
    if kill_times.len() < MIN_TIMED_EVENTS {
        return 0.0;
    }

    let start = kill_times[0];
    let end = kill_times[kill_times.len() - 1];
    let duration = end - start;
    if !duration.is_finite() || duration <= MIN_ASSESSABLE_DURATION_SECONDS {
        return 0.0;
    }

    let midpoint = start + duration / 2.0;
    let first_half_count = kill_times.iter().filter(|time| **time <= midpoint).count();
    let second_half_count = kill_times.len() - first_half_count;

    if first_half_count == 0 {
        return 0.0;
    }

    100.0 * second_half_count as f64 / first_half_count as f64
}

#[cfg(test)]
mod tests {
    use super::stamina_index;

    #[test]
    fn splits_events_around_session_midpoint() {
        let kill_times: Vec<f64> = (0..=10).map(|step| (step * 2) as f64).collect();

        // 11 events over 20 seconds; 6 at or before the 10 s midpoint,
        // 5 after it.
        let index = stamina_index(&kill_times);
        assert!((index - 100.0 * 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn returns_zero_below_minimum_event_count() {
        assert_eq!(stamina_index(&[0.0, 5.0, 11.0, 15.0]), 0.0);
        assert_eq!(stamina_index(&[]), 0.0);
    }

    #[test]
    fn returns_zero_for_sessions_of_ten_seconds_or_less() {
        assert_eq!(stamina_index(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]), 0.0);
    }

    #[test]
    fn even_pacing_scores_one_hundred() {
        let kill_times = [0.0, 4.0, 8.0, 12.0, 16.0, 20.0];
        assert_eq!(stamina_index(&kill_times), 100.0);
    }

    #[test]
    fn accelerating_sessions_score_above_one_hundred() {
        let kill_times = [0.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        assert!(stamina_index(&kill_times) > 100.0);
    }
}
