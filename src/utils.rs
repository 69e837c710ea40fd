use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders a millisecond duration as its non-zero `d h m s` components,
/// e.g. `90061000` becomes `"1d 1h 1m 1s"`. Sub-second values render empty.
pub fn format_milliseconds(value: u64) -> String {
    let seconds = value / 1000;
    let (days, seconds) = (seconds / 86_400, seconds % 86_400);
    let (hours, seconds) = (seconds / 3_600, seconds % 3_600);
    let (minutes, seconds) = (seconds / 60, seconds % 60);

    [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, suffix)| format!("{amount}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rounds to two decimal places from the exact binary value, exact ties
/// going to even: `1.115` gives `1.11` and `0.125` gives `0.12`.
pub fn round_to_cents(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    format!("{value:.2}").parse().ok()
}

/// Shortest round-trip form; whole numbers keep a trailing `.0`.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let total_millis = elapsed.as_millis();
    let (minutes, millis) = (total_millis / 60_000, total_millis % 60_000);
    format!("{}m {:.3}s", minutes, millis as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn formats_documented_durations() {
        assert_eq!(format_milliseconds(0), "");
        assert_eq!(format_milliseconds(999), "");
        assert_eq!(format_milliseconds(1_000), "1s");
        assert_eq!(format_milliseconds(61_000), "1m 1s");
        assert_eq!(format_milliseconds(3_661_000), "1h 1m 1s");
        assert_eq!(format_milliseconds(90_061_000), "1d 1h 1m 1s");
    }

    #[test]
    fn zero_components_are_omitted() {
        assert_eq!(format_milliseconds(3_600_000), "1h");
        assert_eq!(format_milliseconds(86_400_000 + 5_000), "1d 5s");
        assert_eq!(format_milliseconds(120_000), "2m");
        assert!(!format_milliseconds(86_400_000 + 60_000).contains("0h"));
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_to_cents(3.14159), Some(3.14));
        assert_eq!(round_to_cents(2.005_1), Some(2.01));
        assert_eq!(round_to_cents(1.115), Some(1.11));
        assert_eq!(round_to_cents(0.125), Some(0.12));
        assert_eq!(round_to_cents(0.375), Some(0.38));
        assert_eq!(round_to_cents(12.0), Some(12.0));
        assert_eq!(round_to_cents(f64::NAN), None);
        assert_eq!(round_to_cents(f64::INFINITY), None);
    }

    #[test]
    fn decimals_keep_a_fraction() {
        assert_eq!(format_decimal(12.0), "12.0");
        assert_eq!(format_decimal(4.57), "4.57");
        assert_eq!(format_decimal(0.1), "0.1");
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_millis(75_250)), "1m 15.250s");
        assert_eq!(format_elapsed(Duration::from_millis(400)), "0m 0.400s");
    }
}
