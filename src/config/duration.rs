//! Parsing of duration strings such as `300ms`, `1.5h` or `2h45m`.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Parses a sequence of `<number><unit>` components.
///
/// A lone `0` needs no unit. Signs other than a leading `+` are rejected.
pub(crate) fn parse_duration(input: &str) -> Option<Duration> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if trimmed == "0" {
        return Some(Duration::ZERO);
    }
    if trimmed.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let (_, scale) = UNITS.iter().find(|(name, _)| *name == unit)?;
        total = total.checked_add(component_nanos(number, *scale)?)?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    let nanos = u32::try_from(total % NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, nanos))
}

fn component_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;

    // Digits past nanosecond precision of an hour do not matter.
    let frac = frac.get(..frac.len().min(18)).unwrap_or(frac);
    if !frac.is_empty() {
        let digits = u32::try_from(frac.len()).ok()?;
        let value: u128 = frac.parse().ok()?;
        nanos = nanos.checked_add(value * scale / 10u128.pow(digits))?;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Duration::ZERO)]
    #[case("300ms", Duration::from_millis(300))]
    #[case("1.5h", Duration::from_secs(5_400))]
    #[case("2h45m", Duration::from_secs(9_900))]
    #[case("1m30s", Duration::from_secs(90))]
    #[case(".5s", Duration::from_millis(500))]
    #[case("+10s", Duration::from_secs(10))]
    #[case("1µs", Duration::from_micros(1))]
    #[case("1us500ns", Duration::from_nanos(1_500))]
    #[case(" 15s ", Duration::from_secs(15))]
    fn test_parses(#[case] input: &str, #[case] expected: Duration) {
        assert_eq!(parse_duration(input), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("10")]
    #[case("-5s")]
    #[case("1h30")]
    #[case("ms")]
    #[case("1.2.3s")]
    #[case("3 days")]
    #[case("5d")]
    fn test_rejects(#[case] input: &str) {
        assert_eq!(parse_duration(input), None);
    }
}
