//! Conversion between canonical world numbers and their displayed form.
//!
//! Worlds are shown with a `3` or `4` prefix (world 32 is shown as `332`,
//! world 116 as `416`) while ping hosts and category tables use the bare
//! number. Only worlds below 200 survive the round trip: the leading digit
//! of a three digit world is replaced by `4`.

use super::{WorldError, WorldId};

/// Format a canonical world as it is displayed in game (`5` -> `"305"`).
pub fn to_display(world: WorldId) -> String {
    let n = world.0;
    if n < 10 {
        format!("30{}", n)
    } else if n < 100 {
        format!("3{}", n)
    } else {
        format!("4{:02}", n % 100)
    }
}

/// Undo [`to_display`] (`"416"` -> `116`).
///
/// A `30` prefix keeps only the third digit, whatever follows it
/// (`"3012"` -> `1`). Strings that match neither display pattern are read
/// as a bare world number. Anything that is not made of decimal digits is
/// rejected.
pub fn to_canonical(display: &str) -> Result<WorldId, WorldError> {
    if !is_digits(display) {
        return Err(WorldError::InvalidFormat(display.to_string()));
    }

    let digits = if let Some(rest) = display.strip_prefix('4') {
        format!("1{}", rest)
    } else if display.len() >= 3 && display.starts_with("30") {
        display[2..3].to_string()
    } else if display.len() == 3 && display.starts_with('3') {
        display[1..].to_string()
    } else {
        display.to_string()
    };

    digits
        .parse::<u16>()
        .map(WorldId)
        .map_err(|_| WorldError::InvalidFormat(display.to_string()))
}

/// Whether user input is in display form rather than a bare world number.
pub(crate) fn looks_displayed(raw: &str) -> bool {
    raw.len() == 3 && (raw.starts_with('3') || raw.starts_with('4'))
}

pub(crate) fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_branches() {
        assert_eq!(to_display(WorldId(5)), "305");
        assert_eq!(to_display(WorldId(32)), "332");
        assert_eq!(to_display(WorldId(116)), "416");
        assert_eq!(to_display(WorldId(0)), "300");
        assert_eq!(to_display(WorldId(10)), "310");
        assert_eq!(to_display(WorldId(100)), "400");
    }

    #[test]
    fn test_round_trip() {
        for n in 0..200 {
            let world = WorldId(n);
            assert_eq!(to_canonical(&to_display(world)).unwrap(), world, "world {}", n);
        }
    }

    #[test]
    fn test_worlds_above_199_collide() {
        // Only the last two digits survive formatting.
        assert_eq!(to_display(WorldId(216)), to_display(WorldId(116)));
        assert_eq!(to_canonical(&to_display(WorldId(216))).unwrap(), WorldId(116));
    }

    #[test]
    fn test_canonical_patterns() {
        assert_eq!(to_canonical("332").unwrap(), WorldId(32));
        assert_eq!(to_canonical("309").unwrap(), WorldId(9));
        assert_eq!(to_canonical("422").unwrap(), WorldId(122));
        assert_eq!(to_canonical("32").unwrap(), WorldId(32));
        assert_eq!(to_canonical("116").unwrap(), WorldId(116));
        assert_eq!(to_canonical("3123").unwrap(), WorldId(3123));
        assert_eq!(to_canonical("30").unwrap(), WorldId(30));
    }

    #[test]
    fn test_thirty_prefix_keeps_third_digit() {
        assert_eq!(to_canonical("3012").unwrap(), WorldId(1));
        assert_eq!(to_canonical("30999").unwrap(), WorldId(9));
    }

    #[test]
    fn test_canonical_rejects_non_digits() {
        for raw in ["", "w332", "3 2", "-5", "4a"] {
            assert!(
                matches!(to_canonical(raw), Err(WorldError::InvalidFormat(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_canonical_rejects_overflow() {
        assert!(matches!(
            to_canonical("99999999"),
            Err(WorldError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_looks_displayed() {
        assert!(looks_displayed("332"));
        assert!(looks_displayed("416"));
        assert!(!looks_displayed("32"));
        assert!(!looks_displayed("116"));
        assert!(!looks_displayed("3123"));
    }
}
