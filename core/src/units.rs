//! Unit-tagged quantities and `"min - max"` range parsing.
//!
//! The catalog reports weights, heights and life spans as free text such as
//! `"3 - 6"`. `parse_range` turns that text into a typed `UnitRange` and
//! yields `None` for anything it cannot read. Parsing is a pure function of
//! the input string; nothing is cached on the records.

use std::fmt;

const DELIMITER: char = '-';

macro_rules! unit {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
        pub struct $name(pub f64);

        impl $name {
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> f64 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $suffix)
            }
        }
    };
}

unit!(
    /// Metric mass.
    Kilograms,
    "kg"
);
unit!(
    /// Imperial mass.
    Pounds,
    "lb"
);
unit!(
    /// Metric length.
    Centimeters,
    "cm"
);
unit!(
    /// Imperial length.
    Inches,
    "in"
);
unit!(Years, "years");

/// An inclusive minimum/maximum pair in a single unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRange<U> {
    pub minimum: U,
    pub maximum: U,
}

/// Parse `"min - max"` into a range of `U`.
///
/// The minimum is read from the text before the first `-` and the maximum
/// from the text after the last one, so a lone number yields a range where
/// both ends are equal. Returns `None` unless both ends are finite numbers.
/// The ends are not reordered.
pub fn parse_range<U: From<f64>>(raw: &str) -> Option<UnitRange<U>> {
    let mut parts = raw.split(DELIMITER);
    let first = parts.next()?;
    let last = parts.last().unwrap_or(first);
    Some(UnitRange {
        minimum: parse_number(first)?.into(),
        maximum: parse_number(last)?.into(),
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn spaced_range_reads_back_both_ends(a in 0.0f64..1.0e6, span in 0.0f64..1.0e6) {
            let b = a + span;
            let range: UnitRange<Kilograms> = parse_range(&format!("{a} - {b}")).expect("numeric range");
            prop_assert_eq!(range.minimum, Kilograms(a));
            prop_assert_eq!(range.maximum, Kilograms(b));
        }

        #[test]
        fn unspaced_integer_range_reads_back(a in 0u32..10_000, b in 0u32..10_000) {
            let range: UnitRange<Pounds> = parse_range(&format!("{a}-{b}")).expect("numeric range");
            prop_assert_eq!(range.minimum.value(), f64::from(a));
            prop_assert_eq!(range.maximum.value(), f64::from(b));
        }

        #[test]
        fn text_without_digits_never_parses(raw in "[a-zA-Z -]{0,24}") {
            prop_assert!(parse_range::<Years>(&raw).is_none());
        }

        #[test]
        fn parsing_never_panics(raw in "\\PC{0,32}") {
            let first = parse_range::<Inches>(&raw);
            prop_assert_eq!(first, parse_range::<Inches>(&raw));
        }
    }
}
