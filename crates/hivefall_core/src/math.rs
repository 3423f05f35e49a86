//! Fixed-point fractions for deterministic probability math.
//!
//! Drop chances, drop weights and random samples are all expressed as
//! fixed-point numbers so that a replay of the same seed produces the same
//! rolls on every platform. Floating point only appears at the
//! configuration boundary, where decimal literals from RON files are
//! converted once.

use fixed::types::I32F32;

/// Fixed-point number type for all probability math.
///
/// Uses 32 bits for the integer part and 32 bits for the fractional part.
/// Every value in `[0, 1]` is exactly representable as an `f64`, so
/// fractions survive a serialization round trip unchanged.
pub type Fixed = I32F32;

/// Map a fraction in `[0, 1)` onto an index in `0..bound`.
///
/// Out-of-range fractions are clamped so a misbehaving source can never
/// produce an out-of-bounds index. Returns 0 when `bound` is 0.
#[must_use]
pub fn scale_to_index(fraction: Fixed, bound: u32) -> u32 {
    if bound == 0 {
        return 0;
    }
    let bits = fraction.max(Fixed::ZERO).min(Fixed::ONE).to_bits() as u128;
    let scaled = (bits * u128::from(bound)) >> Fixed::FRAC_NBITS;
    (scaled as u32).min(bound - 1)
}

/// Serde support for fixed-point fractions.
///
/// Serializes as a decimal `f64` so that configuration files stay readable
/// (`food_chance: 0.35`) instead of carrying raw bit patterns.
pub mod fraction_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point fraction as a decimal number.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point fraction from a decimal number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("fraction out of range: {value}")))
    }
}

/// Serde support for `Option<Fixed>` fractions.
pub mod option_fraction_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fraction.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(|v| v.to_num::<f64>()).serialize(serializer)
    }

    /// Deserialize an optional fraction.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<f64>::deserialize(deserializer)?;
        value
            .map(|v| {
                Fixed::checked_from_num(v)
                    .ok_or_else(|| serde::de::Error::custom(format!("fraction out of range: {v}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_to_index_buckets() {
        assert_eq!(scale_to_index(Fixed::ZERO, 4), 0);
        assert_eq!(scale_to_index(Fixed::from_num(0.26), 4), 1);
        assert_eq!(scale_to_index(Fixed::from_num(0.99), 4), 3);
    }

    #[test]
    fn test_scale_to_index_clamps() {
        assert_eq!(scale_to_index(Fixed::ONE, 4), 3);
        assert_eq!(scale_to_index(Fixed::from_num(-1), 4), 0);
        assert_eq!(scale_to_index(Fixed::from_num(0.5), 0), 0);
    }

    #[test]
    fn test_scale_to_index_full_range() {
        assert_eq!(scale_to_index(Fixed::from_num(0.5), u32::MAX), u32::MAX / 2);
        assert_eq!(scale_to_index(Fixed::ONE, u32::MAX), u32::MAX - 1);
    }

    #[test]
    fn test_fraction_serde_is_readable() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "fraction_serde")]
            chance: Fixed,
        }

        let text = ron::to_string(&Wrapper {
            chance: Fixed::from_num(0.25),
        })
        .unwrap();
        assert_eq!(text, "(chance:0.25)");

        let back: Wrapper = ron::from_str("(chance: 0.5)").unwrap();
        assert_eq!(back.chance, Fixed::from_num(0.5));
    }
}
