use std::fmt;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Seed of a piece sequence.
///
/// Games created from equal seeds draw identical pieces, so every individual of
/// a generation can be scored on the same games. Serialized as 32 lowercase hex
/// digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed(u128);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value))
    }

    pub(crate) const fn to_rng_seed(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 32 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&hex),
                &"32 hex digits",
            ));
        }
        u128::from_str_radix(&hex, 16)
            .map(Self)
            .map_err(de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        PieceSeed(rng.random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_json_is_hex() {
        let seed = PieceSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"0123456789abcdeffedcba9876543210\"");
        assert_eq!(serde_json::from_str::<PieceSeed>(&json).unwrap(), seed);
        assert_eq!(
            serde_json::to_string(&PieceSeed::from_u64(255)).unwrap(),
            "\"000000000000000000000000000000ff\""
        );
    }

    #[test]
    fn test_seed_rejects_malformed_hex() {
        for json in [
            "\"\"",
            "\"0123\"",
            "\"+0123456789abcdeffedcba987654321\"",
            "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
        ] {
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("32 hex digits"), "{json}");
        }
    }
}
