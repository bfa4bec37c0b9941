//! Serde helpers shared across persisted record types.

/// Serializes integer fields as decimal strings.
///
/// JSON numbers cannot hold 256-bit values without precision loss, so nonce,
/// fee, gas and value fields are written as strings and parsed back into
/// their native width. Bare numbers are still accepted on read for
/// hand-edited files.
pub mod decimal {
    use std::{fmt, marker::PhantomData, str::FromStr};

    use serde::{de, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: fmt::Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        struct DecimalVisitor<T>(PhantomData<T>);

        impl<T> de::Visitor<'_> for DecimalVisitor<T>
        where
            T: FromStr,
            T::Err: fmt::Display,
        {
            type Value = T;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(DecimalVisitor(PhantomData))
    }
}
