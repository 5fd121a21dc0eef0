//! Serde helper for clock times on the wire.
//!
//! Slot times travel as zero-padded `HH:MM` strings, so lexicographic order
//! on the wire matches chronological order in the database.

use serde::{self, Deserialize, Deserializer, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Time;

pub const HH_MM: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

pub fn serialize<S>(value: &Time, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = value.format(HH_MM).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Time::parse(&raw, HH_MM).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn formats_zero_padded() {
        let formatted = time!(9:05).format(HH_MM).unwrap();
        assert_eq!(formatted, "09:05");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Time::parse("9am", HH_MM).is_err());
    }
}
