//! Serde helpers for loosely typed backend and store values.

use serde::{Deserialize, Deserializer};

/// Decode `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RSSI in dBm, accepting integers and floats. Floats are rounded.
pub(crate) fn signal_dbm<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(|dbm| dbm.round() as i32))
}
