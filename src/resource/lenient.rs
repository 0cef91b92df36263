//! Deserializers that accept numbers and booleans in their string forms,
//! e.g. `"cook_time": "15"` or `"is_publish": "True"`.

use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw<T> {
    Value(T),
    Text(String),
}

pub fn number<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Raw::<T>::deserialize(d)? {
        Raw::Value(v) => Ok(v),
        Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

pub fn boolean<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Raw::<bool>::deserialize(d)? {
        Raw::Value(v) => Ok(v),
        Raw::Text(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Raw::Text(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        Raw::Text(s) => Err(de::Error::custom(format!("expected a boolean, got {s:?}"))),
    }
}
