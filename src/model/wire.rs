use serde::{Deserialize, Deserializer};

/// Deserialize `T`, mapping an explicit JSON `null` to `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pixel count from a JSON number: rounded to the nearest integer, `None` keeps `default`.
pub(crate) fn pixels(field: &str, value: Option<f64>, default: u32) -> Result<u32, String> {
    let Some(v) = value else {
        return Ok(default);
    };
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{field} must be a non-negative number, got {v}"));
    }
    let rounded = v.round();
    if rounded > f64::from(u32::MAX) {
        return Err(format!("{field} is too large: {v}"));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/model/wire.rs"]
mod tests;
