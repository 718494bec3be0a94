use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StripError, StripResult};

/// A colour given as a CSS colour string (`"white"`, `"#ddd"`, `"rgba(0,0,0,0.5)"`, ...).
///
/// Deserialization keeps strings that do not parse so the request check can report them with
/// the field they came from; see [`CssColor::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssColor {
    source: String,
    parsed: Result<Rgba8, String>,
}

impl CssColor {
    /// Parse a CSS colour string.
    pub fn parse(s: &str) -> StripResult<Self> {
        let color = Self::lenient(s);
        match &color.parsed {
            Ok(_) => Ok(color),
            Err(e) => Err(StripError::validation(format!(
                "invalid colour \"{}\": {e}",
                color.source
            ))),
        }
    }

    fn lenient(s: &str) -> Self {
        Self {
            source: s.trim().to_owned(),
            parsed: parse_css_color(s),
        }
    }

    /// Build from an already-resolved colour.
    pub fn from_rgba(rgba: Rgba8) -> Self {
        Self {
            source: format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a),
            parsed: Ok(rgba),
        }
    }

    pub(crate) fn known(source: &str, rgba: Rgba8) -> Self {
        Self {
            source: source.to_owned(),
            parsed: Ok(rgba),
        }
    }

    /// `true` when the source string is a colour this crate understands.
    pub fn is_valid(&self) -> bool {
        self.parsed.is_ok()
    }

    /// Resolved colour, or a validation error naming `field`.
    pub fn check(&self, field: &str) -> StripResult<Rgba8> {
        self.parsed.as_ref().copied().map_err(|e| {
            StripError::validation(format!("{field}: invalid colour \"{}\": {e}", self.source))
        })
    }

    /// Resolved straight RGBA8 value; transparent when the source did not parse.
    pub fn rgba(&self) -> Rgba8 {
        self.parsed.as_ref().copied().unwrap_or(Rgba8::TRANSPARENT)
    }

    /// The string this colour was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Serialize for CssColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for CssColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::lenient(&s))
    }
}

fn parse_css_color(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("colour must be non-empty".to_owned());
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(args);
    }
    if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
        return parse_hsl_args(args);
    }

    named_color(&lower).ok_or_else(|| format!("unknown colour name \"{s}\""))
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex colour must be ASCII".to_owned());
    }

    match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            Ok(Rgba8::new(r, g, b, a))
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 { hex_byte(&s[6..8])? } else { 255 };
            Ok(Rgba8::new(r, g, b, a))
        }
        _ => Err("hex colour must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

/// Split `rgb()`/`hsl()` arguments in either the comma or the space-and-slash syntax.
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_number(part: &str) -> Result<f64, String> {
    let v: f64 = part
        .parse()
        .map_err(|_| format!("invalid number \"{part}\""))?;
    if !v.is_finite() {
        return Err(format!("number \"{part}\" must be finite"));
    }
    Ok(v)
}

/// Channel value in `0..=255`, accepting plain numbers or percentages.
fn parse_channel(part: &str) -> Result<u8, String> {
    let v = match part.strip_suffix('%') {
        Some(p) => parse_number(p)? / 100.0 * 255.0,
        None => parse_number(part)?,
    };
    Ok(v.round().clamp(0.0, 255.0) as u8)
}

/// Alpha value in `0..=1` (or percentage), mapped to `0..=255`.
fn parse_alpha(part: &str) -> Result<u8, String> {
    let v = match part.strip_suffix('%') {
        Some(p) => parse_number(p)? / 100.0,
        None => parse_number(part)?,
    };
    Ok((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_rgb_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb()/rgba() expects 3 or 4 components".to_owned());
    }
    let r = parse_channel(parts[0])?;
    let g = parse_channel(parts[1])?;
    let b = parse_channel(parts[2])?;
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 255,
    };
    Ok(Rgba8::new(r, g, b, a))
}

fn parse_hsl_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err("hsl()/hsla() expects 3 or 4 components".to_owned());
    }
    let h = parse_number(parts[0].trim_end_matches("deg"))?;
    let s = parse_number(parts[1].trim_end_matches('%'))? / 100.0;
    let l = parse_number(parts[2].trim_end_matches('%'))? / 100.0;
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 255,
    };
    let (r, g, b) = hsl_to_rgb(h, s, l);
    let to_u8 = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    Ok(Rgba8::new(to_u8(r), to_u8(g), to_u8(b), a))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named_color(name: &str) -> Option<Rgba8> {
    let rgb = |r, g, b| Some(Rgba8::new(r, g, b, 255));
    match name {
        "transparent" => Some(Rgba8::TRANSPARENT),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "green" => rgb(0, 128, 0),
        "lime" => rgb(0, 255, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "cyan" | "aqua" => rgb(0, 255, 255),
        "magenta" | "fuchsia" => rgb(255, 0, 255),
        "gray" | "grey" => rgb(128, 128, 128),
        "lightgray" | "lightgrey" => rgb(211, 211, 211),
        "darkgray" | "darkgrey" => rgb(169, 169, 169),
        "silver" => rgb(192, 192, 192),
        "maroon" => rgb(128, 0, 0),
        "olive" => rgb(128, 128, 0),
        "navy" => rgb(0, 0, 128),
        "purple" => rgb(128, 0, 128),
        "teal" => rgb(0, 128, 128),
        "orange" => rgb(255, 165, 0),
        "pink" => rgb(255, 192, 203),
        "hotpink" => rgb(255, 105, 180),
        "gold" => rgb(255, 215, 0),
        "brown" => rgb(165, 42, 42),
        "indigo" => rgb(75, 0, 130),
        "beige" => rgb(245, 245, 220),
        "ivory" => rgb(255, 255, 240),
        "whitesmoke" => rgb(245, 245, 245),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
