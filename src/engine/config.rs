use std::path::PathBuf;

use crate::render::surface::DEFAULT_MAX_PIXELS;

/// Process-level settings shared by every run of a [`StripEngine`](crate::StripEngine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Load fonts installed on the host.
    pub system_fonts: bool,
    /// Base directory for relative photo paths; `None` accepts inline photos only.
    pub photo_root: Option<PathBuf>,
    /// Worker threads for photo decoding; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Attach the failed stage and error chain to failure responses.
    pub debug: bool,
    /// Largest canvas, in pixels, a run may allocate.
    pub max_canvas_pixels: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            system_fonts: true,
            photo_root: None,
            threads: None,
            debug: false,
            max_canvas_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PHOTOSTRIP_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<std::ffi::OsString>,
    {
        let mut cfg = Self::default();
        let string = |key: &str| lookup(key).and_then(|v| v.into_string().ok());

        if let Some(dirs) = lookup("PHOTOSTRIP_FONT_DIRS") {
            cfg.font_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(flag) = string("PHOTOSTRIP_SYSTEM_FONTS").and_then(|v| parse_flag(&v)) {
            cfg.system_fonts = flag;
        }
        if let Some(root) = lookup("PHOTOSTRIP_PHOTO_ROOT").filter(|v| !v.is_empty()) {
            cfg.photo_root = Some(PathBuf::from(root));
        }
        cfg.threads = string("PHOTOSTRIP_THREADS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);
        if let Some(flag) = string("PHOTOSTRIP_DEBUG").and_then(|v| parse_flag(&v)) {
            cfg.debug = flag;
        }
        if let Some(max) = string("PHOTOSTRIP_MAX_PIXELS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            cfg.max_canvas_pixels = max;
        }
        cfg
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
