//! Icon system with Nerd Font glyphs and ASCII fallbacks
//!
//! # Environment Variables
//!
//! - `NERD_FONTS=1`: Force Nerd Font mode
//! - `NERD_FONTS_DISABLED=1`: Force ASCII mode
//! - `NO_COLOR`: Plain glyphs without ANSI colors

use std::sync::OnceLock;

/// Icon set used by CLI output
#[derive(Debug, Clone)]
pub struct IconSet {
    // Status
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,

    // Actions
    pub search: &'static str,
    pub sync: &'static str,
    pub save: &'static str,

    // Data
    pub database: &'static str,
    pub package: &'static str,
    pub folder: &'static str,
}

const NERD_ICONS: IconSet = IconSet {
    success: "\x1b[32m\u{f00c}\x1b[0m",      // fa-check (green)
    error: "\x1b[31m\u{f00d}\x1b[0m",        // fa-times (red)
    warning: "\x1b[33m\u{f071}\x1b[0m",      // fa-exclamation-triangle (yellow)
    info: "\x1b[36m\u{f05a}\x1b[0m",         // fa-info-circle (cyan)

    search: "\x1b[36m\u{f002}\x1b[0m",       // fa-search (cyan)
    sync: "\x1b[36m\u{f021}\x1b[0m",         // fa-refresh (cyan)
    save: "\x1b[35m\u{f0c7}\x1b[0m",         // fa-floppy-o (magenta)

    database: "\x1b[35m\u{f1c0}\x1b[0m",     // fa-database (magenta)
    package: "\x1b[33m\u{f187}\x1b[0m",      // fa-archive (yellow)
    folder: "\x1b[33m\u{f07b}\x1b[0m",       // fa-folder-open (yellow)
};

const ASCII_ICONS: IconSet = IconSet {
    success: "\x1b[32m✓\x1b[0m",
    error: "\x1b[31m✗\x1b[0m",
    warning: "\x1b[33m!\x1b[0m",
    info: "\x1b[36mi\x1b[0m",

    search: "\x1b[36m?\x1b[0m",
    sync: "\x1b[36m↻\x1b[0m",
    save: "\x1b[35m↓\x1b[0m",

    database: "\x1b[35m◘\x1b[0m",
    package: "\x1b[33m■\x1b[0m",
    folder: "\x1b[33m□\x1b[0m",
};

const PLAIN_ICONS: IconSet = IconSet {
    success: "✓",
    error: "✗",
    warning: "!",
    info: "i",

    search: "?",
    sync: "↻",
    save: "↓",

    database: "◘",
    package: "■",
    folder: "□",
};

static ICONS: OnceLock<&'static IconSet> = OnceLock::new();

/// Detect if terminal supports Nerd Fonts
///
/// Conservative default (ASCII) to prevent rendering issues.
fn supports_nerd_fonts() -> bool {
    if let Ok(val) = std::env::var("NERD_FONTS") {
        return val == "1" || val.eq_ignore_ascii_case("true");
    }

    if std::env::var("NERD_FONTS_DISABLED").is_ok() {
        return false;
    }

    if let Ok(term_program) = std::env::var("TERM_PROGRAM") {
        let term_lower = term_program.to_lowercase();
        if term_lower.contains("iterm")
            || term_lower.contains("wezterm")
            || term_lower.contains("alacritty")
            || term_lower.contains("kitty")
        {
            return true;
        }
    }

    false
}

fn select_icons() -> &'static IconSet {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN_ICONS
    } else if supports_nerd_fonts() {
        &NERD_ICONS
    } else {
        &ASCII_ICONS
    }
}

/// Get the active icon set (initialized on first call)
pub fn icons() -> &'static IconSet {
    ICONS.get_or_init(select_icons)
}

/// Status icons
pub mod status {
    use super::icons;

    pub fn success() -> &'static str { icons().success }

    pub fn error() -> &'static str { icons().error }

    pub fn warning() -> &'static str { icons().warning }

    pub fn info() -> &'static str { icons().info }
}

/// Action icons
pub mod action {
    use super::icons;

    pub fn search() -> &'static str { icons().search }

    /// Refresh/download icon
    pub fn sync() -> &'static str { icons().sync }

    pub fn save() -> &'static str { icons().save }
}

/// Data icons
pub mod data {
    use super::icons;

    pub fn database() -> &'static str { icons().database }

    /// Ontology snapshot icon
    pub fn package() -> &'static str { icons().package }

    pub fn folder() -> &'static str { icons().folder }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_module_access() {
        assert!(!status::success().is_empty());
        assert!(!action::sync().is_empty());
        assert!(!data::package().is_empty());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("NERD_FONTS", "1");
        assert!(supports_nerd_fonts());
        std::env::remove_var("NERD_FONTS");

        std::env::set_var("NERD_FONTS_DISABLED", "1");
        assert!(!supports_nerd_fonts());
        std::env::remove_var("NERD_FONTS_DISABLED");
    }
}
