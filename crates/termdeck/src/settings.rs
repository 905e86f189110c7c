use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::render::markup;

/// How an option's value is validated and which token pattern an override
/// comment must match for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Color,
    Word,
    Font,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
}

pub const BACKGROUND: &str = "background";
pub const FOREGROUND: &str = "foreground";
pub const BORDER_COLOR: &str = "border_color";
pub const BORDER_STYLE: &str = "border_style";
pub const PAGINATION: &str = "pagination";
pub const PAGINATION_MODE: &str = "pagination_mode";
pub const PAGINATION_STYLE: &str = "pagination_style";
pub const H1_FONT: &str = "h1_font";
pub const H2_FONT: &str = "h2_font";
pub const H3_FONT: &str = "h3_font";
pub const H1_COLOR: &str = "h1_color";
pub const H2_COLOR: &str = "h2_color";
pub const H3_COLOR: &str = "h3_color";
pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";

#[rustfmt::skip]
pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec { key: BACKGROUND, kind: OptionKind::Color, default: "black" },
    OptionSpec { key: FOREGROUND, kind: OptionKind::Color, default: "white" },
    OptionSpec { key: BORDER_COLOR, kind: OptionKind::Color, default: "blue" },
    OptionSpec { key: BORDER_STYLE, kind: OptionKind::Word, default: "rounded" },
    OptionSpec { key: PAGINATION, kind: OptionKind::Bool, default: "true" },
    OptionSpec { key: PAGINATION_MODE, kind: OptionKind::Word, default: "right" },
    OptionSpec { key: PAGINATION_STYLE, kind: OptionKind::Word, default: "fraction" },
    OptionSpec { key: H1_FONT, kind: OptionKind::Font, default: "wide" },
    OptionSpec { key: H2_FONT, kind: OptionKind::Font, default: "caps" },
    OptionSpec { key: H3_FONT, kind: OptionKind::Font, default: "plain" },
    OptionSpec { key: H1_COLOR, kind: OptionKind::Color, default: "cyan" },
    OptionSpec { key: H2_COLOR, kind: OptionKind::Color, default: "cyan" },
    OptionSpec { key: H3_COLOR, kind: OptionKind::Color, default: "yellow" },
    OptionSpec { key: HEADER, kind: OptionKind::Text, default: "" },
    OptionSpec { key: FOOTER, kind: OptionKind::Text, default: "" },
];

const ALIASES: &[(&str, &str)] = &[
    ("title_font", H1_FONT),
    ("section_font", H2_FONT),
    ("header_font", H3_FONT),
    ("title_color", H1_COLOR),
    ("section_color", H2_COLOR),
    ("header_color", H3_COLOR),
];

const WORD_CHOICES: &[(&str, &[&str])] = &[
    (BORDER_STYLE, &["rounded", "square", "double", "heavy", "ascii", "none"]),
    (PAGINATION_MODE, &["left", "center", "right"]),
    (PAGINATION_STYLE, &["fraction", "number", "slide"]),
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("Invalid word token regex"));
static FONT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-,.]+$").expect("Invalid font token regex"));
static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Invalid hex colour regex"));

/// Canonicalize a user-supplied option name: case-fold, `-` to `_`, then
/// resolve aliases. The result may still be unknown.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim().to_lowercase().replace('-', "_");
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key)
}

/// Look up an option by name, applying alias normalization.
pub fn lookup(key: &str) -> Option<&'static OptionSpec> {
    let key = normalize_key(key);
    OPTIONS.iter().find(|spec| spec.key == key)
}

impl OptionKind {
    /// Whether a value taken from an override comment has an acceptable shape.
    pub fn matches_override_token(self, value: &str) -> bool {
        match self {
            Self::Bool | Self::Color | Self::Word => WORD_RE.is_match(value),
            Self::Font => FONT_RE.is_match(value),
            Self::Text => !value.is_empty() && !value.contains("-->"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// Parse a raw value: `true`/`false` become booleans, everything else text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Text(s) => s,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted values of a `word` option.
pub fn choices(key: &str) -> Option<&'static [&'static str]> {
    WORD_CHOICES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, allowed)| *allowed)
}

/// Check a value against its option kind. Returns a human-readable reason
/// when the value is unusable.
pub fn validate(spec: &OptionSpec, value: &SettingValue) -> Result<(), String> {
    match (spec.kind, value) {
        (OptionKind::Bool, SettingValue::Bool(_)) => Ok(()),
        (OptionKind::Bool, SettingValue::Text(s)) => {
            Err(format!("'{s}' is not a boolean (expected true or false)"))
        }
        (OptionKind::Color, SettingValue::Text(s)) => {
            if (WORD_RE.is_match(s) || HEX_RE.is_match(s)) && markup::parse_color(s).is_some() {
                Ok(())
            } else {
                Err(format!("'{s}' is not a colour name or #rrggbb value"))
            }
        }
        (OptionKind::Font, SettingValue::Text(s)) => {
            if FONT_RE.is_match(s) {
                Ok(())
            } else {
                Err(format!("'{s}' is not a font name list"))
            }
        }
        (OptionKind::Word, SettingValue::Text(s)) => {
            if !WORD_RE.is_match(s) {
                return Err(format!("'{s}' is not a single word"));
            }
            match choices(spec.key) {
                Some(allowed) if !allowed.contains(&s.to_lowercase().as_str()) => Err(format!(
                    "'{s}' is not one of {}",
                    allowed.join(", ")
                )),
                _ => Ok(()),
            }
        }
        (OptionKind::Text, _) => Ok(()),
        (_, SettingValue::Bool(b)) => Err(format!("'{b}' is not valid here")),
    }
}

/// The stored form of a validated value: `word` choices are lower case.
pub fn canonical(spec: &OptionSpec, value: SettingValue) -> SettingValue {
    match (spec.kind, value) {
        (OptionKind::Word, SettingValue::Text(s)) => SettingValue::Text(s.to_lowercase()),
        (_, value) => value,
    }
}

/// Immutable presentation settings. Per-slide overrides produce a new value
/// via [`Settings::with_overrides`] instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<&'static str, SettingValue>,
}

impl Default for Settings {
    fn default() -> Self {
        let values = OPTIONS
            .iter()
            .map(|spec| (spec.key, SettingValue::parse(spec.default)))
            .collect();
        Self { values }
    }
}

impl Settings {
    /// Apply one `key: value` pair. Unknown keys and invalid values are
    /// rejected with a warning message and leave the settings unchanged.
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<(), String> {
        let Some(spec) = lookup(key) else {
            return Err(format!("unknown setting '{}'", key.trim()));
        };
        validate(spec, &value).map_err(|reason| format!("setting '{}': {reason}", spec.key))?;
        self.values.insert(spec.key, canonical(spec, value));
        Ok(())
    }

    /// Build the effective settings for one slide. Override keys are already
    /// canonical and validated by the parser; anything else is ignored.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, SettingValue>) -> Settings {
        let mut merged = self.clone();
        for (key, value) in overrides {
            if let Some(spec) = lookup(key) {
                merged.values.insert(spec.key, value.clone());
            }
        }
        merged
    }

    pub fn text(&self, key: &str) -> &str {
        self.values.get(key).map(SettingValue::as_str).unwrap_or("")
    }

    /// Optional text setting: empty strings count as absent.
    pub fn optional_text(&self, key: &str) -> Option<&str> {
        Some(self.text(key)).filter(|s| !s.trim().is_empty())
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(SettingValue::Bool(b)) => *b,
            _ => lookup(key).is_some_and(|spec| spec.default == "true"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_option() {
        let settings = Settings::default();
        assert_eq!(settings.iter().count(), OPTIONS.len());
        assert_eq!(settings.text(BACKGROUND), "black");
        assert!(settings.flag(PAGINATION));
        assert_eq!(settings.optional_text(FOOTER), None);
    }

    #[test]
    fn test_aliases_resolve_to_heading_keys() {
        assert_eq!(normalize_key("title_font"), H1_FONT);
        assert_eq!(normalize_key("Section-Font"), H2_FONT);
        assert_eq!(normalize_key("header_font"), H3_FONT);
        assert_eq!(normalize_key("title_color"), H1_COLOR);
        assert_eq!(normalize_key("section_color"), H2_COLOR);
        assert_eq!(normalize_key("header_color"), H3_COLOR);
        assert_eq!(normalize_key("border-style"), BORDER_STYLE);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .set("transition", SettingValue::parse("fade"))
            .unwrap_err();
        assert!(err.contains("unknown setting"), "got: {err}");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bool_kind_rejects_text() {
        let mut settings = Settings::default();
        assert!(settings.set(PAGINATION, SettingValue::parse("yes")).is_err());
        assert!(settings.set(PAGINATION, SettingValue::parse("false")).is_ok());
        assert!(!settings.flag(PAGINATION));
    }

    #[test]
    fn test_colour_accepts_hex() {
        let mut settings = Settings::default();
        assert!(settings.set(BACKGROUND, SettingValue::parse("#1e1e1e")).is_ok());
        assert!(settings.set(BACKGROUND, SettingValue::parse("dark red")).is_err());
        assert_eq!(settings.text(BACKGROUND), "#1e1e1e");
    }

    #[test]
    fn test_word_choices_enforced() {
        let mut settings = Settings::default();
        assert!(settings.set(BORDER_STYLE, SettingValue::parse("double")).is_ok());
        let err = settings
            .set(BORDER_STYLE, SettingValue::parse("wavy"))
            .unwrap_err();
        assert!(err.contains("rounded"), "got: {err}");
        assert!(settings.set(BACKGROUND, SettingValue::parse("chartreuse")).is_err());
        assert_eq!(settings.text(BORDER_STYLE), "double");
    }

    #[test]
    fn test_word_values_stored_lower_case() {
        let mut settings = Settings::default();
        settings.set(PAGINATION_MODE, SettingValue::parse("Left")).unwrap();
        settings.set(PAGINATION_STYLE, SettingValue::parse("NUMBER")).unwrap();
        assert_eq!(settings.text(PAGINATION_MODE), "left");
        assert_eq!(settings.text(PAGINATION_STYLE), "number");
    }

    #[test]
    fn test_with_overrides_leaves_base_untouched() {
        let base = Settings::default();
        let mut overrides = BTreeMap::new();
        overrides.insert(PAGINATION.to_string(), SettingValue::Bool(false));
        let merged = base.with_overrides(&overrides);
        assert!(!merged.flag(PAGINATION));
        assert!(base.flag(PAGINATION));
    }

    #[test]
    fn test_override_token_patterns() {
        assert!(OptionKind::Font.matches_override_token("wide,caps"));
        assert!(OptionKind::Font.matches_override_token("ansi-shadow.flf"));
        assert!(!OptionKind::Color.matches_override_token("dark-red"));
        assert!(OptionKind::Bool.matches_override_token("false"));
        assert!(OptionKind::Text.matches_override_token("Acme Corp, 2026"));
        assert!(!OptionKind::Text.matches_override_token(""));
    }
}
