//! Typed-input language tables.
//!
//! A language maps each display glyph to the non-empty keystroke code a
//! player types to move onto it. Tables must be prefix-free: no code may be
//! a prefix of another, otherwise accumulated keystrokes become ambiguous.
//! The builtin tables reproduce the historical English and Japanese kana
//! sets, Hepburn romanization quirks included.

use crate::ConfigError;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

const HIRAGANA: &str = "あいうえおかきくけこさしすせそ\
                        たちつてとなにぬねのはひふへほ\
                        まみむめもらりるれろやゆよわをん";

const KATAKANA: &str = "アイウエオカキクケコサシスセソ\
                        タチツテトナニヌネノハヒフヘホ\
                        マミムメモラリルレロヤユヨワヲン";

/// Hepburn romanization for the 46 basic kana, in gojūon order.
const KANA_ROMANIZATION: [&str; 46] = [
    "a", "i", "u", "e", "o", //
    "ka", "ki", "ku", "ke", "ko", //
    "sa", "shi", "su", "se", "so", //
    "ta", "chi", "tsu", "te", "to", //
    "na", "ni", "nu", "ne", "no", //
    "ha", "hi", "fu", "he", "ho", //
    "ma", "mi", "mu", "me", "mo", //
    "ra", "ri", "ru", "re", "ro", //
    "ya", "yu", "yo", "wa", "wo", "nn",
];

/// Ordered, prefix-free mapping from display glyphs to input codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    name: String,
    entries: Vec<(char, String)>,
    max_code_len: usize,
}

impl Language {
    /// Builds a host-defined language, validating the table invariants.
    pub fn custom(name: &str, entries: Vec<(char, String)>) -> Result<Self, ConfigError> {
        validate_entries(&entries)?;
        Ok(Self::from_entries(name, entries))
    }

    /// Lowercase English letters, each typed as itself.
    #[must_use]
    pub fn english_lower() -> Self {
        let entries = LOWERCASE.chars().map(|c| (c, c.to_string())).collect();
        Self::from_entries("english lower", entries)
    }

    /// The 46 basic hiragana, typed by Hepburn romanization.
    #[must_use]
    pub fn hiragana() -> Self {
        Self::from_entries("japanese hiragana", kana_entries(HIRAGANA))
    }

    /// The 46 basic katakana, typed by Hepburn romanization.
    #[must_use]
    pub fn katakana() -> Self {
        Self::from_entries("japanese katakana", kana_entries(KATAKANA))
    }

    fn from_entries(name: &str, entries: Vec<(char, String)>) -> Self {
        debug_assert!(validate_entries(&entries).is_ok(), "builtin table invalid");
        let max_code_len = entries
            .iter()
            .map(|(_, code)| code.chars().count())
            .max()
            .unwrap_or(0);
        Self {
            name: name.to_owned(),
            entries,
            max_code_len,
        }
    }

    /// Human-readable table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of symbols the table defines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the table defines no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length in keystrokes of the longest code in the table.
    #[must_use]
    pub const fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// Glyphs in table order; this order fixes every weighted walk.
    pub fn glyphs(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().map(|(glyph, _)| *glyph)
    }

    /// Input code for the provided glyph.
    #[must_use]
    pub fn code(&self, glyph: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == glyph)
            .map(|(_, code)| code.as_str())
    }

    /// Position of the glyph in table order.
    #[must_use]
    pub fn index_of(&self, glyph: char) -> Option<usize> {
        self.entries.iter().position(|(candidate, _)| *candidate == glyph)
    }

    /// Glyph at the provided table position.
    #[must_use]
    pub fn glyph_at(&self, index: usize) -> Option<char> {
        self.entries.get(index).map(|(glyph, _)| *glyph)
    }
}

fn kana_entries(glyphs: &str) -> Vec<(char, String)> {
    glyphs
        .chars()
        .zip(KANA_ROMANIZATION)
        .map(|(glyph, code)| (glyph, code.to_owned()))
        .collect()
}

fn validate_entries(entries: &[(char, String)]) -> Result<(), ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::EmptyLanguage);
    }

    for (position, (glyph, code)) in entries.iter().enumerate() {
        if code.is_empty() {
            return Err(ConfigError::EmptyCode { glyph: *glyph });
        }
        if entries[..position].iter().any(|(seen, _)| seen == glyph) {
            return Err(ConfigError::DuplicateGlyph { glyph: *glyph });
        }
    }

    for (glyph, code) in entries {
        for (other, other_code) in entries {
            if glyph != other && other_code.starts_with(code.as_str()) {
                return Err(ConfigError::CodePrefix {
                    glyph: *glyph,
                    code: code.clone(),
                    other: *other,
                    other_code: other_code.clone(),
                });
            }
        }
    }

    Ok(())
}
