//! Line tokenizer
//!
//! First pass of every scan: split each line into its address words and its
//! comments. Anything that does not look like a word is ignored, so
//! malformed text still tokenizes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use spacerkit_core::parse_number;
use std::sync::OnceLock;

/// One address word such as `X2.5` or `G01`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Upper-case address letter
    pub letter: char,
    /// Numeric value
    pub value: f64,
}

impl Word {
    /// Integer value if the word is whole, e.g. `G01` -> 1
    pub fn code(&self) -> Option<u32> {
        if self.value >= 0.0 && (self.value - self.value.round()).abs() < 1e-9 {
            Some(self.value.round() as u32)
        } else {
            None
        }
    }
}

/// Motion word on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionWord {
    /// G00
    Rapid,
    /// G01
    Linear,
    /// G02
    ArcCw,
    /// G03
    ArcCcw,
}

/// A tokenized program line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedLine {
    /// 1-based line number
    pub number: usize,
    /// Original text
    pub raw: String,
    /// Address words in order
    pub words: Vec<Word>,
    /// Comment text, parentheses removed, joined with a space
    pub comment: Option<String>,
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\(([^)]*)\)?").expect("invalid regex pattern"))
}

impl TokenizedLine {
    /// Tokenize one line
    pub fn parse(number: usize, raw: &str) -> Self {
        let mut comments = Vec::new();
        for cap in comment_regex().captures_iter(raw) {
            if let Some(text) = cap.get(1) {
                let text = text.as_str().trim();
                if !text.is_empty() {
                    comments.push(text.to_string());
                }
            }
        }

        let code = comment_regex().replace_all(raw, " ");
        let code = code.split(';').next().unwrap_or_default();
        let words = word_regex()
            .captures_iter(code)
            .filter_map(|cap| {
                let letter = cap.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
                let value = parse_number(cap.get(2)?.as_str())?;
                Some(Word { letter, value })
            })
            .collect();

        Self {
            number,
            raw: raw.to_string(),
            words,
            comment: if comments.is_empty() {
                None
            } else {
                Some(comments.join(" "))
            },
        }
    }

    /// First value of an address letter
    pub fn value(&self, letter: char) -> Option<f64> {
        self.words.iter().find(|w| w.letter == letter).map(|w| w.value)
    }

    /// X word
    pub fn x(&self) -> Option<f64> {
        self.value('X')
    }

    /// Z word
    pub fn z(&self) -> Option<f64> {
        self.value('Z')
    }

    /// F word
    pub fn feed(&self) -> Option<f64> {
        self.value('F')
    }

    /// Tool number from a T word
    pub fn tool(&self) -> Option<u32> {
        self.words
            .iter()
            .find(|w| w.letter == 'T')
            .and_then(|w| w.code())
    }

    /// Whether the line carries the given G code
    pub fn has_g(&self, code: u32) -> bool {
        self.words
            .iter()
            .any(|w| w.letter == 'G' && w.code() == Some(code))
    }

    /// Whether the line carries the given M code
    pub fn has_m(&self, code: u32) -> bool {
        self.words
            .iter()
            .any(|w| w.letter == 'M' && w.code() == Some(code))
    }

    /// Last motion word on the line
    pub fn motion_word(&self) -> Option<MotionWord> {
        self.words
            .iter()
            .filter(|w| w.letter == 'G')
            .filter_map(|w| match w.code()? {
                0 => Some(MotionWord::Rapid),
                1 => Some(MotionWord::Linear),
                2 => Some(MotionWord::ArcCw),
                3 => Some(MotionWord::ArcCcw),
                _ => None,
            })
            .next_back()
    }

    /// Machine-coordinate (G53) line
    pub fn is_machine_coordinates(&self) -> bool {
        self.has_g(53)
    }

    /// Whether the line moves an axis
    pub fn has_axis(&self) -> bool {
        self.x().is_some() || self.z().is_some()
    }

    /// Upper-case comment text, empty if none
    pub fn comment_upper(&self) -> String {
        self.comment.as_deref().unwrap_or_default().to_uppercase()
    }

    /// Code part of the raw line with comments removed and trimmed
    pub fn code_text(&self) -> String {
        let code = comment_regex().replace_all(&self.raw, "");
        code.split(';').next().unwrap_or_default().trim().to_string()
    }
}

/// Tokenize a whole program
pub fn tokenize(text: &str) -> Vec<TokenizedLine> {
    text.lines()
        .enumerate()
        .map(|(i, line)| TokenizedLine::parse(i + 1, line))
        .collect()
}

/// Tokenize already-split lines, numbering from 1
pub fn tokenize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<TokenizedLine> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| TokenizedLine::parse(i + 1, line.as_ref()))
        .collect()
}

/// Replace the first word with the given letter in the code part of a line.
/// Comments are left untouched; a line without the letter is returned as-is.
pub fn replace_word(raw: &str, letter: char, replacement: &str) -> String {
    let split = raw.find('(').unwrap_or(raw.len());
    let (code, comment) = raw.split_at(split);
    let mut done = false;
    let replaced = word_regex().replace_all(code, |caps: &regex::Captures<'_>| {
        let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let same_letter = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .is_some_and(|c| c.eq_ignore_ascii_case(&letter));
        if same_letter && !done {
            done = true;
            replacement.to_string()
        } else {
            matched.to_string()
        }
    });
    format!("{}{}", replaced, comment)
}

/// Insert a word before the first comment of a line
pub fn insert_before_comment(raw: &str, word: &str) -> String {
    match raw.find('(') {
        Some(idx) => {
            let (code, comment) = raw.split_at(idx);
            format!("{} {} {}", code.trim_end(), word, comment)
        }
        None => format!("{} {}", raw.trim_end(), word),
    }
}

/// Put a word at the front of a line, after any leading N sequence number
pub fn prepend_word(raw: &str, word: &str) -> String {
    let text = raw.trim_start();
    let digits = text
        .strip_prefix(|c: char| c.eq_ignore_ascii_case(&'N'))
        .map(|rest| rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len())
        .unwrap_or(0);
    if digits == 0 {
        return format!("{} {}", word, text);
    }
    let (sequence, rest) = text.split_at(1 + digits);
    format!("{} {} {}", sequence, word, rest.trim_start())
        .trim_end()
        .to_string()
}
