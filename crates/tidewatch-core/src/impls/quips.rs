//! QuipBook - 通知に添える一言をランダムに選ぶ

use std::fs;
use std::io;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::ports::ContentSource;

const BUILTIN: &[&str] = &[
    "\"It ain't over till it's over.\"\n - Yogi Berra",
    "\"It's tough to make predictions, especially about the future.\"\n - Yogi Berra",
    "\"The future ain't what it used to be.\"\n - Yogi Berra",
    "\"All models are wrong, but some are useful.\"\n - George Box",
    "\"Probability is the very guide of life.\"\n - Joseph Butler",
    "\"Doubt is not a pleasant condition, but certainty is absurd.\"\n - Voltaire",
    "\"The only certainty is that nothing is certain.\"\n - Pliny the Elder",
    "\"There are three kinds of lies: lies, damned lies, and statistics.\"\n - Mark Twain",
];

/// A list of quips, one picked at random per notification.
#[derive(Debug, Clone)]
pub struct QuipBook {
    quips: Vec<String>,
}

impl QuipBook {
    pub fn builtin() -> Self {
        Self {
            quips: BUILTIN.iter().map(|q| q.to_string()).collect(),
        }
    }

    /// One quip per non-empty line; a literal `\n` inside a line becomes a newline.
    ///
    /// Falls back to the built-in list when the file has no quips.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    pub fn from_lines(text: &str) -> Self {
        let quips: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.replace("\\n", "\n"))
            .collect();
        if quips.is_empty() {
            Self::builtin()
        } else {
            Self { quips }
        }
    }

    pub fn len(&self) -> usize {
        self.quips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quips.is_empty()
    }
}

impl Default for QuipBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ContentSource for QuipBook {
    fn next_content(&self) -> String {
        self.quips
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_from_the_list() {
        let book = QuipBook::builtin();
        for _ in 0..20 {
            let quip = book.next_content();
            assert!(BUILTIN.contains(&quip.as_str()));
        }
    }

    #[test]
    fn from_lines_skips_blanks_and_unescapes() {
        let book = QuipBook::from_lines("one\\n - someone\n\n   \ntwo\n");
        assert_eq!(book.len(), 2);
        assert_eq!(book.quips[0], "one\n - someone");
    }

    #[test]
    fn empty_file_falls_back_to_builtin() {
        let book = QuipBook::from_lines("\n\n");
        assert_eq!(book.len(), BUILTIN.len());
    }
}
