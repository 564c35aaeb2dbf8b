// phiscan-lexicon/src/context/mod.rs
use daachorse::DoubleArrayAhoCorasick;
extern crate alloc;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::gazetteer::LexiconError;

/// Scans for keywords preceding a candidate span with word-boundary awareness.
///
/// Matching is ASCII case-insensitive. A scanner built from an empty keyword
/// list never reports context.
pub struct ContextScanner {
    automaton: Option<DoubleArrayAhoCorasick<usize>>,
}

impl fmt::Debug for ContextScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScanner")
         .field("automaton", &self.automaton.as_ref().map(|_| "<DoubleArrayAhoCorasick>"))
         .finish()
    }
}

impl ContextScanner {
    /// Creates a scanner for the given keywords.
    pub fn new(keywords: &[String]) -> Result<Self, LexiconError> {
        let mut patterns: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        patterns.sort();
        patterns.dedup();

        if patterns.is_empty() {
            return Ok(Self { automaton: None });
        }

        let automaton = DoubleArrayAhoCorasick::new(patterns)
            .map_err(|e| LexiconError::Automaton(format!("{}", e)))?;

        Ok(Self { automaton: Some(automaton) })
    }

    /// Scans the `window_size` bytes preceding `token_start` for a keyword.
    /// Employs word-boundary checks so that "sex" doesn't match "essex".
    pub fn scan_preceding_context(&self, text: &[u8], token_start: usize, window_size: usize) -> bool {
        let Some(automaton) = &self.automaton else { return false; };
        if token_start == 0 { return false; }

        let start = token_start.saturating_sub(window_size);
        let window = text[start..token_start].to_ascii_lowercase();

        for matched in automaton.find_iter(&window) {
            let m_start = matched.start();
            let m_end = matched.end();

            let prefix_ok = m_start == 0 || !window[m_start - 1].is_ascii_alphanumeric();
            let suffix_ok = m_end == window.len() || !window[m_end].is_ascii_alphanumeric();

            if prefix_ok && suffix_ok {
                return true;
            }
        }
        false
    }
}
