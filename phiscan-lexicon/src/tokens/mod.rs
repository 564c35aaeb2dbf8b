//! Whitespace tokenizer that keeps byte offsets into the source text.
//!
//! Surrounding quotes, brackets and clause punctuation are trimmed off each
//! token. A trailing `.` is kept because abbreviations such as `Dr.` and
//! `St.` carry meaning for the gazetteer.

/// A single whitespace-delimited token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset of the trimmed token in the source text.
    pub start: usize,
    /// Exclusive end byte offset of the trimmed token.
    pub end: usize,
    /// The trimmed token text.
    pub text: &'a str,
    /// True when clause punctuation (`,` `;` `:` ...) was trimmed from the end.
    pub ends_clause: bool,
}

const LEADING_NOISE: &[char] = &['(', '[', '{', '"', '\'', '<'];
const TRAILING_NOISE: &[char] = &[',', ';', ':', ')', ']', '}', '"', '\'', '>', '!', '?'];

impl<'a> Token<'a> {
    /// The token without any trailing periods.
    pub fn word(&self) -> &'a str {
        self.text.trim_end_matches('.')
    }

    /// True if every character of the word is alphabetic.
    pub fn is_alphabetic(&self) -> bool {
        let word = self.word();
        !word.is_empty() && word.chars().all(char::is_alphabetic)
    }

    /// True if the word is alphabetic and starts with an uppercase letter.
    pub fn is_capitalized(&self) -> bool {
        self.is_alphabetic() && self.word().chars().next().map_or(false, char::is_uppercase)
    }

    /// True if the word is made only of ASCII digits.
    pub fn is_number(&self) -> bool {
        let word = self.word();
        !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Iterator over the tokens of a string.
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.input[self.pos..];
            let skipped = rest.len() - rest.trim_start().len();
            let raw_start = self.pos + skipped;
            if raw_start >= self.input.len() {
                self.pos = self.input.len();
                return None;
            }

            let raw = &self.input[raw_start..];
            let raw_len = raw.find(char::is_whitespace).unwrap_or(raw.len());
            let raw = &raw[..raw_len];
            self.pos = raw_start + raw_len;

            let lead = raw.len() - raw.trim_start_matches(LEADING_NOISE).len();
            let body = &raw[lead..];
            let trimmed = body.trim_end_matches(TRAILING_NOISE);
            if trimmed.is_empty() {
                continue;
            }

            let start = raw_start + lead;
            return Some(Token {
                start,
                end: start + trimmed.len(),
                text: trimmed,
                ends_clause: trimmed.len() < body.len(),
            });
        }
    }
}

/// Convenience wrapper collecting every token of `input`.
pub fn tokenize(input: &str) -> alloc::vec::Vec<Token<'_>> {
    Tokens::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::vec::Vec;

    #[test]
    fn test_tokens_keep_offsets() {
        let text = "Dr. Alan  Green, DOB";
        let toks: Vec<_> = Tokens::new(text).collect();
        assert_eq!(toks.len(), 4);
        assert_eq!(toks[0].text, "Dr.");
        assert_eq!(toks[2].text, "Green");
        assert!(toks[2].ends_clause);
        assert_eq!(&text[toks[2].start..toks[2].end], "Green");
    }

    #[test]
    fn test_tokens_skip_pure_punctuation() {
        let toks: Vec<_> = Tokens::new("( ) -- name").map(|t| t.text).collect();
        assert_eq!(toks, alloc::vec!["--", "name"]);
    }

    #[test]
    fn test_token_shape_helpers() {
        let toks = tokenize("St. 123 alan O'Neil");
        assert_eq!(toks[0].word(), "St");
        assert!(toks[0].is_capitalized());
        assert!(toks[1].is_number());
        assert!(!toks[2].is_capitalized());
        assert!(!toks[3].is_alphabetic());
    }
}
