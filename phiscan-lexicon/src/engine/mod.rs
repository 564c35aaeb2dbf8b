//! The core lexicon engine for phiscan.
//!
//! Walks the token stream once, proposing PERSON, ADDRESS and GENDER spans
//! from gazetteer hits, then scores each span from its own shape and from
//! keywords found in the text just before it.

extern crate alloc;
use alloc::vec::Vec;
use crate::context::ContextScanner;
use crate::gazetteer::Gazetteer;
use crate::scoring::{calculate_confidence, Evidence, ScoringWeights};
use crate::tokens::{tokenize, Token};

/// Maximum number of tokens in a person span, title included.
pub const MAX_PERSON_TOKENS: usize = 4;
/// Maximum number of tokens between a house number and its street suffix.
pub const MAX_STREET_TOKENS: usize = 5;

/// Entity kinds the lexicon engine can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Address,
    Gender,
}

impl EntityKind {
    /// The upper-case label name used by downstream consumers.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::Address => "ADDRESS",
            EntityKind::Gender => "GENDER",
        }
    }
}

/// A span proposed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconMatch {
    pub start: usize,
    pub end: usize,
    pub kind: EntityKind,
    pub confidence: f64,
}

/// Identifies entity spans by combining gazetteer lookups with contextual
/// keyword matching.
#[derive(Debug)]
pub struct LexiconEngine {
    gazetteer: Gazetteer,
    scoring_weights: ScoringWeights,
    context_window: usize,
}

impl LexiconEngine {
    pub fn new(gazetteer: Gazetteer) -> Self {
        Self::with_weights(gazetteer, ScoringWeights::default())
    }

    pub fn with_weights(gazetteer: Gazetteer, scoring_weights: ScoringWeights) -> Self {
        Self {
            gazetteer,
            scoring_weights,
            context_window: 32,
        }
    }

    /// Sets how many bytes before a span are searched for context keywords.
    pub fn with_context_window(mut self, bytes: usize) -> Self {
        self.context_window = bytes;
        self
    }

    /// Scans `text` and returns every proposed span in text order.
    pub fn scan(&self, text: &str) -> Vec<LexiconMatch> {
        let tokens = tokenize(text);
        let mut matches = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let found = self
                .match_person(&tokens, i)
                .or_else(|| self.match_address(&tokens, i))
                .or_else(|| self.match_gender(&tokens, i));

            match found {
                Some((consumed, kind, mut evidence)) => {
                    let start = tokens[i].start;
                    let end = tokens[i + consumed - 1].end;
                    evidence.has_keyword_context = self.has_context(kind, text, start);
                    matches.push(LexiconMatch {
                        start,
                        end,
                        kind,
                        confidence: calculate_confidence(&evidence, &self.scoring_weights),
                    });
                    i += consumed;
                }
                None => i += 1,
            }
        }

        matches
    }

    fn has_context(&self, kind: EntityKind, text: &str, start: usize) -> bool {
        let scanner: &ContextScanner = match kind {
            EntityKind::Person => &self.gazetteer.person_context,
            EntityKind::Address => &self.gazetteer.address_context,
            EntityKind::Gender => &self.gazetteer.gender_context,
        };
        scanner.scan_preceding_context(text.as_bytes(), start, self.context_window)
    }

    /// A title followed by capitalized words, or a run of capitalized words
    /// containing at least one known name. The run stops at clause punctuation.
    fn match_person(&self, tokens: &[Token<'_>], i: usize) -> Option<(usize, EntityKind, Evidence)> {
        let first = &tokens[i];
        let has_title = self.gazetteer.is_title(first.word());
        if !has_title && !first.is_capitalized() {
            return None;
        }

        let mut evidence = Evidence { has_title, ..Default::default() };
        let mut consumed = 0;
        let mut j = i;
        if has_title {
            consumed = 1;
            j += 1;
            if first.ends_clause {
                return None;
            }
        }

        while j < tokens.len() && consumed < MAX_PERSON_TOKENS {
            let tok = &tokens[j];
            if !tok.is_capitalized() || self.gazetteer.is_title(tok.word()) {
                break;
            }
            if self.gazetteer.is_street_suffix(tok.word()) && !self.gazetteer.is_known_name(tok.word()) {
                break;
            }
            evidence.capitalized_words += 1;
            if self.gazetteer.is_known_name(tok.word()) {
                evidence.known_names += 1;
            }
            consumed += 1;
            j += 1;
            if tok.ends_clause {
                break;
            }
        }

        let name_words = evidence.capitalized_words;
        if name_words == 0 || (!has_title && evidence.known_names == 0) {
            return None;
        }
        Some((consumed, EntityKind::Person, evidence))
    }

    /// A house number followed, within a few tokens, by a street suffix.
    fn match_address(&self, tokens: &[Token<'_>], i: usize) -> Option<(usize, EntityKind, Evidence)> {
        let first = &tokens[i];
        if !first.is_number() || first.word().len() > 6 || first.ends_clause {
            return None;
        }

        let last = (i + MAX_STREET_TOKENS).min(tokens.len() - 1);
        for j in (i + 1)..=last {
            let tok = &tokens[j];
            if self.gazetteer.is_street_suffix(tok.word()) {
                let evidence = Evidence {
                    has_house_number: true,
                    has_street_suffix: true,
                    capitalized_words: tokens[i + 1..j].iter().filter(|t| t.is_capitalized()).count(),
                    ..Default::default()
                };
                return Some((j - i + 1, EntityKind::Address, evidence));
            }
            if tok.ends_clause {
                break;
            }
        }
        None
    }

    fn match_gender(&self, tokens: &[Token<'_>], i: usize) -> Option<(usize, EntityKind, Evidence)> {
        if !self.gazetteer.is_gender_term(tokens[i].word()) {
            return None;
        }
        let evidence = Evidence { is_gender_term: true, ..Default::default() };
        Some((1, EntityKind::Gender, evidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::Lexicon;
    use alloc::string::{String, ToString};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> LexiconEngine {
        let lexicon = Lexicon {
            given_names: words(&["Alan", "John"]),
            surnames: words(&["Green", "Doe"]),
            titles: words(&["Dr", "Mr", "Mrs"]),
            street_suffixes: words(&["Street", "St", "Avenue"]),
            gender_terms: words(&["male", "female"]),
            person_context: words(&["patient", "name"]),
            address_context: words(&["address", "lives at"]),
            gender_context: words(&["sex", "gender"]),
        };
        LexiconEngine::new(Gazetteer::new(&lexicon).unwrap())
    }

    fn spans<'a>(text: &'a str, matches: &[LexiconMatch]) -> Vec<(&'a str, EntityKind)> {
        matches.iter().map(|m| (&text[m.start..m.end], m.kind)).collect()
    }

    #[test]
    fn test_titled_name_stops_at_comma() {
        let text = "Dr. Alan Green, DOB 01/02/1990";
        let found = engine().scan(text);
        assert_eq!(spans(text, &found), alloc::vec![("Dr. Alan Green", EntityKind::Person)]);
        assert!(found[0].confidence > 0.9);
    }

    #[test]
    fn test_unknown_capitalized_words_are_ignored() {
        let found = engine().scan("Discharge Summary Follows");
        assert!(found.is_empty());
    }

    #[test]
    fn test_address_and_gender_with_context() {
        let text = "John Doe lives at 123 Main Street. Sex: male";
        let found = engine().scan(text);
        assert_eq!(
            spans(text, &found),
            alloc::vec![
                ("John Doe", EntityKind::Person),
                ("123 Main Street.", EntityKind::Address),
                ("male", EntityKind::Gender),
            ]
        );
        assert!(found.iter().all(|m| m.confidence > 0.0 && m.confidence < 1.0));
        assert!(found[2].confidence > 0.9, "gender with context: {}", found[2].confidence);
    }

    #[test]
    fn test_gender_without_context_scores_lower() {
        let e = engine();
        let with = e.scan("Sex: female");
        let without = e.scan("the female ward");
        assert!(with[0].confidence > without[0].confidence);
    }
}
