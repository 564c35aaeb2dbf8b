// phiscan-lexicon/src/scoring/mod.rs
use libm::exp;

/// Signals gathered for one candidate span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub has_title: bool,
    pub known_names: usize,
    pub capitalized_words: usize,
    pub has_house_number: bool,
    pub has_street_suffix: bool,
    pub is_gender_term: bool,
    pub has_keyword_context: bool,
}

/// Weights for the confidence calculation.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub bias: f64,
    pub title_weight: f64,
    /// Applied per known name, for at most two names.
    pub known_name_weight: f64,
    /// Applied per capitalized word, for at most two words.
    pub capitalized_weight: f64,
    pub house_number_weight: f64,
    pub street_suffix_weight: f64,
    pub gender_term_weight: f64,
    pub keyword_match_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            bias: -2.0,
            title_weight: 2.5,
            known_name_weight: 1.5,
            capitalized_weight: 0.5,
            house_number_weight: 1.0,
            street_suffix_weight: 3.0,
            gender_term_weight: 2.5,
            keyword_match_weight: 2.0,
        }
    }
}

/// Calculates a confidence score in `(0.0, 1.0)` for a candidate span.
///
/// The weighted evidence is squashed through the logistic function.
pub fn calculate_confidence(evidence: &Evidence, weights: &ScoringWeights) -> f64 {
    let mut z = weights.bias;
    if evidence.has_title { z += weights.title_weight; }
    z += evidence.known_names.min(2) as f64 * weights.known_name_weight;
    z += evidence.capitalized_words.min(2) as f64 * weights.capitalized_weight;
    if evidence.has_house_number { z += weights.house_number_weight; }
    if evidence.has_street_suffix { z += weights.street_suffix_weight; }
    if evidence.is_gender_term { z += weights.gender_term_weight; }
    if evidence.has_keyword_context { z += weights.keyword_match_weight; }

    1.0 / (1.0 + exp(-z))
}
