//! Deterministic keyword and outlet heuristic, the last tier of the cascade.
//!
//! Makes no external calls and never fails. The only nondeterminism is the
//! injected `TieBreaker`, consulted when the text carries no usable signal.

use std::sync::Arc;
use bw_core::{Attribution, BiasAssessment, NEUTRAL_SCORE};
use super::tiebreak::{Lean, TieBreaker};

const LIBERAL_TERMS: &[&str] = &[
    "progressive",
    "climate change",
    "climate crisis",
    "social justice",
    "income inequality",
    "systemic racism",
    "gun control",
    "gun violence",
    "reproductive rights",
    "abortion rights",
    "living wage",
    "medicare for all",
    "green new deal",
    "lgbtq",
    "voting rights",
    "undocumented immigrants",
    "workers' rights",
    "affordable care act",
    "marginalized communities",
    "corporate greed",
];

const CONSERVATIVE_TERMS: &[&str] = &[
    "border security",
    "law and order",
    "illegal immigration",
    "illegal aliens",
    "tax cuts",
    "second amendment",
    "traditional values",
    "family values",
    "pro-life",
    "religious freedom",
    "free market",
    "deregulation",
    "small government",
    "big government",
    "radical left",
    "woke",
    "election integrity",
    "national security",
    "fiscal responsibility",
    "job creators",
];

const NEUTRAL_TERMS: &[&str] = &[
    "according to",
    "officials said",
    "data shows",
    "study found",
    "researchers",
    "analysts",
    "bipartisan",
    "both sides",
    "statistics",
    "independent experts",
];

const LEFT_OUTLETS: &[&str] = &[
    "cnn",
    "msnbc",
    "huffpost",
    "huffingtonpost",
    "nytimes",
    "washingtonpost",
    "vox",
    "motherjones",
    "theguardian",
    "slate",
    "salon",
    "thedailybeast",
    "democracynow",
    "jacobin",
];

const RIGHT_OUTLETS: &[&str] = &[
    "foxnews",
    "breitbart",
    "dailywire",
    "newsmax",
    "theblaze",
    "nationalreview",
    "washingtonexaminer",
    "dailycaller",
    "oann",
    "thefederalist",
    "nypost",
    "townhall",
];

/// Weight of a title hit relative to a body hit.
const TITLE_WEIGHT: f64 = 2.0;
/// Added to the matching side's score when the outlet is known.
const OUTLET_BONUS: f64 = 3.0;
/// Shift of the baseline score for a known outlet.
const OUTLET_OFFSET: f64 = 10.0;
/// Largest move away from the baseline a dominant side can produce.
const MAX_SHIFT: f64 = 35.0;
const MIN_SCORE: f64 = 15.0;
const MAX_SCORE: f64 = 85.0;
const MAX_CONFIDENCE: f64 = 0.85;
/// Distance from center of a tie-break lean.
const TIE_BREAK_LEAN: f64 = 15.0;
const TIE_BREAK_CONFIDENCE: f64 = 0.4;
/// Score difference at or below which the two sides count as tied.
const NEAR_TIE_MARGIN: f64 = 1.0;
/// Each side's score at or below which a tie counts as "small".
const SMALL_SIGNAL: f64 = 2.0;

/// Weighted keyword counts for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSignals {
    pub liberal: f64,
    pub conservative: f64,
    pub neutral: f64,
    /// Lean of a recognised outlet, if any
    pub outlet: Option<Lean>,
    pub indicators: Vec<String>,
}

impl KeywordSignals {
    fn outlet_offset(&self) -> f64 {
        match self.outlet {
            Some(Lean::Left) => -OUTLET_OFFSET,
            Some(Lean::Right) => OUTLET_OFFSET,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordScorer {
    tie_breaker: Arc<dyn TieBreaker>,
}

impl KeywordScorer {
    pub fn new(tie_breaker: Arc<dyn TieBreaker>) -> Self {
        Self { tie_breaker }
    }

    /// Count keyword hits and match the outlet against the known lists.
    pub fn signals(&self, title: &str, content: &str, source: &str) -> KeywordSignals {
        let title = title.to_lowercase();
        let content = content.to_lowercase();
        let source = source.to_lowercase();
        let mut indicators = Vec::new();

        let mut liberal = weighted_hits(LIBERAL_TERMS, &title, &content, "liberal", &mut indicators);
        let mut conservative =
            weighted_hits(CONSERVATIVE_TERMS, &title, &content, "conservative", &mut indicators);
        let neutral = weighted_hits(NEUTRAL_TERMS, &title, &content, "neutral", &mut indicators);

        let outlet = if let Some(name) = LEFT_OUTLETS.iter().find(|o| word_hits(&source, o) > 0) {
            liberal += OUTLET_BONUS;
            indicators.push(format!("source: {} (left-leaning outlet)", name));
            Some(Lean::Left)
        } else if let Some(name) = RIGHT_OUTLETS.iter().find(|o| word_hits(&source, o) > 0) {
            conservative += OUTLET_BONUS;
            indicators.push(format!("source: {} (right-leaning outlet)", name));
            Some(Lean::Right)
        } else {
            None
        };

        KeywordSignals {
            liberal,
            conservative,
            neutral,
            outlet,
            indicators,
        }
    }

    pub fn assess(&self, title: &str, content: &str, source: &str) -> BiasAssessment {
        let signals = self.signals(title, content, source);
        let baseline = NEUTRAL_SCORE + signals.outlet_offset();
        let political = signals.liberal + signals.conservative;
        let summary = format!(
            "Keyword analysis found {:.0} liberal-leaning, {:.0} conservative-leaning and {:.0} neutral signals",
            signals.liberal, signals.conservative, signals.neutral
        );

        let (score, confidence, reasoning) = if political == 0.0 && signals.outlet.is_none() {
            let (score, confidence) = self.tie_break(NEUTRAL_SCORE, 0.5);
            (score, confidence, format!("{}; no political signal detected.", summary))
        } else if (signals.liberal - signals.conservative).abs() <= NEAR_TIE_MARGIN {
            if signals.liberal <= SMALL_SIGNAL
                && signals.conservative <= SMALL_SIGNAL
                && signals.neutral > political
            {
                (baseline, 0.6, format!("{}; neutral language dominates.", summary))
            } else {
                let (score, confidence) = self.tie_break(baseline, 0.5);
                (score, confidence, format!("{}; the two sides are roughly balanced.", summary))
            }
        } else {
            let (dominant, direction, side) = if signals.conservative > signals.liberal {
                (signals.conservative, 1.0, "conservative")
            } else {
                (signals.liberal, -1.0, "liberal")
            };
            // Ratio lies in (0.5, 1]; rescale to (0, 1].
            let strength = (dominant / political - 0.5) * 2.0;
            let score = (baseline + direction * strength * MAX_SHIFT).clamp(MIN_SCORE, MAX_SCORE);
            let confidence = (0.4 + 0.45 * strength).min(MAX_CONFIDENCE);
            (score, confidence, format!("{}; {} language dominates.", summary, side))
        };

        BiasAssessment::new(score, confidence, reasoning, signals.indicators, Attribution::Keyword)
            .with_source_reliability("Unknown")
    }

    fn tie_break(&self, baseline: f64, confidence: f64) -> (f64, f64) {
        match self.tie_breaker.lean() {
            Lean::Center => (baseline, confidence),
            Lean::Left => (baseline - TIE_BREAK_LEAN, TIE_BREAK_CONFIDENCE),
            Lean::Right => (baseline + TIE_BREAK_LEAN, TIE_BREAK_CONFIDENCE),
        }
    }
}

fn weighted_hits(
    terms: &[&str],
    title: &str,
    content: &str,
    side: &str,
    indicators: &mut Vec<String>,
) -> f64 {
    terms
        .iter()
        .map(|term| {
            let hits = word_hits(title, term) as f64 * TITLE_WEIGHT + word_hits(content, term) as f64;
            if hits > 0.0 && side != "neutral" {
                indicators.push(format!("{}: {}", side, term));
            }
            hits
        })
        .sum()
}

/// Occurrences of `term` in `text` not embedded in a longer word.
fn word_hits(text: &str, term: &str) -> usize {
    let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
    text.match_indices(term)
        .filter(|(start, _)| {
            let before = text[..*start].chars().next_back();
            let after = text[start + term.len()..].chars().next();
            !is_word(before) && !is_word(after)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bw_core::BiasLabel;
    use crate::bias::tiebreak::{FixedTieBreak, NoTieBreak};

    fn scorer() -> KeywordScorer {
        KeywordScorer::new(Arc::new(NoTieBreak))
    }

    #[test]
    fn test_title_hits_count_double() {
        let signals = scorer().signals("Tax cuts ahead", "The tax cuts were passed.", "example.com");
        assert_eq!(signals.conservative, 3.0);
        assert_eq!(signals.liberal, 0.0);
        assert_eq!(signals.outlet, None);
    }

    #[test]
    fn test_terms_inside_longer_words_do_not_count() {
        let signals = scorer().signals(
            "She awoke early",
            "The scene evoked memories of a wokeness debate.",
            "voxeurop.eu",
        );
        assert_eq!(signals.conservative, 0.0);
        assert_eq!(signals.outlet, None);
        assert!(signals.indicators.is_empty());

        let signals = scorer().signals("Woke politics", "", "www.vox.com");
        assert_eq!(signals.conservative, TITLE_WEIGHT);
        assert_eq!(signals.outlet, Some(Lean::Left));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let signals = scorer().signals("", "CLIMATE CHANGE and Climate Change", "");
        assert_eq!(signals.liberal, 2.0);
    }

    #[test]
    fn test_fox_border_story_scores_conservative() {
        let assessment = scorer().assess(
            "Border security and law and order: why border security and law and order matter",
            "Officials discussed the new proposal on Tuesday.",
            "foxnews.com",
        );
        assert!(assessment.bias_score >= 61.0 && assessment.bias_score <= 85.0);
        assert!(matches!(
            assessment.bias_label,
            BiasLabel::Conservative | BiasLabel::HighlyConservative
        ));
        assert!(assessment.confidence <= 0.85);
        assert_eq!(assessment.attribution, Attribution::Keyword);
        assert_eq!(assessment.source_reliability.as_deref(), Some("Unknown"));
        assert!(assessment
            .indicators
            .contains(&"source: foxnews (right-leaning outlet)".to_string()));
    }

    #[test]
    fn test_only_one_outlet_offset_applies() {
        let signals = scorer().signals("", "", "cnn-foxnews-syndicate");
        assert_eq!(signals.outlet, Some(Lean::Left));
        assert_eq!(signals.liberal, OUTLET_BONUS);
        assert_eq!(signals.conservative, 0.0);
    }

    #[test]
    fn test_liberal_dominance_is_reproducible() {
        let scorer = scorer();
        let title = "Climate crisis demands action on income inequality";
        let body = "Advocates for social justice and gun control rallied.";
        let first = scorer.assess(title, body, "example.com");
        for _ in 0..10 {
            assert_eq!(scorer.assess(title, body, "example.com"), first);
        }
        assert!(first.bias_score <= 40.0);
        assert!(matches!(first.bias_label, BiasLabel::Liberal | BiasLabel::HighlyLiberal));
    }

    #[test]
    fn test_confidence_grows_with_dominance() {
        let scorer = scorer();
        let mixed = scorer.assess(
            "",
            "tax cuts, border security, deregulation and free market talk, plus a nod to climate change",
            "",
        );
        let one_sided = scorer.assess(
            "",
            "tax cuts, border security, deregulation and free market talk",
            "",
        );
        assert!(one_sided.confidence > mixed.confidence);
        assert!(one_sided.bias_score > mixed.bias_score);
        assert!(one_sided.confidence <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_no_signal_defaults_to_center() {
        let assessment = scorer().assess("Local bakery opens", "Bread was sold.", "example.com");
        assert_eq!(assessment.bias_score, 50.0);
        assert_eq!(assessment.bias_label, BiasLabel::NeutralCentrist);
        assert_eq!(assessment.confidence, 0.5);
    }

    #[test]
    fn test_no_signal_tie_break_leans_mildly() {
        let left = KeywordScorer::new(Arc::new(FixedTieBreak(Lean::Left)))
            .assess("Local bakery opens", "Bread was sold.", "");
        assert_eq!(left.bias_score, 35.0);
        assert_eq!(left.bias_label, BiasLabel::Liberal);

        let right = KeywordScorer::new(Arc::new(FixedTieBreak(Lean::Right)))
            .assess("Local bakery opens", "Bread was sold.", "");
        assert_eq!(right.bias_score, 65.0);
        assert_eq!(right.bias_label, BiasLabel::Conservative);
    }

    #[test]
    fn test_small_tie_with_neutral_language() {
        let assessment = KeywordScorer::new(Arc::new(FixedTieBreak(Lean::Right))).assess(
            "",
            "According to analysts, researchers and officials said the climate change bill and tax cuts \
             drew bipartisan support.",
            "",
        );
        assert_eq!(assessment.bias_score, 50.0);
        assert_eq!(assessment.confidence, 0.6);
    }

    #[test]
    fn test_large_tie_uses_tie_break() {
        let body = "climate change, gun control, social justice versus tax cuts, border security, pro-life";
        let centered = scorer().assess("", body, "");
        assert_eq!(centered.bias_score, 50.0);

        let leaned = KeywordScorer::new(Arc::new(FixedTieBreak(Lean::Left))).assess("", body, "");
        assert_eq!(leaned.bias_score, 35.0);
    }

    #[test]
    fn test_scores_always_in_range() {
        let scorer = KeywordScorer::new(Arc::new(crate::bias::RandomTieBreak::seeded(0.4, 3)));
        let cases = [
            ("", "", ""),
            ("woke woke woke woke", "radical left", "breitbart.com"),
            ("progressive progressive", "lgbtq voting rights", "msnbc.com"),
            ("tax cuts", "climate change", "nypost.com"),
        ];
        for _ in 0..20 {
            for (title, body, source) in cases {
                let assessment = scorer.assess(title, body, source);
                assert!((0.0..=100.0).contains(&assessment.bias_score));
                assert!((0.0..=1.0).contains(&assessment.confidence));
            }
        }
    }
}
