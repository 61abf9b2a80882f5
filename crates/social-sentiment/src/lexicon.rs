use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "profit", "growth", "beat", "upgrade",
    "outperform", "strong", "positive", "rise", "increase", "breakthrough",
    "success", "exceed", "momentum", "buy", "recommend", "optimistic", "record",
    "rebound", "robust", "upside", "moon", "winner", "love", "great",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "loss", "fall", "plunge", "crash", "miss", "downgrade",
    "underperform", "weak", "negative", "drop", "decrease", "concern", "risk",
    "fail", "disappoint", "slump", "sell", "warning", "pessimistic", "fear",
    "trouble", "bubble", "overvalued", "scam", "dump", "bad",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly", "barely",
    "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

/// Word-list polarity scorer. Scores a text into [-1, 1]; a preceding
/// negation word within the window flips a hit's polarity.
pub struct LexiconAnalyzer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negations: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    pub fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?'))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return 0.0;
        }

        let negated = |idx: usize| {
            let start = idx.saturating_sub(NEGATION_WINDOW);
            words[start..idx].iter().any(|w| self.negations.contains(w))
        };

        let mut hits = 0usize;
        let mut total = 0.0f64;
        for (idx, word) in words.iter().enumerate() {
            let polarity = if self.positive.contains(word) {
                1.0
            } else if self.negative.contains(word) {
                -1.0
            } else {
                continue;
            };
            hits += 1;
            total += if negated(idx) { -polarity } else { polarity };
        }

        if hits == 0 {
            return 0.0;
        }
        (total / hits as f64).clamp(-1.0, 1.0)
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
