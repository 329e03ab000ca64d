//! Short concept labels for session content.

use std::collections::{HashMap, HashSet};

/// Turns a content fragment into the short label used in objectives and activities.
pub trait ConceptExtractor {
    fn extract_label(&self, text: &str) -> String;
}

impl<F> ConceptExtractor for F
where
    F: Fn(&str) -> String,
{
    fn extract_label(&self, text: &str) -> String {
        self(text)
    }
}

const STOP_WORDS: &[&str] = &[
    "el", "la", "de", "que", "y", "a", "en", "un", "es", "se", "no", "te", "lo", "le", "da", "su",
    "por", "son", "con", "para", "al", "una", "ser", "las", "del", "los", "como", "pero", "sus",
    "hay", "está", "han", "si", "más", "me", "ya", "muy", "o", "este", "esta", "están", "puede",
    "nos", "todo", "tiene", "fue", "entre", "cuando", "hasta", "desde", "hacer", "cada", "porque",
    "sobre", "otros", "tanto", "tiempo", "donde", "mismo", "ahora", "después", "vida", "también",
    "sin", "años", "estado",
];

/// Words too generic to name a concept on their own.
const GENERIC_WORDS: &[&str] = &[
    "desarrollo",
    "semana",
    "proceso",
    "unidad",
    "etapa",
    "día",
    "generalidades",
    "introducción",
    "serie",
    "series",
    "forward",
    "fourier",
    "tema",
    "concepto",
    "parte",
    "presentación",
    "fundamentos",
    "aspectos",
];

/// Frequency-based n-gram extractor for Spanish course content.
///
/// Candidates are bigrams and trigrams of significant words plus the words
/// themselves; the most frequent candidate wins, earlier ones on ties.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: HashSet<String>,
    generic_words: HashSet<String>,
    min_word_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            generic_words: GENERIC_WORDS.iter().map(|w| w.to_string()).collect(),
            min_word_len: 4,
        }
    }
}

impl KeywordExtractor {
    pub fn with_generic_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    fn significant_words(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        cleaned
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.min_word_len && !self.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }

    fn is_generic(&self, word: &str) -> bool {
        self.generic_words.contains(word)
    }

    /// Ranked candidate concepts, most frequent first.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        let words = self.significant_words(text);
        let mut candidates: Vec<String> = Vec::new();

        for pair in words.windows(2) {
            if pair[0] != pair[1] && !pair.iter().any(|w| self.is_generic(w)) {
                candidates.push(pair.join(" "));
            }
        }
        for triple in words.windows(3) {
            let distinct = !(triple[0] == triple[1] && triple[1] == triple[2]);
            if distinct && !triple.iter().any(|w| self.is_generic(w)) {
                candidates.push(triple.join(" "));
            }
        }
        candidates.extend(words.iter().filter(|w| !self.is_generic(w)).cloned());

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for candidate in &candidates {
            let count = counts.entry(candidate.as_str()).or_insert(0);
            if *count == 0 {
                order.push(candidate.as_str());
            }
            *count += 1;
        }
        // stable sort keeps first-seen order among equal counts
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.into_iter().map(str::to_string).collect()
    }
}

impl ConceptExtractor for KeywordExtractor {
    fn extract_label(&self, text: &str) -> String {
        if let Some(best) = self.candidates(text).into_iter().next() {
            return best;
        }
        let words = self.significant_words(text);
        if !words.is_empty() {
            return words.into_iter().take(3).collect::<Vec<_>>().join(" ");
        }
        text.trim().to_string()
    }
}
