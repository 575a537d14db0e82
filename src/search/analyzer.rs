use rust_stemmers::{Algorithm, Stemmer};
use std::fmt;

/// Lower-cases, folds `ё` into `е`, splits on anything that is not a letter or digit and
/// reduces Cyrillic words to their Snowball stem.
pub struct RussianAnalyzer {
    stemmer: Stemmer,
}

impl RussianAnalyzer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::Russian),
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| self.term(word))
            .collect()
    }

    fn term(&self, word: &str) -> String {
        let folded: String = word
            .to_lowercase()
            .chars()
            .map(|c| if c == 'ё' { 'е' } else { c })
            .collect();
        if folded.chars().any(is_cyrillic) {
            self.stemmer.stem(&folded).into_owned()
        } else {
            folded
        }
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

impl Default for RussianAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RussianAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RussianAnalyzer").finish()
    }
}
