use std::collections::HashSet;

/// Common Spanish function words, dropped when stop-word filtering is on.
pub const SPANISH_STOP_WORDS: &[&str] = &[
    "al","ante","bajo","con","como","contra","cual","cuando","de","del","desde","donde","el","ella","ellos","en","entre","era","es","esa","ese","eso","esta","este","esto","fue","ha","hay","hasta","la","las","le","les","lo","los","mas","me","mi","muy","ni","no","nos","o","para","pero","por","que","se","sea","sin","sobre","son","su","sus","tambien","te","tiene","un","una","uno","unos","y","ya",
];

/// Lower-casing word splitter: a token is a run of two or more alphanumeric
/// (or `_`) characters, optionally filtered through a stop-word set.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new() -> Self { Self::default() }

    pub fn spanish() -> Self { Self::with_stop_words(SPANISH_STOP_WORDS.iter().copied()) }

    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { stop_words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect() }
    }

    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|raw| raw.chars().nth(1).is_some())
            .map(str::to_lowercase)
            .filter(move |token| !self.stop_words.contains(token))
    }
}
