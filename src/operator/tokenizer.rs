//! # Word Tokenizer & Frequency Distribution
//!
//! Pure, network-free text processing for the operator:
//!
//! 1. **Sentence splitting**: break the transcript after `.`, `?` and `!`
//!    unless the period belongs to an abbreviation or an initial.
//! 2. **Word tokenization**: Penn Treebank conventions per sentence. Clitics
//!    are split off (`don't` → `do n't`, `it's` → `it 's`), punctuation becomes
//!    its own token, and numbers like `3.50` or `1,000` stay whole.
//! 3. **Counting**: lowercase every token and count occurrences.
//!
//! ## Rule Compilation:
//! The regular expressions are compiled once per process, on first use, and
//! shared by every invocation afterwards. Re-initialization never happens.
//!
//! ## Example:
//! ```text
//! "Hello world. Hello again!"
//!   → ["Hello", "world", ".", "Hello", "again", "!"]
//!   → {"hello": 2, "world": 1, ".": 1, "again": 1, "!": 1}
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Words that end with a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd", "co", "corp",
    "dept", "approx", "fig", "gen", "gov", "sen", "rep", "lt", "col", "capt", "sgt", "mt",
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Capitalized words that open a new sentence after a lone letter and a
/// period ("Plan B. We left.") rather than continue a name ("J. Smith").
const SENTENCE_STARTERS: &[&str] = &[
    "a", "after", "also", "an", "and", "but", "finally", "first", "he", "her", "his", "how",
    "however", "i", "if", "in", "it", "its", "let", "my", "next", "no", "now", "oh", "ok",
    "okay", "on", "our", "please", "she", "so", "still", "thanks", "that", "the", "their",
    "then", "there", "these", "they", "this", "those", "we", "well", "what", "when", "where",
    "who", "why", "yes", "you",
];

/// Characters that may trail sentence-final punctuation and still belong to
/// the same sentence (`He left.")`).
fn is_closing(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '}' | '>' | '»' | '”' | '’')
}

/// Whether `next_word` starts a new sentence after the single letter
/// `letter` and a period.
fn starts_sentence(letter: char, next_word: &str) -> bool {
    let next = next_word.trim_matches(|c: char| !c.is_alphanumeric());
    if !next.starts_with(char::is_uppercase) {
        return false;
    }
    // The pronoun "I" is far more common than an "I." initial
    letter == 'I' || SENTENCE_STARTERS.contains(&next.to_lowercase().as_str())
}

/// Whether a period right after `prefix` is part of a word rather than the
/// end of a sentence. `next_word` is the word following the period.
fn is_non_terminal_period(prefix: &str, next_word: &str) -> bool {
    let word = prefix
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    if word.is_empty() {
        return false;
    }

    // Initials ("J. Smith") and dotted abbreviations ("U.S.", "e.g.")
    let mut chars = word.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if first.is_alphabetic() {
            return !starts_sentence(first, next_word);
        }
    }
    if word.contains('.') {
        return true;
    }

    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

/// Split text into sentences.
///
/// A boundary follows a run of `.`, `?` or `!` (plus any closing quotes or
/// brackets) that is followed by whitespace, unless the run starts with a
/// period that belongs to an abbreviation or initial. The returned slices are
/// trimmed and never empty.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '?' | '!') {
            continue;
        }

        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if matches!(next, '.' | '?' | '!') || is_closing(next) {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        match chars.peek() {
            Some(&(_, next)) if next.is_whitespace() => {}
            _ => continue,
        }

        let next_word = text[end..].split_whitespace().next().unwrap_or("");
        if ch == '.' && is_non_terminal_period(&text[start..idx], next_word) {
            continue;
        }

        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = end;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

fn rule(pattern: &str, replacement: &'static str) -> (Regex, &'static str) {
    // Patterns are literals in this file; a failure here is a programming error
    // caught by the unit tests.
    (Regex::new(pattern).expect("invalid tokenizer pattern"), replacement)
}

/// Compiled Treebank rule set.
///
/// Obtain the process-wide instance through [`WordTokenizer::shared`].
pub struct WordTokenizer {
    starting_quotes: Vec<(Regex, &'static str)>,
    lone_apostrophe: Regex,
    punctuation: Vec<(Regex, &'static str)>,
    brackets: (Regex, &'static str),
    double_dashes: (Regex, &'static str),
    ending_quotes: Vec<(Regex, &'static str)>,
    contractions: Vec<(Regex, &'static str)>,
}

static SHARED_TOKENIZER: Lazy<WordTokenizer> = Lazy::new(|| {
    tracing::debug!("Compiling word tokenizer rules");
    WordTokenizer::new()
});

impl WordTokenizer {
    fn new() -> Self {
        Self {
            starting_quotes: vec![
                rule(r"([«“‘„]|`+)", " $1 "),
                rule(r#"^""#, "``"),
                rule(r"(``)", " $1 "),
                rule(r#"([ (\[{<])("|'')"#, "${1} `` "),
            ],
            lone_apostrophe: Regex::new(r"'(\w)\b").expect("invalid tokenizer pattern"),
            punctuation: vec![
                rule(r#"([^.])(\.)([\])}>"']*)\s*$"#, "$1 $2$3 "),
                rule(r"([:,])([^\d])", " $1 $2"),
                rule(r"([:,])$", " $1 "),
                rule(r"\.{2,}", " $0 "),
                rule(r"[;@#$%&]", " $0 "),
                rule(r"[?!]", " $0 "),
                rule(r"([^'])' ", "$1 ' "),
                rule(r"\*", " $0 "),
            ],
            brackets: rule(r"[\]\[(){}<>]", " $0 "),
            double_dashes: rule(r"--", " -- "),
            ending_quotes: vec![
                rule(r"([»”’])", " $1 "),
                rule(r"''", " '' "),
                rule(r#"""#, " '' "),
                rule(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "$1 $2 "),
                rule(r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "$1 $2 "),
            ],
            contractions: vec![
                rule(r"(?i)\b(can)(not)\b", " $1 $2 "),
                rule(r"(?i)\b(d)('ye)\b", " $1 $2 "),
                rule(r"(?i)\b(gim)(me)\b", " $1 $2 "),
                rule(r"(?i)\b(gon)(na)\b", " $1 $2 "),
                rule(r"(?i)\b(got)(ta)\b", " $1 $2 "),
                rule(r"(?i)\b(lem)(me)\b", " $1 $2 "),
                rule(r"(?i)\b(more)('n)\b", " $1 $2 "),
                rule(r"(?i)\b(wan)(na)\s", " $1 $2 "),
                rule(r"(?i) ('t)(is)\b", " $1 $2 "),
                rule(r"(?i) ('t)(was)\b", " $1 $2 "),
            ],
        }
    }

    /// The process-wide tokenizer, compiled on first use.
    pub fn shared() -> &'static WordTokenizer {
        &SHARED_TOKENIZER
    }

    /// Tokenize a full text: split into sentences, then into words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        split_sentences(text)
            .into_iter()
            .flat_map(|sentence| self.tokenize_sentence(sentence))
            .collect()
    }

    /// Tokenize one sentence with the Treebank rules.
    pub fn tokenize_sentence(&self, sentence: &str) -> Vec<String> {
        let mut text = sentence.to_string();

        for (regex, replacement) in &self.starting_quotes {
            text = regex.replace_all(&text, *replacement).into_owned();
        }

        // A quote opening a single-letter word ("'a") is a quote, not a clitic.
        text = self
            .lone_apostrophe
            .replace_all(&text, |caps: &Captures| {
                let letter = &caps[1];
                if matches!(letter, "m" | "t" | "s" | "d" | "n" | "M" | "T" | "S" | "D" | "N") {
                    caps[0].to_string()
                } else {
                    format!("' {}", letter)
                }
            })
            .into_owned();

        for (regex, replacement) in &self.punctuation {
            text = regex.replace_all(&text, *replacement).into_owned();
        }

        let (regex, replacement) = &self.brackets;
        text = regex.replace_all(&text, *replacement).into_owned();
        let (regex, replacement) = &self.double_dashes;
        text = regex.replace_all(&text, *replacement).into_owned();

        // Clitic rules expect a trailing space after every word.
        text = format!(" {} ", text);

        for (regex, replacement) in self.ending_quotes.iter().chain(&self.contractions) {
            text = regex.replace_all(&text, *replacement).into_owned();
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Tokenize text with the shared tokenizer.
pub fn word_tokenize(text: &str) -> Vec<String> {
    WordTokenizer::shared().tokenize(text)
}

/// Count of occurrences per distinct lowercase token.
///
/// Built once from a token sequence and never mutated afterwards. Serializes
/// as a plain JSON object (`{"word": count}`), keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyDistribution {
    counts: BTreeMap<String, u64>,
}

impl FrequencyDistribution {
    /// Lowercase every token and count it.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.as_ref().to_lowercase()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Occurrences of `word` (0 when absent). Lookup is exact; pass lowercase.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Total number of tokens counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// The `n` most frequent tokens, ties broken alphabetically.
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}

/// Tokenize a transcript and build its frequency distribution.
pub fn compute_word_frequency(transcript: &str) -> FrequencyDistribution {
    FrequencyDistribution::from_tokens(word_tokenize(transcript))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        word_tokenize(text)
    }

    #[test]
    fn test_hello_world_example() {
        assert_eq!(
            tokens("Hello world. Hello again!"),
            vec!["Hello", "world", ".", "Hello", "again", "!"]
        );

        let freq = compute_word_frequency("Hello world. Hello again!");
        assert_eq!(freq.get("hello"), 2);
        assert_eq!(freq.get("world"), 1);
        assert_eq!(freq.get("."), 1);
        assert_eq!(freq.get("again"), 1);
        assert_eq!(freq.get("!"), 1);
        assert_eq!(freq.len(), 5);
        assert_eq!(freq.total(), 6);
    }

    #[test]
    fn test_clitics_are_split() {
        assert_eq!(tokens("I don't know."), vec!["I", "do", "n't", "know", "."]);
        assert_eq!(tokens("It's raining."), vec!["It", "'s", "raining", "."]);
        assert_eq!(
            tokens("I'm gonna win."),
            vec!["I", "'m", "gon", "na", "win", "."]
        );
        assert_eq!(tokens("I cannot go."), vec!["I", "can", "not", "go", "."]);
    }

    #[test]
    fn test_numbers_and_symbols() {
        assert_eq!(
            tokens("Mr. Smith paid $3.50, right?"),
            vec!["Mr.", "Smith", "paid", "$", "3.50", ",", "right", "?"]
        );
        assert_eq!(tokens("About 1,000 people"), vec!["About", "1,000", "people"]);
    }

    #[test]
    fn test_quotes_are_normalized() {
        assert_eq!(
            tokens(r#"She said "hi" to me."#),
            vec!["She", "said", "``", "hi", "''", "to", "me", "."]
        );
    }

    #[test]
    fn test_ellipsis_and_brackets() {
        assert_eq!(tokens("Wait... what?"), vec!["Wait", "...", "what", "?"]);
        assert_eq!(
            tokens("Call me (maybe) now"),
            vec!["Call", "me", "(", "maybe", ")", "now"]
        );
    }

    #[test]
    fn test_sentence_splitting() {
        assert_eq!(
            split_sentences("Dr. Who arrived. J. Smith left! Done?"),
            vec!["Dr. Who arrived.", "J. Smith left!", "Done?"]
        );
        assert_eq!(split_sentences("Version 2.5 shipped"), vec!["Version 2.5 shipped"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_lone_letter_can_end_a_sentence() {
        assert_eq!(
            tokens("So am I. Then we left."),
            vec!["So", "am", "I", ".", "Then", "we", "left", "."]
        );
        assert_eq!(
            tokens("Plan B. We left."),
            vec!["Plan", "B", ".", "We", "left", "."]
        );
        assert_eq!(
            tokens("I got an A. Then I left."),
            vec!["I", "got", "an", "A", ".", "Then", "I", "left", "."]
        );

        let freq = compute_word_frequency("It was me and I. Then nothing.");
        assert_eq!(freq.get("i"), 1);
        assert_eq!(freq.get("i."), 0);
        assert_eq!(freq.get("."), 2);
    }

    #[test]
    fn test_initials_before_names_are_kept() {
        assert_eq!(
            split_sentences("We met J. Smith today. A. Jones came too."),
            vec!["We met J. Smith today.", "A. Jones came too."]
        );
        // Lowercase continuation is never a new sentence
        assert_eq!(split_sentences("Plan B. then more"), vec!["Plan B. then more"]);
    }

    #[test]
    fn test_case_insensitive_counts() {
        assert_eq!(
            compute_word_frequency("The The"),
            compute_word_frequency("the THE")
        );
        assert_eq!(compute_word_frequency("The The").get("the"), 2);
    }

    #[test]
    fn test_total_matches_token_count() {
        let transcripts = [
            "",
            "one",
            "So, we're here -- finally. Isn't it great? Yes: it is; 100%!",
            "Prof. Jones (the expert) said \"no\" twice... No, really.",
        ];
        for transcript in transcripts {
            let freq = compute_word_frequency(transcript);
            assert_eq!(freq.total() as usize, tokens(transcript).len(), "{}", transcript);
            assert!(freq.iter().all(|(word, _)| word == word.to_lowercase()));
        }
    }

    #[test]
    fn test_empty_transcript() {
        let freq = compute_word_frequency("");
        assert!(freq.is_empty());
        assert_eq!(serde_json::to_string(&freq).unwrap(), "{}");
    }

    #[test]
    fn test_most_common() {
        let freq = FrequencyDistribution::from_tokens(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(freq.most_common(2), vec![("b", 3), ("a", 2)]);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let freq = FrequencyDistribution::from_tokens(["Hi", "hi", "!"]);
        let json = serde_json::to_value(&freq).unwrap();
        assert_eq!(json, serde_json::json!({"hi": 2, "!": 1}));
    }
}
