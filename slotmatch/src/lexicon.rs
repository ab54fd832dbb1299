//! Lexicon-driven reference tagger.
//!
//! Real deployments plug their own part-of-speech tagger in through
//! [`Tagger`]. This one is small and deterministic: it looks words up in a
//! YAML lexicon and recognizes numbers, currencies, email addresses, person
//! names and `<day> <month>` dates, emitting every multi-word entity as a
//! single token.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Local, Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::trace;

use crate::error::{MatchError, Result};
use crate::token::{Tagger, Token, TokenSequence};

const DEFAULT_LEXICON: &str = include_str!("lexicon.yaml");

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?\d+(\.\d+)?$").unwrap());

static DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})(st|nd|rd|th)?$").unwrap());

/// Characters stripped from the end of a word before lookup.
const TRAILING_PUNCTUATION: &[char] = &[',', '.', '!', '?', ';', ':'];

/// Word lists used by [`LexiconTagger`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lexicon {
    /// Surface form -> categories; the first category is the primary tag.
    /// Keys are lowercase and may span several words.
    #[serde(default)]
    pub words: BTreeMap<String, Vec<String>>,

    /// Currency words and symbols.
    #[serde(default)]
    pub currencies: Vec<String>,

    /// Known person names.
    #[serde(default)]
    pub names: Vec<String>,
}

impl Lexicon {
    /// Parse a lexicon from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        let mut lexicon: Lexicon =
            serde_yaml::from_slice(data).map_err(|e| MatchError::Lexicon(e.to_string()))?;
        lexicon.normalize()?;
        Ok(lexicon)
    }

    /// The embedded default English lexicon.
    pub fn english() -> Result<Self> {
        Self::from_yaml(DEFAULT_LEXICON.as_bytes())
    }

    /// Add entries from `other`. Words already present are replaced.
    pub fn merge(&mut self, other: Lexicon) {
        self.words.extend(other.words);
        self.currencies.extend(other.currencies);
        self.names.extend(other.names);
    }

    fn normalize(&mut self) -> Result<()> {
        let mut words = BTreeMap::new();
        for (word, categories) in std::mem::take(&mut self.words) {
            if categories.is_empty() {
                return Err(MatchError::Lexicon(format!("word {:?} has no categories", word)));
            }
            let key = word.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            words.insert(key, categories);
        }
        self.words = words;
        self.currencies.iter_mut().for_each(|c| *c = c.to_lowercase());
        self.names.iter_mut().for_each(|n| *n = n.to_lowercase());
        Ok(())
    }
}

static ENGLISH: Lazy<Lexicon> =
    Lazy::new(|| Lexicon::english().expect("embedded lexicon is valid YAML"));

/// Tagger backed by a [`Lexicon`].
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    words: BTreeMap<String, Vec<String>>,
    currencies: HashSet<String>,
    names: HashSet<String>,
    /// Longest lexicon phrase, in words.
    max_phrase: usize,
    /// Year given to dates written without one.
    year: i32,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new(ENGLISH.clone())
    }
}

impl LexiconTagger {
    /// Create a tagger over `lexicon`, dating entities in the current year.
    pub fn new(lexicon: Lexicon) -> Self {
        let max_phrase = lexicon
            .words
            .keys()
            .map(|k| k.split(' ').count())
            .max()
            .unwrap_or(1);

        Self {
            words: lexicon
                .words
                .into_iter()
                .filter(|(_, cats)| !cats.is_empty())
                .collect(),
            currencies: lexicon.currencies.into_iter().collect(),
            names: lexicon.names.into_iter().collect(),
            max_phrase,
            year: Local::now().year(),
        }
    }

    /// Default English lexicon extended with `extra`.
    pub fn with_extra(extra: Lexicon) -> Self {
        let mut lexicon = ENGLISH.clone();
        lexicon.merge(extra);
        Self::new(lexicon)
    }

    /// Set the year used for dates.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    fn categories(&self, word: &str) -> Option<&Vec<String>> {
        self.words.get(&word.to_lowercase())
    }

    fn is_verb(&self, word: &str) -> bool {
        self.categories(word)
            .is_some_and(|cats| cats.iter().any(|c| c.eq_ignore_ascii_case("verb")))
    }

    /// Date token for `10th January` or `January 10` at the start of `words`.
    fn date_at(&self, words: &[&str]) -> Option<Token> {
        let [a, b, ..] = words else {
            return None;
        };
        let (day, month) = match (parse_day(a), b.parse::<Month>(), a.parse::<Month>(), parse_day(b)) {
            (Some(day), Ok(month), _, _) => (day, month),
            (_, _, Ok(month), Some(day)) => (day, month),
            _ => return None,
        };
        let date = NaiveDate::from_ymd_opt(self.year, month.number_from_month(), day)?;
        Some(
            Token::new(format!("{} {}", a, b), "Date")
                .with_category("Noun")
                .with_entity(date),
        )
    }

    /// Longest lexicon phrase of two or more words starting at `words[0]`.
    fn phrase_at(&self, words: &[&str]) -> Option<(Token, usize)> {
        let longest = self.max_phrase.min(words.len());
        (2..=longest).rev().find_map(|n| {
            let text = words[..n].join(" ");
            self.categories(&text)
                .map(|cats| (token_with(&text, cats), n))
        })
    }

    fn word(&self, word: &str, position: usize) -> Token {
        let lower = word.to_lowercase();

        if EMAIL.is_match(word) {
            return Token::new(word, "Email").with_category("Noun");
        }
        if NUMBER.is_match(word) {
            return Token::new(word, "Value").with_category("Number");
        }
        if self.currencies.contains(&lower) {
            return if word.chars().all(char::is_alphabetic) {
                Token::new(word, "Noun").with_category("Currency")
            } else {
                Token::new(word, "Currency")
            };
        }
        if let Some(cats) = self.words.get(&lower) {
            return token_with(word, cats);
        }
        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        if self.names.contains(&lower) || (capitalized && position > 0) {
            return Token::new(word, "Person").with_category("Noun");
        }
        Token::new(word, "Noun")
    }
}

impl Tagger for LexiconTagger {
    fn tokenize(&self, text: &str) -> TokenSequence {
        let words: Vec<&str> = text.split_whitespace().map(trim_word).collect();
        let mut tokens = Vec::with_capacity(words.len());
        let mut i = 0;

        while i < words.len() {
            let rest = &words[i..];

            let (token, used) = if let Some(token) = self.date_at(rest) {
                (token, 2)
            } else if let Some(found) = self.phrase_at(rest) {
                found
            } else if rest.len() >= 2 && rest[0].eq_ignore_ascii_case("to") && self.is_verb(rest[1]) {
                // infinitive: "to leave" is one verb
                (Token::new(format!("{} {}", rest[0], rest[1]), "Verb"), 2)
            } else {
                (self.word(rest[0], i), 1)
            };

            trace!(token = %token, "slotmatch: tagged");
            tokens.push(token);
            i += used;
        }

        tokens.into()
    }
}

/// Tokenize `text` with the default English lexicon.
pub fn parse_sentence(text: &str) -> TokenSequence {
    LexiconTagger::default().tokenize(text)
}

fn token_with(text: &str, categories: &[String]) -> Token {
    categories[1..]
        .iter()
        .fold(Token::new(text, categories[0].as_str()), |token, c| {
            token.with_category(c.as_str())
        })
}

fn trim_word(word: &str) -> &str {
    let trimmed = word.trim_end_matches(TRAILING_PUNCTUATION);
    if trimmed.is_empty() { word } else { trimmed }
}

fn parse_day(word: &str) -> Option<u32> {
    let caps = DAY.captures(word)?;
    caps[1].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SlotValue;

    fn tagger() -> LexiconTagger {
        LexiconTagger::default().with_year(2026)
    }

    fn texts(tokens: &TokenSequence) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_english_lexicon_loads() {
        let lexicon = Lexicon::english().unwrap();
        assert_eq!(lexicon.words["the"], vec!["Determiner"]);
        assert!(lexicon.currencies.contains(&"$".to_string()));
        assert!(lexicon.words.contains_key("ice cream"));
    }

    #[test]
    fn test_restaurant_sentence() {
        let tokens = tagger().tokenize("the check is 36 dollars we want to leave a tip of 5 $");
        assert_eq!(tokens.count(), 13);

        let head = tokens.head().unwrap();
        assert_eq!(head.text, "the");
        assert_eq!(head.tag, "Determiner");
        assert_eq!(head.categories.get("Determiner"), Some(&true));

        let check = tokens.at(1).unwrap();
        assert_eq!(check.text, "check");
        assert_eq!(check.tag, "Noun");
        assert!(check.is("noun"));

        assert!(tokens.at(3).unwrap().is("number"));
        assert!(tokens.at(4).unwrap().is("currency"));
        assert_eq!(tokens.at(7).unwrap().text, "to leave");
        assert!(tokens.at(7).unwrap().is("verb"));
        assert_eq!(tokens.at(12).unwrap().tag, "Currency");

        let tailed = tokens.tail();
        assert_eq!(tailed.count(), 12);
        assert_eq!(tailed.at(0).unwrap().text, "check");
    }

    #[test]
    fn test_email() {
        let tokens = tagger().tokenize("my email is guido.bellomo@gmail.com");
        assert_eq!(texts(&tokens), vec!["my", "email", "is", "guido.bellomo@gmail.com"]);
        assert!(tokens.at(3).unwrap().is("email"));
    }

    #[test]
    fn test_date_and_person() {
        let tokens = tagger().tokenize("I will call Jack on 10th January.");
        assert_eq!(texts(&tokens), vec!["I", "will", "call", "Jack", "on", "10th January"]);
        assert!(tokens.at(0).unwrap().is("pronoun"));
        assert!(tokens.at(3).unwrap().is("person"));

        let date = tokens.at(5).unwrap();
        assert!(date.is("date"));
        let expected = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(date.entity, Some(SlotValue::Date(expected)));

        let tokens = tagger().tokenize("meet Anna March 3rd");
        assert_eq!(tokens.at(2).unwrap().entity, Some(SlotValue::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap())));
    }

    #[test]
    fn test_invalid_date_is_not_merged() {
        let tokens = tagger().tokenize("on 31st February");
        assert_eq!(texts(&tokens), vec!["on", "31st", "February"]);
    }

    #[test]
    fn test_phrase() {
        let tokens = tagger().tokenize("two ice cream please");
        assert_eq!(texts(&tokens), vec!["two", "ice cream", "please"]);
        assert_eq!(tokens.at(1).unwrap().tag, "Noun");
    }

    #[test]
    fn test_extra_lexicon() {
        let extra = Lexicon::from_yaml(b"words:\n  Teal: [Adjective, Noun]\ncurrencies: [Francs]\n").unwrap();
        let tagger = LexiconTagger::with_extra(extra);
        let tokens = tagger.tokenize("a teal car costs 3 francs");
        assert!(tokens.at(1).unwrap().is("adjective"));
        assert!(tokens.at(5).unwrap().is("currency"));

        assert!(Lexicon::from_yaml(b"words:\n  bad: []\n").is_err());
        assert!(Lexicon::from_yaml(b"words: [oops").is_err());
    }
}
