//! Token extraction from normalized transcripts.
//!
//! Patterns are compiled once using `once_cell::sync::Lazy`. All functions
//! expect text that is already lower-cased (see [`normalize`]).

use crate::models::{Gender, Race};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:[.,]\d+)?").expect("number pattern is valid")
});

static AFFIRMATIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:sí|si|yes|claro|vale|por supuesto)\b").expect("affirmative pattern is valid")
});

static CANCEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:cancelar|cancela|olvídalo|olvidalo|nuevo cálculo|nuevo calculo)\b")
        .expect("cancel pattern is valid")
});

static BARE_NO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s¡!]*no[\s.!?,]*$").expect("bare no pattern is valid")
});

// Male synonyms are checked first; the first match wins.
const MALE_WORDS: &[&str] = &["hombre", "masculino", "varón"];
const FEMALE_WORDS: &[&str] = &["mujer", "femenino", "fémina"];
const BLACK_RACE_WORDS: &[&str] = &["afroamericano", "afroamericana", "raza negra"];

pub fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

/// All decimal numbers in order of appearance. A decimal comma is read as a
/// decimal point. Digits glued to a word, as in "co2", are not numbers.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .collect()
}

pub fn extract_gender(text: &str) -> Option<Gender> {
    if MALE_WORDS.iter().any(|w| text.contains(w)) {
        return Some(Gender::Male);
    }
    if FEMALE_WORDS.iter().any(|w| text.contains(w)) {
        return Some(Gender::Female);
    }
    None
}

pub fn extract_race(text: &str) -> Option<Race> {
    if BLACK_RACE_WORDS.iter().any(|w| text.contains(w)) {
        Some(Race::Black)
    } else {
        None
    }
}

pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE_PATTERN.is_match(text)
}

/// Replies that abandon the calculation in progress.
pub fn is_cancellation(text: &str) -> bool {
    BARE_NO_PATTERN.is_match(text) || CANCEL_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_numbers_in_order() {
        assert_eq!(extract_numbers("sodio 140 glucosa 100"), vec![140.0, 100.0]);
        assert_eq!(extract_numbers("tfg creatinina 1.2 edad 65"), vec![1.2, 65.0]);
    }

    #[test]
    fn test_extract_numbers_decimal_comma() {
        assert_eq!(extract_numbers("peso ideal mujer 1,65 metros"), vec![1.65]);
        assert_eq!(extract_numbers("creatinina 0,9"), vec![0.9]);
    }

    #[test]
    fn test_extract_numbers_skips_co2() {
        assert_eq!(extract_numbers("co2 actual 50 co2 objetivo 40"), vec![50.0, 40.0]);
    }

    #[test]
    fn test_extract_numbers_none() {
        assert!(extract_numbers("fórmula de winter").is_empty());
    }

    #[test]
    fn test_extract_gender() {
        assert_eq!(extract_gender("paciente mujer de 65 años"), Some(Gender::Female));
        assert_eq!(extract_gender("varón de 1.80"), Some(Gender::Male));
        assert_eq!(extract_gender("sexo femenino"), Some(Gender::Female));
        assert_eq!(extract_gender("paciente de 65 años"), None);
    }

    #[test]
    fn test_extract_gender_male_checked_first() {
        assert_eq!(extract_gender("mujer u hombre"), Some(Gender::Male));
    }

    #[test]
    fn test_extract_race() {
        assert_eq!(extract_race("paciente afroamericano"), Some(Race::Black));
        assert_eq!(extract_race("paciente de 40 años"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Peso Ideal HOMBRE 1.74 "), "peso ideal hombre 1.74");
    }

    #[test]
    fn test_affirmative_and_cancellation() {
        assert!(is_affirmative("sí, por favor"));
        assert!(is_affirmative("si"));
        assert!(!is_affirmative("osmolaridad sin datos"));
        assert!(!is_affirmative("no gracias"));

        assert!(is_cancellation("no"));
        assert!(is_cancellation("mejor cancela"));
        assert!(is_cancellation("nuevo cálculo"));
        assert!(!is_cancellation("no sé, 65"));
    }

    #[test]
    fn test_bare_no_with_punctuation_cancels() {
        assert!(is_cancellation("no."));
        assert!(is_cancellation(" no! "));
        assert!(is_cancellation("¡No!"));
        assert!(!is_cancellation("no, 1.2"));
        assert!(!is_cancellation("nombre"));
    }
}
