use crate::Generator;
use burrow_core::ShortCode;
use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

/// Lower-case letters and the digits 1-9.
///
/// `0` is left out so it cannot be mistaken for `o`.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz123456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("code length must be greater than zero")]
    ZeroLength,
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
    #[error("alphabet must be ASCII")]
    NonAsciiAlphabet,
    #[error("alphabet contains duplicate character '{0}'")]
    DuplicateCharacter(char),
}

/// Draws fixed-length codes uniformly at random from an alphabet.
///
/// Every call is an independent draw from the thread-local RNG, so the
/// generator itself holds no mutable state and can be shared freely.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    alphabet: Vec<u8>,
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator over [`DEFAULT_ALPHABET`].
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        Self::with_alphabet(length, DEFAULT_ALPHABET)
    }

    /// Creates a generator over a custom alphabet.
    pub fn with_alphabet(length: usize, alphabet: &str) -> Result<Self, GeneratorError> {
        if length == 0 {
            return Err(GeneratorError::ZeroLength);
        }
        if alphabet.is_empty() {
            return Err(GeneratorError::EmptyAlphabet);
        }
        if !alphabet.is_ascii() {
            return Err(GeneratorError::NonAsciiAlphabet);
        }

        let mut seen = HashSet::new();
        for c in alphabet.chars() {
            if !seen.insert(c) {
                return Err(GeneratorError::DuplicateCharacter(c));
            }
        }

        Ok(Self {
            alphabet: alphabet.as_bytes().to_vec(),
            length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_codes_of_configured_length() {
        let generator = RandomGenerator::new(6).unwrap();

        for _ in 0..100 {
            assert_eq!(generator.generate().as_str().len(), 6);
        }
    }

    #[test]
    fn only_uses_alphabet_characters() {
        let generator = RandomGenerator::new(8).unwrap();

        for _ in 0..100 {
            let code = generator.generate();
            assert!(code.as_str().chars().all(|c| DEFAULT_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn default_alphabet_excludes_zero() {
        assert!(!DEFAULT_ALPHABET.contains('0'));
        assert!(DEFAULT_ALPHABET.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn custom_alphabet() {
        let generator = RandomGenerator::with_alphabet(4, "ab").unwrap();

        let code = generator.generate();
        assert!(code.as_str().chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn single_character_alphabet_is_deterministic() {
        let generator = RandomGenerator::with_alphabet(5, "z").unwrap();

        assert_eq!(generator.generate().as_str(), "zzzzz");
    }

    #[test]
    fn draws_are_independent() {
        let generator = RandomGenerator::new(10).unwrap();

        let codes: HashSet<String> = (0..1000)
            .map(|_| generator.generate().as_str().to_string())
            .collect();
        // 35^10 possible codes; a repeat in 1000 draws would point at shared state.
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn rejects_invalid_settings() {
        assert_eq!(
            RandomGenerator::new(0).unwrap_err(),
            GeneratorError::ZeroLength
        );
        assert_eq!(
            RandomGenerator::with_alphabet(6, "").unwrap_err(),
            GeneratorError::EmptyAlphabet
        );
        assert_eq!(
            RandomGenerator::with_alphabet(6, "abcé").unwrap_err(),
            GeneratorError::NonAsciiAlphabet
        );
        assert_eq!(
            RandomGenerator::with_alphabet(6, "abca").unwrap_err(),
            GeneratorError::DuplicateCharacter('a')
        );
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
