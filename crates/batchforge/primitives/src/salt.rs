use std::fmt;

use alloy_primitives::B256;
use thiserror::Error;

/// CREATE2 salt input, either a human-readable tag or an explicit 32-byte
/// word.
///
/// Text salts are UTF-8 bytes zero-padded on the right to 32 bytes, so the
/// same tag always maps to the same word across runs and machines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Salt {
    Text(String),
    Word(B256),
}

#[derive(Debug, Error)]
pub enum SaltError {
    #[error("salt {0:?} is longer than 32 bytes")]
    TooLong(String),
}

impl Salt {
    pub fn to_word(&self) -> Result<B256, SaltError> {
        match self {
            Self::Text(text) => {
                let bytes = text.as_bytes();
                if bytes.len() > 32 {
                    return Err(SaltError::TooLong(text.clone()));
                }
                Ok(B256::right_padding_from(bytes))
            }
            Self::Word(word) => Ok(*word),
        }
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Word(word) => write!(f, "{word}"),
        }
    }
}

impl From<&str> for Salt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<B256> for Salt {
    fn from(word: B256) -> Self {
        Self::Word(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_salt_is_right_padded() {
        let word = Salt::from("abc").to_word().unwrap();
        assert_eq!(&word[..3], b"abc");
        assert!(word[3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn text_salt_is_deterministic() {
        assert_eq!(
            Salt::from("abc").to_word().unwrap(),
            Salt::from("abc").to_word().unwrap()
        );
    }

    #[test]
    fn overlong_text_salt_is_rejected() {
        let salt = Salt::from("this tag is much longer than thirty-two bytes");
        assert!(matches!(salt.to_word(), Err(SaltError::TooLong(_))));
    }

    #[test]
    fn word_salt_passes_through() {
        let word = B256::repeat_byte(0x11);
        assert_eq!(Salt::from(word).to_word().unwrap(), word);
    }
}
