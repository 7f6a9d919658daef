//! GitHub account name validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::RoastError;

const MAX_USERNAME_LEN: usize = 39;

// Hyphen-separated alphanumeric segments: no leading, trailing or doubled hyphen.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]+(?:-[A-Za-z0-9]+)*$").expect("username pattern is valid")
});

/// A username that has passed validation. Only constructible through [`Username::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, RoastError> {
        if raw.is_empty() {
            return Err(RoastError::Validation(
                "O nome de usuário do GitHub é obrigatório".to_string(),
            ));
        }

        if raw.len() > MAX_USERNAME_LEN || !USERNAME_RE.is_match(raw) {
            return Err(RoastError::Validation(
                "Nome de usuário do GitHub inválido".to_string(),
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Accept a pasted profile link as well as a bare name.
pub fn normalize_username(input: &str) -> String {
    input
        .trim()
        .replace("https://github.com/", "")
        .replace('/', "")
}
