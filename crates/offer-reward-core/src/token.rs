//! Positional contract arguments and return values.
//!
//! The contract's binary encoding belongs to the ledger. At this boundary a
//! call carries an ordered list of [`Token`]s and every typed value converts
//! to and from a token through [`Tokenizable`].

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::Address;

/// A single dynamically typed contract value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Bool(bool),
    Uint(U256),
    Address(Address),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    /// Name of the token's type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Bool(_) => "bool",
            Token::Uint(_) => "uint",
            Token::Address(_) => "address",
            Token::String(_) => "string",
            Token::Bytes(_) => "bytes",
            Token::Array(_) => "array",
            Token::Tuple(_) => "tuple",
        }
    }

    pub fn uint(value: impl Into<U256>) -> Self {
        Token::Uint(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Token::String(value.into())
    }

    fn mismatch(&self, expected: &'static str) -> DecodeError {
        DecodeError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

/// Conversion between a Rust value and a [`Token`].
pub trait Tokenizable: Sized {
    fn from_token(token: Token) -> Result<Self, DecodeError>;

    fn into_token(self) -> Token;
}

impl Tokenizable for Token {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        Ok(token)
    }

    fn into_token(self) -> Token {
        self
    }
}

impl Tokenizable for bool {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::Bool(b) => Ok(b),
            other => Err(other.mismatch("bool")),
        }
    }

    fn into_token(self) -> Token {
        Token::Bool(self)
    }
}

impl Tokenizable for U256 {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::Uint(n) => Ok(n),
            other => Err(other.mismatch("uint")),
        }
    }

    fn into_token(self) -> Token {
        Token::Uint(self)
    }
}

impl Tokenizable for u64 {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        let n = U256::from_token(token)?;
        if n > U256::from(u64::MAX) {
            return Err(DecodeError::Overflow("u64"));
        }
        Ok(n.low_u64())
    }

    fn into_token(self) -> Token {
        Token::Uint(U256::from(self))
    }
}

impl Tokenizable for Address {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::Address(a) => Ok(a),
            other => Err(other.mismatch("address")),
        }
    }

    fn into_token(self) -> Token {
        Token::Address(self)
    }
}

impl Tokenizable for String {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    fn into_token(self) -> Token {
        Token::String(self)
    }
}

impl<T: Tokenizable> Tokenizable for Vec<T> {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::Array(items) => items.into_iter().map(T::from_token).collect(),
            other => Err(other.mismatch("array")),
        }
    }

    fn into_token(self) -> Token {
        Token::Array(self.into_iter().map(Tokenizable::into_token).collect())
    }
}

/// Sequential reader over positional tokens.
///
/// Used to project event arguments and tuple fields into typed structs.
#[derive(Debug)]
pub struct TokenReader {
    tokens: std::vec::IntoIter<Token>,
    position: usize,
    total: usize,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        let total = tokens.len();
        Self {
            tokens: tokens.into_iter(),
            position: 0,
            total,
        }
    }

    /// Read a tuple token's fields.
    pub fn from_tuple(token: Token) -> Result<Self, DecodeError> {
        match token {
            Token::Tuple(fields) => Ok(Self::new(fields)),
            other => Err(other.mismatch("tuple")),
        }
    }

    /// Decode the next positional value.
    pub fn next<T: Tokenizable>(&mut self) -> Result<T, DecodeError> {
        let token = self
            .tokens
            .next()
            .ok_or(DecodeError::MissingArgument(self.position))?;
        self.position += 1;
        T::from_token(token)
    }

    /// Ensure every token was consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.position != self.total {
            return Err(DecodeError::TrailingArguments {
                expected: self.position,
                found: self.total,
            });
        }
        Ok(())
    }
}

/// Decode a call result that returns exactly one value.
pub fn decode_single<T: Tokenizable>(tokens: Vec<Token>) -> Result<T, DecodeError> {
    let mut reader = TokenReader::new(tokens);
    let value = reader.next()?;
    reader.finish()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_rejects_overflow() {
        let token = Token::Uint(U256::from(u64::MAX) + 1);
        assert_eq!(u64::from_token(token), Err(DecodeError::Overflow("u64")));
    }

    #[test]
    fn test_type_mismatch_names_both_sides() {
        let err = String::from_token(Token::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                expected: "string",
                found: "bool"
            }
        );
    }

    #[test]
    fn test_vec_of_ids() {
        let token = vec![3u64, 1, 2].into_token();
        assert_eq!(Vec::<u64>::from_token(token).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn test_reader_reports_missing_and_trailing() {
        let mut reader = TokenReader::new(vec![Token::uint(1u64)]);
        assert_eq!(reader.next::<u64>().unwrap(), 1);
        assert_eq!(
            reader.next::<String>().unwrap_err(),
            DecodeError::MissingArgument(1)
        );

        let mut reader = TokenReader::new(vec![Token::uint(1u64), Token::Bool(false)]);
        reader.next::<u64>().unwrap();
        assert!(matches!(
            reader.finish(),
            Err(DecodeError::TrailingArguments { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_decode_single() {
        let value: String = decode_single(vec![Token::string("t")]).unwrap();
        assert_eq!(value, "t");
        assert!(decode_single::<String>(vec![]).is_err());
    }
}
