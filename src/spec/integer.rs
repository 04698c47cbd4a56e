//! Representation of integers in JSONPath query strings
//!
//! JSONPath restricts the integers used as array indices and slice bounds to the I-JSON
//! interoperable range (see [RFC 7493][ijson]).
//!
//! [ijson]: https://www.rfc-editor.org/rfc/rfc7493#section-2.2

use std::{num::ParseIntError, str::FromStr};

/// An integer within the interoperable range
///
/// The value must be within the range [-(2<sup>53</sup>)+1, (2<sup>53</sup>)-1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Integer(i64);

/// The maximum allowed value, 2^53 - 1
const MAX: i64 = 9_007_199_254_740_992 - 1;
/// The minimum allowed value, -(2^53) + 1
const MIN: i64 = -9_007_199_254_740_992 + 1;

#[inline]
fn check_i64_is_valid(v: i64) -> bool {
    (MIN..=MAX).contains(&v)
}

impl Integer {
    fn try_new(value: i64) -> Result<Self, IntegerError> {
        if check_i64_is_valid(value) {
            Ok(Self(value))
        } else {
            Err(IntegerError::OutOfBounds)
        }
    }

    /// Get the value as a plain `i64`
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Integer {
    type Error = IntegerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl FromStr for Integer {
    type Err = IntegerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map_err(Into::into).and_then(Self::try_new)
    }
}

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.0.eq(other)
    }
}

/// An error for the [`Integer`] type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IntegerError {
    /// The provided value was outside the valid range [-(2**53)+1, (2**53)-1]
    #[error("the provided integer was outside the interoperable range [-(2^53)+1, (2^53)-1]")]
    OutOfBounds,
    /// Integer parsing error
    #[error(transparent)]
    Parse(#[from] ParseIntError),
}

#[cfg(test)]
mod tests {
    use super::Integer;

    #[test]
    fn boundaries() {
        assert!("9007199254740991".parse::<Integer>().is_ok());
        assert!("-9007199254740991".parse::<Integer>().is_ok());
        assert!("9007199254740992".parse::<Integer>().is_err());
        assert!("-9007199254740992".parse::<Integer>().is_err());
    }
}
