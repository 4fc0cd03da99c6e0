//! Argument normalization shared by the operations.

use alloy::primitives::Address;

use crate::error::SdkError;

/// Value accepted wherever an account or contract address is expected.
///
/// Strings are validated: hex of proper length, and EIP-55 checksum when
/// mixed-case. All-lowercase and all-uppercase strings are normalized.
pub trait AddressLike {
    fn to_address(&self, func: &'static str) -> Result<Address, SdkError>;
}

impl AddressLike for Address {
    fn to_address(&self, _func: &'static str) -> Result<Address, SdkError> {
        Ok(*self)
    }
}

impl AddressLike for &Address {
    fn to_address(&self, _func: &'static str) -> Result<Address, SdkError> {
        Ok(**self)
    }
}

impl AddressLike for &str {
    fn to_address(&self, func: &'static str) -> Result<Address, SdkError> {
        parse_address(func, self)
    }
}

impl AddressLike for String {
    fn to_address(&self, func: &'static str) -> Result<Address, SdkError> {
        parse_address(func, self)
    }
}

/// Parses address string on behalf of operation `func`.
pub fn parse_address(func: &'static str, value: &str) -> Result<Address, SdkError> {
    let invalid = |reason: &str| SdkError::InvalidAddress {
        func,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != 40 {
        return Err(invalid("expected 20 bytes hex string"));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("not a hex string"));
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None)
            .map_err(|_| invalid("bad address checksum"))
    } else {
        hex.to_ascii_lowercase()
            .parse::<Address>()
            .map_err(|e| invalid(&e.to_string()))
    }
}

/// One or many market symbols.
///
/// A single symbol is wrapped into a one-element list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markets(Vec<String>);

impl Markets {
    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Markets {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Markets {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Markets {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for Markets {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Markets {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Markets {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}
