use alloy::primitives::U256;
use fastnum::{
    UD256, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Converts on-chain mantissa into decimal.
    ///
    /// `N` must be at least 4 (256 bits) for the conversion to be lossless
    /// for any `U256` value.
    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    /// Converts decimal into on-chain mantissa.
    ///
    /// The conversion is exact or fails, values are never rounded.
    pub fn to_unsigned<const N: usize>(
        &self,
        value: UnsignedDecimal<N>,
    ) -> Result<U256, ConversionError> {
        if !value.is_finite() {
            return Err(ConversionError::NotFinite);
        }
        if value.reduce().fractional_digits_count() > self.decimals as i16 {
            return Err(ConversionError::Precision(self.decimals as u8));
        }
        if value > self.from_unsigned::<N>(U256::MAX) {
            return Err(ConversionError::Overflow);
        }
        let rescaled = value.rescale(self.decimals as i16);
        Ok(U256::from_le_slice(
            rescaled.digits().to_radix_le(256).as_slice(),
        ))
    }
}

/// Decimal that has no exact on-chain mantissa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount has more than {0} decimal places")]
    Precision(u8),
    #[error("amount does not fit into 256 bits")]
    Overflow,
}

/// Amount passed to a state-changing operation.
#[derive(Clone, Copy, derive_more::Debug, PartialEq)]
pub enum Amount {
    /// Human-readable amount, scaled by the token decimals before sending.
    #[debug("{_0}")]
    Units(UD256),
    /// Raw on-chain amount, sent as is.
    Mantissa(U256),
    /// Whole outstanding balance, only meaningful for repayments.
    Max,
}

impl Amount {
    /// On-chain representation of the amount for a token with given decimals.
    pub fn to_mantissa(&self, decimals: u8) -> Result<U256, ConversionError> {
        match self {
            Amount::Units(units) => Converter::new(decimals).to_unsigned(*units),
            Amount::Mantissa(mantissa) => Ok(*mantissa),
            Amount::Max => Ok(U256::MAX),
        }
    }
}

impl From<UD256> for Amount {
    fn from(value: UD256) -> Self {
        Amount::Units(value)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Amount::Mantissa(value)
    }
}

/// Scales integer amount of whole tokens into the on-chain mantissa.
pub fn scale(amount: u64, decimals: u8) -> U256 {
    U256::from(amount) * U256::from(10).pow(U256::from(decimals))
}
