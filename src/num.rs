use alloy::primitives::U256;
use fastnum::{
    UD256, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Number of fractional digits of the payment token base unit.
pub const TOKEN_DECIMALS: u8 = 18;

/// Fee percentages are fixed-point integers scaled by 10^8, so raw 10^10
/// equals 100% and a 10-digit shift turns a raw percentage into a fraction
/// of one.
const PERCENT_FRACTION_DIGITS: u8 = 10;

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub(crate) fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Converter for payment-token amounts (18 fractional digits).
    pub fn token() -> Self {
        Self::new(TOKEN_DECIMALS)
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }
}

/// Share of `total_fee` owed to a recipient whose percentage is the raw
/// fixed-point `raw_percent` (10^8 scale).
pub fn fee_share(total_fee: UD256, raw_percent: U256) -> UD256 {
    total_fee * Converter::new(PERCENT_FRACTION_DIGITS).from_unsigned(raw_percent)
}

#[cfg(test)]
mod tests {
    use fastnum::udec256;

    use super::*;

    fn eth(value: u64) -> U256 {
        U256::from(value) * U256::from(10).pow(U256::from(18))
    }

    #[test]
    fn test_token_converter_scales_by_wad() {
        let token = Converter::token();
        assert_eq!(token.from_unsigned(eth(100)), udec256!(100));
        assert_eq!(
            token.from_unsigned(U256::from(1)),
            udec256!(0.000000000000000001)
        );
        assert_eq!(
            token.from_unsigned(U256::from(1_234_567_890u64)),
            udec256!(0.00000000123456789)
        );
        assert_eq!(token.from_unsigned(U256::ZERO), udec256!(0));
    }

    #[test]
    fn test_fee_share_of_raw_percent() {
        // 60% and 40%, raw 10^8 scale
        let platform = U256::from(60u64) * U256::from(10).pow(U256::from(8));
        let partner = U256::from(40u64) * U256::from(10).pow(U256::from(8));
        assert_eq!(fee_share(udec256!(10), platform), udec256!(6));
        assert_eq!(fee_share(udec256!(10), partner), udec256!(4));
    }

    #[test]
    fn test_fee_share_with_zero_percent_is_zero() {
        assert_eq!(fee_share(udec256!(123.456), U256::ZERO), udec256!(0));
    }

    #[test]
    fn test_fee_share_with_full_percent_is_identity() {
        let full = U256::from(10).pow(U256::from(10));
        assert_eq!(fee_share(udec256!(123.456), full), udec256!(123.456));
    }
}
