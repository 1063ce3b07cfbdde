use entities::chain::{Amount, DecimalString, AMOUNT_DECIMALS};
use ethers::utils::{format_ether, parse_ether};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("'{0}' is not a valid decimal amount")]
    InvalidDecimal(String),
}

/// Renders an amount with 18 fractional digits, dropping trailing zeros
/// but keeping at least one: `10^18` -> `"1.0"`, `0` -> `"0.0"`.
pub fn format_amount(amount: Amount) -> DecimalString {
    let full = format_ether(amount);
    if !full.contains('.') {
        return format!("{full}.0");
    }
    let trimmed = full.trim_end_matches('0');

    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

/// Parses a decimal string produced by [`format_amount`] (or typed by a user)
/// back into the smallest denomination. Digits beyond the 18th fractional place
/// are rejected rather than rounded.
pub fn parse_amount(decimal: &str) -> Result<Amount, AmountError> {
    let decimal = decimal.trim();
    let well_formed = !decimal.is_empty()
        && decimal.chars().all(|c| c.is_ascii_digit() || c == '.')
        && decimal.chars().filter(|c| *c == '.').count() <= 1
        && decimal.chars().any(|c| c.is_ascii_digit());
    let fraction_len = decimal.split_once('.').map(|(_, fraction)| fraction.len()).unwrap_or(0);

    if !well_formed || fraction_len > AMOUNT_DECIMALS as usize {
        return Err(AmountError::InvalidDecimal(decimal.to_string()));
    }

    parse_ether(decimal).map_err(|_| AmountError::InvalidDecimal(decimal.to_string()))
}
