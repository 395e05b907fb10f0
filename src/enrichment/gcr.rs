//! Global collateralization ratio.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

use crate::models::parse_decimal;

/// Compute the global collateralization ratio from raw fixed-point amounts.
///
/// Collateral and token amounts are scaled down by their respective decimals
/// before dividing collateral by tokens outstanding. Zero tokens outstanding
/// yields a zero ratio; missing decimals or malformed amounts are faults for
/// the caller to absorb.
pub fn calc_gcr(
    total_position_collateral: Option<&str>,
    total_tokens_outstanding: Option<&str>,
    collateral_decimals: Option<u32>,
    token_decimals: Option<u32>,
) -> Result<Decimal> {
    let collateral_decimals = collateral_decimals.context("requires collateral decimals")?;
    let token_decimals = token_decimals.context("requires token decimals")?;

    let collateral = scale_down(
        parse_decimal(total_position_collateral.unwrap_or("0"))?,
        collateral_decimals,
    )?;
    let tokens = scale_down(
        parse_decimal(total_tokens_outstanding.unwrap_or("0"))?,
        token_decimals,
    )?;

    if tokens.is_zero() {
        return Ok(Decimal::ZERO);
    }
    collateral
        .checked_div(tokens)
        .ok_or_else(|| anyhow!("collateralization ratio overflowed"))
}

fn scale_down(value: Decimal, decimals: u32) -> Result<Decimal> {
    let mut scaled = value;
    scaled
        .set_scale(value.scale() + decimals)
        .map_err(|err| anyhow!("cannot scale by {decimals} decimals: {err}"))?;
    Ok(scaled)
}
