use solana_program::program_error::ProgramError;

use crate::error::PoolError;

/// Fee rates are expressed in basis points (1/10000).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Pure constant-product math (x * y = k).
///
/// Nothing in here touches an account. The processor reads the pool, asks
/// this module for the resulting quantities, and only then performs custody
/// transfers and commits the new reserves. Every multiplication is widened to
/// u128 and every step is checked, so an unrepresentable result fails closed
/// with `ArithmeticOverflow` instead of wrapping.
pub struct ConstantProductCurve;

impl ConstantProductCurve {
    /// Calculate swap output for a fee-adjusted input.
    ///
    /// Formula: amount_out = (effective_in * reserve_out) / (reserve_in + effective_in)
    /// Where: effective_in = amount_in * (10000 - fee_bps) / 10000
    ///
    /// The fee is charged by pricing only the effective input while the full
    /// `amount_in` later enters the reserves, so fees accrue to existing
    /// liquidity providers.
    pub fn swap_output(
        amount_in: u64,
        reserve_in: u64,
        reserve_out: u64,
        fee_bps: u16,
    ) -> Result<u64, ProgramError> {
        if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
            return Err(PoolError::InsufficientLiquidity.into());
        }
        if fee_bps as u64 >= BPS_DENOMINATOR {
            return Err(PoolError::InvalidFeeRate.into());
        }

        let effective_in = (amount_in as u128)
            .checked_mul((BPS_DENOMINATOR - fee_bps as u64) as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(BPS_DENOMINATOR as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let numerator = effective_in
            .checked_mul(reserve_out as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let denominator = (reserve_in as u128)
            .checked_add(effective_in)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let amount_out = numerator
            .checked_div(denominator)
            .ok_or(PoolError::ArithmeticOverflow)?;

        // Never allow a swap to drain the output reserve
        if amount_out >= reserve_out as u128 {
            return Err(PoolError::InsufficientLiquidity.into());
        }

        Ok(amount_out as u64)
    }

    /// Calculate the consumed amounts and shares minted for a deposit of at
    /// most (max_a, max_b).
    ///
    /// First deposit into an empty pool: both amounts are consumed in full
    /// (the pool has no ratio to preserve yet) and exactly `max_a` shares are
    /// minted. Active pool: the consumed amounts are clipped to the current
    /// ratio, so the excess of the over-supplied side is never transferred,
    /// and shares minted are the smaller proportional contribution:
    ///
    ///   used_a = min(max_a, max_b * reserve_a / reserve_b)
    ///   used_b = min(max_b, max_a * reserve_b / reserve_a)
    ///   minted = min(used_a * supply / reserve_a, used_b * supply / reserve_b)
    ///
    /// Returns (used_a, used_b, minted).
    pub fn deposit_amounts(
        max_a: u64,
        max_b: u64,
        reserve_a: u64,
        reserve_b: u64,
        share_supply: u64,
    ) -> Result<(u64, u64, u64), ProgramError> {
        if share_supply == 0 {
            if max_a == 0 || max_b == 0 {
                return Err(PoolError::ZeroLiquidityMinted.into());
            }
            return Ok((max_a, max_b, max_a));
        }

        if reserve_a == 0 || reserve_b == 0 {
            // Supply without reserves means the pool record is corrupt
            return Err(PoolError::InsufficientLiquidity.into());
        }

        let proportional_a = (max_b as u128)
            .checked_mul(reserve_a as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(reserve_b as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let proportional_b = (max_a as u128)
            .checked_mul(reserve_b as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(reserve_a as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let used_a = (max_a as u128).min(proportional_a) as u64;
        let used_b = (max_b as u128).min(proportional_b) as u64;

        let shares_from_a = (used_a as u128)
            .checked_mul(share_supply as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(reserve_a as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let shares_from_b = (used_b as u128)
            .checked_mul(share_supply as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(reserve_b as u128)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let minted = shares_from_a.min(shares_from_b);
        if minted == 0 {
            return Err(PoolError::ZeroLiquidityMinted.into());
        }
        let minted = u64::try_from(minted).map_err(|_| PoolError::ArithmeticOverflow)?;

        Ok((used_a, used_b, minted))
    }

    /// Calculate the proportional withdrawal for burning `shares`.
    ///
    /// Formula:
    /// - out_a = shares * reserve_a / share_supply
    /// - out_b = shares * reserve_b / share_supply
    pub fn withdraw_amounts(
        shares: u64,
        reserve_a: u64,
        reserve_b: u64,
        share_supply: u64,
    ) -> Result<(u64, u64), ProgramError> {
        if shares == 0 || shares > share_supply {
            return Err(PoolError::InsufficientShares.into());
        }

        let out_a = (shares as u128)
            .checked_mul(reserve_a as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(share_supply as u128)
            .ok_or(PoolError::ArithmeticOverflow)? as u64;
        let out_b = (shares as u128)
            .checked_mul(reserve_b as u128)
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(share_supply as u128)
            .ok_or(PoolError::ArithmeticOverflow)? as u64;

        Ok((out_a, out_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_code(e: ProgramError) -> u32 {
        match e {
            ProgramError::Custom(code) => code,
            other => panic!("expected custom error, got {:?}", other),
        }
    }

    #[test]
    fn swap_output_reference_vector() {
        // 100M/100M reserves, 30 bps fee, 10M in:
        // effective_in = 9_970_000
        // out = 9_970_000 * 100M / 109_970_000 = 9_066_108
        let out =
            ConstantProductCurve::swap_output(10_000_000, 100_000_000, 100_000_000, 30).unwrap();
        assert_eq!(out, 9_066_108);
    }

    #[test]
    fn swap_preserves_invariant() {
        let (mut reserve_in, mut reserve_out) = (100_000_000u64, 100_000_000u64);
        let k_before = reserve_in as u128 * reserve_out as u128;

        for amount_in in [1_000u64, 500_000, 10_000_000, 3] {
            let out =
                ConstantProductCurve::swap_output(amount_in, reserve_in, reserve_out, 30).unwrap();
            reserve_in += amount_in;
            reserve_out -= out;
            let k_after = reserve_in as u128 * reserve_out as u128;
            assert!(k_after > k_before, "k must strictly grow with a fee");
        }
    }

    #[test]
    fn swap_invariant_holds_with_zero_fee() {
        let out = ConstantProductCurve::swap_output(10_000_000, 100_000_000, 100_000_000, 0)
            .unwrap();
        let k_before = 100_000_000u128 * 100_000_000u128;
        let k_after = 110_000_000u128 * (100_000_000 - out as u128);
        // Floor rounding keeps k from ever decreasing
        assert!(k_after >= k_before);
    }

    #[test]
    fn swap_output_monotonic_in_amount_in() {
        let mut last = 0;
        for amount_in in [1_000u64, 10_000, 100_000, 1_000_000, 10_000_000] {
            let out =
                ConstantProductCurve::swap_output(amount_in, 100_000_000, 100_000_000, 30)
                    .unwrap();
            assert!(out > last);
            last = out;
        }
    }

    #[test]
    fn swap_output_decreasing_in_reserve_in() {
        let mut last = u64::MAX;
        for reserve_in in [50_000_000u64, 100_000_000, 200_000_000, 400_000_000] {
            let out = ConstantProductCurve::swap_output(10_000_000, reserve_in, 100_000_000, 30)
                .unwrap();
            assert!(out < last);
            last = out;
        }
    }

    #[test]
    fn swap_zero_amount_rejected() {
        let err = ConstantProductCurve::swap_output(0, 100_000_000, 100_000_000, 30).unwrap_err();
        assert_eq!(err_code(err), PoolError::InsufficientLiquidity as u32);
    }

    #[test]
    fn swap_never_drains_reserve() {
        // Even an absurdly large trade against a dust reserve leaves at
        // least one unit on the output side
        for (amount_in, reserve_out) in [(u64::MAX, 1u64), (u64::MAX, 1_000), (1 << 40, 2)] {
            let out = ConstantProductCurve::swap_output(amount_in, 1, reserve_out, 0).unwrap();
            assert!(out < reserve_out);
        }
    }

    #[test]
    fn swap_extreme_values_do_not_wrap() {
        // u64::MAX on both sides stays representable in u128 throughout
        let out = ConstantProductCurve::swap_output(u64::MAX, u64::MAX, u64::MAX, 30).unwrap();
        assert!(out < u64::MAX);
    }

    #[test]
    fn first_deposit_mints_amount_a() {
        let (used_a, used_b, minted) =
            ConstantProductCurve::deposit_amounts(100_000_000, 100_000_000, 0, 0, 0).unwrap();
        assert_eq!(used_a, 100_000_000);
        assert_eq!(used_b, 100_000_000);
        assert_eq!(minted, 100_000_000);
    }

    #[test]
    fn first_deposit_any_ratio_mints_amount_a() {
        let (used_a, used_b, minted) =
            ConstantProductCurve::deposit_amounts(40_000_000, 90_000_000, 0, 0, 0).unwrap();
        assert_eq!(used_a, 40_000_000);
        assert_eq!(used_b, 90_000_000);
        assert_eq!(minted, 40_000_000);
    }

    #[test]
    fn first_deposit_needs_both_sides() {
        let err = ConstantProductCurve::deposit_amounts(100, 0, 0, 0, 0).unwrap_err();
        assert_eq!(err_code(err), PoolError::ZeroLiquidityMinted as u32);
        let err = ConstantProductCurve::deposit_amounts(0, 100, 0, 0, 0).unwrap_err();
        assert_eq!(err_code(err), PoolError::ZeroLiquidityMinted as u32);
    }

    #[test]
    fn proportional_deposit_consumed_in_full() {
        let (used_a, used_b, minted) = ConstantProductCurve::deposit_amounts(
            50_000_000,
            50_000_000,
            100_000_000,
            100_000_000,
            100_000_000,
        )
        .unwrap();
        assert_eq!(used_a, 50_000_000);
        assert_eq!(used_b, 50_000_000);
        assert_eq!(minted, 50_000_000);
    }

    #[test]
    fn unequal_deposit_clipped_to_pool_ratio() {
        // Pool at 1:1; side A over-supplied, so only 10M of A is consumed
        let (used_a, used_b, minted) = ConstantProductCurve::deposit_amounts(
            20_000_000,
            10_000_000,
            100_000_000,
            100_000_000,
            100_000_000,
        )
        .unwrap();
        assert_eq!(used_a, 10_000_000);
        assert_eq!(used_b, 10_000_000);
        assert_eq!(minted, 10_000_000);
    }

    #[test]
    fn unequal_deposit_skewed_pool() {
        // Pool at 2:1 (200M A / 100M B), supply 100M
        let (used_a, used_b, minted) = ConstantProductCurve::deposit_amounts(
            30_000_000,
            10_000_000,
            200_000_000,
            100_000_000,
            100_000_000,
        )
        .unwrap();
        // B binds: 10M of B pairs with 20M of A
        assert_eq!(used_a, 20_000_000);
        assert_eq!(used_b, 10_000_000);
        // 20M * 100M / 200M = 10M from A; 10M * 100M / 100M = 10M from B
        assert_eq!(minted, 10_000_000);
    }

    #[test]
    fn dust_deposit_mints_nothing() {
        // Huge reserves, 1-unit deposit floors to zero shares
        let err = ConstantProductCurve::deposit_amounts(1, 1, u64::MAX, u64::MAX, 1_000).unwrap_err();
        assert_eq!(err_code(err), PoolError::ZeroLiquidityMinted as u32);
    }

    #[test]
    fn withdraw_half_the_supply() {
        let (out_a, out_b) = ConstantProductCurve::withdraw_amounts(
            50_000_000,
            100_000_000,
            100_000_000,
            100_000_000,
        )
        .unwrap();
        assert_eq!(out_a, 50_000_000);
        assert_eq!(out_b, 50_000_000);
    }

    #[test]
    fn withdraw_skewed_reserves() {
        let (out_a, out_b) = ConstantProductCurve::withdraw_amounts(
            50_000_000,
            100_000_000,
            200_000_000,
            100_000_000,
        )
        .unwrap();
        assert_eq!(out_a, 50_000_000);
        assert_eq!(out_b, 100_000_000);
    }

    #[test]
    fn withdraw_rejects_zero_and_oversized_burns() {
        let err =
            ConstantProductCurve::withdraw_amounts(0, 100, 100, 100).unwrap_err();
        assert_eq!(err_code(err), PoolError::InsufficientShares as u32);
        let err =
            ConstantProductCurve::withdraw_amounts(101, 100, 100, 100).unwrap_err();
        assert_eq!(err_code(err), PoolError::InsufficientShares as u32);
    }

    #[test]
    fn deposit_withdraw_round_trip() {
        // Add then remove the same shares with no intervening operations:
        // the returned amounts match the deposit up to 1 unit of floor loss.
        let (reserve_a, reserve_b, supply) = (100_000_000u64, 300_000_000u64, 100_000_000u64);
        let (used_a, used_b, minted) = ConstantProductCurve::deposit_amounts(
            7_777_777,
            23_333_331,
            reserve_a,
            reserve_b,
            supply,
        )
        .unwrap();

        let (out_a, out_b) = ConstantProductCurve::withdraw_amounts(
            minted,
            reserve_a + used_a,
            reserve_b + used_b,
            supply + minted,
        )
        .unwrap();

        assert!(used_a - out_a <= 1, "lost {} of A", used_a - out_a);
        assert!(used_b - out_b <= 1, "lost {} of B", used_b - out_b);
    }

    #[test]
    fn minted_shares_never_dilute_existing_providers() {
        // Share value (reserves per share) must not decrease for any deposit
        for (max_a, max_b) in [(1u64, 1_000_000u64), (999_999, 1), (123_456, 654_321)] {
            let (reserve_a, supply) = (10_000_000u64, 10_000_000u64);
            let reserve_b = 5_000_000u64;
            match ConstantProductCurve::deposit_amounts(max_a, max_b, reserve_a, reserve_b, supply)
            {
                Ok((used_a, used_b, minted)) => {
                    let before = reserve_a as u128 * (supply + minted) as u128;
                    let after = (reserve_a + used_a) as u128 * supply as u128;
                    assert!(after >= before);
                    let before = reserve_b as u128 * (supply + minted) as u128;
                    let after = (reserve_b + used_b) as u128 * supply as u128;
                    assert!(after >= before);
                }
                Err(e) => {
                    assert_eq!(err_code(e), PoolError::ZeroLiquidityMinted as u32);
                }
            }
        }
    }
}
