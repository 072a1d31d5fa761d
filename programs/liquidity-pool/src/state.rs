use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

/// Durable record of one trading pair: configuration, custody addresses,
/// reserves and outstanding share supply.
///
/// A pool is addressed by the PDA of `["pool", token_a, token_b]`, so no two
/// pools can exist for the same ordered pair. The order is significant:
/// `(A, B)` and `(B, A)` are distinct addresses, and clients that want a
/// single pool per unordered pair must agree on a canonical mint order before
/// calling `create_pool`. A pool is created once, mutated by every liquidity
/// or swap operation, and never destroyed: burning the entire share supply
/// returns it to the empty state but leaves it addressable.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Pool {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub share_mint: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub share_supply: u64,
    pub fee_bps: u16,
    pub bump: u8,
}

impl Pool {
    pub const LEN: usize = 32 * 5 + 8 * 3 + 2 + 1;

    pub const SEED: &'static [u8] = b"pool";
    pub const VAULT_SEED: &'static [u8] = b"vault";
    pub const SHARE_MINT_SEED: &'static [u8] = b"shares";

    pub const SHARE_DECIMALS: u8 = 6;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token_a: Pubkey,
        token_b: Pubkey,
        vault_a: Pubkey,
        vault_b: Pubkey,
        share_mint: Pubkey,
        fee_bps: u16,
        bump: u8,
    ) -> Self {
        Self {
            token_a,
            token_b,
            vault_a,
            vault_b,
            share_mint,
            reserve_a: 0,
            reserve_b: 0,
            share_supply: 0,
            fee_bps,
            bump,
        }
    }

    /// A pool with no outstanding shares holds no reserves and cannot price
    /// a swap.
    pub fn is_empty(&self) -> bool {
        self.share_supply == 0
    }

    pub fn find_address(program_id: &Pubkey, token_a: &Pubkey, token_b: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[Self::SEED, token_a.as_ref(), token_b.as_ref()],
            program_id,
        )
    }

    pub fn find_vault_address(program_id: &Pubkey, pool: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Self::VAULT_SEED, pool.as_ref(), mint.as_ref()], program_id)
    }

    pub fn find_share_mint_address(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Self::SHARE_MINT_SEED, pool.as_ref()], program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_size_matches_len() {
        let pool = Pool::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            30,
            255,
        );
        assert_eq!(pool.try_to_vec().unwrap().len(), Pool::LEN);
    }

    #[test]
    fn addressing_is_order_sensitive() {
        let program_id = Pubkey::new_unique();
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        let (forward, _) = Pool::find_address(&program_id, &mint_a, &mint_b);
        let (reverse, _) = Pool::find_address(&program_id, &mint_b, &mint_a);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn empty_until_shares_are_minted() {
        let mut pool = Pool::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            30,
            255,
        );
        assert!(pool.is_empty());
        pool.share_supply = 1;
        assert!(!pool.is_empty());
    }
}
