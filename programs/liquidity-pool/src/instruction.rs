use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::state::Pool;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum PoolInstruction {
    /// Create an empty pool for a pair of mints
    /// Accounts:
    /// 0. `[signer, writable]` Payer / pool creator
    /// 1. `[writable]` Pool PDA
    /// 2. `[]` Token A mint
    /// 3. `[]` Token B mint
    /// 4. `[writable]` Vault A PDA
    /// 5. `[writable]` Vault B PDA
    /// 6. `[writable]` Share mint PDA
    /// 7. `[]` System program
    /// 8. `[]` Token program
    /// 9. `[]` Rent sysvar
    CreatePool { fee_bps: u16 },

    /// Deposit up to (max_amount_a, max_amount_b) and receive shares
    /// Accounts:
    /// 0. `[signer]` Liquidity provider
    /// 1. `[writable]` Pool PDA
    /// 2. `[writable]` Vault A
    /// 3. `[writable]` Vault B
    /// 4. `[writable]` Share mint
    /// 5. `[writable]` Provider token A account
    /// 6. `[writable]` Provider token B account
    /// 7. `[writable]` Provider share account
    /// 8. `[]` Token program
    AddLiquidity { max_amount_a: u64, max_amount_b: u64 },

    /// Burn shares and withdraw the proportional reserves
    /// Accounts:
    /// 0. `[signer]` Liquidity provider
    /// 1. `[writable]` Pool PDA
    /// 2. `[writable]` Vault A
    /// 3. `[writable]` Vault B
    /// 4. `[writable]` Share mint
    /// 5. `[writable]` Provider token A account
    /// 6. `[writable]` Provider token B account
    /// 7. `[writable]` Provider share account
    /// 8. `[]` Token program
    RemoveLiquidity { shares: u64 },

    /// Trade against the pool; direction is set by which vault is passed
    /// as the input vault
    /// Accounts:
    /// 0. `[signer]` Trader
    /// 1. `[writable]` Pool PDA
    /// 2. `[writable]` Input vault
    /// 3. `[writable]` Output vault
    /// 4. `[writable]` Trader input token account
    /// 5. `[writable]` Trader output token account
    /// 6. `[]` Token program
    Swap { amount_in: u64, min_amount_out: u64 },
}

impl PoolInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        match variant {
            0 => Self::try_from_slice(rest).map_err(|_| ProgramError::InvalidInstructionData),
            1 => Self::try_from_slice(rest).map_err(|_| ProgramError::InvalidInstructionData),
            2 => Self::try_from_slice(rest).map_err(|_| ProgramError::InvalidInstructionData),
            3 => Self::try_from_slice(rest).map_err(|_| ProgramError::InvalidInstructionData),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        match self {
            Self::CreatePool { .. } => buf.push(0),
            Self::AddLiquidity { .. } => buf.push(1),
            Self::RemoveLiquidity { .. } => buf.push(2),
            Self::Swap { .. } => buf.push(3),
        }
        buf.extend_from_slice(&self.try_to_vec().unwrap());
        buf
    }
}

// Helper functions to create instructions
pub fn create_pool(
    program_id: &Pubkey,
    payer: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    fee_bps: u16,
) -> Instruction {
    let (pool, _) = Pool::find_address(program_id, token_a, token_b);
    let (vault_a, _) = Pool::find_vault_address(program_id, &pool, token_a);
    let (vault_b, _) = Pool::find_vault_address(program_id, &pool, token_b);
    let (share_mint, _) = Pool::find_share_mint_address(program_id, &pool);

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(pool, false),
        AccountMeta::new_readonly(*token_a, false),
        AccountMeta::new_readonly(*token_b, false),
        AccountMeta::new(vault_a, false),
        AccountMeta::new(vault_b, false),
        AccountMeta::new(share_mint, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(solana_program::sysvar::rent::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: PoolInstruction::CreatePool { fee_bps }.pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn add_liquidity(
    program_id: &Pubkey,
    provider: &Pubkey,
    pool: &Pubkey,
    vault_a: &Pubkey,
    vault_b: &Pubkey,
    share_mint: &Pubkey,
    provider_a: &Pubkey,
    provider_b: &Pubkey,
    provider_shares: &Pubkey,
    max_amount_a: u64,
    max_amount_b: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: liquidity_accounts(
            provider,
            pool,
            vault_a,
            vault_b,
            share_mint,
            provider_a,
            provider_b,
            provider_shares,
        ),
        data: PoolInstruction::AddLiquidity {
            max_amount_a,
            max_amount_b,
        }
        .pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn remove_liquidity(
    program_id: &Pubkey,
    provider: &Pubkey,
    pool: &Pubkey,
    vault_a: &Pubkey,
    vault_b: &Pubkey,
    share_mint: &Pubkey,
    provider_a: &Pubkey,
    provider_b: &Pubkey,
    provider_shares: &Pubkey,
    shares: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: liquidity_accounts(
            provider,
            pool,
            vault_a,
            vault_b,
            share_mint,
            provider_a,
            provider_b,
            provider_shares,
        ),
        data: PoolInstruction::RemoveLiquidity { shares }.pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn swap(
    program_id: &Pubkey,
    trader: &Pubkey,
    pool: &Pubkey,
    vault_in: &Pubkey,
    vault_out: &Pubkey,
    trader_in: &Pubkey,
    trader_out: &Pubkey,
    amount_in: u64,
    min_amount_out: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*trader, true),
        AccountMeta::new(*pool, false),
        AccountMeta::new(*vault_in, false),
        AccountMeta::new(*vault_out, false),
        AccountMeta::new(*trader_in, false),
        AccountMeta::new(*trader_out, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: PoolInstruction::Swap {
            amount_in,
            min_amount_out,
        }
        .pack(),
    }
}

#[allow(clippy::too_many_arguments)]
fn liquidity_accounts(
    provider: &Pubkey,
    pool: &Pubkey,
    vault_a: &Pubkey,
    vault_b: &Pubkey,
    share_mint: &Pubkey,
    provider_a: &Pubkey,
    provider_b: &Pubkey,
    provider_shares: &Pubkey,
) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new_readonly(*provider, true),
        AccountMeta::new(*pool, false),
        AccountMeta::new(*vault_a, false),
        AccountMeta::new(*vault_b, false),
        AccountMeta::new(*share_mint, false),
        AccountMeta::new(*provider_a, false),
        AccountMeta::new(*provider_b, false),
        AccountMeta::new(*provider_shares, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ]
}
