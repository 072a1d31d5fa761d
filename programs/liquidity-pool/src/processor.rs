use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};

use crate::{
    curve::{ConstantProductCurve, BPS_DENOMINATOR},
    custody,
    error::PoolError,
    instruction::PoolInstruction,
    state::Pool,
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = PoolInstruction::unpack(instruction_data)?;

        match instruction {
            PoolInstruction::CreatePool { fee_bps } => {
                msg!("Instruction: CreatePool");
                Self::process_create_pool(program_id, accounts, fee_bps)
            }
            PoolInstruction::AddLiquidity {
                max_amount_a,
                max_amount_b,
            } => {
                msg!("Instruction: AddLiquidity");
                Self::process_add_liquidity(program_id, accounts, max_amount_a, max_amount_b)
            }
            PoolInstruction::RemoveLiquidity { shares } => {
                msg!("Instruction: RemoveLiquidity");
                Self::process_remove_liquidity(program_id, accounts, shares)
            }
            PoolInstruction::Swap {
                amount_in,
                min_amount_out,
            } => {
                msg!("Instruction: Swap");
                Self::process_swap(program_id, accounts, amount_in, min_amount_out)
            }
        }
    }

    /// Create an empty pool plus its custody accounts: two vaults and the
    /// share mint, all owned by the pool PDA. Fails before any account is
    /// created if the pair already has a pool or the fee is out of range.
    fn process_create_pool(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        fee_bps: u16,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let mint_a_info = next_account_info(account_info_iter)?;
        let mint_b_info = next_account_info(account_info_iter)?;
        let vault_a_info = next_account_info(account_info_iter)?;
        let vault_b_info = next_account_info(account_info_iter)?;
        let share_mint_info = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let rent_sysvar = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        // Rejected rather than clamped: a 100%-fee pool could never trade
        if fee_bps as u64 >= BPS_DENOMINATOR {
            return Err(PoolError::InvalidFeeRate.into());
        }
        if mint_a_info.key == mint_b_info.key {
            return Err(PoolError::IdenticalMints.into());
        }

        let (pool_key, pool_bump) =
            Pool::find_address(program_id, mint_a_info.key, mint_b_info.key);
        if pool_key != *pool_info.key {
            return Err(PoolError::InvalidPda.into());
        }
        // The PDA is the pair's unique slot; an initialized account there
        // means the pool already exists. Lamports alone are not a pool:
        // anyone can donate to the address before creation.
        if !pool_info.data_is_empty() || pool_info.owner == program_id {
            return Err(PoolError::DuplicatePool.into());
        }

        let (vault_a_key, vault_a_bump) =
            Pool::find_vault_address(program_id, &pool_key, mint_a_info.key);
        let (vault_b_key, vault_b_bump) =
            Pool::find_vault_address(program_id, &pool_key, mint_b_info.key);
        let (share_mint_key, share_mint_bump) =
            Pool::find_share_mint_address(program_id, &pool_key);
        if vault_a_key != *vault_a_info.key
            || vault_b_key != *vault_b_info.key
            || share_mint_key != *share_mint_info.key
        {
            return Err(PoolError::InvalidPda.into());
        }

        let rent = &Rent::from_account_info(rent_sysvar)?;

        custody::create_pda_account(
            payer_info,
            pool_info,
            system_program,
            program_id,
            Pool::LEN,
            rent,
            &[
                Pool::SEED,
                mint_a_info.key.as_ref(),
                mint_b_info.key.as_ref(),
                &[pool_bump],
            ],
        )?;

        custody::create_pda_account(
            payer_info,
            vault_a_info,
            system_program,
            &spl_token::id(),
            spl_token::state::Account::LEN,
            rent,
            &[
                Pool::VAULT_SEED,
                pool_key.as_ref(),
                mint_a_info.key.as_ref(),
                &[vault_a_bump],
            ],
        )?;
        custody::initialize_vault(token_program, vault_a_info, mint_a_info, &pool_key)?;

        custody::create_pda_account(
            payer_info,
            vault_b_info,
            system_program,
            &spl_token::id(),
            spl_token::state::Account::LEN,
            rent,
            &[
                Pool::VAULT_SEED,
                pool_key.as_ref(),
                mint_b_info.key.as_ref(),
                &[vault_b_bump],
            ],
        )?;
        custody::initialize_vault(token_program, vault_b_info, mint_b_info, &pool_key)?;

        custody::create_pda_account(
            payer_info,
            share_mint_info,
            system_program,
            &spl_token::id(),
            spl_token::state::Mint::LEN,
            rent,
            &[Pool::SHARE_MINT_SEED, pool_key.as_ref(), &[share_mint_bump]],
        )?;
        custody::initialize_share_mint(
            token_program,
            share_mint_info,
            &pool_key,
            Pool::SHARE_DECIMALS,
        )?;

        let pool = Pool::new(
            *mint_a_info.key,
            *mint_b_info.key,
            vault_a_key,
            vault_b_key,
            share_mint_key,
            fee_bps,
            pool_bump,
        );
        pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

        msg!("Pool created with fee {} bps", fee_bps);
        Ok(())
    }

    /// Deposit up to (max_a, max_b), clipped to the pool ratio, and mint the
    /// proportional shares. The first deposit sets the price and mints
    /// exactly max_a shares.
    fn process_add_liquidity(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        max_amount_a: u64,
        max_amount_b: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let provider_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let vault_a_info = next_account_info(account_info_iter)?;
        let vault_b_info = next_account_info(account_info_iter)?;
        let share_mint_info = next_account_info(account_info_iter)?;
        let provider_a_info = next_account_info(account_info_iter)?;
        let provider_b_info = next_account_info(account_info_iter)?;
        let provider_shares_info = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !provider_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut pool = Self::load_pool(program_id, pool_info)?;
        Self::check_pool_accounts(&pool, vault_a_info, vault_b_info, share_mint_info)?;

        let (used_a, used_b, minted) = ConstantProductCurve::deposit_amounts(
            max_amount_a,
            max_amount_b,
            pool.reserve_a,
            pool.reserve_b,
            pool.share_supply,
        )?;

        // All amounts are settled; move custody and then commit the state
        custody::transfer_tokens(token_program, provider_a_info, vault_a_info, provider_info, used_a)?;
        custody::transfer_tokens(token_program, provider_b_info, vault_b_info, provider_info, used_b)?;

        let bump = [pool.bump];
        let seeds = Self::pool_seeds(&pool, &bump);
        custody::mint_shares(
            token_program,
            share_mint_info,
            provider_shares_info,
            pool_info,
            &seeds,
            minted,
        )?;

        pool.reserve_a = pool
            .reserve_a
            .checked_add(used_a)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.reserve_b = pool
            .reserve_b
            .checked_add(used_b)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.share_supply = pool
            .share_supply
            .checked_add(minted)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

        msg!("Deposited {} / {}, minted {} shares", used_a, used_b, minted);
        Ok(())
    }

    /// Burn shares and pay out the proportional slice of both reserves.
    fn process_remove_liquidity(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        shares: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let provider_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let vault_a_info = next_account_info(account_info_iter)?;
        let vault_b_info = next_account_info(account_info_iter)?;
        let share_mint_info = next_account_info(account_info_iter)?;
        let provider_a_info = next_account_info(account_info_iter)?;
        let provider_b_info = next_account_info(account_info_iter)?;
        let provider_shares_info = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !provider_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut pool = Self::load_pool(program_id, pool_info)?;
        Self::check_pool_accounts(&pool, vault_a_info, vault_b_info, share_mint_info)?;

        // The provider must hold the shares being burned; checked here so
        // the failure surfaces before any custody movement
        if custody::token_balance(provider_shares_info)? < shares {
            return Err(PoolError::InsufficientShares.into());
        }
        let (out_a, out_b) = ConstantProductCurve::withdraw_amounts(
            shares,
            pool.reserve_a,
            pool.reserve_b,
            pool.share_supply,
        )?;

        custody::burn_shares(
            token_program,
            provider_shares_info,
            share_mint_info,
            provider_info,
            shares,
        )?;

        let bump = [pool.bump];
        let seeds = Self::pool_seeds(&pool, &bump);
        custody::transfer_pool_tokens(
            token_program,
            vault_a_info,
            provider_a_info,
            pool_info,
            &seeds,
            out_a,
        )?;
        custody::transfer_pool_tokens(
            token_program,
            vault_b_info,
            provider_b_info,
            pool_info,
            &seeds,
            out_b,
        )?;

        pool.reserve_a = pool
            .reserve_a
            .checked_sub(out_a)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.reserve_b = pool
            .reserve_b
            .checked_sub(out_b)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.share_supply = pool
            .share_supply
            .checked_sub(shares)
            .ok_or(PoolError::ArithmeticOverflow)?;
        pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

        msg!("Burned {} shares for {} / {}", shares, out_a, out_b);
        Ok(())
    }

    /// Trade against the pool. The slippage bound is checked against the
    /// output computed from the reserves read in this same instruction,
    /// strictly before any custody transfer.
    fn process_swap(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount_in: u64,
        min_amount_out: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let trader_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let vault_in_info = next_account_info(account_info_iter)?;
        let vault_out_info = next_account_info(account_info_iter)?;
        let trader_in_info = next_account_info(account_info_iter)?;
        let trader_out_info = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !trader_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut pool = Self::load_pool(program_id, pool_info)?;

        let a_to_b = if *vault_in_info.key == pool.vault_a && *vault_out_info.key == pool.vault_b {
            true
        } else if *vault_in_info.key == pool.vault_b && *vault_out_info.key == pool.vault_a {
            false
        } else {
            return Err(PoolError::VaultMismatch.into());
        };

        if pool.is_empty() {
            return Err(PoolError::PoolEmpty.into());
        }

        let (reserve_in, reserve_out) = if a_to_b {
            (pool.reserve_a, pool.reserve_b)
        } else {
            (pool.reserve_b, pool.reserve_a)
        };

        let amount_out =
            ConstantProductCurve::swap_output(amount_in, reserve_in, reserve_out, pool.fee_bps)?;
        if amount_out < min_amount_out {
            return Err(PoolError::SlippageExceeded.into());
        }

        // The full input, fee included, enters the pool; the fee accrues to
        // providers by inflating reserves relative to share supply
        custody::transfer_tokens(token_program, trader_in_info, vault_in_info, trader_info, amount_in)?;

        let bump = [pool.bump];
        let seeds = Self::pool_seeds(&pool, &bump);
        custody::transfer_pool_tokens(
            token_program,
            vault_out_info,
            trader_out_info,
            pool_info,
            &seeds,
            amount_out,
        )?;

        let (reserve_in, reserve_out) = (
            reserve_in
                .checked_add(amount_in)
                .ok_or(PoolError::ArithmeticOverflow)?,
            reserve_out
                .checked_sub(amount_out)
                .ok_or(PoolError::ArithmeticOverflow)?,
        );
        if a_to_b {
            pool.reserve_a = reserve_in;
            pool.reserve_b = reserve_out;
        } else {
            pool.reserve_b = reserve_in;
            pool.reserve_a = reserve_out;
        }
        pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

        msg!("Swapped {} in for {} out", amount_in, amount_out);
        Ok(())
    }

    fn load_pool(program_id: &Pubkey, pool_info: &AccountInfo) -> Result<Pool, ProgramError> {
        if pool_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }
        let pool = Pool::try_from_slice(&pool_info.data.borrow())?;
        Ok(pool)
    }

    fn check_pool_accounts(
        pool: &Pool,
        vault_a_info: &AccountInfo,
        vault_b_info: &AccountInfo,
        share_mint_info: &AccountInfo,
    ) -> ProgramResult {
        if *vault_a_info.key != pool.vault_a
            || *vault_b_info.key != pool.vault_b
            || *share_mint_info.key != pool.share_mint
        {
            return Err(PoolError::VaultMismatch.into());
        }
        Ok(())
    }

    fn pool_seeds<'a>(pool: &'a Pool, bump: &'a [u8; 1]) -> [&'a [u8]; 4] {
        [
            Pool::SEED,
            pool.token_a.as_ref(),
            pool.token_b.as_ref(),
            bump,
        ]
    }
}
