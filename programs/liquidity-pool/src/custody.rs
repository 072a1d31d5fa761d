use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
};
use spl_token::instruction as token_instruction;

/// CPI wrappers over the system and SPL Token programs.
///
/// All custody is delegated here: the processor decides what moves, this
/// module asks the runtime to move it. Every call is atomic and
/// authorization-checked by the callee program; the pool signs for its own
/// custody accounts through its PDA seeds.

/// Create a rent-exempt program-derived account.
///
/// The derived address is public, so anyone may have transferred lamports to
/// it before the account exists. `create_account` refuses funded addresses,
/// so that case falls back to topping up the balance and then
/// `allocate` + `assign`, which accept an existing system account.
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    new_account: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    owner: &Pubkey,
    space: usize,
    rent: &Rent,
    seeds: &[&[u8]],
) -> ProgramResult {
    let required_lamports = rent.minimum_balance(space);

    if new_account.lamports() > 0 {
        let shortfall = required_lamports.saturating_sub(new_account.lamports());
        if shortfall > 0 {
            invoke(
                &system_instruction::transfer(payer.key, new_account.key, shortfall),
                &[payer.clone(), new_account.clone(), system_program.clone()],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(new_account.key, space as u64),
            &[new_account.clone(), system_program.clone()],
            &[seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(new_account.key, owner),
            &[new_account.clone(), system_program.clone()],
            &[seeds],
        )
    } else {
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                new_account.key,
                required_lamports,
                space as u64,
                owner,
            ),
            &[payer.clone(), new_account.clone(), system_program.clone()],
            &[seeds],
        )
    }
}

/// Initialize a custody token account owned by the pool PDA.
pub fn initialize_vault<'a>(
    token_program: &AccountInfo<'a>,
    vault: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    pool_authority: &Pubkey,
) -> ProgramResult {
    invoke(
        &token_instruction::initialize_account3(
            token_program.key,
            vault.key,
            mint.key,
            pool_authority,
        )?,
        &[vault.clone(), mint.clone()],
    )
}

/// Initialize the ownership-share mint with the pool PDA as mint authority.
pub fn initialize_share_mint<'a>(
    token_program: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    pool_authority: &Pubkey,
    decimals: u8,
) -> ProgramResult {
    invoke(
        &token_instruction::initialize_mint2(
            token_program.key,
            mint.key,
            pool_authority,
            None,
            decimals,
        )?,
        &[mint.clone()],
    )
}

/// Transfer tokens out of a caller-owned account; the caller must have
/// signed the transaction.
pub fn transfer_tokens<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    invoke(
        &token_instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            authority.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
    )
}

/// Transfer tokens out of pool custody, signed with the pool's PDA seeds.
pub fn transfer_pool_tokens<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    pool_authority: &AccountInfo<'a>,
    seeds: &[&[u8]],
    amount: u64,
) -> ProgramResult {
    invoke_signed(
        &token_instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            pool_authority.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            destination.clone(),
            pool_authority.clone(),
            token_program.clone(),
        ],
        &[seeds],
    )
}

/// Mint ownership shares to a provider, signed with the pool's PDA seeds.
pub fn mint_shares<'a>(
    token_program: &AccountInfo<'a>,
    share_mint: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    pool_authority: &AccountInfo<'a>,
    seeds: &[&[u8]],
    amount: u64,
) -> ProgramResult {
    invoke_signed(
        &token_instruction::mint_to(
            token_program.key,
            share_mint.key,
            destination.key,
            pool_authority.key,
            &[],
            amount,
        )?,
        &[
            share_mint.clone(),
            destination.clone(),
            pool_authority.clone(),
            token_program.clone(),
        ],
        &[seeds],
    )
}

/// Burn ownership shares from a provider's account; the provider must have
/// signed the transaction.
pub fn burn_shares<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    share_mint: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    invoke(
        &token_instruction::burn(
            token_program.key,
            source.key,
            share_mint.key,
            authority.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            share_mint.clone(),
            authority.clone(),
            token_program.clone(),
        ],
    )
}

/// Read the balance of a token account without taking ownership of it.
pub fn token_balance(account: &AccountInfo) -> Result<u64, ProgramError> {
    let state = spl_token::state::Account::unpack(&account.data.borrow())?;
    Ok(state.amount)
}
