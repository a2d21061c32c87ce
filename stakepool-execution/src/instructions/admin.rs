use super::lifecycle::ensure_rate;
use crate::error::{PoolError, Result};
use crate::frame::CallFrame;
use stakepool_types::constants::ASSET_HOLDING_FEE;
use stakepool_types::{AccountId, Effect, Payment};
use tracing::info;

const NAME_VERIFY_METHOD: &[u8] = b"verify_nfd_addr";

pub fn update_admin(frame: &mut CallFrame, admin: &AccountId) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("update the admin")?;
    ensure_nonzero(admin, "admin")?;
    frame.pool.ledger.admin = *admin;
    info!(admin = %admin, "admin updated");
    Ok(())
}

pub fn update_treasury(frame: &mut CallFrame, treasury: &AccountId) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("update the treasury")?;
    ensure_nonzero(treasury, "treasury")?;
    frame.pool.ledger.treasury = *treasury;
    info!(treasury = %treasury, "treasury updated");
    Ok(())
}

pub fn update_commission_rate(frame: &mut CallFrame, commission_rate_bps: u64) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("update the commission rate")?;
    ensure_rate(commission_rate_bps)?;
    frame.pool.ledger.commission_rate_bps = commission_rate_bps;
    info!(commission_rate = commission_rate_bps, "commission rate updated");
    Ok(())
}

pub fn opt_in_to_asset(frame: &mut CallFrame, payment: &Payment, asset_id: u64) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("opt in to an asset")?;
    if asset_id == 0 {
        return Err(PoolError::InvalidInput("asset id 0 is the native asset".into()));
    }
    frame.verify_payment(payment, None, frame.config.asset_opt_in_fee)?;

    // holding the asset raises the host minimum; keep it out of arrived rewards
    frame.pool.ledger.minimum_balance = frame
        .pool
        .ledger
        .minimum_balance
        .checked_add(ASSET_HOLDING_FEE)
        .ok_or(PoolError::ArithmeticOverflow("minimum_balance"))?;
    frame.receive(payment)?;
    frame.emit(Effect::AssetOptIn { asset_id });
    info!(asset_id, "opted in to asset");
    Ok(())
}

pub struct ConsensusKeys {
    pub vote_pk: Vec<u8>,
    pub selection_pk: Vec<u8>,
    pub state_proof_pk: Vec<u8>,
    pub vote_first: u64,
    pub vote_last: u64,
    pub key_dilution: u64,
}

pub fn register_for_consensus(frame: &mut CallFrame, fee: &Payment, keys: ConsensusKeys) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("register for consensus")?;
    if keys.vote_last < keys.vote_first {
        return Err(PoolError::InvalidInput(format!(
            "vote range {}..{} is inverted",
            keys.vote_first, keys.vote_last
        )));
    }
    let required = frame.config.consensus_fee;
    frame.verify_payment(fee, None, required)?;

    frame.receive(fee)?;
    frame.spend(required)?;
    info!(
        vote_first = keys.vote_first,
        vote_last = keys.vote_last,
        "consensus keys registered"
    );
    frame.emit(Effect::KeyRegistration {
        vote_pk: keys.vote_pk,
        selection_pk: keys.selection_pk,
        state_proof_pk: keys.state_proof_pk,
        vote_first: keys.vote_first,
        vote_last: keys.vote_last,
        key_dilution: keys.key_dilution,
        fee: required,
    });
    Ok(())
}

pub fn deregister_from_consensus(frame: &mut CallFrame) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("deregister from consensus")?;
    frame.emit(Effect::KeyDeregistration);
    info!("consensus keys deregistered");
    Ok(())
}

pub fn link_external_name(
    frame: &mut CallFrame,
    name_app_id: u64,
    name: &str,
    registry_app_id: u64,
) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("link an external name")?;
    if name.is_empty() {
        return Err(PoolError::InvalidInput("name is empty".into()));
    }

    let args = vec![
        NAME_VERIFY_METHOD.to_vec(),
        name.as_bytes().to_vec(),
        name_app_id.to_be_bytes().to_vec(),
        frame.pool.address.as_bytes().to_vec(),
    ];
    frame.emit(Effect::AppCall {
        app_id: registry_app_id,
        args,
        foreign_apps: vec![name_app_id],
    });
    info!(external_name = name, registry_app_id, "external name link requested");
    Ok(())
}

fn ensure_nonzero(id: &AccountId, role: &str) -> Result<()> {
    if id.is_zero() {
        return Err(PoolError::InvalidInput(format!("{} cannot be the zero account", role)));
    }
    Ok(())
}
