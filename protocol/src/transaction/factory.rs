//! # Transaction Factory
//!
//! The pure mapping from an intent, a resolved sender address and a network
//! snapshot to a concrete unsigned [`Transaction`]. No I/O, no keys, no
//! clock: the same inputs always give the same bytes.
//!
//! Structural checks live here too, so the builder can run them when an
//! intent is created and the factory can re-run them when it is instantiated.
//! Only structure is checked. Whether an application expects the assets an
//! intent references is decided on chain.

use crate::config::{
    LEASE_LENGTH, MAX_APP_ARGS, MAX_ASSET_DECIMALS, MAX_ASSET_NAME_LENGTH,
    MAX_ASSET_UNIT_NAME_LENGTH, MAX_ASSET_URL_LENGTH, MAX_EXTRA_PROGRAM_PAGES, MAX_NOTE_LENGTH,
    METADATA_HASH_LENGTH,
};
use crate::error::ProtocolError;
use crate::identity::Address;

use super::argument::AppArgument;
use super::builder::{ApplicationCall, Transaction, TransactionPayload};
use super::intent::{AppCallArgs, TransactionBody, TransactionIntent};
use super::types::{AssetParams, OnComplete, SuggestedParams};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(message: impl Into<String>) -> ProtocolError {
    ProtocolError::InvalidArgument(message.into())
}

/// Check the common fields every kind accepts.
pub fn validate_common(
    note: Option<&AppArgument>,
    lease: Option<&AppArgument>,
) -> Result<(), ProtocolError> {
    if let Some(note) = note {
        note.validate()?;
        let len = note.encode().len();
        if len > MAX_NOTE_LENGTH {
            return Err(invalid(format!(
                "note is {len} bytes, at most {MAX_NOTE_LENGTH} allowed"
            )));
        }
    }
    if let Some(lease) = lease {
        lease.validate()?;
        let len = lease.encode().len();
        if len != LEASE_LENGTH {
            return Err(invalid(format!(
                "lease must encode to {LEASE_LENGTH} bytes, got {len}"
            )));
        }
    }
    Ok(())
}

/// Check the kind-specific fields of a body.
pub fn validate_body(body: &TransactionBody) -> Result<(), ProtocolError> {
    match body {
        TransactionBody::Payment { .. } => Ok(()),
        TransactionBody::AssetTransfer { asset_id, .. } => {
            if *asset_id == 0 {
                return Err(invalid("asset transfer requires an asset id"));
            }
            Ok(())
        }
        TransactionBody::AssetCreate(params) => validate_asset_params(params),
        TransactionBody::ApplicationCreate {
            approval_program,
            clear_program,
            extra_pages,
            call,
            ..
        } => {
            validate_programs(approval_program, clear_program)?;
            if *extra_pages > MAX_EXTRA_PROGRAM_PAGES {
                return Err(invalid(format!(
                    "at most {MAX_EXTRA_PROGRAM_PAGES} extra program pages, got {extra_pages}"
                )));
            }
            validate_call(call)
        }
        TransactionBody::ApplicationUpdate {
            app_id,
            approval_program,
            clear_program,
            call,
        } => {
            require_app_id(*app_id)?;
            validate_programs(approval_program, clear_program)?;
            validate_call(call)
        }
        TransactionBody::ApplicationCall {
            app_id,
            on_complete,
            call,
        } => {
            require_app_id(*app_id)?;
            if *on_complete == OnComplete::UpdateApplication {
                return Err(invalid("application updates must carry new programs"));
            }
            validate_call(call)
        }
    }
}

fn require_app_id(app_id: u64) -> Result<(), ProtocolError> {
    if app_id == 0 {
        return Err(invalid("application id is required"));
    }
    Ok(())
}

fn validate_programs(approval: &[u8], clear: &[u8]) -> Result<(), ProtocolError> {
    if approval.is_empty() {
        return Err(invalid("approval program is empty"));
    }
    if clear.is_empty() {
        return Err(invalid("clear-state program is empty"));
    }
    Ok(())
}

fn validate_call(call: &AppCallArgs) -> Result<(), ProtocolError> {
    if call.args.len() > MAX_APP_ARGS {
        return Err(invalid(format!(
            "at most {MAX_APP_ARGS} application arguments, got {}",
            call.args.len()
        )));
    }
    call.args.iter().try_for_each(AppArgument::validate)
}

fn validate_asset_params(params: &AssetParams) -> Result<(), ProtocolError> {
    if params.decimals > MAX_ASSET_DECIMALS {
        return Err(invalid(format!(
            "decimals must be at most {MAX_ASSET_DECIMALS}, got {}",
            params.decimals
        )));
    }
    check_len("unit name", params.unit_name.as_deref(), MAX_ASSET_UNIT_NAME_LENGTH)?;
    check_len("asset name", params.asset_name.as_deref(), MAX_ASSET_NAME_LENGTH)?;
    check_len("asset url", params.url.as_deref(), MAX_ASSET_URL_LENGTH)?;
    if let Some(hash) = &params.metadata_hash {
        if hash.len() != METADATA_HASH_LENGTH {
            return Err(invalid(format!(
                "metadata hash must be {METADATA_HASH_LENGTH} bytes, got {}",
                hash.len()
            )));
        }
    }
    Ok(())
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), ProtocolError> {
    match value {
        Some(v) if v.len() > max => Err(invalid(format!(
            "{field} is {} bytes, at most {max} allowed",
            v.len()
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Instantiation
// ---------------------------------------------------------------------------

/// Turn an intent into a concrete unsigned transaction.
///
/// The fee follows the params: a flat fee is used as is; a per-byte fee is
/// multiplied by the estimated signed size and floored at the minimum fee.
pub fn instantiate(
    intent: &TransactionIntent,
    sender: Address,
    params: &SuggestedParams,
) -> Result<Transaction, ProtocolError> {
    validate_common(intent.note(), intent.lease())?;
    validate_body(intent.body())?;

    let lease = intent.lease().map(|lease| {
        let mut bytes = [0u8; LEASE_LENGTH];
        bytes.copy_from_slice(&lease.encode());
        bytes
    });

    let mut tx = Transaction {
        sender,
        fee: params.fee,
        first_valid: params.first_valid,
        last_valid: params.last_valid,
        genesis_id: params.genesis_id.clone(),
        genesis_hash: params.genesis_hash,
        group: None,
        lease,
        note: intent.note().map(AppArgument::encode).unwrap_or_default(),
        rekey_to: intent.rekey_to().copied(),
        payload: payload_for(intent.body()),
    };

    if !params.flat_fee {
        let size = tx.estimate_signed_size();
        tx.fee = params.fee.saturating_mul(size).max(params.min_fee);
    }
    Ok(tx)
}

fn payload_for(body: &TransactionBody) -> TransactionPayload {
    match body.clone() {
        TransactionBody::Payment {
            receiver,
            amount,
            close_remainder_to,
        } => TransactionPayload::Payment {
            receiver,
            amount,
            close_remainder_to,
        },
        TransactionBody::AssetTransfer {
            receiver,
            asset_id,
            amount,
            close_to,
            revocation_target,
        } => TransactionPayload::AssetTransfer {
            asset_id,
            receiver,
            amount,
            close_to,
            revocation_target,
        },
        TransactionBody::AssetCreate(params) => TransactionPayload::AssetConfig {
            asset_id: 0,
            params,
        },
        TransactionBody::ApplicationCreate {
            approval_program,
            clear_program,
            local_schema,
            global_schema,
            extra_pages,
            call,
        } => TransactionPayload::ApplicationCall(ApplicationCall {
            app_id: 0,
            on_complete: OnComplete::NoOp,
            approval_program,
            clear_program,
            local_schema: Some(local_schema),
            global_schema: Some(global_schema),
            extra_pages,
            args: call.encoded_args(),
            accounts: call.accounts,
            foreign_apps: call.foreign_apps,
            foreign_assets: call.foreign_assets,
        }),
        TransactionBody::ApplicationUpdate {
            app_id,
            approval_program,
            clear_program,
            call,
        } => TransactionPayload::ApplicationCall(ApplicationCall {
            app_id,
            on_complete: OnComplete::UpdateApplication,
            approval_program,
            clear_program,
            args: call.encoded_args(),
            accounts: call.accounts,
            foreign_apps: call.foreign_apps,
            foreign_assets: call.foreign_assets,
            ..ApplicationCall::default()
        }),
        TransactionBody::ApplicationCall {
            app_id,
            on_complete,
            call,
        } => TransactionPayload::ApplicationCall(ApplicationCall {
            app_id,
            on_complete,
            args: call.encoded_args(),
            accounts: call.accounts,
            foreign_apps: call.foreign_apps,
            foreign_assets: call.foreign_assets,
            ..ApplicationCall::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Credential;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::types::StateSchema;

    fn params(flat: bool) -> SuggestedParams {
        SuggestedParams {
            fee: if flat { 1_000 } else { 10 },
            flat_fee: flat,
            min_fee: 1_000,
            first_valid: 100,
            last_valid: 1_100,
            genesis_id: "sandnet-v1".into(),
            genesis_hash: [9u8; 32],
        }
    }

    fn sender() -> Credential {
        Credential::seed([1u8; 32])
    }

    fn receiver() -> Address {
        Address::from_public_key([2u8; 32])
    }

    #[test]
    fn payment_maps_fields() {
        let intent = TransactionBuilder::payment(receiver(), 300_000)
            .build(sender())
            .unwrap();
        let from = sender().address().unwrap();
        let tx = instantiate(&intent, from, &params(true)).unwrap();
        assert_eq!(tx.sender, from);
        assert_eq!(tx.fee, 1_000);
        assert_eq!(tx.first_valid, 100);
        assert_eq!(tx.last_valid, 1_100);
        assert_eq!(tx.group, None);
        assert_eq!(
            tx.payload,
            TransactionPayload::Payment {
                receiver: receiver(),
                amount: 300_000,
                close_remainder_to: None
            }
        );
    }

    #[test]
    fn suggested_fee_scales_with_size() {
        let small = TransactionBuilder::payment(receiver(), 1).build(sender()).unwrap();
        let big = TransactionBuilder::payment(receiver(), 1)
            .note(AppArgument::raw(vec![7u8; 900]))
            .build(sender())
            .unwrap();
        let from = sender().address().unwrap();
        let small_tx = instantiate(&small, from, &params(false)).unwrap();
        let big_tx = instantiate(&big, from, &params(false)).unwrap();
        assert!(small_tx.fee >= 1_000);
        assert!(big_tx.fee > small_tx.fee);
        assert!(big_tx.fee >= 10 * 975);
    }

    #[test]
    fn suggested_fee_is_floored() {
        let intent = TransactionBuilder::payment(receiver(), 1).build(sender()).unwrap();
        let mut p = params(false);
        p.fee = 1;
        let tx = instantiate(&intent, sender().address().unwrap(), &p).unwrap();
        assert_eq!(tx.fee, 1_000);
    }

    #[test]
    fn app_create_carries_schemas_and_programs() {
        let body = TransactionBody::ApplicationCreate {
            approval_program: vec![1, 2, 3],
            clear_program: vec![4],
            local_schema: StateSchema::new(0, 0),
            global_schema: StateSchema::new(3, 2),
            extra_pages: 0,
            call: AppCallArgs::new().arg(AppArgument::number(5)),
        };
        let intent = TransactionBuilder::new(body).build(sender()).unwrap();
        let tx = instantiate(&intent, sender().address().unwrap(), &params(true)).unwrap();
        let TransactionPayload::ApplicationCall(call) = tx.payload else {
            panic!("expected an application call");
        };
        assert_eq!(call.app_id, 0);
        assert_eq!(call.global_schema, Some(StateSchema::new(3, 2)));
        assert_eq!(call.args, vec![5u64.to_be_bytes().to_vec()]);
    }

    #[test]
    fn unexpected_foreign_asset_still_constructs() {
        let call = AppCallArgs::new()
            .arg(AppArgument::string("COMPLETE_ORDER").unwrap())
            .foreign_asset(999_999);
        let intent = TransactionBuilder::app_call(42, OnComplete::NoOp, call)
            .build(sender())
            .unwrap();
        let tx = instantiate(&intent, sender().address().unwrap(), &params(true)).unwrap();
        let TransactionPayload::ApplicationCall(call) = tx.payload else {
            panic!("expected an application call");
        };
        assert_eq!(call.foreign_assets, vec![999_999]);
    }

    #[test]
    fn structural_limits() {
        let mut asset = AssetParams::new(1_000, 20);
        assert!(validate_body(&TransactionBody::AssetCreate(asset.clone())).is_err());
        asset.decimals = 2;
        asset.unit_name = Some("TOOLONGNAME".into());
        assert!(validate_body(&TransactionBody::AssetCreate(asset.clone())).is_err());
        asset.unit_name = Some("PLATO".into());
        asset.metadata_hash = Some(vec![0u8; 31]);
        assert!(validate_body(&TransactionBody::AssetCreate(asset.clone())).is_err());
        asset.metadata_hash = Some(vec![0u8; 32]);
        assert!(validate_body(&TransactionBody::AssetCreate(asset)).is_ok());

        let too_many = AppCallArgs::new().args((0..17).map(AppArgument::number));
        let body = TransactionBody::ApplicationCall {
            app_id: 1,
            on_complete: OnComplete::NoOp,
            call: too_many,
        };
        assert!(validate_body(&body).is_err());
    }

    #[test]
    fn lease_must_be_32_bytes() {
        assert!(validate_common(None, Some(&AppArgument::raw(vec![1u8; 31]))).is_err());
        assert!(validate_common(None, Some(&AppArgument::raw(vec![1u8; 32]))).is_ok());
    }

    #[test]
    fn calls_need_an_app_id() {
        let body = TransactionBody::ApplicationCall {
            app_id: 0,
            on_complete: OnComplete::OptIn,
            call: AppCallArgs::new(),
        };
        assert!(validate_body(&body).is_err());
    }
}
