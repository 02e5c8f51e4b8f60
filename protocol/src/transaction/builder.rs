//! Transaction construction via the builder pattern.
//!
//! Two halves live here:
//!
//! - [`TransactionBuilder`] assembles a [`TransactionIntent`]: kind-specific
//!   body, note, lease, rekey target. `.build(credential)` validates the
//!   structure and hands back an immutable intent.
//! - [`Transaction`] is what an intent becomes once the factory has a sender
//!   address and network parameters. Its canonical msgpack encoding is what
//!   gets hashed into ids and signed.
//!
//! The builder does not sign. That happens in [`super::signing`], after the
//! group id has been stamped.

use crate::config::SIGNED_TX_OVERHEAD;
use crate::crypto::hash::{sha512_256_prefixed, TX_DOMAIN};
use crate::error::ProtocolError;
use crate::identity::{Address, Credential};

use super::argument::AppArgument;
use super::encoding::CanonicalMap;
use super::factory::{validate_body, validate_common};
use super::intent::{AppCallArgs, TransactionBody, TransactionIntent};
use super::types::{AssetParams, OnComplete, StateSchema, TransactionKind};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A concrete, unsigned Algorand transaction.
///
/// # Identity
///
/// `id = base32(SHA-512/256("TX" || encode()))`. The group id is part of the
/// encoding, so stamping a group changes the id; that is why signing has to
/// wait until the group is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    /// Set by [`super::group::assign_group_id`].
    pub group: Option<[u8; 32]>,
    pub lease: Option<[u8; 32]>,
    pub note: Vec<u8>,
    pub rekey_to: Option<Address>,
    pub payload: TransactionPayload,
}

/// Kind-specific transaction fields, already in wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    Payment {
        receiver: Address,
        amount: u64,
        close_remainder_to: Option<Address>,
    },
    AssetTransfer {
        asset_id: u64,
        receiver: Address,
        amount: u64,
        close_to: Option<Address>,
        revocation_target: Option<Address>,
    },
    AssetConfig {
        /// Zero for creation.
        asset_id: u64,
        params: AssetParams,
    },
    ApplicationCall(ApplicationCall),
}

/// Application call fields with arguments already encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationCall {
    /// Zero for creation.
    pub app_id: u64,
    pub on_complete: OnComplete,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub local_schema: Option<StateSchema>,
    pub global_schema: Option<StateSchema>,
    pub extra_pages: u32,
    pub args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self.payload {
            TransactionPayload::Payment { .. } => TransactionKind::Payment,
            TransactionPayload::AssetTransfer { .. } => TransactionKind::AssetTransfer,
            TransactionPayload::AssetConfig { .. } => TransactionKind::AssetConfig,
            TransactionPayload::ApplicationCall(_) => TransactionKind::ApplicationCall,
        }
    }

    /// Canonical msgpack encoding of the transaction.
    pub fn encode(&self) -> Vec<u8> {
        let mut map = CanonicalMap::new();
        map.uint("fee", self.fee)
            .uint("fv", self.first_valid)
            .uint("lv", self.last_valid)
            .string("gen", &self.genesis_id)
            .digest("gh", &self.genesis_hash)
            .bytes("note", &self.note)
            .address("snd", &self.sender)
            .string("type", self.kind().type_tag());
        if let Some(group) = &self.group {
            map.digest("grp", group);
        }
        if let Some(lease) = &self.lease {
            map.digest("lx", lease);
        }
        if let Some(rekey_to) = &self.rekey_to {
            map.address("rekey", rekey_to);
        }

        match &self.payload {
            TransactionPayload::Payment {
                receiver,
                amount,
                close_remainder_to,
            } => {
                map.address("rcv", receiver).uint("amt", *amount);
                if let Some(close) = close_remainder_to {
                    map.address("close", close);
                }
            }
            TransactionPayload::AssetTransfer {
                asset_id,
                receiver,
                amount,
                close_to,
                revocation_target,
            } => {
                map.uint("xaid", *asset_id)
                    .address("arcv", receiver)
                    .uint("aamt", *amount);
                if let Some(close) = close_to {
                    map.address("aclose", close);
                }
                if let Some(target) = revocation_target {
                    map.address("asnd", target);
                }
            }
            TransactionPayload::AssetConfig { asset_id, params } => {
                map.uint("caid", *asset_id).map("apar", encode_asset_params(params));
            }
            TransactionPayload::ApplicationCall(call) => encode_app_call(&mut map, call),
        }
        map.finish()
    }

    /// The 32-byte hash behind the transaction id.
    pub fn raw_id(&self) -> [u8; 32] {
        sha512_256_prefixed(TX_DOMAIN, &self.encode())
    }

    /// The 52-character transaction id.
    pub fn id(&self) -> String {
        data_encoding::BASE32_NOPAD.encode(&self.raw_id())
    }

    /// `"TX" || encode()`: the exact bytes a signature covers.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        let encoded = self.encode();
        let mut message = Vec::with_capacity(TX_DOMAIN.len() + encoded.len());
        message.extend_from_slice(TX_DOMAIN);
        message.extend_from_slice(&encoded);
        message
    }

    /// Size of the signed encoding, for per-byte fees.
    pub fn estimate_signed_size(&self) -> u64 {
        self.encode().len() as u64 + SIGNED_TX_OVERHEAD
    }
}

fn encode_asset_params(params: &AssetParams) -> CanonicalMap {
    let mut apar = CanonicalMap::new();
    apar.uint("t", params.total)
        .uint("dc", u64::from(params.decimals))
        .boolean("df", params.default_frozen)
        .string("un", params.unit_name.as_deref().unwrap_or_default())
        .string("an", params.asset_name.as_deref().unwrap_or_default())
        .string("au", params.url.as_deref().unwrap_or_default())
        .bytes("am", params.metadata_hash.as_deref().unwrap_or_default());
    for (key, address) in [
        ("m", &params.manager),
        ("r", &params.reserve),
        ("f", &params.freeze),
        ("c", &params.clawback),
    ] {
        if let Some(address) = address {
            apar.address(key, address);
        }
    }
    apar
}

fn encode_schema(schema: &StateSchema) -> CanonicalMap {
    let mut map = CanonicalMap::new();
    map.uint("nui", schema.ints).uint("nbs", schema.bytes);
    map
}

fn encode_app_call(map: &mut CanonicalMap, call: &ApplicationCall) {
    map.uint("apid", call.app_id)
        .uint("apan", call.on_complete.code())
        .bytes("apap", &call.approval_program)
        .bytes("apsu", &call.clear_program)
        .uint("apep", u64::from(call.extra_pages))
        .bytes_array("apaa", &call.args)
        .address_array("apat", &call.accounts)
        .uint_array("apfa", &call.foreign_apps)
        .uint_array("apas", &call.foreign_assets);
    if let Some(schema) = &call.local_schema {
        map.map("apls", encode_schema(schema));
    }
    if let Some(schema) = &call.global_schema {
        map.map("apgs", encode_schema(schema));
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`TransactionIntent`]s.
///
/// # Usage
///
/// ```rust,no_run
/// use plato_protocol::identity::{Address, Credential};
/// use plato_protocol::transaction::{AppArgument, TransactionBuilder};
///
/// # fn demo(receiver: Address, phrase: String) -> Result<(), plato_protocol::ProtocolError> {
/// let intent = TransactionBuilder::payment(receiver, 300_000)
///     .note(AppArgument::string("order #42")?)
///     .build(Credential::mnemonic(phrase))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    body: TransactionBody,
    note: Option<AppArgument>,
    lease: Option<AppArgument>,
    rekey_to: Option<Address>,
    close_to: Option<Address>,
    revocation_target: Option<Address>,
}

impl TransactionBuilder {
    pub fn new(body: TransactionBody) -> Self {
        Self {
            body,
            note: None,
            lease: None,
            rekey_to: None,
            close_to: None,
            revocation_target: None,
        }
    }

    pub fn payment(receiver: Address, amount: u64) -> Self {
        Self::new(TransactionBody::Payment {
            receiver,
            amount,
            close_remainder_to: None,
        })
    }

    pub fn asset_transfer(receiver: Address, asset_id: u64, amount: u64) -> Self {
        Self::new(TransactionBody::AssetTransfer {
            receiver,
            asset_id,
            amount,
            close_to: None,
            revocation_target: None,
        })
    }

    /// Opting into an asset is a zero-amount transfer to yourself.
    pub fn asset_opt_in(account: Address, asset_id: u64) -> Self {
        Self::asset_transfer(account, asset_id, 0)
    }

    pub fn asset_create(params: AssetParams) -> Self {
        Self::new(TransactionBody::AssetCreate(params))
    }

    pub fn app_call(app_id: u64, on_complete: OnComplete, call: AppCallArgs) -> Self {
        Self::new(TransactionBody::ApplicationCall {
            app_id,
            on_complete,
            call,
        })
    }

    pub fn note(mut self, note: AppArgument) -> Self {
        self.note = Some(note);
        self
    }

    pub fn lease(mut self, lease: AppArgument) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn rekey_to(mut self, address: Address) -> Self {
        self.rekey_to = Some(address);
        self
    }

    /// Close the sender's remaining balance (Algos or asset) to `address`.
    pub fn close_remainder_to(mut self, address: Address) -> Self {
        self.close_to = Some(address);
        self
    }

    /// Claw the asset back from `address` instead of the sender.
    pub fn revocation_target(mut self, address: Address) -> Self {
        self.revocation_target = Some(address);
        self
    }

    /// Validate and freeze the intent.
    pub fn build(self, sender: Credential) -> Result<TransactionIntent, ProtocolError> {
        let mut body = self.body;
        match &mut body {
            TransactionBody::Payment {
                close_remainder_to, ..
            } => {
                if self.revocation_target.is_some() {
                    return Err(ProtocolError::InvalidArgument(
                        "payments have no revocation target".into(),
                    ));
                }
                if self.close_to.is_some() {
                    *close_remainder_to = self.close_to;
                }
            }
            TransactionBody::AssetTransfer {
                close_to,
                revocation_target,
                ..
            } => {
                if self.close_to.is_some() {
                    *close_to = self.close_to;
                }
                if self.revocation_target.is_some() {
                    *revocation_target = self.revocation_target;
                }
            }
            _ => {
                if self.close_to.is_some() || self.revocation_target.is_some() {
                    return Err(ProtocolError::InvalidArgument(format!(
                        "close-to and revocation target do not apply to {} transactions",
                        body.kind()
                    )));
                }
            }
        }

        validate_common(self.note.as_ref(), self.lease.as_ref())?;
        validate_body(&body)?;

        Ok(TransactionIntent {
            sender,
            body,
            note: self.note,
            lease: self.lease,
            rekey_to: self.rekey_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::factory::instantiate;
    use crate::transaction::types::SuggestedParams;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 1_000,
            flat_fee: true,
            min_fee: 1_000,
            first_valid: 1,
            last_valid: 1_001,
            genesis_id: "sandnet-v1".into(),
            genesis_hash: [3u8; 32],
        }
    }

    fn sample() -> Transaction {
        let sender = Credential::seed([1u8; 32]);
        let intent = TransactionBuilder::payment(Address::from_public_key([2u8; 32]), 5)
            .build(sender.clone())
            .unwrap();
        instantiate(&intent, sender.address().unwrap(), &params()).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(sample().encode(), sample().encode());
        assert_eq!(sample().id(), sample().id());
    }

    #[test]
    fn id_is_52_chars_of_base32() {
        let id = sample().id();
        assert_eq!(id.len(), 52);
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn payment_encoding_starts_with_sorted_keys() {
        let bytes = sample().encode();
        // amt, fee, fv, gen, gh, lv, rcv, snd, type
        assert_eq!(bytes[0], 0x89);
        assert_eq!(&bytes[1..5], b"\xa3amt");
        assert!(!contains(&bytes, b"note"));
        assert!(!contains(&bytes, b"grp"));
    }

    #[test]
    fn group_changes_the_id() {
        let mut tx = sample();
        let before = tx.id();
        tx.group = Some([5u8; 32]);
        assert_ne!(tx.id(), before);
        assert!(contains(&tx.encode(), b"\xa3grp"));
    }

    #[test]
    fn bytes_to_sign_are_prefixed() {
        let tx = sample();
        let message = tx.bytes_to_sign();
        assert_eq!(&message[..2], b"TX");
        assert_eq!(&message[2..], &tx.encode()[..]);
    }

    #[test]
    fn close_to_lands_in_the_body() {
        let close = Address::from_public_key([6u8; 32]);
        let intent = TransactionBuilder::payment(Address::from_public_key([2u8; 32]), 0)
            .close_remainder_to(close)
            .build(Credential::seed([1u8; 32]))
            .unwrap();
        assert_eq!(
            intent.body(),
            &TransactionBody::Payment {
                receiver: Address::from_public_key([2u8; 32]),
                amount: 0,
                close_remainder_to: Some(close),
            }
        );
    }

    #[test]
    fn revocation_target_rejected_on_payments() {
        let result = TransactionBuilder::payment(Address::from_public_key([2u8; 32]), 1)
            .revocation_target(Address::from_public_key([6u8; 32]))
            .build(Credential::seed([1u8; 32]));
        assert!(matches!(result, Err(ProtocolError::InvalidArgument(_))));
    }

    #[test]
    fn app_call_encodes_references() {
        let sender = Credential::seed([1u8; 32]);
        let call = AppCallArgs::new()
            .arg(AppArgument::string("CLAIM_FUNDS").unwrap())
            .account(Address::from_public_key([8u8; 32]))
            .foreign_asset(77);
        let intent = TransactionBuilder::app_call(12, OnComplete::NoOp, call)
            .build(sender.clone())
            .unwrap();
        let tx = instantiate(&intent, sender.address().unwrap(), &params()).unwrap();
        let bytes = tx.encode();
        assert!(contains(&bytes, b"\xa4apaa\x91\xc4\x0bCLAIM_FUNDS"));
        assert!(contains(&bytes, b"\xa4apas\x91\x4d"));
        assert!(contains(&bytes, b"\xa4apid\x0c"));
        // NoOp is zero and therefore omitted.
        assert!(!contains(&bytes, b"apan"));
    }

    #[test]
    fn asset_create_encodes_params() {
        let sender = Credential::seed([1u8; 32]);
        let mut asset = AssetParams::new(1_000_000, 6);
        asset.unit_name = Some("PLATO".into());
        asset.default_frozen = false;
        let intent = TransactionBuilder::asset_create(asset).build(sender.clone()).unwrap();
        let tx = instantiate(&intent, sender.address().unwrap(), &params()).unwrap();
        let bytes = tx.encode();
        assert!(contains(&bytes, b"\xa4apar\x83\xa2dc\x06\xa1t\xce\x00\x0f\x42\x40\xa2un\xa5PLATO"));
        assert!(contains(&bytes, b"\xa4type\xa4acfg"));
    }
}
