//! # Atomic Transaction Groups
//!
//! A group binds up to 16 transactions so the network commits all of them in
//! the same block or none of them. The binding is a group id,
//!
//! ```text
//! gid = SHA-512/256("TG" || msgpack({"txlist": [raw_id(tx_1), ..., raw_id(tx_n)]}))
//! ```
//!
//! computed over the members *before* they carry a group id, then stamped on
//! every member. Member order is part of the hash, so it is fixed from the
//! moment the id is computed.
//!
//! ## State machine
//!
//! ```text
//! Empty ─► Parameterized ─► Groupized ─► Signed ─► Submitted ─► Confirmed
//!   │            │              │           │          │
//!   └────────────┴──────────────┴───────────┴──────────┴─► Failed(reason)
//! ```
//!
//! [`AtomicGroup`] walks the local half (up to `Signed`); the sender in
//! [`crate::network::sender`] drives the rest. Everything before `Submitted`
//! is in-process and can be dropped at any point. `Confirmed` and `Failed`
//! are terminal.

use std::fmt;

use tracing::debug;

use crate::config::MAX_GROUP_SIZE;
use crate::crypto::hash::{sha512_256_prefixed, TX_GROUP_DOMAIN};
use crate::error::ProtocolError;
use crate::identity::{Account, Address};

use super::builder::Transaction;
use super::encoding::{write_array_header, write_bin, CanonicalMap};
use super::factory::instantiate;
use super::intent::TransactionIntent;
use super::signing::{sign_transaction, SignedTransaction};
use super::types::SuggestedParams;

// ---------------------------------------------------------------------------
// Group id
// ---------------------------------------------------------------------------

fn check_size(len: usize) -> Result<(), ProtocolError> {
    if len == 0 {
        return Err(ProtocolError::InvalidGroupComposition(
            "a group needs at least one transaction".into(),
        ));
    }
    if len > MAX_GROUP_SIZE {
        return Err(ProtocolError::InvalidGroupComposition(format!(
            "a group holds at most {MAX_GROUP_SIZE} transactions, got {len}"
        )));
    }
    Ok(())
}

/// Group id over `transactions` in the given order.
///
/// Any group id the members already carry is ignored, so recomputing over a
/// stamped group yields the same id.
pub fn compute_group_id(transactions: &[Transaction]) -> Result<[u8; 32], ProtocolError> {
    check_size(transactions.len())?;

    let mut txlist = Vec::with_capacity(transactions.len() * 34 + 3);
    write_array_header(&mut txlist, transactions.len());
    for tx in transactions {
        let mut bare = tx.clone();
        bare.group = None;
        write_bin(&mut txlist, &bare.raw_id());
    }

    let mut map = CanonicalMap::new();
    map.raw("txlist", txlist);
    Ok(sha512_256_prefixed(TX_GROUP_DOMAIN, &map.finish()))
}

/// Compute the group id and stamp it on every member.
pub fn assign_group_id(transactions: &mut [Transaction]) -> Result<[u8; 32], ProtocolError> {
    let group_id = compute_group_id(transactions)?;
    for tx in transactions.iter_mut() {
        tx.group = Some(group_id);
    }
    Ok(group_id)
}

// ---------------------------------------------------------------------------
// GroupState
// ---------------------------------------------------------------------------

/// Where a group is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    /// Members validated and credentials resolved; no network data yet.
    Empty,
    /// A fresh parameter snapshot is attached.
    Parameterized,
    /// Every member instantiated and stamped with the group id.
    Groupized,
    /// Every member signed; keys have been dropped.
    Signed,
    /// Handed to the node. The commit point.
    Submitted,
    /// Terminal: included in this round.
    Confirmed(u64),
    /// Terminal: the pipeline stopped here.
    Failed(String),
}

impl GroupState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GroupState::Confirmed(_) | GroupState::Failed(_))
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Parameterized => write!(f, "Parameterized"),
            Self::Groupized => write!(f, "Groupized"),
            Self::Signed => write!(f, "Signed"),
            Self::Submitted => write!(f, "Submitted"),
            Self::Confirmed(round) => write!(f, "Confirmed({round})"),
            Self::Failed(reason) => write!(f, "Failed({reason})"),
        }
    }
}

// ---------------------------------------------------------------------------
// SignedGroup
// ---------------------------------------------------------------------------

/// The signed bundle: everything the node needs, in member order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedGroup {
    pub group_id: [u8; 32],
    pub transactions: Vec<SignedTransaction>,
}

impl SignedGroup {
    pub fn tx_ids(&self) -> Vec<String> {
        self.transactions.iter().map(SignedTransaction::id).collect()
    }

    /// Encoded signed payloads, one per member.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.transactions.iter().map(SignedTransaction::encode).collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AtomicGroup
// ---------------------------------------------------------------------------

struct Member {
    intent: TransactionIntent,
    address: Address,
    /// Present until the member is signed.
    account: Option<Account>,
    transaction: Option<Transaction>,
}

/// One group on its way through the pipeline.
///
/// Construction does every check that needs no network: size, duplicate
/// members, and every credential. An `AtomicGroup` that exists is one whose
/// only remaining failure modes are remote.
pub struct AtomicGroup {
    state: GroupState,
    members: Vec<Member>,
    params: Option<SuggestedParams>,
    group_id: Option<[u8; 32]>,
}

impl AtomicGroup {
    /// Validate composition and resolve every sender.
    ///
    /// An empty list is allowed and yields an empty group; callers treat it
    /// as a no-op.
    pub fn new(intents: Vec<TransactionIntent>) -> Result<Self, ProtocolError> {
        if !intents.is_empty() {
            check_size(intents.len())?;
        }

        let mut members: Vec<Member> = Vec::with_capacity(intents.len());
        for (index, intent) in intents.into_iter().enumerate() {
            let account = intent.sender().resolve().map_err(|e| {
                ProtocolError::InvalidCredential {
                    index,
                    reason: e.to_string(),
                }
            })?;
            let address = *account.address();

            if let Some(first) = members
                .iter()
                .position(|m| m.address == address && m.intent.same_operation(&intent))
            {
                return Err(ProtocolError::InvalidGroupComposition(format!(
                    "members {first} and {index} are the same {} from {address}",
                    intent.kind()
                )));
            }

            members.push(Member {
                intent,
                address,
                account: Some(account),
                transaction: None,
            });
        }

        Ok(Self {
            state: GroupState::Empty,
            members,
            params: None,
            group_id: None,
        })
    }

    pub fn state(&self) -> &GroupState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn group_id(&self) -> Option<[u8; 32]> {
        self.group_id
    }

    /// Sender addresses in member order.
    pub fn senders(&self) -> Vec<Address> {
        self.members.iter().map(|m| m.address).collect()
    }

    fn expect_state(&self, expected: GroupState, step: &str) -> Result<(), ProtocolError> {
        if self.state != expected {
            return Err(ProtocolError::InvalidGroupComposition(format!(
                "cannot {step} a group in state {}",
                self.state
            )));
        }
        Ok(())
    }

    /// Empty → Parameterized. The snapshot is shared by every member.
    pub fn parameterize(&mut self, params: SuggestedParams) -> Result<(), ProtocolError> {
        self.expect_state(GroupState::Empty, "parameterize")?;
        if self.members.is_empty() {
            return Err(ProtocolError::InvalidGroupComposition(
                "an empty group has nothing to parameterize".into(),
            ));
        }
        self.params = Some(params);
        self.state = GroupState::Parameterized;
        Ok(())
    }

    /// Parameterized → Groupized. Instantiates every member with its own
    /// sender and stamps the group id.
    pub fn groupize(&mut self) -> Result<[u8; 32], ProtocolError> {
        self.expect_state(GroupState::Parameterized, "groupize")?;
        let params = self.params.as_ref().ok_or_else(|| {
            ProtocolError::InvalidGroupComposition("group has no parameters".into())
        })?;

        let mut transactions = self
            .members
            .iter()
            .map(|m| instantiate(&m.intent, m.address, params))
            .collect::<Result<Vec<_>, _>>()?;
        let group_id = assign_group_id(&mut transactions)?;

        for (member, tx) in self.members.iter_mut().zip(transactions) {
            member.transaction = Some(tx);
        }
        self.group_id = Some(group_id);
        self.state = GroupState::Groupized;
        debug!(
            group_id = %hex::encode(group_id),
            members = self.members.len(),
            "group id assigned"
        );
        Ok(group_id)
    }

    /// Groupized → Signed. Each member is signed with its own key and the
    /// key is dropped immediately after.
    pub fn sign(&mut self) -> Result<SignedGroup, ProtocolError> {
        self.expect_state(GroupState::Groupized, "sign")?;
        let group_id = self.group_id.ok_or_else(|| {
            ProtocolError::InvalidGroupComposition("group has no id".into())
        })?;

        let mut signed = Vec::with_capacity(self.members.len());
        for (index, member) in self.members.iter_mut().enumerate() {
            let account = member.account.take().ok_or_else(|| {
                ProtocolError::InvalidCredential {
                    index,
                    reason: "credential already consumed".into(),
                }
            })?;
            let tx = member.transaction.clone().ok_or_else(|| {
                ProtocolError::InvalidGroupComposition(format!(
                    "member {index} was never instantiated"
                ))
            })?;
            signed.push(sign_transaction(tx, &account));
        }

        self.state = GroupState::Signed;
        Ok(SignedGroup {
            group_id,
            transactions: signed,
        })
    }

    /// Signed → Submitted.
    pub fn mark_submitted(&mut self) {
        if self.state == GroupState::Signed {
            self.state = GroupState::Submitted;
        }
    }

    /// Submitted → Confirmed.
    pub fn mark_confirmed(&mut self, round: u64) {
        if self.state == GroupState::Submitted {
            self.state = GroupState::Confirmed(round);
        }
    }

    /// Any non-terminal state → Failed. Remaining keys are dropped.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        for member in &mut self.members {
            member.account = None;
        }
        self.state = GroupState::Failed(reason.into());
    }
}

impl fmt::Debug for AtomicGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicGroup")
            .field("state", &self.state)
            .field("senders", &self.senders())
            .field("group_id", &self.group_id.map(hex::encode))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Credential;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::intent::AppCallArgs;
    use crate::transaction::types::OnComplete;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 1_000,
            flat_fee: true,
            min_fee: 1_000,
            first_valid: 500,
            last_valid: 1_500,
            genesis_id: "sandnet-v1".into(),
            genesis_hash: [4u8; 32],
        }
    }

    fn alice() -> Credential {
        Credential::seed([1u8; 32])
    }

    fn bob() -> Credential {
        Credential::seed([2u8; 32])
    }

    /// Alice pays Bob, Bob opts into asset 77, Alice sends Bob one unit.
    fn scenario() -> Vec<TransactionIntent> {
        let b = bob().address().unwrap();
        vec![
            TransactionBuilder::payment(b, 300_000).build(alice()).unwrap(),
            TransactionBuilder::asset_opt_in(b, 77).build(bob()).unwrap(),
            TransactionBuilder::asset_transfer(b, 77, 1).build(alice()).unwrap(),
        ]
    }

    fn signed(intents: Vec<TransactionIntent>) -> SignedGroup {
        let mut group = AtomicGroup::new(intents).unwrap();
        group.parameterize(params()).unwrap();
        group.groupize().unwrap();
        group.sign().unwrap()
    }

    #[test]
    fn members_share_one_group_id() {
        let bundle = signed(scenario());
        assert_eq!(bundle.len(), 3);
        for tx in &bundle.transactions {
            assert_eq!(tx.transaction.group, Some(bundle.group_id));
            assert!(tx.verify());
        }
    }

    #[test]
    fn group_id_is_deterministic() {
        assert_eq!(signed(scenario()).group_id, signed(scenario()).group_id);
        assert_eq!(signed(scenario()).payloads(), signed(scenario()).payloads());
    }

    #[test]
    fn group_id_depends_on_order() {
        let mut reversed = scenario();
        reversed.reverse();
        assert_ne!(signed(scenario()).group_id, signed(reversed).group_id);
    }

    #[test]
    fn recomputing_over_a_stamped_group_is_stable() {
        let bundle = signed(scenario());
        let txs: Vec<Transaction> = bundle
            .transactions
            .iter()
            .map(|s| s.transaction.clone())
            .collect();
        assert_eq!(compute_group_id(&txs).unwrap(), bundle.group_id);
    }

    #[test]
    fn invalid_credential_fails_at_construction() {
        let b = bob().address().unwrap();
        let intents = vec![
            TransactionBuilder::payment(b, 300_000).build(alice()).unwrap(),
            TransactionBuilder::asset_opt_in(b, 77)
                .build(Credential::mnemonic("not a real mnemonic"))
                .unwrap(),
        ];
        let err = AtomicGroup::new(intents).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidCredential { index: 1, .. }));
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let b = bob().address().unwrap();
        let pay = TransactionBuilder::payment(b, 1).build(alice()).unwrap();
        let err = AtomicGroup::new(vec![pay.clone(), pay]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidGroupComposition(_)));
    }

    #[test]
    fn same_body_from_different_senders_is_fine() {
        let call = |who: Credential| {
            TransactionBuilder::app_call(9, OnComplete::OptIn, AppCallArgs::new())
                .build(who)
                .unwrap()
        };
        assert!(AtomicGroup::new(vec![call(alice()), call(bob())]).is_ok());
    }

    #[test]
    fn oversized_group_is_rejected() {
        let b = bob().address().unwrap();
        let intents = (0..17)
            .map(|i| TransactionBuilder::payment(b, i + 1).build(alice()).unwrap())
            .collect();
        assert!(matches!(
            AtomicGroup::new(intents),
            Err(ProtocolError::InvalidGroupComposition(_))
        ));
    }

    #[test]
    fn empty_group_is_allowed_but_cannot_advance() {
        let mut group = AtomicGroup::new(Vec::new()).unwrap();
        assert!(group.is_empty());
        assert!(group.parameterize(params()).is_err());
        assert!(compute_group_id(&[]).is_err());
    }

    #[test]
    fn steps_must_run_in_order() {
        let mut group = AtomicGroup::new(scenario()).unwrap();
        assert!(group.sign().is_err());
        assert!(group.groupize().is_err());
        group.parameterize(params()).unwrap();
        assert!(group.parameterize(params()).is_err());
        group.groupize().unwrap();
        group.sign().unwrap();
        assert_eq!(group.state(), &GroupState::Signed);
    }

    #[test]
    fn terminal_states_are_immutable() {
        let mut group = AtomicGroup::new(scenario()).unwrap();
        group.parameterize(params()).unwrap();
        group.groupize().unwrap();
        group.sign().unwrap();
        group.mark_submitted();
        group.mark_confirmed(1_234);
        group.fail("too late");
        assert_eq!(group.state(), &GroupState::Confirmed(1_234));
    }

    #[test]
    fn failing_drops_credentials() {
        let mut group = AtomicGroup::new(scenario()).unwrap();
        group.fail("caller gave up");
        assert_eq!(group.state(), &GroupState::Failed("caller gave up".into()));
        assert!(group.members.iter().all(|m| m.account.is_none()));
    }
}
