//! Integration tests for the atomic group pipeline.
//!
//! Every test runs the real sender against an in-memory node and inspects
//! what reached it: how many calls, which bytes, in what order. Each test
//! owns its node, so there is no shared state between them.

use std::sync::Arc;

use plato_protocol::config::ClientConfig;
use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::memory::MemoryNode;
use plato_protocol::network::TransactionSender;
use plato_protocol::transaction::{transaction_id_from_signed, TransactionBuilder, TransactionIntent};
use plato_protocol::ProtocolError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const ASSET_ID: u64 = 77;

fn alice() -> Credential {
    Credential::seed([0xA1; 32])
}

fn bob() -> Credential {
    Credential::seed([0xB0; 32])
}

fn address(credential: &Credential) -> Address {
    credential.address().unwrap()
}

fn sender_for(node: &MemoryNode) -> TransactionSender {
    TransactionSender::new(Arc::new(node.clone()), ClientConfig::default())
}

/// A funds B, B opts into the asset, A sends B one unit.
fn cross_party(b: Credential) -> Vec<TransactionIntent> {
    let receiver = address(&bob());
    vec![
        TransactionBuilder::payment(receiver, 300_000)
            .build(alice())
            .unwrap(),
        TransactionBuilder::asset_opt_in(receiver, ASSET_ID)
            .build(b)
            .unwrap(),
        TransactionBuilder::asset_transfer(receiver, ASSET_ID, 1)
            .build(alice())
            .unwrap(),
    ]
}

/// The 32 bytes following the `grp` key of a signed payload.
fn group_of(payload: &[u8]) -> Option<[u8; 32]> {
    const KEY: &[u8] = b"\xa3grp\xc4\x20";
    let start = payload.windows(KEY.len()).position(|w| w == KEY)? + KEY.len();
    payload.get(start..start + 32)?.try_into().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cross_party_group_shares_one_id_and_one_submission() {
    let node = MemoryNode::new();
    let receipt = sender_for(&node)
        .send_atomic_group(cross_party(bob()))
        .await
        .unwrap()
        .expect("non-empty group");

    assert_eq!(node.params_calls(), 1);
    assert_eq!(node.submit_calls(), 1);

    let submissions = node.submissions();
    assert_eq!(submissions.len(), 1);
    let payloads = &submissions[0];
    assert_eq!(payloads.len(), 3);

    for payload in payloads {
        assert_eq!(group_of(payload), Some(receipt.group_id));
    }

    let ids: Vec<String> = payloads
        .iter()
        .map(|p| transaction_id_from_signed(p).unwrap())
        .collect();
    assert_eq!(ids, receipt.tx_ids);
    assert!(ids.iter().all(|id| node.is_committed(id)));
    assert!(receipt.confirmed_round > 0);
}

#[tokio::test]
async fn invalid_member_credential_makes_no_network_calls() {
    let node = MemoryNode::new();
    let broken = Credential::mnemonic("abandon abandon abandon");
    let err = sender_for(&node)
        .send_atomic_group(cross_party(broken))
        .await
        .unwrap_err();

    assert!(matches!(err, ProtocolError::InvalidCredential { index: 1, .. }));
    assert!(err.is_local());
    assert_eq!(node.network_calls(), 0);
}

#[tokio::test]
async fn unconfirmed_group_times_out_after_four_rounds() {
    let node = MemoryNode::new().with_confirm_delay(None);
    let err = sender_for(&node)
        .send_atomic_group(cross_party(bob()))
        .await
        .unwrap_err();

    match err {
        ProtocolError::ConfirmationTimeout { rounds, tx_id } => {
            assert_eq!(rounds, 4);
            assert_eq!(tx_id.len(), 52);
        }
        other => panic!("expected a confirmation timeout, got {other:?}"),
    }
    // Submitted once, polled four times, never resubmitted.
    assert_eq!(node.submit_calls(), 1);
    assert_eq!(node.pending_calls(), 4);
}

#[tokio::test]
async fn single_send_matches_one_member_group() {
    let intent = TransactionBuilder::payment(address(&bob()), 12_345)
        .build(alice())
        .unwrap();

    let single = MemoryNode::new();
    let grouped = MemoryNode::new();
    let a = sender_for(&single).send_transaction(intent.clone()).await.unwrap();
    let b = sender_for(&grouped)
        .send_atomic_group(vec![intent])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(single.submissions(), grouped.submissions());
    assert_eq!(a.group_id, b.group_id);
    assert!(group_of(&single.submissions()[0][0]).is_some());
}

#[tokio::test]
async fn rejected_group_commits_nothing() {
    let node = MemoryNode::new();
    node.reject_submissions("overspend: account balance below minimum");
    let err = sender_for(&node)
        .send_atomic_group(cross_party(bob()))
        .await
        .unwrap_err();

    assert!(matches!(err, ProtocolError::TransactionRejected(_)));
    assert!(node.accepted().is_empty());
    assert_eq!(node.pending_calls(), 0);
}

#[tokio::test]
async fn empty_group_is_a_no_op() {
    let node = MemoryNode::new();
    let receipt = sender_for(&node).send_atomic_group(Vec::new()).await.unwrap();
    assert!(receipt.is_none());
    assert_eq!(node.network_calls(), 0);
}

#[tokio::test]
async fn offline_node_fails_before_signing_anything() {
    let node = MemoryNode::new();
    node.set_offline(true);
    let err = sender_for(&node)
        .send_atomic_group(cross_party(bob()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::NetworkUnavailable(_)));
    assert!(node.submissions().is_empty());
}

#[tokio::test]
async fn unrelated_groups_run_concurrently() {
    let node = MemoryNode::new();
    let sender = sender_for(&node);
    let other = sender.clone();

    let carol = Credential::seed([0xC0; 32]);
    let dave_pays_carol = TransactionBuilder::payment(address(&carol), 1)
        .build(Credential::seed([0xD0; 32]))
        .unwrap();

    let (first, second) = tokio::join!(
        sender.send_atomic_group(cross_party(bob())),
        other.send_transaction(dave_pays_carol),
    );
    let first = first.unwrap().unwrap();
    let second = second.unwrap();

    assert_ne!(first.group_id, second.group_id);
    assert_eq!(node.submissions().len(), 2);
}
