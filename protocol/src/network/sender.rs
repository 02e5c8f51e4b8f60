//! # Transaction Sender
//!
//! Drives an [`AtomicGroup`] from intents to a confirmed round against a
//! [`NodeClient`]:
//!
//! ```text
//! intents ─► validate + resolve credentials      (local, no network)
//!         ─► fetch params (once)                  ─► Parameterized
//!         ─► instantiate + group id               ─► Groupized
//!         ─► sign, drop keys                      ─► Signed
//!         ─► submit all payloads in one call      ─► Submitted   ◄ commit point
//!         ─► poll up to max_wait_rounds           ─► Confirmed(round)
//! ```
//!
//! Every step before submission lives only in this call's stack frame, so
//! dropping the future before submission leaves nothing behind. After
//! submission the group belongs to the network, and
//! [`TransactionSender::send_atomic_group_within`] reports a deadline hit
//! there as a `ConfirmationTimeout` rather than a network failure.
//!
//! A single transaction is a one-member group. Both paths share one code
//! path, so a lone send and a one-member group produce identical bytes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ProtocolError;
use crate::transaction::{AtomicGroup, SignedGroup, SuggestedParams, TransactionIntent};

use super::algod::AlgodClient;
use super::client::NodeClient;

/// What a confirmed group looks like from the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReceipt {
    pub group_id: [u8; 32],
    /// Member transaction ids, in member order.
    pub tx_ids: Vec<String>,
    pub confirmed_round: u64,
}

impl GroupReceipt {
    /// Id of the first member, the one confirmation was polled on.
    pub fn first_tx_id(&self) -> &str {
        self.tx_ids.first().map(String::as_str).unwrap_or_default()
    }
}

/// Sends intents as atomic groups. Cheap to clone; clones share the client.
#[derive(Clone)]
pub struct TransactionSender {
    client: Arc<dyn NodeClient>,
    config: ClientConfig,
}

impl TransactionSender {
    pub fn new(client: Arc<dyn NodeClient>, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Sender over a REST client for `config`'s node.
    pub fn connect(config: ClientConfig) -> Result<Self, ProtocolError> {
        let client = AlgodClient::new(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn client(&self) -> &Arc<dyn NodeClient> {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fresh parameters with the configured fee policy applied.
    pub async fn suggested_params(&self) -> Result<SuggestedParams, ProtocolError> {
        let params = self.client.suggested_params().await?;
        debug!(
            first_valid = params.first_valid,
            last_valid = params.last_valid,
            fee = params.fee,
            "parameters fetched"
        );
        Ok(params.with_fee_policy(self.config.fee_policy, self.config.min_fee))
    }

    pub async fn compile_program(&self, source: &str) -> Result<Vec<u8>, ProtocolError> {
        let program = self.client.compile_program(source).await?;
        debug!(bytes = program.len(), "program compiled");
        Ok(program)
    }

    /// Send one intent as a one-member group.
    pub async fn send_transaction(
        &self,
        intent: TransactionIntent,
    ) -> Result<GroupReceipt, ProtocolError> {
        self.send_group(vec![intent]).await
    }

    /// [`Self::send_atomic_group`] for callers that always have members.
    /// An empty list is an `InvalidGroupComposition` here.
    pub async fn send_group(
        &self,
        intents: Vec<TransactionIntent>,
    ) -> Result<GroupReceipt, ProtocolError> {
        self.send_atomic_group(intents).await?.ok_or_else(|| {
            ProtocolError::InvalidGroupComposition("a group needs at least one transaction".into())
        })
    }

    /// Send `intents` as one atomic group. An empty list is a no-op and
    /// returns `Ok(None)` without touching the network.
    pub async fn send_atomic_group(
        &self,
        intents: Vec<TransactionIntent>,
    ) -> Result<Option<GroupReceipt>, ProtocolError> {
        let mut group = AtomicGroup::new(intents)?;
        if group.is_empty() {
            debug!("empty group, nothing to send");
            return Ok(None);
        }

        match self.drive(&mut group).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(err) => {
                group.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// [`Self::send_atomic_group`] with a whole-operation deadline.
    ///
    /// A deadline that passes before submission is `NetworkUnavailable`:
    /// nothing reached the network. Once the submit call has started, the
    /// group may land regardless, so the deadline surfaces as
    /// `ConfirmationTimeout` for the first member with `rounds: 0`.
    pub async fn send_atomic_group_within(
        &self,
        intents: Vec<TransactionIntent>,
        deadline: Duration,
    ) -> Result<Option<GroupReceipt>, ProtocolError> {
        let expires = Instant::now() + deadline;
        let mut group = AtomicGroup::new(intents)?;
        if group.is_empty() {
            debug!("empty group, nothing to send");
            return Ok(None);
        }

        match self.drive_until(&mut group, Some(expires)).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(err) => {
                group.fail(err.to_string());
                Err(err)
            }
        }
    }

    async fn drive(&self, group: &mut AtomicGroup) -> Result<GroupReceipt, ProtocolError> {
        self.drive_until(group, None).await
    }

    async fn drive_until(
        &self,
        group: &mut AtomicGroup,
        expires: Option<Instant>,
    ) -> Result<GroupReceipt, ProtocolError> {
        let (group_id, signed) = bounded(expires, self.prepare(group), || {
            warn!("group send deadline elapsed before submission");
            ProtocolError::NetworkUnavailable("deadline elapsed before submission".into())
        })
        .await?;

        let tx_ids = signed.tx_ids();
        let first = tx_ids.first().cloned().ok_or_else(|| {
            ProtocolError::InvalidGroupComposition("signed group has no members".into())
        })?;
        let in_flight = || {
            warn!(tx_id = %first, "group send deadline elapsed after submission started");
            ProtocolError::ConfirmationTimeout {
                tx_id: first.clone(),
                rounds: 0,
            }
        };

        let payloads = signed.payloads();
        let reported = match bounded(
            expires,
            self.client.submit_signed_transactions(&payloads),
            in_flight,
        )
        .await
        {
            Ok(reported) => reported,
            Err(err @ ProtocolError::ConfirmationTimeout { .. }) => return Err(err),
            Err(err) => {
                warn!(group_id = %hex::encode(group_id), error = %err, "group submission failed");
                return Err(err);
            }
        };
        group.mark_submitted();
        if reported != first {
            warn!(
                group_id = %hex::encode(group_id),
                expected = %first,
                reported = %reported,
                "node reported a different transaction id"
            );
        }
        info!(
            group_id = %hex::encode(group_id),
            members = tx_ids.len(),
            tx_id = %first,
            "group submitted"
        );

        let confirmed_round = bounded(
            expires,
            self.client
                .wait_for_confirmation(&first, self.config.max_wait_rounds),
            in_flight,
        )
        .await?;
        group.mark_confirmed(confirmed_round);
        info!(
            group_id = %hex::encode(group_id),
            round = confirmed_round,
            "group confirmed"
        );

        Ok(GroupReceipt {
            group_id,
            tx_ids,
            confirmed_round,
        })
    }

    /// Everything up to the commit point: one parameter fetch, group id,
    /// signatures.
    async fn prepare(
        &self,
        group: &mut AtomicGroup,
    ) -> Result<([u8; 32], SignedGroup), ProtocolError> {
        let params = self.suggested_params().await?;
        group.parameterize(params)?;
        let group_id = group.groupize()?;
        let signed = group.sign()?;
        Ok((group_id, signed))
    }
}

/// Run `step`, cut short at `expires` with the error from `on_elapsed`.
async fn bounded<T, F>(
    expires: Option<Instant>,
    step: F,
    on_elapsed: impl FnOnce() -> ProtocolError,
) -> Result<T, ProtocolError>
where
    F: Future<Output = Result<T, ProtocolError>>,
{
    match expires {
        None => step.await,
        Some(at) => tokio::time::timeout_at(at, step)
            .await
            .unwrap_or_else(|_| Err(on_elapsed())),
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("node", &self.config.base_url())
            .finish()
    }
}
