//! # Application Manager
//!
//! Lifecycle of a stateful application: compile, create, update, call,
//! opt in, close out, delete. The domain clients in this crate are thin
//! layers over this type; they only decide *which* arguments go on a call.
//!
//! Every operation comes in two flavours where grouping makes sense: an
//! `*_intent` method returning an unsigned [`TransactionIntent`] for use in
//! an atomic group, and a sending method that submits it on its own.

use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::{GroupReceipt, NodeClient, TransactionSender};
use plato_protocol::transaction::{
    AppArgument, AppCallArgs, OnComplete, StateSchema, TransactionBody, TransactionBuilder,
    TransactionIntent,
};
use tracing::info;

use crate::error::{ContractError, Result};
use crate::programs::ProgramSource;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Optional fields of an application call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCallOptions {
    pub call: AppCallArgs,
    pub note: Option<AppArgument>,
    pub lease: Option<AppArgument>,
    pub rekey_to: Option<Address>,
}

impl AppCallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call(call: AppCallArgs) -> Self {
        Self {
            call,
            ..Self::default()
        }
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

    fn finish(self, body: TransactionBody, sender: Credential) -> Result<TransactionIntent> {
        let mut builder = TransactionBuilder::new(body);
        if let Some(note) = self.note {
            builder = builder.note(note);
        }
        if let Some(lease) = self.lease {
            builder = builder.lease(lease);
        }
        if let Some(address) = self.rekey_to {
            builder = builder.rekey_to(address);
        }
        Ok(builder.build(sender)?)
    }
}

/// State an application reserves at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppSchema {
    pub local: StateSchema,
    pub global: StateSchema,
    pub extra_pages: u32,
}

impl AppSchema {
    pub const fn new(local: StateSchema, global: StateSchema) -> Self {
        Self {
            local,
            global,
            extra_pages: 0,
        }
    }
}

/// A freshly created application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DeployedApp {
    pub id: u64,
    /// The account the application controls.
    pub address: Address,
    pub confirmed_round: u64,
}

// ---------------------------------------------------------------------------
// AppManager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppManager {
    sender: TransactionSender,
}

impl AppManager {
    pub fn new(sender: TransactionSender) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &TransactionSender {
        &self.sender
    }

    /// Compile approval and clear programs concurrently.
    pub async fn compile(&self, source: &ProgramSource) -> Result<(Vec<u8>, Vec<u8>)> {
        let (approval, clear) = futures::try_join!(
            self.sender.compile_program(&source.approval),
            self.sender.compile_program(&source.clear),
        )?;
        Ok((approval, clear))
    }

    /// Compile and create an application. Returns its id and address.
    pub async fn create(
        &self,
        creator: Credential,
        source: &ProgramSource,
        schema: AppSchema,
        options: AppCallOptions,
    ) -> Result<DeployedApp> {
        let (approval_program, clear_program) = self.compile(source).await?;
        let body = TransactionBody::ApplicationCreate {
            approval_program,
            clear_program,
            local_schema: schema.local,
            global_schema: schema.global,
            extra_pages: schema.extra_pages,
            call: options.call.clone(),
        };
        let intent = options.finish(body, creator)?;
        let receipt = self.sender.send_transaction(intent).await?;

        let info = self
            .sender
            .client()
            .pending_transaction_info(receipt.first_tx_id())
            .await?;
        let id = info
            .created_application_id
            .ok_or(ContractError::MissingCreatedId("application"))?;
        let address = Address::for_application(id);
        info!(app_id = id, %address, round = receipt.confirmed_round, "application created");

        Ok(DeployedApp {
            id,
            address,
            confirmed_round: receipt.confirmed_round,
        })
    }

    /// Replace both programs of an existing application.
    pub async fn update(
        &self,
        app_id: u64,
        updater: Credential,
        source: &ProgramSource,
        options: AppCallOptions,
    ) -> Result<GroupReceipt> {
        let (approval_program, clear_program) = self.compile(source).await?;
        let body = TransactionBody::ApplicationUpdate {
            app_id,
            approval_program,
            clear_program,
            call: options.call.clone(),
        };
        let intent = options.finish(body, updater)?;
        let receipt = self.sender.send_transaction(intent).await?;
        info!(app_id, round = receipt.confirmed_round, "application updated");
        Ok(receipt)
    }

    pub fn call_intent(
        &self,
        app_id: u64,
        on_complete: OnComplete,
        caller: Credential,
        options: AppCallOptions,
    ) -> Result<TransactionIntent> {
        let body = TransactionBody::ApplicationCall {
            app_id,
            on_complete,
            call: options.call.clone(),
        };
        options.finish(body, caller)
    }

    /// A NoOp call.
    pub fn invoke_intent(
        &self,
        app_id: u64,
        caller: Credential,
        options: AppCallOptions,
    ) -> Result<TransactionIntent> {
        self.call_intent(app_id, OnComplete::NoOp, caller, options)
    }

    pub async fn invoke(
        &self,
        app_id: u64,
        caller: Credential,
        options: AppCallOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.invoke_intent(app_id, caller, options)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    pub fn opt_in_intent(
        &self,
        app_id: u64,
        account: Credential,
        options: AppCallOptions,
    ) -> Result<TransactionIntent> {
        self.call_intent(app_id, OnComplete::OptIn, account, options)
    }

    pub async fn opt_in(
        &self,
        app_id: u64,
        account: Credential,
        options: AppCallOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.opt_in_intent(app_id, account, options)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    pub async fn close_out(
        &self,
        app_id: u64,
        account: Credential,
        options: AppCallOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.call_intent(app_id, OnComplete::CloseOut, account, options)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    pub async fn delete(
        &self,
        app_id: u64,
        owner: Credential,
        options: AppCallOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.call_intent(app_id, OnComplete::DeleteApplication, owner, options)?;
        let receipt = self.sender.send_transaction(intent).await?;
        info!(app_id, round = receipt.confirmed_round, "application deleted");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use plato_protocol::config::ClientConfig;
    use plato_protocol::network::memory::MemoryNode;

    use super::*;

    fn manager(node: &MemoryNode) -> AppManager {
        AppManager::new(TransactionSender::new(
            Arc::new(node.clone()),
            ClientConfig::default(),
        ))
    }

    fn creator() -> Credential {
        Credential::seed([0x11; 32])
    }

    #[tokio::test]
    async fn create_reports_id_and_address() {
        let node = MemoryNode::new();
        let source = ProgramSource::new("#pragma version 8\nint 1", "#pragma version 8\nint 1");
        let app = manager(&node)
            .create(
                creator(),
                &source,
                AppSchema::new(StateSchema::new(0, 0), StateSchema::new(1, 1)),
                AppCallOptions::new(),
            )
            .await
            .unwrap();

        assert!(app.id > 0);
        assert_eq!(app.address, Address::for_application(app.id));
        assert_eq!(node.compile_calls(), 2);
    }

    #[tokio::test]
    async fn uncompilable_source_never_submits() {
        let node = MemoryNode::new();
        let source = ProgramSource::new("int 1", "   ");
        let err = manager(&node)
            .create(creator(), &source, AppSchema::default(), AppCallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::Protocol(plato_protocol::ProtocolError::InvalidArgument(_))
        ));
        assert_eq!(node.submit_calls(), 0);
    }

    #[tokio::test]
    async fn calls_do_not_report_created_ids() {
        let node = MemoryNode::new();
        let manager = manager(&node);
        let receipt = manager
            .invoke(42, creator(), AppCallOptions::new())
            .await
            .unwrap();
        let info = node
            .pending_transaction_info(receipt.first_tx_id())
            .await
            .unwrap();
        assert_eq!(info.created_application_id, None);
    }

    #[test]
    fn foreign_references_are_not_checked() {
        let node = MemoryNode::new();
        let call = AppCallArgs::new().foreign_asset(999_999).foreign_app(1);
        let intent = manager(&node)
            .invoke_intent(7, creator(), AppCallOptions::with_call(call))
            .unwrap();
        assert_eq!(intent.kind().to_string(), "appl");
    }

    #[test]
    fn app_id_zero_is_rejected() {
        let node = MemoryNode::new();
        assert!(manager(&node)
            .opt_in_intent(0, creator(), AppCallOptions::new())
            .is_err());
    }
}
