//! The blockchain as seen by the deployer. Abstracted behind a trait so the
//! deployment pipeline can be tested without a node.

use {
    crate::error::DeployError,
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, Bytes, TxHash},
        providers::{PendingTransactionBuilder, PendingTransactionError, Provider, WatchTxError},
        rpc::types::TransactionRequest,
        transports::TransportError,
    },
    ethrpc::{Web3, alloy::errors::RpcErrorExt},
    std::time::Duration,
};

/// Outcome of a mined deployment transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub success: bool,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Id of the chain the node is on.
    async fn chain_id(&self) -> Result<u64, DeployError>;

    /// Accounts able to sign transactions, the preferred one first.
    async fn signers(&self) -> Result<Vec<Address>, DeployError>;

    /// Submits a contract creation transaction and returns its hash without
    /// waiting for it to be mined.
    async fn submit(&self, from: Address, code: Bytes) -> Result<TxHash, DeployError>;

    /// Waits until the transaction has the requested number of
    /// confirmations.
    async fn confirm(
        &self,
        tx: TxHash,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> Result<Confirmation, DeployError>;
}

/// [`Chain`] backed by a JSON-RPC node.
pub struct RpcChain {
    web3: Web3,
}

impl RpcChain {
    pub fn new(web3: Web3) -> Self {
        Self { web3 }
    }
}

#[async_trait::async_trait]
impl Chain for RpcChain {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        self.web3
            .provider
            .get_chain_id()
            .await
            .map_err(network("fetching chain id"))
    }

    async fn signers(&self) -> Result<Vec<Address>, DeployError> {
        if !self.web3.local_signers().is_empty() {
            return Ok(self.web3.local_signers().to_vec());
        }
        tracing::debug!("no local keys configured, using accounts of the node");
        self.web3
            .provider
            .get_accounts()
            .await
            .map_err(network("fetching node accounts"))
    }

    async fn submit(&self, from: Address, code: Bytes) -> Result<TxHash, DeployError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(code);
        let pending = self
            .web3
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| classify(err, "submitting deployment transaction"))?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(
        &self,
        tx: TxHash,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> Result<Confirmation, DeployError> {
        let receipt = PendingTransactionBuilder::new(self.web3.provider.root().clone(), tx)
            .with_required_confirmations(confirmations)
            .with_timeout(timeout)
            .get_receipt()
            .await
            .map_err(|err| match err {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    DeployError::ConfirmationTimeout { tx, timeout }
                }
                PendingTransactionError::TransportError(err) => {
                    classify(err, "waiting for confirmation")
                }
                err => DeployError::Network {
                    action: "waiting for confirmation",
                    source: err.into(),
                },
            })?;

        Ok(Confirmation {
            success: receipt.status(),
            contract_address: receipt.contract_address(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        })
    }
}

fn network(action: &'static str) -> impl FnOnce(TransportError) -> DeployError {
    move |err| DeployError::Network {
        action,
        source: err.into(),
    }
}

/// Errors the node answered with mean the transaction itself is the problem,
/// everything else is a connectivity issue.
fn classify(err: TransportError, action: &'static str) -> DeployError {
    if let Some(message) = err.rejection_message() {
        tracing::warn!(reason = message, "node rejected deployment");
        // Reverts carry their data next to the message.
        tracing::debug!(?err, "rejection details");
        return DeployError::DeploymentRejected(err.into());
    }
    network(action)(err)
}
