use {alloy::primitives::TxHash, std::time::Duration};

/// Everything that can abort a deployment. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("invalid configuration")]
    Config(#[source] anyhow::Error),
    #[error(
        "no signing account available: configure a private key or mnemonic, or connect to a \
         node with unlocked accounts"
    )]
    NoSignerAvailable,
    #[error("network {network:?} expects chain {expected} but the node is on chain {actual}")]
    WrongChain {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error("unknown contract type {name:?}")]
    UnknownContractType {
        name: String,
        #[source]
        source: contracts::ArtifactError,
    },
    #[error("deployment was rejected")]
    DeploymentRejected(#[source] anyhow::Error),
    #[error("deployment transaction {tx} was not confirmed within {timeout:?}")]
    ConfirmationTimeout { tx: TxHash, timeout: Option<Duration> },
    #[error("network error while {action}")]
    Network {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
