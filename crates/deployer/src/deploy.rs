use {
    crate::{chain::Chain, error::DeployError},
    alloy::primitives::{Address, TxHash},
    anyhow::anyhow,
    contracts::Artifacts,
    std::{io, time::Duration},
};

pub const DEFAULT_CONTRACT: &str = "InvoiceNFT";
pub const DEFAULT_CONSTRUCTOR_ARG: &str = "0xf08a50178dfcde18524640ea6618a1f965821715";

/// What to deploy and how long to wait for it.
#[derive(Debug, Clone)]
pub struct Request {
    pub contract: String,
    pub constructor_args: Vec<String>,
    pub confirmations: u64,
    pub confirmation_timeout: Option<Duration>,
    /// Network name and chain id the node has to be on, if known.
    pub expected_chain: Option<(String, u64)>,
}

/// Constructor arguments used when none are given explicitly. Only the
/// default contract has any.
pub fn default_constructor_args(contract: &str) -> Vec<String> {
    if contract == DEFAULT_CONTRACT {
        vec![DEFAULT_CONSTRUCTOR_ARG.to_string()]
    } else {
        Vec::new()
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            constructor_args: default_constructor_args(DEFAULT_CONTRACT),
            confirmations: 1,
            confirmation_timeout: None,
            expected_chain: None,
        }
    }
}

/// A confirmed contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub deployer: Address,
    pub contract: String,
    pub address: Address,
    pub tx: TxHash,
    pub block_number: Option<u64>,
}

impl Deployment {
    /// Writes the human readable summary of the deployment.
    pub fn report(&self, out: &mut impl io::Write) -> io::Result<()> {
        writeln!(out, "Deploying contracts with the account: {}", self.deployer)?;
        writeln!(out, "{} deployed to: {}", self.contract, self.address)
    }
}

pub struct Deployer<C> {
    chain: C,
    artifacts: Artifacts,
}

impl<C: Chain> Deployer<C> {
    pub fn new(chain: C, artifacts: Artifacts) -> Self {
        Self { chain, artifacts }
    }

    /// Deploys the requested contract from the first available signer and
    /// waits for the deployment to be confirmed. Any failure aborts the
    /// deployment.
    pub async fn deploy(&self, request: &Request) -> Result<Deployment, DeployError> {
        if let Some((network, expected)) = &request.expected_chain {
            let actual = self.chain.chain_id().await?;
            if actual != *expected {
                return Err(DeployError::WrongChain {
                    network: network.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }

        let deployer = self
            .chain
            .signers()
            .await?
            .first()
            .copied()
            .ok_or(DeployError::NoSignerAvailable)?;
        tracing::info!(%deployer, "deploying contracts with account");

        let artifact = self.artifacts.resolve(&request.contract).map_err(|source| {
            DeployError::UnknownContractType {
                name: request.contract.clone(),
                source,
            }
        })?;
        let code = artifact
            .deploy_code(&request.constructor_args)
            .map_err(|err| DeployError::DeploymentRejected(err.into()))?;

        let tx = self.chain.submit(deployer, code).await?;
        tracing::info!(
            contract = %artifact.fully_qualified_name(),
            ?tx,
            "submitted deployment transaction"
        );

        let confirmation = self
            .chain
            .confirm(tx, request.confirmations, request.confirmation_timeout)
            .await?;
        if !confirmation.success {
            return Err(DeployError::DeploymentRejected(anyhow!(
                "transaction {tx} reverted"
            )));
        }
        let address = confirmation.contract_address.ok_or_else(|| {
            DeployError::DeploymentRejected(anyhow!(
                "receipt of transaction {tx} has no contract address"
            ))
        })?;
        tracing::info!(
            %address,
            block = ?confirmation.block_number,
            gas_used = confirmation.gas_used,
            "deployment confirmed"
        );

        Ok(Deployment {
            deployer,
            contract: artifact.contract_name,
            address,
            tx,
            block_number: confirmation.block_number,
        })
    }
}
