pub mod arguments;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;

use {
    crate::{
        arguments::Arguments,
        chain::RpcChain,
        config::Network,
        deploy::{Deployer, Deployment, Request},
        error::DeployError,
    },
    contracts::Artifacts,
    ethrpc::{Web3, alloy::wallet::Keychain},
    std::{io, process::ExitCode},
};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Runs the deployment once and reports the outcome on stdout or stderr.
pub async fn run(args: Arguments) -> ExitCode {
    let result = deploy(args).await;
    ExitCode::from(report(result, &mut io::stdout(), &mut io::stderr()))
}

async fn deploy(args: Arguments) -> Result<Deployment, DeployError> {
    let network = config::load(&args).await.map_err(DeployError::Config)?;
    let keychain =
        Keychain::from_accounts(&network.accounts).map_err(|err| DeployError::Config(err.into()))?;
    tracing::info!(
        network = %network.name,
        url = %network.url,
        local_keys = network.accounts.len(),
        "connecting to node"
    );

    let chain = RpcChain::new(Web3::new(&network.url, &keychain));
    let artifacts = Artifacts::new(&args.artifacts);
    Deployer::new(chain, artifacts)
        .deploy(&request(args, &network))
        .await
}

fn request(args: Arguments, network: &Network) -> Request {
    let constructor_args = if args.constructor_args.is_empty() {
        deploy::default_constructor_args(&args.contract)
    } else {
        args.constructor_args
    };
    Request {
        contract: args.contract,
        constructor_args,
        confirmations: network.confirmations,
        confirmation_timeout: network.confirmation_timeout,
        expected_chain: network.chain_id.map(|chain_id| (network.name.clone(), chain_id)),
    }
}

/// Prints the deployment summary on success or the full error chain on
/// failure and returns the matching exit code.
pub fn report(
    result: Result<Deployment, DeployError>,
    stdout: &mut impl io::Write,
    stderr: &mut impl io::Write,
) -> u8 {
    let err = match result {
        Ok(deployment) => match deployment.report(stdout) {
            Ok(()) => return EXIT_SUCCESS,
            Err(err) => anyhow::Error::from(err).context("could not write deployment report"),
        },
        Err(err) => err.into(),
    };
    tracing::error!(?err, "deployment failed");
    if let Err(write_err) = writeln!(stderr, "{err:?}") {
        tracing::error!(?err, ?write_err, "could not print error");
    }
    EXIT_FAILURE
}
