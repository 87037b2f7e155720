pub mod errors;
mod instrumentation;
pub mod wallet;

#[cfg(any(test, feature = "test-util"))]
use alloy::providers::mock;
use {
    crate::AlloyProvider,
    alloy::{
        network::EthereumWallet,
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    instrumentation::{InstrumentationLayer, LabelingLayer},
    url::Url,
};

/// Creates a provider talking to the node at `url`. When a wallet is given
/// transactions get signed locally, otherwise `eth_sendTransaction` leaves
/// signing to the node.
pub fn provider(url: &Url, wallet: Option<EthereumWallet>) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(LabelingLayer {
            label: "deployer".into(),
        })
        .layer(InstrumentationLayer)
        .http(url.clone());
    match wallet {
        Some(wallet) => ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(rpc)
            .erased(),
        None => ProviderBuilder::new().connect_client(rpc).erased(),
    }
}

/// Provider answering requests with the responses queued on the returned
/// asserter.
#[cfg(any(test, feature = "test-util"))]
pub fn mocked_provider() -> (AlloyProvider, mock::Asserter) {
    let asserter = mock::Asserter::new();
    let provider = ProviderBuilder::new()
        .connect_mocked_client(asserter.clone())
        .erased();
    (provider, asserter)
}
