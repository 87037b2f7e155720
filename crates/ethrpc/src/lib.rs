pub mod alloy;

use {
    self::alloy::wallet::Keychain,
    ::alloy::{primitives::Address, providers::DynProvider},
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// A provider connected to a node together with the addresses of the keys
/// it signs with locally. Transactions from any other address are handed to
/// the node for signing.
#[derive(Debug, Clone)]
pub struct Web3 {
    pub provider: AlloyProvider,
    local_signers: Vec<Address>,
}

impl Web3 {
    pub fn new(url: &Url, keychain: &Keychain) -> Self {
        Self {
            provider: crate::alloy::provider(url, keychain.wallet()),
            local_signers: keychain.addresses(),
        }
    }

    /// Wraps an existing provider, e.g. a mocked one in tests.
    pub fn from_provider(provider: AlloyProvider, local_signers: Vec<Address>) -> Self {
        Self {
            provider,
            local_signers,
        }
    }

    /// Addresses of the locally held keys. The default signer comes first.
    pub fn local_signers(&self) -> &[Address] {
        &self.local_signers
    }
}
