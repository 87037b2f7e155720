use {
    alloy::{
        network::EthereumWallet,
        primitives::{Address, B256},
        signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    },
    std::fmt,
};

/// How a signing key is configured.
#[derive(Clone)]
pub enum Account {
    /// A 32-byte secret key.
    PrivateKey(B256),
    /// The key at `m/44'/60'/0'/0/{index}` derived from a BIP-39 phrase.
    Mnemonic { phrase: String, index: u32 },
}

// Never print key material.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(SECRET)"),
            Self::Mnemonic { index, .. } => f
                .debug_struct("Mnemonic")
                .field("phrase", &"SECRET")
                .field("index", index)
                .finish(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    // The underlying error is dropped on purpose: it may contain the key.
    #[error("account #{position} is not a valid secp256k1 private key")]
    InvalidPrivateKey { position: usize },
    #[error("could not derive account #{position} from mnemonic")]
    InvalidMnemonic {
        position: usize,
        #[source]
        source: alloy::signers::local::LocalSignerError,
    },
}

/// The locally held signing keys, in the order they were configured. The
/// first key is the default signer.
#[derive(Debug, Clone, Default)]
pub struct Keychain {
    signers: Vec<PrivateKeySigner>,
}

impl Keychain {
    pub fn from_accounts(accounts: &[Account]) -> Result<Self, WalletError> {
        let signers = accounts
            .iter()
            .enumerate()
            .map(|(position, account)| match account {
                Account::PrivateKey(key) => PrivateKeySigner::from_bytes(key)
                    .map_err(|_| WalletError::InvalidPrivateKey { position }),
                Account::Mnemonic { phrase, index } => MnemonicBuilder::<English>::default()
                    .phrase(phrase.as_str())
                    .index(*index)
                    .and_then(|builder| builder.build())
                    .map_err(|source| WalletError::InvalidMnemonic { position, source }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { signers })
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(|signer| signer.address()).collect()
    }

    /// Wallet signing with all keys of the keychain, or `None` if there are
    /// no keys and the node has to sign.
    pub fn wallet(&self) -> Option<EthereumWallet> {
        let (primary, additional) = self.signers.split_first()?;
        let mut wallet = EthereumWallet::new(primary.clone());
        for signer in additional {
            wallet.register_signer(signer.clone());
        }
        Some(wallet)
    }
}
