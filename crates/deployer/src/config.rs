//! Network selection. Networks are described in an optional TOML file; the
//! command line overrides whatever the selected entry configures.
//!
//! ```toml
//! [networks.sepolia]
//! url = "https://rpc.sepolia.org"
//! chain-id = 11155111
//! accounts = ["0x..."]
//! confirmations = 2
//! confirmation-timeout = "5m"
//! ```

use {
    crate::arguments::Arguments,
    alloy::primitives::B256,
    anyhow::{Context, Result, bail},
    ethrpc::alloy::wallet::Account,
    serde::Deserialize,
    std::{collections::BTreeMap, path::Path, time::Duration},
    tokio::fs,
    url::Url,
};

/// Network that is available without any configuration: a development node
/// on the local machine which signs with its own unlocked accounts.
pub const LOCALHOST: &str = "localhost";
const LOCALHOST_URL: &str = "http://127.0.0.1:8545";

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct File {
    #[serde(default)]
    networks: BTreeMap<String, NetworkEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct NetworkEntry {
    url: Url,
    chain_id: Option<u64>,
    #[serde(default)]
    accounts: Vec<B256>,
    mnemonic: Option<String>,
    #[serde(default = "default_mnemonic_accounts")]
    mnemonic_accounts: u32,
    confirmations: Option<u64>,
    #[serde(default, with = "humantime_serde")]
    confirmation_timeout: Option<Duration>,
}

fn default_mnemonic_accounts() -> u32 {
    1
}

/// Everything needed to talk to the selected network.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub url: Url,
    pub chain_id: Option<u64>,
    pub accounts: Vec<Account>,
    pub confirmations: u64,
    pub confirmation_timeout: Option<Duration>,
}

/// Reads the config file (if any) and resolves the network selected on the
/// command line.
pub async fn load(args: &Arguments) -> Result<Network> {
    let file = match &args.config {
        Some(path) => read(path).await?,
        None => File::default(),
    };
    resolve(file, args)
}

async fn read(path: &Path) -> Result<File> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    // Not printing detailed error because it could leak private keys.
    toml::de::from_str(&data)
        .map_err(|_| anyhow::anyhow!("TOML syntax error while reading {path:?}"))
}

fn resolve(mut file: File, args: &Arguments) -> Result<Network> {
    let entry = match file.networks.remove(&args.network) {
        Some(entry) => Some(entry),
        None if args.network == LOCALHOST => None,
        None => bail!(
            "unknown network {:?}, configured networks are {:?}",
            args.network,
            file.networks.keys().collect::<Vec<_>>()
        ),
    };

    let url = match (&args.node_url, &entry) {
        (Some(url), _) => url.clone(),
        (None, Some(entry)) => entry.url.clone(),
        (None, None) => LOCALHOST_URL.parse().context("invalid default node url")?,
    };

    let cli_accounts = accounts(
        &args.private_key,
        args.mnemonic.as_deref(),
        args.mnemonic_accounts.unwrap_or_else(default_mnemonic_accounts),
    );
    let accounts = match (cli_accounts.is_empty(), &entry) {
        (true, Some(entry)) => accounts(
            &entry.accounts,
            entry.mnemonic.as_deref(),
            args.mnemonic_accounts.unwrap_or(entry.mnemonic_accounts),
        ),
        _ => cli_accounts,
    };

    Ok(Network {
        name: args.network.clone(),
        url,
        chain_id: entry.as_ref().and_then(|entry| entry.chain_id),
        accounts,
        confirmations: args
            .confirmations
            .or(entry.as_ref().and_then(|entry| entry.confirmations))
            .unwrap_or(1),
        confirmation_timeout: args
            .confirmation_timeout
            .or(entry.as_ref().and_then(|entry| entry.confirmation_timeout)),
    })
}

/// Private keys come first, followed by the keys derived from the mnemonic.
fn accounts(private_keys: &[B256], mnemonic: Option<&str>, mnemonic_accounts: u32) -> Vec<Account> {
    let derived = mnemonic.into_iter().flat_map(|phrase| {
        (0..mnemonic_accounts).map(move |index| Account::Mnemonic {
            phrase: phrase.to_string(),
            index,
        })
    });
    private_keys
        .iter()
        .copied()
        .map(Account::PrivateKey)
        .chain(derived)
        .collect()
}

#[cfg(test)]
mod tests {
    use {super::*, clap::Parser, std::io::Write, tempfile::NamedTempFile};

    const CONFIG: &str = r#"
        [networks.sepolia]
        url = "https://rpc.sepolia.org/"
        chain-id = 11155111
        accounts = ["0x0000000000000000000000000000000000000000000000000000000000000001"]
        confirmations = 3
        confirmation-timeout = "5m"

        [networks.dev]
        url = "http://dev.local:8545/"
        mnemonic = "test test test test test test test test test test test junk"
        mnemonic-accounts = 2
    "#;

    fn args(extra: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("deployer").chain(extra.iter().copied()))
            .unwrap()
    }

    fn file() -> File {
        toml::de::from_str(CONFIG).unwrap()
    }

    #[test]
    fn localhost_needs_no_config() {
        let network = resolve(File::default(), &args(&[])).unwrap();

        assert_eq!(network.name, "localhost");
        assert_eq!(network.url.as_str(), "http://127.0.0.1:8545/");
        assert!(network.accounts.is_empty());
        assert_eq!(network.chain_id, None);
        assert_eq!(network.confirmations, 1);
        assert_eq!(network.confirmation_timeout, None);
    }

    #[test]
    fn selects_network_from_file() {
        let network = resolve(file(), &args(&["--network", "sepolia"])).unwrap();

        assert_eq!(network.url.as_str(), "https://rpc.sepolia.org/");
        assert_eq!(network.chain_id, Some(11155111));
        assert!(matches!(
            network.accounts.as_slice(),
            [Account::PrivateKey(key)] if *key == B256::with_last_byte(1)
        ));
        assert_eq!(network.confirmations, 3);
        assert_eq!(
            network.confirmation_timeout,
            Some(Duration::from_secs(5 * 60))
        );
    }

    #[test]
    fn derives_mnemonic_accounts() {
        let network = resolve(file(), &args(&["--network", "dev"])).unwrap();

        let indices: Vec<_> = network
            .accounts
            .iter()
            .map(|account| match account {
                Account::Mnemonic { index, .. } => *index,
                Account::PrivateKey(_) => panic!("unexpected private key"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn command_line_overrides_file() {
        let network = resolve(
            file(),
            &args(&[
                "--network",
                "sepolia",
                "--node-url",
                "http://127.0.0.1:9545",
                "--private-key",
                "0x0000000000000000000000000000000000000000000000000000000000000002",
                "--confirmations",
                "1",
                "--confirmation-timeout",
                "30s",
            ]),
        )
        .unwrap();

        assert_eq!(network.url.as_str(), "http://127.0.0.1:9545/");
        assert!(matches!(
            network.accounts.as_slice(),
            [Account::PrivateKey(key)] if *key == B256::with_last_byte(2)
        ));
        assert_eq!(network.confirmations, 1);
        assert_eq!(network.confirmation_timeout, Some(Duration::from_secs(30)));
        // Not overridable from the command line.
        assert_eq!(network.chain_id, Some(11155111));
    }

    #[test]
    fn unknown_network_is_an_error() {
        let err = resolve(file(), &args(&["--network", "mainnet"])).unwrap_err();
        assert!(err.to_string().contains("unknown network \"mainnet\""));
    }

    #[tokio::test]
    async fn loads_file_from_disk() {
        let mut config = NamedTempFile::new().unwrap();
        config.write_all(CONFIG.as_bytes()).unwrap();
        let path = config.path().to_str().unwrap();

        let network = load(&args(&["--config", path, "--network", "dev"]))
            .await
            .unwrap();
        assert_eq!(network.url.as_str(), "http://dev.local:8545/");
    }

    #[tokio::test]
    async fn syntax_errors_do_not_leak_secrets() {
        let mut config = NamedTempFile::new().unwrap();
        config
            .write_all(
                br#"
                [networks.dev]
                url = "http://dev.local"
                mnemonic = "secret words"
                bogus = 1
                "#,
            )
            .unwrap();
        let path = config.path().to_str().unwrap();

        let err = load(&args(&["--config", path, "--network", "dev"]))
            .await
            .unwrap_err();
        let message = format!("{err:?}");
        assert!(message.contains("TOML syntax error"));
        assert!(!message.contains("secret words"));
    }
}
