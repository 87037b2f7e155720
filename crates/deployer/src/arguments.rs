use {
    crate::deploy::DEFAULT_CONTRACT,
    alloy::primitives::B256,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        time::Duration,
    },
    url::Url,
};

#[derive(clap::Parser)]
pub struct Arguments {
    /// The log filter.
    #[clap(long, env, default_value = "warn,deployer=info,contracts=info,ethrpc=info")]
    pub log: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    /// By default every log goes to stderr so stdout only carries the
    /// deployment report.
    #[clap(long, env, default_value = "trace")]
    pub stderr_threshold: tracing::Level,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,

    /// The network to deploy to. Either an entry of the config file or
    /// `localhost`.
    #[clap(long, env, default_value = "localhost")]
    pub network: String,

    /// Path to a TOML file describing the available networks.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    /// The node RPC API endpoint. Overrides the URL of the selected network.
    #[clap(long, env)]
    pub node_url: Option<Url>,

    /// Private keys to sign with, comma separated. The first one deploys.
    /// Overrides the accounts of the selected network.
    #[clap(long, env, value_delimiter = ',')]
    pub private_key: Vec<B256>,

    /// BIP-39 mnemonic to derive signing keys from. Overrides the accounts of
    /// the selected network.
    #[clap(long, env)]
    pub mnemonic: Option<String>,

    /// How many keys to derive from the mnemonic.
    #[clap(long, env)]
    pub mnemonic_accounts: Option<u32>,

    /// Directory containing the compiled contract artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// The contract to deploy, either its name or its fully qualified name
    /// (`<source>:<name>`).
    #[clap(long, env, default_value = DEFAULT_CONTRACT)]
    pub contract: String,

    /// Constructor argument, repeat the flag for every argument. Values are
    /// passed to the constructor as they are. Without any, `InvoiceNFT` gets
    /// its default token address and other contracts get no arguments.
    #[clap(long = "constructor-arg", env = "CONSTRUCTOR_ARG", num_args = 1)]
    pub constructor_args: Vec<String>,

    /// Number of confirmations to wait for. Overrides the selected network.
    #[clap(long, env)]
    pub confirmations: Option<u64>,

    /// How long to wait for the confirmations, e.g. `2m`. Waits forever if
    /// unset.
    #[clap(long, env, value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Option<Duration>,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log,
            stderr_threshold,
            use_json_logs,
            network,
            config,
            node_url,
            private_key,
            mnemonic,
            mnemonic_accounts,
            artifacts,
            contract,
            constructor_args,
            confirmations,
            confirmation_timeout,
        } = self;

        writeln!(f, "log: {log}")?;
        writeln!(f, "stderr_threshold: {stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "config: {config:?}")?;
        display_option(f, "node_url", node_url)?;
        writeln!(f, "private_key: {}", secret_count(private_key.len()))?;
        display_secret_option(f, "mnemonic", mnemonic)?;
        display_option(f, "mnemonic_accounts", mnemonic_accounts)?;
        writeln!(f, "artifacts: {artifacts:?}")?;
        writeln!(f, "contract: {contract}")?;
        writeln!(f, "constructor_args: {constructor_args:?}")?;
        display_option(f, "confirmations", confirmations)?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        Ok(())
    }
}

fn secret_count(count: usize) -> String {
    match count {
        0 => "None".to_string(),
        n => format!("{n} x SECRET"),
    }
}

fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}
