use super::*;

#[derive(Clone, Default, Debug, Parser)]
#[command(group(
  ArgGroup::new("chains")
    .required(false)
    .args(&["chain_argument", "regtest", "testnet"]),
))]
pub struct Options {
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: mainnet]")]
  pub(crate) chain_argument: Option<Chain>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>.")]
  pub(crate) config_dir: Option<PathBuf>,
  #[arg(long, help = "Load Dogecoin Core RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(
    long,
    alias = "datadir",
    help = "Store indexes and content in <DATA_DIR>."
  )]
  pub(crate) data_dir: Option<PathBuf>,
  #[arg(long, help = "Load Dogecoin Core data dir from <DOGECOIN_DATA_DIR>.")]
  pub(crate) dogecoin_data_dir: Option<PathBuf>,
  #[arg(
    long,
    help = "Authenticate to Dogecoin Core RPC with <DOGECOIN_RPC_PASSWORD>."
  )]
  pub(crate) dogecoin_rpc_password: Option<String>,
  #[arg(long, help = "Connect to Dogecoin Core RPC at <DOGECOIN_RPC_URL>.")]
  pub(crate) dogecoin_rpc_url: Option<String>,
  #[arg(
    long,
    help = "Authenticate to Dogecoin Core RPC as <DOGECOIN_RPC_USERNAME>."
  )]
  pub(crate) dogecoin_rpc_username: Option<String>,
  #[arg(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(long, short, help = "Use regtest. Equivalent to `--chain regtest`.")]
  pub(crate) regtest: bool,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain testnet`.")]
  pub(crate) testnet: bool,
}
