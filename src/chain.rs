use {super::*, clap::ValueEnum};

#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  #[clap(alias("main"))]
  Mainnet,
  #[clap(alias("test"))]
  Testnet,
  Regtest,
}

impl Chain {
  pub(crate) fn default_rpc_port(self) -> u16 {
    match self {
      Self::Mainnet => 22555,
      Self::Testnet => 44555,
      Self::Regtest => 18332,
    }
  }

  pub(crate) fn join_with_data_dir(self, data_dir: &Path) -> PathBuf {
    match self {
      Self::Mainnet => data_dir.to_owned(),
      Self::Testnet => data_dir.join("testnet3"),
      Self::Regtest => data_dir.join("regtest"),
    }
  }

  /// Maps the `chain` field of `getblockchaininfo`.
  pub(crate) fn from_rpc_name(name: &str) -> Option<Self> {
    match name {
      "main" => Some(Self::Mainnet),
      "test" => Some(Self::Testnet),
      "regtest" => Some(Self::Regtest),
      _ => None,
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Mainnet => "mainnet",
        Self::Regtest => "regtest",
        Self::Testnet => "testnet",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "mainnet" | "main" => Ok(Self::Mainnet),
      "regtest" => Ok(Self::Regtest),
      "testnet" | "test" => Ok(Self::Testnet),
      _ => bail!("invalid chain `{s}`"),
    }
  }
}
