use super::*;

#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
  pub(crate) chain: Option<Chain>,
  pub(crate) cookie_file: Option<PathBuf>,
  pub(crate) data_dir: Option<PathBuf>,
  pub(crate) depth: Option<u64>,
  pub(crate) dogecoin_data_dir: Option<PathBuf>,
  pub(crate) dogecoin_rpc_password: Option<String>,
  pub(crate) dogecoin_rpc_url: Option<String>,
  pub(crate) dogecoin_rpc_username: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn example_config_file_is_valid() {
    let config: Config = serde_yaml::from_reader(File::open("arcade.yaml").unwrap()).unwrap();

    assert_eq!(config.chain, Some(Chain::Mainnet));
    assert_eq!(config.depth, Some(DEFAULT_DEPTH));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<Config>("hidden: []").is_err());
  }

  #[test]
  fn empty_config() {
    assert_eq!(serde_yaml::from_str::<Config>("{}").unwrap(), Config::default());
  }
}
