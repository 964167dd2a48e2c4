use {super::*, bitcoincore_rpc::RpcApi, config::Config};

const CONFIG_FILE: &str = "arcade.yaml";

#[derive(Deserialize)]
struct BlockchainInfo {
  chain: String,
}

#[derive(Default, Debug, Clone)]
pub struct Settings {
  pub(crate) chain: Chain,
  pub(crate) config: Config,
  pub(crate) options: Options,
}

impl Settings {
  pub(crate) fn new(options: Options) -> Result<Self> {
    let config: Config = match &options.config {
      Some(path) => serde_yaml::from_reader(
        File::open(path).with_context(|| format!("failed to open config `{}`", path.display()))?,
      )?,
      None => match &options.config_dir {
        Some(dir) if dir.join(CONFIG_FILE).exists() => {
          serde_yaml::from_reader(File::open(dir.join(CONFIG_FILE))?)?
        }
        Some(_) | None => default(),
      },
    };

    let chain = Self::setting_typed(
      options
        .regtest
        .then_some(Chain::Regtest)
        .or(options.testnet.then_some(Chain::Testnet))
        .or(options.chain_argument),
      Some("CHAIN"),
      config.chain,
      Chain::Mainnet,
    )?;

    Ok(Self {
      chain,
      config,
      options,
    })
  }

  pub(crate) fn auth(&self) -> Result<Auth> {
    let rpc_user = Self::setting(
      self.options.dogecoin_rpc_username.as_deref(),
      Some("DOGECOIN_RPC_USERNAME"),
      self.config.dogecoin_rpc_username.as_deref(),
      None,
    )?;

    let rpc_pass = Self::setting(
      self.options.dogecoin_rpc_password.as_deref(),
      Some("DOGECOIN_RPC_PASSWORD"),
      self.config.dogecoin_rpc_password.as_deref(),
      None,
    )?;

    match (rpc_user, rpc_pass) {
      (Some(rpc_user), Some(rpc_pass)) => Ok(Auth::UserPass(rpc_user, rpc_pass)),
      (None, Some(_rpc_pass)) => Err(anyhow!("no dogecoind rpc user specified")),
      (Some(_rpc_user), None) => Err(anyhow!("no dogecoind rpc password specified")),
      _ => Ok(Auth::CookieFile(self.cookie_file()?)),
    }
  }

  pub(crate) fn client(&self) -> Result<Client> {
    let rpc_url = self.rpc_url()?;

    let auth = self.auth()?;

    log::info!("Connecting to Dogecoin Core at {rpc_url}");

    if let Auth::CookieFile(cookie_file) = &auth {
      log::info!(
        "Using credentials from cookie file at `{}`",
        cookie_file.display()
      );

      ensure!(
        cookie_file.is_file(),
        "cookie file `{}` does not exist",
        cookie_file.display()
      );
    }

    let client = Client::new(&rpc_url, auth)
      .with_context(|| format!("failed to connect to Dogecoin Core RPC at `{rpc_url}`"))?;

    let mut checks = 0;
    let rpc_chain = loop {
      match client.call::<BlockchainInfo>("getblockchaininfo", &[]) {
        Ok(blockchain_info) => {
          break match Chain::from_rpc_name(&blockchain_info.chain) {
            Some(chain) => chain,
            None => bail!("Dogecoin RPC server on unknown chain: {}", blockchain_info.chain),
          }
        }
        Err(bitcoincore_rpc::Error::JsonRpc(bitcoincore_rpc::jsonrpc::Error::Rpc(err)))
          if err.code == -28 => {}
        Err(err) => bail!("Failed to connect to Dogecoin Core RPC at `{rpc_url}`:  {err}"),
      }

      ensure! {
        checks < 100,
        "Failed to connect to Dogecoin Core RPC at `{rpc_url}`",
      }

      checks += 1;
      thread::sleep(Duration::from_millis(100));
    };

    let chain = self.chain();

    if rpc_chain != chain {
      bail!("Dogecoin RPC server is on {rpc_chain} but arcade is on {chain}");
    }

    Ok(client)
  }

  pub(crate) fn chain(&self) -> Chain {
    self.chain
  }

  pub(crate) fn cookie_file(&self) -> Result<PathBuf> {
    if let Some(cookie_file) = self
      .options
      .cookie_file
      .as_ref()
      .or(self.config.cookie_file.as_ref())
    {
      return Ok(cookie_file.clone());
    }

    let path = if let Some(dogecoin_data_dir) = self
      .options
      .dogecoin_data_dir
      .as_ref()
      .or(self.config.dogecoin_data_dir.as_ref())
    {
      dogecoin_data_dir.clone()
    } else if cfg!(target_os = "linux") {
      dirs::home_dir()
        .ok_or_else(|| anyhow!("failed to get cookie file path: could not get home dir"))?
        .join(".dogecoin")
    } else {
      dirs::data_dir()
        .ok_or_else(|| anyhow!("failed to get cookie file path: could not get data dir"))?
        .join("Dogecoin")
    };

    let path = self.chain().join_with_data_dir(&path);

    Ok(path.join(".cookie"))
  }

  pub(crate) fn data_dir(&self) -> Result<PathBuf> {
    let data_dir = if let Some(data_dir) = &self.options.data_dir {
      data_dir.clone()
    } else if let Some(data_dir) = env::var_os("ARCADE_DATA_DIR") {
      data_dir.into()
    } else if let Some(data_dir) = &self.config.data_dir {
      data_dir.clone()
    } else {
      dirs::data_dir()
        .ok_or_else(|| anyhow!("failed to get data dir"))?
        .join("arcade")
    };

    Ok(self.chain().join_with_data_dir(&data_dir))
  }

  /// Scan depth for the walker. A `--depth` argument overrides the
  /// environment and config file.
  pub(crate) fn depth(&self, arg: Option<u64>) -> Result<u64> {
    let depth = Self::setting_typed(arg, Some("DEPTH"), self.config.depth, DEFAULT_DEPTH)?;

    ensure!(depth > 0, "depth must be positive");

    Ok(depth)
  }

  pub(crate) fn index_cache(&self) -> Result<FileIndexCache> {
    Ok(FileIndexCache::new(self.data_dir()?.join("indexes")))
  }

  pub(crate) fn content_store(&self, kind: Kind) -> Result<ContentStore> {
    Ok(ContentStore::new(self.data_dir()?.join(kind.store())))
  }

  pub(crate) fn rpc_url(&self) -> Result<String> {
    let base_url = Self::setting(
      self.options.dogecoin_rpc_url.as_deref(),
      Some("DOGECOIN_RPC_URL"),
      self.config.dogecoin_rpc_url.as_deref(),
      None,
    )?
    .unwrap_or(format!("127.0.0.1:{}", self.chain().default_rpc_port()));

    Ok(format!("{base_url}/"))
  }

  fn setting_typed<T>(
    arg_value: Option<T>,
    env_key: Option<&str>,
    config_value: Option<T>,
    default_value: T,
  ) -> Result<T>
  where
    T: FromStr,
    T::Err: Into<Error>,
  {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_key) = env_key {
      let key = format!("ARCADE_{env_key}");
      match env::var(key) {
        Ok(env_value) => {
          return env_value
            .parse()
            .map_err(Into::<Error>::into)
            .with_context(|| anyhow!("failed to parse {env_key}"))
        }
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    if let Some(config_value) = config_value {
      return Ok(config_value);
    }

    Ok(default_value)
  }

  fn setting(
    arg_value: Option<&str>,
    env_key: Option<&str>,
    config_value: Option<&str>,
    default_value: Option<&str>,
  ) -> Result<Option<String>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value.into()));
    }

    if let Some(env_key) = env_key {
      match env::var(format!("ARCADE_{env_key}")) {
        Ok(env_value) => return Ok(Some(env_value)),
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.or(default_value).map(str::to_string))
  }
}
