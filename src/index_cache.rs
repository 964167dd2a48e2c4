use {super::*, error::Io};

/// Successor transactions discovered for a genesis, in chain order. Entries
/// are hints: a walker that reads one still fetches and verifies it.
pub trait IndexCache {
  fn lookup(&self, genesis: Txid) -> ResolveResult<Vec<Txid>>;

  fn append(&self, genesis: Txid, txid: Txid) -> ResolveResult;
}

impl<T: IndexCache + ?Sized> IndexCache for &T {
  fn lookup(&self, genesis: Txid) -> ResolveResult<Vec<Txid>> {
    (**self).lookup(genesis)
  }

  fn append(&self, genesis: Txid, txid: Txid) -> ResolveResult {
    (**self).append(genesis, txid)
  }
}

/// One `<genesis>.txt` file per genesis holding a txid per line. Assumes a
/// single writer per genesis.
#[derive(Debug, Clone)]
pub struct FileIndexCache {
  dir: PathBuf,
}

impl FileIndexCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path(&self, genesis: Txid) -> PathBuf {
    self.dir.join(format!("{genesis}.txt"))
  }

  /// Deletes index files smaller than `min_size` bytes, returning their paths.
  pub fn prune(&self, min_size: u64) -> ResolveResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(&self.dir) {
      Ok(entries) => entries,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(err) => return Err(err).snafu_context(Io { path: &self.dir }),
    };

    let mut pruned = Vec::new();

    for entry in entries {
      let entry = entry.snafu_context(Io { path: &self.dir })?;

      let path = entry.path();

      if path.extension().and_then(|extension| extension.to_str()) != Some("txt") {
        continue;
      }

      let metadata = entry.metadata().snafu_context(Io { path: &path })?;

      if !metadata.is_file() || metadata.len() >= min_size {
        continue;
      }

      fs::remove_file(&path).snafu_context(Io { path: &path })?;

      log::info!("Pruned index {}", path.display());

      pruned.push(path);
    }

    pruned.sort();

    Ok(pruned)
  }
}

impl IndexCache for FileIndexCache {
  fn lookup(&self, genesis: Txid) -> ResolveResult<Vec<Txid>> {
    let path = self.path(genesis);

    let contents = match fs::read_to_string(&path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(err) => return Err(err).snafu_context(Io { path }),
    };

    Ok(
      contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<Txid>() {
          Ok(txid) if txid != genesis => Some(txid),
          Ok(_) => {
            log::warn!("Ignoring genesis listed in its own index {}", path.display());
            None
          }
          Err(err) => {
            log::warn!("Ignoring line `{line}` in {}: {err}", path.display());
            None
          }
        })
        .collect(),
    )
  }

  fn append(&self, genesis: Txid, txid: Txid) -> ResolveResult {
    if txid == genesis {
      return Err(ResolveError::SelfReference { genesis });
    }

    fs::create_dir_all(&self.dir).snafu_context(Io { path: &self.dir })?;

    let path = self.path(genesis);

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .snafu_context(Io { path: &path })?;

    writeln!(file, "{txid}").snafu_context(Io { path })
  }
}

#[derive(Debug, Default)]
pub struct MemoryIndexCache {
  entries: Mutex<BTreeMap<Txid, Vec<Txid>>>,
}

impl IndexCache for MemoryIndexCache {
  fn lookup(&self, genesis: Txid) -> ResolveResult<Vec<Txid>> {
    Ok(
      self
        .entries
        .lock()
        .unwrap()
        .get(&genesis)
        .cloned()
        .unwrap_or_default(),
    )
  }

  fn append(&self, genesis: Txid, txid: Txid) -> ResolveResult {
    if txid == genesis {
      return Err(ResolveError::SelfReference { genesis });
    }

    self
      .entries
      .lock()
      .unwrap()
      .entry(genesis)
      .or_default()
      .push(txid);

    Ok(())
  }
}
