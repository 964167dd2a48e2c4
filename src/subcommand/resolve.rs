use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Resolve {
  #[arg(help = "Resolve the inscription created or delegated to by <GENESIS>.")]
  genesis: GenesisId,
  #[arg(
    long,
    help = "Scan up to <DEPTH> blocks for each successor. [default: 1000]"
  )]
  depth: Option<u64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Output {
  pub genesis: Txid,
  pub delegate: Option<Txid>,
  pub kind: Kind,
  pub mime_type: String,
  pub media: Media,
  pub transactions: Vec<Txid>,
  pub size: usize,
  pub timestamp: Option<DateTime<Utc>>,
  pub materialized: Materialized,
}

/// Outcome of one inscription in a batch. Content already in a store is not
/// walked again, and failures are recorded so the batch carries on.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Resolution {
  Resolved(Output),
  Stored { path: PathBuf },
  Failed { error: String },
}

impl Resolution {
  pub(crate) fn new(
    rpc: impl Rpc,
    settings: &Settings,
    genesis: Txid,
    depth: Option<u64>,
  ) -> Result<Self> {
    for kind in [Kind::Inscription, Kind::Message] {
      if let Some(path) = settings.content_store(kind)?.existing(genesis)? {
        log::info!("Content for {genesis} already stored at {}", path.display());
        return Ok(Self::Stored { path });
      }
    }

    match resolve(rpc, settings, genesis, depth) {
      Ok(output) => Ok(Self::Resolved(output)),
      Err(err) => {
        log::warn!("Failed to resolve {genesis}: {err}");
        Ok(Self::Failed {
          error: err.to_string(),
        })
      }
    }
  }

  pub fn is_resolved(&self) -> bool {
    matches!(self, Self::Resolved(_))
  }
}

impl Resolve {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let client = settings.client()?;
    Ok(Some(Box::new(resolve(
      &client,
      &settings,
      self.genesis.0,
      self.depth,
    )?)))
  }
}

/// Walks the inscription created or delegated to by `requested` and writes
/// its payload to the store for its kind.
pub(crate) fn resolve(
  rpc: impl Rpc,
  settings: &Settings,
  requested: Txid,
  depth: Option<u64>,
) -> Result<Output> {
  let cache = settings.index_cache()?;

  let inscription = Walker::new(rpc, &cache, settings.depth(depth)?).walk(requested)?;

  let size = inscription.payload()?.len();

  let materialized = settings.content_store(inscription.kind)?.materialize(
    inscription.genesis_txid,
    &inscription.mime_type,
    inscription.payload_hex(),
  )?;

  Ok(Output {
    genesis: inscription.genesis_txid,
    delegate: (requested != inscription.genesis_txid).then_some(requested),
    kind: inscription.kind,
    media: inscription.media(),
    size,
    timestamp: inscription.timestamp,
    materialized,
    mime_type: inscription.mime_type,
    transactions: inscription.transactions,
  })
}
