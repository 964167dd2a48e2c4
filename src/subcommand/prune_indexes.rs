use super::*;

#[derive(Debug, Parser)]
pub(crate) struct PruneIndexes {
  #[arg(
    long,
    default_value_t = 10,
    help = "Delete index files smaller than <MIN_SIZE> bytes."
  )]
  min_size: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub pruned: Vec<PathBuf>,
}

impl PruneIndexes {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let cache = settings.index_cache()?;

    let pruned = cache.prune(self.min_size)?;

    log::info!(
      "Pruned {} index files from {}",
      pruned.len(),
      cache.dir().display()
    );

    Ok(Some(Box::new(Output { pruned })))
  }
}
