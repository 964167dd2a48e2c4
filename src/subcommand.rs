use super::*;

pub mod collection;
pub mod prune_indexes;
pub mod resolve;
pub mod trace;
pub mod unspent;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Resolve every inscription listed in a collection file")]
  Collection(collection::Collection),
  #[command(about = "Delete index files too small to hold a successor")]
  PruneIndexes(prune_indexes::PruneIndexes),
  #[command(about = "Reassemble an inscription and store its content")]
  Resolve(resolve::Resolve),
  #[command(about = "Trace an output back to the inscription it carries")]
  Trace(trace::Trace),
  #[command(about = "List wallet outputs and the inscriptions they carry")]
  Unspent(unspent::Unspent),
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Collection(collection) => collection.run(settings),
      Self::PruneIndexes(prune_indexes) => prune_indexes.run(settings),
      Self::Resolve(resolve) => resolve.run(settings),
      Self::Trace(trace) => trace.run(settings),
      Self::Unspent(unspent) => unspent.run(settings),
    }
  }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    let result = match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).map_err(Error::from),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).map_err(Error::from),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).map_err(Error::from),
    };

    if let Err(err) = result {
      log::error!("failed to write output: {err}");
      return;
    }

    println!();
  }
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;
