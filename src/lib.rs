#![allow(clippy::result_large_err, clippy::type_complexity)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    error::{ResolveResult, ResultExt},
    inscriptions::{
      codec,
      record::{Chunk, ScriptRecord},
      Media,
    },
    options::Options,
    settings::Settings,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  anyhow::{anyhow, bail, ensure, Context, Error},
  bitcoin::{hashes::Hash, Amount, BlockHash, OutPoint, Txid},
  bitcoincore_rpc::{Auth, Client},
  chain::Chain,
  chrono::{DateTime, TimeZone, Utc},
  clap::{ArgGroup, Parser},
  lazy_static::lazy_static,
  serde::{Deserialize, Serialize},
  snafu::{Backtrace, Snafu},
  std::{
    collections::{BTreeMap, HashSet, VecDeque},
    env,
    fmt::{self, Display, Formatter},
    fs::{self, File, OpenOptions},
    io::{self, Write},
    iter,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::Mutex,
    thread,
    time::Duration,
  },
};

pub use self::{
  error::ResolveError,
  index_cache::{FileIndexCache, IndexCache, MemoryIndexCache},
  inscriptions::{GenesisId, Inscription, Kind},
  materializer::{ContentStore, Materialized, SkipReason},
  rpc::{Rpc, RpcError},
  tracer::{Origin, Provenance, Tracer},
  transaction::{Block, Input, Output, Transaction, Utxo},
  walker::{Failure, State, Walker, DEFAULT_DEPTH},
};


#[cfg(test)]
use self::test::*;

mod arguments;
pub mod chain;
mod config;
pub mod error;
pub mod index_cache;
pub mod inscriptions;
pub mod materializer;
mod options;
pub mod rpc;
mod settings;
pub mod subcommand;
pub mod tracer;
pub mod transaction;
pub mod walker;

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn timestamp(seconds: u64) -> Option<DateTime<Utc>> {
  Utc
    .timestamp_opt(i64::try_from(seconds).ok()?, 0)
    .single()
}

fn default<T: Default>() -> T {
  Default::default()
}

pub fn main() {
  env_logger::init();

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      for (i, err) in err.chain().skip(1).enumerate() {
        if i == 0 {
          eprintln!();
          eprintln!("because:");
        }

        eprintln!("- {err}");
      }

      if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
