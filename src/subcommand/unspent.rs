use {super::*, resolve::Resolution};

const DEFAULT_POSTAGE: u64 = 100_000;

#[derive(Debug, Parser)]
pub(crate) struct Unspent {
  #[arg(
    long,
    default_value_t = DEFAULT_POSTAGE,
    help = "Trace outputs holding exactly <POSTAGE> koinu."
  )]
  postage: u64,
  #[arg(long, help = "Trace every output regardless of value.")]
  all: bool,
  #[arg(
    long,
    help = "Resolve and store the content of every inscription found, skipping content already stored."
  )]
  resolve: bool,
  #[arg(
    long,
    requires = "resolve",
    help = "Scan up to <DEPTH> blocks for each successor. [default: 1000]"
  )]
  depth: Option<u64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Output {
  pub outpoint: OutPoint,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub amount: Amount,
  pub address: Option<String>,
  pub provenance: Option<Provenance>,
  pub resolution: Option<Resolution>,
}

impl Unspent {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let client = settings.client()?;
    Ok(Some(Box::new(self.unspent(&client, &settings)?)))
  }

  fn unspent(&self, rpc: impl Rpc, settings: &Settings) -> Result<Vec<Output>> {
    let postage = Amount::from_sat(self.postage);

    let mut outputs = Vec::new();

    for utxo in rpc.list_unspent()? {
      let provenance = if self.all || utxo.amount == postage {
        Some(Tracer::new(&rpc).trace(utxo.outpoint)?)
      } else {
        None
      };

      let resolution = match provenance.as_ref().and_then(Provenance::genesis) {
        Some(genesis) if self.resolve => {
          Some(Resolution::new(&rpc, settings, genesis, self.depth)?)
        }
        _ => None,
      };

      outputs.push(Output {
        outpoint: utxo.outpoint,
        amount: utxo.amount,
        address: utxo.address,
        provenance,
        resolution,
      });
    }

    Ok(outputs)
  }
}
