use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Trace {
  #[arg(help = "Trace the inscription carried by <OUTPOINT>.")]
  outpoint: OutPoint,
}

impl Trace {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let client = settings.client()?;

    let provenance = Tracer::new(&client).trace(self.outpoint)?;

    Ok(Some(Box::new(provenance)))
  }
}
