use super::*;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Origin {
  PlainCoin,
  InscriptionGenesis { genesis_txid: Txid },
  MessageGenesis { msg_txid: Txid },
  Delegate { genesis_txid: Txid, child_txid: Txid },
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Provenance {
  pub origin: Origin,
  pub sender_address: Option<String>,
}

impl Provenance {
  pub fn plain() -> Self {
    Self {
      origin: Origin::PlainCoin,
      sender_address: None,
    }
  }

  /// The transaction whose chain the walker should resolve, if any.
  pub fn genesis(&self) -> Option<Txid> {
    match self.origin {
      Origin::PlainCoin => None,
      Origin::InscriptionGenesis { genesis_txid } | Origin::Delegate { genesis_txid, .. } => {
        Some(genesis_txid)
      }
      Origin::MessageGenesis { msg_txid } => Some(msg_txid),
    }
  }
}

/// Walks an output's funding graph backward until it reaches an inscription
/// marker. Fetched transactions are memoized for the lifetime of the tracer,
/// which is a single trace.
pub struct Tracer<R> {
  rpc: R,
  fetched: BTreeMap<Txid, Transaction>,
}

impl<R: Rpc> Tracer<R> {
  pub fn new(rpc: R) -> Self {
    Self {
      rpc,
      fetched: BTreeMap::new(),
    }
  }

  pub fn trace(mut self, outpoint: OutPoint) -> ResolveResult<Provenance> {
    let mut current = outpoint;
    let mut seen = HashSet::new();

    loop {
      if !seen.insert(current.txid) {
        log::info!("Trace of {outpoint} revisited {}, treating as plain", current.txid);
        return Ok(Provenance::plain());
      }

      if let Some(provenance) = self.classify(current)? {
        log::info!("Traced {outpoint} to {:?}", provenance.origin);
        return Ok(provenance);
      }

      let transaction = self.fetch(current.txid)?;

      let Some(target) = transaction
        .outputs
        .iter()
        .position(|output| output.index == current.vout)
      else {
        log::info!("Transaction {} has no output {}", current.txid, current.vout);
        return Ok(Provenance::plain());
      };

      let values = transaction
        .inputs
        .iter()
        .map(|input| self.value(input))
        .collect::<Vec<Amount>>();

      let outputs = transaction
        .outputs
        .iter()
        .map(|output| output.value)
        .collect::<Vec<Amount>>();

      let sources = attribute(&values, &outputs, target)
        .into_iter()
        .filter_map(|i| transaction.inputs[i].previous_output)
        .collect::<Vec<OutPoint>>();

      let Some(&first) = sources.first() else {
        log::info!("No input of {} funds {current}", current.txid);
        return Ok(Provenance::plain());
      };

      for &source in &sources {
        if let Some(provenance) = self.classify(source)? {
          log::info!("Traced {outpoint} to {:?}", provenance.origin);
          return Ok(provenance);
        }
      }

      log::debug!("Following {current} back to {first}");

      current = first;
    }
  }

  fn fetch(&mut self, txid: Txid) -> ResolveResult<Transaction> {
    if let Some(transaction) = self.fetched.get(&txid) {
      return Ok(transaction.clone());
    }

    let transaction = self.rpc.get_transaction(txid)?;

    self.fetched.insert(txid, transaction.clone());

    Ok(transaction)
  }

  fn value(&mut self, input: &Input) -> Amount {
    let Some(previous_output) = input.previous_output else {
      return Amount::ZERO;
    };

    match self.fetch(previous_output.txid) {
      Ok(transaction) => transaction
        .output(previous_output.vout)
        .map(|output| output.value)
        .unwrap_or(Amount::ZERO),
      Err(err) => {
        log::warn!("Counting {previous_output} as zero: {err}");
        Amount::ZERO
      }
    }
  }

  /// Checks input `vout` of the transaction `outpoint` names, pairing each
  /// output with the input at the same position.
  fn classify(&mut self, outpoint: OutPoint) -> ResolveResult<Option<Provenance>> {
    let transaction = self.fetch(outpoint.txid)?;

    let Some(input) = transaction.input(outpoint.vout) else {
      return Ok(None);
    };

    let origin = match input.record() {
      Ok(ScriptRecord::Genesis {
        kind: Kind::Inscription,
        ..
      }) => Origin::InscriptionGenesis {
        genesis_txid: outpoint.txid,
      },
      Ok(ScriptRecord::Genesis {
        kind: Kind::Message,
        ..
      }) => Origin::MessageGenesis {
        msg_txid: outpoint.txid,
      },
      Ok(ScriptRecord::Delegate { genesis_txid }) => Origin::Delegate {
        genesis_txid,
        child_txid: outpoint.txid,
      },
      _ => return Ok(None),
    };

    let sender_address = input.previous_output.and_then(|previous_output| {
      self
        .fetch(previous_output.txid)
        .ok()?
        .output(previous_output.vout)?
        .address
        .clone()
    });

    Ok(Some(Provenance {
      origin,
      sender_address,
    }))
  }
}

/// Assigns input value to outputs first come first served: each output, in
/// order, draws from the inputs in order until it is covered. Returns the
/// positions of the inputs drawn on by output `target`.
pub fn attribute(inputs: &[Amount], outputs: &[Amount], target: usize) -> Vec<usize> {
  let mut remaining = inputs.iter().map(|amount| amount.to_sat()).collect::<Vec<u64>>();
  let mut input = 0;

  for (index, output) in outputs.iter().enumerate() {
    let mut needed = output.to_sat();
    let mut sources = Vec::new();

    while needed > 0 && input < remaining.len() {
      if remaining[input] == 0 {
        input += 1;
        continue;
      }

      let taken = remaining[input].min(needed);

      sources.push(input);

      remaining[input] -= taken;
      needed -= taken;
    }

    if index == target {
      return sources;
    }
  }

  Vec::new()
}
