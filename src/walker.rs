use {
  super::*,
  inscriptions::codec::{self, OutOfOrder},
};

/// Blocks scanned past the current transaction when looking for a successor.
pub const DEFAULT_DEPTH: u64 = 1000;

/// The output each chain transaction passes on to its successor.
const CHAIN_OUTPUT: u32 = 0;

#[derive(Debug, PartialEq, Clone, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum Failure {
  #[snafu(display("transaction {txid} carries no inscription genesis"))]
  InvalidGenesis { txid: Txid },
  #[snafu(display("no transaction spends {outpoint} within {depth} blocks"))]
  ChainIncomplete { outpoint: OutPoint, depth: u64 },
  #[snafu(display("transaction {txid} visited twice"))]
  CycleDetected { txid: Txid },
  #[snafu(display("chunks out of order in transaction {txid}: {source}"))]
  ChunkOutOfOrder { txid: Txid, source: OutOfOrder },
  #[snafu(display("transaction {txid} is not in a block"))]
  Unconfirmed { txid: Txid },
}

#[derive(Debug, PartialEq, Clone)]
pub enum State {
  AwaitingGenesis {
    txid: Txid,
  },
  Accumulating {
    inscription: Inscription,
    remaining: u64,
    tip: Transaction,
  },
  Complete(Inscription),
  Failed(Failure),
}

impl State {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Complete(_) | Self::Failed(_))
  }
}

/// Assembles one inscription by following its chain output from transaction
/// to transaction. A walker is single use: its visited set spans the walk.
pub struct Walker<R, C> {
  rpc: R,
  cache: C,
  depth: u64,
  visited: HashSet<Txid>,
  hints: VecDeque<Txid>,
  indexed: HashSet<Txid>,
}

impl<R: Rpc, C: IndexCache> Walker<R, C> {
  pub fn new(rpc: R, cache: C, depth: u64) -> Self {
    Self {
      rpc,
      cache,
      depth,
      visited: HashSet::new(),
      hints: VecDeque::new(),
      indexed: HashSet::new(),
    }
  }

  pub fn walk(mut self, genesis: Txid) -> ResolveResult<Inscription> {
    log::info!("Resolving inscription {genesis}");

    let mut state = State::AwaitingGenesis { txid: genesis };

    loop {
      state = self.step(state)?;

      match state {
        State::Complete(inscription) => {
          log::info!(
            "Resolved inscription {} across {} transactions",
            inscription.genesis_txid,
            inscription.transactions.len()
          );
          return Ok(inscription);
        }
        State::Failed(failure) => return Err(failure.into()),
        _ => {}
      }
    }
  }

  /// Advances `state` by one transaction. Walk failures become
  /// `State::Failed`, only RPC and cache errors are returned as errors.
  pub fn step(&mut self, state: State) -> ResolveResult<State> {
    let next = match state {
      State::AwaitingGenesis { txid } => self.genesis(txid),
      State::Accumulating {
        inscription,
        remaining,
        tip,
      } => self.accumulate(inscription, remaining, tip),
      terminal => Ok(terminal),
    };

    match next {
      Err(ResolveError::Walk { source }) => {
        log::debug!("Walk failed: {source}");
        Ok(State::Failed(source))
      }
      next => next,
    }
  }

  fn genesis(&mut self, txid: Txid) -> ResolveResult<State> {
    self.visit(txid)?;

    let transaction = self.rpc.get_transaction(txid)?;

    let marker = transaction
      .inputs
      .iter()
      .enumerate()
      .find_map(|(i, input)| match input.record() {
        Ok(record @ (ScriptRecord::Genesis { .. } | ScriptRecord::Delegate { .. })) => {
          Some((i, record))
        }
        _ => None,
      });

    match marker {
      Some((
        i,
        ScriptRecord::Genesis {
          kind,
          count,
          mime_type,
          chunks,
        },
      )) => {
        log::debug!("Found {kind} genesis in input {i} of {txid}: {count} chunks of {mime_type}");

        let hints = self.cache.lookup(txid)?;
        self.indexed = hints.iter().copied().collect();
        self.hints = hints.into();

        let mut inscription = Inscription::new(
          txid,
          kind,
          mime_type,
          transaction.block_time.and_then(timestamp),
        );

        if count == 0 && chunks.is_empty() {
          inscription.complete = true;
          return Ok(State::Complete(inscription));
        }

        let records = iter::once(chunks)
          .chain(continuations(&transaction.inputs[i + 1..]))
          .collect::<Vec<Vec<Chunk>>>();

        self.advance(inscription, codec::genesis_bound(count), transaction, records)
      }
      Some((_, ScriptRecord::Delegate { genesis_txid })) => {
        log::info!("Transaction {txid} delegates to {genesis_txid}");
        Ok(State::AwaitingGenesis { txid: genesis_txid })
      }
      _ => Err(Failure::InvalidGenesis { txid }.into()),
    }
  }

  fn accumulate(
    &mut self,
    inscription: Inscription,
    remaining: u64,
    tip: Transaction,
  ) -> ResolveResult<State> {
    let outpoint = OutPoint {
      txid: tip.txid,
      vout: CHAIN_OUTPUT,
    };

    let successor = match self.next_hint(outpoint) {
      Some(successor) => {
        self.visit(successor.txid)?;
        successor
      }
      None => {
        let successor = self.scan(&tip, outpoint)?;
        self.visit(successor.txid)?;
        if self.indexed.insert(successor.txid) {
          self.cache.append(inscription.genesis_txid, successor.txid)?;
        }
        successor
      }
    };

    log::debug!("Following {outpoint} to {}", successor.txid);

    let records = continuations(&successor.inputs).collect::<Vec<Vec<Chunk>>>();

    self.advance(inscription, remaining, successor, records)
  }

  fn advance(
    &self,
    mut inscription: Inscription,
    remaining: u64,
    transaction: Transaction,
    records: impl IntoIterator<Item = Vec<Chunk>>,
  ) -> ResolveResult<State> {
    let (remaining, done) = feed(&mut inscription, transaction.txid, remaining, records)?;

    if done {
      inscription.complete = true;
      Ok(State::Complete(inscription))
    } else {
      Ok(State::Accumulating {
        inscription,
        remaining,
        tip: transaction,
      })
    }
  }

  fn visit(&mut self, txid: Txid) -> ResolveResult {
    if self.visited.insert(txid) {
      Ok(())
    } else {
      Err(Failure::CycleDetected { txid }.into())
    }
  }

  /// Pops index entries until one spends `outpoint`. Entries that are
  /// visited, unknown to the node, or spend something else are skipped.
  fn next_hint(&mut self, outpoint: OutPoint) -> Option<Transaction> {
    while let Some(txid) = self.hints.pop_front() {
      if self.visited.contains(&txid) {
        log::warn!("Skipping index entry {txid}, already visited");
        continue;
      }

      match self.rpc.get_transaction(txid) {
        Ok(transaction) if transaction.spends(outpoint) => return Some(transaction),
        Ok(_) => log::warn!("Skipping index entry {txid}, which does not spend {outpoint}"),
        Err(err) => log::warn!("Skipping index entry {txid}: {err}"),
      }
    }

    None
  }

  fn scan(&self, tip: &Transaction, outpoint: OutPoint) -> ResolveResult<Transaction> {
    let start = match (tip.block_height, tip.block_hash) {
      (Some(height), _) => height,
      (None, Some(hash)) => self.rpc.get_block(hash)?.height,
      (None, None) => return Err(Failure::Unconfirmed { txid: tip.txid }.into()),
    };

    let end = start
      .saturating_add(self.depth)
      .min(self.rpc.get_block_count()?.saturating_add(1));

    log::debug!("Scanning blocks {start}..{end} for a spend of {outpoint}");

    for height in start..end {
      let block = self.rpc.get_block(self.rpc.get_block_hash(height)?)?;

      if let Some(successor) = block
        .transactions
        .into_iter()
        .find(|transaction| transaction.spends(outpoint))
      {
        return Ok(successor);
      }
    }

    Err(
      Failure::ChainIncomplete {
        outpoint,
        depth: self.depth,
      }
      .into(),
    )
  }
}

fn continuations(inputs: &[Input]) -> impl Iterator<Item = Vec<Chunk>> + '_ {
  inputs.iter().filter_map(|input| match input.record() {
    Ok(ScriptRecord::Continuation { chunks }) => Some(chunks),
    _ => None,
  })
}

/// Consumes every record of one transaction in input order. Returns the
/// remaining counter and whether the terminal chunk was reached.
fn feed(
  inscription: &mut Inscription,
  txid: Txid,
  mut remaining: u64,
  records: impl IntoIterator<Item = Vec<Chunk>>,
) -> Result<(u64, bool), Failure> {
  let mut done = false;

  for chunks in records {
    if done {
      if !chunks.is_empty() {
        log::warn!(
          "Ignoring {} chunks after the terminal chunk in {txid}",
          chunks.len()
        );
      }
      continue;
    }

    let consumed = codec::consume(remaining, &chunks).snafu_context(ChunkOutOfOrder { txid })?;

    if consumed.consumed < chunks.len() {
      log::warn!(
        "Ignoring {} chunks after the terminal chunk in {txid}",
        chunks.len() - consumed.consumed
      );
    }

    if consumed.consumed > 0 {
      inscription.push(txid, &consumed.delta_hex);
    }

    remaining = consumed.remaining;
    done = consumed.done;
  }

  Ok((remaining, done))
}
