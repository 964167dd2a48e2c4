use {
  super::*,
  bitcoin::hashes::sha256d,
  std::cell::{Cell, RefCell},
};

/// A transaction to mine or broadcast. Inputs pair the spent outpoint with
/// the unlocking script disassembly, outputs are values in koinu.
#[derive(Default)]
pub struct TransactionTemplate<'a> {
  pub inputs: &'a [(OutPoint, &'a str)],
  pub outputs: &'a [u64],
  pub txid: Option<Txid>,
}

/// In-memory chain answering the `Rpc` queries. Transactions are not
/// validated, so inputs may spend outputs that never existed.
///
/// Confirmed transactions are returned with their block hash but without a
/// height, the way `getrawtransaction` reports them.
pub struct MemoryNode {
  blocks: RefCell<Vec<Block>>,
  mempool: RefCell<Vec<Transaction>>,
  nonce: Cell<u64>,
  block_hash_calls: Cell<usize>,
  transaction_calls: Cell<usize>,
}

impl Default for MemoryNode {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryNode {
  /// A node holding only an empty block at height 0.
  pub fn new() -> Self {
    let node = Self {
      blocks: RefCell::new(Vec::new()),
      mempool: RefCell::new(Vec::new()),
      nonce: Cell::new(0),
      block_hash_calls: Cell::new(0),
      transaction_calls: Cell::new(0),
    };

    node.mine_empty(1);

    node
  }

  /// Address assigned to `outpoint`.
  pub fn address(outpoint: OutPoint) -> String {
    format!("D{}{}", &outpoint.txid.to_string()[..16], outpoint.vout)
  }

  pub fn block_hash_calls(&self) -> usize {
    self.block_hash_calls.get()
  }

  pub fn transaction_calls(&self) -> usize {
    self.transaction_calls.get()
  }

  pub fn reset_calls(&self) {
    self.block_hash_calls.set(0);
    self.transaction_calls.set(0);
  }

  fn next_hash(&self) -> sha256d::Hash {
    let nonce = self.nonce.get();
    self.nonce.set(nonce + 1);
    sha256d::Hash::hash(&nonce.to_le_bytes())
  }

  fn transaction(&self, template: &TransactionTemplate) -> Transaction {
    let txid = template
      .txid
      .unwrap_or_else(|| Txid::from_raw_hash(self.next_hash()));

    Transaction {
      txid,
      inputs: template
        .inputs
        .iter()
        .map(|(previous_output, script_sig_asm)| Input {
          previous_output: Some(*previous_output),
          script_sig_asm: (*script_sig_asm).into(),
        })
        .collect(),
      outputs: (0..)
        .zip(template.outputs)
        .map(|(index, value)| Output {
          index,
          value: Amount::from_sat(*value),
          address: Some(Self::address(OutPoint { txid, vout: index })),
        })
        .collect(),
      block_hash: None,
      block_height: None,
      block_time: None,
    }
  }

  /// Mines one block holding `templates` in order.
  pub fn mine(&self, templates: &[TransactionTemplate]) -> Vec<Txid> {
    let hash = BlockHash::from_raw_hash(self.next_hash());

    let transactions = templates
      .iter()
      .map(|template| self.transaction(template))
      .collect::<Vec<Transaction>>();

    let mut blocks = self.blocks.borrow_mut();

    let height = blocks.len() as u64;
    let time = 1_700_000_000 + height * 60;

    let transactions = transactions
      .into_iter()
      .map(|transaction| Transaction {
        block_hash: Some(hash),
        block_height: Some(height),
        block_time: Some(time),
        ..transaction
      })
      .collect::<Vec<Transaction>>();

    let txids = transactions
      .iter()
      .map(|transaction| transaction.txid)
      .collect();

    blocks.push(Block {
      hash,
      height,
      time,
      transactions,
    });

    txids
  }

  pub fn mine_empty(&self, n: usize) {
    for _ in 0..n {
      self.mine(&[]);
    }
  }

  /// Mines a block whose only transaction pays `value` koinu to output 0.
  pub fn coinbase(&self, value: u64) -> OutPoint {
    OutPoint {
      txid: self.mine(&[TransactionTemplate {
        outputs: &[value],
        ..Default::default()
      }])[0],
      vout: 0,
    }
  }

  /// Adds a transaction to the mempool without mining it.
  pub fn broadcast(&self, template: TransactionTemplate) -> Txid {
    let transaction = self.transaction(&template);
    let txid = transaction.txid;
    self.mempool.borrow_mut().push(transaction);
    txid
  }

  /// Mines a funding coinbase, then the genesis and each continuation in
  /// blocks of their own. Returns the chain, genesis first.
  pub fn inscribe(&self, kind: Kind, mime_type: &str, payload: &[u8], chunk_len: usize) -> Vec<Txid> {
    let mut spent = self.coinbase(100_000_000);

    let mut chain = Vec::new();

    for script in codec::encode(kind, mime_type, payload, chunk_len) {
      let txid = self.mine(&[TransactionTemplate {
        inputs: &[(spent, script.as_str())],
        outputs: &[100_000],
        ..Default::default()
      }])[0];

      spent = OutPoint { txid, vout: 0 };

      chain.push(txid);
    }

    chain
  }
}

impl Rpc for MemoryNode {
  fn get_transaction(&self, txid: Txid) -> Result<Transaction, RpcError> {
    self.transaction_calls.set(self.transaction_calls.get() + 1);

    let blocks = self.blocks.borrow();

    let confirmed = blocks
      .iter()
      .flat_map(|block| &block.transactions)
      .find(|transaction| transaction.txid == txid)
      .map(|transaction| Transaction {
        block_height: None,
        ..transaction.clone()
      });

    confirmed
      .or_else(|| {
        self
          .mempool
          .borrow()
          .iter()
          .find(|transaction| transaction.txid == txid)
          .cloned()
      })
      .ok_or_else(|| RpcError::new(format!("No such mempool or blockchain transaction {txid}")))
  }

  fn get_block(&self, hash: BlockHash) -> Result<Block, RpcError> {
    self
      .blocks
      .borrow()
      .iter()
      .find(|block| block.hash == hash)
      .cloned()
      .ok_or_else(|| RpcError::new(format!("Block {hash} not found")))
  }

  fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError> {
    self.block_hash_calls.set(self.block_hash_calls.get() + 1);

    usize::try_from(height)
      .ok()
      .and_then(|height| self.blocks.borrow().get(height).map(|block| block.hash))
      .ok_or_else(|| RpcError::new(format!("Block height {height} out of range")))
  }

  fn get_block_count(&self) -> Result<u64, RpcError> {
    Ok((self.blocks.borrow().len() as u64).saturating_sub(1))
  }

  fn list_unspent(&self) -> Result<Vec<Utxo>, RpcError> {
    let blocks = self.blocks.borrow();
    let mempool = self.mempool.borrow();

    let transactions = blocks
      .iter()
      .flat_map(|block| &block.transactions)
      .chain(mempool.iter())
      .collect::<Vec<&Transaction>>();

    Ok(
      blocks
        .iter()
        .flat_map(|block| &block.transactions)
        .flat_map(|transaction| {
          transaction.outputs.iter().map(move |output| Utxo {
            outpoint: OutPoint {
              txid: transaction.txid,
              vout: output.index,
            },
            amount: output.value,
            address: output.address.clone(),
          })
        })
        .filter(|utxo| {
          !transactions
            .iter()
            .any(|transaction| transaction.spends(utxo.outpoint))
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confirmed_transactions_carry_block_hash_but_not_height() {
    let node = MemoryNode::new();

    let txid = node.coinbase(1).txid;

    let transaction = node.get_transaction(txid).unwrap();

    assert_eq!(transaction.block_height, None);
    assert_eq!(
      node.get_block(transaction.block_hash.unwrap()).unwrap().height,
      1
    );
    assert_eq!(node.get_block_count().unwrap(), 1);
    assert_eq!(node.transaction_calls(), 1);
  }

  #[test]
  fn spent_outputs_are_not_listed() {
    let node = MemoryNode::new();

    let funding = node.mine(&[TransactionTemplate {
      outputs: &[1, 2],
      ..default()
    }])[0];

    node.broadcast(TransactionTemplate {
      inputs: &[(OutPoint { txid: funding, vout: 0 }, "")],
      outputs: &[1],
      ..default()
    });

    assert_eq!(
      node
        .list_unspent()
        .unwrap()
        .into_iter()
        .map(|utxo| utxo.outpoint)
        .collect::<Vec<OutPoint>>(),
      [OutPoint {
        txid: funding,
        vout: 1
      }]
    );
  }

  #[test]
  fn inscribe_mines_one_block_per_script() {
    let node = MemoryNode::new();

    let txids = node.inscribe(Kind::Inscription, "text/plain", b"abcdef", 2);

    assert_eq!(txids.len(), 3);
    assert_eq!(node.get_block_count().unwrap(), 4);

    let successor = node.get_transaction(txids[1]).unwrap();

    assert!(successor.spends(OutPoint {
      txid: txids[0],
      vout: 0
    }));
  }

  #[test]
  fn calls_are_counted_until_reset() {
    let node = MemoryNode::new();

    node.get_block_hash(0).unwrap();
    assert!(node.get_block_hash(7).is_err());

    assert_eq!(node.block_hash_calls(), 2);

    node.reset_calls();

    assert_eq!(node.block_hash_calls(), 0);
  }
}
