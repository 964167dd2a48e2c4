use {super::*, bitcoincore_rpc::RpcApi, serde_json::Value};

pub mod memory;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("RPC error: {message}"))]
pub struct RpcError {
  pub message: String,
}

impl RpcError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

impl From<bitcoincore_rpc::Error> for RpcError {
  fn from(err: bitcoincore_rpc::Error) -> Self {
    Self::new(err.to_string())
  }
}

/// The node queries the engine depends on. Every call may block on the
/// network and is the only place a walk or trace can stall.
pub trait Rpc {
  fn get_transaction(&self, txid: Txid) -> Result<Transaction, RpcError>;

  /// Transactions in the returned block carry its hash, height and time.
  fn get_block(&self, hash: BlockHash) -> Result<Block, RpcError>;

  fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError>;

  fn get_block_count(&self) -> Result<u64, RpcError>;

  fn list_unspent(&self) -> Result<Vec<Utxo>, RpcError>;
}

impl<T: Rpc + ?Sized> Rpc for &T {
  fn get_transaction(&self, txid: Txid) -> Result<Transaction, RpcError> {
    (**self).get_transaction(txid)
  }

  fn get_block(&self, hash: BlockHash) -> Result<Block, RpcError> {
    (**self).get_block(hash)
  }

  fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError> {
    (**self).get_block_hash(height)
  }

  fn get_block_count(&self) -> Result<u64, RpcError> {
    (**self).get_block_count()
  }

  fn list_unspent(&self) -> Result<Vec<Utxo>, RpcError> {
    (**self).list_unspent()
  }
}

// Dogecoin Core's verbose JSON is decoded by hand. Its blocks carry AuxPoW
// headers that `bitcoin::Block` cannot deserialize.
impl Rpc for Client {
  fn get_transaction(&self, txid: Txid) -> Result<Transaction, RpcError> {
    let raw = self.call::<RawTransaction>(
      "getrawtransaction",
      &[Value::from(txid.to_string()), Value::from(1)],
    )?;

    Ok(raw.into_transaction())
  }

  fn get_block(&self, hash: BlockHash) -> Result<Block, RpcError> {
    let raw = self.call::<RawBlock>("getblock", &[Value::from(hash.to_string()), Value::from(2)])?;

    let transactions = raw
      .tx
      .into_iter()
      .map(|tx| {
        let mut transaction = tx.into_transaction();
        transaction.block_hash = Some(raw.hash);
        transaction.block_height = Some(raw.height);
        transaction.block_time = Some(raw.time);
        transaction
      })
      .collect();

    Ok(Block {
      hash: raw.hash,
      height: raw.height,
      time: raw.time,
      transactions,
    })
  }

  fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError> {
    Ok(RpcApi::get_block_hash(self, height)?)
  }

  fn get_block_count(&self) -> Result<u64, RpcError> {
    Ok(RpcApi::get_block_count(self)?)
  }

  fn list_unspent(&self) -> Result<Vec<Utxo>, RpcError> {
    Ok(
      self
        .call::<Vec<RawUnspent>>("listunspent", &[])?
        .into_iter()
        .map(|unspent| Utxo {
          outpoint: OutPoint {
            txid: unspent.txid,
            vout: unspent.vout,
          },
          amount: unspent.amount,
          address: unspent.address,
        })
        .collect(),
    )
  }
}

#[derive(Deserialize)]
struct RawTransaction {
  txid: Txid,
  vin: Vec<RawInput>,
  vout: Vec<RawOutput>,
  blockhash: Option<BlockHash>,
  blocktime: Option<u64>,
}

impl RawTransaction {
  fn into_transaction(self) -> Transaction {
    Transaction {
      txid: self.txid,
      inputs: self
        .vin
        .into_iter()
        .map(|input| Input {
          previous_output: input
            .txid
            .zip(input.vout)
            .map(|(txid, vout)| OutPoint { txid, vout }),
          script_sig_asm: input
            .script_sig
            .map(|script_sig| script_sig.asm)
            .unwrap_or_default(),
        })
        .collect(),
      outputs: self
        .vout
        .into_iter()
        .map(|output| Output {
          index: output.n,
          value: output.value,
          address: output
            .script_pub_key
            .address
            .or_else(|| output.script_pub_key.addresses.into_iter().next()),
        })
        .collect(),
      block_hash: self.blockhash,
      block_height: None,
      block_time: self.blocktime,
    }
  }
}

#[derive(Deserialize)]
struct RawInput {
  txid: Option<Txid>,
  vout: Option<u32>,
  #[serde(rename = "scriptSig")]
  script_sig: Option<RawScriptSig>,
}

#[derive(Deserialize)]
struct RawScriptSig {
  asm: String,
}

#[derive(Deserialize)]
struct RawOutput {
  n: u32,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  value: Amount,
  #[serde(rename = "scriptPubKey")]
  script_pub_key: RawScriptPubKey,
}

#[derive(Deserialize)]
struct RawScriptPubKey {
  address: Option<String>,
  #[serde(default)]
  addresses: Vec<String>,
}

#[derive(Deserialize)]
struct RawBlock {
  hash: BlockHash,
  height: u64,
  time: u64,
  tx: Vec<RawTransaction>,
}

#[derive(Deserialize)]
struct RawUnspent {
  txid: Txid,
  vout: u32,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  amount: Amount,
  address: Option<String>,
}
