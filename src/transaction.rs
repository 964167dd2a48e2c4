use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
  /// `None` for coinbase inputs.
  pub previous_output: Option<OutPoint>,
  pub script_sig_asm: String,
}

impl Input {
  pub fn spends(&self, outpoint: OutPoint) -> bool {
    self.previous_output == Some(outpoint)
  }

  pub fn record(&self) -> Result<ScriptRecord, inscriptions::record::InvalidScript> {
    ScriptRecord::parse(&self.script_sig_asm)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub index: u32,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub value: Amount,
  pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub txid: Txid,
  pub inputs: Vec<Input>,
  pub outputs: Vec<Output>,
  pub block_hash: Option<BlockHash>,
  pub block_height: Option<u64>,
  pub block_time: Option<u64>,
}

impl Transaction {
  pub fn output(&self, vout: u32) -> Option<&Output> {
    self.outputs.iter().find(|output| output.index == vout)
  }

  pub fn input(&self, index: u32) -> Option<&Input> {
    self.inputs.get(usize::try_from(index).ok()?)
  }

  pub fn spends(&self, outpoint: OutPoint) -> bool {
    self.inputs.iter().any(|input| input.spends(outpoint))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
  pub hash: BlockHash,
  pub height: u64,
  pub time: u64,
  pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
  pub outpoint: OutPoint,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub amount: Amount,
  pub address: Option<String>,
}
