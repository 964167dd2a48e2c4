use super::*;

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Inscription {
  pub genesis_txid: Txid,
  pub kind: Kind,
  pub mime_type: String,
  pub complete: bool,
  /// Transactions that contributed chunks, genesis first.
  pub transactions: Vec<Txid>,
  pub timestamp: Option<DateTime<Utc>>,
  #[serde(rename = "payload")]
  payload_hex: String,
}

impl Inscription {
  pub(crate) fn new(
    genesis_txid: Txid,
    kind: Kind,
    mime_type: String,
    timestamp: Option<DateTime<Utc>>,
  ) -> Self {
    Self {
      genesis_txid,
      kind,
      mime_type,
      complete: false,
      transactions: vec![genesis_txid],
      timestamp,
      payload_hex: String::new(),
    }
  }

  pub(crate) fn push(&mut self, txid: Txid, delta_hex: &str) {
    if self.transactions.last() != Some(&txid) {
      self.transactions.push(txid);
    }

    self.payload_hex.push_str(delta_hex);
  }

  pub fn payload_hex(&self) -> &str {
    &self.payload_hex
  }

  pub fn payload(&self) -> Result<Vec<u8>, hex::FromHexError> {
    codec::decode_payload(&self.payload_hex)
  }

  pub fn media(&self) -> Media {
    self.mime_type.parse().unwrap_or(Media::Unknown)
  }
}
