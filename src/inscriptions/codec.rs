use {super::*, record::Chunk};

/// Bytes of payload carried by each chunk when encoding.
pub const DEFAULT_CHUNK_LEN: usize = 240;

/// Appended to an odd-length payload before decoding. Existing content on
/// chain was materialized with this exact suffix, so it is kept as is.
const ODD_LENGTH_PADDING: &str = "00000";

#[derive(Debug, PartialEq, Clone)]
pub struct Consumed {
  pub delta_hex: String,
  pub remaining: u64,
  /// Number of chunks taken from the record, the rest follow the terminal one.
  pub consumed: usize,
  pub done: bool,
}

#[derive(Debug, PartialEq, Clone, Snafu)]
#[snafu(display("chunk counter {found} does not decrease from {remaining}"))]
pub struct OutOfOrder {
  pub remaining: u64,
  pub found: u64,
}

/// Counter bound for the first chunk of a genesis. The header count is
/// informational, so the first counter may equal it. Every later counter
/// must be strictly below the one before it.
pub fn genesis_bound(count: u64) -> u64 {
  count.saturating_add(1)
}

/// Consumes one record's chunks in order. `remaining` is the counter of the
/// last chunk consumed, or `genesis_bound` of the header count before the
/// first one.
pub fn consume(remaining: u64, chunks: &[Chunk]) -> Result<Consumed, OutOfOrder> {
  let mut consumed = Consumed {
    delta_hex: String::new(),
    remaining,
    consumed: 0,
    done: false,
  };

  for chunk in chunks {
    if chunk.counter >= consumed.remaining {
      return Err(OutOfOrder {
        remaining: consumed.remaining,
        found: chunk.counter,
      });
    }

    consumed.delta_hex.push_str(&chunk.data_hex);
    consumed.remaining = chunk.counter;
    consumed.consumed += 1;

    if chunk.counter == 0 {
      consumed.done = true;
      break;
    }
  }

  Ok(consumed)
}

pub fn decode_payload(hex: &str) -> Result<Vec<u8>, hex::FromHexError> {
  if hex.len() % 2 == 1 {
    hex::decode(format!("{hex}{ODD_LENGTH_PADDING}"))
  } else {
    hex::decode(hex)
  }
}

/// Lays `payload` out as unlocking script disassemblies: a genesis script
/// carrying the header and first chunk, then one continuation script per
/// further chunk. An empty payload is a header with a zero count.
pub fn encode(kind: Kind, mime_type: &str, payload: &[u8], chunk_len: usize) -> Vec<String> {
  let chunks = payload.chunks(chunk_len.max(1)).collect::<Vec<&[u8]>>();

  let mut scripts = Vec::new();

  let mut genesis = format!(
    "{} {} {}",
    kind.marker(),
    chunks.len(),
    hex::encode(mime_type)
  );

  for (i, chunk) in chunks.iter().enumerate() {
    let counter = chunks.len() - i - 1;

    if i == 0 {
      genesis.push_str(&format!(" {counter} {}", hex::encode(chunk)));
      scripts.push(genesis.clone());
    } else {
      scripts.push(format!("{counter} {}", hex::encode(chunk)));
    }
  }

  if scripts.is_empty() {
    scripts.push(genesis);
  }

  scripts
}
