use super::*;

/// Disassembly of the push `"ord"`, which opens an inscription genesis.
pub const INSCRIPTION_MARKER: &str = "6582895";

/// Disassembly of the push `"sms"`, which opens an encrypted message genesis.
pub const MESSAGE_MARKER: &str = "7564659";

/// An empty push, standing in for "no chunks follow".
const ZERO_LENGTH: &str = "0";

/// Tag of a delegate field in an ordinals envelope.
const DELEGATE_TAG: &str = "11";

const TXID_HEX_LEN: usize = Txid::LEN * 2;

#[derive(Debug, PartialEq, Clone)]
pub struct Chunk {
  pub counter: u64,
  pub data_hex: String,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ScriptRecord {
  Genesis {
    kind: Kind,
    count: u64,
    mime_type: String,
    chunks: Vec<Chunk>,
  },
  Continuation {
    chunks: Vec<Chunk>,
  },
  Delegate {
    genesis_txid: Txid,
  },
}

#[derive(Debug, PartialEq, Clone, Snafu)]
#[snafu(context(suffix(false)))]
pub enum InvalidScript {
  #[snafu(display("script is empty"))]
  Empty,
  #[snafu(display("script has {found} tokens, {needed} required"))]
  Truncated { needed: usize, found: usize },
  #[snafu(display("invalid chunk counter `{token}`"))]
  Counter { token: String },
  #[snafu(display("chunk {counter} has no data"))]
  MissingChunk { counter: u64 },
  #[snafu(display("mime type `{hex}` is not printable ascii"))]
  MimeType { hex: String },
  #[snafu(display("delegate reference `{token}` is not a transaction id"))]
  DelegateId { token: String },
  #[snafu(display("unrecognized script starting with `{token}`"))]
  Unrecognized { token: String },
}

impl ScriptRecord {
  pub fn parse(asm: &str) -> Result<Self, InvalidScript> {
    Self::from_tokens(&asm.split_whitespace().collect::<Vec<&str>>())
  }

  pub fn from_tokens(tokens: &[&str]) -> Result<Self, InvalidScript> {
    let Some(&first) = tokens.first() else {
      return Empty.fail();
    };

    let kind = match first {
      INSCRIPTION_MARKER => Kind::Inscription,
      MESSAGE_MARKER => Kind::Message,
      token if counter(token).is_some() => {
        return Ok(Self::Continuation {
          chunks: chunks(tokens)?,
        })
      }
      token => return Unrecognized { token }.fail(),
    };

    if kind == Kind::Inscription
      && tokens.get(1) == Some(&ZERO_LENGTH)
      && tokens.get(2) == Some(&DELEGATE_TAG)
    {
      let Some(&token) = tokens.get(3) else {
        return Truncated {
          needed: 4usize,
          found: tokens.len(),
        }
        .fail();
      };

      return Ok(Self::Delegate {
        genesis_txid: delegate_txid(token)?,
      });
    }

    if tokens.len() < 3 {
      return Truncated {
        needed: 3usize,
        found: tokens.len(),
      }
      .fail();
    }

    let count = counter(tokens[1]).ok_or_else(|| Counter { token: tokens[1] }.build())?;

    let mime_type = hex::decode(tokens[2])
      .ok()
      .and_then(|bytes| String::from_utf8(bytes).ok())
      .filter(|mime_type| {
        mime_type
          .bytes()
          .all(|byte| byte.is_ascii_graphic() || byte == b' ')
      })
      .ok_or_else(|| MimeType { hex: tokens[2] }.build())?;

    Ok(Self::Genesis {
      kind,
      count,
      mime_type,
      chunks: chunks(&tokens[3..])?,
    })
  }

  pub fn chunks(&self) -> &[Chunk] {
    match self {
      Self::Genesis { chunks, .. } | Self::Continuation { chunks } => chunks,
      Self::Delegate { .. } => &[],
    }
  }
}

/// Counters may disassemble with a leading minus sign, which is ignored.
fn counter(token: &str) -> Option<u64> {
  let digits = token.strip_prefix('-').unwrap_or(token);

  if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
    return None;
  }

  digits.parse().ok()
}

fn chunks(tokens: &[&str]) -> Result<Vec<Chunk>, InvalidScript> {
  let mut chunks = Vec::new();
  let mut index = 0;

  while let Some(counter) = tokens.get(index).copied().and_then(counter) {
    let Some(&data_hex) = tokens.get(index + 1) else {
      return MissingChunk { counter }.fail();
    };

    chunks.push(Chunk {
      counter,
      data_hex: data_hex.into(),
    });

    index += 2;
  }

  Ok(chunks)
}

fn delegate_txid(token: &str) -> Result<Txid, InvalidScript> {
  let reference = token.get(..TXID_HEX_LEN).unwrap_or(token);

  decode_reversed_id(reference)
    .parse()
    .map_err(|_| DelegateId { token }.build())
}

/// Recovers a transaction id embedded in serialized byte order: reverse the
/// whole string, then swap every adjacent pair of characters.
pub fn decode_reversed_id(hex: &str) -> String {
  hex
    .chars()
    .rev()
    .collect::<Vec<char>>()
    .chunks(2)
    .flat_map(|pair| pair.iter().rev())
    .collect()
}
