use super::*;

pub use self::{genesis_id::GenesisId, inscription::Inscription, media::Media};

pub mod codec;
mod genesis_id;
mod inscription;
mod media;
pub mod record;

/// What a genesis record opens: a plain inscription or an encrypted message.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
  Inscription,
  Message,
}

impl Kind {
  pub fn marker(self) -> &'static str {
    match self {
      Self::Inscription => record::INSCRIPTION_MARKER,
      Self::Message => record::MESSAGE_MARKER,
    }
  }

  /// Content store directory name for resolved payloads of this kind.
  pub fn store(self) -> &'static str {
    match self {
      Self::Inscription => "content",
      Self::Message => "messages",
    }
  }
}

impl Display for Kind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Inscription => "inscription",
        Self::Message => "message",
      }
    )
  }
}
