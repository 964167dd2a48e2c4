use super::*;

/// The genesis transaction of an inscription. Parses from a bare txid or from
/// an inscription id with index zero, since a genesis carries one inscription.
#[derive(Debug, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub struct GenesisId(pub Txid);

impl Display for GenesisId {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug)]
pub enum ParseError {
  Character(char),
  Length(usize),
  Suffix(String),
  Txid(bitcoin::hex::HexToArrayError),
}

impl Display for ParseError {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Character(c) => write!(f, "invalid character: '{c}'"),
      Self::Length(len) => write!(f, "invalid length: {len}"),
      Self::Suffix(suffix) => write!(f, "invalid suffix `{suffix}`, expected `i0`"),
      Self::Txid(err) => write!(f, "invalid txid: {err}"),
    }
  }
}

impl std::error::Error for ParseError {}

impl FromStr for GenesisId {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some(char) = s.chars().find(|char| !char.is_ascii()) {
      return Err(ParseError::Character(char));
    }

    const TXID_LEN: usize = 64;

    if s.len() < TXID_LEN {
      return Err(ParseError::Length(s.len()));
    }

    let (txid, suffix) = s.split_at(TXID_LEN);

    if !suffix.is_empty() && suffix != "i0" {
      return Err(ParseError::Suffix(suffix.into()));
    }

    Ok(Self(txid.parse().map_err(ParseError::Txid)?))
  }
}

impl From<Txid> for GenesisId {
  fn from(txid: Txid) -> Self {
    Self(txid)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(
      GenesisId(txid(1)).to_string(),
      "1111111111111111111111111111111111111111111111111111111111111111",
    );
  }

  #[test]
  fn from_str() {
    assert_eq!(
      "1111111111111111111111111111111111111111111111111111111111111111"
        .parse::<GenesisId>()
        .unwrap(),
      GenesisId(txid(1)),
    );
    assert_eq!(
      "1111111111111111111111111111111111111111111111111111111111111111i0"
        .parse::<GenesisId>()
        .unwrap(),
      GenesisId(txid(1)),
    );
  }

  #[test]
  fn from_str_bad_character() {
    assert_matches!("→".parse::<GenesisId>(), Err(ParseError::Character('→')));
  }

  #[test]
  fn from_str_bad_length() {
    assert_matches!("foo".parse::<GenesisId>(), Err(ParseError::Length(3)));
  }

  #[test]
  fn from_str_bad_suffix() {
    assert_matches!(
      "1111111111111111111111111111111111111111111111111111111111111111i1".parse::<GenesisId>(),
      Err(ParseError::Suffix(suffix)) if suffix == "i1"
    );
  }

  #[test]
  fn from_str_bad_txid() {
    assert_matches!(
      "x111111111111111111111111111111111111111111111111111111111111111".parse::<GenesisId>(),
      Err(ParseError::Txid(_))
    );
  }
}
