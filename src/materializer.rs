use {super::*, error::Io};

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Materialized {
  Written { path: PathBuf },
  Skipped { reason: SkipReason },
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
  AlreadyExists { path: PathBuf },
  UnresolvableMimeType { mime_type: String },
}

impl Display for SkipReason {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::AlreadyExists { path } => write!(f, "{} already exists", path.display()),
      Self::UnresolvableMimeType { mime_type } => {
        write!(f, "no file extension for mime type `{mime_type}`")
      }
    }
  }
}

/// A directory of resolved payloads named `<genesis>.<extension>`. Files are
/// written once and never replaced.
#[derive(Debug, Clone)]
pub struct ContentStore {
  dir: PathBuf,
}

impl ContentStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// The stored file for `genesis`, whatever its extension.
  pub fn existing(&self, genesis: Txid) -> ResolveResult<Option<PathBuf>> {
    let entries = match fs::read_dir(&self.dir) {
      Ok(entries) => entries,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(err).snafu_context(Io { path: &self.dir }),
    };

    let stem = genesis.to_string();

    for entry in entries {
      let path = entry.snafu_context(Io { path: &self.dir })?.path();

      if path.file_stem().and_then(|stem| stem.to_str()) == Some(stem.as_str()) {
        return Ok(Some(path));
      }
    }

    Ok(None)
  }

  pub fn materialize(
    &self,
    genesis: Txid,
    mime_type: &str,
    payload_hex: &str,
  ) -> ResolveResult<Materialized> {
    if let Some(path) = self.existing(genesis)? {
      log::debug!("Content for {genesis} already at {}", path.display());
      return Ok(Materialized::Skipped {
        reason: SkipReason::AlreadyExists { path },
      });
    }

    let Some(extension) = Media::extension_for_content_type(mime_type) else {
      log::warn!("Not materializing {genesis}: unresolvable mime type `{mime_type}`");
      return Ok(Materialized::Skipped {
        reason: SkipReason::UnresolvableMimeType {
          mime_type: mime_type.into(),
        },
      });
    };

    let payload = codec::decode_payload(payload_hex).snafu_context(error::Payload)?;

    fs::create_dir_all(&self.dir).snafu_context(Io { path: &self.dir })?;

    let path = self.dir.join(format!("{genesis}.{extension}"));

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
      Ok(file) => file,
      Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
        return Ok(Materialized::Skipped {
          reason: SkipReason::AlreadyExists { path },
        })
      }
      Err(err) => return Err(err).snafu_context(Io { path }),
    };

    file.write_all(&payload).snafu_context(Io { path: &path })?;

    log::info!("Wrote {} bytes to {}", payload.len(), path.display());

    Ok(Materialized::Written { path })
  }
}

#[cfg(test)]
mod tests {
  use {super::*, tempfile::TempDir};

  #[test]
  fn writes_payload() {
    let tempdir = TempDir::new().unwrap();

    let store = ContentStore::new(tempdir.path().join("content"));

    let path = tempdir.path().join(format!("content/{}.png", txid(1)));

    assert_eq!(
      store.materialize(txid(1), "image/png", "89504e47").unwrap(),
      Materialized::Written { path: path.clone() }
    );

    assert_eq!(fs::read(path).unwrap(), [0x89, 0x50, 0x4e, 0x47]);
  }

  #[test]
  fn parameters_are_stripped() {
    let tempdir = TempDir::new().unwrap();

    let store = ContentStore::new(tempdir.path());

    assert_eq!(
      store
        .materialize(txid(1), "text/plain;charset=utf-8", "6869")
        .unwrap(),
      Materialized::Written {
        path: tempdir.path().join(format!("{}.txt", txid(1)))
      }
    );
  }

  #[test]
  fn existing_file_is_not_replaced() {
    let tempdir = TempDir::new().unwrap();

    let store = ContentStore::new(tempdir.path());

    let path = tempdir.path().join(format!("{}.jpg", txid(1)));

    fs::write(&path, "original").unwrap();

    assert_eq!(
      store.materialize(txid(1), "image/webp", "zz").unwrap(),
      Materialized::Skipped {
        reason: SkipReason::AlreadyExists { path: path.clone() }
      }
    );

    assert_eq!(fs::read_to_string(path).unwrap(), "original");
  }

  #[test]
  fn unresolvable_mime_type() {
    let tempdir = TempDir::new().unwrap();

    let store = ContentStore::new(tempdir.path());

    assert_eq!(
      store
        .materialize(txid(1), "application/x-no-such-type", "00")
        .unwrap(),
      Materialized::Skipped {
        reason: SkipReason::UnresolvableMimeType {
          mime_type: "application/x-no-such-type".into()
        }
      }
    );

    assert_eq!(fs::read_dir(tempdir.path()).unwrap().count(), 0);
  }

  #[test]
  fn odd_payload_is_padded() {
    let tempdir = TempDir::new().unwrap();

    let store = ContentStore::new(tempdir.path());

    store
      .materialize(txid(2), "application/octet-stream", "abc")
      .unwrap();

    assert_eq!(
      fs::read(tempdir.path().join(format!("{}.bin", txid(2)))).unwrap(),
      [0xab, 0xc0, 0x00, 0x00]
    );
  }

  #[test]
  fn invalid_payload() {
    let tempdir = TempDir::new().unwrap();

    assert_matches!(
      ContentStore::new(tempdir.path()).materialize(txid(1), "image/png", "zz"),
      Err(ResolveError::Payload { .. })
    );
  }

  #[test]
  fn skip_reason_display() {
    assert_eq!(
      SkipReason::UnresolvableMimeType {
        mime_type: "x/y".into()
      }
      .to_string(),
      "no file extension for mime type `x/y`"
    );
  }
}
