use super::*;

pub type ResolveResult<T = (), E = ResolveError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum ResolveError {
  #[snafu(display("{source}"))]
  Rpc { source: RpcError },
  #[snafu(display("{source}"))]
  Walk { source: Failure },
  #[snafu(display("payload is not valid hex"))]
  Payload { source: hex::FromHexError },
  #[snafu(display("I/O error at `{}`", path.display()))]
  Io {
    backtrace: Backtrace,
    path: PathBuf,
    source: io::Error,
  },
  #[snafu(display("index for {genesis} cannot list the genesis transaction itself"))]
  SelfReference { genesis: Txid },
}

impl From<RpcError> for ResolveError {
  fn from(source: RpcError) -> Self {
    Self::Rpc { source }
  }
}

impl From<Failure> for ResolveError {
  fn from(source: Failure) -> Self {
    Self::Walk { source }
  }
}

impl ResolveError {
  /// Whether repeating the same step may succeed. Only node failures qualify,
  /// everything else is a property of the chain data.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Rpc { .. })
  }
}

/// `anyhow::Context` is in scope crate-wide, which shadows
/// `snafu::ResultExt::context`. This trait makes the snafu version reachable
/// under a different name.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_rpc_errors_are_retryable() {
    assert!(ResolveError::from(RpcError::new("connection refused")).is_retryable());
    assert!(!ResolveError::from(Failure::CycleDetected { txid: txid(1) }).is_retryable());
    assert!(!ResolveError::SelfReference { genesis: txid(1) }.is_retryable());
  }

  #[test]
  fn io_errors_name_the_path() {
    let err = Err::<(), _>(io::Error::from(io::ErrorKind::PermissionDenied))
      .snafu_context(Io { path: "/content" })
      .unwrap_err();

    assert_eq!(err.to_string(), "I/O error at `/content`");
  }
}
