use super::*;

#[derive(Debug)]
enum Expectation {
  Empty,
  Pattern(Regex),
}

impl Expectation {
  fn pattern(pattern: &str) -> Self {
    Self::Pattern(Regex::new(&format!("^(?s){pattern}$")).unwrap())
  }

  #[track_caller]
  fn check(&self, stream: &str, output: &str) {
    match self {
      Self::Empty => pretty_assert_eq!(output, "", "unexpected {stream}"),
      Self::Pattern(regex) => assert!(
        regex.is_match(output),
        "{stream} did not match {regex}:\n{output}",
      ),
    }
  }
}

/// Runs the `arcade` binary with its data dir and home inside a fresh
/// tempdir, so no user configuration leaks into a test.
pub(crate) struct CommandBuilder {
  args: Vec<String>,
  expected_exit_code: i32,
  expected_stderr: Expectation,
  expected_stdout: Expectation,
  tempdir: TempDir,
}

impl CommandBuilder {
  pub(crate) fn new(args: &str) -> Self {
    Self {
      args: args.split_whitespace().map(str::to_string).collect(),
      expected_exit_code: 0,
      expected_stderr: Expectation::Empty,
      expected_stdout: Expectation::Empty,
      tempdir: TempDir::new().unwrap(),
    }
  }

  pub(crate) fn write(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
    let path = self.tempdir.path().join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    self
  }

  pub(crate) fn stdout_regex(self, expected_stdout: impl AsRef<str>) -> Self {
    Self {
      expected_stdout: Expectation::pattern(expected_stdout.as_ref()),
      ..self
    }
  }

  pub(crate) fn stderr_regex(self, expected_stderr: impl AsRef<str>) -> Self {
    Self {
      expected_stderr: Expectation::pattern(expected_stderr.as_ref()),
      ..self
    }
  }

  pub(crate) fn expected_exit_code(self, expected_exit_code: i32) -> Self {
    Self {
      expected_exit_code,
      ..self
    }
  }

  fn command(&self) -> Command {
    let mut command = Command::new(executable_path("arcade"));

    command
      .env_remove("RUST_BACKTRACE")
      .env_remove("RUST_LOG")
      .env("HOME", self.tempdir.path())
      .current_dir(self.tempdir.path())
      .arg("--data-dir")
      .arg(self.tempdir.path())
      .args(&self.args);

    for (key, _) in std::env::vars_os() {
      if key.to_string_lossy().starts_with("ARCADE_") {
        command.env_remove(key);
      }
    }

    command
  }

  #[track_caller]
  pub(crate) fn run(self) -> (TempDir, String) {
    let output = self.command().output().unwrap();

    let stdout = str::from_utf8(&output.stdout).unwrap();
    let stderr = str::from_utf8(&output.stderr).unwrap();

    if output.status.code() != Some(self.expected_exit_code) {
      panic!(
        "Test failed: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
      );
    }

    self.expected_stderr.check("stderr", stderr);
    self.expected_stdout.check("stdout", stdout);

    let stdout = stdout.to_string();

    (self.tempdir, stdout)
  }

  #[track_caller]
  pub(crate) fn run_and_deserialize_output<T: DeserializeOwned>(self) -> (TempDir, T) {
    let (tempdir, stdout) = self.stdout_regex(".*").run();

    let output = serde_json::from_str(&stdout)
      .unwrap_or_else(|err| panic!("Failed to deserialize JSON: {err}\n{stdout}"));

    (tempdir, output)
  }
}
