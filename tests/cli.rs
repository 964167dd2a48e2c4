use {super::*, arcade::subcommand::prune_indexes::Output};

#[test]
fn prune_indexes_on_empty_data_dir() {
  let (_, output) = CommandBuilder::new("prune-indexes").run_and_deserialize_output::<Output>();

  assert_eq!(output, Output { pruned: Vec::new() });
}

#[test]
fn prune_indexes_removes_short_files() {
  let genesis = Txid::all_zeros();
  let successor = Txid::from_byte_array([1; 32]);

  let (tempdir, output) = CommandBuilder::new("prune-indexes")
    .write(format!("indexes/{genesis}.txt"), "")
    .write(format!("indexes/{successor}.txt"), format!("{genesis}\n"))
    .run_and_deserialize_output::<Output>();

  assert_eq!(
    output,
    Output {
      pruned: vec![tempdir.path().join("indexes").join(format!("{genesis}.txt"))],
    }
  );

  assert!(tempdir
    .path()
    .join("indexes")
    .join(format!("{successor}.txt"))
    .is_file());
}

#[test]
fn yaml_output() {
  CommandBuilder::new("--format yaml prune-indexes")
    .stdout_regex("pruned: \\[\\]\n+")
    .run();
}

#[test]
fn minified_output() {
  CommandBuilder::new("--format minify prune-indexes")
    .stdout_regex(r#"\{"pruned":\[\]\}\n"#)
    .run();
}

#[test]
fn invalid_genesis_is_rejected() {
  CommandBuilder::new("resolve foo")
    .stderr_regex("error: invalid value 'foo' for '<GENESIS>'.*")
    .expected_exit_code(2)
    .run();
}

#[test]
fn missing_cookie_file_is_reported() {
  CommandBuilder::new("--cookie-file missing.cookie resolve 0000000000000000000000000000000000000000000000000000000000000000")
    .stderr_regex("error: cookie file `missing.cookie` does not exist\n")
    .expected_exit_code(1)
    .run();
}

#[test]
fn chain_flags_conflict() {
  CommandBuilder::new("--regtest --testnet prune-indexes")
    .stderr_regex("error: the argument '--regtest' cannot be used with '--testnet'.*")
    .expected_exit_code(2)
    .run();
}

#[test]
fn missing_collection_file_is_reported_before_connecting() {
  CommandBuilder::new("collection shibes.json")
    .stderr_regex("error: failed to read collection `shibes.json`\n\nbecause:\n- .*\n")
    .expected_exit_code(1)
    .run();
}

#[test]
fn malformed_collection_file_is_reported() {
  CommandBuilder::new("collection collections/shibes.json")
    .write("collections/shibes.json", r#"{"items": {}}"#)
    .stderr_regex("error: failed to parse collection `collections/shibes.json`\n\nbecause:\n- .*\n")
    .expected_exit_code(1)
    .run();
}

#[test]
fn unspent_depth_requires_resolve() {
  CommandBuilder::new("unspent --depth 10")
    .stderr_regex("error: the following required arguments were not provided:\n  --resolve.*")
    .expected_exit_code(2)
    .run();
}
