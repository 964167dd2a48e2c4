use {super::*, resolve::Resolution};

const SCANNED_COLLECTIONS: &str = "scanned_collections.json";

const UNNAMED_COLLECTION: &str = "Unnamed Collection";

#[derive(Debug, Parser)]
pub(crate) struct Collection {
  #[arg(help = "Resolve the thumbnail and items listed in collection <FILE>.")]
  file: PathBuf,
  #[arg(
    long,
    help = "Scan up to <DEPTH> blocks for each successor. [default: 1000]"
  )]
  depth: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
  #[serde(default)]
  collection: Header,
  #[serde(default)]
  items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct Header {
  name: Option<String>,
  thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
  #[serde(rename = "inscriptionId")]
  inscription_id: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Output {
  pub name: String,
  pub already_scanned: bool,
  pub resolved: usize,
  pub items: Vec<Entry>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Entry {
  pub inscription_id: String,
  pub resolution: Resolution,
}

impl Collection {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let manifest = self.manifest()?;
    let client = settings.client()?;
    Ok(Some(Box::new(self.scan(manifest, &client, &settings)?)))
  }

  fn manifest(&self) -> Result<Manifest> {
    let manifest = fs::read_to_string(&self.file)
      .with_context(|| format!("failed to read collection `{}`", self.file.display()))?;

    serde_json::from_str(&manifest)
      .with_context(|| format!("failed to parse collection `{}`", self.file.display()))
  }

  fn scan(&self, manifest: Manifest, rpc: impl Rpc, settings: &Settings) -> Result<Output> {
    let name = manifest
      .collection
      .name
      .unwrap_or_else(|| UNNAMED_COLLECTION.into());

    let record = settings.data_dir()?.join(SCANNED_COLLECTIONS);

    let mut scanned = load_scanned(&record)?;

    if scanned.contains_key(&name) {
      log::info!("Collection `{name}` already scanned, skipping");
      return Ok(Output {
        name,
        already_scanned: true,
        resolved: 0,
        items: Vec::new(),
      });
    }

    log::info!("Scanning collection `{name}`");

    let ids = manifest.collection.thumbnail.into_iter().chain(
      manifest
        .items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
          if item.inscription_id.is_none() {
            log::warn!("Item {i} of collection `{name}` has no inscription id");
          }
          item.inscription_id
        }),
    );

    let mut items = Vec::new();

    for inscription_id in ids {
      let resolution = match inscription_id.parse::<GenesisId>() {
        Ok(genesis) => Resolution::new(&rpc, settings, genesis.0, self.depth)?,
        Err(err) => {
          log::warn!("Invalid inscription id `{inscription_id}`: {err}");
          Resolution::Failed {
            error: err.to_string(),
          }
        }
      };

      items.push(Entry {
        inscription_id,
        resolution,
      });
    }

    let resolved = items
      .iter()
      .filter(|entry| entry.resolution.is_resolved())
      .count();

    scanned.insert(name.clone(), resolved);

    save_scanned(&record, &scanned)?;

    log::info!("Resolved {resolved} inscriptions for collection `{name}`");

    Ok(Output {
      name,
      already_scanned: false,
      resolved,
      items,
    })
  }
}

fn load_scanned(path: &Path) -> Result<BTreeMap<String, usize>> {
  match fs::read_to_string(path) {
    Ok(json) => serde_json::from_str(&json)
      .with_context(|| format!("failed to parse `{}`", path.display())),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
    Err(err) => Err(err).with_context(|| format!("failed to read `{}`", path.display())),
  }
}

fn save_scanned(path: &Path, scanned: &BTreeMap<String, usize>) -> Result {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create `{}`", parent.display()))?;
  }

  fs::write(path, serde_json::to_string_pretty(scanned)?)
    .with_context(|| format!("failed to write `{}`", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn collection(dir: &Path, json: &str) -> Collection {
    let file = dir.join("collection.json");
    fs::write(&file, json).unwrap();
    Collection { file, depth: None }
  }

  fn scan(collection: &Collection, node: &MemoryNode, settings: &Settings) -> Output {
    collection
      .scan(collection.manifest().unwrap(), node, settings)
      .unwrap()
  }

  #[test]
  fn file_is_required() {
    assert!(Arguments::try_parse_from(["arcade", "collection"]).is_err());

    assert_matches!(
      Arguments::try_parse_from(["arcade", "collection", "shibes.json", "--depth", "7"])
        .unwrap()
        .subcommand,
      Subcommand::Collection(Collection {
        file,
        depth: Some(7),
      }) if file == Path::new("shibes.json")
    );
  }

  #[test]
  fn thumbnail_and_items_are_resolved() {
    let tempdir = tempfile::tempdir().unwrap();
    let settings = regtest_settings(tempdir.path());

    let node = MemoryNode::new();

    let thumbnail = node.inscribe(Kind::Inscription, "image/png", &[1; 10], 240)[0];
    let first = node.inscribe(Kind::Inscription, "image/png", &[2; 500], 240)[0];
    let second = node.inscribe(Kind::Inscription, "text/plain", b"wow", 240)[0];

    super::resolve::resolve(&node, &settings, second, None).unwrap();

    let output = scan(
      &collection(
        tempdir.path(),
        &format!(
          r#"{{
            "collection": {{ "name": "Shibes", "thumbnail": "{thumbnail}i0" }},
            "items": [
              {{ "inscriptionId": "{first}i0" }},
              {{ "inscriptionId": "{second}i0" }},
              {{ "inscriptionId": "{second}i1" }},
              {{ "name": "no id" }}
            ]
          }}"#
        ),
      ),
      &node,
      &settings,
    );

    assert_eq!(output.name, "Shibes");
    assert!(!output.already_scanned);
    assert_eq!(output.resolved, 2);

    assert_eq!(
      output
        .items
        .iter()
        .map(|entry| entry.inscription_id.clone())
        .collect::<Vec<String>>(),
      [
        format!("{thumbnail}i0"),
        format!("{first}i0"),
        format!("{second}i0"),
        format!("{second}i1"),
      ]
    );

    assert!(output.items[0].resolution.is_resolved());
    assert!(output.items[1].resolution.is_resolved());
    assert_matches!(&output.items[2].resolution, Resolution::Stored { .. });
    assert_matches!(
      &output.items[3].resolution,
      Resolution::Failed { error } if error == "invalid suffix `i1`, expected `i0`"
    );

    let data_dir = settings.data_dir().unwrap();

    assert_eq!(
      fs::read(data_dir.join("content").join(format!("{first}.png"))).unwrap(),
      [2; 500]
    );

    assert_eq!(
      load_scanned(&data_dir.join(SCANNED_COLLECTIONS)).unwrap(),
      BTreeMap::from([("Shibes".to_string(), 2)])
    );
  }

  #[test]
  fn scanned_collection_is_skipped() {
    let tempdir = tempfile::tempdir().unwrap();
    let settings = regtest_settings(tempdir.path());

    let node = MemoryNode::new();

    let genesis = node.inscribe(Kind::Inscription, "text/plain", b"such", 240)[0];

    let collection = collection(
      tempdir.path(),
      &format!(r#"{{ "collection": {{}}, "items": [ {{ "inscriptionId": "{genesis}i0" }} ] }}"#),
    );

    let first = scan(&collection, &node, &settings);

    assert_eq!(first.name, UNNAMED_COLLECTION);
    assert_eq!(first.resolved, 1);

    node.reset_calls();

    let second = scan(&collection, &node, &settings);

    assert_eq!(
      second,
      Output {
        name: UNNAMED_COLLECTION.into(),
        already_scanned: true,
        resolved: 0,
        items: Vec::new(),
      }
    );

    assert_eq!(node.transaction_calls(), 0);
  }

  #[test]
  fn malformed_collection_is_an_error() {
    let tempdir = tempfile::tempdir().unwrap();

    assert_regex_match!(
      collection(tempdir.path(), "{ \"items\": 7 }")
        .manifest()
        .unwrap_err(),
      "failed to parse collection `.*collection.json`"
    );
  }

  #[test]
  fn scanned_record_accumulates_collections() {
    let tempdir = tempfile::tempdir().unwrap();
    let settings = regtest_settings(tempdir.path());

    let node = MemoryNode::new();

    scan(
      &collection(tempdir.path(), r#"{ "collection": { "name": "a" } }"#),
      &node,
      &settings,
    );

    scan(
      &collection(tempdir.path(), r#"{ "collection": { "name": "b" } }"#),
      &node,
      &settings,
    );

    let record = settings.data_dir().unwrap().join(SCANNED_COLLECTIONS);

    assert_eq!(
      load_scanned(&record).unwrap(),
      BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 0)])
    );

    assert_eq!(
      fs::read_to_string(record).unwrap(),
      "{\n  \"a\": 0,\n  \"b\": 0\n}"
    );
  }
}
