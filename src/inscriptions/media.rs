use {self::Media::*, super::*};

/// Coarse category of an inscription's content, reported alongside the
/// mime type.
#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Media {
  Audio,
  Document,
  Image,
  Text,
  Unknown,
  Video,
}

impl Media {
  #[rustfmt::skip]
  const TABLE: &'static [(&'static str, Media, &'static str)] = &[
    ("application/cbor",          Unknown,  "cbor"),
    ("application/json",          Text,     "json"),
    ("application/msword",        Document, "doc"),
    ("application/octet-stream",  Unknown,  "bin"),
    ("application/pdf",           Document, "pdf"),
    ("application/pgp-signature", Text,     "asc"),
    ("application/x-javascript",  Text,     "js"),
    ("application/yaml",          Text,     "yaml"),
    ("application/zip",           Unknown,  "zip"),
    ("audio/flac",                Audio,    "flac"),
    ("audio/mpeg",                Audio,    "mp3"),
    ("audio/wav",                 Audio,    "wav"),
    ("font/otf",                  Unknown,  "otf"),
    ("font/ttf",                  Unknown,  "ttf"),
    ("font/woff",                 Unknown,  "woff"),
    ("font/woff2",                Unknown,  "woff2"),
    ("image/apng",                Image,    "apng"),
    ("image/avif",                Image,    "avif"),
    ("image/bmp",                 Image,    "bmp"),
    ("image/gif",                 Image,    "gif"),
    ("image/jpeg",                Image,    "jpg"),
    ("image/png",                 Image,    "png"),
    ("image/svg+xml",             Image,    "svg"),
    ("image/webp",                Image,    "webp"),
    ("model/gltf+json",           Unknown,  "gltf"),
    ("model/gltf-binary",         Unknown,  "glb"),
    ("model/stl",                 Unknown,  "stl"),
    ("text/css",                  Text,     "css"),
    ("text/csv",                  Text,     "csv"),
    ("text/html",                 Text,     "html"),
    ("text/javascript",           Text,     "js"),
    ("text/markdown",             Text,     "md"),
    ("text/plain",                Text,     "txt"),
    ("text/x-python",             Text,     "py"),
    ("video/mp4",                 Video,    "mp4"),
    ("video/webm",                Video,    "webm"),
  ];

  /// Extension, without the dot, for files of `content_type`. Parameters such
  /// as `;charset=utf-8` are ignored. Types missing from the table fall back
  /// to the system mime database.
  pub(crate) fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    lazy_static! {
      static ref CONTENT_TYPE_TO_EXTENSION: BTreeMap<&'static str, &'static str> = Media::TABLE
        .iter()
        .map(|(content_type, _media, extension)| (*content_type, *extension))
        .collect();
    }

    let essence = essence(content_type)?;

    if let Some(extension) = CONTENT_TYPE_TO_EXTENSION.get(essence.as_str()) {
      return Some(*extension);
    }

    mime_guess::get_mime_extensions_str(&essence)?
      .first()
      .copied()
  }
}

fn essence(content_type: &str) -> Option<String> {
  let essence = content_type
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_lowercase();

  if essence.is_empty() {
    None
  } else {
    Some(essence)
  }
}

impl FromStr for Media {
  type Err = Error;

  /// Types missing from the table are categorized by their top-level type.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let essence = essence(s).ok_or_else(|| anyhow!("empty content type"))?;

    if let Some((_, media, _)) = Self::TABLE
      .iter()
      .find(|(content_type, _, _)| *content_type == essence)
    {
      return Ok(*media);
    }

    match essence.split('/').next().unwrap_or_default() {
      "audio" => Ok(Audio),
      "image" => Ok(Image),
      "text" => Ok(Text),
      "video" => Ok(Video),
      _ => Err(anyhow!("unknown content type: {s}")),
    }
  }
}
