use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A markdown file split into its YAML front matter and body.
#[derive(Debug, Default)]
pub struct Document {
    pub meta: serde_yaml::Mapping,
    pub body: String,
}

impl Document {
    /// Deserializes the metadata into `T`, with a non-empty body merged
    /// in under the `content` key. A document that does not match the
    /// expected shape degrades to `T::default()` with a warning, so one
    /// bad file cannot take down a whole listing.
    pub fn decode<T: DeserializeOwned + Default>(mut self, origin: &Path) -> T {
        if !self.body.is_empty() {
            self.meta.insert(
                serde_yaml::Value::String("content".to_owned()),
                serde_yaml::Value::String(self.body),
            );
        }

        match serde_yaml::from_value(serde_yaml::Value::Mapping(self.meta)) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(file = %origin.display(), error = %err, "front matter does not match the expected shape");
                T::default()
            }
        }
    }
}

/// Splits a raw file into front matter and body. Files without an
/// opening `---` line are all body. Malformed YAML degrades to an empty
/// mapping with a warning.
pub fn parse(raw: &str, origin: &Path) -> Document {
    let Some((header, body)) = split(raw) else {
        return Document {
            meta: serde_yaml::Mapping::new(),
            body: raw.trim().to_owned(),
        };
    };

    let meta = if header.trim().is_empty() {
        serde_yaml::Mapping::new()
    } else {
        match serde_yaml::from_str(header) {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(file = %origin.display(), error = %err, "malformed front matter, treating as empty");
                serde_yaml::Mapping::new()
            }
        }
    };

    Document {
        meta,
        body: body.trim().to_owned(),
    }
}

/// Renders front matter back to a full file, for writing submissions to
/// the content tree.
pub fn render<T: Serialize>(meta: &T) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("---\n{}---\n", yaml))
}

fn split(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }

        offset += line.len();
    }

    // The header was never closed, treat the whole remainder as metadata.
    Some((rest, ""))
}
