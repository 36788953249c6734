//! YAML frontmatter splitting and parsing.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Parsed frontmatter mapping.
pub type Frontmatter = serde_json::Map<String, Value>;

/// Frontmatter parsing error.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// Block is not valid YAML.
    #[error("Invalid frontmatter in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// Block is valid YAML but not a mapping.
    #[error("Frontmatter in {} must be a mapping", path.display())]
    NotMapping { path: PathBuf },
}

/// Split a leading `---` block off `source` and parse it as YAML.
///
/// Returns the frontmatter and the remaining content. Without a block the
/// frontmatter is empty and the content is `source` unchanged. An empty block
/// yields an empty mapping. `path` is used for error messages only.
///
/// # Errors
///
/// Returns an error if the block is malformed YAML or not a mapping.
pub fn load_frontmatter(
    source: &str,
    path: &Path,
) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some((yaml, content)) = split_block(source) else {
        return Ok((Frontmatter::new(), source.to_owned()));
    };

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::new(), content.to_owned()));
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(|source| FrontmatterError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok((map, content.to_owned())),
        Value::Null => Ok((Frontmatter::new(), content.to_owned())),
        _ => Err(FrontmatterError::NotMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Locate the frontmatter block, returning `(yaml, rest)`.
fn split_block(source: &str) -> Option<(&str, &str)> {
    let mut lines = source.split_inclusive('\n');
    let first = lines.next()?;
    if !is_fence(first) {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            return Some((&source[yaml_start..offset], &source[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}
