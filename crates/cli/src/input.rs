//! Reading drafts and package lists from disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while loading an input file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Whether `path` should be parsed as JSON rather than YAML.
fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse file contents by the file's extension.
///
/// # Errors
///
/// Returns the parser error tagged with the path.
pub fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, InputError> {
    if is_json(path) {
        serde_json::from_str(content).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(content).map_err(|source| InputError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Read and parse a YAML or JSON file.
///
/// # Errors
///
/// Returns `InputError` if the file cannot be read or parsed.
pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded input file");
    parse(path, &content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use packline_core::{Flow, ProducedPackage, ReceiptDraft, Unit};
    use rust_decimal::Decimal;

    use super::*;

    const DRAFT_YAML: &str = r"
flow: purchase_receipt
reference: PO-1001
item:
  name: Rod
  grade: A
  size: 10mm
target:
  value: 90
  unit: kg
entries:
  - grossQuantity: 25
    packagingWeight: 2.5
    replicationCount: 4
";

    #[test]
    fn test_yaml_draft() {
        let draft: ReceiptDraft = parse(Path::new("po.yaml"), DRAFT_YAML).unwrap();
        assert_eq!(draft.flow, Flow::PurchaseReceipt);
        assert_eq!(draft.unit(), Unit::Kg);
        assert_eq!(draft.entries[0].replication_count, 4);
        assert!(draft.reconcile().within_tolerance);
    }

    #[test]
    fn test_json_by_extension() {
        let packages: Vec<ProducedPackage> = parse(
            Path::new("packages.JSON"),
            r#"[{"barcode": "PK-1", "netQuantity": 22.5, "unit": "KG"}]"#,
        )
        .unwrap();
        assert_eq!(packages[0].net_quantity, Decimal::new(225, 1));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse::<ReceiptDraft>(Path::new("broken.json"), "{").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON in broken.json"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load::<ReceiptDraft>(Path::new("/nonexistent/draft.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }
}
