//! One source file, one transaction

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, ParsingOptions};
use sha2::{Digest, Sha256};

use crate::parser::{DocumentWalker, ForeignKeyChain, Record, SqlValue, WalkStats};
use crate::schema::{SchemaRegistry, TableSchema, FILE_ID_FIELD};
use crate::writer::{Database, Session};
use crate::{Error, Result};

/// Result of importing one file
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub file: PathBuf,
    pub elapsed: Duration,
    /// Document rows written, the source file row excluded
    pub records: usize,
    pub error: Option<String>,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

/// Hex SHA-256 of the raw file bytes
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Import `path` as a single all-or-nothing unit.
///
/// Never returns an error: failures are captured in the outcome so the batch
/// can carry on with the next file.
pub fn import_file(db: &mut Database, registry: &SchemaRegistry, path: &Path) -> ImportOutcome {
    let start = Instant::now();
    let result = try_import(db, registry, path);
    let elapsed = start.elapsed();

    match result {
        Ok(stats) => {
            tracing::info!(
                "Imported {} ({} records, {} pass-through) in {:.2}s",
                path.display(),
                stats.records,
                stats.passthrough,
                elapsed.as_secs_f64()
            );
            ImportOutcome {
                file: path.to_path_buf(),
                elapsed,
                records: stats.records,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to import {}: {}", path.display(), e);
            ImportOutcome {
                file: path.to_path_buf(),
                elapsed,
                records: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

fn try_import(db: &mut Database, registry: &SchemaRegistry, path: &Path) -> Result<WalkStats> {
    let bytes = fs::read(path)?;
    let hash = content_hash(&bytes);

    // Checked before any transaction exists
    if let Some(existing_id) = db.find_file_by_hash(&hash)? {
        return Err(Error::DuplicateFile { hash, existing_id });
    }

    let mut session = db.begin()?;
    match populate(&mut session, registry, path, &bytes, &hash) {
        Ok(stats) => {
            session.commit()?;
            Ok(stats)
        }
        Err(e) => {
            tracing::debug!("Rolling back {}", path.display());
            if let Err(rollback_err) = session.rollback() {
                tracing::error!("Rollback of {} failed: {}", path.display(), rollback_err);
            }
            Err(e)
        }
    }
}

fn populate(
    session: &mut Session<'_>,
    registry: &SchemaRegistry,
    path: &Path,
    bytes: &[u8],
    hash: &str,
) -> Result<WalkStats> {
    let file_id = session.insert(source_file_record(registry.anchor(), path, bytes.len(), hash))?;
    let chain = ForeignKeyChain::seed(file_id, FILE_ID_FIELD);

    let text = decode(bytes)?;
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(&text, options)?;

    DocumentWalker::new(registry, session).walk_document(doc.root_element(), &chain)
}

fn source_file_record(anchor: &'static TableSchema, path: &Path, size: usize, hash: &str) -> Record {
    let mut record = Record::new(anchor);
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    record.set("filename", SqlValue::Text(filename));
    record.set("size", SqlValue::Integer(size as i64));
    if let Some(ext) = path.extension() {
        record.set("extension", SqlValue::Text(ext.to_string_lossy().into_owned()));
    }
    record.set("hash", SqlValue::Text(hash.to_string()));
    record
}

/// Source text of an XML file. A byte order mark wins, then the encoding
/// named in the XML declaration, then UTF-8.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(bytes).unwrap_or(UTF_8),
    };

    // `decode` strips the BOM itself
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(Error::Encoding(used.name()));
    }
    tracing::debug!("Decoded {} bytes as {}", bytes.len(), used.name());
    Ok(text)
}

/// Encoding label from `<?xml ... encoding="..."?>`, if the file starts with
/// one that encoding_rs knows
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = bytes.strip_prefix(b"<?xml")?;
    let end = head.windows(2).position(|w| w == b"?>")?;
    let declaration = &head[..end];

    let at = declaration.windows(8).position(|w| w == b"encoding")?;
    let value = declaration[at + 8..]
        .trim_ascii_start()
        .strip_prefix(b"=")?
        .trim_ascii_start();
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = value.iter().position(|&b| b == quote)?;

    // Without a BOM the declaration was readable as ASCII, so a UTF-16 label
    // can't be right
    Encoding::for_label(&value[..len]).map(Encoding::output_encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ALL_TABLES, DEFAULT_TABLE_PREFIX};

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash(b"<a/>"), content_hash(b"<a />"));
    }

    fn utf16le_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        bytes
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
        assert_eq!(decode(&utf16le_with_bom("<a b=\"测\"/>")).unwrap(), "<a b=\"测\"/>");
    }

    #[test]
    fn test_decode_follows_declared_encoding() {
        let (body, _, _) = encoding_rs::GBK.encode("<a b=\"测试\"/>");
        let mut bytes = b"<?xml version=\"1.0\" encoding = 'GB2312'?>".to_vec();
        bytes.extend_from_slice(&body);

        let text = decode(&bytes).unwrap();
        assert!(text.ends_with("<a b=\"测试\"/>"));
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding=\"gbk\"?><a/>"),
            Some(encoding_rs::GBK)
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><a/>"), None);
        assert_eq!(declared_encoding(b"<a encoding=\"gbk\"/>"), None);
        assert_eq!(declared_encoding(b"<?xml encoding=\"klingon\"?>"), None);
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding=\"UTF-16\"?>"),
            Some(UTF_8)
        );
    }

    #[test]
    fn test_duplicate_is_rejected_before_begin() {
        let registry = SchemaRegistry::discover(ALL_TABLES, DEFAULT_TABLE_PREFIX).unwrap();
        let mut db = Database::open_in_memory().unwrap();
        db.create_tables(registry.tracked_tables()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.13jt");
        std::fs::write(&path, "<jingjibiao/>").unwrap();

        assert!(try_import(&mut db, &registry, &path).is_ok());
        assert_eq!(db.transactions_begun(), 1);

        let err = try_import(&mut db, &registry, &path).unwrap_err();
        assert!(matches!(err, Error::DuplicateFile { existing_id: 1, .. }));
        assert_eq!(db.transactions_begun(), 1);
    }

    #[test]
    fn test_invalid_bytes_fail_decoding() {
        assert!(matches!(decode(b"<a b=\"\xFF\"/>"), Err(Error::Encoding("UTF-8"))));
    }
}
