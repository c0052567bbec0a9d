//! Input resolution: locate `.docx` files and pull out their main markup part.
//!
//! A `.docx` is a zip container; the timetable lives in
//! `word/document.xml`. The container is validated by its magic bytes
//! (`PK\x03\x04`) before unzipping so callers get a meaningful error for,
//! say, a legacy `.doc` renamed to `.docx`.

use crate::error::TimetableError;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Archive entry holding the document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Read `word/document.xml` from a `.docx` file on disk.
pub fn read_document_xml(path: &Path) -> Result<Vec<u8>, TimetableError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => TimetableError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => TimetableError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;
    extract_part(&bytes, path)
}

/// Read `word/document.xml` from an in-memory `.docx`.
pub fn document_xml_from_bytes(bytes: &[u8]) -> Result<Vec<u8>, TimetableError> {
    extract_part(bytes, Path::new("<memory>"))
}

fn extract_part(bytes: &[u8], path: &Path) -> Result<Vec<u8>, TimetableError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(TimetableError::NotADocx {
            path: path.to_path_buf(),
            magic,
        });
    }

    let missing = |detail: String| TimetableError::MissingDocumentPart {
        path: path.to_path_buf(),
        part: DOCUMENT_PART,
        detail,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| missing(e.to_string()))?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| missing(e.to_string()))?;
    let mut xml = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut xml)
        .map_err(|e| missing(e.to_string()))?;

    debug!("Read {} bytes of markup from {}", xml.len(), path.display());
    Ok(xml)
}

/// `.docx` files directly inside `dir`, sorted by name.
///
/// Editor lock files (`~$name.docx`) are skipped.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, TimetableError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => TimetableError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => TimetableError::FileNotFound {
            path: dir.to_path_buf(),
        },
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_document(path))
        .collect();
    files.sort();
    debug!("Found {} documents in {}", files.len(), dir.display());
    Ok(files)
}

fn is_document(path: &Path) -> bool {
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
    let is_lock = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('~'));
    has_ext && !is_lock
}

/// File name up to its first `.`: `ПІ-11.2023.docx` → `ПІ-11`.
pub fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_document_part() {
        let bytes = docx(&[("[Content_Types].xml", "<x/>"), (DOCUMENT_PART, "<w:document/>")]);
        assert_eq!(document_xml_from_bytes(&bytes).unwrap(), b"<w:document/>");
    }

    #[test]
    fn missing_part_is_reported() {
        let bytes = docx(&[("word/styles.xml", "<x/>")]);
        let err = document_xml_from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            TimetableError::MissingDocumentPart { part: DOCUMENT_PART, .. }
        ));
    }

    #[test]
    fn non_zip_is_rejected_with_magic() {
        let err = document_xml_from_bytes(b"\xD0\xCF\x11\xE0rest").unwrap_err();
        match err {
            TimetableError::NotADocx { magic, .. } => assert_eq!(magic, [0xD0, 0xCF, 0x11, 0xE0]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            document_xml_from_bytes(b"PK").unwrap_err(),
            TimetableError::NotADocx { magic: [b'P', b'K', 0, 0], .. }
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_document_xml(Path::new("/nonexistent/a.docx")).unwrap_err();
        assert!(matches!(err, TimetableError::FileNotFound { .. }));
    }

    #[test]
    fn lists_docx_without_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.DOCX", "~$a.docx", "notes.txt", "c.doc"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.docx")).unwrap();

        let names: Vec<_> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.DOCX", "b.docx"]);
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(document_stem(Path::new("dir/ПІ-11.docx")), "ПІ-11");
        assert_eq!(document_stem(Path::new("ПІ-11.2023.docx")), "ПІ-11");
        assert_eq!(document_stem(Path::new("noext")), "noext");
    }
}
