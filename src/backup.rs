use crate::attendance;
use crate::model::AttendanceDocument;
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use tracing::warn;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DOCUMENT_ENTRY: &str = "data/attendance.json";
pub const BUNDLE_FORMAT_V1: &str = "attendance-document-v1";
pub const LEGACY_JSON_FORMAT: &str = "legacy-json";

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub document: AttendanceDocument,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_bundle(doc: &AttendanceDocument) -> anyhow::Result<Vec<u8>> {
    let document = serde_json::to_vec_pretty(doc).context("failed to serialize document")?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "sha256": sha256_hex(&document),
        "students": doc.students.len(),
        "buckets": doc.bucket_count(),
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DOCUMENT_ENTRY, opts)
        .context("failed to start document entry")?;
    zip.write_all(&document)
        .context("failed to write document entry")?;

    let out = zip.finish().context("failed to finalize zip bundle")?;
    Ok(out.into_inner())
}

/// Reads a bundle produced by [`export_bundle`]. Input that is not a zip is
/// read as a bare JSON document.
pub fn import_bundle(bytes: &[u8]) -> anyhow::Result<ImportSummary> {
    if !is_zip(bytes) {
        let mut document: AttendanceDocument =
            serde_json::from_slice(bytes).context("input is neither a zip bundle nor a JSON document")?;
        normalize_document(&mut document)?;
        return Ok(ImportSummary {
            bundle_format_detected: LEGACY_JSON_FORMAT.to_string(),
            document,
        });
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut document = Vec::new();
    archive
        .by_name(DOCUMENT_ENTRY)
        .context("bundle missing data/attendance.json")?
        .read_to_end(&mut document)
        .context("failed to read document entry")?;

    if let Some(expected) = manifest.get("sha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(&document);
        if actual != expected {
            return Err(anyhow!(
                "document checksum mismatch: manifest {}, bundle {}",
                expected,
                actual
            ));
        }
    }

    let mut document: AttendanceDocument =
        serde_json::from_slice(&document).context("bundled document is invalid")?;
    normalize_document(&mut document)?;
    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        document,
    })
}

// Restored documents must satisfy the same rules as ones built through the
// API: unique non-empty roll numbers, real calendar dates, and entries only
// for students on the roster, carrying the roster name.
fn normalize_document(doc: &mut AttendanceDocument) -> anyhow::Result<()> {
    let mut names: HashMap<String, String> = HashMap::new();
    for s in &doc.students {
        if s.roll_no.trim().is_empty() {
            return Err(anyhow!("document contains a student without roll_no"));
        }
        if names.insert(s.roll_no.clone(), s.name.clone()).is_some() {
            return Err(anyhow!("document contains duplicate roll_no {}", s.roll_no));
        }
    }
    doc.students.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));

    let mut dropped = 0usize;
    for (subject, days) in doc.attendance.iter_mut() {
        if subject.trim().is_empty() {
            return Err(anyhow!("document contains an empty subject"));
        }
        for (date, entries) in days.iter_mut() {
            attendance::validate_date(date)
                .with_context(|| format!("subject {subject:?}"))?;
            let before = entries.len();
            entries.retain_mut(|e| match names.get(&e.roll_no) {
                Some(name) => {
                    e.name.clone_from(name);
                    true
                }
                None => false,
            });
            dropped += before - entries.len();
        }
    }
    if dropped > 0 {
        warn!(dropped, "restored document had entries for unknown students");
    }
    Ok(())
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
}
