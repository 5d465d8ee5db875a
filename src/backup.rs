use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_PREFIX: &str = "data/";
pub const BUNDLE_FORMAT_V1: &str = "clubbook-data-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub file_count: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_bundle_member(name: &str) -> bool {
    name.ends_with(".json") || name.ends_with(".seq")
}

/// Export every collection and sequence file in the data directory as a
/// zip bundle. The manifest records a SHA-256 per entry so import can
/// detect a damaged or tampered bundle before touching the workspace.
pub fn export_data_bundle(data_dir: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !data_dir.is_dir() {
        return Err(anyhow!(
            "data directory not found: {}",
            data_dir.to_string_lossy()
        ));
    }

    let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for entry in std::fs::read_dir(data_dir)
        .with_context(|| format!("failed to read {}", data_dir.to_string_lossy()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|s| s.to_str()) {
            Some(n) if is_bundle_member(n) => n.to_string(),
            _ => continue,
        };
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        files.insert(name, bytes);
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let checksums: BTreeMap<&String, String> = files
        .iter()
        .map(|(name, bytes)| (name, sha256_hex(bytes)))
        .collect();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "files": checksums,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (name, bytes) in &files {
        zip.start_file(format!("{DATA_PREFIX}{name}"), opts)
            .with_context(|| format!("failed to start entry for {name}"))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write entry for {name}"))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: files.len() + 1,
    })
}

/// Replace the data directory contents with a previously exported bundle.
/// Format tag and every checksum are validated before any file is moved
/// into place; each file then lands through a temp-then-rename sequence.
pub fn import_data_bundle(in_path: &Path, data_dir: &Path) -> anyhow::Result<ImportSummary> {
    std::fs::create_dir_all(data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            data_dir.to_string_lossy()
        )
    })?;

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

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
    let listed = manifest
        .get("files")
        .and_then(|v| v.as_object())
        .ok_or_else(|| anyhow!("manifest has no files table"))?;

    // Validate everything before the first byte lands in the workspace.
    let mut verified: Vec<(String, Vec<u8>)> = Vec::with_capacity(listed.len());
    for (name, expected) in listed {
        if name.contains('/') || name.contains('\\') || !is_bundle_member(name) {
            return Err(anyhow!("manifest lists an invalid entry name: {}", name));
        }
        let expected = expected
            .as_str()
            .ok_or_else(|| anyhow!("manifest checksum for {} is not a string", name))?;
        let mut bytes = Vec::new();
        archive
            .by_name(&format!("{DATA_PREFIX}{name}"))
            .with_context(|| format!("bundle missing entry for {name}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read entry for {name}"))?;
        if sha256_hex(&bytes) != expected {
            return Err(anyhow!("checksum mismatch for {}", name));
        }
        verified.push((name.clone(), bytes));
    }

    let file_count = verified.len();
    for (name, bytes) in verified {
        let tmp = data_dir.join(format!("{name}.importing"));
        let dst = data_dir.join(&name);
        let mut out = File::create(&tmp)
            .with_context(|| format!("failed to create temp file {}", tmp.to_string_lossy()))?;
        out.write_all(&bytes)
            .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
        out.flush()
            .with_context(|| format!("failed to flush {}", tmp.to_string_lossy()))?;
        std::fs::rename(&tmp, &dst)
            .with_context(|| format!("failed to move {} into place", dst.to_string_lossy()))?;
    }

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        file_count,
    })
}
