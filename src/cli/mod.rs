use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use itertools::Itertools;
use tracing::error;

use crate::api::ApiClient;
use crate::config::Config;
use crate::export;
use crate::import;
use crate::media::{MediaKind, MediaList};
use crate::session::MemorySession;
use crate::storage::HttpObjectStore;
use crate::upload::{SourceFile, UploadGateway};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls"];

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EntityKind {
    Community,
    Property,
}

fn build_session(config: &Config) -> Arc<MemorySession> {
    let session = match &config.api.bearer_token {
        Some(token) => MemorySession::with_credential(token.clone()),
        None => MemorySession::new(),
    };
    let session = Arc::new(session);
    session.on_expired(|| error!("session expired, obtain a fresh token and retry"));
    session
}

fn check_workbook_extension(file: &Path) -> anyhow::Result<()> {
    let ext = file
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        anyhow::bail!(
            "only Excel files are supported ({})",
            WORKBOOK_EXTENSIONS.iter().join(", ")
        );
    }
    Ok(())
}

pub async fn run_import(config: Config, entity: EntityKind, file: &Path) -> anyhow::Result<()> {
    check_workbook_extension(file)?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    let session = build_session(&config);
    let client = ApiClient::new(config.api, session);
    let outcome = match entity {
        EntityKind::Community => import::import_communities(&client, &bytes).await?,
        EntityKind::Property => import::import_properties(&client, &bytes).await?,
    };

    println!("imported {} records", outcome.imported);
    for record in &outcome.created {
        println!("  #{} {}", record.id, record.label);
    }
    if let Some(errors) = &outcome.errors {
        println!("{} rows failed:", errors.len());
        for message in errors {
            println!("  {message}");
        }
    }
    Ok(())
}

pub fn run_template(entity: EntityKind, out: &Path) -> anyhow::Result<()> {
    let bytes = match entity {
        EntityKind::Community => export::community_template()?,
        EntityKind::Property => export::property_template()?,
    };
    std::fs::write(out, bytes).with_context(|| format!("writing {}", out.display()))?;
    println!("template written to {}", out.display());
    Ok(())
}

pub async fn run_upload(config: Config, kind: MediaKind, files: &[PathBuf]) -> anyhow::Result<()> {
    let session = build_session(&config);
    let store = HttpObjectStore::new(config.api, session);
    let gateway = UploadGateway::new(store);

    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        sources.push(SourceFile::new(name, bytes));
    }

    let total = sources.len();
    let mut list = MediaList::new();
    let report = gateway.upload_into(kind, sources, &mut list).await;

    for result in &report.uploaded {
        println!("uploaded {} -> {}", result.original_name, result.url);
    }
    for failure in &report.failures {
        eprintln!("failed {}: {}", failure.name, failure.message);
    }
    println!("media refs: {}", list.serialize());

    if !report.failures.is_empty() {
        anyhow::bail!("{} of {total} uploads failed", report.failures.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_extension_check() {
        assert!(check_workbook_extension(Path::new("rows.xlsx")).is_ok());
        assert!(check_workbook_extension(Path::new("rows.XLS")).is_ok());
        assert!(check_workbook_extension(Path::new("rows.csv")).is_err());
        assert!(check_workbook_extension(Path::new("rows")).is_err());
    }
}
