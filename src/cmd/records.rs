use crate::data::{Persistable, WorkRecordData};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn export(out: Option<&Path>) -> Result<()> {
    let data = WorkRecordData::load()?;
    let json = data.export_json()?;
    match out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), count = data.records.len(), "records exported");
            println!("Exported {} records to {}", data.records.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Validates and normalizes imported records. Invalid rows are logged,
/// not dropped.
pub(crate) fn prepare_import(text: &str) -> Result<(WorkRecordData, usize)> {
    let mut data = WorkRecordData::import_json(text)?;
    for r in &data.records {
        if let Err(e) = r.validate() {
            warn!(date = %r.date, error = %e, "imported record is malformed");
        }
    }
    let migrated = data.migrate_default_employee();
    Ok((data, migrated))
}

/// Replaces the whole record store with the contents of `file`.
pub fn import(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let (data, migrated) = prepare_import(&text)?;
    data.save()?;
    info!(count = data.records.len(), migrated, "records imported");
    println!("Imported {} records", data.records.len());
    Ok(())
}
