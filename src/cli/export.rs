use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DugsiError, Result};
use crate::reports::ReportTable;
use crate::settings::get_data_dir;

pub fn default_path(file_name: &str) -> PathBuf {
    get_data_dir().join("exports").join(file_name)
}

pub fn write_file(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    let shown = path.display().to_string();
    info!(path = %shown, bytes = bytes.len(), "export written");
    println!("Wrote {shown}");
    Ok(shown)
}

pub fn report_csv(table: &ReportTable) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.into_inner().map_err(|e| DugsiError::Other(e.to_string()))
}
