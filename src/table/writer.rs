use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::error::{Gen3Error, Result};
use crate::export::RawDataStore;
use crate::table::store::TableStore;

/// Filesystem friendly form of a store key, `/` replaced by `__`
pub fn file_stem(key: &str) -> String {
    key.replace('/', "__")
}

fn output_error(path: &Path) -> impl FnOnce(std::io::Error) -> Gen3Error + '_ {
    move |source| Gen3Error::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// Write every raw body as `<stem>.json`. Returns the written paths.
pub fn write_raw(dir: &Path, raw: &RawDataStore) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(output_error(dir))?;

    let mut written = Vec::with_capacity(raw.len());
    for (key, body) in raw {
        let path = dir.join(format!("{}.json", file_stem(key)));
        let text = serde_json::to_string_pretty(body)
            .map_err(|e| Gen3Error::Output {
                path: path.clone(),
                source: e.into(),
            })?;
        fs::write(&path, text).map_err(output_error(&path))?;
        info!(key = %key, path = %path.display(), "raw data written");
        written.push(path);
    }
    Ok(written)
}

/// Write every table as `<stem>.csv` with a header row. Returns the written paths.
pub fn write_tables(dir: &Path, tables: &TableStore) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(output_error(dir))?;

    let mut written = Vec::with_capacity(tables.len());
    for (key, table) in tables.iter() {
        let path = dir.join(format!("{}.csv", file_stem(key)));
        let mut file = File::create(&path).map_err(output_error(&path))?;
        let mut table = table.clone();
        CsvWriter::new(&mut file).include_header(true).finish(&mut table)?;
        info!(key = %key, rows = table.height(), path = %path.display(), "table written");
        written.push(path);
    }
    Ok(written)
}
