//! 추출 결과 CSV 스냅샷.

use crate::error::Result;
use ingest_core::Table;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 테이블을 `dir/file_name` CSV로 씁니다. 디렉터리가 없으면 만듭니다.
///
/// 첫 행은 열 이름이며 NULL은 빈 칸으로 기록됩니다.
pub fn write_snapshot(dir: &Path, file_name: &str, table: &Table) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = table.len(), "스냅샷 기록");
    Ok(path)
}

/// 블로킹 스레드에서 스냅샷을 씁니다. 기록한 테이블과 경로를 돌려줍니다.
pub async fn save_snapshot(dir: &Path, file_name: &str, table: Table) -> Result<(Table, PathBuf)> {
    let dir = dir.to_path_buf();
    let file_name = file_name.to_string();
    tokio::task::spawn_blocking(move || {
        let path = write_snapshot(&dir, &file_name, &table)?;
        Ok((table, path))
    })
    .await?
}
