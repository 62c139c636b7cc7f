//! Locating and loading the bundled sample datasets.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CommonError, Result};

/// Environment variable that relocates the project root.
pub const HOME_ENV: &str = "DALGO_HOME";

/// Root of the workspace: `DALGO_HOME` when set, otherwise the directory
/// containing this crate.
pub fn project_root() -> PathBuf {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

/// `<root>/data/<topic>/<filename>`
pub fn data_path(topic: &str, filename: &str) -> PathBuf {
    data_path_in(&project_root(), topic, filename)
}

/// Same as [`data_path`] relative to an explicit root.
pub fn data_path_in(root: &Path, topic: &str, filename: &str) -> PathBuf {
    root.join("data").join(topic).join(filename)
}

/// `<root>/.output/<topic>`, where examples write their files.
pub fn output_dir(topic: &str) -> PathBuf {
    project_root().join(".output").join(topic)
}

/// `<root>/.output/<topic>/<name>`
pub fn output_path(topic: &str, name: &str) -> PathBuf {
    output_dir(topic).join(name)
}

/// Read a CSV file and map every row through `factory`.
///
/// The first row is dropped when `skip_header` is set. Rows without any
/// non-empty field are ignored. Rows may have differing lengths; the factory
/// decides what to do with them.
pub fn load_csv_as_tuples<T, F>(path: impl AsRef<Path>, factory: F, skip_header: bool) -> Result<Vec<T>>
where
    F: Fn(Vec<String>) -> T,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CommonError::not_found_error(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut header_pending = skip_header;
    for record in reader.records() {
        let record = record?;
        if header_pending {
            header_pending = false;
            continue;
        }
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(factory(record.iter().map(str::to_string).collect()));
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded csv");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_skips_header_by_default() {
        let file = write_csv("name,city,value\nalex,Ames,20\njane,Sunnyvale,33\n");
        let rows = load_csv_as_tuples(
            file.path(),
            |row| (row[0].clone(), row[1].clone(), row[2].parse::<i64>().unwrap()),
            true,
        )
        .unwrap();

        assert_eq!(
            rows,
            vec![
                ("alex".to_string(), "Ames".to_string(), 20),
                ("jane".to_string(), "Sunnyvale".to_string(), 33),
            ]
        );
    }

    #[test]
    fn test_load_csv_without_header_skip() {
        let file = write_csv("a,1\nb,2\n");
        let rows = load_csv_as_tuples(file.path(), |row| row, false).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_load_csv_ignores_empty_rows() {
        let file = write_csv("k,v\na,1\n\n,\nb,2\n");
        let rows = load_csv_as_tuples(file.path(), |row| row[0].clone(), true).unwrap();
        assert_eq!(rows, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_csv_as_tuples("/definitely/not/here.csv", |row| row, true).unwrap_err();
        assert!(matches!(err, CommonError::NotFoundError { .. }));
    }

    #[test]
    fn test_data_path_construction() {
        let root = Path::new("/tmp/dalgo");
        assert_eq!(
            data_path_in(root, "basics", "people.csv"),
            PathBuf::from("/tmp/dalgo/data/basics/people.csv")
        );
        assert!(data_path("basics", "people.csv").ends_with("data/basics/people.csv"));
        assert!(output_dir("partitioning").ends_with(".output/partitioning"));
        assert_eq!(
            output_path("partitioning", "csv"),
            output_dir("partitioning").join("csv")
        );
    }
}
