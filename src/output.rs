use crate::error::GaugesError;
use crate::models::DailyTraffic;
use log::debug;
use std::fs::{DirBuilder, File};
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 3] = ["date", "views", "people"];

const FALLBACK_SITE_NAME: &str = "_";

/// Directory and file name used for a site, with path separators
/// replaced so a title cannot leave the output root. Titles that would
/// still resolve to the root or its parent (`""`, `.`, `..`) become `_`.
pub fn site_dir_name(title: &str) -> String {
    let name = title.replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => FALLBACK_SITE_NAME.to_string(),
        _ => name,
    }
}

/// `<dir>/<site>-<month>.csv`
pub fn month_file_path(dir: &Path, site: &str, month: &str) -> PathBuf {
    dir.join(format!("{site}-{month}.csv"))
}

/// Create `path` and any missing parents, owner-only on Unix.
pub fn ensure_dir(path: &Path) -> Result<(), GaugesError> {
    if path.is_dir() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|source| GaugesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Created output directory {}", path.display());
    Ok(())
}

/// Write `records` to `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[DailyTraffic]) -> Result<(), GaugesError> {
    let file = File::create(path).map_err(|source| GaugesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| GaugesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn records() -> Vec<DailyTraffic> {
        vec![
            DailyTraffic {
                date: "2023-03-05".into(),
                views: 10,
                people: 7,
            },
            DailyTraffic {
                date: "2023-03-04".into(),
                views: 0,
                people: 0,
            },
        ]
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-2023-03.csv");
        write_records(&path, &records()).expect("write should succeed");
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "date,views,people\n2023-03-05,10,7\n2023-03-04,0,0\n"
        );
    }

    #[test]
    fn empty_records_still_get_a_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_records(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "date,views,people\n");
    }

    #[test]
    fn rewriting_overwrites_instead_of_appending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-2023-03.csv");
        write_records(&path, &records()).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        write_records(&path, &records()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("site.csv");
        let err = write_records(&path, &records()).unwrap_err();
        assert!(matches!(err, GaugesError::Io { path: p, .. } if p == path));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("output").join("example.com");
        ensure_dir(&target).unwrap();
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
    }

    #[test]
    fn site_names_cannot_escape_the_root() {
        assert_eq!(site_dir_name("example.com"), "example.com");
        assert_eq!(site_dir_name("a/../b"), "a_.._b");
        assert_eq!(site_dir_name(".."), "_");
        assert_eq!(site_dir_name("."), "_");
        assert_eq!(site_dir_name(""), "_");
        assert_eq!(site_dir_name("..."), "...");
        assert_eq!(
            month_file_path(Path::new("output/x"), "x", "2023-03"),
            PathBuf::from("output/x/x-2023-03.csv")
        );
    }
}
