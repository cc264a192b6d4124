use crate::error::SyncError;
use crate::models::DriftRecord;
use std::fs;
use std::path::Path;

const HEADER: &str = "story_id";

/// Writes one shard's drift report: a CSV with a `story_id` header and one
/// row per under-indexed story. Parent directories are created as needed.
pub fn write_drift_report(path: &Path, records: &[DriftRecord]) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut contents = String::from(HEADER);
    contents.push('\n');
    for record in records {
        contents.push_str(&record.story_id.to_string());
        contents.push('\n');
    }

    fs::write(path, contents)?;
    Ok(())
}

/// Reads the story ids back out of a drift report.
pub fn read_drift_report(path: &Path) -> Result<Vec<i64>, SyncError> {
    let data = fs::read_to_string(path)?;
    let mut lines = data.lines();

    match lines.next().map(str::trim) {
        Some(HEADER) => {}
        other => {
            return Err(SyncError::InvalidReport(format!(
                "expected a {HEADER} header in {}, found {other:?}",
                path.display()
            )));
        }
    }

    let mut story_ids = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let story_id = line.parse::<i64>().map_err(|_| {
            SyncError::InvalidReport(format!(
                "invalid story id {line:?} in {}",
                path.display()
            ))
        })?;
        story_ids.push(story_id);
    }

    Ok(story_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn drift(story_id: i64) -> DriftRecord {
        DriftRecord {
            story_id,
            record_count: 5,
            point_count: 3,
        }
    }

    #[test]
    fn reports_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors_0.csv");

        write_drift_report(&path, &[drift(42), drift(7)]).unwrap();
        let story_ids = read_drift_report(&path).unwrap();
        assert_eq!(story_ids, vec![42, 7]);
    }

    #[test]
    fn empty_reports_keep_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors_1.csv");

        write_drift_report(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "story_id\n");
        assert!(read_drift_report(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_directories_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("errors_2.csv");

        write_drift_report(&path, &[drift(1)]).unwrap();
        assert_eq!(read_drift_report(&path).unwrap(), vec![1]);
    }

    #[test]
    fn malformed_reports_are_rejected() {
        let dir = tempdir().unwrap();

        let missing_header = dir.path().join("bad_header.csv");
        std::fs::write(&missing_header, "id\n42\n").unwrap();
        assert!(matches!(
            read_drift_report(&missing_header),
            Err(SyncError::InvalidReport(_))
        ));

        let bad_row = dir.path().join("bad_row.csv");
        std::fs::write(&bad_row, "story_id\nforty-two\n").unwrap();
        assert!(matches!(
            read_drift_report(&bad_row),
            Err(SyncError::InvalidReport(_))
        ));
    }
}
