//! School and university batch import
//!
//! Reads a CSV with `en_name`, `ar_name` and `sheet` columns and queues one
//! create per row into the collection named by `sheet`. Queued creates are
//! flushed in fixed-size batches; a failed batch is logged and the import
//! moves on.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::suggestions::{SCHOOLS_COLLECTION, UNIVERSITIES_COLLECTION};
use crate::error::ImportError;
use crate::ports::{BatchCreate, RecordStore};

pub const DEFAULT_BATCH_SIZE: usize = 500;

const COLUMNS: [&str; 3] = ["en_name", "ar_name", "sheet"];

/// Totals of one import run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows: usize,
    pub queued: usize,
    pub skipped: usize,
    pub batches_ok: usize,
    pub batches_failed: usize,
    pub created: usize,
}

pub struct BatchImporter {
    store: Arc<dyn RecordStore>,
    batch_size: usize,
}

impl BatchImporter {
    pub fn new(store: Arc<dyn RecordStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportReport, ImportError> {
        info!(path = %path.display(), "Starting batch import");
        let reader = csv::Reader::from_path(path)?;
        self.import(reader).await
    }

    pub async fn import_reader<R: Read>(&self, input: R) -> Result<ImportReport, ImportError> {
        self.import(csv::Reader::from_reader(input)).await
    }

    async fn import<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<ImportReport, ImportError> {
        let headers = reader.headers()?.clone();
        let mut positions = [0usize; 3];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| ImportError::MissingColumn(column.to_string()))?;
        }
        let [en_at, ar_at, sheet_at] = positions;

        let mut report = ImportReport::default();
        let mut pending: Vec<BatchCreate> = Vec::with_capacity(self.batch_size);

        for (idx, row) in reader.records().enumerate() {
            report.rows += 1;
            let row_number = idx + 1;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(row = row_number, error = %e, "Skipping unreadable row");
                    report.skipped += 1;
                    continue;
                }
            };

            let (en_name, ar_name, sheet) = (cell(&row, en_at), cell(&row, ar_at), cell(&row, sheet_at));
            if en_name.is_empty() || ar_name.is_empty() || sheet.is_empty() {
                warn!(row = row_number, "Skipping invalid row: missing required fields");
                report.skipped += 1;
                continue;
            }
            let collection = match sheet {
                "schools" => SCHOOLS_COLLECTION,
                "universities" => UNIVERSITIES_COLLECTION,
                other => {
                    warn!(row = row_number, sheet = %other, "Skipping row with unknown sheet");
                    report.skipped += 1;
                    continue;
                }
            };

            pending.push(BatchCreate {
                collection: collection.to_string(),
                body: json!({ "en_name": en_name, "ar_name": ar_name }),
            });
            report.queued += 1;

            if pending.len() >= self.batch_size {
                self.flush(&mut pending, &mut report).await;
            }
        }

        if !pending.is_empty() {
            self.flush(&mut pending, &mut report).await;
        }

        info!(
            rows = report.rows,
            created = report.created,
            skipped = report.skipped,
            failed_batches = report.batches_failed,
            "Batch import completed"
        );
        Ok(report)
    }

    async fn flush(&self, pending: &mut Vec<BatchCreate>, report: &mut ImportReport) {
        match self.store.batch_create(pending).await {
            Ok(created) => {
                info!(created, "Batch sent");
                report.batches_ok += 1;
                report.created += created;
            }
            Err(e) => {
                warn!(requests = pending.len(), error = %e, "Batch failed");
                report.batches_failed += 1;
            }
        }
        pending.clear();
    }
}

fn cell(row: &csv::StringRecord, at: usize) -> &str {
    row.get(at).map(str::trim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::infrastructure::memory::InMemoryRecordStore;
    use std::io::Write;

    fn importer(batch_size: usize) -> (Arc<InMemoryRecordStore>, BatchImporter) {
        let store = Arc::new(InMemoryRecordStore::new());
        (store.clone(), BatchImporter::new(store, batch_size))
    }

    #[tokio::test]
    async fn test_rows_partitioned_and_trimmed() {
        let (store, importer) = importer(DEFAULT_BATCH_SIZE);
        let csv = "en_name,ar_name,sheet\n\
                   \"  Cairo STEM \",مدرسة المتفوقين,schools\n\
                   Cairo University,جامعة القاهرة,universities\n\
                   ,بدون اسم,schools\n\
                   Nile Academy,أكاديمية النيل,academies\n";

        let report = importer.import_reader(csv.as_bytes()).await.unwrap();

        assert_eq!(report.rows, 4);
        assert_eq!(report.queued, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.batches_ok, 1);
        let schools = store.records(SCHOOLS_COLLECTION);
        assert_eq!(schools.len(), 1);
        assert_eq!(schools[0].str_field("en_name"), Some("Cairo STEM"));
        assert_eq!(store.records(UNIVERSITIES_COLLECTION).len(), 1);
    }

    #[tokio::test]
    async fn test_batches_split_at_size() {
        let (store, importer) = importer(2);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sheet,en_name,ar_name").unwrap();
        for i in 0..5 {
            writeln!(file, "schools,School {},مدرسة {}", i, i).unwrap();
        }

        let report = importer.import_file(file.path()).await.unwrap();

        assert_eq!(report.batches_ok, 3);
        assert_eq!(report.created, 5);
        assert_eq!(store.records(SCHOOLS_COLLECTION).len(), 5);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_import() {
        let (store, importer) = importer(1);
        store.fail_next(StoreError::Network("reset".into()));
        let csv = "en_name,ar_name,sheet\nA,أ,schools\nB,ب,schools\n";

        let report = importer.import_reader(csv.as_bytes()).await.unwrap();

        assert_eq!(report.batches_failed, 1);
        assert_eq!(report.batches_ok, 1);
        assert_eq!(report.created, 1);
    }

    #[tokio::test]
    async fn test_missing_column() {
        let (_, importer) = importer(DEFAULT_BATCH_SIZE);
        let err = importer.import_reader("en_name,sheet\nA,schools\n".as_bytes()).await.unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(c) if c == "ar_name"));
    }
}
