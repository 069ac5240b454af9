//! The product import job: opens the uploaded CSV artifact, validates
//! each row, bulk-inserts the valid ones, and cleans up the artifact.
//!
//! The job runs single-threaded and row-by-row so the insert order and
//! the 500-row batching boundary are deterministic for a given input
//! file. Per-row problems are logged and skipped; storage errors are
//! fatal and propagate to the caller, which owns retry policy.

use catalog_core::import::{validate_record, HeaderSchema};
use uuid::Uuid;

use crate::batch::BatchWriter;
use crate::store::ArtifactStore;
use crate::{ProductSink, VendorDirectory};

/// Terminal state of one import job attempt.
///
/// Every variant except `Completed` terminates without side effects:
/// nothing was inserted and the artifact was not deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The artifact path does not resolve to an existing file.
    MissingArtifact,
    /// The artifact exists but could not be opened.
    UnreadableArtifact,
    /// The header row is missing or lacks a required column.
    InvalidHeader,
    /// The stream was fully processed. `artifact_removed` is false when
    /// the final cleanup delete failed and the file was left behind.
    Completed {
        inserted: u64,
        skipped: u64,
        artifact_removed: bool,
    },
}

/// One import job, parameterized by the artifact's relative path.
#[derive(Debug, Clone)]
pub struct ImportProductsJob {
    pub file_path: String,
}

impl ImportProductsJob {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Run the job to completion.
    ///
    /// Returns `Ok` with the terminal [`ImportOutcome`]; `Err` only for
    /// storage failures (referential checks or bulk inserts), which are
    /// fatal to this attempt. Earlier flushed batches stay committed.
    pub async fn run(
        &self,
        store: &ArtifactStore,
        vendors: &impl VendorDirectory,
        sink: &impl ProductSink,
    ) -> Result<ImportOutcome, sqlx::Error> {
        let full_path = match store.resolve(&self.file_path) {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(path = %self.file_path, error = %err, "Import failed: invalid artifact path");
                return Ok(ImportOutcome::MissingArtifact);
            }
        };

        if !full_path.is_file() {
            tracing::error!(path = %self.file_path, "Import failed: file not found");
            return Ok(ImportOutcome::MissingArtifact);
        }

        let file = match std::fs::File::open(&full_path) {
            Ok(file) => file,
            Err(err) => {
                tracing::error!(path = %self.file_path, error = %err, "Import failed: cannot open file");
                return Ok(ImportOutcome::UnreadableArtifact);
            }
        };

        // Scoped so the reader (and its file handle) is closed before
        // the artifact is deleted.
        let (inserted, skipped) = {
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .from_reader(std::io::BufReader::new(file));

            let schema = match reader.headers() {
                Ok(headers) => HeaderSchema::parse(headers.iter()),
                Err(_) => None,
            };
            let Some(schema) = schema else {
                tracing::error!(path = %self.file_path, "Import failed: invalid CSV headers");
                return Ok(ImportOutcome::InvalidHeader);
            };

            let mut writer = BatchWriter::new(sink);
            let mut skipped: u64 = 0;

            for result in reader.records() {
                let row = match result {
                    Ok(row) => row,
                    Err(err) => {
                        tracing::warn!(path = %self.file_path, error = %err, "Skipped unreadable row");
                        skipped += 1;
                        continue;
                    }
                };

                let cells: Vec<&str> = row.iter().collect();
                let record = schema.build_record(&cells);
                tracing::info!(row = ?record, "Processing row");

                // Resolve the vendor reference up front; the validator
                // consumes the answer as a plain capability.
                let vendor_ok = match record.vendor_id.as_deref().map(Uuid::parse_str) {
                    Some(Ok(id)) => vendors.exists(id).await?,
                    _ => false,
                };

                match validate_record(&record, |_| vendor_ok) {
                    Ok(product) => writer.append(product).await?,
                    Err(failure) => {
                        tracing::warn!(row = ?failure.record, reason = %failure, "Skipped row");
                        skipped += 1;
                    }
                }
            }

            writer.flush().await?;
            (writer.inserted(), skipped)
        };

        let artifact_removed = match store.delete(&self.file_path) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %self.file_path, error = %err, "Failed to delete import artifact");
                false
            }
        };

        tracing::info!(path = %self.file_path, inserted, skipped, artifact_removed, "Product import completed");
        Ok(ImportOutcome::Completed {
            inserted,
            skipped,
            artifact_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_core::import::{ValidatedProduct, IMPORT_BATCH_SIZE};
    use catalog_core::types::EntityId;
    use std::collections::HashSet;
    use std::fmt::Write as _;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeVendors {
        known: HashSet<EntityId>,
    }

    impl FakeVendors {
        fn with(ids: &[EntityId]) -> Self {
            Self {
                known: ids.iter().copied().collect(),
            }
        }
    }

    #[async_trait]
    impl VendorDirectory for FakeVendors {
        async fn exists(&self, id: EntityId) -> Result<bool, sqlx::Error> {
            Ok(self.known.contains(&id))
        }
    }

    /// Sink capturing every inserted batch; can be armed to fail.
    struct FakeSink {
        batches: Mutex<Vec<Vec<ValidatedProduct>>>,
        fail: bool,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn batch_sizes(&self) -> Vec<usize> {
            self.batches.lock().unwrap().iter().map(Vec::len).collect()
        }

        fn inserted_names(&self) -> Vec<String> {
            self.batches
                .lock()
                .unwrap()
                .iter()
                .flatten()
                .map(|p| p.name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ProductSink for FakeSink {
        async fn insert_many(
            &self,
            products: &[ValidatedProduct],
        ) -> Result<u64, sqlx::Error> {
            if self.fail {
                return Err(sqlx::Error::PoolClosed);
            }
            self.batches.lock().unwrap().push(products.to_vec());
            Ok(products.len() as u64)
        }
    }

    const HEADER: &str = "vendor_id,name,description,price,stock\n";

    async fn write_artifact(store: &ArtifactStore, contents: &str) {
        store
            .save("imports/test.csv", contents.as_bytes())
            .await
            .unwrap();
    }

    fn artifact_exists(store: &ArtifactStore) -> bool {
        store.open("imports/test.csv").is_ok()
    }

    #[tokio::test]
    async fn missing_artifact_terminates_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendors = FakeVendors::with(&[]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/missing.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::MissingArtifact);
        assert!(sink.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn invalid_header_terminates_without_deletion() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_artifact(&store, "vendor_id,name,price\nv,n,1\n").await;
        let vendors = FakeVendors::with(&[]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::InvalidHeader);
        assert!(sink.batch_sizes().is_empty());
        assert!(artifact_exists(&store), "artifact must survive a header failure");
    }

    #[tokio::test]
    async fn empty_file_is_invalid_header() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_artifact(&store, "").await;
        let vendors = FakeVendors::with(&[]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::InvalidHeader);
        assert!(artifact_exists(&store));
    }

    #[tokio::test]
    async fn two_valid_rows_inserted_and_artifact_deleted() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let csv = format!(
            "{HEADER}{vendor},Widget,First widget,19.99,5\n{vendor},Gadget,,4.50,0\n"
        );
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 2, skipped: 0, artifact_removed: true }
        );
        assert_eq!(sink.batch_sizes(), vec![2]);
        assert_eq!(sink.inserted_names(), vec!["Widget", "Gadget"]);
        assert!(!artifact_exists(&store), "artifact must be deleted on success");
    }

    #[tokio::test]
    async fn invalid_row_is_skipped_and_stream_continues() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        // Row 2 has an empty name.
        let csv = format!(
            "{HEADER}{vendor},First,,1.00,1\n{vendor},,,2.00,2\n{vendor},Third,,3.00,3\n"
        );
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 2, skipped: 1, artifact_removed: true }
        );
        assert_eq!(sink.inserted_names(), vec!["First", "Third"]);
        assert!(!artifact_exists(&store));
    }

    #[tokio::test]
    async fn unknown_vendor_row_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let known = EntityId::new_v4();
        let unknown = EntityId::new_v4();
        let csv = format!("{HEADER}{known},Ok,,1.00,1\n{unknown},Bad,,1.00,1\n");
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[known]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 1, skipped: 1, artifact_removed: true }
        );
        assert_eq!(sink.inserted_names(), vec!["Ok"]);
    }

    #[tokio::test]
    async fn short_row_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let csv = format!("{HEADER}{vendor},OnlyTwoCells\n{vendor},Full,,1.00,1\n");
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 1, skipped: 1, artifact_removed: true }
        );
    }

    #[tokio::test]
    async fn reordered_header_with_extra_columns_accepted() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let csv = format!(
            "sku,stock,price,name,description,vendor_id\nX1,7,2.50,Widget,,{vendor}\n"
        );
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 1, skipped: 0, artifact_removed: true }
        );
        let products = sink.batches.lock().unwrap();
        assert_eq!(products[0][0].stock, 7);
        assert_eq!(products[0][0].price, 2.50);
    }

    #[tokio::test]
    async fn batch_boundary_501_rows_two_inserts() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let mut csv = HEADER.to_string();
        for i in 0..IMPORT_BATCH_SIZE + 1 {
            writeln!(csv, "{vendor},Product {i},,1.00,1").unwrap();
        }
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed {
                inserted: (IMPORT_BATCH_SIZE + 1) as u64,
                skipped: 0,
                artifact_removed: true
            }
        );
        assert_eq!(sink.batch_sizes(), vec![IMPORT_BATCH_SIZE, 1]);
    }

    /// Removes the artifact file from under the job while it is reading.
    /// The open handle keeps the stream alive, so processing finishes,
    /// but the cleanup delete finds nothing to remove.
    struct ArtifactStealingVendors {
        path: std::path::PathBuf,
    }

    #[async_trait]
    impl VendorDirectory for ArtifactStealingVendors {
        async fn exists(&self, _id: EntityId) -> Result<bool, sqlx::Error> {
            let _ = std::fs::remove_file(&self.path);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn failed_artifact_delete_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let csv = format!("{HEADER}{vendor},Widget,,1.00,1\n");
        write_artifact(&store, &csv).await;
        let vendors = ArtifactStealingVendors {
            path: store.resolve("imports/test.csv").unwrap(),
        };
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Completed { inserted: 1, skipped: 0, artifact_removed: false }
        );
    }

    #[tokio::test]
    async fn sink_failure_propagates_and_artifact_survives() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendor = EntityId::new_v4();
        let csv = format!("{HEADER}{vendor},Widget,,1.00,1\n");
        write_artifact(&store, &csv).await;
        let vendors = FakeVendors::with(&[vendor]);
        let sink = FakeSink::failing();

        let result = ImportProductsJob::new("imports/test.csv")
            .run(&store, &vendors, &sink)
            .await;

        assert!(result.is_err());
        assert!(artifact_exists(&store), "artifact must survive a failed attempt");
    }

    #[tokio::test]
    async fn traversal_path_is_rejected_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let vendors = FakeVendors::with(&[]);
        let sink = FakeSink::new();

        let outcome = ImportProductsJob::new("../outside.csv")
            .run(&store, &vendors, &sink)
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::MissingArtifact);
    }
}
