//! Bounded batching of validated records ahead of bulk inserts.

use catalog_core::import::{ValidatedProduct, IMPORT_BATCH_SIZE};

use crate::ProductSink;

/// Accumulates validated records and flushes them to the sink in chunks
/// of at most [`IMPORT_BATCH_SIZE`].
///
/// The writer owns the only state that survives across rows. A sink
/// error is fatal to the job attempt and propagates to the caller;
/// earlier flushed batches stay committed.
pub struct BatchWriter<'a, S: ProductSink> {
    sink: &'a S,
    batch: Vec<ValidatedProduct>,
    inserted: u64,
}

impl<'a, S: ProductSink> BatchWriter<'a, S> {
    pub fn new(sink: &'a S) -> Self {
        Self {
            sink,
            batch: Vec::with_capacity(IMPORT_BATCH_SIZE),
            inserted: 0,
        }
    }

    /// Add a record to the current batch, flushing synchronously when
    /// the batch reaches capacity.
    pub async fn append(&mut self, product: ValidatedProduct) -> Result<(), sqlx::Error> {
        self.batch.push(product);
        if self.batch.len() >= IMPORT_BATCH_SIZE {
            self.flush().await?;
        }
        Ok(())
    }

    /// Insert any remaining records and clear the batch. No-op when the
    /// batch is empty.
    pub async fn flush(&mut self) -> Result<(), sqlx::Error> {
        if self.batch.is_empty() {
            return Ok(());
        }
        self.sink.insert_many(&self.batch).await?;
        self.inserted += self.batch.len() as u64;
        self.batch.clear();
        Ok(())
    }

    /// Total records written across all flushes so far.
    pub fn inserted(&self) -> u64 {
        self.inserted
    }
}
