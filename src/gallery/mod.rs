//! Gallery coordinator: the two-system upload and delete flows.
//!
//! Every image lives in two places at once -- the binary in the object
//! store, the metadata row in SQLite -- and this module is the only
//! writer of that join point. Upload writes the object first and the row
//! second, reverting the object write if the row insert fails. Delete
//! removes the object first and the row second, aborting before the row
//! delete when the object delete fails so that a surviving row always
//! implies a reachable object.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use galleria_db::pool::{get_conn, DbPool};
use galleria_db::queries::images;

use crate::store::{ObjectStore, StoreError};

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Database-assigned row id.
    pub id: i64,
    /// Object-store key the binary was stored under.
    pub stored_key: String,
    /// Backend-reported location of the stored object.
    pub location: String,
}

/// Upload failures, in the order the steps run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request carried no file data.
    #[error("no file data provided")]
    NoFile,

    /// The object-store write failed; nothing was persisted.
    #[error("object store write failed for {key}: {source}")]
    ObjectStoreWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The metadata insert failed after the object was written.
    ///
    /// A compensating object delete was attempted exactly once;
    /// `compensation` is `None` when it succeeded and carries the delete
    /// failure when it did not. Either way this error reports the insert
    /// failure as the primary cause.
    #[error("metadata insert failed for {key}: {source}")]
    MetadataWrite {
        key: String,
        #[source]
        source: galleria_common::Error,
        compensation: Option<StoreError>,
    },
}

/// Delete failures, in the order the steps run.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    /// No metadata row exists for the id.
    #[error("image not found: {0}")]
    NotFound(i64),

    /// The metadata lookup itself failed; no store was touched.
    #[error("metadata lookup failed for {id}: {source}")]
    MetadataLookup {
        id: i64,
        #[source]
        source: galleria_common::Error,
    },

    /// The object-store delete failed; the metadata row was left intact.
    #[error("object store delete failed for {key}: {source}")]
    ObjectStoreDelete {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The row delete failed after the object was removed. The row
    /// remains as a known inconsistency; the object is gone.
    #[error("metadata delete failed for {id}: {source}")]
    MetadataDelete {
        id: i64,
        #[source]
        source: galleria_common::Error,
    },
}

/// Coordinates the object store and the metadata table.
///
/// Both handles are created once at startup and injected here; the
/// service is shared across requests behind an `Arc`.
pub struct GalleryService {
    store: Arc<dyn ObjectStore>,
    pool: DbPool,
}

impl GalleryService {
    pub fn new(store: Arc<dyn ObjectStore>, pool: DbPool) -> Self {
        Self { store, pool }
    }

    /// Store an image and record its metadata.
    ///
    /// The key is derived from the upload time and the client's filename;
    /// retried uploads therefore create fresh keys and rows rather than
    /// overwriting. `category` is stored verbatim.
    pub async fn upload(
        &self,
        data: Bytes,
        original_filename: &str,
        category: &str,
    ) -> Result<UploadReceipt, UploadError> {
        if data.is_empty() {
            return Err(UploadError::NoFile);
        }

        let key = object_key(original_filename);

        let put = self
            .store
            .put(&key, data)
            .await
            .map_err(|source| UploadError::ObjectStoreWrite {
                key: key.clone(),
                source,
            })?;

        let record = match self.insert_record(&key, category) {
            Ok(record) => record,
            Err(source) => {
                // The object is in but the row is not; revert the write so
                // no unreachable object survives. The revert is best-effort
                // and never masks the insert failure.
                let compensation = match self.store.delete(&key).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            key = %key,
                            error = %e,
                            "Compensating object delete failed after metadata insert failure"
                        );
                        Some(e)
                    }
                };
                return Err(UploadError::MetadataWrite {
                    key,
                    source,
                    compensation,
                });
            }
        };

        tracing::info!(id = record.id, key = %key, "Image uploaded");

        Ok(UploadReceipt {
            id: record.id,
            stored_key: key,
            location: put.location,
        })
    }

    /// Remove an image's object and metadata row.
    pub async fn delete(&self, id: i64) -> Result<(), DeleteError> {
        let key = self
            .find_key(id)
            .map_err(|source| DeleteError::MetadataLookup { id, source })?
            .ok_or(DeleteError::NotFound(id))?;

        // Object first: abort here and the row still points at a stored
        // object. Row first and a failed object delete would strand an
        // unreachable (but billable) object.
        self.store
            .delete(&key)
            .await
            .map_err(|source| DeleteError::ObjectStoreDelete {
                key: key.clone(),
                source,
            })?;

        let rows = self
            .delete_record(id)
            .map_err(|source| DeleteError::MetadataDelete { id, source })?;

        if rows == 0 {
            // A concurrent delete removed the row after our lookup; the
            // object is gone either way.
            tracing::warn!(id, key = %key, "Metadata row vanished during delete");
        } else {
            tracing::info!(id, key = %key, "Image deleted");
        }

        Ok(())
    }

    fn insert_record(
        &self,
        key: &str,
        category: &str,
    ) -> galleria_common::Result<galleria_db::models::ImageRecord> {
        let conn = get_conn(&self.pool)?;
        images::insert_image(&conn, key, category)
    }

    fn find_key(&self, id: i64) -> galleria_common::Result<Option<String>> {
        let conn = get_conn(&self.pool)?;
        images::find_name_by_id(&conn, id)
    }

    fn delete_record(&self, id: i64) -> galleria_common::Result<usize> {
        let conn = get_conn(&self.pool)?;
        images::delete_by_id(&conn, id)
    }
}

/// Derive the object-store key for an upload.
///
/// Millisecond timestamp plus the client filename gives practical
/// uniqueness for a low-traffic gallery; collisions are accepted rather
/// than guarded against.
fn object_key(original_filename: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), original_filename)
}
