//! Asset directory trait.
//!
//! The directory is the only external collaborator of the validator:
//! - `list_ids`: every known asset id for a data source
//! - `get_asset`: one asset record by `(id, source)`
//! - `get_latest_timeseries_value`: latest sample of a realtime stream
//!
//! The trait is async and backend-agnostic. An in-memory fake is provided
//! in the `fakes` module and an HTTP backend in `http`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::record::{AssetRecord, TimeseriesValue};
use crate::DirectoryResult;

/// Remote asset directory.
///
/// Guarantees:
/// - `list_ids` returns ids in the directory's own order; may be empty.
/// - `get_asset` returns `Ok(None)` when no record matches; when the
///   backend yields several matches, the first is returned.
/// - `Err` means the directory itself failed (transport, auth, config).
#[async_trait]
pub trait AssetDirectory: Send + Sync {
    /// List all asset ids for a source.
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>>;

    /// Fetch one asset by id within a source.
    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>>;

    /// Fetch the latest timeseries sample for a realtime stream.
    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>>;
}

#[async_trait]
impl<T: AssetDirectory + ?Sized> AssetDirectory for &T {
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>> {
        (**self).list_ids(source).await
    }

    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>> {
        (**self).get_asset(id, source).await
    }

    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>> {
        (**self)
            .get_latest_timeseries_value(id, source, measurement)
            .await
    }
}

#[async_trait]
impl<T: AssetDirectory + ?Sized> AssetDirectory for Box<T> {
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>> {
        (**self).list_ids(source).await
    }

    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>> {
        (**self).get_asset(id, source).await
    }

    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>> {
        (**self)
            .get_latest_timeseries_value(id, source, measurement)
            .await
    }
}

#[async_trait]
impl<T: AssetDirectory + ?Sized> AssetDirectory for Arc<T> {
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>> {
        (**self).list_ids(source).await
    }

    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>> {
        (**self).get_asset(id, source).await
    }

    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>> {
        (**self)
            .get_latest_timeseries_value(id, source, measurement)
            .await
    }
}
