//! In-memory fake for the asset directory (testing only)
//!
//! `MemoryAssetDirectory` satisfies the `AssetDirectory` contract without any
//! network access and records every call so tests can assert exactly which
//! round trips were made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::directory::AssetDirectory;
use crate::error::DirectoryError;
use crate::record::{AssetRecord, TimeseriesValue};
use crate::DirectoryResult;

/// One call made against a [`MemoryAssetDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    ListIds {
        source: String,
    },
    GetAsset {
        id: String,
        source: String,
    },
    LatestTimeseries {
        id: String,
        source: String,
        measurement: Option<String>,
    },
}

/// In-memory directory backed by `(source, id)`-keyed documents.
///
/// `list_ids` returns ids in insertion order per source.
#[derive(Debug, Default)]
pub struct MemoryAssetDirectory {
    assets: Mutex<HashMap<(String, String), Value>>,
    order: Mutex<HashMap<String, Vec<String>>>,
    timeseries: Mutex<HashMap<(String, String, Option<String>), TimeseriesValue>>,
    calls: Mutex<Vec<DirectoryCall>>,
    unreachable: AtomicBool,
}

impl MemoryAssetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an asset document.
    pub fn insert(&self, source: &str, id: &str, document: Value) {
        let key = (source.to_string(), id.to_string());
        let mut assets = self.assets.lock().unwrap();
        if assets.insert(key, document).is_none() {
            self.order
                .lock()
                .unwrap()
                .entry(source.to_string())
                .or_default()
                .push(id.to_string());
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_asset(self, source: &str, id: &str, document: Value) -> Self {
        self.insert(source, id, document);
        self
    }

    pub fn insert_timeseries(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
        value: TimeseriesValue,
    ) {
        let key = (
            id.to_string(),
            source.to_string(),
            measurement.map(str::to_string),
        );
        self.timeseries.lock().unwrap().insert(key, value);
    }

    /// Make every subsequent call fail as if the network were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DirectoryCall::ListIds { .. }))
            .count()
    }

    /// `(id, source)` of every `get_asset` call, in order.
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DirectoryCall::GetAsset { id, source } => Some((id, source)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DirectoryCall) -> DirectoryResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable(
                "memory directory marked unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetDirectory for MemoryAssetDirectory {
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>> {
        self.record(DirectoryCall::ListIds {
            source: source.to_string(),
        })?;
        let order = self.order.lock().unwrap();
        Ok(order.get(source).cloned().unwrap_or_default())
    }

    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>> {
        self.record(DirectoryCall::GetAsset {
            id: id.to_string(),
            source: source.to_string(),
        })?;
        let assets = self.assets.lock().unwrap();
        Ok(assets
            .get(&(source.to_string(), id.to_string()))
            .cloned()
            .map(AssetRecord::from_document))
    }

    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>> {
        self.record(DirectoryCall::LatestTimeseries {
            id: id.to_string(),
            source: source.to_string(),
            measurement: measurement.map(str::to_string),
        })?;
        let key = (
            id.to_string(),
            source.to_string(),
            measurement.map(str::to_string),
        );
        Ok(self.timeseries.lock().unwrap().get(&key).cloned())
    }
}
