//! Series service
//!
//! Front door for callers:
//! - Checks the cache for (date, requested mode)
//! - Runs the spreadsheet or JSON pipeline, or both in `auto` mode
//! - Stores successful results for the configured TTL

use crate::config::Config;
use crate::data::{aggregate, SourceMeta};
use crate::error::{Result, SeriesError};
use crate::ingester::{self, JsonExtractor, RowExtractor, SourceResolver, SpreadsheetExtractor};
use crate::request::SeriesRequest;
use crate::storage::{CacheKey, NoopCache, SeriesCache, TtlCache};
use crate::types::{SeriesResult, SourceKind, SourceMode};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};


pub struct SeriesService {
    resolver: SourceResolver,
    xlsx: SpreadsheetExtractor,
    json: JsonExtractor,
    cache: Arc<dyn SeriesCache>,
    cache_ttl: Duration,
    default_mode: SourceMode,
}

impl SeriesService {
    /// Build the service with the cache described by `config`
    pub fn new(config: &Config) -> Self {
        let cache: Arc<dyn SeriesCache> = if config.cache.enabled {
            Arc::new(TtlCache::new())
        } else {
            Arc::new(NoopCache)
        };
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: &Config, cache: Arc<dyn SeriesCache>) -> Self {
        Self {
            resolver: SourceResolver::new(&config.sources),
            xlsx: SpreadsheetExtractor::new(config.sources.layout.clone()),
            json: JsonExtractor,
            cache,
            cache_ttl: config.cache.ttl(),
            default_mode: config.sources.default_mode,
        }
    }

    /// Mode used when a request names none
    pub fn default_mode(&self) -> SourceMode {
        self.default_mode
    }

    /// File the pipeline for `mode` would read, following the same fallback
    /// as `get_series`
    pub fn resolve_for(&self, date: NaiveDate, mode: SourceMode) -> Result<PathBuf> {
        match mode.kind() {
            Some(kind) => self.resolver.resolve(date, kind),
            None => self.with_fallback(date, |kind| self.resolver.resolve(date, kind)),
        }
    }

    pub fn handle(&self, request: &SeriesRequest) -> Result<SeriesResult> {
        self.get_series(request.date, request.mode)
    }

    /// Series for `date`, served from cache when fresh
    pub fn get_series(&self, date: NaiveDate, mode: SourceMode) -> Result<SeriesResult> {
        let key = CacheKey::new(date, mode);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for {} ({})", date, mode);
            return Ok(hit);
        }

        let result = match mode.kind() {
            Some(kind) => self.load(date, kind),
            None => self.load_auto(date),
        };

        match result {
            Ok(series) => {
                info!(
                    "Loaded {} slots for {} from {} ({})",
                    series.len(),
                    date,
                    series.source_file,
                    series.source_kind
                );
                self.cache.put(key, series.clone(), self.cache_ttl);
                Ok(series)
            }
            Err(e) => {
                warn!("Series for {} ({}) failed: {}", date, mode, e);
                Err(e)
            }
        }
    }

    fn load_auto(&self, date: NaiveDate) -> Result<SeriesResult> {
        self.with_fallback(date, |kind| self.load(date, kind))
    }

    /// Spreadsheet first; JSON only when no spreadsheet exists for the date
    fn with_fallback<T>(&self, date: NaiveDate, step: impl Fn(SourceKind) -> Result<T>) -> Result<T> {
        match step(SourceKind::Xlsx) {
            Err(e) if e.is_fallback_eligible() => {
                info!("No spreadsheet for {} ({}), trying JSON", date, e);
                step(SourceKind::Json)
            }
            other => other,
        }
    }

    /// Run one source pipeline without touching the cache
    pub fn load(&self, date: NaiveDate, kind: SourceKind) -> Result<SeriesResult> {
        let path = self.resolver.resolve(date, kind)?;
        let extractor = self.extractor(kind);
        let rows = extractor.extract_file(&path)?;
        let meta = SourceMeta {
            date,
            kind: extractor.kind(),
            file: ingester::file_name(&path),
        };
        aggregate(&rows, meta)
    }

    /// `get_series` on the blocking pool
    pub async fn fetch(self: Arc<Self>, date: NaiveDate, mode: SourceMode) -> Result<SeriesResult> {
        tokio::task::spawn_blocking(move || self.get_series(date, mode))
            .await
            .map_err(|e| SeriesError::Internal(format!("series task failed: {}", e)))?
    }

    fn extractor(&self, kind: SourceKind) -> &dyn RowExtractor {
        match kind {
            SourceKind::Xlsx => &self.xlsx,
            SourceKind::Json => &self.json,
        }
    }
}
