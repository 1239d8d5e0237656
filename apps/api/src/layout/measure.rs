//! Measurement Provider seam.
//!
//! A provider turns a block into its rendered height at the page's content width.
//! The `Measurer` wraps a provider with the per-kind fallback table and a memoizing
//! cache, so the packer always receives a usable height:
//!
//! - provider error, not-ready, panic, NaN/negative height → fallback height + warning
//! - successful heights are cached per `BlockKey` and reused while the block's content
//!   fingerprint is unchanged
//!
//! Every height of a document is resolved before packing starts; the packer never
//! calls back into a provider.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::layout::block::{Block, BlockKey};
use crate::layout::packer::PackWarning;
use crate::layout::page_config::PageConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error("measurement provider is not ready")]
    NotReady,

    #[error("cannot measure {key:?}: {reason}")]
    Unmeasurable { key: BlockKey, reason: String },

    #[error("provider returned an invalid height {height} for {key:?}")]
    InvalidHeight { key: BlockKey, height: f32 },
}

/// Anything that can report a block's rendered height at a given content width.
///
/// Implementations must be deterministic for a block's content and width.
pub trait MeasurementProvider: Send + Sync {
    fn measure(&self, block: &Block, content_width: f32) -> Result<f32, MeasureError>;

    /// Readiness signal for providers that render asynchronously. `None` means the
    /// provider can always measure. Callers wait for `true` before packing.
    fn readiness(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// A block paired with the height the packer will use for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub block: Block,
    pub height: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Cache
// ────────────────────────────────────────────────────────────────────────────

/// Memoized heights keyed by block identity.
#[derive(Debug, Default)]
pub struct MeasurementCache {
    entries: HashMap<BlockKey, (u64, f32)>,
    hits: u64,
    misses: u64,
}

impl MeasurementCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&mut self, key: BlockKey, fingerprint: u64) -> Option<f32> {
        match self.entries.get(&key) {
            Some((stored, height)) if *stored == fingerprint => {
                self.hits += 1;
                Some(*height)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: BlockKey, fingerprint: u64, height: f32) {
        self.entries.insert(key, (fingerprint, height));
    }

    /// Drops entries for blocks that no longer exist in the current plan.
    pub fn retain_keys(&mut self, live: &[BlockKey]) {
        self.entries.retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurer
// ────────────────────────────────────────────────────────────────────────────

/// Resolves heights for a whole block plan against one provider snapshot.
pub struct Measurer<'a> {
    provider: &'a dyn MeasurementProvider,
    config: &'a PageConfig,
    cache: &'a mut MeasurementCache,
}

impl<'a> Measurer<'a> {
    pub fn new(
        provider: &'a dyn MeasurementProvider,
        config: &'a PageConfig,
        cache: &'a mut MeasurementCache,
    ) -> Self {
        Self {
            provider,
            config,
            cache,
        }
    }

    /// Height for one block, falling back per kind when measurement fails.
    pub fn resolve(&mut self, block: &Block) -> (f32, Option<PackWarning>) {
        let key = block.key();
        let fingerprint = block.fingerprint();
        if let Some(height) = self.cache.get(key, fingerprint) {
            return (height, None);
        }

        let width = self.config.content_width();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.provider.measure(block, width)))
            .unwrap_or_else(|_| {
                Err(MeasureError::Unmeasurable {
                    key,
                    reason: "measurement provider panicked".to_string(),
                })
            })
            .and_then(|height| {
                if height.is_finite() && height >= 0.0 {
                    Ok(height)
                } else {
                    Err(MeasureError::InvalidHeight { key, height })
                }
            });

        match outcome {
            Ok(height) => {
                self.cache.insert(key, fingerprint, height);
                (height, None)
            }
            Err(error) => {
                let height = self.config.fallback.for_kind(key.kind());
                warn!(
                    block = ?key,
                    fallback = height,
                    error = %error,
                    "Measurement unavailable, using fallback height"
                );
                (
                    height,
                    Some(PackWarning::FallbackHeight {
                        key,
                        height,
                        reason: error.to_string(),
                    }),
                )
            }
        }
    }

    /// Measures every block of a plan, in order.
    pub fn resolve_all(&mut self, blocks: Vec<Block>) -> (Vec<MeasuredBlock>, Vec<PackWarning>) {
        let mut warnings = Vec::new();
        let measured: Vec<MeasuredBlock> = blocks
            .into_iter()
            .map(|block| {
                let (height, warning) = self.resolve(&block);
                warnings.extend(warning);
                MeasuredBlock { block, height }
            })
            .collect();

        let live: Vec<BlockKey> = measured.iter().map(|m| m.block.key()).collect();
        self.cache.retain_keys(&live);

        let (hits, misses) = self.cache.stats();
        debug!(
            blocks = measured.len(),
            fallbacks = warnings.len(),
            cache_hits = hits,
            cache_misses = misses,
            "Resolved block heights"
        );
        (measured, warnings)
    }
}

/// Waits until the provider reports readiness, bounded by `timeout`.
///
/// Returns false when the wait timed out or the readiness channel closed; callers
/// still pack, and unmeasurable blocks fall back.
pub async fn wait_until_ready(provider: &dyn MeasurementProvider, timeout: Duration) -> bool {
    let Some(mut rx) = provider.readiness() else {
        return true;
    };
    let outcome = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
        .await
        .map(|waited| waited.map(|_| ()));
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(_)) => {
            warn!("Measurement readiness channel closed before signalling ready");
            false
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Measurement provider not ready in time"
            );
            false
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixed heights
// ────────────────────────────────────────────────────────────────────────────

/// Provider backed by a precomputed height table, e.g. heights reported by a client
/// that rendered the blocks itself. Missing keys are unmeasurable.
#[derive(Debug, Clone, Default)]
pub struct FixedHeights {
    heights: HashMap<BlockKey, f32>,
}

impl FixedHeights {
    pub fn new(heights: HashMap<BlockKey, f32>) -> Self {
        Self { heights }
    }

    pub fn with(mut self, key: BlockKey, height: f32) -> Self {
        self.heights.insert(key, height);
        self
    }
}

impl MeasurementProvider for FixedHeights {
    fn measure(&self, block: &Block, _content_width: f32) -> Result<f32, MeasureError> {
        let key = block.key();
        self.heights
            .get(&key)
            .copied()
            .ok_or_else(|| MeasureError::Unmeasurable {
                key,
                reason: "no reported height".to_string(),
            })
    }
}
