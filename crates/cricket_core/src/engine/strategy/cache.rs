//! Memoized overs keyed by context signature.
//!
//! The store is shared across matches. Entries never expire on wall-clock
//! time; a signature either matches or it does not.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::builder::OverBuilder;
use super::outcome::DeliveryOutcome;
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::context::{ContextSignature, SimulationContext};
use crate::error::StrategyError;

#[derive(Debug, Default)]
pub struct OverCache {
    entries: RwLock<HashMap<ContextSignature, Vec<DeliveryOutcome>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl OverCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, ..Default::default() }
    }

    pub fn get(&self, signature: &ContextSignature) -> Option<Vec<DeliveryOutcome>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let found = entries.get(signature).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn contains(&self, signature: &ContextSignature) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(signature)
    }

    /// Stores `outcomes` unless the signature is already present or the
    /// store is full. Returns whether this call inserted.
    pub fn remember(&self, signature: ContextSignature, outcomes: Vec<DeliveryOutcome>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity && !entries.contains_key(&signature) {
            return false;
        }
        match entries.entry(signature) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(outcomes);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

pub struct CacheStrategy {
    cache: Arc<OverCache>,
    bucket_width: f32,
}

impl CacheStrategy {
    pub fn new(cache: Arc<OverCache>, bucket_width: f32) -> Self {
        Self { cache, bucket_width }
    }
}

impl OverStrategy for CacheStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Cache
    }

    fn can_handle(&self, ctx: &SimulationContext) -> bool {
        self.cache.contains(&ctx.signature(self.bucket_width))
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let signature = ctx.signature(self.bucket_width);
        let outcomes = self.cache.get(&signature).ok_or(StrategyError::CacheMiss)?;
        debug!(over = ctx.over_number, "cached over reused");

        let mut builder = OverBuilder::new(ctx);
        for outcome in outcomes {
            builder.push(outcome);
        }
        Ok(builder.finish(self.kind())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::outcome::parse_outcomes;
    use crate::engine::test_fixtures::*;
    use crate::models::MatchFormat;
    use std::thread;

    #[test]
    fn test_miss_then_hit() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let cache = Arc::new(OverCache::new(8));
        let strategy = CacheStrategy::new(cache.clone(), 1.0);

        assert!(!strategy.can_handle(&ctx));
        assert_eq!(strategy.simulate_over(&ctx).unwrap_err(), StrategyError::CacheMiss);

        let over = parse_outcomes("1 . 4 Wd . 2 1").unwrap();
        assert!(cache.remember(ctx.signature(1.0), over.clone()));
        assert!(strategy.can_handle(&ctx));
        let result = strategy.simulate_over(&ctx).unwrap();
        assert_eq!(result.outcomes(), over);
        assert_eq!(result.strategy, StrategyKind::Cache);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_first_writer_wins() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let cache = OverCache::new(8);
        let first = parse_outcomes(". . . . . .").unwrap();
        let second = parse_outcomes("6 6 6 6 6 6").unwrap();
        assert!(cache.remember(ctx.signature(1.0), first.clone()));
        assert!(!cache.remember(ctx.signature(1.0), second));
        assert_eq!(cache.get(&ctx.signature(1.0)), Some(first));
    }

    #[test]
    fn test_capacity_bound() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let cache = OverCache::new(1);
        let over = parse_outcomes(". . . . . .").unwrap();
        assert!(cache.remember(ctx.signature(1.0), over.clone()));
        let mut other = ctx.signature(1.0);
        other.aggression = 9;
        assert!(!cache.remember(other, over));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_keep_one_entry() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let cache = Arc::new(OverCache::new(64));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let signature = ctx.signature(1.0);
                thread::spawn(move || {
                    let token = if i % 2 == 0 { "." } else { "1" };
                    let over = parse_outcomes(&[token; 6].join(" ")).unwrap();
                    cache.remember(signature, over)
                })
            })
            .collect();
        let inserted = handles.into_iter().map(|h| h.join().unwrap()).filter(|b| *b).count();
        assert_eq!(inserted, 1);
        assert_eq!(cache.len(), 1);
    }
}
