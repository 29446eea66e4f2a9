//! Tag-keyed object pool with lazy expansion.
//!
//! The pool satisfies every acquire by dequeue-or-construct: a queue miss on
//! a known tag lazily builds a fresh instance, so the pool never blocks.
//! Instances are never destroyed on release; they return to their tag's
//! queue and wait for the next acquire.

use std::collections::{HashMap, VecDeque};

use rushline_core::PoolTag;

/// Unique identity of a constructed pool instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Retrieves the numeric representation of the identity.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Handle to a live pool instance.
///
/// The handle is move-only: an instance is owned either by its pool queue or
/// by exactly one active store, never both.
#[derive(Debug)]
pub struct PooledInstance {
    id: InstanceId,
    tag: PoolTag,
}

impl PooledInstance {
    /// Identity of the instance.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Tag of the template the instance was constructed from.
    #[must_use]
    pub const fn tag(&self) -> PoolTag {
        self.tag
    }
}

/// Template describing how a tag's instances come into being.
#[derive(Clone, Copy, Debug)]
pub struct PoolTemplate {
    tag: PoolTag,
    prewarm: usize,
}

impl PoolTemplate {
    /// Creates a template that pre-warms the given number of idle instances.
    #[must_use]
    pub const fn new(tag: PoolTag, prewarm: usize) -> Self {
        Self { tag, prewarm }
    }

    /// Tag the template registers under.
    #[must_use]
    pub const fn tag(&self) -> PoolTag {
        self.tag
    }

    /// Number of instances constructed up front.
    #[must_use]
    pub const fn prewarm(&self) -> usize {
        self.prewarm
    }
}

/// Registry mapping pool tags to queues of inactive instances.
#[derive(Debug, Default)]
pub struct ObjectPool {
    templates: HashMap<PoolTag, PoolTemplate>,
    queues: HashMap<PoolTag, VecDeque<PooledInstance>>,
    next_instance: u64,
    constructed: u64,
    discarded: u64,
}

impl ObjectPool {
    /// Creates an empty pool with no registered templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template and pre-warms its queue.
    ///
    /// Re-registering an already-known tag keeps the existing queue and only
    /// tops it up to the requested pre-warm count.
    pub fn register(&mut self, template: PoolTemplate) {
        let tag = template.tag();
        let _ = self.templates.insert(tag, template);
        let missing = template
            .prewarm()
            .saturating_sub(self.queues.get(&tag).map_or(0, VecDeque::len));
        for _ in 0..missing {
            let instance = self.construct(tag);
            self.queues.entry(tag).or_default().push_back(instance);
        }
    }

    /// Acquires an instance of the given tag.
    ///
    /// Dequeues an idle instance when one exists, lazily constructs one when
    /// the queue is empty, and returns `None` only when the tag has no
    /// registered template (pool miss; callers treat it as "spawn skipped").
    #[must_use]
    pub fn acquire(&mut self, tag: PoolTag) -> Option<PooledInstance> {
        if let Some(instance) = self.queues.get_mut(&tag).and_then(VecDeque::pop_front) {
            return Some(instance);
        }
        if self.templates.contains_key(&tag) {
            return Some(self.construct(tag));
        }
        None
    }

    /// Returns an instance to its tag's queue.
    ///
    /// Instances whose tag is no longer registered are discarded and counted;
    /// this is a fail-safe path, never fatal.
    pub fn release(&mut self, instance: PooledInstance) {
        if self.templates.contains_key(&instance.tag()) {
            self.queues
                .entry(instance.tag())
                .or_default()
                .push_back(instance);
        } else {
            self.discarded = self.discarded.saturating_add(1);
        }
    }

    /// Reports whether a template is registered for the tag.
    #[must_use]
    pub fn has_template(&self, tag: PoolTag) -> bool {
        self.templates.contains_key(&tag)
    }

    /// Number of idle instances queued under the tag.
    #[must_use]
    pub fn idle(&self, tag: PoolTag) -> usize {
        self.queues.get(&tag).map_or(0, VecDeque::len)
    }

    /// Total number of instances constructed since the last clear.
    #[must_use]
    pub fn constructed(&self) -> u64 {
        self.constructed
    }

    /// Number of instances discarded because their tag was unknown.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Clears templates and queues entirely.
    pub fn clear(&mut self) {
        self.templates.clear();
        self.queues.clear();
        self.constructed = 0;
        self.discarded = 0;
    }

    fn construct(&mut self, tag: PoolTag) -> PooledInstance {
        let id = InstanceId(self.next_instance);
        self.next_instance = self.next_instance.wrapping_add(1);
        self.constructed = self.constructed.saturating_add(1);
        PooledInstance { id, tag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COIN: PoolTag = PoolTag::new("pickup.coin");

    #[test]
    fn acquire_on_empty_queue_constructs_lazily() {
        let mut pool = ObjectPool::new();
        pool.register(PoolTemplate::new(COIN, 0));

        let instance = pool.acquire(COIN).expect("known template must satisfy");
        assert_eq!(instance.tag(), COIN);
        assert_eq!(pool.idle(COIN), 0, "queue untouched until release");

        pool.release(instance);
        assert_eq!(pool.idle(COIN), 1);
    }

    #[test]
    fn acquire_prefers_prewarmed_instances() {
        let mut pool = ObjectPool::new();
        pool.register(PoolTemplate::new(COIN, 3));
        assert_eq!(pool.idle(COIN), 3);
        assert_eq!(pool.constructed(), 3);

        let instance = pool.acquire(COIN).expect("prewarmed instance");
        assert_eq!(pool.idle(COIN), 2);
        assert_eq!(pool.constructed(), 3, "no lazy construction needed");
        pool.release(instance);
        assert_eq!(pool.idle(COIN), 3);
    }

    #[test]
    fn unknown_tag_misses_without_constructing() {
        let mut pool = ObjectPool::new();
        assert!(pool.acquire(PoolTag::new("missing")).is_none());
        assert_eq!(pool.constructed(), 0);
    }

    #[test]
    fn release_after_clear_discards_fail_safe() {
        let mut pool = ObjectPool::new();
        pool.register(PoolTemplate::new(COIN, 0));
        let instance = pool.acquire(COIN).expect("instance");

        pool.clear();
        pool.release(instance);
        assert_eq!(pool.discarded(), 1);
        assert_eq!(pool.idle(COIN), 0);
    }

    #[test]
    fn reregistering_tops_up_without_duplicating() {
        let mut pool = ObjectPool::new();
        pool.register(PoolTemplate::new(COIN, 2));
        pool.register(PoolTemplate::new(COIN, 4));
        assert_eq!(pool.idle(COIN), 4);
        pool.register(PoolTemplate::new(COIN, 1));
        assert_eq!(pool.idle(COIN), 4, "existing queue is kept");
    }
}
