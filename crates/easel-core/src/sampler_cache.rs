use std::collections::VecDeque;

use easel_protocol::desc::SamplerDesc;
use easel_protocol::Sampler;

/// Deduplicated samplers ordered from least to most recently used.
/// The cache owns one reference on every sampler it holds.
pub struct SamplerCache {
    capacity: usize,
    entries: VecDeque<(SamplerDesc, Sampler)>,
}

impl SamplerCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sampler cache size should be > 0");
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds a sampler matching `desc` and marks it most recently used.
    pub fn lookup(&mut self, desc: &SamplerDesc) -> Option<Sampler> {
        let position = self.entries.iter().position(|(d, _)| d == desc)?;
        let entry = self.entries.remove(position)?;
        let sampler = entry.1;
        self.entries.push_back(entry);
        Some(sampler)
    }

    /// Inserts a freshly created sampler. Returns the evicted sampler whose
    /// cache reference must now be released.
    pub fn insert(&mut self, desc: SamplerDesc, sampler: Sampler) -> Option<Sampler> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front().map(|(_, s)| s)
        } else {
            None
        };
        self.entries.push_back((desc, sampler));
        evicted
    }

    /// Empties the cache, returning every sampler it held.
    pub fn drain(&mut self) -> Vec<Sampler> {
        self.entries.drain(..).map(|(_, s)| s).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_protocol::desc::{TextureAddressMode, TextureFilter};
    use easel_protocol::Handle;

    fn sampler(index: u32) -> Sampler {
        Sampler(Handle {
            index,
            generation: 1,
        })
    }

    fn desc(filter: TextureFilter, u: TextureAddressMode) -> SamplerDesc {
        SamplerDesc {
            filter,
            u,
            ..SamplerDesc::default()
        }
    }

    #[test]
    fn test_hit_returns_same_sampler() {
        let mut cache = SamplerCache::new(2);
        let linear = desc(TextureFilter::Linear, TextureAddressMode::Repeat);
        assert_eq!(cache.lookup(&linear), None);
        assert_eq!(cache.insert(linear, sampler(1)), None);
        assert_eq!(cache.lookup(&linear), Some(sampler(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = SamplerCache::new(2);
        let a = desc(TextureFilter::Linear, TextureAddressMode::Repeat);
        let b = desc(TextureFilter::Point, TextureAddressMode::Repeat);
        let c = desc(TextureFilter::Point, TextureAddressMode::Clamp);

        cache.insert(a, sampler(1));
        cache.insert(b, sampler(2));
        // touching `a` makes `b` the eviction candidate
        assert!(cache.lookup(&a).is_some());
        assert_eq!(cache.insert(c, sampler(3)), Some(sampler(2)));
        assert_eq!(cache.lookup(&b), None);
        assert_eq!(cache.drain(), vec![sampler(1), sampler(3)]);
        assert!(cache.is_empty());
    }
}
