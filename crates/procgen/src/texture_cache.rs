//! Memoized glow-text textures, keyed by (text, color).
//!
//! Entries are never evicted: a city has a bounded set of sign texts and colors.

use engine_core::{Color, TextureData, TextureHandle};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub text: String,
    pub color: Color,
}

impl TextureKey {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    /// Flat `text_#rrggbb` form used in logs and exported file names.
    pub fn label(&self) -> String {
        format!("{}_{}", self.text, self.color)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<TextureKey, TextureHandle>,
    stats: CacheStats,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached texture for `key`, running `create` only if it is absent.
    /// Lookup and insertion happen under one exclusive borrow, so `create` runs at most
    /// once per key.
    pub fn get_or_insert_with(&mut self, key: TextureKey, create: impl FnOnce(&TextureKey) -> TextureData) -> TextureHandle {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                log::trace!("Texture cache hit: {}", entry.key().label());
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                log::trace!("Texture cache miss: {}", entry.key().label());
                let texture = Arc::new(create(entry.key()));
                Arc::clone(entry.insert(texture))
            }
        }
    }

    pub fn get(&self, key: &TextureKey) -> Option<&TextureHandle> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// All cached textures, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&TextureKey, &TextureHandle)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_handle_and_creates_once() {
        let mut cache = TextureCache::new();
        let mut created = 0;
        let key = TextureKey::new("寿司", Color::from_hex(0xff3366));

        let a = cache.get_or_insert_with(key.clone(), |_| {
            created += 1;
            TextureData::new(2, 2)
        });
        let b = cache.get_or_insert_with(key, |_| {
            created += 1;
            TextureData::new(2, 2)
        });

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(created, 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn color_is_part_of_the_key() {
        let mut cache = TextureCache::new();
        let red = cache.get_or_insert_with(TextureKey::new("BAR", Color::from_hex(0xff0000)), |_| TextureData::new(1, 1));
        let blue = cache.get_or_insert_with(TextureKey::new("BAR", Color::from_hex(0x0000ff)), |_| TextureData::new(1, 1));
        assert!(!Arc::ptr_eq(&red, &blue));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn label_joins_text_and_color() {
        assert_eq!(TextureKey::new("BAR", Color::from_hex(0x33ccff)).label(), "BAR_#33ccff");
    }
}
