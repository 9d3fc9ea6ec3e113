use std::hash::{DefaultHasher, Hash, Hasher};

use super::row::Value;

pub const DEFAULT_BUCKET_COUNT: usize = 128;

/// One entry of a bucket chain: the primary-key value and the position
/// of the matching row in the table's row vector.
#[derive(Debug)]
struct Node {
    key: Value,
    handle: usize,
    next: Option<Box<Node>>,
}

/// A fixed-bucket chained hash map from primary-key value to row
/// handle. Lookups are exact-match only.
///
/// The bucket count never changes after construction, so high load
/// factors degrade to chain scans. That is an accepted bound for a
/// single-process, small-scale store; a rehash-on-load-factor pass is
/// the obvious extension point if that assumption falls.
///
/// Handles are plain positions into the owning table's row vector, not
/// shared references. The table shifts them down after a row removal
/// (see [`HashIndex::shift_back`]).
#[derive(Debug)]
pub struct HashIndex {
    bucket_count: usize,
    buckets: Vec<Option<Box<Node>>>,
}

impl HashIndex {
    pub fn new() -> HashIndex {
        HashIndex::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    pub fn with_bucket_count(bucket_count: usize) -> HashIndex {
        assert!(bucket_count > 0, "bucket count must be positive");

        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, || None);

        HashIndex {
            bucket_count,
            buckets,
        }
    }

    pub fn insert(&mut self, key: Value, handle: usize) {
        //! Add a chain entry for `key`. If an entry with an equal key
        //! already exists its handle is replaced, not rejected.

        let slot = self.bucket_of(&key);
        let mut cursor = &mut self.buckets[slot];

        loop {
            match cursor {
                Some(node) if node.key == key => {
                    node.handle = handle;
                    return;
                }
                Some(node) => cursor = &mut node.next,
                None => {
                    *cursor = Some(Box::new(Node {
                        key,
                        handle,
                        next: None,
                    }));
                    return;
                }
            }
        }
    }

    pub fn find(&self, key: &Value) -> Option<usize> {
        //! Scan the target bucket's chain for an equal key.
        //!
        //! Returns the stored row handle, or [`None`] for a miss.

        let mut cursor = self.buckets[self.bucket_of(key)].as_deref();

        while let Some(node) = cursor {
            if node.key == *key {
                return Some(node.handle);
            }
            cursor = node.next.as_deref();
        }

        None
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        //! Unlink the chain entry matching `key`, whether it sits at
        //! the head or further down the chain.
        //!
        //! Returns whether a match was found.

        let slot = self.bucket_of(key);
        let mut cursor = &mut self.buckets[slot];

        loop {
            match cursor {
                None => return false,
                Some(node) if node.key == *key => {
                    let next = node.next.take();
                    *cursor = next;
                    return true;
                }
                Some(node) => cursor = &mut node.next,
            }
        }
    }

    pub fn shift_back(&mut self, start: usize) {
        //! Re-shape the stored handles so as to close the gap left in
        //! the table's row vector by a removal at position `start`.

        for bucket in &mut self.buckets {
            let mut cursor = bucket.as_deref_mut();
            while let Some(node) = cursor {
                if node.handle > start {
                    node.handle -= 1;
                }
                cursor = node.next.as_deref_mut();
            }
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = None;
        }
    }

    pub fn len(&self) -> usize {
        //! Total number of chain entries across all buckets.

        let mut count = 0;
        for bucket in &self.buckets {
            let mut cursor = bucket.as_deref();
            while let Some(node) = cursor {
                count += 1;
                cursor = node.next.as_deref();
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.is_none())
    }

    fn bucket_of(&self, key: &Value) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.bucket_count
    }
}

impl Default for HashIndex {
    fn default() -> HashIndex {
        HashIndex::new()
    }
}
