//! ### English
//! Hash map keyed by binder ids (ids are dense and never reused, so hashing them is wasted work).
//!
//! ### 中文
//! 以 binder id 为 key 的 HashMap（id 稠密且不复用，对其做哈希纯属浪费）。

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

/// ### English
/// Identity hasher for `i32` binder ids.
///
/// ### 中文
/// 用于 `i32` binder id 的恒等哈希。
#[derive(Default)]
pub(super) struct BinderIdHasher(u64);

impl Hasher for BinderIdHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0 = bytes
            .iter()
            .fold(self.0, |hash, &byte| (hash << 8) | u64::from(byte));
    }

    fn write_i32(&mut self, id: i32) {
        self.0 = u64::from(id as u32);
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

pub(super) type BinderIdMap<V> = HashMap<i32, V, BuildHasherDefault<BinderIdHasher>>;

#[cfg(test)]
mod tests {
    use std::hash::BuildHasher;

    use super::*;

    #[test]
    fn ids_hash_to_themselves() {
        let build = BuildHasherDefault::<BinderIdHasher>::default();
        assert_eq!(build.hash_one(7i32), 7);
        assert_eq!(build.hash_one(-1i32), u64::from(u32::MAX));
    }
}
