//! Bus-name suffixes and track object paths.
//!
//! Both are built from 32-bit MurmurHash3 (x86 variant) with a fixed seed,
//! so a track's path is identical in every process that computes it.

use std::{
    process,
    time::{SystemTime, UNIX_EPOCH},
};

/// Seed shared by every hash the adapter computes.
pub const HASH_SEED: u32 = 0;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3 x86 32-bit over `data`.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;
    let mut blocks = data.chunks_exact(4);

    for block in blocks.by_ref() {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k1 = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k1 |= u32::from(*byte) << (8 * i);
        }
        h1 ^= mix_k1(k1);
    }

    h1 ^= data.len() as u32;
    fmix32(h1)
}

fn mix_k1(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Order-sensitive bytewise combination of 32-bit hashes.
///
/// Each hash contributes its little-endian bytes as
/// `acc[i] = acc[i] * 37 ^ next[i]`; swapping inputs changes the result.
pub fn combine_ordered(hashes: &[u32]) -> u32 {
    let mut acc = [0u8; 4];
    for hash in hashes {
        for (slot, byte) in acc.iter_mut().zip(hash.to_le_bytes()) {
            *slot = slot.wrapping_mul(37) ^ byte;
        }
    }
    u32::from_le_bytes(acc)
}

/// Stable identifier for a track.
pub fn track_id(title: &str, media_id: &str) -> u64 {
    let title_hash = murmur3_32(title.as_bytes(), HASH_SEED);
    let media_hash = murmur3_32(media_id.as_bytes(), HASH_SEED);
    u64::from(combine_ordered(&[title_hash, media_hash]))
}

/// Object path identifying a track, e.g. `/com/example/app/123456`.
///
/// Namespace segments are split on `.`; characters not allowed in object
/// paths become `_` and empty segments are dropped.
pub fn track_object_path(namespace: &str, title: &str, media_id: &str) -> String {
    let mut path = String::new();

    for segment in namespace.split('.').filter(|s| !s.is_empty()) {
        path.push('/');
        path.extend(segment.chars().map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        }));
    }

    path.push('/');
    path.push_str(&track_id(title, media_id).to_string());
    path
}

/// Per-adapter suffix that makes the well-known bus name unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusIdentity {
    suffix: String,
}

impl BusIdentity {
    /// Hash the current time and process id into a fresh suffix.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();

        let mut material = Vec::with_capacity(12);
        material.extend_from_slice(&nanos.to_le_bytes());
        material.extend_from_slice(&process::id().to_le_bytes());

        Self::from_hash(murmur3_32(&material, HASH_SEED))
    }

    /// Suffix rendered from a known hash.
    pub fn from_hash(hash: u32) -> Self {
        Self {
            suffix: format!("{hash:08x}"),
        }
    }

    /// Eight lowercase hex digits.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Well-known bus name under `prefix`.
    pub fn bus_name(&self, prefix: &str) -> String {
        format!("{prefix}.x{}", self.suffix)
    }
}
