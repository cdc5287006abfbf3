/// Deterministic hashing based on splitmix64/32. No stateful RNG in the fill loop.

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[inline]
pub fn splitmix32(mut x: u32) -> u32 {
    x = x.wrapping_add(0x9E3779B9);
    let mut z = x;
    z = (z ^ (z >> 16)).wrapping_mul(0x7FEB352D);
    z = (z ^ (z >> 15)).wrapping_mul(0x846CA68B);
    z ^ (z >> 16)
}

#[inline]
pub fn seed_u32(seed: u64, salt: u64) -> u32 {
    splitmix64(seed ^ salt) as u32
}

/// Hash of a cell coordinate under a 32-bit seed.
#[inline]
pub fn hash_cell(row: usize, col: usize, seed: u32) -> u32 {
    let r = row as u32;
    let c = col as u32;
    let mut h = seed ^ 0x9E3779B9;
    h = splitmix32(h ^ r.wrapping_mul(0x85EBCA6B));
    h = splitmix32(h ^ c.wrapping_mul(0xC2B2AE35));
    h
}

/// Fair coin for a cell: the top bit of its hash.
#[inline]
pub fn coin(row: usize, col: usize, seed: u32) -> bool {
    hash_cell(row, col, seed) >> 31 == 1
}
