//! Shared input generation for integration tests.
//!
//! Generated data mixes sections with very different symbol statistics so
//! that both short and long codes show up:
//! - Runs of a single byte
//! - Text-like data over a small alphabet
//! - Repeating short patterns
//! - Uniform random bytes
//! - Skewed data with Fibonacci-like weights (deep trees)

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `size_bytes` of mixed data, reproducible from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(rng.gen_range(64..=4096));

        match rng.gen_range(0..10u8) {
            0..=1 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }
            2..=4 => {
                let alphabet = b"abcdefghijklmnopqrstuvwxyz .!,\n";
                for _ in 0..section {
                    data.push(alphabet[rng.gen_range(0..alphabet.len())]);
                }
            }
            5..=6 => {
                let len = rng.gen_range(2..=16);
                let pattern: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
                data.extend(pattern.iter().cycle().take(section));
            }
            7 => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
            _ => data.extend(skewed(&mut rng, section)),
        }
    }

    data.truncate(size_bytes);
    data
}

/// Data over at most 41 symbols with geometric weights.
pub fn generate_skewed_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    skewed(&mut rng, size_bytes)
}

fn skewed(rng: &mut ChaCha8Rng, size_bytes: usize) -> Vec<u8> {
    let base: u8 = rng.gen();
    (0..size_bytes)
        .map(|_| {
            // Each further symbol is half as likely as the previous one.
            let mut offset = 0u8;
            while offset < 40 && rng.gen_bool(0.5) {
                offset += 1;
            }
            base.wrapping_add(offset)
        })
        .collect()
}

/// Bytes with Fibonacci frequencies: symbol `i` appears `fib(i + 1)` times.
///
/// The unconstrained Huffman tree for this is a chain, one level per symbol.
pub fn fibonacci_data(symbols: usize) -> Vec<u8> {
    let mut data = Vec::new();
    let (mut a, mut b) = (1usize, 1usize);
    for symbol in 0..symbols {
        data.extend(std::iter::repeat(symbol as u8).take(a));
        let next = a + b;
        a = b;
        b = next;
    }
    data
}

/// Smallest limit able to hold `distinct` symbols.
pub fn min_feasible_limit(distinct: usize) -> u32 {
    if distinct <= 1 {
        1
    } else {
        usize::BITS - (distinct - 1).leading_zeros()
    }
}
