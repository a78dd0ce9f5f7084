//! Maximum code length enforcement.
//!
//! Works on the histogram of code lengths rather than on individual
//! symbols:
//!
//! 1. Count codes per length.
//! 2. Fold every bucket deeper than `L` upwards: two leaves at depth `d`
//!    collapse into one at `d - 1`. A Huffman tree is full, so each level
//!    below the shallowest holds an even number of leaves and the fold
//!    keeps the Kraft sum at exactly 1. For a table that is not full, a
//!    lone deepest leaf moves up one level; that doubles its Kraft term
//!    but the sum stays at or below 1.
//! 3. Folding loses leaves, so the histogram is rebalanced to the real
//!    symbol count by splitting the deepest leaf shallower than `L` into
//!    two one level deeper. Filling free slots at depth `L` and merging
//!    surplus leaves only apply to tables that are not full; Huffman tree
//!    lengths never reach them.
//! 4. The fixed histogram is handed back out shortest-first to symbols
//!    ordered by frequency descending, then symbol ascending.
//!
//! The result is a valid prefix code within the bound; it is not
//! guaranteed to be the optimal length-limited code.

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::frequency::{FrequencyTable, ALPHABET_SIZE};
use crate::lengths::LengthTable;

/// Fail unless `symbols` distinct codes fit within `limit` bits.
///
/// A limit of 0 means unlimited and always passes.
pub fn check_feasible(symbols: usize, limit: u32) -> Result<()> {
    if limit == 0 || limit >= usize::BITS {
        return Ok(());
    }
    if symbols > 1usize << limit {
        return Err(ConfigError::InfeasibleLimit { symbols, limit }.into());
    }
    Ok(())
}

/// Rewrite `initial` so that no code is longer than `limit` bits.
///
/// `limit == 0` returns the table unchanged, as does a limit already met by
/// every code.
///
/// # Errors
/// `ConfigError::InfeasibleLimit` when the present symbols cannot fit.
pub fn limit_lengths(
    initial: &LengthTable,
    limit: u32,
    freqs: &FrequencyTable,
) -> Result<LengthTable> {
    let symbols = initial.symbol_count();
    check_feasible(symbols, limit)?;

    let max_len = initial.max_length() as usize;
    if limit == 0 || max_len <= limit as usize {
        return Ok(initial.clone());
    }
    let limit = limit as usize;

    let mut counts: Vec<u64> = initial.histogram().into_iter().map(u64::from).collect();

    fold_overlong(&mut counts, limit);
    counts.truncate(limit + 1);
    rebalance(&mut counts, limit, symbols as u64);

    let lengths = assign_by_frequency(initial, &counts, freqs);
    debug!(
        limit,
        before = max_len,
        after = lengths.max_length(),
        "limited code lengths"
    );
    Ok(lengths)
}

fn fold_overlong(counts: &mut [u64], limit: usize) {
    for len in (limit + 1..counts.len()).rev() {
        while counts[len] > 0 {
            // take == 1 only for a non-full table; the parent slot is free
            let take = counts[len].min(2);
            counts[len] -= take;
            counts[len - 1] += 1;
        }
    }
}

/// Kraft sum over lengths `1..=limit`, scaled by `2^limit`.
fn kraft_units(counts: &[u64], limit: usize) -> u128 {
    counts
        .iter()
        .enumerate()
        .skip(1)
        .map(|(len, &n)| (n as u128) << (limit - len))
        .sum()
}

fn rebalance(counts: &mut [u64], limit: usize, symbols: u64) {
    let capacity = 1u128 << limit;
    let mut total: u64 = counts[1..].iter().sum();

    while total < symbols {
        if kraft_units(counts, limit) < capacity {
            counts[limit] += 1;
        } else {
            // Every slot is taken, so some leaf sits above `limit`
            // (otherwise total == 2^limit >= symbols).
            let Some(depth) = (1..limit).rev().find(|&d| counts[d] > 0) else {
                break;
            };
            counts[depth] -= 1;
            counts[depth + 1] += 2;
        }
        total += 1;
    }

    while total > symbols {
        let Some(depth) = (1..=limit).rev().find(|&d| counts[d] > 0) else {
            break;
        };
        if counts[depth] >= 2 && depth > 1 {
            counts[depth] -= 2;
            counts[depth - 1] += 1;
        } else {
            counts[depth] -= 1;
        }
        total -= 1;
    }
}

fn assign_by_frequency(initial: &LengthTable, counts: &[u64], freqs: &FrequencyTable) -> LengthTable {
    let mut order: Vec<u8> = initial.present().map(|(symbol, _)| symbol).collect();
    order.sort_by_key(|&symbol| (std::cmp::Reverse(freqs.get(symbol)), symbol));

    let mut lengths = [0u8; ALPHABET_SIZE];
    let mut next = order.iter();
    for (len, &n) in counts.iter().enumerate().skip(1) {
        for symbol in next.by_ref().take(n as usize) {
            lengths[*symbol as usize] = len as u8;
        }
    }

    LengthTable::from_lengths_unchecked(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lengths::MAX_CODE_LENGTH;
    use crate::tree::HuffmanTree;

    fn fibonacci_freqs(n: usize) -> FrequencyTable {
        let mut counts = [0u64; ALPHABET_SIZE];
        let (mut x, mut y) = (1u64, 1u64);
        for slot in counts.iter_mut().take(n) {
            *slot = x;
            let next = x + y;
            x = y;
            y = next;
        }
        FrequencyTable::from_counts(counts)
    }

    fn initial(freqs: &FrequencyTable) -> LengthTable {
        HuffmanTree::build(freqs).unwrap().code_lengths().unwrap()
    }

    fn assert_valid(lengths: &LengthTable, limit: u8, symbols: usize) {
        assert_eq!(lengths.symbol_count(), symbols);
        assert!(lengths.max_length() <= limit);
        assert!(lengths.present().all(|(_, l)| l >= 1));
        assert!(lengths.satisfies_kraft());
    }

    #[test]
    fn test_feasibility() {
        assert!(check_feasible(4, 2).is_ok());
        assert!(check_feasible(256, 8).is_ok());
        assert!(check_feasible(1, 1).is_ok());
        assert!(check_feasible(256, 0).is_ok());
        assert!(matches!(
            check_feasible(5, 2),
            Err(Error::Config(ConfigError::InfeasibleLimit {
                symbols: 5,
                limit: 2
            }))
        ));
        assert!(check_feasible(257, 8).is_err());
    }

    #[test]
    fn test_zero_limit_is_identity() {
        let freqs = fibonacci_freqs(12);
        let lengths = initial(&freqs);
        assert_eq!(limit_lengths(&lengths, 0, &freqs).unwrap(), lengths);
    }

    #[test]
    fn test_loose_limit_is_identity() {
        let freqs = fibonacci_freqs(12);
        let lengths = initial(&freqs);
        assert_eq!(lengths.max_length(), 11);
        assert_eq!(limit_lengths(&lengths, 11, &freqs).unwrap(), lengths);
        assert_eq!(limit_lengths(&lengths, 200, &freqs).unwrap(), lengths);
    }

    #[test]
    fn test_four_symbols_forced_to_two_bits() {
        let freqs = FrequencyTable::from_bytes(b"aaaaaaaabbbbccd");
        let limited = limit_lengths(&initial(&freqs), 2, &freqs).unwrap();
        assert_valid(&limited, 2, 4);
        assert!(limited.present().all(|(_, l)| l == 2));
        assert_eq!(limited.kraft_units(), 1u128 << MAX_CODE_LENGTH);
    }

    #[test]
    fn test_five_symbols_two_bits_rejected() {
        let freqs = FrequencyTable::from_bytes(b"aaaaaaaabbbbccde");
        let result = limit_lengths(&initial(&freqs), 2, &freqs);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InfeasibleLimit { .. }))
        ));
    }

    #[test]
    fn test_every_limit_on_deep_tree() {
        let freqs = fibonacci_freqs(30);
        let lengths = initial(&freqs);
        assert_eq!(lengths.max_length(), 29);

        for limit in 5..=29u8 {
            let limited = limit_lengths(&lengths, limit as u32, &freqs).unwrap();
            assert_valid(&limited, limit, 30);
        }
    }

    #[test]
    fn test_higher_frequency_never_longer() {
        let freqs = fibonacci_freqs(24);
        let limited = limit_lengths(&initial(&freqs), 7, &freqs).unwrap();
        assert_valid(&limited, 7, 24);

        let mut by_freq: Vec<(u64, u8)> = limited
            .present()
            .map(|(s, l)| (freqs.get(s), l))
            .collect();
        by_freq.sort_by_key(|&(f, l)| (f, std::cmp::Reverse(l)));
        for pair in by_freq.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_full_alphabet_at_eight_bits() {
        let mut counts = [1u64; ALPHABET_SIZE];
        counts[0] = 1_000_000;
        counts[1] = 500_000;
        let freqs = FrequencyTable::from_counts(counts);
        let lengths = initial(&freqs);
        assert!(lengths.max_length() > 8);

        let limited = limit_lengths(&lengths, 8, &freqs).unwrap();
        assert_valid(&limited, 8, 256);
        assert!(limited.present().all(|(_, l)| l == 8));
    }

    #[test]
    fn test_fold_is_exact_on_full_tree() {
        // depths 1, 2, 3, 4, 5, 5
        let mut counts = vec![0u64, 1, 1, 1, 1, 2];
        fold_overlong(&mut counts, 3);
        counts.truncate(4);
        assert_eq!(counts, vec![0, 1, 1, 2]);
        assert_eq!(kraft_units(&counts, 3), 1 << 3);
    }

    #[test]
    fn test_fold_lone_leaf_stays_within_kraft() {
        // depths 1, 2, 4: Kraft 13/16, odd bucket at the deepest level
        let mut counts = vec![0u64, 1, 1, 0, 1];
        fold_overlong(&mut counts, 3);
        counts.truncate(4);
        assert_eq!(counts, vec![0, 1, 1, 1]);
        assert!(kraft_units(&counts, 3) <= 1 << 3);
    }

    #[test]
    fn test_incomplete_table_is_limited() {
        let mut raw = [0u8; ALPHABET_SIZE];
        raw[b'a' as usize] = 1;
        raw[b'b' as usize] = 2;
        raw[b'c' as usize] = 4;
        let table = LengthTable::from_lengths(raw).unwrap();
        let freqs = FrequencyTable::from_bytes(b"aaaabbc");

        let limited = limit_lengths(&table, 3, &freqs).unwrap();
        assert_valid(&limited, 3, 3);
        assert_eq!(limited.get(b'c'), 3);
    }

    #[test]
    fn test_rebalance_fills_free_slots_first() {
        let mut counts = vec![0u64, 1, 0];
        rebalance(&mut counts, 2, 3);
        assert_eq!(counts, vec![0, 1, 2]);
    }

    #[test]
    fn test_rebalance_splits_shallow_leaf() {
        // a:1 b:2 c:3 d:3 folded at limit 2 leaves one leaf short
        let mut counts = vec![0u64, 1, 1, 2];
        fold_overlong(&mut counts, 2);
        counts.truncate(3);
        assert_eq!(counts, vec![0, 1, 2]);

        rebalance(&mut counts, 2, 4);
        assert_eq!(counts, vec![0, 0, 4]);
    }
}
