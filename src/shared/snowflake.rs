//! Snowflake ID Generator
//!
//! Twitter-style distributed unique ID generation.
//!
//! ```text
//! 63                         22          17          12          0
//! +---------------------------+-----------+-----------+-----------+
//! |  ms since FleenFeen epoch |  machine  |   node    |  sequence |
//! |          (41 bits)        |  (5 bits) |  (5 bits) |  (12 bits)|
//! +---------------------------+-----------+-----------+-----------+
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// FleenFeen epoch (2023-01-01T00:00:00.000Z)
pub const FLEENFEEN_EPOCH: u64 = 1_672_531_200_000;

const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    /// Packed `(timestamp << 12) | sequence` of the last issued id
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    ///
    /// IDs are strictly increasing within one generator. When the sequence
    /// space of a millisecond is exhausted the id borrows the next
    /// millisecond instead of blocking.
    pub fn generate(&self) -> i64 {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let now = current_timestamp().saturating_sub(FLEENFEEN_EPOCH);
            let last_ts = current >> SEQUENCE_BITS;
            let last_seq = current & SEQUENCE_MASK;

            let (ts, seq) = if now > last_ts {
                (now, 0)
            } else if last_seq < SEQUENCE_MASK {
                (last_ts, last_seq + 1)
            } else {
                (last_ts + 1, 0)
            };

            let next = (ts << SEQUENCE_BITS) | seq;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let id = (ts << 22) | (self.machine_id << 17) | (self.node_id << 12) | seq;
                    return id as i64;
                }
                Err(observed) => current = observed,
            }
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
fn current_timestamp() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Extract timestamp (ms since Unix epoch) from snowflake ID
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> 22) + FLEENFEEN_EPOCH
}

/// Creation time embedded in a snowflake ID
pub fn created_at(snowflake: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(extract_timestamp(snowflake) as i64)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Parse snowflake from a path or body string
pub fn parse(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_generate_unique_and_increasing() {
        let gen = SnowflakeGenerator::new(1, 1);
        let mut last = 0;
        for _ in 0..10_000 {
            let id = gen.generate();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_generate_unique_across_threads() {
        let gen = Arc::new(SnowflakeGenerator::new(3, 7));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = gen.clone();
                std::thread::spawn(move || (0..2_000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 8_000);
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id = gen.generate();
        let ts = extract_timestamp(id);
        let now = current_timestamp();
        assert!(ts <= now + 5);
        assert!(ts > now - 1000);
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse(" 42 "), Some(42));
        assert_eq!(parse("0"), None);
        assert_eq!(parse("abc"), None);
    }
}
