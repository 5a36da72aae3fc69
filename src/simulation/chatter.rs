// Pool of synthetic agent log lines emitted on ticks.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chatter {
    Static(&'static str),
    RequestId,
    LatencyMs,
    CacheHitPercent,
    MemoryPercent,
}

pub const CHATTER_POOL: [Chatter; 10] = [
    Chatter::Static("Task completed successfully"),
    Chatter::RequestId,
    Chatter::Static("Heartbeat acknowledged"),
    Chatter::LatencyMs,
    Chatter::Static("Synchronizing with peer nodes"),
    Chatter::CacheHitPercent,
    Chatter::Static("Checkpoint saved"),
    Chatter::MemoryPercent,
    Chatter::Static("Queue depth nominal"),
    Chatter::Static("Model weights refreshed"),
];

impl Chatter {
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Chatter::Static(text) => text.to_string(),
            Chatter::RequestId => format!("Processing request #{}", rng.gen_range(1000..10_000)),
            Chatter::LatencyMs => format!("Response latency: {}ms", rng.gen_range(5..500)),
            Chatter::CacheHitPercent => format!("Cache hit ratio: {}%", rng.gen_range(0..=100)),
            Chatter::MemoryPercent => {
                format!("Memory optimization complete, freed {}%", rng.gen_range(0..=100))
            }
        }
    }
}

pub fn random_line<R: Rng + ?Sized>(rng: &mut R) -> String {
    CHATTER_POOL[rng.gen_range(0..CHATTER_POOL.len())].render(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parameterized_lines_carry_numbers() {
        let mut rng = StdRng::seed_from_u64(11);

        let line = Chatter::RequestId.render(&mut rng);
        let id: u32 = line.trim_start_matches("Processing request #").parse().unwrap();
        assert!((1000..10_000).contains(&id));

        let line = Chatter::LatencyMs.render(&mut rng);
        assert!(line.starts_with("Response latency: ") && line.ends_with("ms"));
    }

    #[test]
    fn random_line_is_never_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert!(!random_line(&mut rng).is_empty());
        }
    }
}
