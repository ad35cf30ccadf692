// Quick timing summary across both stores and workloads

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqlist::{GapSeq, List, Region, TreeSeq};

fn time_ops<F: Fn() -> usize>(f: F, iterations: usize) -> f64 {
    // Warmup
    for _ in 0..3 {
        let _ = f();
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = f();
    }
    let elapsed = start.elapsed();
    return elapsed.as_nanos() as f64 / iterations as f64;
}

macro_rules! bench_seq {
    ($name:expr, $seq:ty, $size:expr, $seed:expr) => {{
        let size: usize = $size;

        let append = time_ops(
            || {
                let mut seq = <$seq>::new();
                for i in 0..size {
                    seq.add(i as i32).unwrap();
                }
                seq.len()
            },
            10,
        );

        let prepend = time_ops(
            || {
                let mut seq = <$seq>::new();
                for i in 0..size {
                    seq.add_first(i as i32).unwrap();
                }
                seq.len()
            },
            10,
        );

        let random_ins = time_ops(
            || {
                let mut seq = <$seq>::new();
                let mut rng = StdRng::seed_from_u64($seed);
                for i in 0..size {
                    let pos = rng.gen_range(0..=seq.len());
                    seq.insert(pos, i as i32).unwrap();
                }
                seq.len()
            },
            3,
        );

        let random_del = time_ops(
            || {
                let values: Vec<i32> = (0..size as i32).collect();
                let mut seq = <$seq>::from_slice(&values);
                let mut rng = StdRng::seed_from_u64($seed);
                for _ in 0..size / 2 {
                    let pos = rng.gen_range(0..seq.len());
                    seq.remove_range(pos, 1).unwrap();
                }
                seq.len()
            },
            3,
        );

        let sort = time_ops(
            || {
                let mut rng = StdRng::seed_from_u64($seed);
                let values: Vec<i32> = (0..size).map(|_| rng.r#gen()).collect();
                let mut seq = <$seq>::from_slice(&values);
                seq.sort().unwrap();
                seq.len()
            },
            3,
        );

        println!(
            "{:<10} {:>8} | append {:>10.2} ms | prepend {:>10.2} ms | random ins {:>10.2} ms | random del {:>10.2} ms | sort {:>8.2} ms",
            $name,
            size,
            append / 1e6,
            prepend / 1e6,
            random_ins / 1e6,
            random_del / 1e6,
            sort / 1e6,
        );
    }};
}

fn main() {
    println!("=== Sequence quick benchmark ===\n");
    for size in [1_000, 10_000, 100_000] {
        bench_seq!("GapSeq", GapSeq<i32>, size, 7);
        bench_seq!("TreeSeq", TreeSeq<i32>, size, 7);
        println!();
    }
}
