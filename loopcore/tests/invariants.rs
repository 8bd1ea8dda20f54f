//! Randomized checks of the properties every successful build must satisfy.
//!
//! Inputs come from a seeded ChaCha20 stream so failures are reproducible.
use loopcore::{
    Loop, SegmentList, minimum_segment_length,
    num_bigint::BigInt,
    sequence::generate,
    solver::solve,
};
use num_integer::Integer;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const CASES: usize = 400;

fn random_multiplier(rng: &mut impl Rng) -> BigInt {
    let magnitude = match rng.random_range(0..4) {
        0 => BigInt::from(rng.random_range(1i64..=16)),
        1 => BigInt::from(rng.random_range(1i64..=10_000)),
        2 => BigInt::from(rng.random_range(1u64..=u64::MAX)),
        _ => BigInt::from(rng.random_range(1u64..=u64::MAX)) * BigInt::from(rng.random::<u64>() | 1),
    };
    if rng.random_bool(0.5) { -magnitude } else { magnitude }
}

fn random_segments(rng: &mut impl Rng, minimum: u64) -> SegmentList {
    let count = rng.random_range(1..=8);
    SegmentList::from_lengths((0..count).map(|_| minimum + rng.random_range(0..12))).unwrap()
}

#[test]
fn built_loops_close_in_lowest_terms() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    for _ in 0..CASES {
        let multiplier = random_multiplier(&mut rng);
        let minimum = minimum_segment_length(&multiplier).get();
        let segments = random_segments(&mut rng, minimum);

        let lp = Loop::build(&multiplier, &segments)
            .unwrap_or_else(|e| panic!("Loop({multiplier}, {segments}) failed: {e}"));

        assert_eq!(
            lp.numerator().gcd(lp.denominator()),
            BigInt::from(1),
            "Loop({multiplier}, {segments}) is not in lowest terms"
        );
        assert_eq!(lp.sequence().first(), lp.sequence().last());
        assert_eq!(lp.sequence().len() as u64, segments.sequence_len().unwrap());
    }
}

#[test]
fn replay_halves_exactly() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x1337);
    for _ in 0..CASES {
        let multiplier = random_multiplier(&mut rng);
        let minimum = minimum_segment_length(&multiplier).get();
        let segments = random_segments(&mut rng, minimum);
        let params = solve(&multiplier, &segments).unwrap();
        let sequence = generate(&params, &segments).unwrap();

        // Replay by hand: every halving must start from an even value.
        let mut index = 0;
        for segment in segments.iter() {
            let next = &sequence[index] * &multiplier + &params.denominator;
            index += 1;
            assert_eq!(sequence[index], next);
            for _ in 0..segment.get() {
                assert!(sequence[index].is_even(), "odd value halved in Loop({multiplier}, {segments})");
                index += 1;
                assert_eq!(&sequence[index] * 2, sequence[index - 1]);
            }
        }
        assert_eq!(index, sequence.len() - 1);
    }
}

#[test]
fn validation_fails_iff_a_segment_is_short() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    for _ in 0..CASES {
        let multiplier = random_multiplier(&mut rng);
        let minimum = minimum_segment_length(&multiplier).get();
        let count = rng.random_range(1..=6);
        let lengths: Vec<u64> = (0..count)
            .map(|_| rng.random_range(1..=minimum + 2))
            .collect();
        let segments = SegmentList::from_lengths(lengths.iter().copied()).unwrap();

        let has_short = multiplier.is_even() && lengths.iter().any(|&l| l < minimum);
        let result = Loop::build(&multiplier, &segments);
        assert_eq!(
            result.as_ref().is_err_and(|e| e.is_segment_below_minimum()),
            has_short,
            "Loop({multiplier}, {segments})"
        );
        if !has_short {
            assert!(result.is_ok());
        }
    }
}

#[test]
fn odd_multipliers_have_minimum_one() {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    for _ in 0..CASES {
        let multiplier = random_multiplier(&mut rng) * 2 + 1;
        assert_eq!(minimum_segment_length(&multiplier).get(), 1);
    }
    assert_eq!(minimum_segment_length(&BigInt::from(0)).get(), 1);
}

#[test]
fn many_segments_stay_exact() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let segments = SegmentList::from_lengths((0..2_000).map(|_| rng.random_range(1..=3))).unwrap();
    let lp = Loop::build(&BigInt::from(3), &segments).unwrap();
    assert_eq!(lp.sequence().first(), lp.sequence().last());
    assert_eq!(lp.numerator().gcd(lp.denominator()), BigInt::from(1));
}
