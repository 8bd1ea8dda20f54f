//! Exact construction of generalized Collatz loops.
//!
//! Given a multiplier `M` and an ordered list of even-segment lengths, this crate
//! finds the additive constant `D` and the starting value `N` (in lowest terms)
//! such that the map `odd → M·x + D`, `even → x / 2` cycles through exactly that
//! pattern of halving runs, and replays the map to produce the explicit trace.
//!
//! The pipeline is a chain of pure functions: [`classify`] gates raw input,
//! [`validate`] derives the minimum segment length for `M`, [`solver`] computes
//! the reduced pair, and [`sequence`] replays the loop. [`Loop::build`] runs the
//! whole chain.
//!
//! ```rust
//! use loopcore::{Loop, SegmentList};
//! use num_bigint::BigInt;
//!
//! let segments = SegmentList::from_lengths([3, 2]).unwrap();
//! let lp = Loop::build(&BigInt::from(5), &segments).unwrap();
//! assert_eq!(lp.equation().to_string(), "5x + 7");
//! assert_eq!(lp.numerator(), &BigInt::from(13));
//! assert_eq!(lp.sequence().first(), lp.sequence().last());
//! ```

pub mod cache;
pub mod classify;
pub mod cycle;
pub mod limits;
pub mod parser;
pub mod segments;
pub mod sequence;
pub mod solver;
pub mod task;
pub mod utils;
pub mod validate;

pub use cache::LoopCache;
pub use classify::{Classify, Parity};
pub use cycle::{Equation, Loop};
pub use limits::Limits;
pub use segments::{EvenSegment, SegmentList};
pub use solver::LoopParameters;
pub use task::BuildTask;
pub use utils::{Error, Result};
pub use validate::{minimum_segment_length, validate_segments};

pub extern crate bigdecimal;
pub extern crate num_bigint;
