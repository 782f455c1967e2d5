// Candidate search for the encoder.
//
// At each cursor position six independent finders propose an encoding of
// the bytes that follow:
// - `runs`    — byte runs, word runs, incrementing runs
// - `backref` — forward, bit-mirrored and backward copies of earlier bytes
// - `engine`  — evaluates the finders (in parallel with the `parallel`
//               feature) and returns the candidates in a fixed order
// - `config`  — search profiles (fast / thorough) and length limits

pub mod backref;
pub mod config;
pub mod engine;
pub mod runs;

pub use config::SearchConfig;
pub use engine::{Candidate, CandidatePayload, MatchEngine};
