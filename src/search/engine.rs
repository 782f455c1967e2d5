// Candidate evaluation at one cursor position.
//
// All finders read the immutable input only, so they can run side by side.
// With the `parallel` feature the run finders and the three back-reference
// finders are evaluated through `rayon::join`, and each back-reference
// finder additionally splits its offset range across the pool.  Results are
// collected in a fixed order so selection does not depend on scheduling.

use super::backref::{self, BackMatch, Direction};
use super::config::{MIN_COPY, MIN_RUN, SearchConfig};
use super::runs;
use crate::format::Command;

/// Below this many prior offsets the search runs on the calling thread.
const PARALLEL_THRESHOLD: usize = 1024;

/// Payload a candidate would emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePayload {
    Byte(u8),
    Word([u8; 2]),
    Offset(u16),
}

/// One proposed encoding of the bytes at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub command: Command,
    /// Input bytes the candidate covers.
    pub consumed: usize,
    pub payload: CandidatePayload,
}

impl Candidate {
    /// Header length in command units.
    pub fn units(&self) -> usize {
        self.consumed / self.command.unit_size()
    }

    /// True if the candidate beats emitting the same bytes as literals.
    pub fn is_worthwhile(&self) -> bool {
        match self.command {
            Command::RunByte | Command::RunIncrement => self.consumed >= MIN_RUN,
            _ => self.consumed >= MIN_COPY,
        }
    }
}

/// Evaluates every enabled finder over one input buffer.
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine<'a> {
    data: &'a [u8],
    config: SearchConfig,
    parallel: bool,
}

impl<'a> MatchEngine<'a> {
    /// Engine over `data`. Parallel evaluation is on when the `parallel`
    /// feature is enabled.
    pub fn new(data: &'a [u8], config: SearchConfig) -> Self {
        Self {
            data,
            config,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Enable or disable parallel evaluation (no effect without the
    /// `parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel && cfg!(feature = "parallel");
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// All candidates at `pos`, in finder order: byte run, word run,
    /// increment run, back-ref, mirrored back-ref, reverse back-ref.
    pub fn candidates(&self, pos: usize) -> Vec<Candidate> {
        if pos >= self.data.len() {
            return Vec::new();
        }
        let parallel = self.parallel && pos >= PARALLEL_THRESHOLD;
        let (run_found, copy_found) = if parallel {
            join(|| self.run_candidates(pos), || self.copy_candidates(pos, true))
        } else {
            (self.run_candidates(pos), self.copy_candidates(pos, false))
        };
        run_found
            .into_iter()
            .chain(copy_found)
            .flatten()
            .collect()
    }

    /// The candidate covering the most input at `pos`; ties go to the
    /// earliest finder.
    pub fn best(&self, pos: usize) -> Option<Candidate> {
        self.candidates(pos)
            .into_iter()
            .reduce(|best, c| if c.consumed > best.consumed { c } else { best })
    }

    fn run_candidates(&self, pos: usize) -> [Option<Candidate>; 3] {
        let data = self.data;
        let byte = data[pos];

        let run = runs::byte_run(data, pos);
        let byte_run = (run > 0).then_some(Candidate {
            command: Command::RunByte,
            consumed: run,
            payload: CandidatePayload::Byte(byte),
        });

        let reps = runs::word_run(data, pos);
        let word_run = (reps > 0).then(|| Candidate {
            command: Command::RunWord,
            consumed: reps * 2,
            payload: CandidatePayload::Word([data[pos], data[pos + 1]]),
        });

        let inc = runs::increment_run(data, pos);
        let increment_run = (inc > 0).then_some(Candidate {
            command: Command::RunIncrement,
            consumed: inc,
            payload: CandidatePayload::Byte(byte),
        });

        [byte_run, word_run, increment_run]
    }

    fn copy_candidates(&self, pos: usize, parallel: bool) -> [Option<Candidate>; 3] {
        let forward = || self.copy(Direction::Forward, pos, parallel);
        let mirror = || {
            self.config
                .mirror
                .then(|| self.copy(Direction::Mirror, pos, parallel))
                .flatten()
        };
        let reverse = || {
            self.config
                .reverse
                .then(|| self.copy(Direction::Reverse, pos, parallel))
                .flatten()
        };
        if parallel {
            let (f, (m, r)) = join(forward, || join(mirror, reverse));
            [f, m, r]
        } else {
            [forward(), mirror(), reverse()]
        }
    }

    fn copy(&self, dir: Direction, pos: usize, parallel: bool) -> Option<Candidate> {
        let BackMatch { offset, length } =
            backref::find(dir, self.data, pos, self.config.chunk_size, parallel)?;
        let command = match dir {
            Direction::Forward => Command::BackRef,
            Direction::Mirror => Command::MirrorBackRef,
            Direction::Reverse => Command::ReverseBackRef,
        };
        Some(Candidate {
            command,
            consumed: length,
            payload: CandidatePayload::Offset(u16::try_from(offset).ok()?),
        })
    }
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}
