use crate::feedback::{self, Feedback, KeyState};
use crate::pool::{CandidatePool, PoolFilter};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::error::Error;
use std::fmt;

pub const MAX_GUESSES: usize = 6;

const BLANK: char = ' ';

/// Round lifecycle: `Idle -> Active -> Won | Lost`, with `reset` starting a
/// fresh `Active` round from either terminal state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundStatus {
    Idle,
    Active,
    Won,
    Lost,
}

/// How letter entry interacts with the cursor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    /// Typing fills the row left to right and delete pops the last letter.
    AutoAdvance,
    /// Letters overwrite the active cell; the cursor only moves explicitly.
    FixedCursor,
}

/// No eligible chatters to pick a target from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EmptyPoolError;

impl fmt::Display for EmptyPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no chatters available to start the game")
    }
}

impl Error for EmptyPoolError {}

/// A submitted guess together with its scored feedback.
#[derive(Clone, Debug)]
pub struct ScoredGuess {
    pub word: String,
    pub feedback: Vec<Feedback>,
}

/// The game-progression state machine. Owns the current round; the candidate
/// pool is only read (filtered and sampled) at round start.
pub struct GameSession {
    target: Vec<char>,
    guesses: Vec<ScoredGuess>,
    pending: Vec<char>,
    cursor: usize,
    keys: KeyState,
    status: RoundStatus,
    input_mode: InputMode,
    rng: Box<dyn RngCore>,
}

impl GameSession {
    pub fn new(input_mode: InputMode) -> Self {
        Self::with_rng(input_mode, Box::new(StdRng::from_entropy()))
    }

    /// Deterministic target selection for tests and the `--seed` flag.
    pub fn seeded(input_mode: InputMode, seed: u64) -> Self {
        Self::with_rng(input_mode, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(input_mode: InputMode, rng: Box<dyn RngCore>) -> Self {
        Self {
            target: Vec::new(),
            guesses: Vec::new(),
            pending: Vec::new(),
            cursor: 0,
            keys: KeyState::new(),
            status: RoundStatus::Idle,
            input_mode,
            rng,
        }
    }

    /// Pick a target uniformly from the filtered pool and begin a round.
    ///
    /// Refused with `EmptyPoolError`, leaving all state untouched, when the
    /// filter admits nobody. On success every piece of round state is
    /// rebuilt: prior guesses and key coloring never carry over.
    pub fn start_round(
        &mut self,
        pool: &CandidatePool,
        filter: PoolFilter,
    ) -> Result<(), EmptyPoolError> {
        let eligible = pool.filtered(filter);
        if eligible.is_empty() {
            return Err(EmptyPoolError);
        }
        let pick = self.rng.gen_range(0..eligible.len());
        self.target = eligible[pick].chars().collect();
        self.guesses.clear();
        self.pending = vec![BLANK; self.target.len()];
        self.cursor = 0;
        self.keys.clear();
        self.status = RoundStatus::Active;
        Ok(())
    }

    /// Same semantics (and failure mode) as `start_round`; usable from any
    /// status, including mid-round.
    pub fn reset(&mut self, pool: &CandidatePool, filter: PoolFilter) -> Result<(), EmptyPoolError> {
        self.start_round(pool, filter)
    }

    /// Type one character at the cursor. In `AutoAdvance` mode a full row
    /// absorbs further typing, matching keyboard-entry behavior; in
    /// `FixedCursor` mode the active cell is overwritten in place.
    pub fn press_key(&mut self, c: char) {
        if self.status != RoundStatus::Active || self.pending.is_empty() {
            return;
        }
        match self.input_mode {
            InputMode::AutoAdvance => {
                if self.pending[self.cursor] != BLANK {
                    return;
                }
                self.pending[self.cursor] = c;
                if self.cursor + 1 < self.pending.len() {
                    self.cursor += 1;
                }
            }
            InputMode::FixedCursor => {
                self.pending[self.cursor] = c;
            }
        }
    }

    /// Write a character at an explicit position without moving the cursor.
    /// The index is clamped into the row.
    pub fn set_char(&mut self, index: usize, c: char) {
        if self.status != RoundStatus::Active || self.pending.is_empty() {
            return;
        }
        let index = index.min(self.pending.len() - 1);
        self.pending[index] = c;
    }

    pub fn delete(&mut self) {
        if self.status != RoundStatus::Active || self.pending.is_empty() {
            return;
        }
        match self.input_mode {
            InputMode::AutoAdvance => {
                // The cursor cell is only occupied when the row is full;
                // otherwise step back over the previous letter.
                if self.pending[self.cursor] != BLANK {
                    self.pending[self.cursor] = BLANK;
                } else if self.cursor > 0 {
                    self.cursor -= 1;
                    self.pending[self.cursor] = BLANK;
                }
            }
            InputMode::FixedCursor => {
                self.pending[self.cursor] = BLANK;
            }
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.status != RoundStatus::Active || self.pending.is_empty() {
            return;
        }
        let max = (self.pending.len() - 1) as isize;
        let next = (self.cursor as isize + delta).clamp(0, max);
        self.cursor = next as usize;
    }

    /// Submit the pending row. A no-op unless the round is active and every
    /// cell is filled. Win is checked before the guess-limit check, so a
    /// correct sixth guess always wins.
    pub fn submit_guess(&mut self) {
        if self.status != RoundStatus::Active {
            return;
        }
        if self.pending.is_empty() || self.pending.contains(&BLANK) {
            return;
        }
        let word: String = self.pending.iter().collect();
        let target: String = self.target.iter().collect();
        let feedback = feedback::score(&word, &target);
        self.keys.aggregate(&word, &feedback);
        self.guesses.push(ScoredGuess {
            word: word.clone(),
            feedback,
        });
        self.pending.fill(BLANK);
        self.cursor = 0;

        if word == target {
            self.status = RoundStatus::Won;
        } else if self.guesses.len() >= MAX_GUESSES {
            self.status = RoundStatus::Lost;
        }
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn guesses(&self) -> &[ScoredGuess] {
        &self.guesses
    }

    pub fn guesses_remaining(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses.len())
    }

    pub fn pending(&self) -> &[char] {
        &self.pending
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// End-of-round notice for the presentation layer; `None` while the
    /// round is idle or still running.
    pub fn modal_message(&self) -> Option<String> {
        match self.status {
            RoundStatus::Won => {
                Some("Congratulations! You guessed the correct chatter!".to_string())
            }
            RoundStatus::Lost => Some(format!("Game Over! The chatter was: {}", self.target())),
            RoundStatus::Idle | RoundStatus::Active => None,
        }
    }
}
