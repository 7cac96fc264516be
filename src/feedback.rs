use std::collections::HashMap;

/// Per-tile feedback for one character of a guess.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feedback {
    /// Right character, right position (green).
    Correct,
    /// Character occurs elsewhere in the target (yellow).
    Present,
    /// Character not in the target, or all its copies already accounted for (gray).
    Absent,
}

impl Feedback {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'G' => Some(Self::Correct),
            'Y' => Some(Self::Present),
            'X' => Some(Self::Absent),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::Present => 'Y',
            Self::Absent => 'X',
        }
    }

    /// Priority used for key-color aggregation. Higher never downgrades.
    fn rank(self) -> u8 {
        match self {
            Self::Correct => 2,
            Self::Present => 1,
            Self::Absent => 0,
        }
    }
}

/// Score a guess against the target with two-pass letter accounting.
///
/// Pass 1 resolves exact positions and consumes those target characters.
/// Pass 2 matches the remaining guess characters against not-yet-consumed
/// target characters, so a letter is never credited more times than it
/// occurs in the target.
///
/// Both strings must have the same number of characters.
pub fn score(guess: &str, target: &str) -> Vec<Feedback> {
    let guess_chars: Vec<char> = guess.chars().collect();
    let mut remaining: Vec<Option<char>> = target.chars().map(Some).collect();
    debug_assert_eq!(guess_chars.len(), remaining.len());

    let mut feedback = vec![Feedback::Absent; guess_chars.len()];

    // First pass: exact positions
    for (i, &c) in guess_chars.iter().enumerate() {
        if remaining[i] == Some(c) {
            feedback[i] = Feedback::Correct;
            remaining[i] = None;
        }
    }

    // Second pass: leftovers
    for (i, &c) in guess_chars.iter().enumerate() {
        if feedback[i] == Feedback::Correct {
            continue;
        }
        if let Some(pos) = remaining.iter().position(|&r| r == Some(c)) {
            feedback[i] = Feedback::Present;
            remaining[pos] = None;
        }
    }

    feedback
}

/// Aggregate key coloring and occurrence hints across the guesses of a round.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    colors: HashMap<char, Feedback>,
    occurrences: HashMap<char, usize>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.occurrences.clear();
    }

    /// Fold one scored guess into the aggregate state.
    ///
    /// Colors are monotonic per character: `Correct` is sticky, `Present`
    /// upgrades only to `Correct`, `Absent` fills empty slots only.
    /// Occurrences track, per character, the highest number of
    /// green-or-yellow marks seen within any single guess.
    pub fn aggregate(&mut self, guess: &str, feedback: &[Feedback]) {
        for (c, &f) in guess.chars().zip(feedback) {
            let slot = self.colors.entry(c).or_insert(f);
            if f.rank() > slot.rank() {
                *slot = f;
            }
        }

        let mut hits: HashMap<char, usize> = HashMap::new();
        for (c, &f) in guess.chars().zip(feedback) {
            if f != Feedback::Absent {
                *hits.entry(c).or_insert(0) += 1;
            }
        }
        for (c, n) in hits {
            let slot = self.occurrences.entry(c).or_insert(0);
            if n > *slot {
                *slot = n;
            }
        }
    }

    pub fn color(&self, c: char) -> Option<Feedback> {
        self.colors.get(&c).copied()
    }

    /// Lower bound on how many copies of `c` the target contains,
    /// as established by the guesses so far. Zero when nothing is known.
    pub fn occurrence_floor(&self, c: char) -> usize {
        self.occurrences.get(&c).copied().unwrap_or(0)
    }
}
