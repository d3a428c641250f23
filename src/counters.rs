// src/counters.rs
//
// Tallies for one document. The engine owns an instance while it runs and hands it back
// from `Engine::finish`; a batch driver sums them with `+=`.

use std::ops::AddAssign;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Opening single quotes.
    pub open_quotes: u64,
    /// Single closing quotes that cannot be apostrophes.
    pub close_quotes: u64,

    pub leading_apostrophes: u64,
    /// Apostrophe at the end of a word, or a closing quote.
    pub ambiguous_apostrophes: u64,

    /// Unmatched single quotes (conservative).
    pub unmatched_quotes: u64,
    /// Unmatched double quotes and brackets.
    pub unmatched: u64,

    pub same_quotes: u64,
    pub too_deep: u64,

    pub spaced_quotes: u64,
    pub unspaced_quotes: u64,

    pub straight_single: u64,
    pub straight_double: u64,
}

impl Counters {
    pub fn straight_quotes(&self) -> u64 {
        self.straight_single + self.straight_double
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        self.open_quotes += rhs.open_quotes;
        self.close_quotes += rhs.close_quotes;
        self.leading_apostrophes += rhs.leading_apostrophes;
        self.ambiguous_apostrophes += rhs.ambiguous_apostrophes;
        self.unmatched_quotes += rhs.unmatched_quotes;
        self.unmatched += rhs.unmatched;
        self.same_quotes += rhs.same_quotes;
        self.too_deep += rhs.too_deep;
        self.spaced_quotes += rhs.spaced_quotes;
        self.unspaced_quotes += rhs.unspaced_quotes;
        self.straight_single += rhs.straight_single;
        self.straight_double += rhs.straight_double;
    }
}
