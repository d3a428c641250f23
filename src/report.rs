// src/report.rs
//
// End-of-run statistics, written to stderr by the binary.

use std::fmt;

use serde::Serialize;

use crate::counters::Counters;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Report {
    pub max_depth: usize,
    pub counters: Counters,
}

impl Report {
    pub fn new(counters: Counters, max_depth: usize) -> Self {
        Self { max_depth, counters }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;

        writeln!(f, "Single quotes")?;
        writeln!(f, "{:>31}: {}", "open quotes", c.open_quotes)?;
        writeln!(f, "{:>31}: {}", "unambiguous close quotes", c.close_quotes)?;
        writeln!(f)?;

        writeln!(f, "Apostrophes")?;
        writeln!(f, "{:>31}: {}", "apostrophe at start of word", c.leading_apostrophes)?;
        writeln!(f, "    ambiguous close-quote /")?;
        writeln!(f, "{:>31}: {}", "apostrophe at end of word", c.ambiguous_apostrophes)?;
        writeln!(f)?;

        writeln!(f, "Unmatched quotes and brackets")?;
        writeln!(f, "{:>31}: {}", "single quotes (conservative)", c.unmatched_quotes)?;
        writeln!(f, "{:>31}: {}", "double quotes and brackets  ", c.unmatched)?;
        writeln!(f)?;

        let deep = format!("nested {} deep or more", self.max_depth + 1);
        writeln!(f, "Nested quotations")?;
        writeln!(f, "{:>31}: {}", deep, c.too_deep)?;
        writeln!(f, "{:>31}: {}", "with same style of quotes", c.same_quotes)?;
        writeln!(f)?;

        writeln!(f, "Quote spacing")?;
        writeln!(f, "{:>31}: {}", "unexpected spaces", c.spaced_quotes)?;
        writeln!(f, "{:>31}: {}", "missing spaces", c.unspaced_quotes)?;
        writeln!(f)?;

        writeln!(f, "Straight quote characters")?;
        writeln!(f, "{:>31}: {}", "straight single quotes", c.straight_single)?;
        write!(f, "{:>31}: {}", "straight double quotes", c.straight_double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_lines_up() {
        let counters = Counters {
            open_quotes: 4,
            too_deep: 1,
            straight_double: 2,
            ..Counters::default()
        };
        let text = Report::new(counters, 2).to_string();
        assert!(text.starts_with("Single quotes\n"));
        assert!(text.contains("\n                    open quotes: 4\n"));
        assert!(text.contains("\n          nested 3 deep or more: 1\n"));
        assert!(text.ends_with("         straight double quotes: 2"));
    }

    #[test]
    fn json_report() {
        let counters = Counters {
            unmatched: 3,
            ..Counters::default()
        };
        let json = Report::new(counters, 2).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["max_depth"], 2);
        assert_eq!(value["counters"]["unmatched"], 3);
        assert_eq!(value["counters"]["open_quotes"], 0);
    }
}
