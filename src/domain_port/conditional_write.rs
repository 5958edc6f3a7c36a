/// Outcome of a write guarded by a predicate on the row's current state.
///
/// | statement                     | `Applied`                | `Rejected`                      |
/// |-------------------------------|--------------------------|---------------------------------|
/// | insert-if-absent              | row inserted             | key already present             |
/// | compare-and-set update        | expected value matched   | row missing or value differs    |
/// | delete                        | a row was removed        | nothing to remove               |
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteOutcome {
    Applied,
    Rejected,
}

impl WriteOutcome {
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows > 0 {
            WriteOutcome::Applied
        } else {
            WriteOutcome::Rejected
        }
    }

    pub fn is_applied(self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}
