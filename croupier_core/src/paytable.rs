use crate::bet::BetKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaytableEntry {
    pub kind: BetKind,
    pub payout_multiplier: u32, // winnings per unit staked, stake excluded
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paytable(pub Vec<PaytableEntry>);

impl Paytable {
    pub fn standard() -> Self {
        Self(vec![
            PaytableEntry {
                kind: BetKind::Number,
                payout_multiplier: 35,
            },
            PaytableEntry {
                kind: BetKind::EvenOdd,
                payout_multiplier: 1,
            },
            PaytableEntry {
                kind: BetKind::RedBlack,
                payout_multiplier: 1,
            },
            PaytableEntry {
                kind: BetKind::HighLow,
                payout_multiplier: 1,
            },
            PaytableEntry {
                kind: BetKind::Dozen,
                payout_multiplier: 2,
            },
            PaytableEntry {
                kind: BetKind::Column,
                payout_multiplier: 2,
            },
        ])
    }

    /// Multiplier paid for a winning bet of `kind`; 0 if the table has no entry.
    pub fn multiplier(&self, kind: BetKind) -> u32 {
        self.0
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.payout_multiplier)
            .unwrap_or(0)
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self::standard()
    }
}
