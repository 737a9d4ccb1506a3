use croupier_shared::{CasinoError, CasinoResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BetKind {
    Number,
    EvenOdd,
    RedBlack,
    HighLow,
    Dozen,
    Column,
}

impl BetKind {
    pub const ALL: [BetKind; 6] = [
        BetKind::Number,
        BetKind::EvenOdd,
        BetKind::RedBlack,
        BetKind::HighLow,
        BetKind::Dozen,
        BetKind::Column,
    ];

    /// Menu position, 1-based.
    pub fn from_index(i: u8) -> Option<Self> {
        match i {
            1 => Some(BetKind::Number),
            2 => Some(BetKind::EvenOdd),
            3 => Some(BetKind::RedBlack),
            4 => Some(BetKind::HighLow),
            5 => Some(BetKind::Dozen),
            6 => Some(BetKind::Column),
            _ => None,
        }
    }

    pub fn to_index(self) -> u8 {
        match self {
            BetKind::Number => 1,
            BetKind::EvenOdd => 2,
            BetKind::RedBlack => 3,
            BetKind::HighLow => 4,
            BetKind::Dozen => 5,
            BetKind::Column => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BetKind::Number => "Single Number",
            BetKind::EvenOdd => "Even/Odd",
            BetKind::RedBlack => "Red/Black",
            BetKind::HighLow => "High/Low",
            BetKind::Dozen => "Dozens",
            BetKind::Column => "Columns",
        }
    }

    pub fn selection_range(self) -> RangeInclusive<u8> {
        match self {
            BetKind::Number => 0..=36,
            BetKind::EvenOdd | BetKind::RedBlack | BetKind::HighLow => 1..=2,
            BetKind::Dozen | BetKind::Column => 1..=3,
        }
    }
}

/// A wager on one outcome of the next spin.
///
/// Selections are menu encoded: 1 = Even/Red/Low and 2 = Odd/Black/High for
/// the even-money bets, 1..=3 for dozens and columns, and the number itself
/// for straight bets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bet {
    pub kind: BetKind,
    pub selection: u8,
    pub amount: i64,
}

impl Bet {
    pub fn new(kind: BetKind, selection: u8, amount: i64) -> CasinoResult<Self> {
        let range = kind.selection_range();
        if !range.contains(&selection) {
            return Err(CasinoError::Validation(format!(
                "{} selection must be between {} and {}",
                kind.name(),
                range.start(),
                range.end()
            )));
        }
        Ok(Self {
            kind,
            selection,
            amount,
        })
    }

    pub fn label(&self) -> String {
        let s = self.selection;
        match (self.kind, s) {
            (BetKind::Number, n) => format!("Single Number {n}"),
            (BetKind::EvenOdd, 1) => "Even".to_string(),
            (BetKind::EvenOdd, _) => "Odd".to_string(),
            (BetKind::RedBlack, 1) => "Red".to_string(),
            (BetKind::RedBlack, _) => "Black".to_string(),
            (BetKind::HighLow, 1) => "Low (1-18)".to_string(),
            (BetKind::HighLow, _) => "High (19-36)".to_string(),
            (BetKind::Dozen, d) => {
                let start = (u32::from(d) - 1) * 12 + 1;
                format!("Dozens {}-{}", start, start + 11)
            }
            (BetKind::Column, c) => format!("Column {c}"),
        }
    }
}
