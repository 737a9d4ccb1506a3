use croupier_shared::{CasinoError, CasinoResult, Color};
use serde::{Deserialize, Serialize};

use crate::{
    bet::{Bet, BetKind},
    paytable::Paytable,
    pockets::Pocket,
};

/// What a bet earned on one spin. The engine never touches balances; the
/// caller applies `credit` after having debited the stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub multiplier: u32,
    pub label: String,
    pub amount: i64,
}

impl Resolution {
    pub fn is_win(&self) -> bool {
        self.multiplier > 0
    }

    pub fn payout(&self) -> i64 {
        i64::from(self.multiplier).saturating_mul(self.amount)
    }

    /// Paid back after the stake was taken: winnings plus the stake on a win.
    pub fn credit(&self) -> i64 {
        if self.is_win() {
            self.payout().saturating_add(self.amount)
        } else {
            0
        }
    }

    /// Change relative to the balance before the bet was placed.
    pub fn net(&self) -> i64 {
        if self.is_win() {
            self.payout()
        } else {
            -self.amount
        }
    }
}

pub fn bet_wins(bet: &Bet, pocket: Pocket) -> bool {
    let result = pocket.to_index();
    // zero loses everything except a straight bet on zero
    if pocket.is_zero() {
        return bet.kind == BetKind::Number && bet.selection == 0;
    }
    match (bet.kind, bet.selection) {
        (BetKind::Number, n) => n == result,
        (BetKind::EvenOdd, 1) => result % 2 == 0,
        (BetKind::EvenOdd, _) => result % 2 == 1,
        (BetKind::RedBlack, 1) => pocket.color() == Color::Red,
        (BetKind::RedBlack, _) => pocket.color() == Color::Black,
        (BetKind::HighLow, 1) => (1..=18).contains(&result),
        (BetKind::HighLow, _) => (19..=36).contains(&result),
        (BetKind::Dozen, d) => (result - 1) / 12 + 1 == d,
        // col1 -> residue 1, col2 -> 2, col3 -> 0
        (BetKind::Column, c) => result % 3 == c % 3,
    }
}

pub fn resolve_with(paytable: &Paytable, bet: &Bet, result: u8) -> CasinoResult<Resolution> {
    let pocket = Pocket::from_index(result)
        .ok_or_else(|| CasinoError::Validation(format!("spin result {result} is not on the wheel")))?;
    let multiplier = if bet_wins(bet, pocket) {
        paytable.multiplier(bet.kind)
    } else {
        0
    };
    Ok(Resolution {
        multiplier,
        label: bet.label(),
        amount: bet.amount,
    })
}

/// Resolve against the standard single-zero paytable.
pub fn resolve(bet: &Bet, result: u8) -> CasinoResult<Resolution> {
    resolve_with(&Paytable::standard(), bet, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(kind: BetKind, selection: u8) -> Bet {
        Bet::new(kind, selection, 10).unwrap()
    }

    #[test]
    fn straight_up_pays_35() {
        let r = resolve(&Bet::new(BetKind::Number, 17, 20).unwrap(), 17).unwrap();
        assert_eq!(r.multiplier, 35);
        assert_eq!(r.payout(), 700);
        assert_eq!(r.credit(), 36 * 20);
        assert_eq!(r.net(), 700);
        assert_eq!(r.label, "Single Number 17");

        let miss = resolve(&Bet::new(BetKind::Number, 17, 20).unwrap(), 18).unwrap();
        assert!(!miss.is_win());
        assert_eq!(miss.credit(), 0);
        assert_eq!(miss.net(), -20);
    }

    #[test]
    fn huge_stakes_saturate() {
        let r = Resolution {
            multiplier: 35,
            label: "Single Number 17".into(),
            amount: i64::MAX / 2,
        };
        assert_eq!(r.payout(), i64::MAX);
        assert_eq!(r.credit(), i64::MAX);
        assert_eq!(r.net(), i64::MAX);
    }

    #[test]
    fn zero_only_pays_straight_zero() {
        assert_eq!(resolve(&bet(BetKind::Number, 0), 0).unwrap().multiplier, 35);
        for kind in [BetKind::EvenOdd, BetKind::RedBlack, BetKind::HighLow] {
            for sel in 1..=2 {
                assert_eq!(resolve(&bet(kind, sel), 0).unwrap().multiplier, 0);
            }
        }
        for kind in [BetKind::Dozen, BetKind::Column] {
            for sel in 1..=3 {
                assert_eq!(resolve(&bet(kind, sel), 0).unwrap().multiplier, 0);
            }
        }
    }

    #[test]
    fn even_money_bets() {
        assert_eq!(resolve(&bet(BetKind::EvenOdd, 1), 8).unwrap().multiplier, 1);
        assert_eq!(resolve(&bet(BetKind::EvenOdd, 2), 8).unwrap().multiplier, 0);
        assert_eq!(resolve(&bet(BetKind::EvenOdd, 2), 9).unwrap().multiplier, 1);
        // 10 is even but black
        assert_eq!(resolve(&bet(BetKind::RedBlack, 2), 10).unwrap().multiplier, 1);
        assert_eq!(resolve(&bet(BetKind::RedBlack, 1), 10).unwrap().multiplier, 0);
        assert_eq!(resolve(&bet(BetKind::HighLow, 1), 18).unwrap().multiplier, 1);
        assert_eq!(resolve(&bet(BetKind::HighLow, 2), 19).unwrap().multiplier, 1);
        assert_eq!(resolve(&bet(BetKind::HighLow, 1), 19).unwrap().multiplier, 0);
    }

    #[test]
    fn dozens() {
        let second = bet(BetKind::Dozen, 2);
        assert_eq!(resolve(&second, 24).unwrap().multiplier, 2);
        assert_eq!(resolve(&second, 13).unwrap().multiplier, 2);
        assert_eq!(resolve(&second, 25).unwrap().multiplier, 0);
        assert_eq!(resolve(&second, 12).unwrap().multiplier, 0);
        assert_eq!(resolve(&bet(BetKind::Dozen, 3), 36).unwrap().multiplier, 2);
    }

    #[test]
    fn columns() {
        let third = bet(BetKind::Column, 3);
        assert_eq!(resolve(&third, 9).unwrap().multiplier, 2);
        assert_eq!(resolve(&third, 10).unwrap().multiplier, 0);
        assert_eq!(resolve(&bet(BetKind::Column, 1), 10).unwrap().multiplier, 2);
        assert_eq!(resolve(&bet(BetKind::Column, 2), 35).unwrap().multiplier, 2);
    }

    #[test]
    fn labels_do_not_depend_on_outcome() {
        let b = bet(BetKind::Dozen, 1);
        assert_eq!(resolve(&b, 5).unwrap().label, "Dozens 1-12");
        assert_eq!(resolve(&b, 30).unwrap().label, "Dozens 1-12");
    }

    #[test]
    fn off_wheel_result_is_rejected() {
        assert!(matches!(
            resolve(&bet(BetKind::EvenOdd, 1), 37),
            Err(CasinoError::Validation(_))
        ));
    }
}
