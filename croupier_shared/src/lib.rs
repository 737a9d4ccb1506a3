use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One player as persisted in the users file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: String, // stored credential, never the plaintext
    pub balance: i64,
    pub games_played: u32,
    pub games_won: u32,
    pub highest_win: i64,
    pub is_admin: bool,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, sealed_password: impl Into<String>, balance: i64) -> Self {
        Self {
            username: username.into(),
            password: sealed_password.into(),
            balance,
            games_played: 0,
            games_won: 0,
            highest_win: 0,
            is_admin: false,
        }
    }

    /// Percentage of played games that paid out, 0 when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.games_won) / f64::from(self.games_played) * 100.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Color {
    Green,
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Green => "Green",
            Color::Red => "Red",
            Color::Black => "Black",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub username: String,
    pub label: String,
    pub bet_amount: i64,
    pub result: u8,
    pub payout: i64,
    pub ts: DateTime<Local>,
}

#[derive(thiserror::Error, Debug)]
pub enum CasinoError {
    #[error("no such user: {0}")]
    NotFound(String),
    #[error("incorrect password")]
    WrongPassword,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("user store is full ({max} records)")]
    Capacity { max: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("session timed out after {0}s of inactivity")]
    TimedOut(u64),
}

pub type CasinoResult<T> = Result<T, CasinoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_handles_no_games() {
        let mut user = UserRecord::new("alice", "sealed", 1000);
        assert_eq!(user.win_rate(), 0.0);
        user.games_played = 4;
        user.games_won = 1;
        assert_eq!(user.win_rate(), 25.0);
    }
}
