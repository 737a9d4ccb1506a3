use std::time::{Duration, Instant};

use chrono::Local;
use croupier_shared::{CasinoError, CasinoResult, HistoryEntry, UserRecord};
use tracing::{info, warn};

use crate::{
    bet::Bet,
    config::CasinoConfig,
    engine::{resolve_with, Resolution},
    history::History,
    paytable::Paytable,
    password::{validate_password, verify_stored},
    spin::{SpinOutcome, SpinSource},
    store::{validate_record, validate_username, UserStore},
};

/// The table: records, wheel and per-process history. Players get a
/// [`Session`] from [`Casino::login`] or [`Casino::register`].
pub struct Casino<S, W> {
    store: S,
    wheel: W,
    config: CasinoConfig,
    paytable: Paytable,
    history: History,
}

impl<S: UserStore, W: SpinSource> Casino<S, W> {
    pub fn new(store: S, wheel: W, config: CasinoConfig) -> Self {
        let history = History::with_capacity(config.table.history_capacity);
        Self {
            store,
            wheel,
            config,
            paytable: Paytable::standard(),
            history,
        }
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    pub fn wheel(&self) -> &W {
        &self.wheel
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn login(&mut self, username: &str, password: &str) -> CasinoResult<Session<'_, S, W>> {
        if password.is_empty() {
            return Err(CasinoError::Validation("password is required".into()));
        }
        let user = self.store.find(username, password)?;
        info!(username = %user.username, "login");
        Ok(Session { casino: self, user })
    }

    /// Whether registering `username` asks for the admin activation code.
    pub fn requires_activation_code(&self, username: &str) -> bool {
        username == self.config.auth.admin_username
    }

    pub fn ensure_username_available(&self, username: &str) -> CasinoResult<()> {
        validate_username(username)?;
        match self.store.find(username, "") {
            Ok(_) => Err(CasinoError::Validation(format!("username {username} is already taken"))),
            Err(CasinoError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Create an account. Admin rights are granted only here, and only for
    /// the configured admin name with the matching activation code.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        activation_code: Option<&str>,
    ) -> CasinoResult<Session<'_, S, W>> {
        self.ensure_username_available(username)?;
        validate_password(password, self.config.auth.min_password_len)?;

        let sealed = self.config.auth.password_scheme.seal(password)?;
        let mut user = UserRecord::new(username, sealed, self.config.table.starting_balance);
        if self.requires_activation_code(username) {
            user.is_admin = activation_code == Some(self.config.auth.admin_activation_code.as_str());
            if !user.is_admin {
                warn!(username, "wrong activation code, registering without admin rights");
            }
        }
        self.store.insert(&user)?;
        info!(username, admin = user.is_admin, "registered");
        Ok(Session { casino: self, user })
    }
}

/// Result of one round at the wheel.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub spin: SpinOutcome,
    pub resolution: Resolution,
    pub balance: i64,
    /// False when the updated record could not be written.
    pub persisted: bool,
}

/// Snapshot for the statistics screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub username: String,
    pub balance: i64,
    pub games_played: u32,
    pub games_won: u32,
    pub win_rate: f64,
    pub highest_win: i64,
}

/// A logged in player. Holds a copy of the record that is written back
/// through the store after every change.
pub struct Session<'a, S, W> {
    casino: &'a mut Casino<S, W>,
    user: UserRecord,
}

impl<'a, S: UserStore, W: SpinSource> Session<'a, S, W> {
    pub fn user(&self) -> &UserRecord {
        &self.user
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.casino.config
    }

    pub fn wheel(&self) -> &W {
        &self.casino.wheel
    }

    pub fn stats(&self) -> Stats {
        Stats {
            username: self.user.username.clone(),
            balance: self.user.balance,
            games_played: self.user.games_played,
            games_won: self.user.games_won,
            win_rate: self.user.win_rate(),
            highest_win: self.user.highest_win,
        }
    }

    pub fn history(&self) -> Vec<&HistoryEntry> {
        self.casino.history.query(&self.user.username)
    }

    /// Whether the balance covers the table minimum at all.
    pub fn can_play(&self) -> bool {
        self.user.balance >= self.casino.config.table.min_bet
    }

    pub fn validate_amount(&self, amount: i64) -> CasinoResult<()> {
        let table = &self.casino.config.table;
        if !self.can_play() {
            return Err(CasinoError::Validation(format!(
                "balance {} is below the minimum bet of {}",
                self.user.balance, table.min_bet
            )));
        }
        if amount < table.min_bet || amount > table.max_bet {
            return Err(CasinoError::Validation(format!(
                "bet must be between {} and {}",
                table.min_bet, table.max_bet
            )));
        }
        if amount > self.user.balance {
            return Err(CasinoError::Validation(format!(
                "bet of {amount} exceeds balance of {}",
                self.user.balance
            )));
        }
        Ok(())
    }

    fn persist(&mut self) -> bool {
        match self.casino.store.replace(&self.user) {
            Ok(()) => true,
            Err(e) => {
                warn!(username = %self.user.username, error = %e, "user record not saved");
                false
            }
        }
    }

    /// Take the stake, spin, pay out and save.
    pub fn play(&mut self, bet: Bet) -> CasinoResult<RoundOutcome> {
        self.validate_amount(bet.amount)?;

        // stored balances are hand-editable; clamp rather than overflow
        self.user.balance = self.user.balance.saturating_sub(bet.amount);
        self.user.games_played = self.user.games_played.saturating_add(1);

        let spin = self.casino.wheel.spin(&self.user.username);
        let resolution = resolve_with(&self.casino.paytable, &bet, spin.result())?;
        if resolution.is_win() {
            self.user.balance = self.user.balance.saturating_add(resolution.credit());
            self.user.games_won = self.user.games_won.saturating_add(1);
            self.user.highest_win = self.user.highest_win.max(resolution.payout());
        }

        self.casino.history.append(HistoryEntry {
            username: self.user.username.clone(),
            label: resolution.label.clone(),
            bet_amount: bet.amount,
            result: spin.result(),
            payout: resolution.payout(),
            ts: Local::now(),
        });
        info!(
            username = %self.user.username,
            bet = %resolution.label,
            amount = bet.amount,
            result = spin.result(),
            payout = resolution.payout(),
            "round settled"
        );

        let persisted = self.persist();
        Ok(RoundOutcome {
            spin,
            resolution,
            balance: self.user.balance,
            persisted,
        })
    }

    /// Returns `Ok(false)` when the new password could not be saved; it still
    /// applies for the rest of this session.
    pub fn change_password(&mut self, current: &str, new: &str, confirm: &str) -> CasinoResult<bool> {
        if !verify_stored(current, &self.user.password) {
            return Err(CasinoError::WrongPassword);
        }
        validate_password(new, self.casino.config.auth.min_password_len)?;
        if new != confirm {
            return Err(CasinoError::Validation("passwords do not match".into()));
        }
        let mut updated = self.user.clone();
        updated.password = self.casino.config.auth.password_scheme.seal(new)?;
        validate_record(&updated)?;
        self.user = updated;
        info!(username = %self.user.username, "password changed");
        Ok(self.persist())
    }

    fn require_admin(&self) -> CasinoResult<()> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(CasinoError::Validation("admin rights required".into()))
        }
    }

    fn update_user(&mut self, target: &str, apply: impl Fn(&mut UserRecord)) -> CasinoResult<()> {
        self.require_admin()?;
        if target == self.user.username {
            // keep the session copy authoritative for our own record
            apply(&mut self.user);
            return self.casino.store.replace(&self.user);
        }
        let mut record = self.casino.store.find(target, "")?;
        apply(&mut record);
        self.casino.store.replace(&record)
    }

    pub fn reset_balance(&mut self, target: &str) -> CasinoResult<()> {
        let starting = self.casino.config.table.starting_balance;
        self.update_user(target, |u| u.balance = starting)?;
        info!(admin = %self.user.username, target_user = target, balance = starting, "balance reset");
        Ok(())
    }

    pub fn promote(&mut self, target: &str) -> CasinoResult<()> {
        self.update_user(target, |u| u.is_admin = true)?;
        info!(admin = %self.user.username, target_user = target, "promoted to admin");
        Ok(())
    }

    pub fn list_users(&self) -> CasinoResult<Vec<UserRecord>> {
        self.require_admin()?;
        self.casino.store.list()
    }
}

/// Time since the last menu interaction. Checked between prompts only, so it
/// never interrupts a blocking read.
#[derive(Debug, Clone)]
pub struct InactivityTimer {
    last_activity: Instant,
    limit: Duration,
}

impl InactivityTimer {
    pub fn new(limit: Duration) -> Self {
        Self {
            last_activity: Instant::now(),
            limit,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn check_at(&self, now: Instant) -> CasinoResult<()> {
        if now.saturating_duration_since(self.last_activity) > self.limit {
            Err(CasinoError::TimedOut(self.limit.as_secs()))
        } else {
            Ok(())
        }
    }

    pub fn check(&self) -> CasinoResult<()> {
        self.check_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bet::BetKind, spin::ScriptedWheel, store::MemoryUserStore};

    fn casino(results: Vec<u8>) -> Casino<MemoryUserStore, ScriptedWheel> {
        Casino::new(
            MemoryUserStore::default(),
            ScriptedWheel::new(results),
            CasinoConfig::default(),
        )
    }

    #[test]
    fn timer_expires_after_limit() {
        let timer = InactivityTimer::new(Duration::from_secs(300));
        let start = timer.last_activity;
        assert!(timer.check_at(start + Duration::from_secs(300)).is_ok());
        assert!(matches!(
            timer.check_at(start + Duration::from_secs(301)),
            Err(CasinoError::TimedOut(300))
        ));
    }

    #[test]
    fn empty_login_password_is_refused() {
        let mut c = casino(vec![]);
        c.register("alice", "secret1", None).unwrap();
        assert!(matches!(c.login("alice", ""), Err(CasinoError::Validation(_))));
    }

    #[test]
    fn broke_player_cannot_bet() {
        let mut c = casino(vec![0]);
        let mut s = c.register("alice", "secret1", None).unwrap();
        let bet = Bet::new(BetKind::RedBlack, 1, 1000).unwrap();
        let out = s.play(bet).unwrap();
        assert_eq!(out.balance, 0);
        assert!(!s.can_play());
        assert!(s.play(Bet::new(BetKind::RedBlack, 1, 10).unwrap()).is_err());
        assert_eq!(s.user().games_played, 1);
    }

    #[test]
    fn win_near_the_balance_ceiling_saturates() {
        let mut store = MemoryUserStore::default();
        let sealed = crate::password::PasswordScheme::SaltedSha256.seal("secret1").unwrap();
        store.insert(&UserRecord::new("rich", sealed, i64::MAX - 10)).unwrap();
        let mut c = Casino::new(store, ScriptedWheel::new([17]), CasinoConfig::default());
        let mut s = c.login("rich", "secret1").unwrap();

        let out = s.play(Bet::new(BetKind::Number, 17, 100).unwrap()).unwrap();
        assert!(out.resolution.is_win());
        assert_eq!(out.balance, i64::MAX);
        assert!(out.persisted);
    }

    #[test]
    fn rejected_new_password_keeps_the_old_one() {
        let mut config = CasinoConfig::default();
        config.auth.password_scheme = crate::password::PasswordScheme::Shift;
        let mut c = Casino::new(MemoryUserStore::default(), ScriptedWheel::new([0]), config);
        let mut s = c.register("alice", "secret1", None).unwrap();
        let before = s.user().password.clone();

        let next = "dots\u{2025}xx";
        assert!(matches!(
            s.change_password("secret1", next, next),
            Err(CasinoError::Validation(_))
        ));
        assert_eq!(s.user().password, before);
        assert!(s.play(Bet::new(BetKind::Number, 0, 10).unwrap()).unwrap().persisted);
    }

    #[test]
    fn admin_resetting_self_updates_session_copy() {
        let mut c = casino(vec![0]);
        let mut s = c.register("admin", "secret1", Some("TEAM16")).unwrap();
        s.play(Bet::new(BetKind::EvenOdd, 1, 100).unwrap()).unwrap();
        assert_eq!(s.user().balance, 900);
        s.reset_balance("admin").unwrap();
        assert_eq!(s.user().balance, 1000);
        assert_eq!(s.user().games_played, 1);
    }
}
