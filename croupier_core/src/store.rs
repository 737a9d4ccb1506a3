//! User record persistence.
//!
//! [`FileUserStore`] keeps one record per line:
//!
//! ```text
//! username password balance games_played games_won highest_win admin(0|1)
//! ```
//!
//! Every mutation re-reads the whole file and rewrites it. There is no locking:
//! two processes updating the same file will lose one of the updates.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use croupier_shared::{CasinoError, CasinoResult, UserRecord};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::password::verify_stored;

pub const DEFAULT_MAX_USERS: usize = 100;
pub const MAX_USERNAME_LEN: usize = 49;
const FIELD_COUNT: usize = 7;

pub trait UserStore {
    /// Look up `username`. A non-empty `password` must verify against the
    /// stored credential; an empty one only probes for existence.
    fn find(&self, username: &str, password: &str) -> CasinoResult<UserRecord>;

    /// Add a new record. Uniqueness is the caller's job.
    fn insert(&mut self, user: &UserRecord) -> CasinoResult<()>;

    /// Overwrite the record with the same username.
    fn replace(&mut self, user: &UserRecord) -> CasinoResult<()>;

    /// All records in storage order.
    fn list(&self) -> CasinoResult<Vec<UserRecord>>;
}

pub fn validate_username(username: &str) -> CasinoResult<()> {
    if username.is_empty() {
        return Err(CasinoError::Validation("username must not be empty".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CasinoError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CasinoError::Validation(
            "username must not contain spaces or control characters".into(),
        ));
    }
    Ok(())
}

/// Checks a record can be written as a single well-formed line. Shifted
/// credentials may hold control characters; only whitespace splits a field.
pub fn validate_record(user: &UserRecord) -> CasinoResult<()> {
    validate_username(&user.username)?;
    if user.password.is_empty() || user.password.chars().any(char::is_whitespace) {
        return Err(CasinoError::Validation(format!(
            "stored credential for {} cannot be written",
            user.username
        )));
    }
    Ok(())
}

pub fn encode_line(user: &UserRecord) -> String {
    format!(
        "{} {} {} {} {} {} {}",
        user.username,
        user.password,
        user.balance,
        user.games_played,
        user.games_won,
        user.highest_win,
        u8::from(user.is_admin)
    )
}

// Older files may carry negative counters; clamp them into range.
fn parse_counter(field: &str) -> Option<u32> {
    let value: i64 = field.parse().ok()?;
    Some(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

pub fn decode_line(line: &str) -> Option<UserRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }
    let admin_flag: i64 = fields[6].parse().ok()?;
    Some(UserRecord {
        username: fields[0].to_string(),
        password: fields[1].to_string(),
        balance: fields[2].parse().ok()?,
        games_played: parse_counter(fields[3])?,
        games_won: parse_counter(fields[4])?,
        highest_win: fields[5].parse().ok()?,
        is_admin: admin_flag == 1,
    })
}

fn check_credentials(user: UserRecord, password: &str) -> CasinoResult<UserRecord> {
    if password.is_empty() || verify_stored(password, &user.password) {
        Ok(user)
    } else {
        Err(CasinoError::WrongPassword)
    }
}

#[derive(Debug, Clone)]
enum StoredLine {
    Record(UserRecord),
    // kept verbatim so a rewrite never drops data it could not parse
    Malformed(String),
}

pub struct FileUserStore {
    path: PathBuf,
    max_users: usize,
}

impl FileUserStore {
    pub fn new(path: impl Into<PathBuf>, max_users: usize) -> Self {
        Self {
            path: path.into(),
            max_users,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, e: io::Error) -> CasinoError {
        CasinoError::Storage(format!("failed to {action} {}: {e}", self.path.display()))
    }

    fn read_raw(&self) -> CasinoResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(self.storage_error("read", e)),
        }
    }

    fn read_lines(&self) -> CasinoResult<Vec<StoredLine>> {
        let text = self.read_raw()?;
        let mut lines = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(line) {
                Some(user) => lines.push(StoredLine::Record(user)),
                None => {
                    warn!(path = %self.path.display(), line = idx + 1, "skipping malformed user record");
                    lines.push(StoredLine::Malformed(line.to_string()));
                }
            }
        }
        Ok(lines)
    }

    fn records(&self) -> CasinoResult<Vec<UserRecord>> {
        Ok(self
            .read_lines()?
            .into_iter()
            .filter_map(|line| match line {
                StoredLine::Record(user) => Some(user),
                StoredLine::Malformed(_) => None,
            })
            .collect())
    }

    fn rewrite(&self, lines: &[StoredLine]) -> CasinoResult<()> {
        let mut body = String::new();
        for line in lines {
            match line {
                StoredLine::Record(user) => body.push_str(&encode_line(user)),
                StoredLine::Malformed(raw) => body.push_str(raw),
            }
            body.push('\n');
        }
        // write beside the target then rename over it; a failed rename
        // drops the temp file, which deletes it
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.storage_error("create temp file for", e))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| self.storage_error("write", e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.storage_error("replace", e.error))?;
        Ok(())
    }
}

impl UserStore for FileUserStore {
    fn find(&self, username: &str, password: &str) -> CasinoResult<UserRecord> {
        let user = self
            .records()?
            .into_iter()
            .find(|u| u.username == username)
            .ok_or_else(|| CasinoError::NotFound(username.to_string()))?;
        check_credentials(user, password)
    }

    fn insert(&mut self, user: &UserRecord) -> CasinoResult<()> {
        validate_record(user)?;
        let text = self.read_raw()?;
        let count = text.lines().filter_map(decode_line).count();
        if count >= self.max_users {
            return Err(CasinoError::Capacity { max: self.max_users });
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_error("open", e))?;
        let mut line = String::new();
        if !text.is_empty() && !text.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&encode_line(user));
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| self.storage_error("append to", e))?;
        info!(username = %user.username, "user record inserted");
        Ok(())
    }

    fn replace(&mut self, user: &UserRecord) -> CasinoResult<()> {
        validate_record(user)?;
        let mut lines = self.read_lines()?;
        let count = lines
            .iter()
            .filter(|l| matches!(l, StoredLine::Record(_)))
            .count();
        if count > self.max_users {
            return Err(CasinoError::Capacity { max: self.max_users });
        }

        // every line with this name is overwritten, duplicates included
        let mut matched = 0;
        for line in lines.iter_mut() {
            if matches!(line, StoredLine::Record(u) if u.username == user.username) {
                *line = StoredLine::Record(user.clone());
                matched += 1;
            }
        }
        match matched {
            0 => return Err(CasinoError::NotFound(user.username.clone())),
            1 => {}
            n => warn!(username = %user.username, lines = n, "duplicate user records overwritten"),
        }
        self.rewrite(&lines)
    }

    fn list(&self) -> CasinoResult<Vec<UserRecord>> {
        self.records()
    }
}

/// Keeps records in memory only; same contract as the file store.
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    users: Vec<UserRecord>,
    max_users: usize,
}

impl MemoryUserStore {
    pub fn new(max_users: usize) -> Self {
        Self {
            users: Vec::new(),
            max_users,
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_USERS)
    }
}

impl UserStore for MemoryUserStore {
    fn find(&self, username: &str, password: &str) -> CasinoResult<UserRecord> {
        let user = self
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| CasinoError::NotFound(username.to_string()))?;
        check_credentials(user, password)
    }

    fn insert(&mut self, user: &UserRecord) -> CasinoResult<()> {
        validate_record(user)?;
        if self.users.len() >= self.max_users {
            return Err(CasinoError::Capacity { max: self.max_users });
        }
        self.users.push(user.clone());
        Ok(())
    }

    fn replace(&mut self, user: &UserRecord) -> CasinoResult<()> {
        validate_record(user)?;
        let mut matched = false;
        for slot in self.users.iter_mut().filter(|u| u.username == user.username) {
            *slot = user.clone();
            matched = true;
        }
        if matched {
            Ok(())
        } else {
            Err(CasinoError::NotFound(user.username.clone()))
        }
    }

    fn list(&self) -> CasinoResult<Vec<UserRecord>> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::PasswordScheme;

    fn user(name: &str, password: &str) -> UserRecord {
        UserRecord::new(name, PasswordScheme::Shift.seal(password).unwrap(), 1000)
    }

    fn temp_store() -> (tempfile::TempDir, FileUserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("users.txt"), DEFAULT_MAX_USERS);
        (dir, store)
    }

    #[test]
    fn line_format() {
        let mut u = user("alice", "abcdef");
        u.is_admin = true;
        u.games_played = 3;
        assert_eq!(encode_line(&u), "alice defghi 1000 3 0 0 1");
        assert_eq!(decode_line("alice defghi 1000 3 0 0 1"), Some(u));
        assert_eq!(decode_line("alice defghi 1000 3 0 0"), None);
        assert_eq!(decode_line("alice defghi lots 3 0 0 1"), None);
        assert!(!decode_line("bob x 5 0 0 0 7").unwrap().is_admin);
    }

    #[test]
    fn negative_counters_from_old_files_still_load() {
        let u = decode_line("alice defghi 1000 -1 -2 0 0").unwrap();
        assert_eq!((u.games_played, u.games_won), (0, 0));
        assert_eq!(decode_line("alice defghi 1000 99999999999 0 0 0").unwrap().games_played, u32::MAX);
        assert_eq!(decode_line("alice defghi 1000 1.5 0 0 0"), None);
    }

    #[test]
    fn shifted_control_characters_are_writable() {
        let (_dir, mut store) = temp_store();
        let carol = user("carol", "pipe|brace}tilde~");
        store.insert(&carol).unwrap();
        assert_eq!(store.find("carol", "pipe|brace}tilde~").unwrap(), carol);
        assert!(store.insert(&UserRecord::new("dave", "a\u{2028}b", 1000)).is_err());
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.find("alice", ""), Err(CasinoError::NotFound(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn find_checks_password_only_when_given() {
        let (_dir, mut store) = temp_store();
        store.insert(&user("alice", "secret1")).unwrap();
        assert!(store.find("alice", "").is_ok());
        assert!(store.find("alice", "secret1").is_ok());
        assert!(matches!(store.find("alice", "nope"), Err(CasinoError::WrongPassword)));
        assert!(matches!(store.find("bob", "secret1"), Err(CasinoError::NotFound(_))));
    }

    #[test]
    fn replace_then_find_returns_same_record() {
        let (_dir, mut store) = temp_store();
        store.insert(&user("alice", "secret1")).unwrap();
        store.insert(&user("bob", "secret2")).unwrap();

        let mut alice = store.find("alice", "").unwrap();
        alice.balance = 1350;
        alice.games_played = 7;
        alice.games_won = 2;
        alice.highest_win = 350;
        alice.is_admin = true;
        store.replace(&alice).unwrap();

        assert_eq!(store.find("alice", "").unwrap(), alice);
        assert_eq!(store.find("bob", "secret2").unwrap().balance, 1000);
        let names: Vec<String> = store.list().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn replace_unknown_user_leaves_file_alone() {
        let (_dir, mut store) = temp_store();
        store.insert(&user("alice", "secret1")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();
        assert!(matches!(
            store.replace(&user("ghost", "secret1")),
            Err(CasinoError::NotFound(_))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn malformed_lines_survive_rewrite() {
        let (_dir, mut store) = temp_store();
        fs::write(store.path(), "garbage line\nalice defghi 1000 0 0 0 0").unwrap();
        let mut alice = store.find("alice", "abcdef").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);

        alice.balance = 990;
        store.replace(&alice).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "garbage line\nalice defghi 990 0 0 0 0\n");
    }

    #[test]
    fn replace_overwrites_duplicate_names() {
        let (_dir, mut store) = temp_store();
        fs::write(
            store.path(),
            "alice defghi 1000 0 0 0 0\nbob defghi 1000 0 0 0 0\nalice defghi 500 4 1 70 0\n",
        )
        .unwrap();
        let mut alice = store.find("alice", "").unwrap();
        assert_eq!(alice.balance, 1000);
        alice.balance = 1200;
        store.replace(&alice).unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "alice defghi 1200 0 0 0 0\nbob defghi 1000 0 0 0 0\nalice defghi 1200 0 0 0 0\n"
        );
    }

    #[test]
    fn failed_rewrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("users.txt");
        // a non-empty directory cannot be renamed over
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();
        let store = FileUserStore::new(&target, DEFAULT_MAX_USERS);

        let lines = vec![StoredLine::Record(user("alice", "secret1"))];
        assert!(matches!(store.rewrite(&lines), Err(CasinoError::Storage(_))));
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("users.txt")]);
    }

    #[test]
    fn insert_after_unterminated_line() {
        let (_dir, mut store) = temp_store();
        fs::write(store.path(), "alice defghi 1000 0 0 0 0").unwrap();
        store.insert(&user("bob", "secret2")).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn rejects_records_that_would_corrupt_the_file() {
        let (_dir, mut store) = temp_store();
        assert!(store.insert(&user("two words", "secret1")).is_err());
        assert!(store.insert(&UserRecord::new("carol", "has space", 1000)).is_err());
        assert!(store.insert(&user(&"x".repeat(50), "secret1")).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn capacity_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileUserStore::new(dir.path().join("users.txt"), 2);
        store.insert(&user("a", "secret1")).unwrap();
        store.insert(&user("b", "secret1")).unwrap();
        assert!(matches!(
            store.insert(&user("c", "secret1")),
            Err(CasinoError::Capacity { max: 2 })
        ));

        let mut mem = MemoryUserStore::new(1);
        mem.insert(&user("a", "secret1")).unwrap();
        assert!(matches!(
            mem.insert(&user("b", "secret1")),
            Err(CasinoError::Capacity { max: 1 })
        ));
    }

    #[test]
    fn oversized_file_refuses_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        let body: String = (0..3).map(|i| format!("u{i} defghi 1000 0 0 0 0\n")).collect();
        fs::write(&path, body).unwrap();
        let mut store = FileUserStore::new(path, 2);
        let u0 = store.find("u0", "").unwrap();
        assert!(matches!(store.replace(&u0), Err(CasinoError::Capacity { max: 2 })));
    }

    #[test]
    fn unreadable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be read as a file
        let store = FileUserStore::new(dir.path(), DEFAULT_MAX_USERS);
        assert!(matches!(store.find("alice", ""), Err(CasinoError::Storage(_))));
    }
}
