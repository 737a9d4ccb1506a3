use croupier_shared::HistoryEntry;

pub const DEFAULT_CAPACITY: usize = 50;

/// Recent rounds for the lifetime of the process, oldest evicted first.
///
/// Fixed arena of `capacity` slots; `head` is the oldest live slot.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<Option<HistoryEntry>>,
    head: usize,
    len: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        let cap = self.capacity();
        if self.len < cap {
            self.slots[(self.head + self.len) % cap] = Some(entry);
            self.len += 1;
        } else {
            self.slots[self.head] = Some(entry);
            self.head = (self.head + 1) % cap;
        }
    }

    fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        let cap = self.capacity();
        (0..self.len)
            .rev()
            .filter_map(move |i| self.slots[(self.head + i) % cap].as_ref())
    }

    /// Entries for `username`, most recent first.
    pub fn query(&self, username: &str) -> Vec<&HistoryEntry> {
        self.newest_first().filter(|e| e.username == username).collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(username: &str, bet_amount: i64) -> HistoryEntry {
        HistoryEntry {
            username: username.to_string(),
            label: "Red".to_string(),
            bet_amount,
            result: 3,
            payout: bet_amount,
            ts: Local::now(),
        }
    }

    #[test]
    fn keeps_insertion_order_below_capacity() {
        let mut h = History::with_capacity(4);
        h.append(entry("a", 10));
        h.append(entry("b", 20));
        h.append(entry("a", 30));
        let amounts: Vec<i64> = h.query("a").iter().map(|e| e.bet_amount).collect();
        assert_eq!(amounts, vec![30, 10]);
        assert_eq!(h.len(), 3);
        assert!(h.query("nobody").is_empty());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut h = History::with_capacity(3);
        for amount in 1..=5 {
            h.append(entry("a", amount));
        }
        assert_eq!(h.len(), 3);
        let amounts: Vec<i64> = h.query("a").iter().map(|e| e.bet_amount).collect();
        assert_eq!(amounts, vec![5, 4, 3]);
    }

    #[test]
    fn zero_capacity_still_holds_latest() {
        let mut h = History::with_capacity(0);
        h.append(entry("a", 1));
        h.append(entry("a", 2));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.query("a")[0].bet_amount, 2);
    }
}
