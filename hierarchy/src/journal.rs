//! In-memory journal of mutation transactions.
//!
//! Every `set_bases` and `create_class` call opens a transaction and ends it
//! with exactly one commit or abort entry. Nested calls made by hooks get
//! their own transactions, so entries interleave.

use std::collections::VecDeque;

use lineage_core::{ClassId, TxnId};

/// Journal entry types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// A transaction started.
    Begin {
        txn: TxnId,
        class: ClassId,
        name: String,
        /// Reentrancy depth at which it started (1 for top level).
        depth: usize,
    },

    /// A transaction kept its writes.
    Commit { txn: TxnId },

    /// A transaction was rolled back.
    Abort { txn: TxnId, reason: String },
}

impl JournalEntry {
    pub fn txn(&self) -> TxnId {
        match self {
            JournalEntry::Begin { txn, .. } => *txn,
            JournalEntry::Commit { txn } => *txn,
            JournalEntry::Abort { txn, .. } => *txn,
        }
    }

    pub fn is_begin(&self) -> bool {
        matches!(self, JournalEntry::Begin { .. })
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, JournalEntry::Commit { .. })
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, JournalEntry::Abort { .. })
    }
}

/// Bounded in-memory journal. The oldest entries are dropped first.
#[derive(Debug)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    /// Maximum number of retained entries; 0 disables recording.
    limit: usize,
    next_txn: u64,
}

impl Journal {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            next_txn: 1,
        }
    }

    /// Allocate a new transaction ID. IDs are handed out even when recording
    /// is disabled.
    pub fn alloc_txn(&mut self) -> TxnId {
        let id = TxnId::new(self.next_txn);
        self.next_txn += 1;
        id
    }

    pub fn append(&mut self, entry: JournalEntry) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Transactions with a retained commit entry, in commit order.
    pub fn committed(&self) -> Vec<TxnId> {
        self.entries
            .iter()
            .filter(|e| e.is_commit())
            .map(JournalEntry::txn)
            .collect()
    }

    /// Transactions with a retained abort entry, in abort order.
    pub fn aborted(&self) -> Vec<TxnId> {
        self.entries
            .iter()
            .filter(|e| e.is_abort())
            .map(JournalEntry::txn)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
