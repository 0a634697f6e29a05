//! Per-user accumulation: the reaction tally and the dedup ledger.
//!
//! Both live for exactly one user's sweep and are discarded afterward.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{ItemIdentity, Reaction};

/// Counts for one emoji. `first <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCount {
    pub total: u64,
    pub first: u64,
}

/// One line of a finished tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRow {
    pub emoji: String,
    pub total: u64,
    pub first: u64,
}

/// Emoji name → counts for a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionTally {
    counts: BTreeMap<String, EmojiCount>,
}

impl ReactionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one reaction in on behalf of `user_id`. A reaction the user is
    /// not part of leaves the tally untouched.
    pub fn apply(&mut self, reaction: &Reaction, user_id: &str) {
        if !reaction.includes(user_id) {
            return;
        }
        let entry = self.counts.entry(reaction.name.clone()).or_default();
        entry.total += 1;
        if reaction.first_reactor() == Some(user_id) {
            entry.first += 1;
        }
    }

    pub fn get(&self, emoji: &str) -> Option<EmojiCount> {
        self.counts.get(emoji).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all totals.
    pub fn reactions_placed(&self) -> u64 {
        self.counts.values().map(|c| c.total).sum()
    }

    pub fn to_sequence(&self) -> Vec<TallyRow> {
        self.counts
            .iter()
            .map(|(emoji, c)| TallyRow {
                emoji: emoji.clone(),
                total: c.total,
                first: c.first,
            })
            .collect()
    }
}

/// Identities already folded into the current tally.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<ItemIdentity>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unrecognized items are never considered seen.
    pub fn seen(&self, identity: &ItemIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn mark(&mut self, identity: ItemIdentity) {
        if identity != ItemIdentity::Unrecognized {
            self.seen.insert(identity);
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
