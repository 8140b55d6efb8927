//! Move ordering hints
//!
//! Replies that refuted other moves tend to refute their siblings too, so they are tried first.

use crate::moves::Move;

use parking_lot::Mutex;
use std::collections::HashMap;

/// Multiset of moves, iterated from the most frequent one
#[derive(Debug, Default, Clone)]
pub struct BestResponses {
    counts: HashMap<Move, (u32, usize)>,
}

impl BestResponses {
    pub fn new() -> BestResponses {
        BestResponses::default()
    }

    pub fn add(&mut self, mv: Move) {
        let order = self.counts.len();
        self.counts.entry(mv).or_insert((0, order)).0 += 1;
    }

    pub fn count(&self, mv: Move) -> u32 {
        self.counts.get(&mv).map_or(0, |&(count, _)| count)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Moves by descending count, ties broken by first insertion
    pub fn sorted(&self) -> Vec<Move> {
        let mut items: Vec<_> = self.counts.iter().map(|(&mv, &key)| (mv, key)).collect();
        items.sort_by(|(_, (ca, oa)), (_, (cb, ob))| cb.cmp(ca).then(oa.cmp(ob)));
        items.into_iter().map(|(mv, _)| mv).collect()
    }
}

/// [`BestResponses`] shared by the workers of a parallel search
#[derive(Debug, Default)]
pub struct SharedBestResponses(Mutex<BestResponses>);

impl SharedBestResponses {
    pub fn new() -> SharedBestResponses {
        SharedBestResponses::default()
    }

    pub fn add(&self, mv: Move) {
        self.0.lock().add(mv);
    }

    pub fn sorted(&self) -> Vec<Move> {
        self.0.lock().sorted()
    }
}

/// Hints for every depth of a single recursive search
#[derive(Debug, Default, Clone)]
pub struct ResponseTable(Vec<BestResponses>);

impl ResponseTable {
    pub fn new() -> ResponseTable {
        ResponseTable::default()
    }

    pub fn add(&mut self, depth: usize, mv: Move) {
        if self.0.len() <= depth {
            self.0.resize_with(depth + 1, BestResponses::new);
        }
        self.0[depth].add(mv);
    }

    pub fn sorted(&self, depth: usize) -> Vec<Move> {
        self.0.get(depth).map_or_else(Vec::new, BestResponses::sorted)
    }
}
