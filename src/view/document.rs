//! The rendered page: last tree per region plus a bounded patch journal.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use super::reconcile::{Patch, reconcile};
use super::{Node, Region, to_html};

/// A patch stamped with its journal sequence number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedPatch {
    pub seq: u64,
    #[serde(flatten)]
    pub patch: Patch,
}

/// Full page state for a browser that (re)loads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Sequence number of the newest patch already folded into `regions`.
    pub seq: u64,
    pub regions: BTreeMap<Region, String>,
}

/// Patches newer than a reader's last seen sequence number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchBatch {
    pub seq: u64,
    /// The reader fell behind the journal window (or is ahead of it) and
    /// must reload a snapshot instead of applying `patches`.
    pub reset: bool,
    pub patches: Vec<SequencedPatch>,
}

#[derive(Debug)]
pub struct Document {
    regions: BTreeMap<Region, Vec<Node>>,
    journal: VecDeque<SequencedPatch>,
    capacity: usize,
    last_seq: u64,
}

impl Document {
    pub fn new(capacity: usize) -> Self {
        Self {
            regions: Region::ALL.into_iter().map(|r| (r, Vec::new())).collect(),
            journal: VecDeque::new(),
            capacity: capacity.max(1),
            last_seq: 0,
        }
    }

    /// Replace a region's tree, journaling the patches that get there.
    /// Returns the patches produced (empty when nothing changed).
    pub fn render(&mut self, region: Region, nodes: Vec<Node>) -> Vec<Patch> {
        let prev = self.regions.entry(region).or_default();
        let patches = reconcile(region, prev, &nodes);
        *prev = nodes;

        for patch in &patches {
            self.last_seq += 1;
            self.journal.push_back(SequencedPatch {
                seq: self.last_seq,
                patch: patch.clone(),
            });
        }
        while self.journal.len() > self.capacity {
            self.journal.pop_front();
        }

        patches
    }

    pub fn region(&self, region: Region) -> &[Node] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            seq: self.last_seq,
            regions: self
                .regions
                .iter()
                .map(|(region, nodes)| (*region, to_html(nodes)))
                .collect(),
        }
    }

    pub fn patches_since(&self, since: u64) -> PatchBatch {
        let oldest_kept = self.journal.front().map_or(self.last_seq + 1, |p| p.seq);
        let reset = since > self.last_seq || since + 1 < oldest_kept;

        let patches = if reset {
            Vec::new()
        } else {
            self.journal
                .iter()
                .filter(|p| p.seq > since)
                .cloned()
                .collect()
        };

        PatchBatch {
            seq: self.last_seq,
            reset,
            patches,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
