//! The tables built up from topology and statistics replies.

use indexmap::IndexMap;
use std::collections::HashMap;

/// The `STATS` query we issue, and the kind tag on the matching end marker
pub const LINK_STATS_KIND: &str = "l";

/// hub -> leaves, in the order they were reported
pub type LinkTable = IndexMap<String, Vec<String>>;

/// (reporting server, target server) -> seconds of uptime
pub type UptimeTable = HashMap<(String, String), u64>;

/// Accumulates replies for a single snapshot and decides when it's complete.
#[derive(Debug, Default, Clone)]
pub struct ReplyAccumulator {
    links: LinkTable,
    uptimes: UptimeTable,
    stats_ends: usize,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one RPL_LINKS entry. A server listed as linked to itself is the
    /// answering server describing itself, and isn't an edge.
    ///
    /// Returns whether an edge was added.
    pub fn add_link(&mut self, leaf: &str, hub: &str) -> bool {
        if leaf == hub {
            return false;
        }

        self.links
            .entry(hub.to_string())
            .or_default()
            .push(leaf.to_string());
        true
    }

    /// Record one RPL_STATSLINKINFO entry, replacing any earlier value for the
    /// same pair.
    pub fn add_uptime(&mut self, source: &str, target: &str, uptime: u64) {
        self.uptimes
            .insert((source.to_string(), target.to_string()), uptime);
    }

    /// Record an RPL_ENDOFSTATS marker. Only markers for the link stats we
    /// asked for are counted; returns whether this one was.
    pub fn end_of_stats(&mut self, kind: &str) -> bool {
        if kind != LINK_STATS_KIND {
            return false;
        }
        self.stats_ends += 1;
        true
    }

    /// Distinct hubs, in discovery order
    pub fn hubs(&self) -> impl Iterator<Item = &str> + '_ {
        self.links.keys().map(String::as_str)
    }

    pub fn hub_count(&self) -> usize {
        self.links.len()
    }

    pub fn stats_ends(&self) -> usize {
        self.stats_ends
    }

    /// True once an end marker has arrived for every hub. Trivially true
    /// when no links were reported at all.
    pub fn is_complete(&self) -> bool {
        self.stats_ends >= self.links.len()
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Uptime reported by `source` for its link to `target`
    pub fn uptime(&self, source: &str, target: &str) -> Option<u64> {
        self.uptimes
            .get(&(source.to_string(), target.to_string()))
            .copied()
    }
}
