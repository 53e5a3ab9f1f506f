//! The query state machine: `LINKS`, then `STATS l` for every hub, then done.

use crate::accumulator::{ReplyAccumulator, LINK_STATS_KIND};
use crate::reply::Reply;
use itertools::Itertools;
use linkuptime_client::{MessageSink, OutboundMessage};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Start,
    AwaitingTopology,
    AwaitingStatistics,
    Done,
}

/// Result of feeding a reply to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    /// Everything we asked for has arrived. Returned exactly once per driver.
    Complete,
}

/// When the topology query went out
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug)]
pub struct QueryDriver {
    state: DriverState,
    accumulator: ReplyAccumulator,
    clock: Option<SessionClock>,
}

impl Default for QueryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Start,
            accumulator: ReplyAccumulator::new(),
            clock: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn accumulator(&self) -> &ReplyAccumulator {
        &self.accumulator
    }

    pub fn clock(&self) -> Option<&SessionClock> {
        self.clock.as_ref()
    }

    /// Issue the topology query. Does nothing if the query has already been
    /// started; returns whether it was sent.
    pub fn start(&mut self, sink: &impl MessageSink) -> bool {
        if self.state != DriverState::Start {
            tracing::debug!("Query already started ({:?})", self.state);
            return false;
        }

        self.clock = Some(SessionClock::start());
        self.state = DriverState::AwaitingTopology;
        sink.send(OutboundMessage::bare("LINKS"));
        true
    }

    /// Apply one reply, sending whatever follow-up queries it calls for.
    pub fn handle(&mut self, reply: Reply, sink: &impl MessageSink) -> Progress {
        if self.state == DriverState::Done {
            tracing::debug!("Ignoring late reply {:?}", reply);
            return Progress::Pending;
        }

        match reply {
            Reply::Links { leaf, hub } => {
                if !self.accumulator.add_link(&leaf, &hub) {
                    tracing::trace!("Skipping self link for {}", hub);
                }
                Progress::Pending
            }
            Reply::EndOfLinks => self.end_of_links(sink),
            Reply::StatsLinkInfo {
                source,
                target,
                uptime,
            } => {
                self.accumulator.add_uptime(&source, &target, uptime);
                Progress::Pending
            }
            Reply::EndOfStats { kind } => self.end_of_stats(&kind),
            Reply::YoureOper | Reply::PasswdMismatch | Reply::NoOperHost => Progress::Pending,
        }
    }

    fn end_of_links(&mut self, sink: &impl MessageSink) -> Progress {
        if self.state != DriverState::AwaitingTopology {
            tracing::debug!("Unexpected end of links in state {:?}", self.state);
            return Progress::Pending;
        }

        // Hubs that turn up after this point are never queried
        let hubs: Vec<String> = self.accumulator.hubs().map(str::to_string).collect();
        if hubs.is_empty() {
            tracing::warn!("No server links were reported");
            return self.finish();
        }
        tracing::info!("Querying {} hubs: {}", hubs.len(), hubs.iter().join(", "));

        self.state = DriverState::AwaitingStatistics;
        for hub in hubs {
            sink.send(OutboundMessage::new("STATS", [LINK_STATS_KIND, hub.as_str()]));
        }
        Progress::Pending
    }

    fn end_of_stats(&mut self, kind: &str) -> Progress {
        if self.state != DriverState::AwaitingStatistics {
            tracing::debug!("Unexpected end of stats in state {:?}", self.state);
            return Progress::Pending;
        }

        if !self.accumulator.end_of_stats(kind) {
            return Progress::Pending;
        }

        tracing::debug!(
            received = self.accumulator.stats_ends(),
            expected = self.accumulator.hub_count(),
            "End of link stats"
        );

        if self.accumulator.is_complete() {
            self.finish()
        } else {
            Progress::Pending
        }
    }

    fn finish(&mut self) -> Progress {
        self.state = DriverState::Done;
        Progress::Complete
    }
}
