//! Classification of the server replies that drive a snapshot.

use linkuptime_client::ServerMessage;
use std::{num::ParseIntError, str::FromStr};
use strum::{EnumString, IntoStaticStr};
use thiserror::Error;

/// The numerics we act on. Anything else on the wire is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ReplyKind {
    #[strum(serialize = "211")]
    StatsLinkInfo,
    #[strum(serialize = "219")]
    EndOfStats,
    #[strum(serialize = "364")]
    Links,
    #[strum(serialize = "365")]
    EndOfLinks,
    #[strum(serialize = "381")]
    YoureOper,
    #[strum(serialize = "464")]
    PasswdMismatch,
    #[strum(serialize = "491")]
    NoOperHost,
}

impl ReplyKind {
    pub fn numeric(self) -> &'static str {
        self.into()
    }
}

/// A reply, with the parameters we need pulled out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// RPL_LINKS: `leaf` is reachable through `hub`
    Links { leaf: String, hub: String },
    EndOfLinks,
    /// RPL_STATSLINKINFO: `source` reports its link to `target` has been up
    /// for `uptime` seconds
    StatsLinkInfo {
        source: String,
        target: String,
        uptime: u64,
    },
    EndOfStats { kind: String },
    YoureOper,
    PasswdMismatch,
    NoOperHost,
}

/// A reply that was recognised but couldn't be understood
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("{} ({:?}) reply has {} arguments", .0.numeric(), .0, .1)]
    WrongArgCount(ReplyKind, usize),
    #[error("{} ({:?}) reply has no source", .0.numeric(), .0)]
    MissingSource(ReplyKind),
    #[error("Invalid uptime {0:?}: {1}")]
    BadUptime(String, ParseIntError),
}

impl Reply {
    /// Classify an inbound message. `Ok(None)` means the message is not one
    /// we care about.
    pub fn from_message(msg: &ServerMessage) -> Result<Option<Reply>, ReplyError> {
        let Ok(kind) = ReplyKind::from_str(&msg.command) else {
            return Ok(None);
        };
        let args = msg.args.as_slice();

        let reply = match kind {
            ReplyKind::Links => {
                let [_, leaf, hub, ..] = args else {
                    return Err(ReplyError::WrongArgCount(kind, args.len()));
                };
                Reply::Links {
                    leaf: leaf.clone(),
                    hub: hub.clone(),
                }
            }
            ReplyKind::EndOfLinks => Reply::EndOfLinks,
            ReplyKind::StatsLinkInfo => {
                let [_, target, _, _, _, _, _, uptime] = args else {
                    return Err(ReplyError::WrongArgCount(kind, args.len()));
                };
                let source = msg
                    .source_name()
                    .ok_or(ReplyError::MissingSource(kind))?;
                Reply::StatsLinkInfo {
                    source: source.to_string(),
                    target: target.clone(),
                    uptime: parse_uptime(uptime)?,
                }
            }
            ReplyKind::EndOfStats => {
                let Some(stats_kind) = args.get(1) else {
                    return Err(ReplyError::WrongArgCount(kind, args.len()));
                };
                Reply::EndOfStats {
                    kind: stats_kind.clone(),
                }
            }
            ReplyKind::YoureOper => Reply::YoureOper,
            ReplyKind::PasswdMismatch => Reply::PasswdMismatch,
            ReplyKind::NoOperHost => Reply::NoOperHost,
        };

        Ok(Some(reply))
    }
}

// The last field of RPL_STATSLINKINFO is "<uptime> <idle> <capabilities...>"
fn parse_uptime(field: &str) -> Result<u64, ReplyError> {
    let first = field.split_whitespace().next().unwrap_or_default();
    first
        .parse()
        .map_err(|e| ReplyError::BadUptime(first.to_string(), e))
}
