//! Ties the query driver to a session: when to start, what to do when the
//! snapshot is complete, and when to stop.

use crate::config::OperCredentials;
use crate::driver::{Progress, QueryDriver};
use crate::render::GraphRenderer;
use crate::reply::Reply;
use crate::utils::OrLog;

use chrono::Utc;
use linkuptime_client::{
    ConnectionEvent, MessageSink, OutboundMessage, ServerMessage, Session, SessionEvent,
};
use std::{io::Write, time::Duration};
use tokio::{
    select,
    sync::{mpsc::Receiver, oneshot},
};

pub const QUIT_MESSAGE: &str = "nuzzles u";

/// Why the run loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The document was written and QUIT sent
    Complete,
    Disconnected,
    Interrupted,
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleOptions {
    /// Don't start querying until we've been told we're an operator
    pub wait_oper: bool,
    /// Sent as `OPER` once registered
    pub oper: Option<OperCredentials>,
}

/// One snapshot's worth of state, writing its document to `output`.
pub struct LinkUptime<W> {
    driver: QueryDriver,
    renderer: GraphRenderer,
    options: LifecycleOptions,
    output: W,
}

impl<W: Write> LinkUptime<W> {
    pub fn new(renderer: GraphRenderer, options: LifecycleOptions, output: W) -> Self {
        Self {
            driver: QueryDriver::new(),
            renderer,
            options,
            output,
        }
    }

    pub fn driver(&self) -> &QueryDriver {
        &self.driver
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Process session events until the snapshot completes, the connection
    /// goes away, or `shutdown` fires.
    pub async fn run<S: MessageSink>(
        &mut self,
        session: &mut Session<S>,
        events: &mut Receiver<ConnectionEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> ShutdownReason {
        let mut interruptible = true;

        loop {
            select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        return ShutdownReason::Disconnected;
                    };
                    let Some(event) = session.process(event) else {
                        continue;
                    };
                    if let Some(reason) = self.handle_event(event, &*session) {
                        return reason;
                    }
                },
                res = &mut shutdown, if interruptible => match res {
                    Ok(()) => return ShutdownReason::Interrupted,
                    // Nobody can interrupt us any more
                    Err(_) => interruptible = false,
                },
            }
        }
    }

    /// Apply a single session event; `Some` means the run is over.
    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        sink: &impl MessageSink,
    ) -> Option<ShutdownReason> {
        match event {
            SessionEvent::Ready => {
                self.on_ready(sink);
                None
            }
            SessionEvent::Message(msg) => self.on_message(&msg, sink),
            SessionEvent::Disconnected => Some(ShutdownReason::Disconnected),
        }
    }

    fn on_ready(&mut self, sink: &impl MessageSink) {
        if let Some(oper) = &self.options.oper {
            sink.send(OutboundMessage::new(
                "OPER",
                [oper.name.as_str(), oper.password.as_str()],
            ));
        }

        if self.options.wait_oper {
            tracing::info!("Waiting for operator status before querying");
        } else {
            self.driver.start(sink);
        }
    }

    fn on_message(&mut self, msg: &ServerMessage, sink: &impl MessageSink) -> Option<ShutdownReason> {
        let reply = match Reply::from_message(msg) {
            Ok(Some(reply)) => reply,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Ignoring malformed reply: {}", e);
                return None;
            }
        };

        match reply {
            Reply::YoureOper => {
                if self.options.wait_oper {
                    self.driver.start(sink);
                }
                None
            }
            Reply::PasswdMismatch | Reply::NoOperHost => {
                tracing::warn!("OPER failed ({})", msg.command);
                None
            }
            reply => match self.driver.handle(reply, sink) {
                Progress::Pending => None,
                Progress::Complete => {
                    self.finish(sink);
                    Some(ShutdownReason::Complete)
                }
            },
        }
    }

    fn finish(&mut self, sink: &impl MessageSink) {
        let elapsed = self
            .driver
            .clock()
            .map_or(Duration::ZERO, |clock| clock.elapsed());
        let document = self
            .renderer
            .render(self.driver.accumulator(), Utc::now(), elapsed);

        let written = self
            .output
            .write_all(document.as_bytes())
            .and_then(|_| self.output.flush())
            .or_log("writing graph output");
        if written {
            let links: usize = self.driver.accumulator().links().values().map(Vec::len).sum();
            tracing::info!("Wrote graph of {} links", links);
        }

        sink.send(OutboundMessage::new("QUIT", [QUIT_MESSAGE]));
    }
}
