use linkuptime::config::OperCredentials;
use linkuptime::driver::DriverState;
use linkuptime::lifecycle::{LifecycleOptions, LinkUptime, ShutdownReason};
use linkuptime::render::{GraphRenderer, RenderOptions, Style};
use linkuptime_client::{
    ConnectionError, ConnectionEvent, MessageSink, OutboundMessage, Session, SessionEvent,
};
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

#[derive(Default)]
struct RecordingSink(Mutex<Vec<String>>);

impl MessageSink for RecordingSink {
    fn send(&self, msg: OutboundMessage) {
        self.0.lock().unwrap().push(msg.format());
    }
}

impl RecordingSink {
    fn sent(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Harness {
    session: Session<RecordingSink>,
    events: mpsc::Receiver<ConnectionEvent>,
    sender: mpsc::Sender<ConnectionEvent>,
    snapshot: LinkUptime<Vec<u8>>,
}

impl Harness {
    fn new(render: RenderOptions, options: LifecycleOptions) -> Self {
        let (sender, events) = mpsc::channel(64);
        Self {
            session: Session::new("test", RecordingSink::default(), "linkuptime"),
            events,
            sender,
            snapshot: LinkUptime::new(GraphRenderer::new("test", render), options, Vec::new()),
        }
    }

    async fn lines(&self, lines: &[&str]) {
        for line in lines {
            self.sender
                .send(ConnectionEvent::Message(line.to_string()))
                .await
                .unwrap();
        }
    }

    async fn run(&mut self, shutdown: oneshot::Receiver<()>) -> ShutdownReason {
        self.snapshot
            .run(&mut self.session, &mut self.events, shutdown)
            .await
    }

    fn output(&self) -> String {
        String::from_utf8(self.snapshot.output().clone()).unwrap()
    }

    fn sent(&self) -> Vec<String> {
        self.session.sink().sent()
    }
}

const WELCOME: &str = ":irc.example.net 001 linkuptime :Welcome to the ExampleNet IRC Network";

const TOPOLOGY: &[&str] = &[
    ":irc.example.net 364 linkuptime irc.example.net irc.example.net :0 Self",
    ":irc.example.net 364 linkuptime hubA irc.example.net :1 Hub",
    ":irc.example.net 364 linkuptime leafB hubA :2 Leaf B",
    ":irc.example.net 364 linkuptime leafC hubA :2 Leaf C",
    ":irc.example.net 365 linkuptime * :End of /LINKS list.",
];

#[tokio::test]
async fn full_snapshot() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (_interrupt, shutdown) = oneshot::channel();

    harness.lines(&[WELCOME]).await;
    harness.lines(TOPOLOGY).await;
    harness
        .lines(&[
            ":leafB 211 linkuptime hubA 0 100 10 200 20 :7200 3 TS6 EX",
            ":hubA 211 linkuptime irc.example.net 0 100 10 200 20 :notanumber 3 TS6",
            ":hubA 219 linkuptime l :End of /STATS report",
            ":hubA 219 linkuptime u :End of /STATS report",
            ":irc.example.net 219 linkuptime l :End of /STATS report",
            ":irc.example.net 219 linkuptime l :End of /STATS report",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);
    assert_eq!(harness.snapshot.driver().state(), DriverState::Done);

    assert_eq!(
        harness.sent(),
        [
            "LINKS",
            "STATS l irc.example.net",
            "STATS l hubA",
            "QUIT :nuzzles u"
        ]
    );

    let output = harness.output();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "graph \"test\" {");
    assert_eq!(lines[1], "edge [penwidth=2];");
    assert_eq!(lines[2], "\"irc.example.net\" -- \"hubA\";");
    assert!(lines[3].starts_with("\"hubA\" -- \"leafB\" [label=\"2 hours\";color=\"0.00"));
    assert_eq!(lines[4], "\"hubA\" -- \"leafC\";");
    assert!(lines[5].starts_with("\"generated "));
    assert!(lines[5].ends_with(" seconds elapsed\" [shape=\"box\"];"));
    assert_eq!(lines[6], "}");
    assert_eq!(lines.len(), 7);
}

#[tokio::test]
async fn nothing_linked() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (_interrupt, shutdown) = oneshot::channel();

    harness
        .lines(&[
            WELCOME,
            ":irc.example.net 364 linkuptime irc.example.net irc.example.net :0 Self",
            ":irc.example.net 365 linkuptime * :End of /LINKS list.",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);
    assert_eq!(harness.sent(), ["LINKS", "QUIT :nuzzles u"]);

    let output = harness.output();
    assert!(!output.contains(" -- "));
    assert_eq!(output.lines().count(), 4);
}

#[tokio::test]
async fn waits_for_oper() {
    let options = LifecycleOptions {
        wait_oper: true,
        oper: Some(OperCredentials {
            name: "mapper".to_string(),
            password: "hunter2".to_string(),
        }),
    };
    let mut harness = Harness::new(RenderOptions::default(), options);

    let sink = RecordingSink::default();
    assert_eq!(harness.snapshot.handle_event(SessionEvent::Ready, &sink), None);
    assert_eq!(sink.sent(), ["OPER mapper hunter2"]);
    assert_eq!(harness.snapshot.driver().state(), DriverState::Start);

    let (_interrupt, shutdown) = oneshot::channel();
    harness
        .lines(&[
            ":irc.example.net 381 linkuptime :You are now an IRC operator",
            ":irc.example.net 381 linkuptime :You are now an IRC operator",
        ])
        .await;
    harness.lines(TOPOLOGY).await;
    harness
        .lines(&[
            ":irc.example.net 219 linkuptime l :End of /STATS report",
            ":hubA 219 linkuptime l :End of /STATS report",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);
    assert_eq!(
        harness.sent(),
        [
            "LINKS",
            "STATS l irc.example.net",
            "STATS l hubA",
            "QUIT :nuzzles u"
        ]
    );
}

#[tokio::test]
async fn oper_reply_ignored_without_wait() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (_interrupt, shutdown) = oneshot::channel();

    harness
        .lines(&[
            WELCOME,
            ":irc.example.net 381 linkuptime :You are now an IRC operator",
            ":irc.example.net 365 linkuptime * :End of /LINKS list.",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);
    assert_eq!(harness.sent(), ["LINKS", "QUIT :nuzzles u"]);
}

#[tokio::test]
async fn disconnect_stops_without_output() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (_interrupt, shutdown) = oneshot::channel();

    harness.lines(&[WELCOME]).await;
    harness.lines(&TOPOLOGY[..2]).await;
    harness
        .sender
        .send(ConnectionEvent::Error(ConnectionError::Closed))
        .await
        .unwrap();

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Disconnected);
    assert_eq!(harness.output(), "");
    assert_eq!(harness.sent(), ["LINKS"]);
}

#[tokio::test]
async fn closed_event_channel_is_disconnect() {
    let Harness {
        mut session,
        mut events,
        sender,
        mut snapshot,
    } = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    drop(sender);
    let (_interrupt, shutdown) = oneshot::channel();

    assert_eq!(
        snapshot.run(&mut session, &mut events, shutdown).await,
        ShutdownReason::Disconnected
    );
}

#[tokio::test]
async fn interrupted() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (interrupt, shutdown) = oneshot::channel();

    harness.lines(&[WELCOME]).await;
    interrupt.send(()).unwrap();

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Interrupted);
    assert_eq!(harness.output(), "");
}

#[tokio::test]
async fn dropped_interrupt_does_not_stop() {
    let mut harness = Harness::new(RenderOptions::default(), LifecycleOptions::default());
    let (interrupt, shutdown) = oneshot::channel::<()>();
    drop(interrupt);

    harness
        .lines(&[
            WELCOME,
            ":irc.example.net 365 linkuptime * :End of /LINKS list.",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);
}

#[tokio::test]
async fn dark_mode_snapshot() {
    let render = RenderOptions {
        style: Style::Dark,
        ..RenderOptions::default()
    };
    let mut harness = Harness::new(render, LifecycleOptions::default());
    let (_interrupt, shutdown) = oneshot::channel();

    harness.lines(&[WELCOME]).await;
    harness.lines(TOPOLOGY).await;
    harness
        .lines(&[
            ":hubA 219 linkuptime l :End of /STATS report",
            ":irc.example.net 219 linkuptime l :End of /STATS report",
        ])
        .await;

    assert_eq!(harness.run(shutdown).await, ShutdownReason::Complete);

    let output = harness.output();
    assert!(output.contains("bgcolor = black;\n"));
    assert_eq!(output.matches(" -- ").count(), 3);
}

#[test]
fn late_markers_do_not_render_twice() {
    let mut snapshot = LinkUptime::new(
        GraphRenderer::new("test", RenderOptions::default()),
        LifecycleOptions::default(),
        Vec::new(),
    );
    let sink = RecordingSink::default();
    let message = |raw: &str| {
        SessionEvent::Message(linkuptime_client::ServerMessage::parse(raw).unwrap())
    };

    snapshot.handle_event(SessionEvent::Ready, &sink);
    snapshot.handle_event(message(":s 364 me leaf hub :1 x"), &sink);
    snapshot.handle_event(message(":s 365 me * :End"), &sink);
    assert_eq!(
        snapshot.handle_event(message(":hub 219 me l :End"), &sink),
        Some(ShutdownReason::Complete)
    );
    let rendered = snapshot.output().len();

    for _ in 0..3 {
        assert_eq!(snapshot.handle_event(message(":hub 219 me l :End"), &sink), None);
    }
    assert_eq!(snapshot.output().len(), rendered);
    assert_eq!(sink.sent(), ["LINKS", "STATS l hub", "QUIT :nuzzles u"]);
}
