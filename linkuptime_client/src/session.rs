use crate::*;

use tokio::sync::mpsc::Receiver;

/// Details sent to the server during registration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub nick: String,
    pub username: String,
    pub realname: String,
}

/// What the application gets to see of the inbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Registration completed (RPL_WELCOME)
    Ready,
    /// Any line not consumed by session housekeeping
    Message(ServerMessage),
    /// The connection has gone away; nothing further will arrive
    Disconnected,
}

/// A registered (or registering) client session on top of a [`MessageSink`].
///
/// Every line in either direction is traced as `<name> < <line>` or
/// `<name> > <line>`.
pub struct Session<S = Connection> {
    name: String,
    sink: S,
    nick: String,
    registered: bool,
    network: Option<String>,
}

impl Session<Connection> {
    /// Connect to a server and begin registration.
    pub async fn connect(
        name: impl ToString,
        params: &ConnectParams,
        registration: &Registration,
    ) -> Result<(Self, Receiver<ConnectionEvent>), ConnectionError> {
        let name = name.to_string();
        let (connection, events) = Connection::connect(&name, params).await?;

        let session = Self::new(name, connection, &registration.nick);
        session.register(registration);

        Ok((session, events))
    }

    /// Flush anything still queued, then close the connection.
    pub async fn close(self) {
        self.sink.close().await
    }
}

impl<S: MessageSink> Session<S> {
    pub fn new(name: impl ToString, sink: S, nick: &str) -> Self {
        Self {
            name: name.to_string(),
            sink,
            nick: nick.to_string(),
            registered: false,
            network: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nickname most recently requested
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// The network name advertised in ISUPPORT, if any has been seen
    pub fn network_name(&self) -> Option<&str> {
        self.network.as_deref()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send `NICK` and `USER`
    pub fn register(&self, registration: &Registration) {
        self.send(OutboundMessage::new("NICK", [&self.nick]));
        self.send(OutboundMessage::new(
            "USER",
            [
                registration.username.as_str(),
                "0",
                "*",
                registration.realname.as_str(),
            ],
        ));
    }

    /// Deal with one event from the connection, returning whatever the
    /// application needs to know about it.
    pub fn process(&mut self, event: ConnectionEvent) -> Option<SessionEvent> {
        let raw = match event {
            ConnectionEvent::Message(raw) => raw,
            ConnectionEvent::Error(ConnectionError::Closed) => {
                tracing::info!("{} disconnected", self.name);
                return Some(SessionEvent::Disconnected);
            }
            ConnectionEvent::Error(e) => {
                tracing::warn!("{} disconnected: {}", self.name, e);
                return Some(SessionEvent::Disconnected);
            }
        };

        tracing::info!("{} < {}", self.name, raw);

        let msg = ServerMessage::parse(&raw)?;

        match msg.command.as_str() {
            "PING" => {
                self.send(OutboundMessage::new("PONG", msg.args));
                None
            }
            "001" => {
                self.registered = true;
                Some(SessionEvent::Ready)
            }
            "005" => {
                if let Some(network) = isupport_network(&msg.args) {
                    tracing::info!("{} connected to {}", self.name, network);
                    self.network = Some(network.to_string());
                }
                Some(SessionEvent::Message(msg))
            }
            "433" if !self.registered => {
                self.nick.push('_');
                self.send(OutboundMessage::new("NICK", [&self.nick]));
                None
            }
            _ => Some(SessionEvent::Message(msg)),
        }
    }
}

impl<S: MessageSink> MessageSink for Session<S> {
    fn send(&self, msg: OutboundMessage) {
        tracing::info!("{} > {}", self.name, msg);
        self.sink.send(msg);
    }
}

// The first and last arguments of RPL_ISUPPORT are our nick and the trailing
// "are supported" text; everything between is a token.
fn isupport_network(args: &[String]) -> Option<&str> {
    let tokens = args.get(1..args.len().saturating_sub(1))?;
    tokens.iter().find_map(|t| t.strip_prefix("NETWORK="))
}
