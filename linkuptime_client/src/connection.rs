use crate::internal::*;
use crate::*;

use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore, ServerName};
use std::{convert::TryFrom, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc::{channel, Receiver, Sender},
    task::JoinHandle,
};
use tokio_rustls::TlsConnector;

const SEND_QUEUE_LEN: usize = 512;
const EVENT_QUEUE_LEN: usize = 512;

/// Where and how to connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

/// The sending half of a connection to a server.
///
/// Received lines are delivered through the [`ConnectionEvent`] receiver
/// returned by [`Connection::connect`].
pub struct Connection {
    pub name: String,
    control_channel: Sender<ConnectionControlDetail>,
    task: JoinHandle<()>,
}

impl Connection {
    /// Open a connection and spawn the task that services it.
    pub async fn connect(
        name: impl ToString,
        params: &ConnectParams,
    ) -> Result<(Self, Receiver<ConnectionEvent>), ConnectionError> {
        let name = name.to_string();

        let stream = TcpStream::connect((params.host.as_str(), params.port)).await?;
        tracing::debug!("{} connected to {}:{}", name, params.host, params.port);

        if params.tls {
            let server_name = ServerName::try_from(params.host.as_str())
                .map_err(|_| ConnectionError::InvalidServerName(params.host.clone()))?;
            let connector = TlsConnector::from(Arc::new(tls_client_config()));
            let tls_stream = connector.connect(server_name, stream).await?;
            tracing::debug!("{} completed TLS handshake", name);

            Ok(Self::spawn(name, tls_stream))
        } else {
            Ok(Self::spawn(name, stream))
        }
    }

    /// Hand an established stream to a new connection task.
    pub(crate) fn spawn<S>(name: String, stream: S) -> (Self, Receiver<ConnectionEvent>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (control_send, control_recv) = channel(SEND_QUEUE_LEN);
        let (event_send, event_recv) = channel(EVENT_QUEUE_LEN);

        let task = tokio::spawn(
            ConnectionTask::new(name.clone(), stream, control_recv, event_send).run(),
        );

        let connection = Self {
            name,
            control_channel: control_send,
            task,
        };
        (connection, event_recv)
    }

    /// Queue the provided line to be written to the socket
    pub fn send_line(&self, line: String) -> Result<(), ConnectionError> {
        Ok(self
            .control_channel
            .try_send(ConnectionControlDetail::Send(line))?)
    }

    /// Close the connection once everything already queued has been written,
    /// and wait for the connection task to finish.
    pub async fn close(self) {
        if self
            .control_channel
            .send(ConnectionControlDetail::Close)
            .await
            .is_err()
        {
            tracing::debug!("{} was already closed", self.name);
        }
        if let Err(e) = self.task.await {
            tracing::error!("Error joining connection task for {}: {}", self.name, e);
        }
    }
}

fn tls_client_config() -> ClientConfig {
    let mut root_store = RootCertStore::empty();
    root_store.add_server_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.0.iter().map(|ta| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(ta.subject, ta.spki, ta.name_constraints)
    }));

    ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

impl MessageSink for Connection {
    fn send(&self, msg: OutboundMessage) {
        if let Err(e) = self.send_line(msg.format()) {
            tracing::error!("Error sending to {}: {}", self.name, e);
        }
    }
}
