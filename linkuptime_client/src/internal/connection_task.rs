use crate::internal::*;
use crate::ConnectionError;

use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    select,
    sync::mpsc::{Receiver, Sender},
};

/// Services one socket for its whole life.
///
/// Queued lines are written in order, each followed by CRLF. Inbound lines
/// are forwarded in the order they arrive. However the task stops, the last
/// event it sends is `Error(Closed)`.
pub struct ConnectionTask<S> {
    name: String,
    stream: S,
    control: Receiver<ConnectionControlDetail>,
    events: Sender<ConnectionEvent>,
}

impl<S> ConnectionTask<S>
where
    S: AsyncRead + AsyncWrite,
{
    pub fn new(
        name: String,
        stream: S,
        control: Receiver<ConnectionControlDetail>,
        events: Sender<ConnectionEvent>,
    ) -> Self {
        Self {
            name,
            stream,
            control,
            events,
        }
    }

    pub async fn run(self) {
        let Self {
            name,
            stream,
            mut control,
            events,
        } = self;

        let (reader, mut writer) = tokio::io::split(stream);
        let mut lines = LineReader::new(reader);

        let ended = loop {
            select! {
                detail = control.recv() => match detail {
                    Some(ConnectionControlDetail::Send(line)) => {
                        if let Err(e) = write_line(&mut writer, &line).await {
                            break ConnectionError::from(e);
                        }
                    }
                    Some(ConnectionControlDetail::Close) | None => break ConnectionError::Closed,
                },
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if events.send(ConnectionEvent::Message(line)).await.is_err() {
                            break ConnectionError::Closed;
                        }
                    }
                    Ok(None) => break ConnectionError::Closed,
                    Err(e) => break ConnectionError::from(e),
                },
            }
        };

        match &ended {
            ConnectionError::Closed => tracing::info!("{} closed", name),
            e => tracing::warn!("{} closed: {}", name, e),
        }

        if let Err(e) = writer.shutdown().await {
            tracing::debug!("{} shutdown: {}", name, e);
        }

        if ended != ConnectionError::Closed {
            let _ = events.send(ConnectionEvent::Error(ended)).await;
        }
        if events
            .send(ConnectionEvent::Error(ConnectionError::Closed))
            .await
            .is_err()
        {
            tracing::debug!("Nobody listening for close of {}", name);
        }
    }
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::{
        io::{duplex, AsyncReadExt, DuplexStream},
        sync::mpsc::channel,
        task::JoinHandle,
    };

    struct Running {
        control: Sender<ConnectionControlDetail>,
        events: Receiver<ConnectionEvent>,
        task: JoinHandle<()>,
        peer: DuplexStream,
    }

    fn spawn_task() -> Running {
        let (ours, peer) = duplex(4096);
        let (control, control_recv) = channel(16);
        let (event_send, events) = channel(16);
        let task = tokio::spawn(
            ConnectionTask::new("test".to_string(), ours, control_recv, event_send).run(),
        );

        Running {
            control,
            events,
            task,
            peer,
        }
    }

    fn message(line: &str) -> ConnectionEvent {
        ConnectionEvent::Message(line.to_string())
    }

    #[tokio::test]
    async fn close_flushes_queued_lines() {
        let Running {
            control,
            mut events,
            task,
            mut peer,
        } = spawn_task();

        for line in ["STATS l hubA", "QUIT :nuzzles u"] {
            control
                .send(ConnectionControlDetail::Send(line.to_string()))
                .await
                .unwrap();
        }
        control.send(ConnectionControlDetail::Close).await.unwrap();
        task.await.unwrap();

        let mut written = String::new();
        peer.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "STATS l hubA\r\nQUIT :nuzzles u\r\n");

        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Error(ConnectionError::Closed))
        );
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn inbound_lines_in_order_then_closed() {
        let Running {
            control: _control,
            mut events,
            task,
            mut peer,
        } = spawn_task();

        peer.write_all(b":hub 364 me leaf hub :1 caf\xe9 server\r\n")
            .await
            .unwrap();
        peer.write_all(b":hub 365 me * :End of /LINKS list.\r\nPING :hub\r\n")
            .await
            .unwrap();
        drop(peer);

        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            received.push(event);
        }
        task.await.unwrap();

        assert_eq!(
            received,
            [
                message(":hub 364 me leaf hub :1 caf\u{FFFD} server"),
                message(":hub 365 me * :End of /LINKS list."),
                message("PING :hub"),
                ConnectionEvent::Error(ConnectionError::Closed),
            ]
        );
    }

    #[tokio::test]
    async fn dropped_connection_closes_task() {
        let Running {
            control,
            mut events,
            task,
            peer: _peer,
        } = spawn_task();

        drop(control);
        task.await.unwrap();

        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Error(ConnectionError::Closed))
        );
    }
}
