use crate::OutboundMessage;

/// Anything that outbound protocol messages can be handed to
pub trait MessageSink {
    /// Queue `msg` for sending. Failures are the sink's to report.
    fn send(&self, msg: OutboundMessage);
}

impl<T: MessageSink + ?Sized> MessageSink for &T {
    fn send(&self, msg: OutboundMessage) {
        (**self).send(msg)
    }
}
