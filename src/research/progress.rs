use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Side-channel notification emitted while a research call is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    Status { content: String },
}

pub type ProgressSink = UnboundedSender<ProgressEvent>;

/// Sends `event` if a sink is attached. A dropped receiver is not an error.
pub fn emit(sink: Option<&ProgressSink>, event: ProgressEvent) {
    if let Some(sink) = sink
        && sink.send(event).is_err()
    {
        debug!("progress receiver dropped");
    }
}
