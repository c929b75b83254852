use crate::ClientCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the status poller. Emitted at most once per page.
    StopPolling,
    /// POST the termination command to the finish endpoint.
    SendFinishRequest,
    /// Write a command frame on the event stream.
    SendStreamCommand(ClientCommand),
    /// Blocking notification the user has to acknowledge.
    NotifyUser { message: String },
}
