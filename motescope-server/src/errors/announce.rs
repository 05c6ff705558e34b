use motescope_api::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnounceError {
    #[error("Mote bridge is not connected")]
    NotConnected,

    #[error("Mote bridge has shut down")]
    Closed,

    #[error("Cannot send message to mote: {0}")]
    Transport(#[from] TransportError),
}
