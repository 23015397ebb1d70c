//! The transport layer seen from the session.
//!
//! Connectivity checks happen inside the transports. The session only routes
//! remote candidates to them and reacts to what they report, which arrives as
//! [`TransportEvent`] via [`Input::Transport`][crate::Input::Transport].

use crate::Candidate;

/// Snapshot of a transport at the moment it reported an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    /// Content name the transport serves, i.e. `audio` or `video`.
    pub content: String,

    /// Whether the transport has any channels.
    pub has_channels: bool,

    /// Whether all channels of the transport are writable.
    pub writable: bool,
}

impl TransportStatus {
    /// Whether this transport should be supervised until it becomes writable.
    pub fn awaits_writable(&self) -> bool {
        self.has_channels && !self.writable
    }
}

/// Events reported by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport wants the session to be ready for signaling.
    ///
    /// Answered with [`Transports::signaling_ready`].
    RequestSignaling(TransportStatus),

    /// The transport started connecting.
    Connecting(TransportStatus),

    /// The writable state of the transport changed.
    Writable(TransportStatus),

    /// The transport gathered local candidates.
    CandidatesReady(Vec<Candidate>),

    /// A channel of the transport was destroyed.
    ChannelGone {
        /// Content name of the transport.
        content: String,
        /// Name of the channel that is gone.
        channel: String,
    },
}

/// The concrete transport behind a [`TransportProxy`].
pub trait TransportImpl {
    /// Start connectivity checks towards the remote candidates.
    fn accept_remote_candidates(&mut self, candidates: &[Candidate]);
}

/// Placeholder for a transport until negotiation resolves the concrete one.
pub trait TransportProxy {
    /// Whether negotiation completed.
    fn negotiated(&self) -> bool;

    /// Resolve the concrete transport. Only called when not [negotiated][Self::negotiated].
    fn complete_negotiation(&mut self);

    /// The concrete transport.
    fn implementation(&mut self) -> &mut dyn TransportImpl;
}

/// All transports of a session, looked up per content name.
pub trait Transports: Send {
    /// The proxy for `content`, if one exists.
    fn proxy(&mut self, content: &str) -> Option<&mut dyn TransportProxy>;

    /// Start connecting every transport channel to gather candidates early.
    fn connect_channels(&mut self);

    /// Answer to [`TransportEvent::RequestSignaling`].
    fn signaling_ready(&mut self, content: &str);
}
