use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::media::MediaKind;
use crate::util::Pii;
use crate::SessionError;

/// Transport channel name of audio RTP.
pub const CHANNEL_RTP: &str = "rtp";

/// Transport channel name of audio RTCP.
pub const CHANNEL_RTCP: &str = "rtcp";

/// Transport channel name of video RTP.
pub const CHANNEL_VIDEO_RTP: &str = "video_rtp";

/// Transport channel name of video RTCP.
pub const CHANNEL_VIDEO_RTCP: &str = "video_rtcp";

/// ICE candidates are network addresses used to connect to a peer.
///
/// Every candidate belongs to one named transport channel (see [`CHANNEL_RTP`] and
/// friends). The session keeps at most one local candidate per channel name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Name of the transport channel, i.e. `rtp`, `rtcp`, `video_rtp` or `video_rtcp`.
    name: String,

    /// Protocol for the candidate.
    proto: Protocol,

    /// The actual address to use. This might be a host address, server reflex, relay etc.
    addr: SocketAddr,

    /// Priority.
    ///
    /// For remote, this is communicated, and locally it's calculated.
    prio: Option<u32>,

    /// Type of candidate.
    kind: CandidateKind,

    /// ICE username fragment.
    username: Option<String>,

    /// ICE password.
    password: Option<String>,

    /// Increased on every ICE restart.
    generation: u32,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Candidate({} {}={}/{} prio={}",
            self.name,
            self.kind,
            Pii(self.addr),
            self.proto,
            self.prio()
        )?;
        if let Some(ufrag) = &self.username {
            write!(f, " ufrag={}", Pii(ufrag))?;
        }
        if self.generation > 0 {
            write!(f, " gen={}", self.generation)?;
        }
        write!(f, ")")
    }
}

impl Candidate {
    fn new(name: String, proto: Protocol, addr: SocketAddr, kind: CandidateKind) -> Self {
        Candidate {
            name,
            proto,
            addr,
            prio: None,
            kind,
            username: None,
            password: None,
            generation: 0,
        }
    }

    /// Creates a host ICE candidate.
    ///
    /// Host candidates are local sockets directly on the host.
    ///
    /// ```
    /// # use rtc_session::{Candidate, CandidateKind};
    /// let addr = "192.168.1.2:5000".parse().unwrap();
    /// let c = Candidate::host("rtp", addr, "udp").unwrap();
    ///
    /// assert_eq!(c.kind(), CandidateKind::Host);
    /// assert_eq!(c.component_id(), 1);
    /// ```
    pub fn host(
        name: impl Into<String>,
        addr: SocketAddr,
        proto: impl TryInto<Protocol>,
    ) -> Result<Self, SessionError> {
        Self::checked(name.into(), addr, proto, CandidateKind::Host)
    }

    /// Creates a server reflexive ICE candidate.
    ///
    /// Server reflexive candidates are local sockets mapped to an external ip discovered
    /// via a STUN binding request.
    pub fn server_reflexive(
        name: impl Into<String>,
        addr: SocketAddr,
        proto: impl TryInto<Protocol>,
    ) -> Result<Self, SessionError> {
        Self::checked(name.into(), addr, proto, CandidateKind::ServerReflexive)
    }

    /// Creates a relayed ICE candidate.
    ///
    /// Relayed candidates are server sockets (TURN allocations) relaying traffic to a
    /// local socket.
    pub fn relayed(
        name: impl Into<String>,
        addr: SocketAddr,
        proto: impl TryInto<Protocol>,
    ) -> Result<Self, SessionError> {
        Self::checked(name.into(), addr, proto, CandidateKind::Relayed)
    }

    fn checked(
        name: String,
        addr: SocketAddr,
        proto: impl TryInto<Protocol>,
        kind: CandidateKind,
    ) -> Result<Self, SessionError> {
        if name.is_empty() {
            return Err(SessionError::BadCandidate("empty channel name".into()));
        }

        if !is_valid_ip(addr.ip()) {
            return Err(SessionError::BadCandidate(format!(
                "invalid ip {}",
                Pii(addr.ip())
            )));
        }

        let proto = proto
            .try_into()
            .map_err(|_| SessionError::BadCandidate("invalid protocol".into()))?;

        Ok(Candidate::new(name, proto, addr, kind))
    }

    /// Sets an explicit priority, as communicated by a remote peer.
    pub fn with_prio(mut self, prio: u32) -> Self {
        self.prio = Some(prio);
        self
    }

    /// Sets the ICE credentials this candidate was gathered under.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the ICE generation.
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Name of the transport channel this candidate belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The media kind that owns the transport channel.
    ///
    /// Only the two video channel names are video, everything else is audio.
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::for_channel_name(&self.name)
    }

    /// ICE component. 1 for RTP, 2 for RTCP.
    pub fn component_id(&self) -> u16 {
        if self.name.ends_with(CHANNEL_RTCP) {
            2
        } else {
            1
        }
    }

    /// Returns the priority value for this candidate.
    ///
    /// The priority is a positive integer between 1 and 2^31 - 1 (inclusive), calculated
    /// according to RFC 8445, Section 5.1.2, unless set explicitly.
    pub fn prio(&self) -> u32 {
        if let Some(prio) = self.prio {
            return prio;
        }

        // RFC 8445 recommends 126 for host, 110 for peer-reflexive, 100 for
        // server-reflexive and 0 for relayed. Non-UDP variations as in libwebrtc.
        let type_preference = match (self.kind, self.proto) {
            (CandidateKind::Host, Protocol::Udp) => 126,
            (CandidateKind::PeerReflexive, Protocol::Udp) => 110,
            (CandidateKind::ServerReflexive, _) => 100,
            (CandidateKind::Host, _) => 90,
            (CandidateKind::PeerReflexive, _) => 80,
            (CandidateKind::Relayed, Protocol::Udp) => 2,
            (CandidateKind::Relayed, Protocol::Tcp) => 1,
            (CandidateKind::Relayed, _) => 0,
        };

        let local_preference: u32 = if self.addr.is_ipv6() { 65_535 } else { 65_534 };

        // priority = (2^24)*(type preference) +
        //     (2^8)*(local preference) +
        //     (2^0)*(256 - component ID)
        type_preference << 24 | local_preference << 8 | (256 - self.component_id() as u32)
    }

    /// Returns the address of this candidate.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the transport protocol of this candidate.
    pub fn proto(&self) -> Protocol {
        self.proto
    }

    /// Returns the kind of this candidate.
    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    /// ICE username fragment, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// ICE password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// ICE generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Type of candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    /// Host (local network interface)
    Host,
    /// Prflx (Peer reflexive)
    PeerReflexive,
    /// Srflx (STUN)
    ServerReflexive,
    /// Relay (TURN)
    Relayed,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            CandidateKind::Host => "host",
            CandidateKind::PeerReflexive => "prflx",
            CandidateKind::ServerReflexive => "srflx",
            CandidateKind::Relayed => "relay",
        };
        write!(f, "{x}")
    }
}

/// Type of protocol used in a [`Candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// UDP
    Udp,
    /// TCP (See RFC 4571 for framing)
    Tcp,
    /// TCP with fixed SSL Hello Exchange
    SslTcp,
    /// TLS (only used via relay)
    Tls,
}

impl Protocol {
    /// Returns the protocol as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::SslTcp => "ssltcp",
            Protocol::Tls => "tls",
        }
    }
}

impl TryFrom<&str> for Protocol {
    type Error = ();

    fn try_from(proto: &str) -> Result<Self, Self::Error> {
        let proto = proto.to_lowercase();
        match proto.as_str() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            "ssltcp" => Ok(Protocol::SslTcp),
            "tls" => Ok(Protocol::Tls),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_valid_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v) => {
            !v.is_link_local() && !v.is_broadcast() && !v.is_multicast() && !v.is_unspecified()
        }
        IpAddr::V6(v) => !v.is_multicast() && !v.is_unspecified(),
    }
}
