//! Session descriptions exchanged in the OFFER/ANSWER dance.
//!
//! The textual SDP form is produced and parsed elsewhere. These types are the
//! structured model both sides negotiate over, and they serialize with serde for
//! whatever signaling channel carries them.

use serde::{Deserialize, Serialize};

use crate::media::MediaKind;
use crate::Candidate;

mod factory;
pub use factory::{DescriptionFactory, MediaDescriptionFactory};
pub use factory::{MediaSessionOptions, SecurePolicy, StreamOptions};

/// Role of a [`SessionDescription`] in the negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    /// A proposal.
    Offer,
    /// A provisional answer.
    PrAnswer,
    /// The final answer.
    Answer,
}

/// One media stream sent in a content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    /// Stream (track) id.
    pub id: String,
    /// Label of the stream this track is synchronized with.
    pub sync_label: String,
    /// SSRCs used to send the stream.
    pub ssrcs: Vec<u32>,
}

/// Description of one content (one m-line).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaContent {
    /// Streams sent in the content. Empty means nothing is sent.
    pub streams: Vec<StreamParams>,
    /// Whether RTP and RTCP share one transport channel.
    pub rtcp_mux: bool,
    /// Whether the content is protected with SRTP.
    pub crypto: bool,
}

/// A named content of a [`SessionDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentInfo {
    /// Content name, i.e. `audio` or `video`.
    pub name: String,
    /// Media kind carried.
    pub kind: MediaKind,
    /// Set when an answer declines the content.
    pub rejected: bool,
    /// The media description.
    pub description: MediaContent,
}

/// A complete session description, one per OFFER or ANSWER.
///
/// Descriptions are built once, by a [`DescriptionFactory`] or a remote peer,
/// and then handed to the [`Session`][crate::Session] which owns them. Setting a new
/// description drops the previous one.
///
/// ```
/// # use rtc_session::sdp::{SessionDescription, SdpType};
/// let desc = SessionDescription::new(SdpType::Offer, "4711", "1", vec![]);
/// let json = serde_json::to_string(&desc).unwrap();
///
/// let back: SessionDescription = serde_json::from_str(&json).unwrap();
/// assert_eq!(desc, back);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DescriptionData")]
pub struct SessionDescription {
    sdp_type: SdpType,
    session_id: String,
    session_version: String,
    contents: Vec<ContentInfo>,
    /// Candidates per media section, index aligned with `contents`.
    candidates: Vec<Vec<Candidate>>,
}

/// Wire form of [`SessionDescription`]. Candidates may be missing or misaligned.
#[derive(Deserialize)]
struct DescriptionData {
    sdp_type: SdpType,
    session_id: String,
    session_version: String,
    contents: Vec<ContentInfo>,
    #[serde(default)]
    candidates: Vec<Vec<Candidate>>,
}

impl From<DescriptionData> for SessionDescription {
    fn from(d: DescriptionData) -> Self {
        let mut candidates = d.candidates;
        if candidates.len() != d.contents.len() {
            debug!(
                "Align {} candidate lists to {} media sections",
                candidates.len(),
                d.contents.len()
            );
            candidates.resize(d.contents.len(), vec![]);
        }

        SessionDescription {
            sdp_type: d.sdp_type,
            session_id: d.session_id,
            session_version: d.session_version,
            contents: d.contents,
            candidates,
        }
    }
}

impl SessionDescription {
    /// Creates a new description from its contents.
    pub fn new(
        sdp_type: SdpType,
        session_id: impl Into<String>,
        session_version: impl Into<String>,
        contents: Vec<ContentInfo>,
    ) -> Self {
        let candidates = vec![vec![]; contents.len()];
        SessionDescription {
            sdp_type,
            session_id: session_id.into(),
            session_version: session_version.into(),
            contents,
            candidates,
        }
    }

    /// Offer or answer.
    pub fn sdp_type(&self) -> SdpType {
        self.sdp_type
    }

    /// The session id of the SDP origin.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The session version of the SDP origin.
    pub fn session_version(&self) -> &str {
        &self.session_version
    }

    /// All contents in m-line order.
    pub fn contents(&self) -> &[ContentInfo] {
        &self.contents
    }

    /// Content by name.
    pub fn content(&self, name: &str) -> Option<&ContentInfo> {
        self.contents.iter().find(|c| c.name == name)
    }

    /// First content of the media kind.
    pub fn first_content(&self, kind: MediaKind) -> Option<&ContentInfo> {
        self.contents.iter().find(|c| c.kind == kind)
    }

    /// First audio content.
    pub fn first_audio_content(&self) -> Option<&ContentInfo> {
        self.first_content(MediaKind::Audio)
    }

    /// First video content.
    pub fn first_video_content(&self) -> Option<&ContentInfo> {
        self.first_content(MediaKind::Video)
    }

    /// Number of media sections (m-lines).
    pub fn number_of_mediasections(&self) -> usize {
        self.contents.len()
    }

    /// Add a candidate to the media section at `mline_index`.
    ///
    /// Returns `false` if there is no such media section or the candidate is
    /// already present.
    pub fn add_candidate(&mut self, mline_index: usize, candidate: Candidate) -> bool {
        let Some(list) = self.candidates.get_mut(mline_index) else {
            warn!("No media section at index {}", mline_index);
            return false;
        };

        if list.contains(&candidate) {
            return false;
        }

        list.push(candidate);
        true
    }

    /// Candidates of the media section at `mline_index`.
    pub fn candidates(&self, mline_index: usize) -> Option<&[Candidate]> {
        self.candidates.get(mline_index).map(|v| v.as_slice())
    }

    /// All candidates of all media sections, in m-line order.
    pub fn all_candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().flatten()
    }
}
