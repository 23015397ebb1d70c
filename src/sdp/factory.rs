use crate::id::{SessionId, Ssrc};
use crate::media::MediaKind;

use super::{ContentInfo, MediaContent, SdpType, SessionDescription, StreamParams};

/// Whether media must be protected with SRTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurePolicy {
    /// Never offer or accept crypto.
    Disabled,
    /// Offer crypto, accept media without it.
    Enabled,
    /// Offer crypto, reject media without it.
    #[default]
    Required,
}

/// A stream the local side wants to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Media kind of the stream.
    pub kind: MediaKind,
    /// Stream (track) id.
    pub id: String,
    /// Label of the stream this track is synchronized with.
    pub sync_label: String,
}

/// What the local side wants from an offer or answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSessionOptions {
    /// Whether to receive (and possibly send) audio.
    pub has_audio: bool,
    /// Whether to receive (and possibly send) video.
    pub has_video: bool,
    /// Streams to send.
    pub streams: Vec<StreamOptions>,
}

impl Default for MediaSessionOptions {
    fn default() -> Self {
        MediaSessionOptions {
            has_audio: true,
            has_video: false,
            streams: vec![],
        }
    }
}

impl MediaSessionOptions {
    /// Audio only, nothing to send.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also ask for video.
    pub fn with_video(mut self) -> Self {
        self.has_video = true;
        self
    }

    /// Add a stream to send. Adding a video stream implies `has_video`.
    ///
    /// ```
    /// # use rtc_session::sdp::MediaSessionOptions;
    /// # use rtc_session::media::MediaKind;
    /// let opts = MediaSessionOptions::new().add_stream(MediaKind::Video, "cam", "local");
    /// assert!(opts.has_video);
    /// ```
    pub fn add_stream(
        mut self,
        kind: MediaKind,
        id: impl Into<String>,
        sync_label: impl Into<String>,
    ) -> Self {
        match kind {
            MediaKind::Audio => self.has_audio = true,
            MediaKind::Video => self.has_video = true,
        }
        self.streams.push(StreamOptions {
            kind,
            id: id.into(),
            sync_label: sync_label.into(),
        });
        self
    }

    fn wants(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.has_audio,
            MediaKind::Video => self.has_video,
        }
    }
}

/// Builds offers and answers. Has no side effects on the session.
pub trait DescriptionFactory: Send {
    /// Set the SRTP policy for descriptions created from now on.
    fn set_secure(&mut self, policy: SecurePolicy);

    /// Create an offer, using the current local description as baseline.
    fn create_offer(
        &self,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> SessionDescription;

    /// Create an answer to `remote`, using the current local description as baseline.
    fn create_answer(
        &self,
        remote: &SessionDescription,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> SessionDescription;
}

/// The default [`DescriptionFactory`].
///
/// Produces one audio and one video content at most, each sending the streams
/// of the options with one SSRC per stream.
#[derive(Debug, Default)]
pub struct MediaDescriptionFactory {
    secure: SecurePolicy,
}

impl MediaDescriptionFactory {
    /// Creates a factory with [`SecurePolicy::Required`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current SRTP policy.
    pub fn secure(&self) -> SecurePolicy {
        self.secure
    }

    fn media_content(
        &self,
        kind: MediaKind,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> MediaContent {
        let previous = current.and_then(|c| c.first_content(kind));

        let streams = options
            .streams
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| {
                // Keep SSRCs stable across renegotiation.
                let ssrcs = previous
                    .and_then(|p| p.description.streams.iter().find(|x| x.id == s.id))
                    .map(|x| x.ssrcs.clone())
                    .unwrap_or_else(|| vec![*Ssrc::new()]);

                StreamParams {
                    id: s.id.clone(),
                    sync_label: s.sync_label.clone(),
                    ssrcs,
                }
            })
            .collect();

        MediaContent {
            streams,
            rtcp_mux: true,
            crypto: self.secure != SecurePolicy::Disabled,
        }
    }
}

fn origin(current: Option<&SessionDescription>) -> (String, String) {
    let Some(current) = current else {
        return (SessionId::new().to_string(), "1".to_string());
    };

    // Restart at 1 on garbage or overflow.
    let version = current
        .session_version()
        .parse::<u64>()
        .ok()
        .and_then(|v| v.checked_add(1))
        .unwrap_or(1);

    (current.session_id().to_string(), version.to_string())
}

impl DescriptionFactory for MediaDescriptionFactory {
    fn set_secure(&mut self, policy: SecurePolicy) {
        self.secure = policy;
    }

    fn create_offer(
        &self,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> SessionDescription {
        let contents = [MediaKind::Audio, MediaKind::Video]
            .into_iter()
            .filter(|k| options.wants(*k))
            .map(|kind| ContentInfo {
                name: kind.content_name().to_string(),
                kind,
                rejected: false,
                description: self.media_content(kind, options, current),
            })
            .collect();

        let (id, version) = origin(current);
        SessionDescription::new(SdpType::Offer, id, version, contents)
    }

    fn create_answer(
        &self,
        remote: &SessionDescription,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> SessionDescription {
        let contents = remote
            .contents()
            .iter()
            .map(|rc| {
                let insecure = self.secure == SecurePolicy::Required && !rc.description.crypto;
                if insecure {
                    warn!("Reject {} content without crypto", rc.name);
                }

                let rejected = rc.rejected || !options.wants(rc.kind) || insecure;

                let description = if rejected {
                    MediaContent::default()
                } else {
                    let mut d = self.media_content(rc.kind, options, current);
                    d.rtcp_mux = rc.description.rtcp_mux;
                    d.crypto = d.crypto && rc.description.crypto;
                    d
                };

                ContentInfo {
                    name: rc.name.clone(),
                    kind: rc.kind,
                    rejected,
                    description,
                }
            })
            .collect();

        let (id, version) = origin(current);
        SessionDescription::new(SdpType::Answer, id, version, contents)
    }
}
