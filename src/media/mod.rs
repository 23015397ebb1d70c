//! Media channels and the channel manager that creates them.
//!
//! Encoding, decoding, capture and rendering all happen behind these traits.
//! The session only creates, enables, mutes and destroys channels, and wires
//! capturers and renderers to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ice::{CHANNEL_VIDEO_RTCP, CHANNEL_VIDEO_RTP};
use crate::SessionId;

mod channels;
pub(crate) use channels::MediaChannels;

/// Content name of the audio media section.
pub const CN_AUDIO: &str = "audio";

/// Content name of the video media section.
pub const CN_VIDEO: &str = "video";

/// Kind of media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio media.
    Audio,
    /// Video media.
    Video,
}

impl MediaKind {
    /// The content name used for this media kind in descriptions and transports.
    pub fn content_name(&self) -> &'static str {
        match self {
            MediaKind::Audio => CN_AUDIO,
            MediaKind::Video => CN_VIDEO,
        }
    }

    /// Classify a transport channel name.
    ///
    /// `video_rtp` and `video_rtcp` are video, anything else is audio.
    pub fn for_channel_name(name: &str) -> MediaKind {
        if name == CHANNEL_VIDEO_RTP || name == CHANNEL_VIDEO_RTCP {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content_name())
    }
}

/// Common controls of a voice or video channel.
pub trait MediaChannel: Send {
    /// Start or stop sending and receiving media.
    fn enable(&mut self, enabled: bool);

    /// Mute or unmute the send side.
    fn mute(&mut self, muted: bool);
}

/// A channel carrying audio.
pub trait VoiceChannel: MediaChannel {}

/// A channel carrying video.
pub trait VideoChannel: MediaChannel {
    /// Render the remote video of the stream with `ssrc`.
    fn set_renderer(&mut self, ssrc: u32, renderer: Box<dyn VideoRenderer>);

    /// Render the local (captured) video of the stream with `ssrc`.
    fn set_local_renderer(&mut self, ssrc: u32, renderer: Box<dyn VideoRenderer>);
}

/// A decoded video frame handed to a [`VideoRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Capture time in nanoseconds.
    pub time_stamp_ns: i64,
    /// I420 pixel data.
    pub data: Vec<u8>,
}

/// Sink for decoded video.
pub trait VideoRenderer: Send {
    /// Called when the video size changes. Returns `false` if the size is unsupported.
    fn set_size(&mut self, width: u32, height: u32) -> bool;

    /// Called for every frame. Returns `false` if the frame could not be rendered.
    fn render_frame(&mut self, frame: &VideoFrame) -> bool;
}

/// Source of captured video, typically a camera.
pub trait VideoCapturer: Send {
    /// Name of the capture device.
    fn device_name(&self) -> &str;
}

/// Outcome of starting or stopping video capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureResult {
    /// Capture is running.
    Success,
    /// Capture is starting asynchronously.
    Pending,
    /// Capture failed.
    Failure,
    /// There is no capture device set.
    NoDevice,
}

impl CaptureResult {
    /// Whether capture is running or about to.
    pub fn is_started(&self) -> bool {
        matches!(self, CaptureResult::Success | CaptureResult::Pending)
    }
}

/// Creates and destroys media channels for sessions.
///
/// Channels are exclusively owned by the session that asked for them and are
/// handed back to the manager when destroyed.
pub trait ChannelManager: Send {
    /// Create a voice channel for the `content_name` of the session.
    ///
    /// Returns `None` if the channel can't be created.
    fn create_voice_channel(
        &mut self,
        session_id: SessionId,
        content_name: &str,
        rtcp: bool,
    ) -> Option<Box<dyn VoiceChannel>>;

    /// Create a video channel paired with `voice` so both share transport.
    ///
    /// Returns `None` if the channel can't be created.
    fn create_video_channel(
        &mut self,
        session_id: SessionId,
        content_name: &str,
        rtcp: bool,
        voice: &dyn VoiceChannel,
    ) -> Option<Box<dyn VideoChannel>>;

    /// Release a voice channel.
    fn destroy_voice_channel(&mut self, channel: Box<dyn VoiceChannel>);

    /// Release a video channel.
    fn destroy_video_channel(&mut self, channel: Box<dyn VideoChannel>);

    /// Use `capturer` as the video source of the stream with `ssrc`.
    ///
    /// Returns `false` if the capturer was not accepted.
    fn set_video_capturer(&mut self, capturer: Box<dyn VideoCapturer>, ssrc: u32) -> bool;

    /// Start or stop video capture.
    fn set_video_capture(&mut self, capture: bool) -> CaptureResult;
}
