use crate::{SessionError, SessionId};

use super::{ChannelManager, MediaKind, VideoChannel, VoiceChannel};

/// The voice and video channel of a session.
///
/// Both are created together by [`MediaChannels::create`] and destroyed
/// together by [`MediaChannels::destroy`]. The session is only usable for
/// media when both are present.
#[derive(Default)]
pub(crate) struct MediaChannels {
    voice: Option<Box<dyn VoiceChannel>>,
    video: Option<Box<dyn VideoChannel>>,
}

impl MediaChannels {
    /// Create the voice channel, then the video channel paired with it.
    ///
    /// A voice channel created before a failing video channel is kept. It is
    /// released by [`MediaChannels::destroy`].
    pub fn create(
        &mut self,
        manager: &mut dyn ChannelManager,
        session_id: SessionId,
        rtcp: bool,
    ) -> Result<(), SessionError> {
        let content = MediaKind::Audio.content_name();
        let Some(voice) = manager.create_voice_channel(session_id, content, rtcp) else {
            error!("Failed to create voice channel");
            return Err(SessionError::ChannelCreation(MediaKind::Audio));
        };
        let voice = self.voice.insert(voice);

        let content = MediaKind::Video.content_name();
        let Some(video) = manager.create_video_channel(session_id, content, rtcp, &**voice) else {
            error!("Failed to create video channel");
            return Err(SessionError::ChannelCreation(MediaKind::Video));
        };
        self.video = Some(video);

        debug!("Created voice and video channel (rtcp: {})", rtcp);
        Ok(())
    }

    /// Destroy the channels that exist. Absent channels are skipped.
    pub fn destroy(&mut self, manager: &mut dyn ChannelManager) {
        if let Some(voice) = self.voice.take() {
            debug!("Destroy voice channel");
            manager.destroy_voice_channel(voice);
        }
        if let Some(video) = self.video.take() {
            debug!("Destroy video channel");
            manager.destroy_video_channel(video);
        }
    }

    pub fn has(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.voice.is_some(),
            MediaKind::Video => self.video.is_some(),
        }
    }

    pub fn has_any(&self) -> bool {
        self.voice.is_some() || self.video.is_some()
    }

    pub fn enable(&mut self, kind: MediaKind) {
        let enabled = match kind {
            MediaKind::Audio => self.voice.as_mut().map(|c| c.enable(true)),
            MediaKind::Video => self.video.as_mut().map(|c| c.enable(true)),
        };
        if enabled.is_none() {
            warn!("No {} channel to enable", kind);
        }
    }

    pub fn mute(&mut self, kind: MediaKind, muted: bool) {
        let done = match kind {
            MediaKind::Audio => self.voice.as_mut().map(|c| c.mute(muted)),
            MediaKind::Video => self.video.as_mut().map(|c| c.mute(muted)),
        };
        if done.is_none() {
            warn!("No {} channel to mute", kind);
        }
    }

    pub fn video_mut(&mut self) -> Option<&mut (dyn VideoChannel + 'static)> {
        self.video.as_deref_mut()
    }
}
