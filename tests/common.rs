#![allow(unused)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::time::Instant;

use rtc_session::media::{CaptureResult, ChannelManager, MediaChannel, MediaKind};
use rtc_session::media::{VideoCapturer, VideoChannel, VideoFrame, VideoRenderer, VoiceChannel};
use rtc_session::sdp::MediaDescriptionFactory;
use rtc_session::transport::{TransportEvent, TransportImpl, TransportProxy, TransportStatus};
use rtc_session::transport::Transports;
use rtc_session::{Candidate, Event, Input, Output, Session, SessionConfig, SessionError};
use rtc_session::{SessionId, SessionObserver, SessionState};

/// Everything the mock collaborators saw.
#[derive(Debug, Default)]
pub struct Record {
    pub created: Vec<&'static str>,
    pub destroyed: Vec<&'static str>,
    pub enabled: Vec<(&'static str, bool)>,
    pub muted: Vec<(&'static str, bool)>,
    pub renderers: Vec<(&'static str, u32)>,
    pub capturer: Option<(String, u32)>,
    pub capture_started: usize,
    pub connect_channels: usize,
    pub signaling_ready: Vec<String>,
    pub completed: Vec<String>,
    pub delivered: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Clone, Default)]
pub struct Shared(Arc<Mutex<Record>>);

impl Shared {
    pub fn get(&self) -> MutexGuard<'_, Record> {
        self.0.lock().unwrap()
    }
}

pub struct MockChannel {
    kind: &'static str,
    rec: Shared,
}

impl MediaChannel for MockChannel {
    fn enable(&mut self, enabled: bool) {
        self.rec.get().enabled.push((self.kind, enabled));
    }

    fn mute(&mut self, muted: bool) {
        self.rec.get().muted.push((self.kind, muted));
    }
}

impl VoiceChannel for MockChannel {}

impl VideoChannel for MockChannel {
    fn set_renderer(&mut self, ssrc: u32, _renderer: Box<dyn VideoRenderer>) {
        self.rec.get().renderers.push(("remote", ssrc));
    }

    fn set_local_renderer(&mut self, ssrc: u32, _renderer: Box<dyn VideoRenderer>) {
        self.rec.get().renderers.push(("local", ssrc));
    }
}

pub struct MockChannelManager {
    pub rec: Shared,
    pub fail_voice: bool,
    pub fail_video: bool,
    pub reject_capturer: bool,
    pub capture_result: CaptureResult,
}

impl MockChannelManager {
    pub fn new(rec: Shared) -> Self {
        MockChannelManager {
            rec,
            fail_voice: false,
            fail_video: false,
            reject_capturer: false,
            capture_result: CaptureResult::Success,
        }
    }
}

impl ChannelManager for MockChannelManager {
    fn create_voice_channel(
        &mut self,
        _session_id: SessionId,
        content_name: &str,
        rtcp: bool,
    ) -> Option<Box<dyn VoiceChannel>> {
        assert_eq!(content_name, "audio");
        assert!(rtcp);
        if self.fail_voice {
            return None;
        }
        self.rec.get().created.push("voice");
        Some(Box::new(MockChannel {
            kind: "voice",
            rec: self.rec.clone(),
        }))
    }

    fn create_video_channel(
        &mut self,
        _session_id: SessionId,
        content_name: &str,
        rtcp: bool,
        _voice: &dyn VoiceChannel,
    ) -> Option<Box<dyn VideoChannel>> {
        assert_eq!(content_name, "video");
        assert!(rtcp);
        if self.fail_video {
            return None;
        }
        self.rec.get().created.push("video");
        Some(Box::new(MockChannel {
            kind: "video",
            rec: self.rec.clone(),
        }))
    }

    fn destroy_voice_channel(&mut self, _channel: Box<dyn VoiceChannel>) {
        self.rec.get().destroyed.push("voice");
    }

    fn destroy_video_channel(&mut self, _channel: Box<dyn VideoChannel>) {
        self.rec.get().destroyed.push("video");
    }

    fn set_video_capturer(&mut self, capturer: Box<dyn VideoCapturer>, ssrc: u32) -> bool {
        if self.reject_capturer {
            return false;
        }
        self.rec.get().capturer = Some((capturer.device_name().to_string(), ssrc));
        true
    }

    fn set_video_capture(&mut self, capture: bool) -> CaptureResult {
        assert!(capture);
        self.rec.get().capture_started += 1;
        self.capture_result
    }
}

pub struct MockImpl {
    content: String,
    rec: Shared,
}

impl TransportImpl for MockImpl {
    fn accept_remote_candidates(&mut self, candidates: &[Candidate]) {
        let names = candidates.iter().map(|c| c.name().to_string()).collect();
        self.rec.get().delivered.push((self.content.clone(), names));
    }
}

pub struct MockProxy {
    content: String,
    negotiated: bool,
    imp: MockImpl,
    rec: Shared,
}

impl TransportProxy for MockProxy {
    fn negotiated(&self) -> bool {
        self.negotiated
    }

    fn complete_negotiation(&mut self) {
        assert!(!self.negotiated);
        self.negotiated = true;
        self.rec.get().completed.push(self.content.clone());
    }

    fn implementation(&mut self) -> &mut dyn TransportImpl {
        &mut self.imp
    }
}

pub struct MockTransports {
    rec: Shared,
    proxies: Vec<MockProxy>,
}

impl MockTransports {
    /// Transports with a proxy for each of `contents`.
    pub fn new(rec: Shared, contents: &[&str]) -> Self {
        let proxies = contents
            .iter()
            .map(|c| MockProxy {
                content: c.to_string(),
                negotiated: false,
                imp: MockImpl {
                    content: c.to_string(),
                    rec: rec.clone(),
                },
                rec: rec.clone(),
            })
            .collect();

        MockTransports { rec, proxies }
    }
}

impl Transports for MockTransports {
    fn proxy(&mut self, content: &str) -> Option<&mut dyn TransportProxy> {
        self.proxies
            .iter_mut()
            .find(|p| p.content == content)
            .map(|p| p as &mut dyn TransportProxy)
    }

    fn connect_channels(&mut self) {
        self.rec.get().connect_channels += 1;
    }

    fn signaling_ready(&mut self, content: &str) {
        self.rec.get().signaling_ready.push(content.to_string());
    }
}

pub struct Camera(pub &'static str);

impl VideoCapturer for Camera {
    fn device_name(&self) -> &str {
        self.0
    }
}

pub struct Screen;

impl VideoRenderer for Screen {
    fn set_size(&mut self, _width: u32, _height: u32) -> bool {
        true
    }

    fn render_frame(&mut self, _frame: &VideoFrame) -> bool {
        true
    }
}

/// Observer collecting every callback.
#[derive(Debug, Default)]
pub struct Collect {
    pub candidates: Vec<Vec<Candidate>>,
    pub errors: Vec<SessionError>,
    pub states: Vec<SessionState>,
}

impl SessionObserver for Collect {
    fn on_candidates_ready(&mut self, candidates: &[Candidate]) {
        self.candidates.push(candidates.to_vec());
    }

    fn on_error(&mut self, error: SessionError) {
        self.errors.push(error);
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.states.push(state);
    }
}

/// A session with mock collaborators and transports for audio and video.
pub fn session(config: SessionConfig) -> (Session, Shared) {
    let rec = Shared::default();
    let manager = MockChannelManager::new(rec.clone());
    let session = session_with(config, manager, &["audio", "video"]);
    (session, rec)
}

pub fn session_with(
    config: SessionConfig,
    manager: MockChannelManager,
    contents: &[&str],
) -> Session {
    let transports = MockTransports::new(manager.rec.clone(), contents);
    config.build(
        Box::new(manager),
        Box::new(transports),
        Box::new(MediaDescriptionFactory::new()),
    )
}

pub fn cand(name: &str, port: u16) -> Candidate {
    let addr: SocketAddr = ([10, 0, 0, 1], port).into();
    Candidate::host(name, addr, "udp").unwrap()
}

pub fn status(content: &str, has_channels: bool, writable: bool) -> TransportStatus {
    TransportStatus {
        content: content.to_string(),
        has_channels,
        writable,
    }
}

pub fn transport(session: &mut Session, now: Instant, event: TransportEvent) {
    session.handle_input(Input::Transport(now, event));
}

/// Poll all queued events, stopping at the first timeout.
pub fn events(session: &mut Session) -> Vec<Event> {
    let mut v = vec![];
    while let Output::Event(e) = session.poll_output() {
        v.push(e);
    }
    v
}

pub fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    static START: Once = Once::new();

    START.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter)
            .init();
    });
}
