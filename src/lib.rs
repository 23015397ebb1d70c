//! A Sans I/O WebRTC signaling session.
//!
//! The [`Session`] negotiates an audio/video call: it creates the media channels,
//! drives the OFFER/ANSWER exchange, aggregates the local ICE candidates, routes
//! remote candidates to the transports and supervises that the transports become
//! writable in time.
//!
//! This is a [Sans I/O][sansio] implementation meaning the `Session` instance itself
//! is not doing any network talking, has no internal threads, async tasks or
//! timers. Media channels, transports and description building are collaborators
//! passed in as trait objects. Everything the transports report goes in through
//! [`Session::handle_input()`] and everything the session has to say comes out of
//! [`Session::poll_output()`].
//!
//! # Usage
//!
//! ```no_run
//! # use rtc_session::{Session, Input, Output, Event, Candidate};
//! # use rtc_session::sdp::{MediaDescriptionFactory, MediaSessionOptions, SessionDescription};
//! # use rtc_session::media::ChannelManager;
//! # use rtc_session::transport::Transports;
//! # fn recv_transport_event() -> Option<rtc_session::transport::TransportEvent> { todo!() }
//! let channel_manager: Box<dyn ChannelManager> = todo!();
//! let transports: Box<dyn Transports> = todo!();
//!
//! let mut session = Session::builder().build(
//!     channel_manager,
//!     transports,
//!     Box::new(MediaDescriptionFactory::new()),
//! );
//!
//! // Create voice and video channel and start gathering candidates.
//! session.initialize().unwrap();
//!
//! // Offer audio and video, send it to the remote peer.
//! let options = MediaSessionOptions::new().with_video();
//! let offer = session.provide_offer(&options).unwrap().clone();
//!
//! // Get the answer and the remote candidates.
//! let (answer, candidates): (SessionDescription, Vec<Candidate>) = todo!();
//! session.set_remote_session_description(answer, candidates);
//! session.negotiation_done();
//!
//! // Run loop.
//! loop {
//!     let timeout = match session.poll_output() {
//!         Output::Timeout(v) => v,
//!         Output::Event(Event::CandidatesReady(c)) => {
//!             // Send the local candidates to the remote peer.
//!             continue;
//!         }
//!         Output::Event(Event::Error(e)) => {
//!             session.terminate();
//!             break;
//!         }
//!         Output::Event(_) => continue,
//!     };
//!
//!     // Wait for transport events until the timeout.
//!     let input = match recv_transport_event() {
//!         Some(event) => Input::Transport(std::time::Instant::now(), event),
//!         None => Input::Timeout(timeout),
//!     };
//!
//!     session.handle_input(input);
//! }
//! ```
//!
//! # Execution context
//!
//! All mutation goes through `&mut self`. Whichever task or thread owns the
//! `Session` is its signaling context, and no other context can reach it.
//! Observers get their callbacks from [`Session::drain_events()`] on that same
//! context, after the mutating call has returned.
//!
//! # Call setup timeout
//!
//! Every time a transport starts connecting, or its writable state changes, the
//! session (re)arms a single [`CALL_SETUP_TIMEOUT`] deadline if the transport has
//! channels that aren't writable yet. When the deadline passes the session emits
//! [`Event::Error`] with [`SessionError::NegotiationTimeout`]. It is up to the
//! caller to [`terminate`][Session::terminate] or retry.
//!
//! [sansio]: https://sans-io.readthedocs.io

#![forbid(unsafe_code)]
#![allow(clippy::new_without_default)]
#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use thiserror::Error;

mod config;
pub use config::SessionConfig;

mod id;
pub use id::{SessionId, Ssrc};

mod ice;
pub use ice::{Candidate, CandidateKind, Protocol};
pub use ice::{CHANNEL_RTCP, CHANNEL_RTP, CHANNEL_VIDEO_RTCP, CHANNEL_VIDEO_RTP};
pub use ice::MAX_LOCAL_CANDIDATES;
use ice::{deliver_remote, partition_remote, LocalCandidates};

pub mod media;
use media::{ChannelManager, MediaChannels, MediaKind, VideoCapturer, VideoRenderer};

pub mod sdp;
use sdp::{DescriptionFactory, MediaSessionOptions, SessionDescription};

pub mod transport;
use transport::{TransportEvent, Transports};

mod util;
use util::not_happening;

mod watchdog;
pub use watchdog::CALL_SETUP_TIMEOUT;
use watchdog::Watchdog;

/// Errors for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The channel manager failed to create a channel.
    #[error("Failed to create {0} channel")]
    ChannelCreation(MediaKind),

    /// [`Session::initialize`] was already called.
    #[error("Session already initialized")]
    AlreadyInitialized,

    /// No transport became writable within [`CALL_SETUP_TIMEOUT`].
    #[error("Transport is not in writable state")]
    NegotiationTimeout,

    /// An offer was requested without video.
    #[error("To receive video, has_video must be set")]
    VideoNotOffered,

    /// An answer was requested before a remote description was set.
    #[error("No remote description")]
    NoRemoteDescription,

    /// The operation needs a channel that doesn't exist.
    #[error("No {0} channel")]
    NoChannel(MediaKind),

    /// Video capture could not be set up.
    #[error("Capture device: {0}")]
    CaptureDevice(String),

    /// The session is terminated.
    #[error("Session is terminated")]
    Terminated,

    /// A candidate was rejected on construction.
    #[error("Bad candidate: {0}")]
    BadCandidate(String),
}

/// Signaling state of the [`Session`].
///
/// The only transition is INIT → SENT_INITIATE → RECEIVED_ACCEPT, done in one go
/// by [`Session::negotiation_done()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SessionState {
    /// Nothing negotiated yet.
    #[default]
    Init,
    /// The offer is out.
    SentInitiate,
    /// The answer is in. Media is flowing.
    ReceivedAccept,
}

/// Events produced by [`Session::poll_output()`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// All [`MAX_LOCAL_CANDIDATES`] local candidates are gathered.
    ///
    /// Fires exactly once per session.
    CandidatesReady(Vec<Candidate>),

    /// The signaling state changed.
    StateChange(SessionState),

    /// A fatal error. The session keeps running until terminated.
    Error(SessionError),
}

/// Input as expected by [`Session::handle_input()`]. Either a transport event or a timeout.
#[derive(Debug)]
pub enum Input {
    /// A timeout without any transport input.
    Timeout(Instant),
    /// Something reported by the transport layer.
    Transport(Instant, TransportEvent),
}

/// Output produced by [`Session::poll_output()`]
#[derive(Debug)]
pub enum Output {
    /// When the [`Session`] instance expects an [`Input::Timeout`].
    Timeout(Instant),

    /// Some event such as candidates being ready or an error.
    Event(Event),
}

/// The reason for the next [`Output::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// No timeout scheduled.
    ///
    /// The timeout value is in the distant future.
    NotHappening,

    /// Waiting for a transport to become writable.
    CallSetup,
}

/// Receiver of the session callbacks.
///
/// Used with [`Session::drain_events()`] as an alternative to matching on
/// [`Output::Event`].
pub trait SessionObserver {
    /// All local candidates are gathered.
    fn on_candidates_ready(&mut self, candidates: &[Candidate]);

    /// A fatal session error.
    fn on_error(&mut self, error: SessionError);

    /// The signaling state changed.
    fn on_state_change(&mut self, _state: SessionState) {}
}

/// Instance that does one signaling session.
///
/// ```
/// # use rtc_session::{Session, SessionState};
/// # fn collaborators() -> (
/// #     Box<dyn rtc_session::media::ChannelManager>,
/// #     Box<dyn rtc_session::transport::Transports>,
/// #     Box<dyn rtc_session::sdp::DescriptionFactory>,
/// # ) { todo!() }
/// # if false {
/// let (channel_manager, transports, factory) = collaborators();
/// let session = Session::new(channel_manager, transports, factory);
///
/// assert_eq!(session.state(), SessionState::Init);
/// # }
/// ```
pub struct Session {
    alive: bool,
    id: SessionId,
    config: SessionConfig,
    state: SessionState,
    channel_manager: Box<dyn ChannelManager>,
    transports: Box<dyn Transports>,
    factory: Box<dyn DescriptionFactory>,
    channels: MediaChannels,
    local_desc: Option<SessionDescription>,
    remote_desc: Option<SessionDescription>,
    local_candidates: LocalCandidates,
    watchdog: Watchdog,
    events: VecDeque<Event>,
    last_timeout_reason: Reason,
}

impl Session {
    /// Creates a new instance with default settings.
    ///
    /// To configure the instance, use [`SessionConfig`].
    pub fn new(
        channel_manager: Box<dyn ChannelManager>,
        transports: Box<dyn Transports>,
        factory: Box<dyn DescriptionFactory>,
    ) -> Self {
        SessionConfig::new().build(channel_manager, transports, factory)
    }

    /// Creates a config builder that configures a [`Session`] instance.
    ///
    /// ```
    /// # use rtc_session::Session;
    /// let config = Session::builder()
    ///     .set_require_video(false)
    ///     .set_speculative_connect(false);
    /// ```
    pub fn builder() -> SessionConfig {
        SessionConfig::new()
    }

    pub(crate) fn new_from_config(
        config: SessionConfig,
        channel_manager: Box<dyn ChannelManager>,
        transports: Box<dyn Transports>,
        factory: Box<dyn DescriptionFactory>,
    ) -> Self {
        let id = config.session_id.unwrap_or_else(SessionId::new);
        debug!("Create session {}", id);

        Session {
            alive: true,
            id,
            config,
            state: SessionState::Init,
            channel_manager,
            transports,
            factory,
            channels: MediaChannels::default(),
            local_desc: None,
            remote_desc: None,
            local_candidates: LocalCandidates::default(),
            watchdog: Watchdog::default(),
            events: VecDeque::new(),
            last_timeout_reason: Reason::NotHappening,
        }
    }

    /// Create the voice and video channel and start gathering candidates.
    ///
    /// Applies the configured [`SecurePolicy`][sdp::SecurePolicy] to the description
    /// factory. Unless speculative connect is turned off, every transport channel
    /// starts connecting right away, before any remote description exists.
    ///
    /// If the video channel fails after the voice channel succeeded, the voice
    /// channel is kept until [`Session::terminate()`].
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        if !self.alive {
            return Err(SessionError::Terminated);
        }

        if self.channels.has_any() {
            warn!("Session {} is already initialized", self.id);
            return Err(SessionError::AlreadyInitialized);
        }

        self.factory.set_secure(self.config.secure_policy);

        self.channels
            .create(&mut *self.channel_manager, self.id, self.config.rtcp)?;

        if self.config.speculative_connect {
            debug!("Connect transport channels");
            self.transports.connect_channels();
        }

        info!("Session {} initialized", self.id);
        Ok(())
    }

    /// Destroy the channels and stop all supervision.
    ///
    /// Makes [`Session::is_alive()`] return `false`. Calling it again is a no-op.
    pub fn terminate(&mut self) {
        self.channels.destroy(&mut *self.channel_manager);

        if self.watchdog.disarm() {
            debug!("Cancel call setup timeout on terminate");
        }

        if self.alive {
            info!("Terminate session {}", self.id);
            self.alive = false;
        }
    }

    /// Whether the session is still running.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Create an offer and make it the local description.
    ///
    /// Unless configured otherwise, the options must ask for video. Fails with
    /// [`SessionError::Terminated`] after [`Session::terminate()`].
    pub fn provide_offer(
        &mut self,
        options: &MediaSessionOptions,
    ) -> Result<&SessionDescription, SessionError> {
        if !self.alive {
            return Err(SessionError::Terminated);
        }

        if self.config.require_video && !options.has_video {
            warn!("To receive video, has_video flag must be set to true");
            return Err(SessionError::VideoNotOffered);
        }

        let offer = self.factory.create_offer(options, self.local_desc.as_ref());
        debug!(
            "Provide offer version {} with {} contents",
            offer.session_version(),
            offer.number_of_mediasections()
        );

        Ok(self.local_desc.insert(offer))
    }

    /// Set the remote description, replacing any previous one, and deliver
    /// the remote candidates that came with it. Ignored once terminated.
    pub fn set_remote_session_description(
        &mut self,
        remote: SessionDescription,
        candidates: Vec<Candidate>,
    ) {
        if !self.alive {
            debug!("Ignore remote description on terminated session");
            return;
        }

        debug!(
            "Set remote {:?} version {}",
            remote.sdp_type(),
            remote.session_version()
        );
        self.remote_desc = Some(remote);

        if !candidates.is_empty() {
            self.set_remote_candidates(candidates);
        }
    }

    /// Create an answer to the remote description and make it the local description.
    ///
    /// Fails with [`SessionError::Terminated`] after [`Session::terminate()`].
    pub fn provide_answer(
        &mut self,
        options: &MediaSessionOptions,
    ) -> Result<&SessionDescription, SessionError> {
        if !self.alive {
            return Err(SessionError::Terminated);
        }

        let Some(remote) = &self.remote_desc else {
            warn!("Can't answer without remote description");
            return Err(SessionError::NoRemoteDescription);
        };

        let answer = self
            .factory
            .create_answer(remote, options, self.local_desc.as_ref());
        debug!("Provide answer version {}", answer.session_version());

        Ok(self.local_desc.insert(answer))
    }

    /// The OFFER/ANSWER exchange is complete.
    ///
    /// The first call moves the session to [`SessionState::ReceivedAccept`],
    /// enables both channels and mutes every channel whose local content sends
    /// no streams. Later calls do nothing.
    pub fn negotiation_done(&mut self) {
        if !self.alive {
            debug!("Ignore negotiation done on terminated session");
            return;
        }

        if self.state != SessionState::Init {
            trace!("Negotiation already done");
            return;
        }

        self.set_state(SessionState::SentInitiate);
        self.set_state(SessionState::ReceivedAccept);

        for kind in [MediaKind::Audio, MediaKind::Video] {
            if !self.channels.has(kind) {
                warn!("No {} channel to start", kind);
                continue;
            }

            self.channels.enable(kind);

            // One send stream per channel. Nothing to send means muted.
            let content = self.local_desc.as_ref().and_then(|d| d.first_content(kind));
            if let Some(content) = content {
                let muted = content.description.streams.is_empty();
                self.channels.mute(kind, muted);
            }
        }
    }

    fn set_state(&mut self, state: SessionState) {
        info!("Session state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.events.push_back(Event::StateChange(state));
    }

    /// Hand remote candidates to the audio and video transport.
    ///
    /// `video_rtp` and `video_rtcp` candidates go to the video transport, everything
    /// else to the audio transport. A missing transport is not an error. Ignored
    /// once terminated.
    pub fn set_remote_candidates(&mut self, candidates: Vec<Candidate>) {
        if !self.alive {
            debug!("Ignore remote candidates on terminated session");
            return;
        }

        let buckets = partition_remote(candidates);

        deliver_remote(&mut *self.transports, MediaKind::Audio, &buckets.audio);
        deliver_remote(&mut *self.transports, MediaKind::Video, &buckets.video);
    }

    /// Use `capturer` as the camera and start capturing.
    ///
    /// `name` is the local track, only one is supported.
    pub fn set_capture_device(
        &mut self,
        name: &str,
        capturer: Box<dyn VideoCapturer>,
    ) -> Result<(), SessionError> {
        self.require_video_channel()?;

        let device = capturer.device_name().to_string();
        debug!("Set capture device {} for {}", device, name);

        if !self.channel_manager.set_video_capturer(capturer, 0) {
            error!("Failed to set capture device");
            return Err(SessionError::CaptureDevice(device));
        }

        let result = self.channel_manager.set_video_capture(true);
        if !result.is_started() {
            error!("Failed to start the capture device: {:?}", result);
            return Err(SessionError::CaptureDevice(device));
        }

        Ok(())
    }

    /// Render the local video of track `name`.
    pub fn set_local_renderer(
        &mut self,
        name: &str,
        renderer: Box<dyn VideoRenderer>,
    ) -> Result<(), SessionError> {
        let video = self.require_video_channel()?;
        debug!("Set local renderer for {}", name);
        video.set_local_renderer(0, renderer);
        Ok(())
    }

    /// Render the remote video of track `name`.
    pub fn set_remote_renderer(
        &mut self,
        name: &str,
        renderer: Box<dyn VideoRenderer>,
    ) -> Result<(), SessionError> {
        let video = self.require_video_channel()?;
        debug!("Set remote renderer for {}", name);
        video.set_renderer(0, renderer);
        Ok(())
    }

    fn require_video_channel(
        &mut self,
    ) -> Result<&mut (dyn media::VideoChannel + 'static), SessionError> {
        match self.channels.video_mut() {
            Some(v) => Ok(v),
            None => {
                warn!("No video channel, initialize the session first");
                Err(SessionError::NoChannel(MediaKind::Video))
            }
        }
    }

    /// Provide input to this `Session` instance.
    ///
    /// Input is either a [`Input::Timeout`] for some time that was previously
    /// obtained from [`Session::poll_output()`], or something the transport
    /// layer reported. A terminated session ignores all input.
    pub fn handle_input(&mut self, input: Input) {
        if !self.alive {
            debug!("Ignore input on terminated session");
            return;
        }

        match input {
            Input::Timeout(now) => self.handle_timeout(now),
            Input::Transport(now, event) => self.handle_transport(now, event),
        }
    }

    fn handle_timeout(&mut self, now: Instant) {
        if self.watchdog.handle_timeout(now) {
            error!("Transport is not in writable state");
            self.events
                .push_back(Event::Error(SessionError::NegotiationTimeout));
        }
    }

    fn handle_transport(&mut self, now: Instant, event: TransportEvent) {
        match event {
            TransportEvent::RequestSignaling(status) => {
                trace!("Signaling ready for {}", status.content);
                self.transports.signaling_ready(&status.content);
            }
            TransportEvent::Connecting(status) | TransportEvent::Writable(status) => {
                self.watchdog.supervise(now, &status);
            }
            TransportEvent::CandidatesReady(candidates) => {
                if self.local_candidates.add_all(candidates) {
                    let ready = self.local_candidates.as_slice().to_vec();
                    info!("All {} local candidates ready", ready.len());
                    self.events.push_back(Event::CandidatesReady(ready));
                }
            }
            TransportEvent::ChannelGone { content, channel } => {
                debug!("Transport {} channel gone: {}", content, channel);
            }
        }
    }

    /// Poll the `Session` instance for output.
    ///
    /// Queued events come first. When there are none, the output is the time the
    /// session next expects an [`Input::Timeout`].
    pub fn poll_output(&mut self) -> Output {
        if let Some(e) = self.events.pop_front() {
            debug!("{:?}", e);
            return Output::Event(e);
        }

        let (reason, timeout) = match (self.alive, self.watchdog.poll_timeout()) {
            (true, Some(t)) => (Reason::CallSetup, t),
            _ => (Reason::NotHappening, not_happening()),
        };
        self.last_timeout_reason = reason;

        Output::Timeout(timeout)
    }

    /// Deliver all queued events to `observer`.
    ///
    /// Returns the time the session next expects an [`Input::Timeout`].
    pub fn drain_events(&mut self, observer: &mut dyn SessionObserver) -> Instant {
        loop {
            match self.poll_output() {
                Output::Event(Event::CandidatesReady(c)) => observer.on_candidates_ready(&c),
                Output::Event(Event::Error(e)) => observer.on_error(e),
                Output::Event(Event::StateChange(s)) => observer.on_state_change(s),
                Output::Timeout(t) => return t,
            }
        }
    }

    /// The reason for the last [`Output::Timeout`]
    ///
    /// This is updated when calling [`Session::poll_output()`] and the next output
    /// is a timeout.
    pub fn last_timeout_reason(&self) -> Reason {
        self.last_timeout_reason
    }

    /// Id of this session.
    pub fn session_id(&self) -> SessionId {
        self.id
    }

    /// Current signaling state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current local description, if any.
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_desc.as_ref()
    }

    /// The current remote description, if any.
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_desc.as_ref()
    }

    /// The local candidates gathered so far.
    pub fn local_candidates(&self) -> &[Candidate] {
        self.local_candidates.as_slice()
    }

    /// Whether the voice channel exists.
    pub fn has_voice_channel(&self) -> bool {
        self.channels.has(MediaKind::Audio)
    }

    /// Whether the video channel exists.
    pub fn has_video_channel(&self) -> bool {
        self.channels.has(MediaKind::Video)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("alive", &self.alive)
            .field("state", &self.state)
            .finish()
    }
}
