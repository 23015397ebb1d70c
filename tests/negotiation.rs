use std::time::Instant;

use rtc_session::media::MediaKind;
use rtc_session::sdp::{DescriptionFactory, MediaDescriptionFactory, MediaSessionOptions, SdpType};
use rtc_session::transport::TransportEvent;
use rtc_session::{Event, SessionConfig, SessionError, SessionState};
use rtc_session::{CHANNEL_RTCP, CHANNEL_RTP, CHANNEL_VIDEO_RTCP, CHANNEL_VIDEO_RTP};

mod common;
use common::{cand, events, init_log, session, transport, Collect};

#[test]
pub fn offer_answer_end_to_end() {
    init_log();

    let (mut session, rec) = session(SessionConfig::new());
    let now = Instant::now();

    session.initialize().unwrap();
    assert!(session.has_voice_channel());
    assert!(session.has_video_channel());
    assert_eq!(rec.get().connect_channels, 1);

    let options = MediaSessionOptions::new()
        .add_stream(MediaKind::Audio, "mic", "local")
        .with_video();
    let offer = session.provide_offer(&options).unwrap().clone();
    assert_eq!(offer.sdp_type(), SdpType::Offer);
    assert_eq!(session.local_description(), Some(&offer));

    // The remote peer answers.
    let remote = MediaDescriptionFactory::new();
    let answer = remote.create_answer(&offer, &MediaSessionOptions::new().with_video(), None);

    let remote_candidates = vec![
        cand(CHANNEL_RTP, 1000),
        cand(CHANNEL_RTCP, 1001),
        cand(CHANNEL_VIDEO_RTP, 1002),
        cand(CHANNEL_VIDEO_RTCP, 1003),
    ];
    session.set_remote_session_description(answer.clone(), remote_candidates);
    assert_eq!(session.remote_description(), Some(&answer));
    assert_eq!(rec.get().delivered.len(), 2);

    // Local candidates trickle in from the transports.
    let audio = vec![cand(CHANNEL_RTP, 2000), cand(CHANNEL_RTCP, 2001)];
    let video = vec![cand(CHANNEL_VIDEO_RTP, 2002), cand(CHANNEL_VIDEO_RTCP, 2003)];
    transport(&mut session, now, TransportEvent::CandidatesReady(audio));
    transport(&mut session, now, TransportEvent::CandidatesReady(video));

    session.negotiation_done();
    assert_eq!(session.state(), SessionState::ReceivedAccept);

    let mut observer = Collect::default();
    session.drain_events(&mut observer);

    assert_eq!(observer.candidates.len(), 1);
    assert_eq!(observer.candidates[0].len(), 4);
    assert_eq!(
        observer.states,
        [SessionState::SentInitiate, SessionState::ReceivedAccept]
    );
    assert!(observer.errors.is_empty());

    let rec = rec.get();
    assert_eq!(rec.enabled, [("voice", true), ("video", true)]);
    // Audio sends the mic, video sends nothing.
    assert_eq!(rec.muted, [("voice", false), ("video", true)]);
}

#[test]
pub fn negotiation_done_only_once() {
    init_log();

    let (mut session, rec) = session(SessionConfig::new());
    session.initialize().unwrap();
    session
        .provide_offer(&MediaSessionOptions::new().with_video())
        .unwrap();

    session.negotiation_done();
    session.negotiation_done();
    session.negotiation_done();

    assert_eq!(session.state(), SessionState::ReceivedAccept);
    assert_eq!(rec.get().enabled.len(), 2);
    assert_eq!(rec.get().muted.len(), 2);

    let states: Vec<_> = events(&mut session)
        .into_iter()
        .filter(|e| matches!(e, Event::StateChange(_)))
        .collect();
    assert_eq!(states.len(), 2);
}

#[test]
pub fn negotiation_without_channels() {
    init_log();

    let (mut session, rec) = session(SessionConfig::new());

    session.negotiation_done();

    assert_eq!(session.state(), SessionState::ReceivedAccept);
    assert!(rec.get().enabled.is_empty());
}

#[test]
pub fn answer_needs_remote_description() {
    init_log();

    let (mut session, _rec) = session(SessionConfig::new());
    let options = MediaSessionOptions::new().with_video();

    assert_eq!(
        session.provide_answer(&options).err(),
        Some(SessionError::NoRemoteDescription)
    );
    assert!(session.local_description().is_none());
}

#[test]
pub fn answer_remote_offer() {
    init_log();

    let (mut session, rec) = session(SessionConfig::new());
    session.initialize().unwrap();

    let remote = MediaDescriptionFactory::new();
    let offer = remote.create_offer(&MediaSessionOptions::new().with_video(), None);
    session.set_remote_session_description(offer, vec![]);
    assert!(rec.get().delivered.is_empty());

    let options = MediaSessionOptions::new().add_stream(MediaKind::Video, "cam", "local");
    let answer = session.provide_answer(&options).unwrap();

    assert_eq!(answer.sdp_type(), SdpType::Answer);
    assert_eq!(answer.number_of_mediasections(), 2);
    assert!(!answer.first_video_content().unwrap().rejected);
    assert_eq!(answer.session_version(), "1");

    // A re-answer bumps the version of the local description.
    let answer = session.provide_answer(&options).unwrap();
    assert_eq!(answer.session_version(), "2");
}

#[test]
pub fn new_remote_description_replaces_old() {
    init_log();

    let (mut session, _rec) = session(SessionConfig::new());
    let remote = MediaDescriptionFactory::new();

    let first = remote.create_offer(&MediaSessionOptions::new().with_video(), None);
    let second = remote.create_offer(&MediaSessionOptions::new().with_video(), Some(&first));

    session.set_remote_session_description(first, vec![]);
    session.set_remote_session_description(second.clone(), vec![]);

    assert_eq!(session.remote_description(), Some(&second));
}
