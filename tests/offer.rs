use rtc_session::media::MediaKind;
use rtc_session::sdp::{MediaSessionOptions, SecurePolicy, SessionDescription};
use rtc_session::{SessionConfig, SessionError, SessionId};

mod common;
use common::{init_log, session};

#[test]
pub fn offer_without_video_is_rejected() {
    init_log();

    let (mut session, _rec) = session(SessionConfig::new());

    assert_eq!(
        session.provide_offer(&MediaSessionOptions::new()).err(),
        Some(SessionError::VideoNotOffered)
    );
    assert!(session.local_description().is_none());

    // A rejected offer leaves the previous one in place.
    let offer = session
        .provide_offer(&MediaSessionOptions::new().with_video())
        .unwrap()
        .clone();
    assert!(session.provide_offer(&MediaSessionOptions::new()).is_err());
    assert_eq!(session.local_description(), Some(&offer));
}

#[test]
pub fn audio_only_offer_when_video_not_required() {
    init_log();

    let (mut session, _rec) = session(SessionConfig::new().set_require_video(false));

    let offer = session.provide_offer(&MediaSessionOptions::new()).unwrap();
    assert_eq!(offer.number_of_mediasections(), 1);
    assert!(offer.first_video_content().is_none());
}

#[test]
pub fn reoffer_builds_on_local_description() {
    init_log();

    let config = SessionConfig::new().set_session_id(SessionId::from(4711));
    let (mut session, _rec) = session(config);
    assert_eq!(session.session_id(), SessionId::from(4711));

    let options = MediaSessionOptions::new()
        .add_stream(MediaKind::Audio, "mic", "local")
        .add_stream(MediaKind::Video, "cam", "local");

    let first = session.provide_offer(&options).unwrap().clone();
    let second = session.provide_offer(&options).unwrap().clone();

    assert_eq!(first.session_id(), second.session_id());
    assert_eq!(first.session_version(), "1");
    assert_eq!(second.session_version(), "2");
    assert_eq!(
        first.first_audio_content().unwrap().description.streams,
        second.first_audio_content().unwrap().description.streams
    );
}

#[test]
pub fn secure_policy_applied_on_initialize() {
    init_log();

    let config = SessionConfig::new().set_secure_policy(SecurePolicy::Disabled);
    let (mut session, _rec) = session(config);
    session.initialize().unwrap();

    let offer = session
        .provide_offer(&MediaSessionOptions::new().with_video())
        .unwrap();
    assert!(offer.contents().iter().all(|c| !c.description.crypto));
}

#[test]
pub fn offer_serializes() {
    init_log();

    let (mut session, _rec) = session(SessionConfig::new());
    let offer = session
        .provide_offer(&MediaSessionOptions::new().with_video())
        .unwrap();

    let json = serde_json::to_string(offer).unwrap();
    let back: SessionDescription = serde_json::from_str(&json).unwrap();

    assert_eq!(&back, offer);
}
