use crate::media::ChannelManager;
use crate::sdp::{DescriptionFactory, SecurePolicy};
use crate::transport::Transports;
use crate::{Session, SessionId};

/// Customized config for creating a [`Session`] instance.
///
/// ```
/// # use rtc_session::{SessionConfig, SessionId};
/// # use rtc_session::sdp::SecurePolicy;
/// let config = SessionConfig::new()
///     .set_session_id(SessionId::from(4711))
///     .set_secure_policy(SecurePolicy::Enabled)
///     .set_require_video(false);
///
/// assert_eq!(config.session_id(), Some(SessionId::from(4711)));
/// assert!(!config.require_video());
/// ```
///
/// Configs implement [`Clone`] to help create multiple `Session` instances.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub(crate) session_id: Option<SessionId>,
    pub(crate) secure_policy: SecurePolicy,
    pub(crate) require_video: bool,
    pub(crate) rtcp: bool,
    pub(crate) speculative_connect: bool,
}

impl SessionConfig {
    /// Creates a new default config.
    pub fn new() -> Self {
        SessionConfig::default()
    }

    /// Get the configured session id, if set.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Use a fixed session id.
    ///
    /// If not specified, a random id is generated when the session is built.
    pub fn set_session_id(mut self, id: SessionId) -> Self {
        self.session_id = Some(id);
        self
    }

    /// SRTP policy applied to the description factory on [`Session::initialize`].
    ///
    /// Defaults to [`SecurePolicy::Required`].
    pub fn secure_policy(&self) -> SecurePolicy {
        self.secure_policy
    }

    /// Set the SRTP policy.
    pub fn set_secure_policy(mut self, policy: SecurePolicy) -> Self {
        self.secure_policy = policy;
        self
    }

    /// Whether offers must declare video.
    ///
    /// Defaults to `true`.
    pub fn require_video(&self) -> bool {
        self.require_video
    }

    /// Reject offers whose options don't have video.
    pub fn set_require_video(mut self, enabled: bool) -> Self {
        self.require_video = enabled;
        self
    }

    /// Whether channels are created with RTCP.
    ///
    /// Defaults to `true`.
    pub fn rtcp(&self) -> bool {
        self.rtcp
    }

    /// Create channels with or without RTCP.
    pub fn set_rtcp(mut self, enabled: bool) -> Self {
        self.rtcp = enabled;
        self
    }

    /// Whether [`Session::initialize`] starts connecting transport channels before
    /// any remote description exists.
    ///
    /// Defaults to `true`.
    pub fn speculative_connect(&self) -> bool {
        self.speculative_connect
    }

    /// Toggle speculative connect.
    pub fn set_speculative_connect(mut self, enabled: bool) -> Self {
        self.speculative_connect = enabled;
        self
    }

    /// Create a [`Session`] driving the given collaborators.
    pub fn build(
        self,
        channel_manager: Box<dyn ChannelManager>,
        transports: Box<dyn Transports>,
        factory: Box<dyn DescriptionFactory>,
    ) -> Session {
        Session::new_from_config(self, channel_manager, transports, factory)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            secure_policy: SecurePolicy::Required,
            require_video: true,
            rtcp: true,
            speculative_connect: true,
        }
    }
}
