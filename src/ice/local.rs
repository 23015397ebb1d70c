use super::Candidate;

/// Number of local candidates a session accepts.
///
/// One voice and one video channel, both with RTCP, gives four transport
/// channels: `rtp`, `rtcp`, `video_rtp` and `video_rtcp`.
pub const MAX_LOCAL_CANDIDATES: usize = 4;

/// The local candidates of a session, at most one per transport channel.
///
/// The set only ever grows. Once it holds [`MAX_LOCAL_CANDIDATES`] entries,
/// further candidates are dropped.
#[derive(Debug, Default)]
pub(crate) struct LocalCandidates {
    list: Vec<Candidate>,
}

impl LocalCandidates {
    pub fn is_full(&self) -> bool {
        self.list.len() >= MAX_LOCAL_CANDIDATES
    }

    /// Add candidates gathered by a transport.
    ///
    /// Returns `true` when this call is the one that completed the set. A set that
    /// is already complete never returns `true` again.
    pub fn add_all(&mut self, candidates: Vec<Candidate>) -> bool {
        if self.is_full() {
            trace!("Drop {} candidates, already complete", candidates.len());
            return false;
        }

        for c in candidates {
            if self.is_full() {
                trace!("Drop candidate over limit: {:?}", c);
                continue;
            }

            if self.contains(c.name()) {
                trace!("Drop candidate for known channel: {:?}", c);
                continue;
            }

            debug!("Add local candidate: {:?}", c);
            self.list.push(c);
        }

        self.is_full()
    }

    /// Linear scan, the set is never bigger than four.
    fn contains(&self, name: &str) -> bool {
        self.list.iter().any(|c| c.name() == name)
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.list
    }
}
