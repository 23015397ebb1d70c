use crate::media::MediaKind;
use crate::transport::Transports;

use super::Candidate;

/// Remote candidates split per media kind.
#[derive(Debug, Default)]
pub(crate) struct RemoteBuckets {
    pub audio: Vec<Candidate>,
    pub video: Vec<Candidate>,
}

/// Split remote candidates into an audio and a video bucket.
///
/// Only `video_rtp` and `video_rtcp` go to video. Any other name, known or not,
/// lands in the audio bucket. This holds for exactly two media kinds.
pub(crate) fn partition_remote(candidates: Vec<Candidate>) -> RemoteBuckets {
    let mut buckets = RemoteBuckets::default();

    for c in candidates {
        match c.media_kind() {
            MediaKind::Audio => buckets.audio.push(c),
            MediaKind::Video => buckets.video.push(c),
        }
    }

    buckets
}

/// Hand remote candidates to the transport proxy of the media kind.
///
/// The proxy completes its negotiation first if it hasn't already.
pub(crate) fn deliver_remote(
    transports: &mut dyn Transports,
    kind: MediaKind,
    candidates: &[Candidate],
) {
    if candidates.is_empty() {
        return;
    }

    let Some(proxy) = transports.proxy(kind.content_name()) else {
        info!("No {} TransportProxy exists", kind);
        return;
    };

    if !proxy.negotiated() {
        debug!("Complete {} transport negotiation", kind);
        proxy.complete_negotiation();
    }

    debug!("Deliver {} remote {} candidates", candidates.len(), kind);
    proxy.implementation().accept_remote_candidates(candidates);
}
