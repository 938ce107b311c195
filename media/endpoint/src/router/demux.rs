use crate::media_kind::MediaKind;
use crate::session::Ssrc;
use crate::ssrc_hasher::SsrcHasher;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The SSRCs of each media the demuxer matches incoming sources against
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DemuxKeys {
    pub(crate) remote: [Option<Ssrc>; 2],
    pub(crate) local: [Option<Ssrc>; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Source was already routed to this media
    Known(MediaKind),
    /// Source was routed to this media for the first time
    New(MediaKind),
    /// Source can't be related to any media, its packets are dropped
    Unrouted,
}

/// Demultiplexes a bundled stream to the audio & video sessions by SSRC.
///
/// Sources are matched by the SSRC the peer announced, or by the local SSRC the source reports
/// on in its receiver reports.
#[derive(Debug, Default)]
pub(crate) struct SsrcDemux {
    routes: HashMap<Ssrc, MediaKind, SsrcHasher>,
    /// Unrouted remote source -> our local sources it sent reports on
    rr_pairs: HashMap<Ssrc, SmallVec<[Ssrc; 2]>, SsrcHasher>,
}

impl SsrcDemux {
    /// Remember that `remote` reported on `local`.
    ///
    /// Only reports on our own sources can relate a remote source to a media, all others are ignored.
    pub(crate) fn add_rr_pair(&mut self, remote: Ssrc, local: Ssrc, keys: &DemuxKeys) {
        if local.0 == 0 || !keys.local.contains(&Some(local)) || self.routes.contains_key(&remote) {
            return;
        }

        let locals = self.rr_pairs.entry(remote).or_default();

        if !locals.contains(&local) {
            locals.push(local);
        }
    }

    fn reports_on(&self, remote: Ssrc, local: Option<Ssrc>) -> bool {
        let Some(local) = local.filter(|local| local.0 != 0) else {
            return false;
        };

        self.rr_pairs
            .get(&remote)
            .is_some_and(|locals| locals.contains(&local))
    }

    pub(crate) fn route(&mut self, ssrc: Ssrc, keys: &DemuxKeys) -> Route {
        if let Some(kind) = self.routes.get(&ssrc) {
            return Route::Known(*kind);
        }

        // Misses are not remembered, a later receiver report may still relate the source
        let Some(kind) = MediaKind::ALL.into_iter().find(|kind| {
            keys.remote[kind.index()] == Some(ssrc) || self.reports_on(ssrc, keys.local[kind.index()])
        }) else {
            log::debug!("no media for ssrc {ssrc}, dropping");
            return Route::Unrouted;
        };

        log::debug!("routing ssrc {ssrc} to {kind}");

        self.rr_pairs.remove(&ssrc);
        self.routes.insert(ssrc, kind);

        Route::New(kind)
    }
}
