use crate::attach::{
    JITTER_BUFFER_LATENCY, JitterBufferConfig, JitterBufferMode, MediaAttachment, PayloadFormat,
};
use crate::config::{EndpointConfig, max_bound};
use crate::connection::{ConnectionRegistry, Pad, PadLink, RtpConnection};
use crate::media_kind::{BUNDLE_STREAM_NAME, MediaKind};
use crate::negotiate::{self, NegotiatedFlags, NegotiationError, TransportParams};
use crate::opt_min;
use crate::packet_kind::PacketKind;
use crate::remb::{BandwidthController, BandwidthParams, Remb, RembParseError};
use crate::router::{self, DemuxKeys, RTPBIN, Route, SsrcDemux};
use crate::rtcp;
use crate::session::{RtpSession, Ssrc, StoppedSource};
use bytes::Bytes;
use bytesstr::BytesStr;
use parking_lot::Mutex;
use rtcp_types::Packet as RtcpPacket;
use sdp_types::{Direction, Group, SessionDescription, TransportProtocol};
use std::collections::{HashMap, VecDeque};
use std::mem::take;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Events produced by the [`RtpEndpoint`], retrieved using [`RtpEndpoint::poll`] or [`RtpEndpoint::pop_event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointEvent {
    /// Media started flowing. `local` is true for media received by us, false when the peer's source
    /// described itself.
    MediaStart { kind: MediaKind, local: bool },
    /// Media stopped flowing. `local` is true if our own source stopped.
    MediaStop { kind: MediaKind, local: bool },
    /// RTCP packet (REMB) to send on the session of `kind`
    SendRtcp { kind: MediaKind, data: Bytes },
    /// The bitrate the video should be sent with changed, in bps
    VideoSendBitrate { bitrate: u64 },
}

/// SDP negotiated RTP endpoint with an audio and a video session.
///
/// All methods take `&self` and can be called from any thread. Internal state is guarded by a single lock,
/// which is never held while calling into the [`ConnectionRegistry`] or [`MediaAttachment`].
pub struct RtpEndpoint {
    registry: Arc<dyn ConnectionRegistry>,
    attachment: Arc<dyn MediaAttachment>,
    state: Mutex<State>,
}

struct State {
    config: EndpointConfig,
    flags: NegotiatedFlags,
    cname: BytesStr,

    sessions: [Option<RtpSession>; 2],
    connections: HashMap<&'static str, Arc<dyn RtpConnection>>,
    demux: SsrcDemux,
    bandwidth: Option<BandwidthController>,

    /// Answer of the last finalized negotiation, used to resolve payload types
    answer: Option<SessionDescription>,
    links: Vec<PadLink>,

    events: VecDeque<EndpointEvent>,
    disposed: bool,
}

impl RtpEndpoint {
    pub fn new(
        config: EndpointConfig,
        registry: Arc<dyn ConnectionRegistry>,
        attachment: Arc<dyn MediaAttachment>,
    ) -> Self {
        let cname = match &config.cname {
            Some(cname) => BytesStr::from(cname.as_str()),
            None => BytesStr::from(format!(
                "user{}@host-{:x}",
                rand::random::<u32>(),
                rand::random::<u32>()
            )),
        };

        let mut config = config;
        if max_bound(config.max_video_send_bandwidth) < config.min_video_send_bandwidth {
            log::warn!(
                "configured min video send bandwidth {} kbps exceeds max of {} kbps, lowering min",
                config.min_video_send_bandwidth,
                config.max_video_send_bandwidth
            );
            config.min_video_send_bandwidth = config.max_video_send_bandwidth;
        }

        Self {
            registry,
            attachment,
            state: Mutex::new(State {
                flags: NegotiatedFlags::from_config(&config),
                config,
                cname,
                sessions: [None, None],
                connections: HashMap::new(),
                demux: SsrcDemux::default(),
                bandwidth: None,
                answer: None,
                links: vec![],
                events: VecDeque::new(),
                disposed: false,
            }),
        }
    }

    pub fn set_proto(&self, proto: TransportProtocol) {
        self.state.lock().config.proto = proto;
    }

    pub fn proto(&self) -> TransportProtocol {
        self.state.lock().config.proto.clone()
    }

    pub fn set_bundle(&self, bundle: bool) {
        self.state.lock().flags.bundle = bundle;
    }

    pub fn set_rtcp_mux(&self, rtcp_mux: bool) {
        self.state.lock().flags.rtcp_mux = rtcp_mux;
    }

    pub fn set_rtcp_fir(&self, fir: bool) {
        self.state.lock().flags.fir = fir;
    }

    pub fn set_rtcp_nack(&self, nack: bool) {
        self.state.lock().flags.nack = nack;
    }

    pub fn set_rtcp_pli(&self, pli: bool) {
        self.state.lock().flags.pli = pli;
    }

    pub fn set_rtcp_remb(&self, remb: bool) {
        self.state.lock().flags.remb = remb;
    }

    /// Current bundle, rtcp-mux & feedback settings, after a negotiation these are the agreed ones
    pub fn negotiated_flags(&self) -> NegotiatedFlags {
        self.state.lock().flags
    }

    pub fn set_target_bitrate(&self, bitrate: u32) {
        self.state.lock().config.target_bitrate = bitrate;
    }

    pub fn target_bitrate(&self) -> u32 {
        self.state.lock().config.target_bitrate
    }

    /// Set the lower bound of the video send bitrate in kbps.
    ///
    /// If it exceeds the upper bound, the upper bound is raised to it.
    pub fn set_min_video_send_bandwidth(&self, kbps: u32) {
        let mut state = self.state.lock();
        state.config.min_video_send_bandwidth = kbps;

        if kbps > max_bound(state.config.max_video_send_bandwidth) {
            log::warn!(
                "min video send bandwidth {kbps} kbps exceeds max of {} kbps, raising max",
                state.config.max_video_send_bandwidth
            );
            state.config.max_video_send_bandwidth = kbps;
        }

        state.apply_send_bounds();
    }

    pub fn min_video_send_bandwidth(&self) -> u32 {
        self.state.lock().config.min_video_send_bandwidth
    }

    /// Set the upper bound of the video send bitrate in kbps, 0 means unlimited.
    ///
    /// If it is below the lower bound, the lower bound is lowered to it.
    pub fn set_max_video_send_bandwidth(&self, kbps: u32) {
        let mut state = self.state.lock();
        state.config.max_video_send_bandwidth = kbps;

        if max_bound(kbps) < state.config.min_video_send_bandwidth {
            log::warn!(
                "max video send bandwidth {kbps} kbps is below min of {} kbps, lowering min",
                state.config.min_video_send_bandwidth
            );
            state.config.min_video_send_bandwidth = kbps;
        }

        state.apply_send_bounds();
    }

    pub fn max_video_send_bandwidth(&self) -> u32 {
        self.state.lock().config.max_video_send_bandwidth
    }

    /// Set the ceiling of the receive bandwidth reported to the peer in kbps, 0 means unlimited
    pub fn set_max_video_recv_bandwidth(&self, kbps: u32) {
        let mut state = self.state.lock();
        state.config.max_video_recv_bandwidth = kbps;

        if let Some(bandwidth) = &mut state.bandwidth {
            bandwidth.set_max_recv_bandwidth(kbps);
        }
    }

    pub fn max_video_recv_bandwidth(&self) -> u32 {
        self.state.lock().config.max_video_recv_bandwidth
    }

    /// Use `ssrc` as local SSRC of the `kind` session.
    ///
    /// Local SSRCs are fixed once the session exists, which happens at the latest during negotiation.
    /// Returns false if the SSRC was already set.
    pub fn set_local_ssrc(&self, kind: MediaKind, ssrc: Ssrc) -> bool {
        let mut state = self.state.lock();

        if ssrc.0 == 0 {
            log::warn!("refusing to use 0 as local {kind} ssrc");
            return false;
        }

        if let Some(session) = state.session(kind) {
            log::warn!(
                "local {kind} ssrc is already {}, ignoring {ssrc}",
                session.local_ssrc()
            );
            return false;
        }

        state.sessions[kind.index()] = Some(RtpSession::new(kind, ssrc));

        true
    }

    pub fn local_ssrc(&self, kind: MediaKind) -> Option<Ssrc> {
        self.state.lock().session(kind).map(RtpSession::local_ssrc)
    }

    /// SSRC the peer announced for `kind` in the finalized negotiation
    pub fn remote_ssrc(&self, kind: MediaKind) -> Option<Ssrc> {
        self.state
            .lock()
            .session(kind)
            .and_then(RtpSession::remote_ssrc)
    }

    /// Remote SSRC currently delivering `kind` media
    pub fn active_ssrc(&self, kind: MediaKind) -> Option<Ssrc> {
        self.state
            .lock()
            .session(kind)
            .and_then(RtpSession::active_ssrc)
    }

    pub fn cname(&self) -> BytesStr {
        self.state.lock().cname.clone()
    }

    /// All links made so far, in order
    pub fn links(&self) -> Vec<PadLink> {
        self.state.lock().links.clone()
    }

    /// Active REMB roles as (receive side estimator, send side manager), `None` if REMB isn't in use
    pub fn remb_roles(&self) -> Option<(bool, bool)> {
        self.state
            .lock()
            .bandwidth
            .as_ref()
            .map(BandwidthController::roles)
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Fill in the transport of an SDP which is about to be sent and create its connections.
    ///
    /// `remote_offer` is the offer being answered, if any. The bundle, rtcp-mux and feedback settings are taken
    /// from it, replacing the configured ones.
    pub fn negotiate_transport(
        &self,
        remote_offer: Option<&SessionDescription>,
        sdp: &mut SessionDescription,
    ) -> Result<(), NegotiationError> {
        let (flags, params) = {
            let mut state = self.state.lock();

            if let Some(offer) = remote_offer {
                state.flags = NegotiatedFlags::from_offer(offer, &state.config.video_encoding);
                log::debug!("negotiated {:?} from remote offer", state.flags);
            }

            let params = TransportParams {
                proto: state.config.proto.clone(),
                cname: state.cname.clone(),
                use_ipv6: state.config.use_ipv6,
                video_encoding: state.config.video_encoding.clone(),
            };

            (state.flags, params)
        };

        if flags.bundle {
            self.connection_or_create(BUNDLE_STREAM_NAME, true)?;
        }

        let mut mids = vec![];

        for desc in &mut sdp.media_descriptions {
            let kind = MediaKind::from_media_type(&desc.media.media_type).ok_or_else(|| {
                NegotiationError::UnsupportedMedia(desc.media.media_type.as_str().into())
            })?;

            let local_ssrc = self.state.lock().session_or_create(kind).local_ssrc();

            negotiate::fill_media(desc, kind, local_ssrc, &flags, &params);

            if flags.bundle {
                mids.push(
                    desc.mid
                        .clone()
                        .unwrap_or_else(|| BytesStr::from_static(kind.stream_name())),
                );
            } else {
                self.connection_or_create(kind.stream_name(), false)?;
            }
        }

        if flags.bundle {
            sdp.group.push(Group {
                typ: BytesStr::from_static("BUNDLE"),
                mids,
            });
        }

        Ok(())
    }

    /// Wire the RTP sessions to their connections once offer and answer are fixed.
    ///
    /// `local_offer` is true if the offer was made by us.
    pub fn finalize_transport(
        &self,
        offer: &SessionDescription,
        answer: &SessionDescription,
        local_offer: bool,
    ) -> Result<(), NegotiationError> {
        if offer.media_descriptions.len() != answer.media_descriptions.len() {
            log::warn!(
                "offer has {} media descriptions, answer {}",
                offer.media_descriptions.len(),
                answer.media_descriptions.len()
            );
        }

        // Description of the peer
        let remote = if local_offer { answer } else { offer };

        let (bundle, media) = {
            let mut state = self.state.lock();

            if state.disposed {
                log::debug!("endpoint disposed, not finalizing transport");
                return Ok(());
            }

            state.answer = Some(answer.clone());

            let mut media: Vec<(MediaKind, Direction)> = vec![];

            for desc in &remote.media_descriptions {
                let Some(kind) = MediaKind::from_media_type(&desc.media.media_type) else {
                    log::warn!("skipping unsupported {} media", desc.media.media_type.as_str());
                    continue;
                };

                let remote_ssrc = desc.ssrc.first().map(|ssrc| Ssrc(ssrc.ssrc));
                state.session_or_create(kind).set_remote_ssrc(remote_ssrc);

                media.push((kind, desc.direction));
            }

            (state.flags.bundle, media)
        };

        let mut links = vec![];

        if bundle {
            let connection = self.connection(BUNDLE_STREAM_NAME)?;
            connection.add(local_offer);

            links.extend(router::bundle_recv_links(&*connection));

            for (kind, _) in &media {
                links.extend(router::send_links(&*connection, *kind));
            }
        } else {
            for (kind, _) in &media {
                let connection = self.connection(kind.stream_name())?;
                connection.add(local_offer);

                links.extend(router::send_links(&*connection, *kind));
                links.extend(router::recv_links(&*connection, *kind));
            }
        }

        let mut state = self.state.lock();
        state.links.extend(links);

        if let Some((_, direction)) = media.iter().find(|(kind, _)| *kind == MediaKind::Video) {
            state.create_bandwidth_controller(direction.flipped());
        }

        Ok(())
    }

    /// Connection created by an earlier negotiation, or a new one. Connections are never recreated.
    fn connection_or_create(
        &self,
        name: &'static str,
        bundle: bool,
    ) -> Result<Arc<dyn RtpConnection>, NegotiationError> {
        if let Some(connection) = self.state.lock().connections.get(name) {
            return Ok(connection.clone());
        }

        let created = if bundle {
            self.registry.create_bundle_connection(name)
        } else {
            self.registry.create_connection(name)
        };

        let connection = created.ok_or(NegotiationError::ConnectionUnavailable(name))?;

        Ok(self
            .state
            .lock()
            .connections
            .entry(name)
            .or_insert(connection)
            .clone())
    }

    fn connection(&self, name: &'static str) -> Result<Arc<dyn RtpConnection>, NegotiationError> {
        let created = self.state.lock().connections.get(name).cloned();

        created
            .or_else(|| self.registry.get_connection(name))
            .ok_or(NegotiationError::ConnectionUnavailable(name))
    }

    /// Create payloaders for every media of `answer` using the configured transport protocol.
    ///
    /// Returns the formats media is sent with.
    pub fn attach_media(&self, answer: &SessionDescription) -> Vec<PayloadFormat> {
        let proto = {
            let state = self.state.lock();

            if state.disposed {
                return vec![];
            }

            state.config.proto.clone()
        };

        let mut attached = vec![];

        for desc in &answer.media_descriptions {
            if desc.media.proto != proto {
                log::debug!(
                    "skipping media with transport {}, expected {}",
                    desc.media.proto.as_str(),
                    proto.as_str()
                );
                continue;
            }

            let Some(kind) = MediaKind::from_media_type(&desc.media.media_type) else {
                log::debug!("no payloader for {} media", desc.media.media_type.as_str());
                continue;
            };

            let Some(rtpmap) = desc.mapped_formats().next() else {
                log::warn!("{}", NegotiationError::FormatUnresolvable(kind));
                continue;
            };

            let format = PayloadFormat::from_media(desc, rtpmap.payload);

            let Some(src) = self.attachment.payloader_for(&format) else {
                log::warn!(
                    "no payloader for {kind} format {}, not sending",
                    rtpmap.encoding
                );
                continue;
            };

            self.state.lock().links.push(PadLink {
                src,
                sink: router::send_rtp_sink(kind),
            });

            attached.push(format);
        }

        attached
    }

    /// Describe a received payload type using the negotiated answer
    pub fn payload_format_for_pt(&self, pt: u8) -> PayloadFormat {
        self.state.lock().payload_format(pt)
    }

    /// Link a new receive pad of a session (`recv_rtp_src_<session>_<ssrc>_<pt>`) to a depayloader
    pub fn on_receive_pad_added(&self, pad_name: &str) {
        let Some((kind, ssrc, pt)) = router::parse_recv_pad_name(pad_name) else {
            log::trace!("ignoring pad {pad_name}");
            return;
        };

        let format = {
            let state = self.state.lock();

            if state.disposed {
                return;
            }

            state.payload_format(pt)
        };

        let sink = match self.attachment.depayloader_for(&format) {
            Some(sink) => sink,
            None => {
                log::warn!("no depayloader for payload type {pt} of {kind} ssrc {ssrc}, discarding");
                Pad::new("fakesink", "sink")
            }
        };

        let mut state = self.state.lock();
        state.links.push(PadLink {
            src: Pad::new(RTPBIN, pad_name),
            sink,
        });
        state.emit(EndpointEvent::MediaStart { kind, local: true });
    }

    /// Jitter buffer settings for an incoming source of session `session_id`
    pub fn jitter_buffer_config(&self, session_id: u32, ssrc: Ssrc) -> JitterBufferConfig {
        let state = self.state.lock();

        let active_video = MediaKind::from_session_id(session_id) == Some(MediaKind::Video)
            && state
                .session(MediaKind::Video)
                .and_then(RtpSession::active_ssrc)
                == Some(ssrc);

        JitterBufferConfig {
            mode: JitterBufferMode::Synced,
            latency: JITTER_BUFFER_LATENCY,
            do_lost: active_video,
            do_retransmission: active_video && state.flags.nack,
        }
    }

    /// Receive a packet from the bundle connection, it is routed to its session by SSRC
    pub fn receive_bundled(&self, now: Instant, data: &[u8]) {
        let mut state = self.state.lock();

        if state.disposed {
            return;
        }

        match PacketKind::identify(data) {
            PacketKind::Rtp => {
                let packet = match rtp_types::RtpPacket::parse(data) {
                    Ok(packet) => packet,
                    Err(e) => {
                        log::debug!("Failed to parse RTP packet, {e:?}");
                        return;
                    }
                };

                if let Some(kind) = state.route(Ssrc(packet.ssrc())) {
                    state.handle_rtp(now, kind, &packet, data.len());
                }
            }
            PacketKind::Rtcp => {
                let packets = match rtcp::parse_compound(data) {
                    Ok(packets) => packets,
                    Err(e) => {
                        log::debug!("Failed to parse incoming RTCP packet, {e}");
                        return;
                    }
                };

                state.collect_rr_pairs(&packets);

                let Some(ssrc) = packets
                    .first()
                    .and_then(|(packet, _)| rtcp::sender_ssrc(packet))
                else {
                    log::debug!("dropping RTCP packet without sender");
                    return;
                };

                if let Some(kind) = state.route(Ssrc(ssrc)) {
                    state.handle_rtcp(now, kind, &packets);
                }
            }
            PacketKind::Unknown => {
                log::debug!("dropping non RTP/RTCP packet of {} bytes", data.len());
            }
        }
    }

    /// Receive a packet from the dedicated connection of `kind`
    pub fn receive(&self, now: Instant, kind: MediaKind, data: &[u8]) {
        let mut state = self.state.lock();

        if state.disposed {
            return;
        }

        match PacketKind::identify(data) {
            PacketKind::Rtp => match rtp_types::RtpPacket::parse(data) {
                Ok(packet) => state.handle_rtp(now, kind, &packet, data.len()),
                Err(e) => log::debug!("Failed to parse RTP packet, {e:?}"),
            },
            PacketKind::Rtcp => match rtcp::parse_compound(data) {
                Ok(packets) => state.handle_rtcp(now, kind, &packets),
                Err(e) => log::debug!("Failed to parse incoming RTCP packet, {e}"),
            },
            PacketKind::Unknown => {
                log::debug!("dropping non RTP/RTCP packet of {} bytes", data.len());
            }
        }
    }

    /// A new source appeared in session `session_id`
    pub fn on_new_ssrc(&self, now: Instant, session_id: u32, ssrc: Ssrc) {
        self.with_session(session_id, |state, kind| {
            state.session_or_create(kind).on_ssrc_activity(now, ssrc);
        });
    }

    /// A source of session `session_id` described itself
    pub fn on_ssrc_sdes(&self, session_id: u32, ssrc: Ssrc) {
        self.with_session(session_id, |state, kind| state.sdes(kind, ssrc));
    }

    pub fn on_bye_ssrc(&self, session_id: u32, ssrc: Ssrc) {
        self.with_session(session_id, |state, kind| state.stop(kind, ssrc, "BYE"));
    }

    pub fn on_bye_timeout(&self, session_id: u32, ssrc: Ssrc) {
        self.with_session(session_id, |state, kind| {
            state.stop(kind, ssrc, "BYE timeout");
        });
    }

    pub fn on_sender_timeout(&self, session_id: u32, ssrc: Ssrc) {
        self.with_session(session_id, |state, kind| {
            state.stop(kind, ssrc, "sender timeout");
        });
    }

    fn with_session(&self, session_id: u32, f: impl FnOnce(&mut State, MediaKind)) {
        let Some(kind) = MediaKind::from_session_id(session_id) else {
            log::debug!("ignoring event of unknown session {session_id}");
            return;
        };

        let mut state = self.state.lock();

        if state.disposed {
            return;
        }

        f(&mut state, kind);
    }

    /// Duration until [`RtpEndpoint::poll`] must be called
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        let state = self.state.lock();

        if state.disposed {
            return None;
        }

        let inactivity = state
            .sessions
            .iter()
            .flatten()
            .filter_map(|session| session.inactivity_deadline(state.config.ssrc_timeout))
            .min()
            .map(|deadline| deadline.saturating_duration_since(now));

        opt_min(
            inactivity,
            state
                .bandwidth
                .as_ref()
                .and_then(|bandwidth| bandwidth.timeout(now)),
        )
    }

    /// Run timers and return the next pending event
    pub fn poll(&self, now: Instant) -> Option<EndpointEvent> {
        let mut state = self.state.lock();

        if !state.disposed {
            state.check_inactivity(now);

            if let Some(remb) = state.bandwidth.as_mut().and_then(|bw| bw.poll(now)) {
                match remb.to_bytes() {
                    Ok(data) => state.emit(EndpointEvent::SendRtcp {
                        kind: MediaKind::Video,
                        data,
                    }),
                    Err(e) => log::warn!("Failed to write REMB packet, {e}"),
                }
            }
        }

        state.events.pop_front()
    }

    /// Next pending event without running any timers
    pub fn pop_event(&self) -> Option<EndpointEvent> {
        self.state.lock().events.pop_front()
    }

    /// Stop the endpoint, emitting a stop event for every media still being received.
    ///
    /// Nothing is emitted afterwards, calling it again has no effect.
    pub fn dispose(&self) {
        let connections = {
            let mut state = self.state.lock();

            if state.disposed {
                return;
            }

            for kind in MediaKind::ALL {
                let stopped = state
                    .session_mut(kind)
                    .and_then(RtpSession::take_active);

                if let Some(ssrc) = stopped {
                    log::debug!("disposing, stopping {kind} ssrc {ssrc}");
                    state.emit(EndpointEvent::MediaStop { kind, local: false });
                }
            }

            state.disposed = true;
            state.bandwidth = None;
            state.demux = SsrcDemux::default();

            take(&mut state.connections)
        };

        drop(connections);
    }
}

impl State {
    fn session(&self, kind: MediaKind) -> Option<&RtpSession> {
        self.sessions[kind.index()].as_ref()
    }

    fn session_mut(&mut self, kind: MediaKind) -> Option<&mut RtpSession> {
        self.sessions[kind.index()].as_mut()
    }

    fn session_or_create(&mut self, kind: MediaKind) -> &mut RtpSession {
        self.sessions[kind.index()].get_or_insert_with(|| RtpSession::new(kind, Ssrc::random()))
    }

    fn emit(&mut self, event: EndpointEvent) {
        if self.disposed {
            log::debug!("endpoint disposed, dropping {event:?}");
            return;
        }

        self.events.push_back(event);
    }

    fn demux_keys(&self) -> DemuxKeys {
        let mut keys = DemuxKeys::default();

        for kind in MediaKind::ALL {
            if let Some(session) = self.session(kind) {
                keys.remote[kind.index()] = session.remote_ssrc();
                keys.local[kind.index()] = Some(session.local_ssrc());
            }
        }

        keys
    }

    fn route(&mut self, ssrc: Ssrc) -> Option<MediaKind> {
        let keys = self.demux_keys();

        match self.demux.route(ssrc, &keys) {
            Route::Known(kind) => Some(kind),
            Route::New(kind) => {
                self.links.extend(router::demux_links(ssrc, kind));
                Some(kind)
            }
            Route::Unrouted => None,
        }
    }

    fn collect_rr_pairs(&mut self, packets: &[(RtcpPacket<'_>, &[u8])]) {
        let keys = self.demux_keys();

        for (packet, _) in packets {
            match packet {
                RtcpPacket::Sr(sr) => {
                    for block in sr.report_blocks() {
                        self.demux
                            .add_rr_pair(Ssrc(sr.ssrc()), Ssrc(block.ssrc()), &keys);
                    }
                }
                RtcpPacket::Rr(rr) => {
                    for block in rr.report_blocks() {
                        self.demux
                            .add_rr_pair(Ssrc(rr.ssrc()), Ssrc(block.ssrc()), &keys);
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_rtp(
        &mut self,
        now: Instant,
        kind: MediaKind,
        packet: &rtp_types::RtpPacket<'_>,
        len: usize,
    ) {
        self.session_or_create(kind)
            .on_ssrc_activity(now, Ssrc(packet.ssrc()));

        if kind == MediaKind::Video {
            if let Some(bandwidth) = &mut self.bandwidth {
                bandwidth.on_video_rtp(now, packet.sequence_number(), len);
            }
        }
    }

    fn handle_rtcp(
        &mut self,
        now: Instant,
        kind: MediaKind,
        packets: &[(RtcpPacket<'_>, &[u8])],
    ) {
        for (packet, bytes) in packets {
            match packet {
                RtcpPacket::Sr(sr) => {
                    self.session_or_create(kind)
                        .on_ssrc_activity(now, Ssrc(sr.ssrc()));
                }
                RtcpPacket::Rr(rr) => {
                    self.session_or_create(kind)
                        .on_ssrc_activity(now, Ssrc(rr.ssrc()));
                }
                RtcpPacket::Sdes(sdes) => {
                    for chunk in sdes.chunks() {
                        self.sdes(kind, Ssrc(chunk.ssrc()));
                    }
                }
                RtcpPacket::Bye(bye) => {
                    for ssrc in bye.ssrcs() {
                        self.stop(kind, Ssrc(ssrc), "BYE");
                    }
                }
                RtcpPacket::PayloadFeedback(feedback) => {
                    match Remb::from_feedback(feedback, bytes) {
                        Ok(remb) => self.remb(&remb),
                        Err(RembParseError::NotRemb) => {}
                        Err(e) => log::debug!("Failed to parse REMB packet, {e}"),
                    }
                }
                _ => {}
            }
        }
    }

    fn sdes(&mut self, kind: MediaKind, ssrc: Ssrc) {
        let announce = self
            .session_mut(kind)
            .is_some_and(|session| session.on_ssrc_sdes(ssrc));

        if announce {
            self.emit(EndpointEvent::MediaStart { kind, local: false });
        }
    }

    fn stop(&mut self, kind: MediaKind, ssrc: Ssrc, reason: &str) {
        let Some(session) = self.session_mut(kind) else {
            return;
        };

        match session.on_ssrc_stopped(ssrc) {
            Some(StoppedSource::Remote) => {
                log::debug!("{kind} ssrc {ssrc} stopped ({reason})");
                self.emit(EndpointEvent::MediaStop { kind, local: false });
            }
            Some(StoppedSource::Local) => {
                log::debug!("local {kind} ssrc {ssrc} stopped ({reason})");
                self.emit(EndpointEvent::MediaStop { kind, local: true });
            }
            None => log::trace!("ignoring {reason} of unrelated {kind} ssrc {ssrc}"),
        }
    }

    fn check_inactivity(&mut self, now: Instant) {
        let timeout = self.config.ssrc_timeout;

        for kind in MediaKind::ALL {
            let Some(session) = self.session(kind) else {
                continue;
            };

            let timed_out = session
                .inactivity_deadline(timeout)
                .is_some_and(|deadline| deadline <= now);

            if let (true, Some(ssrc)) = (timed_out, session.active_ssrc()) {
                self.stop(kind, ssrc, "inactivity");
            }
        }
    }

    fn remb(&mut self, remb: &Remb) {
        let bitrate = self
            .bandwidth
            .as_mut()
            .and_then(|bandwidth| bandwidth.on_remb(remb));

        if let Some(bitrate) = bitrate {
            self.emit(EndpointEvent::VideoSendBitrate { bitrate });
        }
    }

    fn apply_send_bounds(&mut self) {
        let min = self.config.min_video_send_bandwidth;
        let max = self.config.max_video_send_bandwidth;

        let bitrate = self
            .bandwidth
            .as_mut()
            .and_then(|bandwidth| bandwidth.set_send_bounds(min, max));

        if let Some(bitrate) = bitrate {
            self.emit(EndpointEvent::VideoSendBitrate { bitrate });
        }
    }

    /// Create the REMB managers if REMB was agreed on, `direction` is our direction of the video media
    fn create_bandwidth_controller(&mut self, direction: Direction) {
        if !self.flags.remb || self.bandwidth.is_some() {
            return;
        }

        let Some(remote_video_ssrc) = self
            .session(MediaKind::Video)
            .and_then(RtpSession::remote_ssrc)
        else {
            log::debug!("remote video ssrc unknown, not using REMB");
            return;
        };

        let local_video_ssrc = self.session_or_create(MediaKind::Video).local_ssrc();

        self.bandwidth = Some(BandwidthController::new(
            direction,
            BandwidthParams {
                local_video_ssrc,
                remote_video_ssrc,
                remb_interval: self.config.remb_interval,
                min_send_kbps: self.config.min_video_send_bandwidth,
                max_send_kbps: self.config.max_video_send_bandwidth,
                max_recv_kbps: self.config.max_video_recv_bandwidth,
            },
        ));
    }

    fn payload_format(&self, pt: u8) -> PayloadFormat {
        let found = self
            .answer
            .iter()
            .flat_map(|answer| &answer.media_descriptions)
            .find(|desc| desc.media.fmts.contains(&pt));

        match found {
            Some(desc) => PayloadFormat::from_media(desc, pt),
            None => {
                log::warn!("payload type {pt} not found in the negotiated SDP");

                PayloadFormat {
                    rtcp_fb_ccm_fir: self.flags.fir,
                    rtcp_fb_nack_pli: self.flags.pli,
                    ..PayloadFormat::unknown(pt)
                }
            }
        }
    }
}
