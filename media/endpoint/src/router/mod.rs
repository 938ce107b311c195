//! Links between connections, the SSRC demuxer and the RTP sessions

use crate::connection::{Pad, PadLink, RtpConnection};
use crate::media_kind::MediaKind;
use crate::session::Ssrc;

mod demux;

pub(crate) use demux::{DemuxKeys, Route, SsrcDemux};

/// Element holding the RTP sessions
pub(crate) const RTPBIN: &str = "rtpbin";
/// Splits RTCP from RTP on a muxed connection
pub(crate) const RTCPDEMUX: &str = "rtcpdemux";
/// Splits a bundled stream by SSRC
pub(crate) const SSRCDEMUX: &str = "ssrcdemux";

const RECV_RTP_SRC_PREFIX: &str = "recv_rtp_src_";

fn link(src: Pad, sink: Pad) -> PadLink {
    PadLink { src, sink }
}

fn rtpbin_pad(name: &str, kind: MediaKind) -> Pad {
    Pad::new(RTPBIN, format!("{name}_{}", kind.session_id()))
}

/// Sink of the session's send path, media from the payloader goes here
pub(crate) fn send_rtp_sink(kind: MediaKind) -> Pad {
    rtpbin_pad("send_rtp_sink", kind)
}

/// Outgoing RTP & RTCP of a session into a connection
pub(crate) fn send_links(conn: &dyn RtpConnection, kind: MediaKind) -> [PadLink; 2] {
    [
        link(rtpbin_pad("send_rtp_src", kind), conn.request_rtp_sink()),
        link(rtpbin_pad("send_rtcp_src", kind), conn.request_rtcp_sink()),
    ]
}

/// Incoming RTP & RTCP of a dedicated connection into its session
pub(crate) fn recv_links(conn: &dyn RtpConnection, kind: MediaKind) -> [PadLink; 2] {
    [
        link(conn.request_rtp_src(), rtpbin_pad("recv_rtp_sink", kind)),
        link(conn.request_rtcp_src(), rtpbin_pad("recv_rtcp_sink", kind)),
    ]
}

/// Incoming side of the bundle connection, through the RTCP and SSRC demuxers
pub(crate) fn bundle_recv_links(conn: &dyn RtpConnection) -> [PadLink; 3] {
    [
        link(conn.request_rtp_src(), Pad::new(RTCPDEMUX, "sink")),
        link(Pad::new(RTCPDEMUX, "rtp_src"), Pad::new(SSRCDEMUX, "sink")),
        link(Pad::new(RTCPDEMUX, "rtcp_src"), Pad::new(SSRCDEMUX, "rtcp_sink")),
    ]
}

/// Output of the SSRC demuxer for a newly routed source into its session
pub(crate) fn demux_links(ssrc: Ssrc, kind: MediaKind) -> [PadLink; 2] {
    [
        link(
            Pad::new(SSRCDEMUX, format!("src_{ssrc}")),
            rtpbin_pad("recv_rtp_sink", kind),
        ),
        link(
            Pad::new(SSRCDEMUX, format!("rtcp_src_{ssrc}")),
            rtpbin_pad("recv_rtcp_sink", kind),
        ),
    ]
}

/// Parse the name of a session's receive pad: `recv_rtp_src_<session>_<ssrc>_<pt>`
pub(crate) fn parse_recv_pad_name(name: &str) -> Option<(MediaKind, Ssrc, u8)> {
    let mut parts = name.strip_prefix(RECV_RTP_SRC_PREFIX)?.split('_');

    let kind = MediaKind::from_session_id(parts.next()?.parse().ok()?)?;
    let ssrc = Ssrc(parts.next()?.parse().ok()?);
    let pt = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some((kind, ssrc, pt))
}
