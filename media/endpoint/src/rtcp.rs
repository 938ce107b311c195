//! Typed access to received compound RTCP packets

use rtcp_types::prelude::*;
use rtcp_types::{Compound, Packet, RtcpParseError};

/// Packets of a compound RTCP packet, each with the bytes it was parsed from
pub(crate) fn parse_compound(data: &[u8]) -> Result<Vec<(Packet<'_>, &[u8])>, RtcpParseError> {
    let mut offset = 0;

    Compound::parse(data)?
        .map(|packet| -> Result<_, RtcpParseError> {
            let packet = packet?;
            let end = offset + packet.length();

            let bytes = data.get(offset..end).ok_or(RtcpParseError::Truncated {
                expected: end,
                actual: data.len(),
            })?;
            offset = end;

            Ok((packet, bytes))
        })
        .collect()
}

/// SSRC of the source that sent `packet`
pub(crate) fn sender_ssrc(packet: &Packet<'_>) -> Option<u32> {
    match packet {
        Packet::Sr(sr) => Some(sr.ssrc()),
        Packet::Rr(rr) => Some(rr.ssrc()),
        Packet::Sdes(sdes) => sdes.chunks().next().map(|chunk| chunk.ssrc()),
        Packet::Bye(bye) => bye.ssrcs().next(),
        Packet::App(app) => Some(app.ssrc()),
        Packet::TransportFeedback(feedback) => Some(feedback.sender_ssrc()),
        Packet::PayloadFeedback(feedback) => Some(feedback.sender_ssrc()),
        Packet::Xr(..) | Packet::Unknown(..) => None,
    }
}
