use bytes::{BufMut, Bytes, BytesMut};
use rtcp_types::prelude::*;
use rtcp_types::{Packet, PayloadFeedback, RtcpParseError, RtcpWriteError, Unknown};
use smallvec::SmallVec;

/// Application layer feedback
const FMT_AFB: u8 = 15;
const REMB_IDENTIFIER: &[u8; 4] = b"REMB";

const MANTISSA_MAX: u64 = 0x3FFFF;
const EXP_MAX: u8 = 63;

/// Common header, sender ssrc & media ssrc of a feedback packet
const FEEDBACK_HEADER_LEN: usize = 12;
/// Identifier, num-ssrc & exp/mantissa
const FCI_FIXED_LEN: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RembParseError {
    #[error(transparent)]
    Rtcp(#[from] RtcpParseError),
    #[error("packet too short")]
    TooShort,
    #[error("not a REMB packet")]
    NotRemb,
    #[error("length does not match the ssrc count")]
    InvalidLength,
}

/// Receiver estimated maximum bitrate (`draft-alvestrand-rmcat-remb`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remb {
    pub sender_ssrc: u32,
    /// Estimated bitrate in bits per second
    pub bitrate: u64,
    /// SSRCs the estimate applies to
    pub ssrcs: SmallVec<[u32; 2]>,
}

impl Remb {
    /// Parse a single RTCP packet as REMB
    pub fn parse(packet: &[u8]) -> Result<Self, RembParseError> {
        match Packet::parse(packet)? {
            Packet::PayloadFeedback(feedback) => Self::from_feedback(&feedback, packet),
            _ => Err(RembParseError::NotRemb),
        }
    }

    /// Read the REMB carried by `feedback`, `packet` being the bytes it was parsed from
    pub(crate) fn from_feedback(
        feedback: &PayloadFeedback<'_>,
        packet: &[u8],
    ) -> Result<Self, RembParseError> {
        if feedback.count() != FMT_AFB {
            return Err(RembParseError::NotRemb);
        }

        let padding = usize::from(feedback.padding().unwrap_or(0));
        let fci = packet
            .len()
            .checked_sub(padding)
            .and_then(|end| packet.get(FEEDBACK_HEADER_LEN..end))
            .ok_or(RembParseError::TooShort)?;

        Self::parse_fci(feedback.sender_ssrc(), fci)
    }

    fn parse_fci(sender_ssrc: u32, fci: &[u8]) -> Result<Self, RembParseError> {
        if fci.len() < FCI_FIXED_LEN {
            return Err(RembParseError::TooShort);
        }

        if &fci[..4] != REMB_IDENTIFIER {
            return Err(RembParseError::NotRemb);
        }

        let num_ssrc = usize::from(fci[4]);

        if fci.len() != FCI_FIXED_LEN + num_ssrc * 4 {
            return Err(RembParseError::InvalidLength);
        }

        let exp = u32::from(fci[5] >> 2);
        let mantissa =
            (u64::from(fci[5] & 0x03) << 16) | (u64::from(fci[6]) << 8) | u64::from(fci[7]);

        let ssrcs = fci[FCI_FIXED_LEN..]
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            sender_ssrc,
            bitrate: mantissa.saturating_mul(1 << exp),
            ssrcs,
        })
    }

    /// Serialize into a payload specific feedback packet
    pub fn to_bytes(&self) -> Result<Bytes, RtcpWriteError> {
        // The ssrc count is a single byte
        let ssrcs = &self.ssrcs[..self.ssrcs.len().min(usize::from(u8::MAX))];

        let mut exp = 0u8;
        while exp < EXP_MAX && (self.bitrate >> exp) > MANTISSA_MAX {
            exp += 1;
        }
        let mantissa = (self.bitrate >> exp).min(MANTISSA_MAX);

        let mut body = BytesMut::with_capacity(8 + FCI_FIXED_LEN + ssrcs.len() * 4);
        body.put_u32(self.sender_ssrc);
        // media ssrc is unused
        body.put_u32(0);
        body.put_slice(REMB_IDENTIFIER);
        body.put_u8(ssrcs.len() as u8);
        body.put_u8((exp << 2) | (mantissa >> 16) as u8);
        body.put_u16(mantissa as u16);

        for &ssrc in ssrcs {
            body.put_u32(ssrc);
        }

        // rtcp-types only writes its own feedback formats, REMB goes out as a raw PSFB packet
        let builder = Unknown::builder(PayloadFeedback::PACKET_TYPE, &body[..]).count(FMT_AFB);

        let mut buf = vec![0u8; builder.calculate_size()?];
        let len = builder.write_into(&mut buf)?;
        buf.truncate(len);

        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn wire_format() {
        let remb = Remb {
            sender_ssrc: 0x01020304,
            bitrate: 1_000_000,
            ssrcs: smallvec![0x0A0B0C0D],
        };

        let bytes = remb.to_bytes().unwrap();

        // 1_000_000 = 250_000 << 2
        assert_eq!(
            &bytes[..],
            &[
                0x8F, 206, 0, 5, //
                1, 2, 3, 4, //
                0, 0, 0, 0, //
                b'R', b'E', b'M', b'B', //
                1, (2 << 2) | 0x03, 0xD0, 0x90, //
                0x0A, 0x0B, 0x0C, 0x0D,
            ]
        );

        assert_eq!(Remb::parse(&bytes), Ok(remb));
    }

    #[test]
    fn written_as_payload_feedback() {
        let remb = Remb {
            sender_ssrc: 7,
            bitrate: 256_000,
            ssrcs: smallvec![1, 2],
        };

        let bytes = remb.to_bytes().unwrap();

        let Ok(Packet::PayloadFeedback(feedback)) = Packet::parse(&bytes) else {
            panic!("expected payload specific feedback");
        };

        assert_eq!(feedback.count(), FMT_AFB);
        assert_eq!(feedback.sender_ssrc(), 7);
        assert_eq!(feedback.media_ssrc(), 0);
    }

    #[test]
    fn small_bitrate_has_zero_exponent() {
        let remb = Remb {
            sender_ssrc: 1,
            bitrate: 30_000,
            ssrcs: smallvec![],
        };

        let bytes = remb.to_bytes().unwrap();

        assert_eq!(bytes[17] >> 2, 0);
        assert_eq!(bytes.len(), FEEDBACK_HEADER_LEN + FCI_FIXED_LEN);
        assert_eq!(Remb::parse(&bytes).map(|remb| remb.bitrate), Ok(30_000));
    }

    #[test]
    fn precision_loss_rounds_down() {
        let remb = Remb {
            sender_ssrc: 1,
            bitrate: 0x3FFFF * 2 + 1,
            ssrcs: smallvec![],
        };

        let parsed = Remb::parse(&remb.to_bytes().unwrap()).unwrap();

        assert_eq!(parsed.bitrate, 0x3FFFF * 2);
    }

    #[test]
    fn reject_other_feedback() {
        let mut bytes = Remb {
            sender_ssrc: 1,
            bitrate: 1,
            ssrcs: smallvec![],
        }
        .to_bytes()
        .unwrap()
        .to_vec();

        // PLI
        bytes[0] = 0x81;
        assert_eq!(Remb::parse(&bytes), Err(RembParseError::NotRemb));

        // Receiver report
        assert_eq!(
            Remb::parse(&[0x80, 201, 0, 1, 0, 0, 0, 9]),
            Err(RembParseError::NotRemb)
        );

        assert!(matches!(
            Remb::parse(&bytes[..8]),
            Err(RembParseError::Rtcp(_))
        ));
    }

    #[test]
    fn ssrc_count_must_match_length() {
        let mut bytes = Remb {
            sender_ssrc: 1,
            bitrate: 1,
            ssrcs: smallvec![5],
        }
        .to_bytes()
        .unwrap()
        .to_vec();

        bytes[16] = 2;

        assert_eq!(Remb::parse(&bytes), Err(RembParseError::InvalidLength));
    }
}
