#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PacketKind {
    Rtp,
    Rtcp,
    Unknown,
}

impl PacketKind {
    /// Tell RTP & RTCP apart when both are multiplexed on the same transport (RFC 5761)
    pub(crate) fn identify(bytes: &[u8]) -> Self {
        let [first, second, ..] = bytes else {
            return PacketKind::Unknown;
        };

        // Version 2
        if first >> 6 != 2 {
            return PacketKind::Unknown;
        }

        if let 64..=95 = second & 0x7F {
            PacketKind::Rtcp
        } else {
            PacketKind::Rtp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify() {
        assert_eq!(PacketKind::identify(&[0x80, 96]), PacketKind::Rtp);
        assert_eq!(PacketKind::identify(&[0x80, 200]), PacketKind::Rtcp);
        assert_eq!(PacketKind::identify(&[0x81, 206]), PacketKind::Rtcp);
        assert_eq!(PacketKind::identify(&[0x00, 0x01]), PacketKind::Unknown);
        assert_eq!(PacketKind::identify(&[0x80]), PacketKind::Unknown);
    }
}
