#![allow(dead_code)]

use bytesstr::BytesStr;
use parking_lot::Mutex;
use rtcbase_endpoint::{
    ConnectionRegistry, EndpointConfig, MediaAttachment, Pad, PayloadFormat, RtpConnection,
    RtpEndpoint,
};
use sdp_types::SessionDescription;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) struct MockConnection {
    pub(crate) name: String,
    pub(crate) bundle: bool,
    added: AtomicUsize,
}

impl MockConnection {
    pub(crate) fn added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }
}

impl RtpConnection for MockConnection {
    fn add(&self, _local_offer: bool) {
        self.added.fetch_add(1, Ordering::SeqCst);
    }

    fn request_rtp_sink(&self) -> Pad {
        Pad::new(self.name.as_str(), "rtp_sink")
    }

    fn request_rtp_src(&self) -> Pad {
        Pad::new(self.name.as_str(), "rtp_src")
    }

    fn request_rtcp_sink(&self) -> Pad {
        Pad::new(self.name.as_str(), "rtcp_sink")
    }

    fn request_rtcp_src(&self) -> Pad {
        Pad::new(self.name.as_str(), "rtcp_src")
    }
}

#[derive(Default)]
pub(crate) struct MockRegistry {
    connections: Mutex<Vec<Arc<MockConnection>>>,
    /// Refuse to create any connection
    exhausted: bool,
}

impl MockRegistry {
    pub(crate) fn exhausted() -> Self {
        Self {
            exhausted: true,
            ..Self::default()
        }
    }

    fn create(&self, name: &str, bundle: bool) -> Option<Arc<dyn RtpConnection>> {
        if self.exhausted {
            return None;
        }

        let connection = Arc::new(MockConnection {
            name: format!("conn-{name}"),
            bundle,
            added: AtomicUsize::new(0),
        });

        self.connections.lock().push(connection.clone());

        Some(connection)
    }

    pub(crate) fn created(&self) -> Vec<Arc<MockConnection>> {
        self.connections.lock().clone()
    }

    pub(crate) fn created_names(&self) -> Vec<String> {
        self.connections
            .lock()
            .iter()
            .map(|conn| conn.name.clone())
            .collect()
    }
}

impl ConnectionRegistry for MockRegistry {
    fn create_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>> {
        self.create(name, false)
    }

    fn create_bundle_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>> {
        self.create(name, true)
    }

    fn get_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>> {
        let wanted = format!("conn-{name}");

        self.connections
            .lock()
            .iter()
            .find(|conn| conn.name == wanted)
            .map(|conn| conn.clone() as Arc<dyn RtpConnection>)
    }
}

/// Supports every format except H264
#[derive(Default)]
pub(crate) struct MockAttachment {
    pub(crate) requested: Mutex<Vec<PayloadFormat>>,
}

impl MockAttachment {
    fn supports(format: &PayloadFormat) -> bool {
        !format
            .encoding
            .as_ref()
            .is_some_and(|encoding| encoding.eq_ignore_ascii_case("H264"))
    }
}

impl MediaAttachment for MockAttachment {
    fn payloader_for(&self, format: &PayloadFormat) -> Option<Pad> {
        self.requested.lock().push(format.clone());

        Self::supports(format).then(|| Pad::new(format!("pay{}", format.pt), "src"))
    }

    fn depayloader_for(&self, format: &PayloadFormat) -> Option<Pad> {
        self.requested.lock().push(format.clone());

        Self::supports(format).then(|| Pad::new(format!("depay{}", format.pt), "sink"))
    }
}

pub(crate) fn make_endpoint(config: EndpointConfig) -> (Arc<MockRegistry>, RtpEndpoint) {
    let registry = Arc::new(MockRegistry::default());
    let endpoint = make_endpoint_with(config, registry.clone());

    (registry, endpoint)
}

pub(crate) fn make_endpoint_with(config: EndpointConfig, registry: Arc<MockRegistry>) -> RtpEndpoint {
    init_logging();

    RtpEndpoint::new(config, registry, Arc::new(MockAttachment::default()))
}

pub(crate) fn parse_sdp(sdp: &str) -> SessionDescription {
    SessionDescription::parse(&BytesStr::from(sdp)).unwrap()
}

/// Local SDP with audio & video about to be sent, transport still unset
pub(crate) const LOCAL_AUDIO_VIDEO: &str = "v=0\r
o=- 1000 1 IN IP4 127.0.0.1\r
s=-\r
t=0 0\r
m=audio 9 RTP/AVP 0 8\r
a=rtpmap:0 PCMU/8000\r
a=rtpmap:8 PCMA/8000\r
m=video 9 RTP/AVP 96 97\r
a=rtpmap:96 VP8/90000\r
a=rtpmap:97 H264/90000\r
";

/// Remote offer with audio (ssrc 1111) and video (ssrc 2222), bundled and muxed, VP8 with all feedback
pub(crate) const REMOTE_BUNDLE_OFFER: &str = "v=0\r
o=- 2000 1 IN IP4 192.168.1.2\r
s=-\r
t=0 0\r
a=group:BUNDLE a0 v0\r
m=audio 5000 RTP/AVPF 0\r
c=IN IP4 192.168.1.2\r
a=mid:a0\r
a=rtcp-mux\r
a=rtpmap:0 PCMU/8000\r
a=ssrc:1111 cname:peer\r
m=video 5000 RTP/AVPF 96\r
c=IN IP4 192.168.1.2\r
a=mid:v0\r
a=rtcp-mux\r
a=rtpmap:96 VP8/90000\r
a=rtcp-fb:96 ccm fir\r
a=rtcp-fb:96 nack\r
a=rtcp-fb:96 nack pli\r
a=rtcp-fb:96 goog-remb\r
a=ssrc:2222 cname:peer\r
";

/// Remote offer without bundle or rtcp-mux
pub(crate) const REMOTE_PLAIN_OFFER: &str = "v=0\r
o=- 2000 1 IN IP4 192.168.1.2\r
s=-\r
t=0 0\r
m=audio 5000 RTP/AVPF 0\r
c=IN IP4 192.168.1.2\r
a=rtpmap:0 PCMU/8000\r
a=ssrc:1111 cname:peer\r
m=video 5002 RTP/AVPF 96\r
c=IN IP4 192.168.1.2\r
a=rtpmap:96 VP8/90000\r
a=ssrc:2222 cname:peer\r
";

/// Remote offer which doesn't announce any SSRC
pub(crate) const REMOTE_BUNDLE_OFFER_NO_SSRC: &str = "v=0\r
o=- 2000 1 IN IP4 192.168.1.2\r
s=-\r
t=0 0\r
a=group:BUNDLE a0 v0\r
m=audio 5000 RTP/AVPF 0\r
a=mid:a0\r
a=rtcp-mux\r
a=rtpmap:0 PCMU/8000\r
m=video 5000 RTP/AVPF 96\r
a=mid:v0\r
a=rtcp-mux\r
a=rtpmap:96 VP8/90000\r
";

/// Answer the local SDP to `offer`, returns (offer, answer)
pub(crate) fn answer(
    endpoint: &RtpEndpoint,
    offer: &str,
) -> (SessionDescription, SessionDescription) {
    let offer = parse_sdp(offer);
    let mut answer = parse_sdp(LOCAL_AUDIO_VIDEO);

    endpoint
        .negotiate_transport(Some(&offer), &mut answer)
        .unwrap();

    (offer, answer)
}

/// Negotiate & finalize as answerer
pub(crate) fn connect(endpoint: &RtpEndpoint, offer: &str) {
    let (offer, answer) = answer(endpoint, offer);

    endpoint.finalize_transport(&offer, &answer, false).unwrap();
}

pub(crate) fn rtp(ssrc: u32, seq: u16, payload_len: usize) -> Vec<u8> {
    let mut packet = vec![0x80, 96];
    packet.extend_from_slice(&seq.to_be_bytes());
    packet.extend_from_slice(&0u32.to_be_bytes());
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet.resize(packet.len() + payload_len, 0xAB);
    packet
}

/// Receiver report of `sender` with report blocks on `reported`
pub(crate) fn receiver_report(sender: u32, reported: &[u32]) -> Vec<u8> {
    let length = 1 + reported.len() * 6;

    let mut packet = vec![0x80 | reported.len() as u8, 201];
    packet.extend_from_slice(&(length as u16).to_be_bytes());
    packet.extend_from_slice(&sender.to_be_bytes());

    for ssrc in reported {
        packet.extend_from_slice(&ssrc.to_be_bytes());
        packet.extend_from_slice(&[0; 20]);
    }

    packet
}

/// Empty receiver report followed by a SDES with a CNAME for `ssrc`
pub(crate) fn sdes(ssrc: u32) -> Vec<u8> {
    let mut packet = receiver_report(ssrc, &[]);
    packet.extend_from_slice(&[0x81, 202, 0, 3]);
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet.extend_from_slice(&[1, 2, b'a', b'b', 0, 0, 0, 0]);
    packet
}

/// Empty receiver report followed by a BYE for `ssrc`
pub(crate) fn bye(ssrc: u32) -> Vec<u8> {
    let mut packet = receiver_report(ssrc, &[]);
    packet.extend_from_slice(&[0x81, 203, 0, 1]);
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet
}
