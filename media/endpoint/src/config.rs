use sdp_types::TransportProtocol;
use std::time::Duration;

/// Configuration of a [`RtpEndpoint`](crate::RtpEndpoint), passed at construction.
///
/// Options which are also runtime settable are mirrored by setters on the endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Transport protocol written into every media field of the produced SDP
    pub proto: TransportProtocol,
    /// Bundle all media over a single connection, implies rtcp-mux
    pub bundle: bool,
    /// Multiplex RTP & RTCP over the same connection
    pub rtcp_mux: bool,
    /// Offer `ccm fir` feedback
    pub rtcp_fir: bool,
    /// Offer `nack` feedback
    pub rtcp_nack: bool,
    /// Offer `nack pli` feedback
    pub rtcp_pli: bool,
    /// Offer `goog-remb` feedback
    pub rtcp_remb: bool,
    /// Bitrate target of the sender in bps. Informational only.
    pub target_bitrate: u32,
    /// Lower bound of the video send bitrate in kbps
    pub min_video_send_bandwidth: u32,
    /// Upper bound of the video send bitrate in kbps, 0 means unlimited
    pub max_video_send_bandwidth: u32,
    /// Ceiling of the video receive bitrate reported via REMB in kbps, 0 means unlimited
    pub max_video_recv_bandwidth: u32,
    /// CNAME used in `a=ssrc` attributes, a random one is generated if not set
    pub cname: Option<String>,
    /// Use IPv6 placeholder addresses in the SDP
    pub use_ipv6: bool,
    /// Only formats with this encoding carry the rtcp-fb attributes
    pub video_encoding: String,
    /// Interval in which REMB reports are generated
    pub remb_interval: Duration,
    /// Remote SSRCs without any activity for this duration are considered gone
    pub ssrc_timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            proto: TransportProtocol::RtpAvpf,
            bundle: false,
            rtcp_mux: false,
            rtcp_fir: false,
            rtcp_nack: false,
            rtcp_pli: false,
            rtcp_remb: false,
            target_bitrate: 0,
            min_video_send_bandwidth: 100,
            max_video_send_bandwidth: 500,
            max_video_recv_bandwidth: 0,
            cname: None,
            use_ipv6: false,
            video_encoding: "VP8".into(),
            remb_interval: Duration::from_secs(1),
            ssrc_timeout: Duration::from_secs(10),
        }
    }
}

/// Effective upper bound, where 0 (unlimited) compares larger than any other value
pub(crate) fn max_bound(max: u32) -> u32 {
    if max == 0 { u32::MAX } else { max }
}
