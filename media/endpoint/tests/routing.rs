use common::{
    REMOTE_BUNDLE_OFFER, REMOTE_BUNDLE_OFFER_NO_SSRC, REMOTE_PLAIN_OFFER, bye, connect,
    make_endpoint, receiver_report, rtp, sdes,
};
use rtcbase_endpoint::{EndpointConfig, EndpointEvent, MediaKind, Pad, PadLink, Ssrc};
use std::time::{Duration, Instant};

mod common;

fn link(src: (&str, &str), sink: (&str, &str)) -> PadLink {
    PadLink {
        src: Pad::new(src.0, src.1),
        sink: Pad::new(sink.0, sink.1),
    }
}

#[test]
fn bundle_wiring() {
    let (registry, endpoint) = make_endpoint(EndpointConfig::default());

    connect(&endpoint, REMOTE_BUNDLE_OFFER);

    let connections = registry.created();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].added(), 1);

    assert_eq!(
        endpoint.links(),
        vec![
            link(("conn-bundle", "rtp_src"), ("rtcpdemux", "sink")),
            link(("rtcpdemux", "rtp_src"), ("ssrcdemux", "sink")),
            link(("rtcpdemux", "rtcp_src"), ("ssrcdemux", "rtcp_sink")),
            link(("rtpbin", "send_rtp_src_0"), ("conn-bundle", "rtp_sink")),
            link(("rtpbin", "send_rtcp_src_0"), ("conn-bundle", "rtcp_sink")),
            link(("rtpbin", "send_rtp_src_1"), ("conn-bundle", "rtp_sink")),
            link(("rtpbin", "send_rtcp_src_1"), ("conn-bundle", "rtcp_sink")),
        ]
    );

    assert_eq!(endpoint.remote_ssrc(MediaKind::Audio), Some(Ssrc(1111)));
    assert_eq!(endpoint.remote_ssrc(MediaKind::Video), Some(Ssrc(2222)));
}

#[test]
fn separate_wiring() {
    let (registry, endpoint) = make_endpoint(EndpointConfig::default());

    connect(&endpoint, REMOTE_PLAIN_OFFER);

    assert!(registry.created().iter().all(|conn| conn.added() == 1));

    assert_eq!(
        endpoint.links(),
        vec![
            link(("rtpbin", "send_rtp_src_0"), ("conn-audio", "rtp_sink")),
            link(("rtpbin", "send_rtcp_src_0"), ("conn-audio", "rtcp_sink")),
            link(("conn-audio", "rtp_src"), ("rtpbin", "recv_rtp_sink_0")),
            link(("conn-audio", "rtcp_src"), ("rtpbin", "recv_rtcp_sink_0")),
            link(("rtpbin", "send_rtp_src_1"), ("conn-video", "rtp_sink")),
            link(("rtpbin", "send_rtcp_src_1"), ("conn-video", "rtcp_sink")),
            link(("conn-video", "rtp_src"), ("rtpbin", "recv_rtp_sink_1")),
            link(("conn-video", "rtcp_src"), ("rtpbin", "recv_rtcp_sink_1")),
        ]
    );

    let now = Instant::now();
    endpoint.receive(now, MediaKind::Audio, &rtp(1111, 1, 160));

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), Some(Ssrc(1111)));
    assert_eq!(endpoint.active_ssrc(MediaKind::Video), None);
}

#[test]
fn announced_video_ssrc_goes_to_video() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_BUNDLE_OFFER);

    endpoint.receive_bundled(Instant::now(), &rtp(2222, 1, 1000));

    assert_eq!(endpoint.active_ssrc(MediaKind::Video), Some(Ssrc(2222)));
    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
    assert!(
        endpoint
            .links()
            .contains(&link(("ssrcdemux", "src_2222"), ("rtpbin", "recv_rtp_sink_1")))
    );
    assert!(
        endpoint
            .links()
            .contains(&link(("ssrcdemux", "rtcp_src_2222"), ("rtpbin", "recv_rtcp_sink_1")))
    );
}

#[test]
fn receiver_report_relates_unannounced_ssrc() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_BUNDLE_OFFER_NO_SSRC);

    let now = Instant::now();
    let local_video = endpoint.local_ssrc(MediaKind::Video).unwrap();

    // Nothing relates the source to any media yet
    endpoint.receive_bundled(now, &rtp(5555, 1, 1000));
    assert_eq!(endpoint.active_ssrc(MediaKind::Video), None);
    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);

    endpoint.receive_bundled(now, &receiver_report(5555, &[local_video.0]));
    endpoint.receive_bundled(now, &rtp(5555, 2, 1000));

    assert_eq!(endpoint.active_ssrc(MediaKind::Video), Some(Ssrc(5555)));
    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
}

#[test]
fn unrelated_ssrc_is_dropped() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_BUNDLE_OFFER);

    let now = Instant::now();
    endpoint.receive_bundled(now, &rtp(9999, 1, 100));
    endpoint.receive_bundled(now, &receiver_report(9999, &[12345]));

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
    assert_eq!(endpoint.active_ssrc(MediaKind::Video), None);
    assert!(
        !endpoint
            .links()
            .iter()
            .any(|link| link.src.element == "ssrcdemux" && link.src.name.ends_with("9999"))
    );
}

#[test]
fn media_start_and_stop() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_BUNDLE_OFFER);

    let now = Instant::now();
    endpoint.receive_bundled(now, &rtp(2222, 1, 1000));
    assert_eq!(endpoint.pop_event(), None);

    endpoint.receive_bundled(now, &sdes(2222));
    assert_eq!(
        endpoint.pop_event(),
        Some(EndpointEvent::MediaStart {
            kind: MediaKind::Video,
            local: false
        })
    );

    // Repeated descriptions don't restart the media
    endpoint.receive_bundled(now, &sdes(2222));
    assert_eq!(endpoint.pop_event(), None);

    endpoint.receive_bundled(now, &bye(2222));
    assert_eq!(
        endpoint.pop_event(),
        Some(EndpointEvent::MediaStop {
            kind: MediaKind::Video,
            local: false
        })
    );
    assert_eq!(endpoint.active_ssrc(MediaKind::Video), None);
}

#[test]
fn first_source_wins() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_PLAIN_OFFER);

    let now = Instant::now();
    endpoint.on_new_ssrc(now, 0, Ssrc(42));
    endpoint.on_new_ssrc(now, 0, Ssrc(43));

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), Some(Ssrc(42)));

    // the second source stopping has no effect
    endpoint.on_bye_ssrc(0, Ssrc(43));
    assert_eq!(endpoint.pop_event(), None);

    endpoint.on_ssrc_sdes(0, Ssrc(42));
    endpoint.on_sender_timeout(0, Ssrc(42));

    assert_eq!(
        endpoint.pop_event(),
        Some(EndpointEvent::MediaStart {
            kind: MediaKind::Audio,
            local: false
        })
    );
    assert_eq!(
        endpoint.pop_event(),
        Some(EndpointEvent::MediaStop {
            kind: MediaKind::Audio,
            local: false
        })
    );
}

#[test]
fn local_source_stop() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_PLAIN_OFFER);

    let local_video = endpoint.local_ssrc(MediaKind::Video).unwrap();
    endpoint.on_bye_timeout(1, local_video);

    assert_eq!(
        endpoint.pop_event(),
        Some(EndpointEvent::MediaStop {
            kind: MediaKind::Video,
            local: true
        })
    );
}

#[test]
fn events_of_unknown_sessions_are_ignored() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_PLAIN_OFFER);

    endpoint.on_new_ssrc(Instant::now(), 7, Ssrc(42));
    endpoint.on_bye_ssrc(7, Ssrc(42));

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
    assert_eq!(endpoint.pop_event(), None);
}

#[test]
fn inactive_source_times_out() {
    let (_, endpoint) = make_endpoint(EndpointConfig {
        ssrc_timeout: Duration::from_secs(5),
        ..Default::default()
    });
    connect(&endpoint, REMOTE_PLAIN_OFFER);

    let start = Instant::now();
    assert_eq!(endpoint.timeout(start), None);

    endpoint.receive(start, MediaKind::Audio, &rtp(1111, 1, 160));
    endpoint.receive(start + Duration::from_secs(2), MediaKind::Audio, &rtp(1111, 2, 160));

    let now = start + Duration::from_secs(2);
    assert_eq!(endpoint.timeout(now), Some(Duration::from_secs(5)));
    assert_eq!(endpoint.poll(now + Duration::from_secs(4)), None);

    assert_eq!(
        endpoint.poll(now + Duration::from_secs(5)),
        Some(EndpointEvent::MediaStop {
            kind: MediaKind::Audio,
            local: false
        })
    );
    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
    assert_eq!(endpoint.timeout(now + Duration::from_secs(5)), None);
}

#[test]
fn unlimited_ssrc_timeout() {
    let (_, endpoint) = make_endpoint(EndpointConfig {
        ssrc_timeout: Duration::MAX,
        ..Default::default()
    });
    connect(&endpoint, REMOTE_PLAIN_OFFER);

    let start = Instant::now();
    endpoint.receive(start, MediaKind::Audio, &rtp(1111, 1, 160));

    assert_eq!(endpoint.timeout(start), None);
    assert_eq!(endpoint.poll(start + Duration::from_secs(3600)), None);
    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), Some(Ssrc(1111)));
}

#[test]
fn reports_on_foreign_sources_route_nothing() {
    let (_, endpoint) = make_endpoint(EndpointConfig::default());
    connect(&endpoint, REMOTE_BUNDLE_OFFER_NO_SSRC);

    let now = Instant::now();

    for sender in 10_000..11_000 {
        endpoint.receive_bundled(now, &receiver_report(sender, &[sender + 1]));
        endpoint.receive_bundled(now, &rtp(sender, 1, 100));
    }

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), None);
    assert_eq!(endpoint.active_ssrc(MediaKind::Video), None);

    // a report on our own source still relates it
    let local_audio = endpoint.local_ssrc(MediaKind::Audio).unwrap();
    endpoint.receive_bundled(now, &receiver_report(10_000, &[local_audio.0]));
    endpoint.receive_bundled(now, &rtp(10_000, 2, 100));

    assert_eq!(endpoint.active_ssrc(MediaKind::Audio), Some(Ssrc(10_000)));
}
