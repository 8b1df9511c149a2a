use flightpath_rs::error::ParseError;
use flightpath_rs::pipeline::parse::parse;
use flightpath_rs::types::route::FileFormat;

const DJI_SRT: &str = "1
00:00:00,000 --> 00:00:00,033
<font size=\"28\">FrameCnt: 1, DiffTime: 33ms
2024-05-01 10:00:00.000
[iso: 110] [shutter: 1/640.0] [fnum: 2.8] [ev: 0] [focal_len: 24.00] [latitude: 55.751244] [longitude: 37.618423] [rel_alt: 50.000 abs_alt: 212.500] </font>

2
00:00:00,033 --> 00:00:00,066
<font size=\"28\">FrameCnt: 2, DiffTime: 33ms
2024-05-01 10:00:00.033
[latitude: 55.751300] [longitude: 37.618500]

3
00:00:00,066 --> 00:00:00,099
no telemetry on this frame
";

#[test]
fn srt_blocks_become_points_with_metadata() {
    let parsed = parse(DJI_SRT.as_bytes(), FileFormat::Srt).expect("parse");
    assert_eq!(parsed.file_format, FileFormat::Srt);
    assert_eq!(parsed.points.len(), 2);

    let first = &parsed.points[0];
    assert_eq!((first.lat, first.lng, first.alt), (55.751244, 37.618423, Some(212.5)));
    let meta = first.metadata.as_ref().expect("metadata");
    assert_eq!(meta.iso.as_deref(), Some("110"));
    assert_eq!(meta.shutter.as_deref(), Some("1/640.0"));
    assert_eq!(meta.fnum.as_deref(), Some("2.8"));
    assert_eq!(meta.focal_len.as_deref(), Some("24.00"));
    assert_eq!(
        meta.captured_at.map(|t| t.to_string()).as_deref(),
        Some("2024-05-01 10:00:00")
    );
}

#[test]
fn srt_without_altitude_defaults_to_flight_height() {
    let parsed = parse(DJI_SRT.as_bytes(), FileFormat::Srt).expect("parse");
    assert_eq!(parsed.points[1].alt, Some(100.0));
}

#[test]
fn srt_with_crlf_line_endings() {
    let crlf = DJI_SRT.replace('\n', "\r\n");
    let parsed = parse(crlf.as_bytes(), FileFormat::Srt).expect("parse");
    assert_eq!(parsed.points.len(), 2);
}

#[test]
fn srt_without_coordinates_is_empty() {
    let err = parse(b"1\n00:00:00,000 --> 00:00:01,000\nhello\n", FileFormat::Srt).unwrap_err();
    assert!(matches!(err, ParseError::EmptyFile));
}

#[test]
fn gpx_reads_track_points_with_elevation_and_time() {
    let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="52.5200" lon="13.4050"><ele>34.0</ele><time>2026-01-01T12:00:00Z</time></trkpt>
    <trkpt lat="52.5205" lon="13.4060"></trkpt>
    <trkpt lat="52.5210" lon="13.4070"/>
  </trkseg></trk>
</gpx>"#;

    let parsed = parse(gpx.as_bytes(), FileFormat::Gpx).expect("parse");
    assert_eq!(parsed.points.len(), 3);
    assert_eq!(parsed.points[0].alt, Some(34.0));
    let time = parsed.points[0]
        .metadata
        .as_ref()
        .and_then(|m| m.captured_at)
        .expect("time");
    assert_eq!(time.to_string(), "2026-01-01 12:00:00");
    assert_eq!(parsed.points[1].altitude(), 0.0);
    assert_eq!(parsed.points[2].lng, 13.4070);
}

#[test]
fn gpx_track_wins_over_leading_waypoints() {
    let gpx = r#"<gpx version="1.1">
  <wpt lat="10.0" lon="10.0"><name>Viewpoint</name></wpt>
  <rte><rtept lat="5.0" lon="5.0"/></rte>
  <trk><trkseg>
    <trkpt lat="0.0" lon="0.0"/>
    <trkpt lat="0.0" lon="0.001"/>
  </trkseg></trk>
</gpx>"#;

    let parsed = parse(gpx.as_bytes(), FileFormat::Gpx).expect("parse");
    let coords: Vec<(f64, f64)> = parsed.points.iter().map(|p| (p.lat, p.lng)).collect();
    assert_eq!(coords, vec![(0.0, 0.0), (0.0, 0.001)]);
}

#[test]
fn gpx_falls_back_to_route_then_waypoints() {
    let route_only = r#"<gpx>
  <wpt lat="10.0" lon="10.0"/>
  <rte><rtept lat="1.5" lon="2.5"><ele>12.5</ele></rtept><rtept lat="1.6" lon="2.6"/></rte>
</gpx>"#;
    let parsed = parse(route_only.as_bytes(), FileFormat::Gpx).expect("parse");
    assert_eq!(parsed.points.len(), 2);
    assert_eq!(parsed.points[0].alt, Some(12.5));

    let waypoints_only = r#"<gpx><wpt lat="1.0" lon="2.0"/><wpt lat="3.0" lon="4.0"/></gpx>"#;
    let parsed = parse(waypoints_only.as_bytes(), FileFormat::Gpx).expect("parse");
    let lats: Vec<f64> = parsed.points.iter().map(|p| p.lat).collect();
    assert_eq!(lats, vec![1.0, 3.0]);
}

#[test]
fn gpx_without_points_is_empty() {
    let err = parse(b"<gpx></gpx>", FileFormat::Gpx).unwrap_err();
    assert!(matches!(err, ParseError::EmptyFile));
}

#[test]
fn malformed_gpx_is_rejected() {
    let err = parse(b"<gpx><trk></gpx>", FileFormat::Gpx).unwrap_err();
    assert!(matches!(err, ParseError::InvalidGpx(_)));
}

#[test]
fn file_format_from_extension() {
    assert_eq!(FileFormat::from_filename("DJI_0042.SRT"), Some(FileFormat::Srt));
    assert_eq!(FileFormat::from_filename("flight.gpx"), Some(FileFormat::Gpx));
    assert_eq!(FileFormat::from_filename("flight.fit"), None);
}
