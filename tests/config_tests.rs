#![cfg(feature = "cli")]

use std::time::Duration;

use chart_overlay::acquire::RouteEncoding;
use chart_overlay::api::OverlayConfig;
use chart_overlay::render::Color;

#[test]
fn toml_file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("overlay.toml");
    std::fs::write(
        &path,
        r##"
profile = "us20y"
poll_interval_secs = 30
snapshot_fallback = "data/yield.json"

[[routes]]
name = "direct"
encoding = "direct"

[[routes]]
name = "mirror"
base_url = "https://mirror.example/fetch?u="
encoding = "encoded-query"

[marker]
radius_px = 6
pulse_peak_radius_px = 9
negative_color = "#00aa00"
"##,
    )
    .expect("write config");

    let config = OverlayConfig::load(Some(path.as_path())).expect("config");
    assert_eq!(config.profile, "us20y");
    assert_eq!(config.poll_interval(), Duration::from_secs(30));
    assert_eq!(config.route_timeout(), Duration::from_secs(12));
    assert_eq!(config.routes.len(), 2);
    assert_eq!(config.routes[1].encoding, RouteEncoding::EncodedQuery);
    assert_eq!(config.marker.radius_px, 6.0);
    assert_eq!(config.marker.non_negative_color, Color::CRIMSON);
    assert_eq!(config.marker.negative_color, Color::rgb8(0, 0xaa, 0));

    let pipeline = config
        .pipeline(chart_overlay::HttpTransport::new().expect("transport"))
        .expect("pipeline");
    assert_eq!(pipeline.routes().len(), 2);
    assert_eq!(pipeline.profile().symbol, "USGG20Y:IND");
}

#[test]
fn invalid_values_fail_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("overlay.toml");
    std::fs::write(&path, "route_timeout_secs = -1\n").expect("write config");
    assert!(OverlayConfig::load(Some(path.as_path())).is_err());

    std::fs::write(&path, "[[routes]]\nname = \" \"\nencoding = \"direct\"\n").expect("write config");
    assert!(OverlayConfig::load(Some(path.as_path())).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(OverlayConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
}
