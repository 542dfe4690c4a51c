use chart_overlay::core::{
    Axis, AxisCalibration, ChartCalibration, PixelPoint, datetime_to_ticks, logical_coordinates,
};
use chart_overlay::error::OverlayError;
use chrono::{TimeZone, Utc};

fn chart_calibration() -> ChartCalibration {
    ChartCalibration::from_descriptors(Some("[0, 100, 0, 500]"), Some("[0, 10, 0, 400]"))
        .expect("both axes calibrated")
}

#[test]
fn domain_endpoints_map_to_range_endpoints() {
    let axis = AxisCalibration::try_parse("[10, 110, 40, 840]", Axis::X).expect("valid descriptor");

    assert_eq!(axis.map(10.0, false), 40.0);
    assert_eq!(axis.map(110.0, false), 840.0);
    assert_eq!(axis.map(10.0, true), 840.0);
    assert_eq!(axis.map(110.0, true), 40.0);
}

#[test]
fn values_outside_domain_extrapolate() {
    let axis = AxisCalibration::new(0.0, 10.0, 0.0, 100.0).expect("valid calibration");
    assert_eq!(axis.map(-5.0, false), -50.0);
    assert_eq!(axis.map(20.0, false), 200.0);
}

#[test]
fn y_axis_is_inverted_end_to_end() {
    let point = logical_coordinates(Some(&chart_calibration()), 50.0, 5.0).expect("mapped");
    assert_eq!(point, PixelPoint::new(250.0, 200.0));

    let top = logical_coordinates(Some(&chart_calibration()), 0.0, 10.0).expect("mapped");
    assert_eq!(top, PixelPoint::new(0.0, 0.0));
}

#[test]
fn top_down_pixel_range_maps_midpoint_to_center() {
    let calibration =
        ChartCalibration::from_descriptors(Some("[0,100,0,500]"), Some("[0,10,400,0]"))
            .expect("both axes calibrated");
    let point = logical_coordinates(Some(&calibration), 50.0, 5.0).expect("mapped");
    assert_eq!(point, PixelPoint::new(250.0, 200.0));
}

#[test]
fn exponent_forms_are_accepted() {
    let ticks = datetime_to_ticks(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("time"),
    );
    let axis = AxisCalibration::try_parse(
        "[6.3839664E+17, 6.38712864e17, 60, 940]",
        Axis::X,
    )
    .expect("exponent descriptor");

    let (domain_min, domain_max) = axis.domain();
    assert_eq!(domain_min, 638_396_640_000_000_000.0);
    assert_eq!(domain_max, 638_712_864_000_000_000.0);
    assert_eq!(ticks, domain_min);
    assert_eq!(axis.map(ticks, false), 60.0);
}

#[test]
fn malformed_descriptors_leave_axis_unavailable() {
    for descriptor in ["[1,2,3]", "[1,2,3,4,5]", "garbage", "", "[1, \"a\", 3, 4]"] {
        let result = AxisCalibration::try_parse(descriptor, Axis::Y);
        assert!(
            matches!(
                result,
                Err(OverlayError::CalibrationUnavailable { axis: Axis::Y, .. })
            ),
            "descriptor {descriptor:?} should be rejected, got {result:?}"
        );
    }

    assert!(AxisCalibration::try_parse("[5, 5, 0, 400]", Axis::Y).is_err());
    assert!(AxisCalibration::parse(None, Axis::X).is_none());
}

#[test]
fn one_bad_axis_disables_mapping() {
    let calibration = ChartCalibration::from_descriptors(Some("[0, 100, 0, 500]"), Some("[1,2,3]"));
    assert!(calibration.is_none());
    assert!(logical_coordinates(calibration.as_ref(), 50.0, 5.0).is_none());
}

#[test]
fn pixel_round_trips_to_domain() {
    let calibration = chart_calibration();
    let point = calibration.to_pixel(37.5, 4.23);
    let (x, y) = calibration.to_domain(point);
    assert!((x - 37.5).abs() <= 1e-9);
    assert!((y - 4.23).abs() <= 1e-9);
}
