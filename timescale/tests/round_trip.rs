//! Round-trip checks across the public conversion API.

use approx::assert_abs_diff_eq;
use rstest::rstest;
use std::thread;
use timescale::{parse, to_all_representations, TimeError, TimeKind, TimeOutputs, MJD_OFFSET};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[rstest]
#[case(0.5)]
#[case(1.0)]
#[case(2_299_160.5)]
#[case(2_400_000.5)]
#[case(2_440_587.5)]
#[case(2_451_545.123_456)]
#[case(2_460_000.987_654_321)]
#[case(5.0e7)]
#[case(9.0e7)]
fn jd_round_trip(#[case] jd: f64) {
    init_logging();
    let instant = parse(TimeKind::Jd, &jd.to_string()).unwrap();
    let out = to_all_representations(instant);
    assert_abs_diff_eq!(out.jd(), jd, epsilon = 1e-6);
}

#[rstest]
#[case(51_544.5)]
#[case(58_849.0)]
#[case(60_000.333_333)]
#[case(9.0e7)]
fn mjd_round_trip(#[case] mjd: f64) {
    let instant = parse(TimeKind::Mjd, &mjd.to_string()).unwrap();
    let out = to_all_representations(instant);
    assert_abs_diff_eq!(out.mjd(), mjd, epsilon = 1e-6);
}

#[rstest]
#[case(TimeKind::Jd, "100000000")]
#[case(TimeKind::Jd, "500000000")]
#[case(TimeKind::Mjd, "1e8")]
fn beyond_supported_range_is_reported(#[case] kind: TimeKind, #[case] raw: &str) {
    init_logging();
    match parse(kind, raw) {
        Err(TimeError::MalformedValue { context, .. }) => {
            assert_eq!(context, kind.out_of_range_label());
        }
        other => panic!("expected out-of-range error, got {other:?}"),
    }
}

// Leap seconds took effect at GPS 599_184_013 (1999-01-01) and
// GPS 820_108_814 (2006-01-01). Values inside the inserted second itself
// have no UTC representation and are left out.
#[rstest]
#[case(0.0)]
#[case(46_828_801.0)]
#[case(598_000_000.0)]
#[case(599_184_000.0)]
#[case(599_184_020.25)]
#[case(700_000_000.5)]
#[case(820_108_700.0)]
#[case(820_108_900.75)]
#[case(1_000_000_000.0)]
#[case(1_167_264_018.0)]
#[case(1_400_000_000.125)]
fn gps_round_trip(#[case] gps: f64) {
    init_logging();
    let instant = parse(TimeKind::Gps, &gps.to_string()).unwrap();
    let out = to_all_representations(instant);
    assert_abs_diff_eq!(out.gps_seconds(), gps, epsilon = 1e-3);
}

#[test]
fn gps_leap_offset_grows_across_boundaries() {
    // Same UTC wall-clock distance, one extra leap second in between
    let before = to_all_representations(parse(TimeKind::IsoUtc, "1998-12-31T23:00:00Z").unwrap());
    let after = to_all_representations(parse(TimeKind::IsoUtc, "1999-01-01T01:00:00Z").unwrap());
    assert_eq!(after.gps_seconds() - before.gps_seconds(), 7_201.0);
}

#[test]
fn mjd_is_exactly_jd_minus_offset() {
    for raw in [
        "1858-11-17T00:00:00Z",
        "1980-01-06T00:00:00Z",
        "2017-01-01T00:00:00Z",
        "2024-02-29T13:14:15.161718Z",
    ] {
        let out = to_all_representations(parse(TimeKind::IsoUtc, raw).unwrap());
        assert_eq!(out.mjd(), out.jd() - MJD_OFFSET, "{raw}");
    }
}

#[test]
fn mjd_epoch_is_zero() {
    let out = to_all_representations(parse(TimeKind::IsoUtc, "1858-11-17T00:00:00Z").unwrap());
    assert_eq!(out.mjd(), 0.0);
}

#[test]
fn outputs_serialize_together() {
    let out = to_all_representations(parse(TimeKind::IsoUtc, "2017-01-01T00:00:00Z").unwrap());
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["iso_utc"], "2017-01-01T00:00:00Z");
    assert_eq!(json["gps_seconds"], 1_167_264_018.0);
    assert_eq!(json["mjd"], 57_754.0);
}

#[test]
fn conversions_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TimeOutputs>();
    assert_send_sync::<timescale::LeapSecondTable>();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let gps = 1_000_000_000.0 + i as f64 * 86_400.0;
                let out = to_all_representations(parse(TimeKind::Gps, &gps.to_string()).unwrap());
                (gps, out.gps_seconds())
            })
        })
        .collect();

    for handle in handles {
        let (gps, round_tripped) = handle.join().unwrap();
        assert_abs_diff_eq!(round_tripped, gps, epsilon = 1e-3);
    }
}
