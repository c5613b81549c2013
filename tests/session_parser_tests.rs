//! Integration tests for session log parsing and snapshot retention

use chrono::NaiveDate;
use skysnap::clock::SessionClock;
use skysnap::error::ParseError;
use skysnap::parser::{LineOutcome, SessionParser, NO_SESSION_NOTICE};
use skysnap::record::PierSide;
use skysnap::sink::{NullSink, VecSink};
use skysnap::snapshot::{Category, Snapshot};
use std::fs::File;
use std::io::BufReader;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/session.analyze");

fn parser() -> SessionParser {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    SessionParser::with_clock(SessionClock::new(start))
}

fn parse_fixture() -> (SessionParser, skysnap::parser::PassReport) {
    let mut parser = parser();
    let reader = BufReader::new(File::open(FIXTURE).unwrap());
    let report = parser.parse_reader(reader, &mut NullSink).unwrap();
    (parser, report)
}

#[test]
fn test_fixture_pass_report() {
    let (_, report) = parse_fixture();
    assert_eq!(report.lines_read, 15);
    assert_eq!(report.records_decoded, 8);
    assert_eq!(report.start_markers, 1);
    assert_eq!(report.lines_ignored, 4);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line_number, 13);
    assert_eq!(
        report.errors[0].error,
        ParseError::MalformedField {
            field: "temperature",
            value: "broken".to_string()
        }
    );
}

#[test]
fn test_fixture_category_sizes() {
    let (parser, _) = parse_fixture();
    let snapshot = parser.snapshot();
    assert_eq!(snapshot.len(Category::Capture), 1);
    assert_eq!(snapshot.len(Category::Mount), 1);
    assert_eq!(snapshot.len(Category::Guiding), 2);
    assert_eq!(snapshot.len(Category::Temperature), 1);
    assert_eq!(snapshot.len(Category::Humidity), 2);
}

#[test]
fn test_fixture_values_and_times() {
    let (parser, _) = parse_fixture();
    let snapshot = parser.snapshot();

    let temperature = snapshot.temperature().last().unwrap();
    assert_eq!(temperature.time, "21:15:30 09-03-2024");
    assert_eq!(temperature.value, 4.3);

    let humidity: Vec<_> = snapshot.humidity().iter().collect();
    assert_eq!(humidity[0].value, 71.3);
    assert_eq!(humidity[1].time, "21:20:50 09-03-2024");
    assert_eq!(humidity[1].value, 70.9);

    let guide = snapshot.guiding().iter().next().unwrap();
    assert_eq!(guide.time, "21:15:32 09-03-2024");
    assert_eq!(guide.ra_error, 0.31);
    assert_eq!(guide.dec_error, -0.41);
    assert_eq!(guide.total_error, 0.51);

    let capture = snapshot.capture().last().unwrap();
    assert_eq!(capture.time, "21:20:40 09-03-2024");
    assert_eq!(capture.hfr, 2.46);
    assert_eq!(capture.eccentricity, 0.51);

    let mount = snapshot.mount().last().unwrap();
    assert_eq!(mount.time, "21:20:42 09-03-2024");
    assert_eq!(mount.ra, 83.9);
    assert_eq!(mount.dec, -5.39);
    assert_eq!(mount.azimuth, 181.51);
    assert_eq!(mount.altitude, 46.1);
    assert_eq!(mount.pier_side, PierSide::East);
}

#[test]
fn test_pier_side_flag_values() {
    let cases = [
        ("0", PierSide::West),
        ("0.0", PierSide::West),
        ("-0", PierSide::West),
        ("1", PierSide::East),
        ("-1", PierSide::East),
        ("0.25", PierSide::East),
        ("2", PierSide::East),
    ];
    for (flag, expected) in cases {
        let mut p = parser();
        p.decode_line(&format!("MountCoords,0,1,2,3,4,{}", flag))
            .unwrap();
        assert_eq!(
            p.snapshot().mount().last().unwrap().pier_side,
            expected,
            "flag {}",
            flag
        );
    }
}

#[test]
fn test_pier_side_flag_must_be_numeric() {
    let mut p = parser();
    assert_eq!(
        p.decode_line("MountCoords,0,1,2,3,4,West").unwrap_err(),
        ParseError::MalformedField {
            field: "pier side",
            value: "West".to_string()
        }
    );
}

#[test]
fn test_guide_total_error_three_four_five() {
    let mut p = parser();
    p.decode_line("GuideStats,0,3.0,4.0").unwrap();
    let guide = p.snapshot().guiding().last().unwrap();
    assert_eq!(guide.ra_error, 3.0);
    assert_eq!(guide.dec_error, 4.0);
    assert_eq!(guide.total_error, 5.0);
}

#[test]
fn test_mount_retention_keeps_most_recent() {
    let mut p = parser();
    p.decode_line("MountCoords,1,10,20,30,40,0").unwrap();
    p.decode_line("MountCoords,2,11,21,31,41,0").unwrap();
    p.decode_line("MountCoords,3,12,22,32,42,1").unwrap();

    let mount: Vec<_> = p.snapshot().mount().iter().collect();
    assert_eq!(mount.len(), 1);
    assert_eq!(mount[0].ra, 12.0);
    assert_eq!(mount[0].time, "00:00:03 01-01-2000");
}

#[test]
fn test_guiding_retention_keeps_last_200_in_order() {
    let mut p = parser();
    for i in 1..=205 {
        p.decode_line(&format!("GuideStats,{},{},0", i, i)).unwrap();
    }

    let ra: Vec<f64> = p.snapshot().guiding().iter().map(|g| g.ra_error).collect();
    let expected: Vec<f64> = (6..=205).map(|i| i as f64).collect();
    assert_eq!(ra, expected);
}

#[test]
fn test_zero_offset_resolves_to_start_time() {
    let log = [
        "AnalyzeStartTime,2024-06-21 22:30:45.999999",
        "Temperature,0,12.3",
        "Humidity,0,45.6",
        "CaptureComplete,0,60,L,1.5,f.fits,1,2,0.4",
        "MountCoords,0,1,2,3,4,0",
        "GuideStats,0,0.1,0.1",
    ];
    let mut p = parser();
    p.parse_session(Some(log), &mut NullSink);

    let expected = "22:30:45 21-06-2024";
    assert_eq!(p.resolve_time("0").unwrap(), expected);
    for category in Category::ALL {
        let records = p.snapshot().records(category);
        assert_eq!(records.len(), 1, "{}", category);
        assert_eq!(records[0].time(), expected, "{}", category);
    }
}

#[test]
fn test_malformed_line_does_not_stop_pass() {
    let mut p = parser();
    let report = p.parse_session(Some(["Temperature,1,??", "Humidity,2,60"]), &mut NullSink);
    assert_eq!(report.errors.len(), 1);
    assert!(p.snapshot().temperature().is_empty());
    assert_eq!(p.snapshot().humidity().len(), 1);
}

#[test]
fn test_reset_after_pass_empties_all_categories() {
    let (mut parser, _) = parse_fixture();
    assert!(!parser.snapshot().is_empty());
    parser.reset_snapshot();
    for category in Category::ALL {
        assert_eq!(parser.snapshot().len(category), 0, "{}", category);
    }
    parser.reset_snapshot();
    assert!(parser.snapshot().is_empty());
}

#[test]
fn test_unknown_tag_no_mutation_no_error() {
    let mut p = parser();
    let before = serde_json::to_value(p.snapshot()).unwrap();
    assert_eq!(p.decode_line("FooBar,1,2,3").unwrap(), LineOutcome::Ignored);
    assert_eq!(serde_json::to_value(p.snapshot()).unwrap(), before);

    let report = p.parse_session(Some(["FooBar,1,2,3"]), &mut NullSink);
    assert!(report.errors.is_empty());
    assert_eq!(report.lines_ignored, 1);
}

#[test]
fn test_last_start_marker_applies_forward_only() {
    let mut p = parser();
    p.parse_session(
        Some([
            "AnalyzeStartTime,2024-01-01 20:00:00.000000",
            "Temperature,10,1",
            "AnalyzeStartTime,2024-01-02 21:00:00.000000",
            "Temperature,10,2",
        ]),
        &mut NullSink,
    );
    let times: Vec<_> = p.snapshot().temperature().iter().map(|t| t.time.clone()).collect();
    assert_eq!(times, vec!["20:00:10 01-01-2024", "21:00:10 02-01-2024"]);
}

#[test]
fn test_bad_start_marker_keeps_previous_clock() {
    let mut p = parser();
    let report = p.parse_session(
        Some([
            "AnalyzeStartTime,2024-01-01 20:00:00.000000",
            "AnalyzeStartTime,not a time",
            "Temperature,0,1",
        ]),
        &mut NullSink,
    );
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0].error,
        ParseError::MalformedTimestamp(_)
    ));
    assert_eq!(
        p.snapshot().temperature().last().unwrap().time,
        "20:00:00 01-01-2024"
    );
}

#[test]
fn test_empty_pass_notice_only() {
    let mut p = parser();
    let mut sink = VecSink::default();
    let report = p.parse_session(None::<Vec<String>>, &mut sink);
    assert!(report.is_empty_pass());
    assert_eq!(sink.messages, vec![NO_SESSION_NOTICE.to_string()]);
    assert!(p.snapshot().is_empty());
}

#[test]
fn test_sink_receives_errors_and_summary() {
    let mut p = parser();
    let mut sink = VecSink::default();
    p.parse_session(Some(["Humidity,x,1", "GuideStats,0,3,4"]), &mut sink);
    assert_eq!(sink.messages.len(), 2);
    assert!(sink.messages[0].starts_with("line 1: malformed time offset"));
    assert!(sink.messages[1].starts_with("Guiding: RA 3.00\", Dec 4.00\", total 5.00\""));
}

#[test]
fn test_snapshot_round_trip_through_json() {
    let (parser, _) = parse_fixture();
    let json = serde_json::to_string(parser.snapshot()).unwrap();
    let restored: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&restored).unwrap(), json);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mount"][0]["pierSide"], "E");
    assert_eq!(value["guiding"][0]["totalError"], 0.51);
}

#[test]
fn test_extreme_values_keep_snapshot_serializable() {
    let mut p = parser();
    let report = p.parse_session(
        Some([
            "Temperature,0,NaN",
            "Temperature,1,-inf",
            "Humidity,2,1e308",
            "MountCoords,3,1e308,-1e308,0,0,infinity",
            "GuideStats,4,1e200,1e200",
        ]),
        &mut NullSink,
    );
    assert_eq!(report.errors.len(), 3);
    assert_eq!(report.records_decoded, 2);

    let json = serde_json::to_string(p.snapshot()).unwrap();
    assert!(!json.contains("null"));
    let restored: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(Category::Humidity), 1);
    assert_eq!(restored.len(Category::Guiding), 1);
    assert!(restored.humidity().last().unwrap().value.is_finite());
    assert!(restored.guiding().last().unwrap().total_error.is_finite());
}

#[test]
fn test_reader_pass_continues_past_invalid_utf8() {
    let mut p = parser();
    let mut data = b"AnalyzeStartTime,2024-03-09 21:15:30.000000\n".to_vec();
    data.extend_from_slice(b"\xffTemperature,0,9\n");
    data.extend_from_slice(b"Temperature,1,\xc3\x28\n");
    data.extend_from_slice(b"GuideStats,2,0.3,0.4\r\n");
    data.extend_from_slice(b"Humidity,3,61.2\n");

    let mut sink = VecSink::default();
    let report = p.parse_reader(&data[..], &mut sink).unwrap();

    assert_eq!(report.lines_read, 5);
    assert_eq!(report.lines_ignored, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line_number, 3);
    assert!(sink.messages[0].starts_with("line 3: malformed temperature field"));
    assert!(p.snapshot().temperature().is_empty());
    assert_eq!(p.snapshot().guiding().last().unwrap().total_error, 0.5);
    assert_eq!(
        p.snapshot().humidity().last().unwrap().time,
        "21:15:33 09-03-2024"
    );
}
