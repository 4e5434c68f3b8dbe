//! Tests for the plain and NDJSON transcript writers and file decoding.

mod common;

use common::*;
use replay_dump::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_trace(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(bytes).expect("failed to write trace");
    file.flush().unwrap();
    file
}

fn sample_trace() -> Vec<u8> {
    TraceBuilder::new(V12)
        .event(V12_INSTRUCTION)
        .u32(5)
        .event(V12_CP_CLOCK_WARP_START)
        .event(V12_ASYNC_BH)
        .u64(3)
        .event(V12_END)
        .build()
}

#[test]
fn test_plain_transcript() {
    let file = write_trace(&sample_trace());
    let config = DumpConfig::builder().trace(file.path()).build().unwrap();

    let mut buf = Vec::new();
    let mut out = PlainTranscript::new(&mut buf);
    let summary = decode_file(&config, &mut out).unwrap();
    out.summary(&summary).unwrap();
    assert_eq!(out.finish().unwrap(), 4);

    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "HEADER: version 0xe0200c\n\
         1:EVENT_INSTRUCTION(0) + 5 -> 5\n\
         2:EVENT_CP_CLOCK_WARP_START(30) more data follows\n\
         3:EVENT_ASYNC_BH(3)\n\
         4:EVENT_END(39)\n\
         Reached 28 of 28 bytes\n"
    );
}

#[test]
fn test_plain_transcript_failure() {
    let trace = TraceBuilder::new(V12)
        .event(V12_INSTRUCTION)
        .u32(1)
        .event(250)
        .build();
    let file = write_trace(&trace);
    let config = DumpConfig::builder().trace(file.path()).build().unwrap();

    let mut buf = Vec::new();
    let mut out = PlainTranscript::new(&mut buf);
    let failure = match decode_file(&config, &mut out) {
        Err(Error::Decode(failure)) => failure,
        other => panic!("expected decode failure, got {other:?}"),
    };
    out.failure(&failure).unwrap();
    out.finish().unwrap();

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "1:EVENT_INSTRUCTION(0) + 1 -> 1");
    assert_eq!(lines[2], "error unknown event 250");
    assert_eq!(lines[3], "Reached 18 of 18 bytes");
}

#[test]
fn test_plain_transcript_warning_line() {
    let trace = TraceBuilder::new(V6)
        .event(V6_CP_CLOCK_VIRTUAL)
        .event(V6_ASYNC)
        .u8(0)
        .u8(1)
        .u64(8)
        .build();

    let mut buf = Vec::new();
    let mut out = PlainTranscript::new(&mut buf);
    TraceDecoder::new(ByteSource::from_slice(&trace))
        .unwrap()
        .run(&mut out)
        .unwrap();
    out.finish().unwrap();

    let text = String::from_utf8(buf).unwrap();
    assert!(
        text.contains("\n  mismatch between checkpoint 4 and async data 1\n"),
        "transcript was:\n{text}"
    );
    assert!(text.contains("\n  REPLAY_ASYNC_EVENT_BH(0) @ 8\n"));
}

#[test]
fn test_json_lines_transcript() {
    let file = write_trace(&sample_trace());
    let config = DumpConfig::builder().trace(file.path()).build().unwrap();

    let mut buf = Vec::new();
    let mut out = JsonLinesTranscript::new(&mut buf);
    let summary = decode_file(&config, &mut out).unwrap();
    out.summary(&summary).unwrap();
    assert_eq!(out.finish().unwrap(), 4);

    let lines: Vec<serde_json::Value> = String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).expect("invalid JSON line"))
        .collect();
    assert_eq!(lines.len(), 6);

    assert_eq!(lines[0]["type"], "header");
    assert_eq!(lines[0]["format_version"], 0xe0200c);
    assert_eq!(lines[0]["generation"], "V12");

    assert_eq!(lines[1]["type"], "event");
    assert_eq!(lines[1]["name"], "EVENT_INSTRUCTION");
    assert_eq!(lines[1]["detail"]["kind"], "instructions");
    assert_eq!(lines[1]["detail"]["total"], 5);

    assert_eq!(lines[2]["detail"]["kind"], "checkpoint");
    assert_eq!(lines[2]["detail"]["more_data"], true);

    assert_eq!(lines[5]["type"], "summary");
    assert_eq!(lines[5]["termination"], "end_event");
    assert_eq!(lines[5]["total_instructions"], 5);
    assert_eq!(lines[5]["offset"], 28);
}

#[test]
fn test_json_lines_input_and_error() {
    let trace = TraceBuilder::new(V12)
        .event(V12_ASYNC_INPUT)
        .u32(0) // INPUT_EVENT_KIND_KEY
        .u32(1) // KEY_VALUE_KIND_QCODE
        .u32(36)
        .u8(0)
        .event(V12_RANDOM)
        .u32(0)
        .u32(64)
        .build();

    let mut buf = Vec::new();
    let mut out = JsonLinesTranscript::new(&mut buf);
    let failure = TraceDecoder::new(ByteSource::from_slice(&trace))
        .unwrap()
        .run(&mut out)
        .unwrap_err();
    out.failure(&failure).unwrap();
    out.finish().unwrap();

    let lines: Vec<serde_json::Value> = String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let detail = &lines[1]["detail"];
    assert_eq!(detail["kind"], "input");
    assert_eq!(detail["input"], "key_qcode");
    assert_eq!(detail["qcode"], 36);
    assert_eq!(detail["down"], false);

    let error = lines.last().unwrap();
    assert_eq!(error["type"], "error");
    assert!(error["message"].as_str().unwrap().contains("truncated"));
    assert_eq!(error["offset"], 35);
    assert_eq!(error["size"], 35);
}

#[test]
fn test_missing_trace_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = DumpConfig::builder()
        .trace(dir.path().join("missing.bin"))
        .build()
        .unwrap();

    let mut events: Vec<EventRecord> = Vec::new();
    let err = decode_file(&config, &mut events).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "unexpected error: {err}");
}

#[test]
fn test_config_requires_trace() {
    let err = DumpConfig::builder().strict_checkpoints(true).build().unwrap_err();
    assert!(err.to_string().contains("trace"));
}

#[test]
fn test_config_options_reach_decoder() {
    let trace = TraceBuilder::new(V6)
        .event(V6_CP_CLOCK_VIRTUAL)
        .event(V6_ASYNC)
        .u8(0)
        .u8(0)
        .u64(0)
        .build();
    let file = write_trace(&trace);

    let lenient = DumpConfig::builder().trace(file.path()).build().unwrap();
    let mut events: Vec<EventRecord> = Vec::new();
    assert!(decode_file(&lenient, &mut events).is_ok());

    let strict = DumpConfig::builder()
        .trace(file.path())
        .strict_checkpoints(true)
        .build()
        .unwrap();
    let mut events: Vec<EventRecord> = Vec::new();
    let err = decode_file(&strict, &mut events).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeFailure {
            error: DecodeError::CheckpointMismatch { .. },
            ..
        })
    ));

    // Reading a V6 trace with the V12 table turns id 16 into a shutdown marker.
    let forced = DumpConfig::builder()
        .trace(file.path())
        .version_override(V12)
        .build()
        .unwrap();
    let mut events: Vec<EventRecord> = Vec::new();
    let _ = decode_file(&forced, &mut events);
    assert_eq!(events[0].name, "EVENT_SHUTDOWN_GUEST_SHUTDOWN");
}
