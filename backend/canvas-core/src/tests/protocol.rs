// Unit tests for wire frame parsing

use crate::protocol::{ContentFormat, Payload, ServerFrame};

/// **VALUE**: Verifies the three recognized frame kinds parse from their wire
/// shapes.
///
/// **WHY THIS MATTERS**: Every inbound byte goes through this parse. If the
/// tag mapping drifts, the client silently discards all server traffic.
///
/// **BUG THIS CATCHES**: Would catch renamed discriminators or casing
/// mismatches between the enum and the wire.
#[test]
fn given_recognized_frames_when_parsed_then_kinds_map_correctly() {
    assert!(matches!(
        ServerFrame::parse(r#"{"type":"ping"}"#),
        Ok(ServerFrame::Ping)
    ));
    assert!(matches!(
        ServerFrame::parse(r#"{"type":"clear"}"#),
        Ok(ServerFrame::Clear)
    ));

    let frame = ServerFrame::parse(r##"{"type":"canvas","format":"markdown","content":"# Hi"}"##)
        .expect("canvas frame parses");
    match frame {
        ServerFrame::Canvas { format, content } => {
            assert_eq!(format, ContentFormat::Markdown);
            assert_eq!(content, "# Hi");
        }
        other => panic!("expected canvas frame, got {other:?}"),
    }
}

/// **VALUE**: Verifies unrecognized kinds and malformed JSON fail the parse
/// (the manager discards such frames).
///
/// **BUG THIS CATCHES**: Would catch a catch-all frame variant quietly
/// swallowing unknown kinds instead of rejecting them.
#[test]
fn given_unrecognized_or_malformed_frames_when_parsed_then_error() {
    assert!(ServerFrame::parse(r#"{"type":"resize","w":10}"#).is_err());
    assert!(ServerFrame::parse("not json at all").is_err());
    assert!(ServerFrame::parse(r#"{"format":"markdown"}"#).is_err());
}

/// **VALUE**: Verifies unknown content formats degrade to text handling and
/// missing fields take defaults.
///
/// **WHY THIS MATTERS**: Format is server-controlled. A new format must not
/// break old clients - it renders defensively as literal text.
///
/// **BUG THIS CATCHES**: Would catch the loss of the `other` fallback or of
/// the field defaults.
#[test]
fn given_unknown_format_when_parsed_then_falls_back_to_text() {
    let frame = ServerFrame::parse(r#"{"type":"canvas","format":"hologram","content":"x"}"#)
        .expect("unknown format still parses");
    assert!(matches!(
        frame,
        ServerFrame::Canvas {
            format: ContentFormat::Text,
            ..
        }
    ));

    let frame = ServerFrame::parse(r#"{"type":"canvas"}"#).expect("defaults fill fields");
    match frame {
        ServerFrame::Canvas { format, content } => {
            assert_eq!(format, ContentFormat::Text);
            assert_eq!(content, "");
        }
        other => panic!("expected canvas frame, got {other:?}"),
    }
}

/// **VALUE**: Verifies the frame-to-payload mapping: ping carries nothing,
/// clear and canvas carry their payloads.
#[test]
fn given_frames_when_converted_then_payload_mapping_is_exact() {
    assert_eq!(
        ServerFrame::parse(r#"{"type":"ping"}"#)
            .expect("parses")
            .into_payload(),
        None
    );
    assert_eq!(
        ServerFrame::parse(r#"{"type":"clear"}"#)
            .expect("parses")
            .into_payload(),
        Some(Payload::Clear)
    );
    assert_eq!(
        ServerFrame::parse(r#"{"type":"canvas","format":"html","content":"<b>x</b>"}"#)
            .expect("parses")
            .into_payload(),
        Some(Payload::Content {
            format: ContentFormat::Html,
            body: "<b>x</b>".to_string()
        })
    );
}

/// **VALUE**: Verifies the state-fetch shape: JSON `null` is "no state", a
/// frame object is a frame.
///
/// **WHY THIS MATTERS**: The state endpoint and the live channel share one
/// model; `null` must map to the waiting placeholder, not an error.
#[test]
fn given_state_response_when_parsed_as_option_then_null_is_none() {
    let none: Option<ServerFrame> = serde_json::from_str("null").expect("null parses");
    assert!(none.is_none());

    let some: Option<ServerFrame> =
        serde_json::from_str(r#"{"type":"clear"}"#).expect("object parses");
    assert!(matches!(some, Some(ServerFrame::Clear)));
}
