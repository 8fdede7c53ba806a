use ecur_bridge::aps::frame;
use ecur_bridge::error::{Error, ReadPhase};

// ArrayInfo body with a byte(10) in the middle, which would trip a reader
// that scanned for a newline instead of trusting the length header.
fn array_fixture() -> Vec<u8> {
    vec![
        65, 80, 83, 49, 49, 48, 48, 55, 53, 48, 48, 48, 50, 48, 48, 48, 49, 0, 2, 32, 33, 16, 32,
        20, 24, 5, 128, 16, 0, 3, 0, 0, 1, 48, 51, 1, 243, 0, 119, 0, 57, 0, 228, 0, 56, 0, 60, 0,
        10, 128, 16, 0, 3, 0, 1, 1, 48, 51, 1, 243, 0, 118, 0, 55, 0, 229, 0, 55, 0, 57, 0, 56,
        69, 78, 68, 10,
    ]
}

#[tokio::test]
async fn round_trip_framing() {
    let input = array_fixture();
    let mut source: &[u8] = &input;

    let frame = frame::read(&mut source).await.unwrap();
    assert_eq!(&frame[..], &input[..]);
    assert!(source.is_empty());
}

#[tokio::test]
async fn short_header_read_fails() {
    let mut source: &[u8] = b"APS11";

    let err = frame::read(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::Read { phase: ReadPhase::Header, .. }), "{:?}", err);
}

#[tokio::test]
async fn truncated_body_fails() {
    let input = array_fixture();
    let mut source: &[u8] = &input[..30];

    let err = frame::read(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::Read { phase: ReadPhase::Body, .. }), "{:?}", err);
}

#[tokio::test]
async fn non_numeric_length_field_fails() {
    let mut input = array_fixture();
    input[6] = b'x';
    let mut source: &[u8] = &input;

    let err = frame::read(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::MalformedBody(_)), "{:?}", err);
}

#[tokio::test]
async fn declared_length_shorter_than_header_fails() {
    // Declared length 5 means a 6-byte frame, less than the header already
    // consumed.
    let mut source: &[u8] = b"APS110005extra bytes";

    let err = frame::read(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::MalformedBody(_)), "{:?}", err);
}

#[tokio::test]
async fn corrupt_terminator_fails() {
    let mut input = array_fixture();
    let last = input.len() - 1;
    input[last] = b'X';
    let mut source: &[u8] = &input;

    let err = frame::read(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::MalformedBody(_)), "{:?}", err);
}

#[test]
fn validate_rejects_short_bodies() {
    let err = frame::validate(b"END\n").unwrap_err();
    assert!(matches!(err, Error::MalformedBody(_)), "{:?}", err);
}

#[test]
fn validate_rejects_length_mismatch() {
    let mut input = array_fixture();
    // Declared length no longer matches once a byte is appended before the
    // terminator.
    let at = input.len() - 4;
    input.insert(at, 0);
    let err = frame::validate(&input).unwrap_err();
    assert!(matches!(err, Error::MalformedBody(_)), "{:?}", err);
}

#[test]
fn validate_accepts_real_frames() {
    assert!(frame::validate(&array_fixture()).is_ok());
}
