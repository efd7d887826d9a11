#![expect(missing_docs)]

use core::fmt::Write;

use bytestream::{ByteBuffer, SignedEnvelope};

fn render(envelope: &SignedEnvelope) -> String {
    let mut out = String::new();
    let bytes = envelope.encode().unwrap();
    writeln!(out, "hex: {}", ByteBuffer::from(bytes.clone()).to_hex_string()).unwrap();
    writeln!(out, "base64: {}", envelope.to_base64().unwrap()).unwrap();
    writeln!(out, "decoded: {:?}", SignedEnvelope::decode(&bytes)).unwrap();
    out
}

#[test]
fn snapshot_small_envelopes() {
    insta::assert_snapshot!(render(&SignedEnvelope::new(*b"AB", *b"C")), @r#"
    hex: 0A024142120143
    base64: CgJBQhIBQw==
    decoded: Ok(SignedEnvelope { data: [65, 66], signature: [67] })
    "#);
    insta::assert_snapshot!(render(&SignedEnvelope::new(*b"nonce", Vec::new())), @r#"
    hex: 0A056E6F6E63651200
    base64: CgVub25jZRIA
    decoded: Ok(SignedEnvelope { data: [110, 111, 110, 99, 101], signature: [] })
    "#);
}

#[test]
fn snapshot_rejections() {
    let mut out = String::new();
    let inputs: [&[u8]; 3] = [
        &[0x0B, 0x00],
        &[0x0A, 0x01, 0x41, 0x13],
        &[0x0A, 0x00, 0x12, 0x05, 0x01],
    ];
    for input in inputs {
        let err = SignedEnvelope::decode(input).unwrap_err();
        writeln!(out, "{err}").unwrap();
    }
    insta::assert_snapshot!(out, @r#"
    expected data tag 0x0a, found Some(11)
    signature tag 0x12 not found after the data field
    signature length does not match the remaining input
    "#);
}

#[test]
fn two_byte_lengths_on_both_fields() {
    let data: Vec<u8> = (0..200u8).map(|b| b | 0x40).collect();
    let signature = vec![0xEE; 256];
    let envelope = SignedEnvelope::new(data, signature);
    let bytes = envelope.encode().unwrap();
    assert_eq!(&bytes[..3], [0x0A, 0xC8, 0x01]);
    assert_eq!(&bytes[203..206], [0x12, 0x80, 0x02]);
    assert_eq!(bytes.len(), 206 + 256);
    assert_eq!(SignedEnvelope::decode(&bytes).unwrap(), envelope);
}

#[test]
fn challenge_fields_assemble_into_the_wire_form() {
    let envelope = SignedEnvelope::from_base64_fields("bm9uY2U=", "").unwrap();
    assert_eq!(envelope.data, b"nonce");
    assert!(envelope.signature.is_empty());
    assert_eq!(envelope.to_base64().unwrap(), "CgVub25jZRIA");
}
