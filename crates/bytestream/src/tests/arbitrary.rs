use alloc::vec::Vec;

use quickcheck::{Arbitrary, Gen};

use crate::{BitBuffer, Direction, SignedEnvelope, varint::MAX_VARINT};

impl Arbitrary for Direction {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Fields stay below 128 bytes: with a two-byte signature length of 128 to
/// 255 a truncated envelope can still parse with the one-byte form.
impl Arbitrary for SignedEnvelope {
    fn arbitrary(g: &mut Gen) -> Self {
        let field = |g: &mut Gen| {
            let mut bytes = Vec::<u8>::arbitrary(g);
            bytes.truncate(127);
            bytes
        };
        SignedEnvelope {
            data: field(g),
            signature: field(g),
        }
    }

    fn shrink(&self) -> alloc::boxed::Box<dyn Iterator<Item = Self>> {
        let signature = self.signature.clone();
        alloc::boxed::Box::new(self.data.shrink().map(move |data| SignedEnvelope {
            data,
            signature: signature.clone(),
        }))
    }
}

/// An envelope whose data length needs the two-byte varint form.
///
/// Data bytes never equal `0x12`: one at the offset the one-byte length
/// points to would be read as the signature tag.
#[derive(Debug, Clone)]
pub struct WideEnvelope(pub SignedEnvelope);

impl Arbitrary for WideEnvelope {
    fn arbitrary(g: &mut Gen) -> Self {
        let bytes = |g: &mut Gen, len: usize| -> Vec<u8> {
            (0..len).map(|_| u8::arbitrary(g)).collect()
        };
        let data_len = usize::arbitrary(g) % (MAX_VARINT - 127) + 128;
        let mut data = bytes(g, data_len);
        for byte in &mut data {
            if *byte == 0x12 {
                *byte = 0x13;
            }
        }
        let signature_len = usize::arbitrary(g) % (MAX_VARINT + 1);
        WideEnvelope(SignedEnvelope {
            data,
            signature: bytes(g, signature_len),
        })
    }
}

impl Arbitrary for BitBuffer {
    fn arbitrary(g: &mut Gen) -> Self {
        let bits = Vec::<bool>::arbitrary(g);
        let text: alloc::string::String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
        BitBuffer::from_bit_string(&text).unwrap()
    }
}
