//! `Encoder`/`Decoder` traits and primitive-type impls, plus the MQTT
//! variable byte integer used for the remaining-length field.

use std::mem;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::DecodeError;

pub trait Decoder {
    fn decode<T>(buffer: &mut T) -> crate::Result<Self>
    where
        Self: Sized,
        T: Buf;
}

pub trait Encoder {
    fn encode(&self, buffer: &mut BytesMut);
    fn encoded_size(&self) -> usize {
        mem::size_of_val(self)
    }
}

fn encode_var_byte_integer(value: u32, encoded: &mut BytesMut) {
    let mut x = value;

    loop {
        let mut encoded_byte: u8 = (x % 128) as u8;
        x /= 128;

        if x > 0 {
            encoded_byte |= 0b1000_0000;
        }

        encoded.put_u8(encoded_byte);

        if x == 0 {
            break;
        }
    }
}

fn decode_var_byte_integer<T: Buf>(encoded: &mut T) -> crate::Result<VariableByteInteger> {
    let mut multiplier: u32 = 1;
    let mut value: u32 = 0;

    loop {
        if !encoded.has_remaining() {
            return Err(DecodeError::UnexpectedEof.into());
        }

        let encoded_byte = encoded.get_u8();
        value += (encoded_byte & 0b0111_1111) as u32 * multiplier;

        if multiplier > 128 * 128 * 128 {
            return Err(DecodeError::VarIntTooLarge.into());
        }

        multiplier *= 128;

        if (encoded_byte & 0b1000_0000) == 0 {
            break;
        }
    }

    Ok(VariableByteInteger(value))
}

/// MQTT's 1-4 byte variable length integer, used for the remaining-length
/// field of the fixed header.
#[derive(PartialEq, Eq, Debug, Default, Clone, Copy)]
pub struct VariableByteInteger(pub u32);

impl Encoder for VariableByteInteger {
    fn encode(&self, buffer: &mut BytesMut) {
        encode_var_byte_integer(self.0, buffer);
    }

    fn encoded_size(&self) -> usize {
        match self.0 {
            0..=127 => 1,
            128..=16383 => 2,
            16384..=2097151 => 3,
            2097152..=268435455 => 4,
            _ => unreachable!("remaining length cannot exceed 268_435_455"),
        }
    }
}

impl Decoder for VariableByteInteger {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        decode_var_byte_integer(buffer)
    }
}

impl Encoder for String {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.len() as u16);
        buffer.put(self.as_bytes());
    }

    fn encoded_size(&self) -> usize {
        self.len() + mem::size_of::<u16>()
    }
}

impl Decoder for String {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if buffer.remaining() < 2 {
            return Err(DecodeError::UnexpectedEof.into());
        }

        let length = buffer.get_u16();
        if buffer.remaining() < length as usize {
            return Err(DecodeError::UnexpectedEof.into());
        }

        let bytes = buffer.copy_to_bytes(length.into());

        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8.into())
    }
}

impl Encoder for u8 {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(*self);
    }
}

impl Decoder for u8 {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if !buffer.has_remaining() {
            return Err(DecodeError::UnexpectedEof.into());
        }

        Ok(buffer.get_u8())
    }
}

impl Encoder for u16 {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(*self);
    }
}

impl Decoder for u16 {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if buffer.remaining() < 2 {
            return Err(DecodeError::UnexpectedEof.into());
        }

        Ok(buffer.get_u16())
    }
}

impl Encoder for bool {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(*self as u8);
    }
}

impl Decoder for bool {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if !buffer.has_remaining() {
            return Err(DecodeError::UnexpectedEof.into());
        }

        Ok(buffer.get_u8() != 0)
    }
}

impl Encoder for Bytes {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(self);
    }

    fn encoded_size(&self) -> usize {
        self.len()
    }
}

impl<T> Encoder for Vec<T>
where
    T: Encoder,
{
    fn encode(&self, buffer: &mut BytesMut) {
        for e in self {
            e.encode(buffer);
        }
    }

    fn encoded_size(&self) -> usize {
        self.iter().map(Encoder::encoded_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn variable_byte_integer_round_trip() -> crate::Result<()> {
        let value: u32 = 325;
        let mut encoded = BytesMut::new();

        VariableByteInteger(value).encode(&mut encoded);
        assert_eq!(encoded, Bytes::from(vec![0xc5, 0x02]));

        let byte_count = encoded.len();
        let decoded = VariableByteInteger::decode(&mut encoded)?;
        assert_eq!(decoded.0, value);
        assert_eq!(byte_count, 2);

        Ok(())
    }

    #[test]
    fn variable_byte_integer_boundaries() {
        for &(value, expected_len) in &[
            (0u32, 1usize),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
            (268_435_455, 4),
        ] {
            let mut encoded = BytesMut::new();
            VariableByteInteger(value).encode(&mut encoded);
            assert_eq!(encoded.len(), expected_len, "value={value}");

            let decoded = VariableByteInteger::decode(&mut encoded).unwrap();
            assert_eq!(decoded.0, value);
        }
    }

    #[test]
    fn malformed_integer_is_rejected() {
        let mut encoded = Bytes::from(vec![0xc5, 0xc5, 0xc5, 0xc5, 0x02]);

        match VariableByteInteger::decode(&mut encoded) {
            Err(Error::Decode(e)) => assert_eq!(e, DecodeError::VarIntTooLarge),
            _ => panic!("expected VarIntTooLarge"),
        }
    }

    #[test]
    fn string_round_trip() -> crate::Result<()> {
        let value = "test/topic".to_string();
        let mut encoded = BytesMut::new();
        value.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = String::decode(&mut frozen)?;
        assert_eq!(decoded, value);

        Ok(())
    }
}
