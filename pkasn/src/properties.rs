//! End-to-end properties of the codec

use crate::{BerDecoder, BerError, BerResult, BitString, ClassTag, DerEncoder, TypeTag};
use num_bigint::{BigInt, Sign};
use rand::Rng;

/// A tree of the universal types the codec round-trips
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Bool(bool),
    Null,
    Int(BigInt),
    Octets(Vec<u8>),
    Bits(BitString),
    Seq(Vec<Value>),
}

fn encode_value(encoder: &mut DerEncoder, value: &Value) -> BerResult<()> {
    match value {
        Value::Bool(b) => encoder.encode_bool(*b).map(|_| ()),
        Value::Null => encoder.encode_null().map(|_| ()),
        Value::Int(i) => encoder.encode_bigint(i).map(|_| ()),
        Value::Octets(bytes) => encoder.encode_octet_string(bytes).map(|_| ()),
        Value::Bits(bits) => encoder.encode_bit_string(bits).map(|_| ()),
        Value::Seq(items) => {
            encoder.start_sequence()?;
            for item in items {
                encode_value(encoder, item)?;
            }
            encoder.end_cons().map(|_| ())
        }
    }
}

fn to_der(value: &Value) -> Vec<u8> {
    let mut encoder = DerEncoder::new();
    encode_value(&mut encoder, value).unwrap();
    encoder.into_bytes().unwrap()
}

/// BER with every SEQUENCE in indefinite-length form
fn to_indefinite_ber(value: &Value) -> Vec<u8> {
    match value {
        Value::Seq(items) => {
            let mut out = vec![0x30, 0x80];
            for item in items {
                out.extend(to_indefinite_ber(item));
            }
            out.extend_from_slice(&[0x00, 0x00]);
            out
        }
        other => to_der(other),
    }
}

fn decode_value(decoder: &mut BerDecoder<'_>) -> BerResult<Value> {
    let next = decoder.peek_next_object()?;
    let Some((type_tag, class_tag)) = next.tagging() else {
        return Err(BerError::InvalidData("expected a value".to_string()));
    };
    match (type_tag, class_tag) {
        (TypeTag::BOOLEAN, ClassTag::UNIVERSAL) => decoder.decode_bool().map(Value::Bool),
        (TypeTag::NULL, ClassTag::UNIVERSAL) => decoder.decode_null().map(|_| Value::Null),
        (TypeTag::INTEGER, ClassTag::UNIVERSAL) => decoder.decode_bigint().map(Value::Int),
        (TypeTag::OCTET_STRING, ClassTag::UNIVERSAL) => {
            decoder.get_next_octet_string().map(Value::Octets)
        }
        (TypeTag::BIT_STRING, ClassTag::UNIVERSAL) => decoder.decode_bit_string().map(Value::Bits),
        (TypeTag::SEQUENCE, ClassTag::CONSTRUCTED) => {
            decoder.start_sequence()?;
            let mut items = Vec::new();
            while decoder.more_items()? {
                items.push(decode_value(decoder)?);
            }
            decoder.end_cons()?;
            Ok(Value::Seq(items))
        }
        _ => Err(BerError::InvalidData(format!("unexpected {}", next))),
    }
}

fn decode_all(data: &[u8]) -> BerResult<Value> {
    let mut decoder = BerDecoder::new(data);
    let value = decode_value(&mut decoder)?;
    decoder.verify_end()?;
    Ok(value)
}

fn random_bytes(rng: &mut impl Rng, max: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; rng.gen_range(0..=max)];
    rng.fill(&mut bytes[..]);
    bytes
}

fn random_bigint(rng: &mut impl Rng) -> BigInt {
    let magnitude = random_bytes(rng, 24);
    let sign = if rng.gen_bool(0.5) { Sign::Minus } else { Sign::Plus };
    BigInt::from_bytes_be(sign, &magnitude)
}

fn random_value(rng: &mut impl Rng, depth: usize) -> Value {
    let kinds = if depth == 0 { 5 } else { 6 };
    match rng.gen_range(0..kinds) {
        0 => Value::Bool(rng.gen_bool(0.5)),
        1 => Value::Null,
        2 => Value::Int(random_bigint(rng)),
        3 => Value::Octets(random_bytes(rng, 40)),
        4 => {
            let bytes = random_bytes(rng, 6);
            let unused = if bytes.is_empty() { 0 } else { rng.gen_range(0..8) };
            Value::Bits(BitString::new(bytes, unused).unwrap())
        }
        _ => {
            let count = rng.gen_range(0..5);
            Value::Seq((0..count).map(|_| random_value(rng, depth - 1)).collect())
        }
    }
}

fn random_sequence(rng: &mut impl Rng) -> Value {
    let count = rng.gen_range(1..5);
    Value::Seq((0..count).map(|_| random_value(rng, 3)).collect())
}

#[test]
fn test_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let value = random_value(&mut rng, 3);
        let der = to_der(&value);
        assert_eq!(decode_all(&der).unwrap(), value, "round trip of {:02X?}", der);
    }
}

#[test]
fn test_negative_integer_round_trip() {
    for n in [-1i64, -128, -129, -256, -32768, -32769, i64::MIN] {
        let der = to_der(&Value::Int(BigInt::from(n)));
        assert_eq!(decode_all(&der).unwrap(), Value::Int(BigInt::from(n)));
    }
}

#[test]
fn test_length_minimality() {
    for size in [0usize, 1, 127, 128, 255, 256, 300, 65535, 65536] {
        let der = to_der(&Value::Octets(vec![0xAB; size]));
        let expected_header: Vec<u8> = match size {
            0..=127 => vec![size as u8],
            128..=255 => vec![0x81, size as u8],
            256..=65535 => vec![0x82, (size >> 8) as u8, size as u8],
            _ => vec![0x83, (size >> 16) as u8, (size >> 8) as u8, size as u8],
        };
        assert_eq!(&der[1..1 + expected_header.len()], &expected_header[..]);
        assert_eq!(der.len(), 1 + expected_header.len() + size);
    }
}

#[test]
fn test_push_back_idempotence() {
    let data = [0x02, 0x01, 0x05, 0x01, 0x01, 0xFF];
    let mut decoder = BerDecoder::new(&data);
    let first = decoder.get_next_object().unwrap();
    decoder.push_back(first.clone()).unwrap();
    assert!(matches!(
        decoder.push_back(first.clone()),
        Err(BerError::PushBackPending)
    ));
    assert_eq!(decoder.get_next_object().unwrap(), first);
    assert!(decoder.decode_bool().unwrap());
}

#[test]
fn test_truncation_of_scenario() {
    let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xFF];
    for len in 2..data.len() {
        let mut decoder = BerDecoder::new(&data[..len]);
        assert!(
            matches!(decoder.start_sequence(), Err(BerError::ValueTruncated)),
            "prefix of {} bytes",
            len
        );
    }
    let mut decoder = BerDecoder::new(&data[..1]);
    assert!(matches!(decoder.get_next_object(), Err(BerError::LengthNotFound)));

    let mut decoder = BerDecoder::new(&data[..0]);
    assert!(!decoder.get_next_object().unwrap().is_set());
}

#[test]
fn test_truncation_of_random_structures() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let der = to_der(&random_sequence(&mut rng));
        let header = if der[1] < 0x80 { 2 } else { 2 + usize::from(der[1] & 0x7F) };
        for len in 2..der.len() {
            let result = decode_all(&der[..len]);
            if len < header {
                assert!(matches!(result, Err(BerError::LengthTruncated)));
            } else {
                assert!(
                    matches!(result, Err(BerError::ValueTruncated)),
                    "prefix of {} bytes of {:02X?} gave {:?}",
                    len,
                    der,
                    result
                );
            }
        }
    }
}

#[test]
fn test_indefinite_length_equivalence() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let value = random_sequence(&mut rng);
        let der = to_der(&value);
        let ber = to_indefinite_ber(&value);
        assert_eq!(decode_all(&ber).unwrap(), decode_all(&der).unwrap());
    }
}

#[test]
fn test_indefinite_length_raw_content() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let count = rng.gen_range(0..6);
        let value = Value::Seq((0..count).map(|_| random_value(&mut rng, 0)).collect());
        let der = to_der(&value);
        let ber = to_indefinite_ber(&value);

        let object = BerDecoder::new(&ber).get_next_object().unwrap();
        assert_eq!(object.to_der().unwrap(), der);

        let mut decoder = BerDecoder::new(&ber);
        decoder.start_sequence().unwrap();
        let content = decoder.raw_bytes().unwrap();
        assert_eq!(content, object.into_value());
        decoder.end_cons().unwrap().verify_end().unwrap();
    }
}

fn nested_indefinite(depth: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for _ in 0..depth {
        data.extend_from_slice(&[0x30, 0x80]);
    }
    data.extend_from_slice(&[0x05, 0x00]);
    for _ in 0..depth {
        data.extend_from_slice(&[0x00, 0x00]);
    }
    data
}

#[test]
fn test_nesting_bound() {
    let data = nested_indefinite(16);
    let mut decoder = BerDecoder::new(&data);
    for _ in 0..16 {
        decoder.start_sequence().unwrap();
    }
    decoder.decode_null().unwrap();
    for _ in 0..16 {
        decoder.end_cons().unwrap();
    }
    decoder.verify_end().unwrap();

    let data = nested_indefinite(17);
    let mut decoder = BerDecoder::new(&data);
    assert!(matches!(decoder.get_next_object(), Err(BerError::NestingTooDeep)));

    // thousands of levels fail the same way instead of exhausting the stack
    let data = nested_indefinite(5000);
    let mut decoder = BerDecoder::new(&data);
    assert!(matches!(decoder.get_next_object(), Err(BerError::NestingTooDeep)));
}

#[test]
fn test_bit_string_unused_bits() {
    for unused in 0u8..=255 {
        let data = [0x03, 0x02, unused, 0x00];
        let result = BerDecoder::new(&data).decode_bit_string();
        if unused < 8 {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(BerError::InvalidBitString(_))));
        }
    }
    let result = BerDecoder::new(&[0x03, 0x00]).decode_bit_string();
    assert!(matches!(result, Err(BerError::InvalidBitString(_))));
}

#[test]
fn test_end_cons_strictness() {
    let data = to_der(&Value::Seq(vec![
        Value::Int(BigInt::from(1)),
        Value::Null,
        Value::Bool(false),
    ]));
    for read in 0..3 {
        let mut decoder = BerDecoder::new(&data);
        decoder.start_sequence().unwrap();
        for _ in 0..read {
            decoder.get_next_object().unwrap();
        }
        assert!(matches!(decoder.end_cons(), Err(BerError::DataLeft)));
    }

    let mut decoder = BerDecoder::new(&data);
    decoder.start_sequence().unwrap();
    for _ in 0..3 {
        decoder.get_next_object().unwrap();
    }
    decoder.end_cons().unwrap();
    assert!(matches!(decoder.end_cons(), Err(BerError::NullParent)));
}

#[test]
fn test_negative_integer_reconstruction() {
    let int = |bytes: &[u8]| {
        let mut data = vec![0x02, bytes.len() as u8];
        data.extend_from_slice(bytes);
        BerDecoder::new(&data).decode_bigint().unwrap()
    };
    assert_eq!(int(&[0xFF]), BigInt::from(-1));
    assert_eq!(int(&[0x80]), BigInt::from(-128));
    assert_eq!(int(&[0x00, 0x80]), BigInt::from(128));
}

#[test]
fn test_concrete_scenario() {
    let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xFF];
    let mut decoder = BerDecoder::new(&data);
    decoder.start_sequence().unwrap();
    let number = decoder.decode_u32().unwrap();
    let flag = decoder.decode_bool().unwrap();
    decoder.end_cons().unwrap();
    assert_eq!((number, flag), (5, true));
    assert!(!decoder.more_items().unwrap());
}
