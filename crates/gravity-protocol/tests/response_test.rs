//! Protocol-level tests feeding captured sync responses through the
//! accumulator and scanner.

use gravity_protocol::{
    next_token, AccumResult, MacAddress, ResponseAccumulator, Tag, TokenIter, DEFAULT_CAPACITY,
    MAX_VALUE_LEN,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CAPTURED: &[u8] = b"sync\r\n(0:1)(1:8)(2:32)(3:20)(4:6)(5:40:91:51:BB:AC:7D)(6:5)(7:1)\
(8:0)(9:30)(10:2)(11:1)(12:5)(13:-100)(14:15)\r\nGRAVITY> ";

fn accumulate(chunks: &[&[u8]]) -> (AccumResult, Vec<u8>) {
    let mut acc = ResponseAccumulator::new();
    let mut last = AccumResult::Pending;
    for chunk in chunks {
        last = acc.append(chunk);
    }
    (last, acc.as_bytes().to_vec())
}

#[test]
fn test_end_to_end_scenario() {
    let (result, buffer) = accumulate(&[b"(5:40:91:51:BB:AC:7D)(6:5)(7:1)>"]);
    assert_eq!(result, AccumResult::Complete);

    let tokens: Vec<_> = TokenIter::new(&buffer).map(|t| t.unwrap()).collect();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].tag(), Some(Tag::Mac));
    let mac = MacAddress::parse(tokens[0].value().as_str().unwrap()).unwrap();
    assert_eq!(mac.to_string(), "40:91:51:BB:AC:7D");
    assert_eq!(tokens[1].value().parse::<u32>(), Ok(5));
    assert_eq!(tokens[2].value().parse::<u32>(), Ok(1));
}

#[test]
fn test_byte_by_byte_matches_single_chunk() {
    let (whole_result, whole) = accumulate(&[CAPTURED]);

    let chunks: Vec<&[u8]> = CAPTURED.chunks(1).collect();
    let (split_result, split) = accumulate(&chunks);

    assert_eq!(whole_result, AccumResult::Complete);
    assert_eq!(split_result, AccumResult::Complete);
    assert_eq!(whole, split);
    assert_eq!(TokenIter::new(&whole).count(), 15);
}

#[test]
fn test_prompt_straddling_chunks() {
    // Completion must be found even when the prompt is the only byte of the
    // newest chunk.
    let (result, _) = accumulate(&[b"(4:6)", b"\r\nGRAVITY", b">"]);
    assert_eq!(result, AccumResult::Complete);
}

#[test]
fn test_captured_response_fits_default_capacity() {
    assert!(CAPTURED.len() <= DEFAULT_CAPACITY);
}

#[test]
fn test_scanner_never_reads_past_end() {
    // Every prefix of a valid response must scan without panicking and only
    // ever yield whole groups.
    for end in 0..CAPTURED.len() {
        let slice = &CAPTURED[..end];
        for cursor in 0..=slice.len() {
            if let Some((_, next)) = next_token(slice, cursor) {
                assert!(next <= slice.len());
            }
        }
        for token in TokenIter::new(slice).flatten() {
            assert!(token.value().len() <= 17);
        }
    }
}

/// Random bytes weighted towards the protocol's delimiters and digits.
fn noise(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
    const ALPHABET: &[u8] = b"(((:::)))>z0123456789-AF \r\n";
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.75) {
                ALPHABET[rng.gen_range(0..ALPHABET.len())]
            } else {
                rng.gen()
            }
        })
        .collect()
}

#[test]
fn test_scanner_bounded_on_random_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7363_616e);

    for _ in 0..500 {
        let len = rng.gen_range(0..96);
        let input = noise(&mut rng, len);

        for cursor in 0..=input.len() + 1 {
            if let Some((token, next)) = next_token(&input, cursor) {
                assert!(next > cursor && next <= input.len());
                if let Ok(token) = token {
                    assert!(token.value().len() <= MAX_VALUE_LEN);
                }
            }
        }

        let opens = input.iter().filter(|&&b| b == b'(').count();
        assert!(TokenIter::new(&input).count() <= opens);
    }
}

#[test]
fn test_accumulator_bounded_on_random_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x6163_6375);

    for _ in 0..200 {
        let capacity = rng.gen_range(1..64);
        let mut acc = ResponseAccumulator::with_capacity(capacity);
        let mut fed = 0;

        for _ in 0..rng.gen_range(1..16) {
            let len = rng.gen_range(0..32);
            let chunk = noise(&mut rng, len);
            fed += chunk.len();
            acc.append(&chunk);

            assert!(acc.buffered_len() <= capacity);
            assert_eq!(acc.buffered_len() + acc.dropped(), fed);
        }
    }
}
