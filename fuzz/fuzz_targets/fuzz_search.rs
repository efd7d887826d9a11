#![no_main]

use arbitrary::Arbitrary;
use bytestream::{ByteBuffer, Direction, SearchWindow};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    haystack: Vec<u8>,
    patterns: Vec<Vec<u8>>,
    start: Option<u16>,
    length: Option<u16>,
    backward: bool,
}

fuzz_target!(|input: Input| {
    let buffer = ByteBuffer::from(input.haystack);
    let window = SearchWindow {
        start: input.start.map(usize::from),
        length: input.length.map(usize::from),
        direction: if input.backward {
            Direction::Backward
        } else {
            Direction::Forward
        },
    };
    let patterns = &input.patterns;

    if let Some(m) = buffer.find_first_in(patterns, window) {
        assert!(m.position <= buffer.len());
    }
    let _ = buffer.find_first_not_in(patterns, window);
    let _ = buffer.find_first_sequence(patterns, window);
    let _ = buffer.skip_patterns(patterns, window);
    let _ = buffer.skip_not_patterns(patterns, window);

    let all = buffer.find_all_in(patterns, window);
    assert!(all.windows(2).all(|w| w[0].position <= w[1].position));
    let _ = buffer.find_all_not_in(patterns, window);
    let _ = buffer.find_all_sequences(patterns, window);
    let _ = buffer.find_paired_arrays(patterns, patterns, window);

    if let Some(first) = patterns.first() {
        let ends = buffer.find_all_pattern_in(first, window);
        let mut rewritten = buffer.clone();
        if let Some(outcome) = rewritten.replace_pattern(first, b"", window) {
            assert_eq!(outcome.search_positions, ends);
            assert_eq!(rewritten.len(), buffer.len() - ends.len() * first.len());
        }
    }
});
