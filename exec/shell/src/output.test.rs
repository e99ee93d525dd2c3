use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_decoder_holds_back_split_sequence() {
    let bytes = "héllo".as_bytes();
    // 'é' is two bytes starting at index 1.
    let mut decoder = Utf8Decoder::default();
    assert_eq!(decoder.decode(&bytes[..2]), "h");
    assert_eq!(decoder.decode(&bytes[2..]), "éllo");
    assert_eq!(decoder.finish(), "");
}

#[test]
fn test_decoder_replaces_invalid_bytes() {
    let mut decoder = Utf8Decoder::default();
    assert_eq!(decoder.decode(&[b'a', 0xff, b'b']), "a\u{fffd}b");
}

#[test]
fn test_decoder_keeps_split_char_after_invalid_byte() {
    let mut decoder = Utf8Decoder::default();
    // 0xff is invalid; 0xe2 0x82 0xac is '€' split across two reads.
    assert_eq!(decoder.decode(&[0xff, b'a', 0xe2, 0x82]), "\u{fffd}a");
    assert_eq!(decoder.decode(&[0xac]), "€");
    assert_eq!(decoder.finish(), "");
}

#[test]
fn test_decoder_replaces_each_invalid_run() {
    let mut decoder = Utf8Decoder::default();
    assert_eq!(
        decoder.decode(&[0xc3, b'x', 0xff, 0xfe, b'y']),
        "\u{fffd}x\u{fffd}\u{fffd}y"
    );
}

#[test]
fn test_decoder_finish_flushes_truncated_tail() {
    let mut decoder = Utf8Decoder::default();
    assert_eq!(decoder.decode(&[0xe2, 0x82]), "");
    assert_eq!(decoder.finish(), "\u{fffd}");
}

#[test]
fn test_pending_buffer_drain_on_read() {
    let mut buffer = PendingBuffer::new(1024);
    buffer.push("one ");
    buffer.push("two");
    assert_eq!(buffer.take(), ("one two".to_string(), 0));
    assert_eq!(buffer.take(), (String::new(), 0));
}

#[test]
fn test_pending_buffer_drops_oldest_with_marker() {
    let mut buffer = PendingBuffer::new(4);
    buffer.push("abcdef");
    assert_eq!(buffer.len(), 4);

    let (text, dropped) = buffer.take();
    assert_eq!(dropped, 2);
    assert_eq!(text, "[... 2 bytes dropped ...]\ncdef");
    assert_eq!(buffer.take(), (String::new(), 0));
}

#[test]
fn test_pending_buffer_cuts_on_char_boundary() {
    let mut buffer = PendingBuffer::new(3);
    // "é" is two bytes: cutting 1 byte would split it, so both go.
    buffer.push("éab");
    buffer.push("c");
    let (text, dropped) = buffer.take();
    assert_eq!(dropped, 2);
    assert!(text.ends_with("abc"));
}
