use paste::paste;

pub fn take_n_bytes(buf: &[u8], offset: usize, n: usize) -> Option<&[u8]> {
    buf.get(offset..offset.checked_add(n)?)
}

macro_rules! take_bytes {
    ($($num:expr),*) => {
        paste! {
            $(
                pub fn [<take_ $num _bytes>](buf: &[u8], offset: usize) -> Option<[u8; $num]> {
                    take_n_bytes(buf, offset, $num)?.try_into().ok()
                }
            )*
        }
    };
}

take_bytes!(8, 32);

/// Bytes are Latin-1, so every byte maps to the char with the same code point.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Trims ASCII whitespace only; Latin-1 0x85 and 0xA0 are data.
pub fn trim_ascii(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// A string survives pad-then-trim unchanged.
pub fn is_trimmed(text: &str) -> bool {
    trim_ascii(text).len() == text.len() && !text.ends_with('\0')
}

pub fn trim_fill(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0x00 && b != b' ')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_takes_fixed_windows() {
        let buf: &[u8] = b"0123456789abcdef";
        assert_eq!(take_8_bytes(buf, 8), Some(*b"89abcdef"));
        assert_eq!(take_8_bytes(buf, 9), None);
        assert_eq!(take_n_bytes(buf, 14, 2), Some(&b"ef"[..]));
        assert_eq!(take_n_bytes(buf, usize::MAX, 2), None);
    }

    #[test]
    fn it_trims_trailing_fill_only() {
        assert_eq!(trim_fill(b" Al\0\0 "), b" Al");
        assert_eq!(trim_fill(b"\0\0\0"), b"");
        assert_eq!(trim_fill(b""), b"");
    }

    #[test]
    fn it_decodes_latin1() {
        assert_eq!(latin1_to_string(b"caf\xe9"), "café");
    }

    #[test]
    fn it_trims_ascii_whitespace_only() {
        assert_eq!(trim_ascii(" \tAl\r\n"), "Al");
        assert_eq!(trim_ascii("Al\u{a0}"), "Al\u{a0}");
        assert_eq!(trim_ascii("\u{85}Al"), "\u{85}Al");
    }

    #[test]
    fn it_knows_which_strings_survive_padding() {
        assert!(is_trimmed("Al"));
        assert!(is_trimmed(""));
        assert!(is_trimmed("Al\u{a0}"));
        assert!(is_trimmed("A l"));
        assert!(!is_trimmed(" Al"));
        assert!(!is_trimmed("Al\t"));
        assert!(!is_trimmed("Al\0"));
    }
}
