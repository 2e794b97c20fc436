/// Strips the NUL padding some HEOS firmware appends after a response.
///
/// Only trailing `0x00` bytes are removed; anything before the last non-NUL
/// byte is returned untouched, so an all-NUL frame trims to an empty slice.
pub fn trim_frame(raw: &[u8]) -> &[u8] {
    let end = raw.iter().rposition(|&byte| byte != 0).map_or(0, |last| last + 1);
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::trim_frame;

    #[test]
    fn trims_trailing_nuls() {
        assert_eq!(trim_frame(b"{}\0\0\0"), b"{}");
    }

    #[test]
    fn keeps_leading_and_interior_nuls() {
        assert_eq!(trim_frame(b"\0a\0b\0"), b"\0a\0b");
    }

    #[test]
    fn all_padding_trims_to_empty() {
        assert!(trim_frame(b"\0\0").is_empty());
        assert!(trim_frame(b"").is_empty());
    }

    #[test]
    fn unpadded_frame_is_unchanged() {
        assert_eq!(trim_frame(b"{\"heos\":{}}"), b"{\"heos\":{}}");
    }
}
