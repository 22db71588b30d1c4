use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decode a response body to UTF-8: BOM, then Content-Type charset, then detection.
///
/// Malformed sequences become U+FFFD; a page with a few bad bytes is still probed.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honours_content_type_charset() {
        let bytes = b"caf\xe9";
        assert_eq!(
            decode_body(bytes, Some("text/html; Charset=\"ISO-8859-1\"")),
            "café"
        );
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = b"\xef\xbb\xbfok";
        assert_eq!(decode_body(bytes, Some("text/html; charset=windows-1252")), "ok");
    }
}
