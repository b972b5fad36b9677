//! Message text encoding selection (GSM 03.38 7-bit vs UCS-2).

/// GSM 03.38 basic character set.
const GSM7_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞ\x1bÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
     ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";

/// GSM 03.38 extension table (sent with an escape prefix).
const GSM7_EXTENDED: &str = "^{}\\[~]|€";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Wire encoding of an SMS body (`encoding`).
pub enum Encoding {
    /// Narrow 7-bit alphabet, 160 characters per segment.
    Gsm7,
    /// Wide 2-byte alphabet, 70 characters per segment.
    Ucs2,
}

impl Encoding {
    /// JSON field name used by GatewayAPI (`encoding`).
    pub const FIELD: &'static str = "encoding";

    /// Pick the narrowest encoding able to carry `text`.
    ///
    /// Only ASCII members of the GSM 7-bit repertoire stay narrow; any other
    /// character (emoji, Greek letters, accented Latin) selects [`Encoding::Ucs2`].
    /// Empty text is [`Encoding::Gsm7`].
    pub fn classify(text: &str) -> Self {
        match text.chars().find(|c| !is_gsm7(*c)) {
            None => Self::Gsm7,
            Some(c) => {
                tracing::debug!(
                    character = %c.escape_unicode(),
                    "character outside GSM 7-bit repertoire, using UCS-2"
                );
                Self::Ucs2
            }
        }
    }

    /// Value sent in the `encoding` field.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Gsm7 => "GSM7",
            Self::Ucs2 => "UCS2",
        }
    }
}

fn is_gsm7(c: char) -> bool {
    c.is_ascii() && (GSM7_BASIC.contains(c) || GSM7_EXTENDED.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_latin_text_is_gsm7() {
        assert_eq!(Encoding::classify("Hello"), Encoding::Gsm7);
        assert_eq!(
            Encoding::classify("Order #42 ready @ 10:30, pay $5 (cash/card)?"),
            Encoding::Gsm7
        );
        assert_eq!(Encoding::classify("line one\r\nline two"), Encoding::Gsm7);
    }

    #[test]
    fn empty_text_is_gsm7() {
        assert_eq!(Encoding::classify(""), Encoding::Gsm7);
    }

    #[test]
    fn extension_table_is_gsm7() {
        assert_eq!(Encoding::classify("{[a|b]}~^\\"), Encoding::Gsm7);
    }

    #[test]
    fn emoji_and_non_ascii_are_ucs2() {
        assert_eq!(Encoding::classify("Hej 😀"), Encoding::Ucs2);
        assert_eq!(Encoding::classify("Ω"), Encoding::Ucs2);
        assert_eq!(Encoding::classify("café"), Encoding::Ucs2);
        assert_eq!(Encoding::classify("Привет"), Encoding::Ucs2);
    }

    #[test]
    fn ascii_outside_repertoire_is_ucs2() {
        assert_eq!(Encoding::classify("`code`"), Encoding::Ucs2);
        assert_eq!(Encoding::classify("tab\there"), Encoding::Ucs2);
    }

    #[test]
    fn classification_is_stable() {
        let text = "Stable text 😀";
        let first = Encoding::classify(text);
        for _ in 0..10 {
            assert_eq!(Encoding::classify(text), first);
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(Encoding::Gsm7.as_wire(), "GSM7");
        assert_eq!(Encoding::Ucs2.as_wire(), "UCS2");
    }
}
