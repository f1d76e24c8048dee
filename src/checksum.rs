use crc16::{State, ARC};

/// CRC16 as used on the P1 port: polynomial 0x8005 reflected (0xA001),
/// zero initial value, no final xor.
pub fn calc_crc16(data: &[u8]) -> u16 {
    State::<ARC>::calculate(data)
}

/// Verifies the checksum trailer of a complete telegram.
///
/// The CRC covers every byte from the leading `/` up to and including the
/// final `!`. The four hex digits directly after the `!` carry the expected
/// value. Returns false when either marker is missing or the trailer does
/// not consist of exactly four hex digits.
pub fn crc_is_valid(telegram: &str) -> bool {
    let bytes = telegram.as_bytes();
    let start = match bytes.iter().position(|&byte| byte == b'/') {
        Some(position) => position,
        None => return false,
    };
    let end = match bytes.iter().rposition(|&byte| byte == b'!') {
        Some(position) => position,
        None => return false,
    };
    if end < start {
        return false;
    }
    match read_crc_trailer(&bytes[end + 1..]) {
        Some(expected) => calc_crc16(&bytes[start..=end]) == expected,
        None => false,
    }
}

fn read_crc_trailer(trailer: &[u8]) -> Option<u16> {
    if trailer.len() < 4 || !trailer[..4].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    if trailer[4..]
        .iter()
        .any(|&byte| byte != b'\r' && byte != b'\n')
    {
        return None;
    }
    let digits = std::str::from_utf8(&trailer[..4]).ok()?;
    u16::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TELEGRAM_DSMR42;

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(calc_crc16(b"123456789"), 0xbb3d);
    }

    #[test]
    fn test_crc_of_complete_telegram() {
        assert!(crc_is_valid(TELEGRAM_DSMR42));
    }

    #[test]
    fn test_single_byte_corruption_is_caught() {
        let corrupted = TELEGRAM_DSMR42.replace("004436.791", "004436.792");
        assert_ne!(corrupted, TELEGRAM_DSMR42);
        assert!(!crc_is_valid(&corrupted));
    }

    #[test]
    fn test_missing_markers() {
        assert!(!crc_is_valid(""));
        assert!(!crc_is_valid("no markers at all"));
        assert!(!crc_is_valid("/XMX5 without terminator"));
        assert!(!crc_is_valid("!1234 without start"));
    }

    #[test]
    fn test_trailer_must_be_four_hex_digits() {
        assert!(!crc_is_valid("/XMX5\r\n!\r\n"));
        assert!(!crc_is_valid("/XMX5\r\n!613\r\n"));
        assert!(!crc_is_valid("/XMX5\r\n!61301\r\n"));
        assert!(!crc_is_valid("/XMX5\r\n!WXYZ\r\n"));
        assert!(!crc_is_valid("/XMX5\r\n!6130 extra\r\n"));
    }

    #[test]
    fn test_trailer_parsing() {
        assert_eq!(read_crc_trailer(b"6130\r\n"), Some(0x6130));
        assert_eq!(read_crc_trailer(b"6130"), Some(0x6130));
        assert_eq!(read_crc_trailer(b"bb3d"), Some(0xbb3d));
        assert_eq!(read_crc_trailer(b"BB3D\n"), Some(0xbb3d));
        assert_eq!(read_crc_trailer(b"613"), None);
        assert_eq!(read_crc_trailer(b"61301"), None);
        assert_eq!(read_crc_trailer(b"6130 "), None);
        assert_eq!(read_crc_trailer(b""), None);
    }
}
