//! Decoder for DSMR P1 telegrams, the text pushed out on the P1 port of
//! Dutch smart meters (IEC 62056-21 mode D framing, DSMR 2.2 through 5.x).
//!
//! Feed [`parse_telegram`] the complete text of one telegram, from the `/`
//! identification line up to and including the `!` checksum line:
//!
//! ```
//! let telegram = dsmr_parser::parse_telegram(
//!     "/ISK5\\2M550T-1012\r\n\r\n0-0:96.1.1(45303034)\r\n!\r\n",
//! );
//! assert!(telegram.is_valid);
//! assert_eq!(telegram.equipment_id.as_deref(), Some("E004"));
//! ```
//!
//! Decoding never fails and never panics: lines that cannot be interpreted
//! are logged and folded into the validity flags on the result, so a meter
//! readout loop can keep running on garbled input.

use thiserror::Error;

pub mod checksum;
pub mod lexer;
mod mbus;
pub mod obis;
pub mod parser;
pub mod structs;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::obis::ObisRef;
pub use crate::parser::TelegramParser;
pub use crate::structs::{DsmrTelegram, MBusEvent, PowerFailureEvent};
pub use crate::timestamp::{MeterTimeZone, TimestampParser};

/// Reasons a single line or token of a telegram cannot be interpreted.
///
/// These never escape [`parse_telegram`]: every failure is logged and ends
/// up as `is_valid == false` on the decoded [`DsmrTelegram`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DsmrParseError {
    #[error("A required value group is missing")]
    MissingValue,
    #[error("Can't parse numerical value `{0}`")]
    InvalidNumber(String),
    #[error("Invalid hex payload `{0}`")]
    InvalidHexPayload(String),
    #[error("Invalid timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("Invalid event duration `{0}`")]
    InvalidDuration(String),
    #[error("Power failure event log ends with an incomplete entry")]
    IncompleteEventLog,
    #[error("Checksum line must hold four hex digits, found `{0}`")]
    InvalidChecksumLine(String),
    #[error("Malformed data line `{0}`")]
    MalformedLine(String),
}

/// Decodes one telegram with the default (Dutch) meter time zone.
pub fn parse_telegram(telegram: &str) -> DsmrTelegram {
    TelegramParser::new().parse(telegram)
}
