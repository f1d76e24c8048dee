use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::DsmrParseError;

lazy_static! {
    static ref OBIS_PATTERN: Regex =
        Regex::new(r"^([0-9]{1,3})-([0-9]{1,3}):([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$")
            .unwrap();
}

/// A COSEM object reference in the reduced `A-B:C.D.E` form used on the
/// P1 port (medium, channel, physical value, processing method, tariff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObisRef(pub [u16; 5]);

impl FromStr for ObisRef {
    type Err = DsmrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = OBIS_PATTERN
            .captures(s)
            .ok_or_else(|| DsmrParseError::MalformedLine(s.to_string()))?;
        let mut groups = [0u16; 5];
        for (index, group) in groups.iter_mut().enumerate() {
            *group = captures[index + 1]
                .parse()
                .map_err(|_| DsmrParseError::MalformedLine(s.to_string()))?;
        }
        Ok(ObisRef(groups))
    }
}

impl fmt::Display for ObisRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ObisRef([a, b, c, d, e]) = self;
        write!(f, "{a}-{b}:{c}.{d}.{e}")
    }
}

/// Human readable name of a recognized P1 object.
pub fn describe(reference: ObisRef) -> Option<&'static str> {
    let name = match reference.0 {
        [1, 3, 0, 2, 8] => "P1 protocol version",
        [0, 0, 1, 0, 0] => "Telegram timestamp",
        [0, 0, 96, 1, 1] => "Equipment identifier",
        [1, 0, 1, 8, 1] => "Energy received, low tariff",
        [1, 0, 1, 8, 2] => "Energy received, normal tariff",
        [1, 0, 2, 8, 1] => "Energy returned, low tariff",
        [1, 0, 2, 8, 2] => "Energy returned, normal tariff",
        [0, 0, 96, 14, 0] => "Tariff indicator",
        [1, 0, 1, 7, 0] => "Power received",
        [1, 0, 2, 7, 0] => "Power returned",
        [0, 0, 96, 7, 21] => "Number of power failures",
        [0, 0, 96, 7, 9] => "Number of long power failures",
        [1, 0, 99, 97, 0] => "Power failure event log",
        [1, 0, 32, 32, 0] => "Voltage sags phase L1",
        [1, 0, 52, 32, 0] => "Voltage sags phase L2",
        [1, 0, 72, 32, 0] => "Voltage sags phase L3",
        [1, 0, 32, 36, 0] => "Voltage swells phase L1",
        [1, 0, 52, 36, 0] => "Voltage swells phase L2",
        [1, 0, 72, 36, 0] => "Voltage swells phase L3",
        [0, 0, 96, 13, 1] => "Text message codes",
        [0, 0, 96, 13, 0] => "Text message",
        [1, 0, 32, 7, 0] => "Voltage phase L1",
        [1, 0, 52, 7, 0] => "Voltage phase L2",
        [1, 0, 72, 7, 0] => "Voltage phase L3",
        [1, 0, 31, 7, 0] => "Current phase L1",
        [1, 0, 51, 7, 0] => "Current phase L2",
        [1, 0, 71, 7, 0] => "Current phase L3",
        [1, 0, 21, 7, 0] => "Power received phase L1",
        [1, 0, 41, 7, 0] => "Power received phase L2",
        [1, 0, 61, 7, 0] => "Power received phase L3",
        [1, 0, 22, 7, 0] => "Power returned phase L1",
        [1, 0, 42, 7, 0] => "Power returned phase L2",
        [1, 0, 62, 7, 0] => "Power returned phase L3",
        [0, 1..=4, 24, 1, 0] => "M-Bus device type",
        [0, 1..=4, 96, 1, 0] => "M-Bus equipment identifier",
        [0, 1..=4, 24, 2, 1] => "M-Bus last reading",
        [0, 1..=4, 24, 3, 0] => "M-Bus profile generic reading",
        _ => return None,
    };
    Some(name)
}
