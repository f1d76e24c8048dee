use chrono::Duration;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::checksum;
use crate::lexer::{self, RawLine};
use crate::mbus;
use crate::obis::ObisRef;
use crate::structs::{DsmrTelegram, PowerFailureEvent};
use crate::timestamp::{MeterTimeZone, TimestampParser};
use crate::DsmrParseError;

lazy_static! {
    // "/XXX5..." where XXX is the manufacturer tag and 5 the baud character
    static ref IDENT_PATTERN: Regex = Regex::new(r"^/([a-zA-Z0-9]{3})5(.*)$").unwrap();
    // undotted version numbers like "42" or "50"
    static ref VERSION_DIGITS: Regex = Regex::new("([0-9])([0-9]+)").unwrap();
}

/// Decodes raw P1 telegram text into [`DsmrTelegram`] values.
///
/// The decoder itself never fails: structural problems, checksum mismatches
/// and uninterpretable lines all end up in the validity flags of the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramParser {
    timestamps: TimestampParser,
}

impl TelegramParser {
    pub fn new() -> Self {
        TelegramParser::default()
    }

    /// A parser for meters that do not run Dutch civil time.
    pub fn with_time_zone(zone: MeterTimeZone) -> Self {
        TelegramParser {
            timestamps: TimestampParser::with_zone(zone),
        }
    }

    /// Decodes one telegram, from the `/` line through the `!` line.
    pub fn parse(&self, raw: &str) -> DsmrTelegram {
        let mut telegram = DsmrTelegram::default();
        if raw.is_empty() {
            return telegram;
        }
        telegram.valid_crc = checksum::crc_is_valid(raw);

        let lines = lexer::tokenize(raw);
        match lines.first() {
            Some(RawLine::Ident(line)) => self.apply_ident(line, &mut telegram),
            _ => {
                warn!("Telegram text does not start with an identification line");
                return telegram;
            }
        }

        let mut syntax_error = false;
        for line in &lines[1..] {
            match line {
                RawLine::Ident(text) => {
                    warn!("Unexpected extra identification line `{text}`");
                    syntax_error = true;
                }
                RawLine::Object { reference, values } => {
                    if let Err(error) = self.apply_object(*reference, values, &mut telegram) {
                        warn!("Can't interpret object {reference}: {error}");
                        syntax_error = true;
                    }
                }
                RawLine::Checksum(trailer) => {
                    if let Err(error) = apply_checksum_line(trailer, &mut telegram) {
                        warn!("{error}");
                        syntax_error = true;
                    }
                }
                RawLine::Malformed(text) => {
                    warn!("Skipping malformed line `{text}`");
                    syntax_error = true;
                }
            }
        }

        if !mbus::resolve_attributes(&mut telegram) {
            syntax_error = true;
        }

        telegram.is_valid = if syntax_error {
            false
        } else if telegram.crc.is_none() && telegram.p1_version.is_none() {
            // telegrams from before DSMR 4.0 carry neither a checksum nor a
            // version marker and are accepted whole
            true
        } else {
            telegram.valid_crc
        };

        telegram.p1_version = match telegram.p1_version.take() {
            Some(version) => Some(VERSION_DIGITS.replace(&version, "${1}.${2}").into_owned()),
            None => Some("2.2".to_string()),
        };

        telegram
    }

    fn apply_ident(&self, line: &str, telegram: &mut DsmrTelegram) {
        telegram.raw_ident = Some(line.to_string());
        let captures = match IDENT_PATTERN.captures(line) {
            Some(captures) => captures,
            None => {
                // no recognizable brand layout, the whole line is the ident
                telegram.ident = Some(line.to_string());
                return;
            }
        };
        telegram.equipment_brand_tag = Some(captures[1].to_uppercase());
        let mut ident = match captures.get(2) {
            Some(tail) => tail.as_str(),
            None => "",
        };
        if let Some(stripped) = ident.strip_prefix("\\2") {
            ident = stripped;
        }
        if let Some(stripped) = ident.strip_prefix('\\') {
            ident = stripped;
        }
        telegram.ident = Some(ident.trim().to_string());
    }

    fn apply_object(
        &self,
        reference: ObisRef,
        values: &[&str],
        telegram: &mut DsmrTelegram,
    ) -> Result<(), DsmrParseError> {
        match reference.0 {
            [1, 3, 0, 2, 8] => telegram.p1_version = Some(mandatory_text(values)?.to_string()),
            [0, 0, 1, 0, 0] => {
                telegram.timestamp = Some(self.timestamps.parse(mandatory_text(values)?)?)
            }
            [0, 0, 96, 1, 1] => telegram.equipment_id = Some(hex_text(values)?.trim().to_string()),

            [1, 0, 1, 8, 1] => telegram.electricity_received_low_tariff = Some(quantity(values)?),
            [1, 0, 1, 8, 2] => {
                telegram.electricity_received_normal_tariff = Some(quantity(values)?)
            }
            [1, 0, 2, 8, 1] => telegram.electricity_returned_low_tariff = Some(quantity(values)?),
            [1, 0, 2, 8, 2] => {
                telegram.electricity_returned_normal_tariff = Some(quantity(values)?)
            }
            [0, 0, 96, 14, 0] => telegram.electricity_tariff_indicator = Some(count(values)?),
            [1, 0, 1, 7, 0] => telegram.electricity_power_received = Some(quantity(values)?),
            [1, 0, 2, 7, 0] => telegram.electricity_power_returned = Some(quantity(values)?),

            [0, 0, 96, 7, 21] => telegram.power_failures = Some(count(values)?),
            [0, 0, 96, 7, 9] => telegram.long_power_failures = Some(count(values)?),
            [1, 0, 99, 97, 0] => self.apply_power_failure_log(values, telegram)?,

            [1, 0, 32, 32, 0] => telegram.voltage_sags_phase_l1 = Some(count(values)?),
            [1, 0, 52, 32, 0] => telegram.voltage_sags_phase_l2 = Some(count(values)?),
            [1, 0, 72, 32, 0] => telegram.voltage_sags_phase_l3 = Some(count(values)?),
            [1, 0, 32, 36, 0] => telegram.voltage_swells_phase_l1 = Some(count(values)?),
            [1, 0, 52, 36, 0] => telegram.voltage_swells_phase_l2 = Some(count(values)?),
            [1, 0, 72, 36, 0] => telegram.voltage_swells_phase_l3 = Some(count(values)?),

            [0, 0, 96, 13, 1] => telegram.message_codes = Some(optional_hex_text(values)?),
            [0, 0, 96, 13, 0] => telegram.message = Some(optional_hex_text(values)?),

            [1, 0, 32, 7, 0] => telegram.voltage_l1 = Some(quantity(values)?),
            [1, 0, 52, 7, 0] => telegram.voltage_l2 = Some(quantity(values)?),
            [1, 0, 72, 7, 0] => telegram.voltage_l3 = Some(quantity(values)?),
            [1, 0, 31, 7, 0] => telegram.current_l1 = Some(quantity(values)?),
            [1, 0, 51, 7, 0] => telegram.current_l2 = Some(quantity(values)?),
            [1, 0, 71, 7, 0] => telegram.current_l3 = Some(quantity(values)?),
            [1, 0, 21, 7, 0] => telegram.power_received_l1 = Some(quantity(values)?),
            [1, 0, 41, 7, 0] => telegram.power_received_l2 = Some(quantity(values)?),
            [1, 0, 61, 7, 0] => telegram.power_received_l3 = Some(quantity(values)?),
            [1, 0, 22, 7, 0] => telegram.power_returned_l1 = Some(quantity(values)?),
            [1, 0, 42, 7, 0] => telegram.power_returned_l2 = Some(quantity(values)?),
            [1, 0, 62, 7, 0] => telegram.power_returned_l3 = Some(quantity(values)?),

            [0, channel @ 1..=4, 24, 1, 0] => {
                let device_type = device_type(values)?;
                telegram.mbus_event_mut(channel as u8).device_type = Some(device_type);
            }
            [0, channel @ 1..=4, 96, 1, 0] => {
                let id = hex_text(values)?;
                telegram.mbus_event_mut(channel as u8).equipment_id = Some(id);
            }
            [0, channel @ 1..=4, 24, 2, 1] => {
                self.apply_mbus_usage(channel as u8, values, telegram)?
            }
            [0, channel @ 1..=4, 24, 3, 0] => {
                self.apply_mbus_profile(channel as u8, values, telegram)?
            }

            _ => debug!("Ignoring unrecognized object {reference}"),
        }
        Ok(())
    }

    /// `(count)(buffer list id)((end time)(duration*s))*`
    ///
    /// Events decoded before a bad entry stay on the telegram.
    fn apply_power_failure_log(
        &self,
        values: &[&str],
        telegram: &mut DsmrTelegram,
    ) -> Result<(), DsmrParseError> {
        let declared = match values.first() {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| DsmrParseError::InvalidNumber(value.to_string()))?,
            None => return Err(DsmrParseError::MissingValue),
        };
        telegram.power_failure_event_log_size = Some(declared);

        let mut rest = &values[1..];
        if rest.first().map_or(false, |value| value.contains(':')) {
            // skip the buffer list id (0-0:96.7.19)
            rest = &rest[1..];
        }

        let log = telegram.power_failure_event_log.get_or_insert_with(Vec::new);
        let pairs = rest.chunks_exact(2);
        let leftover = pairs.remainder();
        for pair in pairs {
            let end_time = self.timestamps.parse(pair[0])?;
            let seconds = event_duration_seconds(pair[1])?;
            let delta = i64::try_from(seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or_else(|| DsmrParseError::InvalidDuration(pair[1].to_string()))?;
            let start_time = end_time
                .checked_sub_signed(delta)
                .ok_or_else(|| DsmrParseError::InvalidDuration(pair[1].to_string()))?;
            log.push(PowerFailureEvent {
                start_time,
                end_time,
                duration_seconds: seconds,
            });
        }
        if !leftover.is_empty() {
            return Err(DsmrParseError::IncompleteEventLog);
        }
        if log.len() as u64 != declared {
            warn!(
                "Power failure log declares {declared} events but carries {}",
                log.len()
            );
        }
        Ok(())
    }

    /// `(last reading time)(value*unit)`, either group may be empty.
    fn apply_mbus_usage(
        &self,
        channel: u8,
        values: &[&str],
        telegram: &mut DsmrTelegram,
    ) -> Result<(), DsmrParseError> {
        let timestamp = match values.first() {
            Some(token) if !token.is_empty() => Some(self.timestamps.parse(token)?),
            _ => None,
        };
        let (value, unit) = match values.get(1) {
            Some(group) if !group.is_empty() => {
                let (number, unit) = match group.split_once('*') {
                    Some((number, unit)) => (number, unit),
                    None => (*group, ""),
                };
                let parsed = number
                    .parse()
                    .map_err(|_| DsmrParseError::InvalidNumber(number.to_string()))?;
                (Some(parsed), unit)
            }
            _ => (None, ""),
        };

        let event = telegram.mbus_event_mut(channel);
        event.timestamp = timestamp;
        event.value = value;
        event.unit = Some(unit.to_string());
        Ok(())
    }

    /// The pre DSMR 4.0 profile generic form:
    /// `(time)(status)(period)(entries)(buffer id)(unit)` with the reading
    /// following as a continuation group.
    fn apply_mbus_profile(
        &self,
        channel: u8,
        values: &[&str],
        telegram: &mut DsmrTelegram,
    ) -> Result<(), DsmrParseError> {
        let timestamp = match values.first() {
            Some(token) if !token.is_empty() => Some(self.timestamps.parse(token)?),
            _ => None,
        };
        let unit = values.get(5).copied().unwrap_or("");
        let value = match values.get(6) {
            Some(reading) if !reading.is_empty() => {
                let number = reading
                    .split_once('*')
                    .map_or(*reading, |(number, _)| number);
                Some(
                    number
                        .parse()
                        .map_err(|_| DsmrParseError::InvalidNumber(number.to_string()))?,
                )
            }
            _ => None,
        };

        let event = telegram.mbus_event_mut(channel);
        event.timestamp = timestamp;
        event.value = value;
        event.unit = Some(unit.to_string());
        Ok(())
    }
}

fn apply_checksum_line(
    trailer: &str,
    telegram: &mut DsmrTelegram,
) -> Result<(), DsmrParseError> {
    if trailer.is_empty() {
        return Ok(());
    }
    if trailer.len() == 4 && trailer.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        telegram.crc = Some(trailer.to_string());
        return Ok(());
    }
    Err(DsmrParseError::InvalidChecksumLine(trailer.to_string()))
}

fn mandatory_text<'a>(values: &[&'a str]) -> Result<&'a str, DsmrParseError> {
    match values.first() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DsmrParseError::MissingValue),
    }
}

/// Numeric payload with an optional `*unit` suffix; the unit is dropped.
fn quantity(values: &[&str]) -> Result<f64, DsmrParseError> {
    let value = mandatory_text(values)?;
    let number = value.split_once('*').map_or(value, |(number, _)| number);
    number
        .parse()
        .map_err(|_| DsmrParseError::InvalidNumber(number.to_string()))
}

fn count(values: &[&str]) -> Result<u64, DsmrParseError> {
    let value = mandatory_text(values)?;
    let number = value.split_once('*').map_or(value, |(number, _)| number);
    number
        .parse()
        .map_err(|_| DsmrParseError::InvalidNumber(number.to_string()))
}

fn device_type(values: &[&str]) -> Result<u16, DsmrParseError> {
    let value = mandatory_text(values)?;
    value
        .parse()
        .map_err(|_| DsmrParseError::InvalidNumber(value.to_string()))
}

fn event_duration_seconds(value: &str) -> Result<u64, DsmrParseError> {
    let number = match value.strip_suffix("*s") {
        Some(number) => number,
        None => return Err(DsmrParseError::InvalidDuration(value.to_string())),
    };
    number
        .parse()
        .map_err(|_| DsmrParseError::InvalidDuration(value.to_string()))
}

fn hex_text(values: &[&str]) -> Result<String, DsmrParseError> {
    match values.first() {
        Some(payload) => decode_hex(payload),
        None => Err(DsmrParseError::MissingValue),
    }
}

/// Like [`hex_text`], but a missing group decodes to the empty string.
fn optional_hex_text(values: &[&str]) -> Result<String, DsmrParseError> {
    match values.first() {
        Some(payload) => decode_hex(payload),
        None => Ok(String::new()),
    }
}

fn decode_hex(payload: &str) -> Result<String, DsmrParseError> {
    if payload.is_empty() {
        return Ok(String::new());
    }
    let bytes =
        hex::decode(payload).map_err(|_| DsmrParseError::InvalidHexPayload(payload.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
