use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One decoded P1 telegram.
///
/// Every attribute the meter did not report stays `None`; consumers must not
/// assume a field is present just because the protocol version suggests it.
/// `valid_crc` only reflects the checksum arithmetic, `is_valid` is the
/// overall verdict (checksum, structure and the pre-DSMR 4.0 exception for
/// telegrams without checksum and version marker).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsmrTelegram {
    /// The unmodified `/` identification line.
    pub raw_ident: Option<String>,
    /// Three letter manufacturer tag from the identification line.
    pub equipment_brand_tag: Option<String>,
    /// Identification text after the baud rate character.
    pub ident: Option<String>,
    /// Protocol version, normalized to dotted form ("4.2", "5.0").
    pub p1_version: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub equipment_id: Option<String>,

    /// Total energy received in low tariff periods, in kWh.
    pub electricity_received_low_tariff: Option<f64>,
    /// Total energy received in normal tariff periods, in kWh.
    pub electricity_received_normal_tariff: Option<f64>,
    /// Total energy returned in low tariff periods, in kWh.
    pub electricity_returned_low_tariff: Option<f64>,
    /// Total energy returned in normal tariff periods, in kWh.
    pub electricity_returned_normal_tariff: Option<f64>,
    /// Currently active tariff.
    pub electricity_tariff_indicator: Option<u64>,
    /// Current power draw in kW.
    pub electricity_power_received: Option<f64>,
    /// Current power feed-in in kW.
    pub electricity_power_returned: Option<f64>,

    pub power_failures: Option<u64>,
    pub long_power_failures: Option<u64>,
    /// Number of events the meter claims the failure log holds.
    pub power_failure_event_log_size: Option<u64>,
    pub power_failure_event_log: Option<Vec<PowerFailureEvent>>,

    pub voltage_sags_phase_l1: Option<u64>,
    pub voltage_sags_phase_l2: Option<u64>,
    pub voltage_sags_phase_l3: Option<u64>,
    pub voltage_swells_phase_l1: Option<u64>,
    pub voltage_swells_phase_l2: Option<u64>,
    pub voltage_swells_phase_l3: Option<u64>,

    /// Text message codes, decoded from hex. Empty when the line is present
    /// without content.
    pub message_codes: Option<String>,
    /// Free text message, decoded from hex.
    pub message: Option<String>,

    /// Voltage per phase in V.
    pub voltage_l1: Option<f64>,
    pub voltage_l2: Option<f64>,
    pub voltage_l3: Option<f64>,
    /// Current per phase in A.
    pub current_l1: Option<f64>,
    pub current_l2: Option<f64>,
    pub current_l3: Option<f64>,
    /// Power draw per phase in kW.
    pub power_received_l1: Option<f64>,
    pub power_received_l2: Option<f64>,
    pub power_received_l3: Option<f64>,
    /// Power feed-in per phase in kW.
    pub power_returned_l1: Option<f64>,
    pub power_returned_l2: Option<f64>,
    pub power_returned_l3: Option<f64>,

    /// Raw readings of the sub meters on M-Bus channels 1 to 4.
    pub mbus_events: BTreeMap<u8, MBusEvent>,

    /// Equipment id of the first connected gas meter.
    pub gas_equipment_id: Option<String>,
    /// Time of the last gas meter reading.
    pub gas_timestamp: Option<DateTime<FixedOffset>>,
    /// Last gas meter reading in m3.
    pub gas_m3: Option<f64>,

    /// Equipment id of the first connected slave electricity meter.
    pub slave_e_meter_equipment_id: Option<String>,
    /// Time of the last slave electricity meter reading.
    pub slave_e_meter_timestamp: Option<DateTime<FixedOffset>>,
    /// Last slave electricity meter reading in kWh.
    pub slave_e_meter_kwh: Option<f64>,

    /// The four checksum digits as sent by the meter.
    pub crc: Option<String>,
    /// Whether the checksum digits match the telegram bytes.
    pub valid_crc: bool,
    /// Overall verdict for this telegram.
    pub is_valid: bool,
}

impl DsmrTelegram {
    /// The M-Bus slot for a channel, created empty on first use.
    pub(crate) fn mbus_event_mut(&mut self, channel: u8) -> &mut MBusEvent {
        self.mbus_events.entry(channel).or_default()
    }
}

/// One entry of the power failure event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFailureEvent {
    /// Moment the failure began, reconstructed from end time and duration.
    pub start_time: DateTime<FixedOffset>,
    /// Moment power came back, as reported by the meter.
    pub end_time: DateTime<FixedOffset>,
    pub duration_seconds: u64,
}

/// Readings reported for one M-Bus channel.
///
/// Which attributes are filled depends on the meter generation; every field
/// can be absent on its own.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MBusEvent {
    /// Device type code (0x03 gas, 0x02 slave electricity, ...).
    pub device_type: Option<u16>,
    pub equipment_id: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

fn field<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &Option<T>,
) -> fmt::Result {
    match value {
        Some(value) => writeln!(f, "  {label}: {value}"),
        None => Ok(()),
    }
}

impl fmt::Display for DsmrTelegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DSMR telegram")?;
        field(f, "Ident", &self.raw_ident)?;
        field(f, "Brand", &self.equipment_brand_tag)?;
        field(f, "Model", &self.ident)?;
        field(f, "P1 version", &self.p1_version)?;
        field(f, "Timestamp", &self.timestamp)?;
        field(f, "Equipment id", &self.equipment_id)?;
        field(f, "Energy received low tariff [kWh]", &self.electricity_received_low_tariff)?;
        field(f, "Energy received normal tariff [kWh]", &self.electricity_received_normal_tariff)?;
        field(f, "Energy returned low tariff [kWh]", &self.electricity_returned_low_tariff)?;
        field(f, "Energy returned normal tariff [kWh]", &self.electricity_returned_normal_tariff)?;
        field(f, "Tariff indicator", &self.electricity_tariff_indicator)?;
        field(f, "Power received [kW]", &self.electricity_power_received)?;
        field(f, "Power returned [kW]", &self.electricity_power_returned)?;
        field(f, "Power failures", &self.power_failures)?;
        field(f, "Long power failures", &self.long_power_failures)?;
        if let Some(log) = &self.power_failure_event_log {
            writeln!(f, "  Power failure event log:")?;
            for event in log {
                writeln!(
                    f,
                    "    {} .. {} ({} s)",
                    event.start_time, event.end_time, event.duration_seconds
                )?;
            }
        }
        field(f, "Voltage sags L1", &self.voltage_sags_phase_l1)?;
        field(f, "Voltage sags L2", &self.voltage_sags_phase_l2)?;
        field(f, "Voltage sags L3", &self.voltage_sags_phase_l3)?;
        field(f, "Voltage swells L1", &self.voltage_swells_phase_l1)?;
        field(f, "Voltage swells L2", &self.voltage_swells_phase_l2)?;
        field(f, "Voltage swells L3", &self.voltage_swells_phase_l3)?;
        field(f, "Message codes", &self.message_codes)?;
        field(f, "Message", &self.message)?;
        field(f, "Voltage L1 [V]", &self.voltage_l1)?;
        field(f, "Voltage L2 [V]", &self.voltage_l2)?;
        field(f, "Voltage L3 [V]", &self.voltage_l3)?;
        field(f, "Current L1 [A]", &self.current_l1)?;
        field(f, "Current L2 [A]", &self.current_l2)?;
        field(f, "Current L3 [A]", &self.current_l3)?;
        field(f, "Power received L1 [kW]", &self.power_received_l1)?;
        field(f, "Power received L2 [kW]", &self.power_received_l2)?;
        field(f, "Power received L3 [kW]", &self.power_received_l3)?;
        field(f, "Power returned L1 [kW]", &self.power_returned_l1)?;
        field(f, "Power returned L2 [kW]", &self.power_returned_l2)?;
        field(f, "Power returned L3 [kW]", &self.power_returned_l3)?;
        for (channel, event) in &self.mbus_events {
            writeln!(f, "  M-Bus channel {channel}: {event}")?;
        }
        field(f, "Gas equipment id", &self.gas_equipment_id)?;
        field(f, "Gas timestamp", &self.gas_timestamp)?;
        field(f, "Gas [m3]", &self.gas_m3)?;
        field(f, "Slave e-meter equipment id", &self.slave_e_meter_equipment_id)?;
        field(f, "Slave e-meter timestamp", &self.slave_e_meter_timestamp)?;
        field(f, "Slave e-meter [kWh]", &self.slave_e_meter_kwh)?;
        field(f, "CRC", &self.crc)?;
        writeln!(f, "  Checksum valid: {}", self.valid_crc)?;
        writeln!(f, "  Valid: {}", self.is_valid)
    }
}

impl fmt::Display for MBusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device_type {
            Some(device_type) => write!(f, "device type {device_type}")?,
            None => write!(f, "device type unknown")?,
        }
        if let Some(id) = &self.equipment_id {
            write!(f, ", equipment {id}")?;
        }
        if let Some(stamp) = &self.timestamp {
            write!(f, ", at {stamp}")?;
        }
        if let Some(value) = self.value {
            write!(f, ", reading {value}")?;
            match &self.unit {
                Some(unit) if !unit.is_empty() => write!(f, " {unit}")?,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TELEGRAM_DSMR42;

    #[test]
    fn test_default_telegram_is_invalid() {
        let telegram = DsmrTelegram::default();
        assert!(!telegram.is_valid);
        assert!(!telegram.valid_crc);
        assert!(telegram.p1_version.is_none());
        assert!(telegram.mbus_events.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let telegram = crate::parse_telegram(TELEGRAM_DSMR42);
        let json = serde_json::to_string(&telegram).unwrap();
        let restored: DsmrTelegram = serde_json::from_str(&json).unwrap();
        assert_eq!(telegram, restored);
    }

    #[test]
    fn test_display_mentions_populated_fields() {
        let telegram = crate::parse_telegram(TELEGRAM_DSMR42);
        let dump = telegram.to_string();
        assert!(dump.contains("P1 version: 4.2"));
        assert!(dump.contains("Equipment id: E0004001844004214"));
        assert!(dump.contains("Energy received low tariff [kWh]: 4436.791"));
        assert!(dump.contains("Power failure event log:"));
        assert!(dump.contains("Checksum valid: true"));
        // absent attributes leave no trace
        assert!(!dump.contains("Voltage L2"));
        assert!(!dump.contains("Gas [m3]"));
    }

    #[test]
    fn test_display_of_mbus_event() {
        let event = MBusEvent {
            device_type: Some(3),
            equipment_id: Some("G0039001700460117".to_string()),
            timestamp: None,
            value: Some(521.64),
            unit: Some("m3".to_string()),
        };
        let text = event.to_string();
        assert!(text.contains("device type 3"));
        assert!(text.contains("equipment G0039001700460117"));
        assert!(text.contains("reading 521.64 m3"));
    }
}
