use log::warn;

use crate::structs::DsmrTelegram;

// Device type codes from EN 13757-3
const DEVICE_SLAVE_ELECTRICITY: u16 = 0x02;
const DEVICE_GAS: u16 = 0x03;

/// Copies the per channel M-Bus readings onto the named gas and slave
/// electricity attributes. Channels are visited in ascending order and the
/// first device of each kind wins. Returns false when a slot carries a unit
/// that contradicts its device type.
pub(crate) fn resolve_attributes(telegram: &mut DsmrTelegram) -> bool {
    let mut units_consistent = true;
    for (channel, event) in &telegram.mbus_events {
        match event.device_type {
            Some(DEVICE_SLAVE_ELECTRICITY) => {
                if telegram.slave_e_meter_equipment_id.is_none() {
                    telegram.slave_e_meter_equipment_id = event.equipment_id.clone();
                    telegram.slave_e_meter_timestamp = event.timestamp;
                    telegram.slave_e_meter_kwh = event.value;
                    units_consistent &= unit_matches(*channel, event.unit.as_deref(), "kWh");
                }
            }
            Some(DEVICE_GAS) => {
                if telegram.gas_equipment_id.is_none() {
                    telegram.gas_equipment_id = event.equipment_id.clone();
                    telegram.gas_timestamp = event.timestamp;
                    telegram.gas_m3 = event.value;
                    units_consistent &= unit_matches(*channel, event.unit.as_deref(), "m3");
                }
            }
            _ => {}
        }
    }
    units_consistent
}

fn unit_matches(channel: u8, unit: Option<&str>, expected: &str) -> bool {
    match unit {
        Some(found) if !found.is_empty() && found != expected => {
            warn!("M-Bus channel {channel} reports unit `{found}` where `{expected}` was expected");
            false
        }
        _ => true,
    }
}
