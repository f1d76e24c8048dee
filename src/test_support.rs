//! Shared telegram fixtures for the unit tests.

/// Real DSMR 4.2 telegram; the checksum 0x6130 matches the bytes.
pub(crate) const TELEGRAM_DSMR42: &str = "/XMX5LGBBFFB231237741\r\n\r\n\
    1-3:0.2.8(42)\r\n\
    0-0:1.0.0(200208153516W)\r\n\
    0-0:96.1.1(4530303034303031383434303034323134)\r\n\
    1-0:1.8.1(004436.791*kWh)\r\n\
    1-0:2.8.1(000000.000*kWh)\r\n\
    1-0:1.8.2(004234.483*kWh)\r\n\
    1-0:2.8.2(000000.000*kWh)\r\n\
    0-0:96.14.0(0001)\r\n\
    1-0:1.7.0(00.329*kW)\r\n\
    1-0:2.7.0(00.000*kW)\r\n\
    0-0:96.7.21(00002)\r\n\
    0-0:96.7.9(00003)\r\n\
    1-0:99.97.0(3)(0-0:96.7.19)(180726223917S)(0000006462*s)(170325035658W)(0036416374*s)(160128161754W)(0024464269*s)\r\n\
    1-0:32.32.0(00000)\r\n\
    1-0:32.36.0(00000)\r\n\
    0-0:96.13.1()\r\n\
    0-0:96.13.0()\r\n\
    1-0:31.7.0(002*A)\r\n\
    1-0:21.7.0(00.329*kW)\r\n\
    1-0:22.7.0(00.000*kW)\r\n\
    !6130\r\n";

/// DSMR 5.0 style telegram with both M-Bus sub meters and all three phases.
/// Sent without checksum digits, so the policy must reject it.
pub(crate) const TELEGRAM_DSMR50: &str = "/ISK5\\2M550T-1012\r\n\r\n\
    1-3:0.2.8(50)\r\n\
    0-0:1.0.0(200624113000S)\r\n\
    0-0:96.1.1(4530303534303037363832343237373139)\r\n\
    1-0:1.8.1(002236.186*kWh)\r\n\
    1-0:1.8.2(001755.952*kWh)\r\n\
    1-0:2.8.1(000392.129*kWh)\r\n\
    1-0:2.8.2(000937.456*kWh)\r\n\
    0-0:96.14.0(0002)\r\n\
    1-0:1.7.0(00.655*kW)\r\n\
    1-0:2.7.0(00.000*kW)\r\n\
    0-0:96.7.21(00003)\r\n\
    0-0:96.7.9(00001)\r\n\
    1-0:99.97.0(1)(0-0:96.7.19)(200624113000W)(0000000240*s)\r\n\
    1-0:32.32.0(00002)\r\n\
    1-0:52.32.0(00001)\r\n\
    1-0:72.32.0(00000)\r\n\
    1-0:32.36.0(00000)\r\n\
    1-0:52.36.0(00000)\r\n\
    1-0:72.36.0(00001)\r\n\
    0-0:96.13.0(48656C6C6F20584D58)\r\n\
    1-0:32.7.0(223.0*V)\r\n\
    1-0:52.7.0(223.6*V)\r\n\
    1-0:72.7.0(222.9*V)\r\n\
    1-0:31.7.0(001*A)\r\n\
    1-0:51.7.0(002*A)\r\n\
    1-0:71.7.0(003*A)\r\n\
    1-0:21.7.0(00.123*kW)\r\n\
    1-0:41.7.0(00.234*kW)\r\n\
    1-0:61.7.0(00.345*kW)\r\n\
    1-0:22.7.0(00.000*kW)\r\n\
    1-0:42.7.0(00.011*kW)\r\n\
    1-0:62.7.0(00.022*kW)\r\n\
    0-1:24.1.0(003)\r\n\
    0-1:96.1.0(4730303339303031373030343630313137)\r\n\
    0-1:24.2.1(200624113000S)(00521.640*m3)\r\n\
    0-2:24.1.0(002)\r\n\
    0-2:96.1.0(4B384547303034303436333935353037)\r\n\
    0-2:24.2.1(200624113000S)(00188.310*kWh)\r\n\
    !\r\n";

/// DSMR 2.2 style telegram: no version marker, no checksum digits, and the
/// gas reading in the old profile generic form with its continuation line.
pub(crate) const TELEGRAM_LEGACY: &str = "/ISk5\\2MT382-1003\r\n\r\n\
    0-0:96.1.1(5A424556303035303931323436343132)\r\n\
    1-0:1.8.1(00185.000*kWh)\r\n\
    1-0:1.8.2(00084.000*kWh)\r\n\
    1-0:2.8.1(00013.000*kWh)\r\n\
    1-0:2.8.2(00019.000*kWh)\r\n\
    0-0:96.14.0(0001)\r\n\
    1-0:1.7.0(0000.98*kW)\r\n\
    1-0:2.7.0(0000.00*kW)\r\n\
    0-0:17.0.0(0999.00*kW)\r\n\
    0-0:96.3.10(1)\r\n\
    0-0:96.13.1()\r\n\
    0-0:96.13.0()\r\n\
    0-1:24.1.0(3)\r\n\
    0-1:96.1.0(3232323241424344313233343536373839)\r\n\
    0-1:24.3.0(090212160000W)(00)(60)(1)(0-1:24.2.1)(m3)\r\n\
    (00124.477)\r\n\
    !\r\n";
