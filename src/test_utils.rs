use crate::candidate::Candidate;
use crate::mac_address::MacAddress;

/// A stable MAC address for unit tests.
pub const TEST_MAC: &str = "AA:BB:CC:DD:EE:FF";

pub fn test_mac() -> MacAddress {
    MacAddress::normalize(TEST_MAC).unwrap()
}

/// Build a `Candidate` with only the address and timestamp set.
///
/// Tests can override just the fields they care about.
pub fn sighting(mac: &str, timestamp: f64) -> Candidate {
    Candidate {
        timestamp: Some(timestamp.to_string()),
        mac: Some(mac.to_string()),
        ..Candidate::default()
    }
}

/// A single btmon block for `mac` at `timestamp`.
pub fn block(mac: &str, timestamp: &str, rssi: Option<i32>, name: Option<&str>) -> String {
    let mut text =
        format!("> HCI Event: LE Meta Event (0x3e) plen 42       #1 [hci0] {timestamp}\n");
    text.push_str("      LE Advertising Report (0x02)\n");
    text.push_str(&format!("        Address: {mac} (Public)\n"));
    if let Some(name) = name {
        text.push_str(&format!("        Name (complete): {name}\n"));
    }
    if let Some(rssi) = rssi {
        text.push_str(&format!("        RSSI: {rssi} dBm (0x00)\n"));
    }
    text
}
