//! Name-based net classifiers: small substring pattern sets used only to
//! disambiguate between otherwise-equivalent inferences, never as a
//! primary source of truth.

const INPUT_SUPPLY_PATTERNS: [&str; 5] = ["VIN", "VBUS", "VDC", "VBAT", "V+"];
const OUTPUT_PATTERNS: [&str; 4] = ["VOUT", "OUT", "VO", "OUTPUT"];
const GROUND_PATTERNS: [&str; 5] = ["GND", "PGND", "VSS", "COM", "GROUND"];

fn matches_any(net_name: &str, patterns: &[&str]) -> bool {
    let upper = net_name.to_uppercase();
    patterns.iter().any(|p| upper.contains(p))
}

pub fn is_input_supply_net(net_name: &str) -> bool {
    matches_any(net_name, &INPUT_SUPPLY_PATTERNS)
}

pub fn is_output_net(net_name: &str) -> bool {
    matches_any(net_name, &OUTPUT_PATTERNS)
}

pub fn is_ground_net(net_name: &str) -> bool {
    matches_any(net_name, &GROUND_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_net_names() {
        assert!(is_input_supply_net("VBUS_48V"));
        assert!(is_output_net("VOUT_ISO"));
        assert!(is_ground_net("PGND"));
        assert!(!is_ground_net("VOUT"));
    }
}
