//! WMO weather interpretation codes (WW) mapped to descriptions and icons.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub code: u8,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Look up the human-readable condition for a WMO code.
/// Codes the table does not know map to an "Unknown" sentinel instead of
/// failing, since the provider may add codes over time.
pub fn describe(code: u8) -> Condition {
    let (description, icon) = match code {
        0 => ("Clear sky", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Moderate drizzle", "🌦️"),
        55 => ("Dense drizzle", "🌧️"),
        56 => ("Light freezing drizzle", "🌨️"),
        57 => ("Dense freezing drizzle", "🌨️"),
        61 => ("Slight rain", "🌧️"),
        63 => ("Moderate rain", "🌧️"),
        65 => ("Heavy rain", "⛈️"),
        66 => ("Light freezing rain", "🌨️"),
        67 => ("Heavy freezing rain", "🌨️"),
        71 => ("Slight snow fall", "❄️"),
        73 => ("Moderate snow fall", "❄️"),
        75 => ("Heavy snow fall", "❄️"),
        77 => ("Snow grains", "❄️"),
        80 => ("Slight rain showers", "🌦️"),
        81 => ("Moderate rain showers", "🌧️"),
        82 => ("Violent rain showers", "⛈️"),
        85 => ("Slight snow showers", "🌨️"),
        86 => ("Heavy snow showers", "❄️"),
        95 => ("Thunderstorm", "⛈️"),
        96 => ("Thunderstorm with slight hail", "⛈️"),
        99 => ("Thunderstorm with heavy hail", "⛈️"),
        _ => ("Unknown", "❓"),
    };
    Condition {
        code,
        description,
        icon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky() {
        let condition = describe(0);
        assert_eq!(condition.description, "Clear sky");
        assert_eq!(condition.icon, "☀️");
    }

    #[test]
    fn thunderstorm_family() {
        assert_eq!(describe(95).description, "Thunderstorm");
        assert_eq!(describe(96).description, "Thunderstorm with slight hail");
        assert_eq!(describe(99).description, "Thunderstorm with heavy hail");
    }

    #[test]
    fn unknown_code_maps_to_sentinel() {
        let condition = describe(12);
        assert_eq!(condition.code, 12);
        assert_eq!(condition.description, "Unknown");
        assert_eq!(condition.icon, "❓");
    }

    #[test]
    fn condition_serializes_with_code() {
        let value = serde_json::to_value(describe(61)).expect("serializes");
        assert_eq!(value["code"], 61);
        assert_eq!(value["description"], "Slight rain");
    }
}
