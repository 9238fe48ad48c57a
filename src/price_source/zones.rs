use crate::price_source::errors::PriceSourceError;

/// Maps a Nordic bidding-zone code to the upstream market operator's EIC
/// domain code (spec.md §6).
pub fn zone_to_eic(area: &str) -> Result<&'static str, PriceSourceError> {
    match area {
        "SE1" => Ok("10Y1001A1001A44P"),
        "SE2" => Ok("10Y1001A1001A45N"),
        "SE3" => Ok("10Y1001A1001A46L"),
        "SE4" => Ok("10Y1001A1001A47J"),
        other => Err(PriceSourceError::UnknownZone(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_zones_resolve() {
        assert_eq!(zone_to_eic("SE1").unwrap(), "10Y1001A1001A44P");
        assert_eq!(zone_to_eic("SE4").unwrap(), "10Y1001A1001A47J");
    }

    #[test]
    fn unknown_zone_is_config_error() {
        assert!(zone_to_eic("NO1").is_err());
    }
}
