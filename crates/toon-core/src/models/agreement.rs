//! Customer utility agreements

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::Payload;

/// A customer site bound to a Toon display
///
/// Every field is optional because the API omits what it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub agreement_id: Option<String>,
    pub agreement_id_checksum: Option<String>,
    pub city: Option<String>,
    pub display_common_name: Option<String>,
    pub display_hardware_version: Option<String>,
    pub display_software_version: Option<String>,
    pub heating_type: Option<String>,
    pub house_number: Option<String>,
    pub is_toon_solar: Option<bool>,
    pub is_toonly: Option<bool>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
}

impl Agreement {
    /// Build an agreement from one entry of the agreements list
    pub fn from_json(data: &Value) -> Self {
        let payload = Payload::new(data);
        Self {
            agreement_id: payload.value("agreementId"),
            agreement_id_checksum: payload.value("agreementIdChecksum"),
            city: payload.value("city"),
            display_common_name: payload.value("displayCommonName"),
            display_hardware_version: payload.value("displayHardwareVersion"),
            display_software_version: payload.value("displaySoftwareVersion"),
            heating_type: payload.value("heatingType"),
            house_number: payload.value("houseNumber"),
            is_toon_solar: payload.value("isToonSolar"),
            is_toonly: payload.value("isToonly"),
            postal_code: payload.value("postalCode"),
            street: payload.value("street"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let agreement = Agreement::from_json(&json!({
            "agreementId": "A1",
            "agreementIdChecksum": "c0ffee",
            "displayCommonName": "eneco-001-123456",
            "displayHardwareVersion": "qb2/ene/2.10.8",
            "displaySoftwareVersion": "qb2/ene/5.28.6",
            "heatingType": "GAS",
            "houseNumber": 12,
            "isToonSolar": false,
            "isToonly": true,
            "postalCode": "1234AB",
            "street": "Kerkstraat",
            "city": "Utrecht",
            "somethingNew": {"ignored": true},
        }));

        assert_eq!(
            agreement,
            Agreement {
                agreement_id: Some("A1".to_string()),
                agreement_id_checksum: Some("c0ffee".to_string()),
                city: Some("Utrecht".to_string()),
                display_common_name: Some("eneco-001-123456".to_string()),
                display_hardware_version: Some("qb2/ene/2.10.8".to_string()),
                display_software_version: Some("qb2/ene/5.28.6".to_string()),
                heating_type: Some("GAS".to_string()),
                house_number: Some("12".to_string()),
                is_toon_solar: Some(false),
                is_toonly: Some(true),
                postal_code: Some("1234AB".to_string()),
                street: Some("Kerkstraat".to_string()),
            }
        );
    }

    #[test]
    fn test_equality_by_value() {
        let a = Agreement::from_json(&json!({"agreementId": "A1", "displayCommonName": "Home"}));
        let b = Agreement::from_json(&json!({"displayCommonName": "Home", "agreementId": "A1"}));
        assert_eq!(a, b);
        assert_ne!(a, Agreement::default());
    }
}
