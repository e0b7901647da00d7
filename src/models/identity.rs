//! The fixed field schema of an identity card and the record extracted from it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One field printed on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityField {
    /// JSON key returned by the model.
    pub key: &'static str,
    /// Arabic label shown to the user and quoted in the model instruction.
    pub label: &'static str,
    /// English name used in the model instruction.
    pub english: &'static str,
}

/// Every extractable field, in display order.
pub const IDENTITY_FIELDS: [IdentityField; 9] = [
    IdentityField {
        key: "national_id",
        label: "الرقم القومي",
        english: "National ID Number",
    },
    IdentityField {
        key: "name",
        label: "الاسم",
        english: "Name",
    },
    IdentityField {
        key: "address",
        label: "العنوان",
        english: "Address",
    },
    IdentityField {
        key: "dob",
        label: "تاريخ الميلاد",
        english: "Date of Birth",
    },
    IdentityField {
        key: "job",
        label: "المهنة",
        english: "Job",
    },
    IdentityField {
        key: "gender",
        label: "النوع",
        english: "Gender",
    },
    IdentityField {
        key: "religion",
        label: "الديانة",
        english: "Religion",
    },
    IdentityField {
        key: "marital_status",
        label: "الحالة الاجتماعية",
        english: "Marital Status",
    },
    IdentityField {
        key: "expiry_date",
        label: "تاريخ الانتهاء",
        english: "Expiry Date",
    },
];

/// Fields extracted from one card. Any field may be absent.
///
/// Deserialization is lenient per field: numbers are stringified,
/// `null` and other shapes become `None`, unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

impl IdentityRecord {
    /// Look up a field by its JSON key. Unknown keys yield `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "national_id" => &self.national_id,
            "name" => &self.name,
            "address" => &self.address,
            "dob" => &self.dob,
            "job" => &self.job,
            "gender" => &self.gender,
            "religion" => &self.religion,
            "marital_status" => &self.marital_status,
            "expiry_date" => &self.expiry_date,
            _ => return None,
        };
        value.as_deref()
    }

    /// Number of fields holding a non-blank value.
    pub fn present_count(&self) -> usize {
        IDENTITY_FIELDS
            .iter()
            .filter(|f| self.get(f.key).is_some_and(|v| !v.trim().is_empty()))
            .count()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_are_unique_and_ordered() {
        let keys: Vec<&str> = IDENTITY_FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec![
                "national_id",
                "name",
                "address",
                "dob",
                "job",
                "gender",
                "religion",
                "marital_status",
                "expiry_date"
            ]
        );
    }

    #[test]
    fn get_covers_every_field() {
        let record = IdentityRecord {
            national_id: Some("1".into()),
            name: Some("2".into()),
            address: Some("3".into()),
            dob: Some("4".into()),
            job: Some("5".into()),
            gender: Some("6".into()),
            religion: Some("7".into()),
            marital_status: Some("8".into()),
            expiry_date: Some("9".into()),
        };
        for (i, field) in IDENTITY_FIELDS.iter().enumerate() {
            assert_eq!(record.get(field.key), Some((i + 1).to_string().as_str()));
        }
        assert_eq!(record.get("blood_type"), None);
        assert_eq!(record.present_count(), 9);
    }

    #[test]
    fn deserializes_partial_record_and_ignores_extra_keys() {
        let json = r#"{"name":"أحمد محمد","dob":"1990/01/01","hobby":"chess"}"#;
        let record: IdentityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name.as_deref(), Some("أحمد محمد"));
        assert_eq!(record.dob.as_deref(), Some("1990/01/01"));
        assert!(record.address.is_none());
        assert_eq!(record.present_count(), 2);
    }

    #[test]
    fn numbers_are_stringified_and_nulls_dropped() {
        let json = r#"{"national_id":29001011234567,"job":null,"gender":["x"]}"#;
        let record: IdentityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.national_id.as_deref(), Some("29001011234567"));
        assert!(record.job.is_none());
        assert!(record.gender.is_none());
    }

    #[test]
    fn serialization_omits_absent_fields() {
        let record = IdentityRecord {
            name: Some("X".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"name": "X"}));
    }

    #[test]
    fn blank_values_do_not_count_as_present() {
        let record = IdentityRecord {
            name: Some("  ".into()),
            job: Some("مهندس".into()),
            ..Default::default()
        };
        assert_eq!(record.present_count(), 1);
    }
}
