// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pass definition assembly.
//!
//! Maps caller-supplied vehicle fields onto the pass JSON served to the
//! wallet application. Field placement is driven by `FIELD_LAYOUT`, a
//! declarative table of source key, target group and display label: a field
//! is emitted into its group only when its source value is present and
//! non-empty, in table order. Adding or removing an optional field is a
//! table change, not a control flow change.

use {
    crate::{
        config::{ORGANIZATION_NAME, PASS_TYPE_IDENTIFIER, TEAM_IDENTIFIER},
        error::PassIssuerError,
    },
    serde::{Deserialize, Serialize},
};

pub const DESCRIPTION: &str = "Vehicle registration pass";
pub const BACKGROUND_COLOR: &str = "rgb(32, 38, 58)";
pub const FOREGROUND_COLOR: &str = "rgb(255, 255, 255)";
pub const LABEL_COLOR: &str = "rgb(173, 185, 214)";

/// Caller-supplied vehicle fields.
///
/// Every display field is optional; the VIN doubles as the pass serial
/// number and is the one field the pipeline requires. `logo_url`, when
/// present, replaces the configured logo source for this request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub plate: Option<String>,
    pub vin: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub drivetrain: Option<String>,
    pub engine: Option<String>,
    pub notes: Option<String>,
    pub logo_url: Option<String>,
}

impl PassFields {
    /// The canonical pass identity for this deployment is the VIN.
    ///
    /// Consumers key updates and revocation off the serial number, so a
    /// missing VIN is rejected by the pipeline before any signing work.
    pub fn serial_number(&self) -> Option<&str> {
        self.value("vin")
    }

    fn value(&self, key: &str) -> Option<&str> {
        let value = match key {
            "make" => &self.make,
            "model" => &self.model,
            "year" => &self.year,
            "plate" => &self.plate,
            "vin" => &self.vin,
            "fuelType" => &self.fuel_type,
            "transmission" => &self.transmission,
            "bodyType" => &self.body_type,
            "drivetrain" => &self.drivetrain,
            "engine" => &self.engine,
            "notes" => &self.notes,
            _ => return None,
        };

        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FieldGroup {
    Header,
    Auxiliary,
    Back,
}

struct FieldMapping {
    group: FieldGroup,
    key: &'static str,
    label: &'static str,
}

/// Placement table for every display field the pass can carry.
///
/// Order within a group is rendering order on the device. Primary fields
/// are intentionally absent from the layout.
const FIELD_LAYOUT: &[FieldMapping] = &[
    FieldMapping {
        group: FieldGroup::Header,
        key: "year",
        label: "Year",
    },
    FieldMapping {
        group: FieldGroup::Auxiliary,
        key: "make",
        label: "Make",
    },
    FieldMapping {
        group: FieldGroup::Auxiliary,
        key: "model",
        label: "Model",
    },
    FieldMapping {
        group: FieldGroup::Auxiliary,
        key: "plate",
        label: "Plate",
    },
    FieldMapping {
        group: FieldGroup::Auxiliary,
        key: "fuelType",
        label: "Fuel",
    },
    FieldMapping {
        group: FieldGroup::Auxiliary,
        key: "transmission",
        label: "Transmission",
    },
    FieldMapping {
        group: FieldGroup::Back,
        key: "vin",
        label: "VIN",
    },
    FieldMapping {
        group: FieldGroup::Back,
        key: "engine",
        label: "Engine",
    },
    FieldMapping {
        group: FieldGroup::Back,
        key: "bodyType",
        label: "Body",
    },
    FieldMapping {
        group: FieldGroup::Back,
        key: "drivetrain",
        label: "Drivetrain",
    },
    FieldMapping {
        group: FieldGroup::Back,
        key: "notes",
        label: "Notes",
    },
];

/// One rendered pass field.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PassField {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// The generic pass structure's field groups.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassStructure {
    pub header_fields: Vec<PassField>,
    pub auxiliary_fields: Vec<PassField>,
    pub back_fields: Vec<PassField>,
}

/// The pass definition serialized as `pass.json`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassDefinition {
    pub format_version: u32,
    pub pass_type_identifier: String,
    pub serial_number: String,
    pub team_identifier: String,
    pub organization_name: String,
    pub description: String,
    pub background_color: String,
    pub foreground_color: String,
    pub label_color: String,
    pub generic: PassStructure,
}

impl PassDefinition {
    /// Assemble a definition from caller fields and the resolved serial.
    ///
    /// Absent optional fields are valid; assembly itself cannot fail.
    pub fn build(fields: &PassFields, serial_number: &str) -> Self {
        let mut generic = PassStructure::default();

        for mapping in FIELD_LAYOUT {
            if let Some(value) = fields.value(mapping.key) {
                let group = match mapping.group {
                    FieldGroup::Header => &mut generic.header_fields,
                    FieldGroup::Auxiliary => &mut generic.auxiliary_fields,
                    FieldGroup::Back => &mut generic.back_fields,
                };

                group.push(PassField {
                    key: mapping.key.to_string(),
                    label: mapping.label.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Self {
            format_version: 1,
            pass_type_identifier: PASS_TYPE_IDENTIFIER.to_string(),
            serial_number: serial_number.to_string(),
            team_identifier: TEAM_IDENTIFIER.to_string(),
            organization_name: ORGANIZATION_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            background_color: BACKGROUND_COLOR.to_string(),
            foreground_color: FOREGROUND_COLOR.to_string(),
            label_color: LABEL_COLOR.to_string(),
            generic,
        }
    }

    /// Serialize to the `pass.json` bytes placed in the bundle.
    pub fn to_json(&self) -> Result<Vec<u8>, PassIssuerError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_fields() -> PassFields {
        PassFields {
            make: Some("Toyota".to_string()),
            model: Some("Corolla".to_string()),
            year: Some("2020".to_string()),
            plate: Some("ABC123".to_string()),
            vin: Some("1HGCM82633A004352".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn fields_land_in_their_groups_with_labels() {
        let fields = sample_fields();
        let pass = PassDefinition::build(&fields, fields.serial_number().unwrap());

        assert_eq!(pass.serial_number, "1HGCM82633A004352");
        assert_eq!(
            pass.generic.header_fields,
            vec![PassField {
                key: "year".to_string(),
                label: "Year".to_string(),
                value: "2020".to_string(),
            }]
        );
        assert_eq!(
            pass.generic
                .auxiliary_fields
                .iter()
                .map(|f| (f.key.as_str(), f.value.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("make", "Toyota"),
                ("model", "Corolla"),
                ("plate", "ABC123"),
            ]
        );
        assert_eq!(
            pass.generic
                .back_fields
                .iter()
                .map(|f| f.key.as_str())
                .collect::<Vec<_>>(),
            vec!["vin"]
        );
    }

    #[test]
    fn absent_or_blank_fields_are_omitted() {
        let mut fields = sample_fields();
        fields.plate = None;
        fields.model = Some("  ".to_string());

        let pass = PassDefinition::build(&fields, "1HGCM82633A004352");

        assert!(pass
            .generic
            .auxiliary_fields
            .iter()
            .all(|f| f.key != "plate" && f.key != "model"));
        assert_eq!(
            pass.generic
                .auxiliary_fields
                .iter()
                .map(|f| f.key.as_str())
                .collect::<Vec<_>>(),
            vec!["make"]
        );
    }

    #[test]
    fn group_order_is_stable_across_calls() {
        let fields = PassFields {
            transmission: Some("CVT".to_string()),
            fuel_type: Some("Hybrid".to_string()),
            drivetrain: Some("FWD".to_string()),
            engine: Some("1.8L".to_string()),
            ..sample_fields()
        };

        let first = PassDefinition::build(&fields, "1HGCM82633A004352")
            .to_json()
            .unwrap();
        let second = PassDefinition::build(&fields, "1HGCM82633A004352")
            .to_json()
            .unwrap();
        assert_eq!(first, second);

        let pass = PassDefinition::build(&fields, "1HGCM82633A004352");
        assert_eq!(
            pass.generic
                .auxiliary_fields
                .iter()
                .map(|f| f.key.as_str())
                .collect::<Vec<_>>(),
            vec!["make", "model", "plate", "fuelType", "transmission"]
        );
    }

    #[test]
    fn keys_within_a_group_are_unique() {
        let fields = sample_fields();
        let pass = PassDefinition::build(&fields, "1HGCM82633A004352");

        for group in [
            &pass.generic.header_fields,
            &pass.generic.auxiliary_fields,
            &pass.generic.back_fields,
        ] {
            let mut keys = group.iter().map(|f| f.key.as_str()).collect::<Vec<_>>();
            keys.sort_unstable();
            let before = keys.len();
            keys.dedup();
            assert_eq!(keys.len(), before);
        }
    }

    #[test]
    fn definition_serializes_camel_case_constants() {
        let fields = sample_fields();
        let json: serde_json::Value = serde_json::from_slice(
            &PassDefinition::build(&fields, "1HGCM82633A004352")
                .to_json()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(json["formatVersion"], 1);
        assert_eq!(json["passTypeIdentifier"], PASS_TYPE_IDENTIFIER);
        assert_eq!(json["teamIdentifier"], TEAM_IDENTIFIER);
        assert_eq!(json["organizationName"], ORGANIZATION_NAME);
        assert_eq!(json["backgroundColor"], BACKGROUND_COLOR);
        assert!(json["generic"]["auxiliaryFields"].is_array());
    }

    #[test]
    fn serial_number_requires_vin() {
        let fields = PassFields {
            vin: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.serial_number(), None);
        assert_eq!(PassFields::default().serial_number(), None);
    }
}
