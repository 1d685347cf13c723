//! Fine-to-coarse label mappings per entity set.

use redakto_config::EntitySet;
use redakto_core::LabelMapping;

/// Built-in mapping for the known corpora.
pub fn builtin_label_mapping(entity_set_id: &str) -> Option<LabelMapping> {
    match entity_set_id {
        "codealltag" => Some(LabelMapping::from_pairs(
            &[
                ("FAMILY", "NAME"),
                ("FEMALE", "NAME"),
                ("MALE", "NAME"),
                ("CITY", "LOCATION"),
                ("STREET", "LOCATION"),
                ("STREETNO", "LOCATION"),
                ("ZIP", "LOCATION"),
                ("EMAIL", "CONTACT"),
                ("PHONE", "CONTACT"),
                ("URL", "CONTACT"),
                ("UFID", "ID"),
                ("USER", "ID"),
                ("ORG", "ORGANIZATION"),
            ],
            &[],
        )),
        "grascco" => Some(LabelMapping::from_pairs(
            &[
                ("NAME_DOCTOR", "NAME"),
                ("NAME_EXT", "NAME"),
                ("NAME_OTHER", "NAME"),
                ("NAME_PATIENT", "NAME"),
                ("NAME_RELATIVE", "NAME"),
                ("LOCATION_CITY", "LOCATION"),
                ("LOCATION_COUNTRY", "LOCATION"),
                ("LOCATION_OTHER", "LOCATION"),
                ("LOCATION_STATE", "LOCATION"),
                ("LOCATION_STREET", "LOCATION"),
                ("LOCATION_ZIP", "LOCATION"),
                ("CONTACT_EMAIL", "CONTACT"),
                ("CONTACT_FAX", "CONTACT"),
                ("CONTACT_PHONE", "CONTACT"),
                ("CONTACT_URL", "CONTACT"),
                ("NAME_USERNAME", "ID"),
                ("LOCATION_HOSPITAL", "ORGANIZATION"),
                ("LOCATION_ORGANIZATION", "ORGANIZATION"),
            ],
            &["NAME_TITLE"],
        )),
        _ => None,
    }
}

/// Catalog mapping if given, else the built-in one, else the label hierarchy.
pub fn label_mapping_for(entity_set: &EntitySet) -> LabelMapping {
    entity_set
        .label_mapping
        .clone()
        .or_else(|| builtin_label_mapping(&entity_set.entity_set_id))
        .unwrap_or_else(|| entity_set.hierarchy_mapping())
}
