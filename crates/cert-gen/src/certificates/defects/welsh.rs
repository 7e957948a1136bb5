use serde::Serialize;
use tracing::{debug, warn};

use crate::certificates::domain::VehicleType;
use crate::certificates::lookup::{DefectCategoryNode, RemoteLookup};

/// One translatable deficiency, denormalized from the category/item/deficiency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatDefect {
    pub im_number: u32,
    pub im_description: String,
    pub im_description_welsh: Option<String>,
    pub item_number: u32,
    pub item_description: String,
    pub item_description_welsh: Option<String>,
    pub deficiency_id: Option<String>,
    pub deficiency_sub_id: Option<String>,
    pub deficiency_category: Option<String>,
    pub deficiency_text: Option<String>,
    pub deficiency_text_welsh: Option<String>,
    #[serde(rename = "ref")]
    pub reference: String,
    pub for_vehicle_type: Vec<String>,
}

impl FlatDefect {
    fn applies_to(&self, vehicle_type: VehicleType) -> bool {
        self.for_vehicle_type
            .iter()
            .any(|value| value.eq_ignore_ascii_case(vehicle_type.as_str()))
    }
}

/// Flattens the nested catalogue. A deficiency without its own vehicle types
/// inherits those of its item, then of its category.
pub fn flatten_defects(tree: &[DefectCategoryNode]) -> Vec<FlatDefect> {
    let mut flat = Vec::new();
    for category in tree {
        for item in &category.items {
            for deficiency in &item.deficiencies {
                let for_vehicle_type = [
                    &deficiency.for_vehicle_type,
                    &item.for_vehicle_type,
                    &category.for_vehicle_type,
                ]
                .into_iter()
                .find(|types| !types.is_empty())
                .cloned()
                .unwrap_or_default();

                flat.push(FlatDefect {
                    im_number: category.im_number,
                    im_description: category.im_description.clone(),
                    im_description_welsh: category.im_description_welsh.clone(),
                    item_number: item.item_number,
                    item_description: item.item_description.clone(),
                    item_description_welsh: item.item_description_welsh.clone(),
                    deficiency_id: deficiency.deficiency_id.clone(),
                    deficiency_sub_id: deficiency.deficiency_sub_id.clone(),
                    deficiency_category: deficiency.deficiency_category.clone(),
                    deficiency_text: deficiency.deficiency_text.clone(),
                    deficiency_text_welsh: deficiency.deficiency_text_welsh.clone(),
                    reference: deficiency.reference.clone(),
                    for_vehicle_type,
                });
            }
        }
    }
    flat
}

/// Picks the catalogue row for `reference`, preferring the one that lists the
/// vehicle type and otherwise falling back to the first row found.
pub fn find_flat_defect<'a>(
    flat_defects: &'a [FlatDefect],
    reference: &str,
    vehicle_type: VehicleType,
) -> Option<&'a FlatDefect> {
    let mut matching = flat_defects
        .iter()
        .filter(|flat| flat.reference == reference)
        .peekable();
    let first = *matching.peek()?;
    Some(
        matching
            .find(|flat| flat.applies_to(vehicle_type))
            .unwrap_or(first),
    )
}

/// Fetches and flattens the Welsh catalogue, retrying without delay. After
/// `attempts` failures the catalogue is treated as empty so generation carries
/// on with English-only output.
pub async fn fetch_flat_defects(lookup: &dyn RemoteLookup, attempts: u8) -> Vec<FlatDefect> {
    for attempt in 1..=attempts {
        match lookup.welsh_defect_dictionary().await {
            Ok(tree) => {
                let flat = flatten_defects(&tree);
                debug!(attempt, rows = flat.len(), "Welsh defect catalogue loaded");
                return flat;
            }
            Err(err) => {
                warn!(attempt, attempts, error = %err, "Welsh defect catalogue fetch failed");
            }
        }
    }

    warn!(attempts, "giving up on Welsh defect catalogue; Welsh text omitted");
    Vec::new()
}

pub fn translate_location(value: &str) -> String {
    match value.to_ascii_lowercase().as_str() {
        "upper" => "uchaf",
        "lower" => "isaf",
        "inner" => "mewnol",
        "outer" => "allanol",
        "nearside" => "ochr mewnol",
        "offside" => "ochr allanol",
        "centre" => "canol",
        "front" => "blaen",
        "rear" => "cefn",
        _ => return value.to_string(),
    }
    .to_string()
}
