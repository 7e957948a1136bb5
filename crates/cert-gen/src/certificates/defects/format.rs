use crate::certificates::domain::{Defect, DefectLocation, VehicleType};

use super::welsh::{find_flat_defect, translate_location, FlatDefect};

/// Phrases used when rendering the location qualifiers of a defect.
struct LocationPhrases {
    axles: &'static str,
    rows: &'static str,
    seats: &'static str,
    translate: fn(&str) -> String,
}

const ENGLISH: LocationPhrases = LocationPhrases {
    axles: "Axles",
    rows: "Rows",
    seats: "Seats",
    translate: str::to_string,
};

const WELSH: LocationPhrases = LocationPhrases {
    axles: "Echelau",
    rows: "Rhesi",
    seats: "Seddi",
    translate: translate_location,
};

/// Renders a defect as printed on an English certificate, e.g.
/// `54.1.a.ii Power steering: not working correctly. Axles: 7. Inner Offside. Notes`.
pub fn format_defect(defect: &Defect) -> String {
    render(
        defect,
        &defect.item_description,
        defect.deficiency_text.as_deref(),
        &ENGLISH,
    )
}

/// Welsh rendering of a defect using the translated catalogue entry. Returns
/// `None` when the catalogue has no row for the defect reference.
pub fn format_defect_welsh(
    defect: &Defect,
    vehicle_type: VehicleType,
    flat_defects: &[FlatDefect],
) -> Option<String> {
    let Some(translation) = find_flat_defect(flat_defects, &defect.reference, vehicle_type) else {
        tracing::error!(
            reference = %defect.reference,
            %vehicle_type,
            "no Welsh translation found for defect"
        );
        return None;
    };

    let item = translation
        .item_description_welsh
        .as_deref()
        .unwrap_or(&defect.item_description);
    let text = defect.deficiency_text.as_deref().map(|english| {
        translation
            .deficiency_text_welsh
            .as_deref()
            .unwrap_or(english)
    });

    Some(render(defect, item, text, &WELSH))
}

fn render(
    defect: &Defect,
    item_description: &str,
    deficiency_text: Option<&str>,
    phrases: &LocationPhrases,
) -> String {
    let mut rendered = format!("{} {}", defect.reference, item_description);

    if let Some(text) = deficiency_text.filter(|text| !text.trim().is_empty()) {
        rendered.push(' ');
        rendered.push_str(text);
    }

    if let Some(clause) = defect
        .additional_information
        .location
        .as_ref()
        .and_then(|location| location_clause(location, phrases))
    {
        rendered.push(' ');
        rendered.push_str(&clause);
    }

    if let Some(notes) = defect
        .additional_information
        .notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
    {
        rendered.push(' ');
        rendered.push_str(notes);
    }

    rendered
}

/// Qualifiers render in a fixed order: axle, free-text positions, row, seat.
fn location_clause(location: &DefectLocation, phrases: &LocationPhrases) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(axle) = location.axle_number.filter(|axle| *axle > 0) {
        parts.push(format!("{}: {}.", phrases.axles, axle));
    }

    let free_text = [
        &location.vertical,
        &location.horizontal,
        &location.lateral,
        &location.longitudinal,
    ];
    for qualifier in free_text
        .into_iter()
        .filter_map(|value| value.as_deref())
        .filter(|value| !value.trim().is_empty())
    {
        // Capitalised after translation so Welsh qualifiers match the English phrasing.
        parts.push(upper_first(&(phrases.translate)(qualifier.trim())));
    }

    if let Some(row) = location.row_number.filter(|row| *row > 0) {
        parts.push(format!("{}: {}.", phrases.rows, row));
    }
    if let Some(seat) = location.seat_number.filter(|seat| *seat > 0) {
        parts.push(format!("{}: {}.", phrases.seats, seat));
    }

    if parts.is_empty() {
        return None;
    }

    let mut clause = parts.join(" ");
    if !clause.ends_with('.') {
        clause.push('.');
    }
    Some(clause)
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
