//! The fixed extraction instruction sent with the card images.

use crate::models::identity::IDENTITY_FIELDS;

/// Build the extraction instruction sent alongside the two card images.
///
/// Enumerates every field with its Arabic label and demands a bare JSON
/// object keyed by the English field keys. The wording is fixed: the same
/// images always produce the same request.
pub fn build_extraction_prompt() -> String {
    let numbered: String = IDENTITY_FIELDS
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. {} ({})\n", i + 1, f.english, f.label))
        .collect();

    let keys: String = IDENTITY_FIELDS
        .iter()
        .map(|f| format!("  \"{}\": \"...\"", f.key))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "Analyze the two provided images of an Egyptian National ID card.\n\
         The first image is the front of the card, the second is the back.\n\
         Extract the following information in Arabic:\n\
         {numbered}\n\
         Return ONLY a valid JSON object with these keys:\n\
         {{\n{keys}\n}}\n\
         Do not include markdown formatting. Just the raw JSON."
    )
}
