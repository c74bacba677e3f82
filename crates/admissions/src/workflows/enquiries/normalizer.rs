use crate::workflows::admissions::domain::LeadSource;

/// Strip BOM artifacts and collapse runs of whitespace while keeping the
/// display casing of the name.
pub(crate) fn clean_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map the free-text source column onto the known enquiry channels.
pub(crate) fn lead_source_for(label: &str) -> LeadSource {
    match label.trim().to_lowercase().as_str() {
        "walk in" | "walk-in" | "walkin" => LeadSource::WalkIn,
        "website" | "web" | "online form" => LeadSource::Website,
        "referral" | "reference" => LeadSource::Referral,
        "phone" | "call" | "telephone" => LeadSource::Phone,
        _ => LeadSource::Other,
    }
}

#[cfg(test)]
pub(crate) fn clean_name_for_tests(raw: &str) -> String {
    clean_name(raw)
}
