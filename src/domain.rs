/// Joins a subdomain label onto its parent domain.
pub fn qualify(label: &str, domain: &str) -> String {
    match (label.is_empty(), domain.is_empty()) {
        (true, _) => domain.to_string(),
        (false, true) => label.to_string(),
        (false, false) => format!("{label}.{domain}"),
    }
}
