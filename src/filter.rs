//! Filtering and projection of structured BBQ records.

use clap::ValueEnum;
use serde::Deserialize;

/// One structured record from the public recon dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BbqData {
    pub domain: String,
    pub subdomain: String,
    pub dns_status_code: String,
    pub a: Vec<String>,
    pub cname: Vec<String>,
    pub ports: Vec<u16>,
    pub http_url: String,
    pub http_status_code: Option<u16>,
    pub http_title: String,
    pub cdn_name: String,
}

impl BbqData {
    pub fn fqdn(&self) -> String {
        crate::domain::qualify(&self.subdomain, &self.domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    /// subdomain.domain
    Fqdn,
    Domain,
    Subdomain,
    DnsStatusCode,
    A,
    Cname,
    Ports,
    HttpUrl,
    HttpStatusCode,
    HttpTitle,
    CdnName,
}

impl Field {
    /// Renders the field as plain text. Lists are comma separated.
    pub fn render(self, record: &BbqData) -> String {
        match self {
            Field::Fqdn => record.fqdn(),
            Field::Domain => record.domain.clone(),
            Field::Subdomain => record.subdomain.clone(),
            Field::DnsStatusCode => record.dns_status_code.clone(),
            Field::A => record.a.join(","),
            Field::Cname => record.cname.join(","),
            Field::Ports => record
                .ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Field::HttpUrl => record.http_url.clone(),
            Field::HttpStatusCode => record
                .http_status_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            Field::HttpTitle => record.http_title.clone(),
            Field::CdnName => record.cdn_name.clone(),
        }
    }

    fn matches(self, record: &BbqData, expected: &str) -> bool {
        match self {
            Field::A => record.a.iter().any(|v| v == expected),
            Field::Cname => record.cname.iter().any(|v| v == expected),
            Field::Ports => record.ports.iter().any(|p| p.to_string() == expected),
            _ => self.render(record) == expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub predicates: Vec<Predicate>,
    /// Output projection; empty means [`Field::Fqdn`].
    pub fields: Vec<Field>,
}

/// Returns true when `record` satisfies every predicate in `spec`.
pub fn apply_filter(record: &BbqData, spec: &FilterSpec) -> bool {
    spec.predicates
        .iter()
        .all(|p| p.field.matches(record, &p.value))
}

/// Renders the non-empty selected fields of `record` as one space separated
/// line.
///
/// Returns an empty string when every selected value is empty so the caller
/// can skip the record.
pub fn extract_output(record: &BbqData, spec: &FilterSpec) -> String {
    let fields: &[Field] = if spec.fields.is_empty() {
        &[Field::Fqdn]
    } else {
        &spec.fields
    };

    fields
        .iter()
        .map(|f| f.render(record))
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BbqData {
        serde_json::from_str(
            r#"{
                "domain": "example.com",
                "subdomain": "api",
                "dns_status_code": "NOERROR",
                "a": ["93.184.216.34", "93.184.216.35"],
                "ports": [80, 443],
                "http_url": "https://api.example.com",
                "http_status_code": 200,
                "http_title": "API",
                "cdn_name": "cloudflare",
                "unknown_field": true
            }"#,
        )
        .unwrap()
    }

    fn predicate(field: Field, value: &str) -> Predicate {
        Predicate {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_spec_passes_everything() {
        let spec = FilterSpec::default();
        assert!(apply_filter(&record(), &spec));
        assert!(apply_filter(&BbqData::default(), &spec));
    }

    #[test]
    fn predicates_are_conjunctive() {
        let mut spec = FilterSpec {
            predicates: vec![
                predicate(Field::HttpStatusCode, "200"),
                predicate(Field::CdnName, "cloudflare"),
            ],
            fields: Vec::new(),
        };
        assert!(apply_filter(&record(), &spec));

        spec.predicates.push(predicate(Field::DnsStatusCode, "NXDOMAIN"));
        assert!(!apply_filter(&record(), &spec));
    }

    #[test]
    fn list_fields_match_any_element() {
        let spec = FilterSpec {
            predicates: vec![
                predicate(Field::A, "93.184.216.35"),
                predicate(Field::Ports, "443"),
            ],
            fields: Vec::new(),
        };
        assert!(apply_filter(&record(), &spec));

        let spec = FilterSpec {
            predicates: vec![predicate(Field::Ports, "8080")],
            fields: Vec::new(),
        };
        assert!(!apply_filter(&record(), &spec));
    }

    #[test]
    fn missing_status_code_only_matches_empty_value() {
        let spec = FilterSpec {
            predicates: vec![predicate(Field::HttpStatusCode, "200")],
            fields: Vec::new(),
        };
        assert!(!apply_filter(&BbqData::default(), &spec));
    }

    #[test]
    fn default_projection_is_fqdn() {
        assert_eq!(
            extract_output(&record(), &FilterSpec::default()),
            "api.example.com"
        );
    }

    #[test]
    fn projection_keeps_field_order() {
        let spec = FilterSpec {
            predicates: Vec::new(),
            fields: vec![Field::HttpStatusCode, Field::Fqdn, Field::A],
        };
        assert_eq!(
            extract_output(&record(), &spec),
            "200 api.example.com 93.184.216.34,93.184.216.35"
        );
    }

    #[test]
    fn empty_values_are_skipped() {
        let spec = FilterSpec {
            predicates: Vec::new(),
            fields: vec![Field::Fqdn, Field::Cname, Field::HttpTitle],
        };
        assert_eq!(extract_output(&record(), &spec), "api.example.com API");
    }

    #[test]
    fn all_empty_projection_is_empty_line() {
        let spec = FilterSpec {
            predicates: Vec::new(),
            fields: vec![Field::HttpTitle, Field::Cname],
        };
        assert_eq!(extract_output(&BbqData::default(), &spec), "");
    }
}
