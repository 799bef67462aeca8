use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::filter::{Field, Predicate};

#[derive(Parser, Debug)]
#[command(
    name = "chaos",
    about = "Query and contribute to the Chaos subdomain dataset",
    version,
    long_about = None
)]
pub struct Args {
    /// Chaos API key
    #[arg(short, long, env = "CHAOS_KEY", hide_env_values = true, default_value = "")]
    pub key: String,

    /// Domain to enumerate
    #[arg(short, long)]
    pub domain: Option<String>,

    /// File containing domains to enumerate, one per line
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Upload subdomains from a file ("-" or no value reads stdin)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "-")]
    pub update: Option<String>,

    /// File to mirror results into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print raw JSON responses
    #[arg(long)]
    pub json: bool,

    /// Fetch structured bug bounty (BBQ) records
    #[arg(long)]
    pub bbq: bool,

    /// Keep only BBQ records where FIELD equals VALUE (repeatable)
    #[arg(
        long = "filter",
        value_name = "FIELD=VALUE",
        value_parser = parse_predicate,
        requires = "bbq"
    )]
    pub filters: Vec<Predicate>,

    /// BBQ record fields to print
    #[arg(long, value_enum, value_delimiter = ',', requires = "bbq")]
    pub fields: Vec<Field>,

    /// Print only the number of subdomains
    #[arg(short, long)]
    pub count: bool,

    /// Base URL of the Chaos API
    #[arg(
        long,
        env = "CHAOS_API_URL",
        default_value = "https://dns.projectdiscovery.io"
    )]
    pub api_url: String,

    /// Print only results
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_predicate(raw: &str) -> Result<Predicate, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = Field::from_str(name.trim(), true)?;
    Ok(Predicate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bbq_flags() {
        let args = Args::try_parse_from([
            "chaos",
            "-k",
            "secret",
            "-d",
            "example.com",
            "--bbq",
            "--filter",
            "http-status-code=200",
            "--filter",
            "cdn-name=cloudflare",
            "--fields",
            "fqdn,http-title",
        ])
        .unwrap();

        assert!(args.bbq);
        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.filters[0].field, Field::HttpStatusCode);
        assert_eq!(args.filters[0].value, "200");
        assert_eq!(args.fields, vec![Field::Fqdn, Field::HttpTitle]);
    }

    #[test]
    fn bare_update_means_stdin() {
        let args = Args::try_parse_from(["chaos", "-k", "secret", "--update"]).unwrap();
        assert_eq!(args.update.as_deref(), Some("-"));

        let args = Args::try_parse_from(["chaos", "-k", "secret", "-u", "subs.txt"]).unwrap();
        assert_eq!(args.update.as_deref(), Some("subs.txt"));
    }

    #[test]
    fn rejects_unknown_filter_field() {
        let err = Args::try_parse_from(["chaos", "--bbq", "--filter", "colour=red"]);
        assert!(err.is_err());

        let err = Args::try_parse_from(["chaos", "--bbq", "--filter", "http-title"]);
        assert!(err.is_err());

        let err = Args::try_parse_from(["chaos", "--filter", "http-title=Home"]);
        assert!(err.is_err());
    }
}
