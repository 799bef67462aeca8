use anyhow::Result;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::args::Args;
use crate::filter::FilterSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

/// The single workflow a run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Upload(InputSource),
    Count {
        domain: String,
    },
    /// `domain` is processed first, then every line of `list`.
    Enumerate {
        domain: Option<String>,
        list: Option<InputSource>,
    },
}

#[derive(Debug, Clone)]
pub struct Options {
    pub api_key: String,
    pub api_url: String,
    pub mode: Mode,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub bbq: bool,
    pub filter: FilterSpec,
}

/// Stdin counts as input when it is a pipe or a redirected file.
pub fn has_stdin() -> bool {
    !std::io::stdin().is_terminal()
}

impl Options {
    pub fn from_args(args: Args, stdin_piped: bool) -> Result<Self> {
        if args.key.trim().is_empty() {
            anyhow::bail!("missing API key: pass --key or set CHAOS_KEY");
        }

        let domain = args.domain.filter(|d| !d.is_empty());

        let mode = if let Some(update) = args.update {
            if update == "-" {
                if !stdin_piped {
                    anyhow::bail!("--update - expects subdomains on stdin");
                }
                Mode::Upload(InputSource::Stdin)
            } else {
                Mode::Upload(InputSource::File(PathBuf::from(update)))
            }
        } else if args.count {
            match domain {
                Some(domain) => Mode::Count { domain },
                None => anyhow::bail!("--count requires --domain"),
            }
        } else {
            let list = match args.list {
                Some(path) => Some(InputSource::File(path)),
                None if stdin_piped => Some(InputSource::Stdin),
                None => None,
            };
            if domain.is_none() && list.is_none() {
                anyhow::bail!("no input: pass --domain, --list or pipe domains on stdin");
            }
            Mode::Enumerate { domain, list }
        };

        Ok(Self {
            api_key: args.key,
            api_url: args.api_url,
            mode,
            output: args.output,
            json: args.json,
            bbq: args.bbq,
            filter: FilterSpec {
                predicates: args.filters,
                fields: args.fields,
            },
        })
    }
}
