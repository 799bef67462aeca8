use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::Instant;
use tracing::{debug, info};

use crate::client::{ChaosApi, Item, OutputFormat, SubdomainsRequest};
use crate::domain::qualify;
use crate::filter::{apply_filter, extract_output, BbqData};
use crate::options::{InputSource, Mode, Options};
use crate::output::Output;

pub struct Runner<C> {
    client: C,
    options: Options,
}

impl<C: ChaosApi> Runner<C> {
    pub fn new(client: C, options: Options) -> Self {
        Self { client, options }
    }

    /// Runs the workflow selected by the options against the process's stdio.
    pub fn run(&self) -> Result<()> {
        match &self.options.mode {
            Mode::Upload(source) => self.upload(source),
            Mode::Count { domain } => {
                self.count(domain, &mut io::stdout().lock())?;
                Ok(())
            }
            Mode::Enumerate { domain, list } => {
                let mut output = Output::new(io::stdout().lock());
                if let Some(path) = &self.options.output {
                    output = output.with_file(path)?;
                }
                self.enumerate(domain.as_deref(), list.as_ref(), &mut output)?;
                output.flush().context("Could not flush results")
            }
        }
    }

    pub fn upload(&self, source: &InputSource) -> Result<()> {
        match source {
            InputSource::Stdin => self.upload_from(&mut io::stdin().lock(), "stdin"),
            InputSource::File(path) => {
                let mut file = File::open(path)
                    .with_context(|| format!("Could not open input file {}", path.display()))?;
                self.upload_from(&mut file, &path.display().to_string())
            }
        }
    }

    /// Uploads everything `contents` yields; `origin` names it in messages.
    pub fn upload_from(&self, contents: &mut dyn Read, origin: &str) -> Result<()> {
        let start_time = Instant::now();
        self.client
            .put_subdomains(contents)
            .with_context(|| format!("Could not upload subdomains from {origin}"))?;
        info!(
            action = "complete",
            component = "upload",
            origin = origin,
            duration_ms = start_time.elapsed().as_millis(),
            "Input processed successfully and subdomains with valid records will be updated to chaos dataset"
        );
        Ok(())
    }

    /// Prints the number of known subdomains for `domain` as a bare integer.
    pub fn count(&self, domain: &str, out: &mut dyn Write) -> Result<u64> {
        let stats = self
            .client
            .get_statistics(domain)
            .with_context(|| format!("Could not get statistics for {domain}"))?;
        writeln!(out, "{}", stats.subdomains).context("Could not write count")?;
        Ok(stats.subdomains)
    }

    pub fn enumerate(
        &self,
        domain: Option<&str>,
        list: Option<&InputSource>,
        output: &mut Output<'_>,
    ) -> Result<()> {
        if let Some(domain) = domain {
            self.process(domain, output)?;
        }

        match list {
            Some(InputSource::Stdin) => self.process_list(io::stdin().lock(), output),
            Some(InputSource::File(path)) => {
                let file = File::open(path)
                    .with_context(|| format!("Could not open input file {}", path.display()))?;
                self.process_list(BufReader::new(file), output)
            }
            None => Ok(()),
        }
    }

    /// Processes one domain per line, strictly in order.
    pub fn process_list(&self, reader: impl BufRead, output: &mut Output<'_>) -> Result<()> {
        let mut processed = 0usize;
        for line in reader.lines() {
            let domain = line.context("Could not read domain list")?;
            self.process(&domain, output)?;
            processed += 1;
        }
        debug!(
            action = "complete",
            component = "domain_list",
            domain_count = processed,
            "Domain list processed"
        );
        Ok(())
    }

    fn process(&self, domain: &str, output: &mut Output<'_>) -> Result<()> {
        if self.options.bbq {
            self.process_bbq_domain(domain, output)
        } else {
            self.process_domain(domain, output)
        }
    }

    fn request(&self, domain: &str) -> SubdomainsRequest {
        SubdomainsRequest {
            domain: domain.to_string(),
            format: if self.options.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
        }
    }

    pub fn process_domain(&self, domain: &str, output: &mut Output<'_>) -> Result<()> {
        let start_time = Instant::now();
        let mut written = 0usize;

        for item in self.client.get_subdomains(&self.request(domain)) {
            let item = item.with_context(|| format!("Could not get subdomains for {domain}"))?;
            let result = match item {
                Item::Raw(payload) => output.write_record(&payload),
                Item::Subdomain(label) if label.is_empty() => continue,
                Item::Subdomain(label) => output.write_line(&qualify(&label, domain)),
            };
            result.with_context(|| write_failure(output, domain))?;
            written += 1;
        }

        debug!(
            action = "complete",
            component = "enumeration",
            domain = domain,
            results = written,
            duration_ms = start_time.elapsed().as_millis(),
            "Domain processed"
        );
        Ok(())
    }

    pub fn process_bbq_domain(&self, domain: &str, output: &mut Output<'_>) -> Result<()> {
        let start_time = Instant::now();
        let mut written = 0usize;
        let mut filtered = 0usize;

        for item in self.client.get_bbq_subdomains(&self.request(domain)) {
            let payload = match item
                .with_context(|| format!("Could not get subdomains for {domain}"))?
            {
                Item::Raw(payload) => payload,
                Item::Subdomain(label) => label.into_bytes(),
            };

            if self.options.json {
                output
                    .write_record(&payload)
                    .with_context(|| write_failure(output, domain))?;
                written += 1;
                continue;
            }

            let record: BbqData = serde_json::from_slice(&payload)
                .with_context(|| format!("Could not unmarshal response for {domain}"))?;
            if !apply_filter(&record, &self.options.filter) {
                filtered += 1;
                continue;
            }
            let line = extract_output(&record, &self.options.filter);
            if line.is_empty() {
                continue;
            }
            output
                .write_line(&line)
                .with_context(|| write_failure(output, domain))?;
            written += 1;
        }

        debug!(
            action = "complete",
            component = "bbq_enumeration",
            domain = domain,
            results = written,
            filtered,
            duration_ms = start_time.elapsed().as_millis(),
            "Domain processed"
        );
        Ok(())
    }
}

fn write_failure(output: &Output<'_>, domain: &str) -> String {
    match output.file_path() {
        Some(path) => format!(
            "Could not write results to file {} for {domain}",
            path.display()
        ),
        None => format!("Could not write results for {domain}"),
    }
}
