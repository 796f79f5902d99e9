//! Record batch I/O
//!
//! Reads the input CSV into targets and writes it back enriched with the
//! per-target results. Columns other than the ones used here pass through
//! untouched.

use crate::error::{ProbeError, ProbeResult};
use crate::issn;
use crate::pipeline::Report;
use crate::target::Target;
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const OAI_URL: &str = "oai_url";
pub const SET_SPEC: &str = "set_spec";
pub const ISSN: &str = "issn";
/// Optional explicit landing page column; overrides URL derivation
pub const JOURNAL_URL: &str = "journal_url";

/// Result columns appended to the output, after `journal_url`
pub const OUTPUT_COLUMNS: [&str; 4] = [
    "issn_webpage_match",
    "ojs_in_html",
    "scrape_success",
    "fetch_status",
];

/// Landing page for a journal from its OAI endpoint and set identifier
pub fn journal_url(oai_url: &str, set_spec: &str) -> String {
    let base = oai_url
        .strip_suffix("index/oai")
        .or_else(|| oai_url.strip_suffix("oai"))
        .unwrap_or(oai_url);
    format!("{}{}", base, set_spec)
}

/// Input rows plus the target built from each
#[derive(Debug, Clone)]
pub struct RecordBatch {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    targets: Vec<Target>,
    rejected_issns: usize,
    /// Input already carries `journal_url`, so the output must not repeat it
    has_url_column: bool,
}

impl RecordBatch {
    /// Read and validate a CSV file
    pub fn read(path: &Path) -> ProbeResult<Self> {
        if !path.exists() {
            return Err(ProbeError::PathNotFound(path.to_path_buf()));
        }
        let reader = csv::Reader::from_path(path)?;
        let batch = Self::from_reader(reader)?;
        info!(
            "Read {} records from {} ({} malformed ISSNs ignored)",
            batch.len(),
            path.display(),
            batch.rejected_issns
        );
        Ok(batch)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> ProbeResult<Self> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let oai_col = column(OAI_URL);
        let url_col = column(JOURNAL_URL);
        let set_col = column(SET_SPEC).ok_or_else(|| ProbeError::MissingColumn(SET_SPEC.into()))?;
        let issn_col = column(ISSN);
        if oai_col.is_none() && url_col.is_none() {
            return Err(ProbeError::MissingColumn(OAI_URL.into()));
        }

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut rejected_issns = 0;

        for record in reader.records() {
            let record = record?;
            let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").trim();

            let set_spec = field(Some(set_col));
            let url = match field(url_col) {
                "" => journal_url(field(oai_col), set_spec),
                explicit => explicit.to_string(),
            };

            let count = seen.entry(set_spec.to_string()).or_insert(0);
            *count += 1;
            let id = if *count == 1 {
                set_spec.to_string()
            } else {
                debug!("Repeated set_spec {}, occurrence {}", set_spec, count);
                format!("{}~{}", set_spec, count)
            };

            let raw_issn = field(issn_col);
            let parsed = issn::parse_field(raw_issn);
            if !parsed.rejected.is_empty() {
                debug!("Ignoring malformed ISSNs for {}: {:?}", id, parsed.rejected);
                rejected_issns += parsed.rejected.len();
            }

            targets.push(
                Target::new(id, url)
                    .with_issns(parsed.valid)
                    .with_raw_issn((!raw_issn.is_empty()).then(|| raw_issn.to_string())),
            );
            rows.push(record);
        }

        Ok(Self {
            headers,
            rows,
            targets,
            rejected_issns,
            has_url_column: url_col.is_some(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One target per row, in input order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Every valid ISSN in the batch, compact form, first-seen order
    pub fn issns(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.targets
            .iter()
            .flat_map(|t| t.expected_issns().iter())
            .filter(|issn| seen.insert(issn.as_str()))
            .cloned()
            .collect()
    }

    /// Write all rows, in input order, with the derived `journal_url` (unless
    /// the input has one) and the result columns appended
    pub fn write_enriched(&self, path: &Path, report: &Report) -> ProbeResult<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut headers = self.headers.clone();
        if !self.has_url_column {
            headers.push_field(JOURNAL_URL);
        }
        for column in OUTPUT_COLUMNS {
            headers.push_field(column);
        }
        writer.write_record(&headers)?;

        for (row, target) in self.rows.iter().zip(&self.targets) {
            let mut out = row.clone();
            if !self.has_url_column {
                out.push_field(target.url());
            }
            match report.get(target.id()) {
                Some(result) => {
                    out.push_field(bool_field(result.identity_match));
                    out.push_field(bool_field(result.platform_match));
                    out.push_field(bool_field(result.fetch_success));
                    out.push_field(&result.resolution.label());
                }
                None => {
                    for value in ["False", "False", "False", "missing"] {
                        out.push_field(value);
                    }
                }
            }
            writer.write_record(&out)?;
        }

        writer
            .flush()
            .map_err(|e| ProbeError::io(format!("writing {}", path.display()), e))?;
        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
