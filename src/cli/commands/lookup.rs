//! Lookup command - query the ISSN registry

use crate::cli::args::LookupArgs;
use crate::config::Config;
use crate::error::{ProbeError, ProbeResult};
use crate::issn;
use crate::records::RecordBatch;
use crate::registry::RegistryClient;
use crate::ui::{self, TaskSpinner, UiContext};
use tokio::fs;

/// Execute the lookup command
pub async fn execute(args: LookupArgs, config: &Config) -> ProbeResult<()> {
    let ctx = UiContext::detect();
    let issns = collect_issns(&ctx, &args)?;

    if issns.is_empty() {
        return Err(ProbeError::User(
            "No valid ISSNs to look up. Pass ISSNs or --input".to_string(),
        ));
    }

    let client = RegistryClient::from_config(&config.registry, &config.fetch.user_agent);
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Looking up {} ISSNs...", issns.len()));
    let report = client.lookup_all(&issns).await;

    let message = format!("{} of {} ISSNs found", report.records(), report.outcomes.len());
    if report.banned {
        spinner.stop_warn(&format!("{} (stopped: registry refused further requests)", message));
    } else {
        spinner.stop(&message);
    }

    let json = serde_json::to_string_pretty(&report.to_json())?;
    match args.output {
        Some(path) => {
            fs::write(&path, json)
                .await
                .map_err(|e| ProbeError::io(format!("writing {}", path.display()), e))?;
            ui::step_file(&ctx, "Results written", &path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// ISSNs from --input first, then positional ones. Malformed positional
/// ISSNs are skipped with a warning.
fn collect_issns(ctx: &UiContext, args: &LookupArgs) -> ProbeResult<Vec<String>> {
    let mut issns = match args.input {
        Some(ref path) => RecordBatch::read(path)?.issns(),
        None => Vec::new(),
    };

    for raw in &args.issns {
        match issn::validate(raw) {
            Ok(compact) if !issns.contains(&compact) => issns.push(compact),
            Ok(_) => {}
            Err(e) => ui::step_warn(ctx, &format!("Skipping {}: {}", raw, e), None),
        }
    }

    Ok(issns)
}
