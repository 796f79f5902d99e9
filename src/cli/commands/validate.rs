//! Validate command - check ISSN check digits offline

use crate::cli::args::ValidateArgs;
use crate::error::{ProbeError, ProbeResult};
use crate::issn;
use crate::ui::{self, UiContext};

/// Execute the validate command
pub async fn execute(args: ValidateArgs) -> ProbeResult<()> {
    let ctx = UiContext::detect();
    let mut invalid = Vec::new();

    for raw in &args.issns {
        match issn::validate(raw) {
            Ok(compact) => {
                let shown = match issn::to_ean(&compact, "00") {
                    Ok(ean) => format!("{} (EAN {})", issn::format(&compact), ean),
                    Err(_) => issn::format(&compact),
                };
                ui::key_value_status(&ctx, raw, &shown, true);
            }
            Err(e) => {
                ui::key_value_status(&ctx, raw, &e.to_string(), false);
                invalid.push((raw.clone(), e));
            }
        }
    }

    match invalid.as_slice() {
        [] => Ok(()),
        [(issn, reason)] => Err(ProbeError::InvalidIssn {
            issn: issn.clone(),
            reason: reason.to_string(),
        }),
        many => Err(ProbeError::User(format!(
            "{} of {} ISSNs are invalid",
            many.len(),
            args.issns.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_valid_issns() {
        let args = ValidateArgs {
            issns: vec!["0024-9319".to_string(), "0000006x".to_string()],
        };
        assert!(execute(args).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_bad_check_digit() {
        let args = ValidateArgs {
            issns: vec!["1234-5678".to_string()],
        };
        let err = execute(args).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidIssn { ref issn, .. } if issn == "1234-5678"));
    }

    #[tokio::test]
    async fn counts_multiple_failures() {
        let args = ValidateArgs {
            issns: vec!["1234-5678".to_string(), "abc".to_string(), "0317-8471".to_string()],
        };
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("2 of 3"));
    }
}
