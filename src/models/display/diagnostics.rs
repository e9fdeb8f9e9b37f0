//! Diagnostics display model

use serde::Serialize;
use tabled::Tabled;

use crate::shots::DiagnosticsReport;

/// One diagnostics check for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DiagnosticDisplay {
    #[tabled(rename = "CHECK")]
    pub check: String,

    #[tabled(rename = "RESULT")]
    pub result: String,
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn row(check: &str, result: String) -> DiagnosticDisplay {
    DiagnosticDisplay {
        check: check.to_string(),
        result,
    }
}

impl DiagnosticDisplay {
    /// Rows for every check that ran. Skipped checks show as `skipped`.
    pub fn rows(report: &DiagnosticsReport) -> Vec<Self> {
        let flag = |v: Option<bool>| v.map_or_else(|| "skipped".to_string(), yes_no);
        let count = |v: Option<usize>| v.map_or_else(|| "skipped".to_string(), |n| n.to_string());

        vec![
            row("credentials set", yes_no(report.auth_set)),
            row("credentials valid", flag(report.auth_valid)),
            row("root folder readable", flag(report.root_gettable)),
            row("files (all)", count(report.all_files_count)),
            row("files (.shot)", count(report.shot_files_count)),
            row("properly named shots", count(report.valid_shot_count)),
            row("misnamed shots", count(report.invalid_shot_count)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_for_partial_report() {
        let report = DiagnosticsReport {
            auth_set: true,
            auth_valid: Some(false),
            ..DiagnosticsReport::default()
        };

        let rows = DiagnosticDisplay::rows(&report);

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].result, "yes");
        assert_eq!(rows[1].result, "no");
        assert_eq!(rows[2].result, "skipped");
    }
}
