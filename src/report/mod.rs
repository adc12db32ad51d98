use crate::advisory::AdvisoryPair;
use crate::core::path::absolute;
use crate::core::AuditResult;
use crate::scanner::MatchResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

/// Exit status when affected packages were found
pub const EXIT_AFFECTED: i32 = 2;

/// Counters of one collection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub org: String,
    /// Absolute path of the corpus file
    pub output: String,
    pub repos_scanned: usize,
    pub archived_repos_skipped: usize,
    pub files_collected: usize,
    pub trees_truncated_skipped: usize,
}

impl Summary {
    pub fn new(org: &str, output: &Path) -> AuditResult<Self> {
        Ok(Self {
            org: org.to_string(),
            output: absolute(output)?.display().to_string(),
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    Affected,
}

/// Everything a run has to say
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Present only when the corpus was (re)built this run
    pub summary: Option<Summary>,
    pub advisories: Vec<AdvisoryPair>,
    pub findings: Vec<MatchResult>,
    pub verdict: Verdict,
}

impl AuditReport {
    pub fn new(summary: Option<Summary>, advisories: Vec<AdvisoryPair>, findings: Vec<MatchResult>) -> Self {
        let verdict = if findings.is_empty() {
            Verdict::Clean
        } else {
            Verdict::Affected
        };
        Self {
            summary,
            advisories,
            findings,
            verdict,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.verdict == Verdict::Clean
    }

    /// 0 when clean, [`EXIT_AFFECTED`] otherwise
    pub fn exit_code(&self) -> i32 {
        match self.verdict {
            Verdict::Clean => 0,
            Verdict::Affected => EXIT_AFFECTED,
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.findings.iter().map(finding_line).collect()
    }
}

pub fn finding_line(finding: &MatchResult) -> String {
    format!(
        "Package {}@{} found in {}",
        finding.pair.package, finding.pair.version, finding.source_file
    )
}

/// Collection summary as pretty JSON under a title line
pub fn format_summary(summary: &Summary) -> AuditResult<String> {
    Ok(format!(
        "Summary of repositories scanned:\n{}\n",
        serde_json::to_string_pretty(summary)?
    ))
}

/// Human-readable report: each advisory checked, its findings, then the verdict
pub fn format_report(report: &AuditReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "\nFound {} affected libraries:\n", report.advisories.len());

    let mut findings = report.findings.iter().peekable();
    for (i, pair) in report.advisories.iter().enumerate() {
        let _ = writeln!(output, "Checked for {}", pair);
        while let Some(finding) = findings.next_if(|f| f.advisory_index == i) {
            let _ = writeln!(output, "{}", finding_line(finding));
        }
    }

    if report.is_clean() {
        let _ = writeln!(output, "\n✓ All good: no affected packages found");
    } else {
        let _ = writeln!(output, "\n🚨 AFFECTED PACKAGES FOUND! ({})", report.findings.len());
        for warning in report.warnings() {
            let _ = writeln!(output, "  - {}", warning);
        }
    }

    output
}

/// Whole report as one pretty JSON document
pub fn render_json(report: &AuditReport) -> AuditResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
