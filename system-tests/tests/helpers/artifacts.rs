// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-test artifact directories and run summaries.
// Purpose: Leave a reviewable trail of every suite run, passing or not.
// Dependencies: system-tests, serde, serde_jcs, serde_json
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use storage_policy_harness::HarnessEvent;
use storage_policy_harness::SuiteReport;
use system_tests::config::SystemTestConfig;

/// Files written by [`TestReporter::record_run`].
const RUN_FILES: [&str; 3] = ["suite_report.json", "transcript.json", "events.jsonl"];

fn epoch_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

/// Directory holding one test's artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    /// Creates `<run root>/<test name>`, defaulting the run root to a
    /// timestamped directory under `target/system-tests`.
    pub fn create(test_name: &str) -> io::Result<Self> {
        let run_root = SystemTestConfig::load()
            .map_err(io::Error::other)?
            .run_root
            .unwrap_or_else(|| {
                PathBuf::from("target/system-tests").join(format!("run_{}", epoch_millis()))
            });
        let root = run_root.join(test_name);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical (JCS) JSON file.
    pub fn json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<()> {
        let bytes = serde_jcs::to_vec(value).map_err(io::Error::other)?;
        fs::write(self.root.join(name), bytes)
    }

    /// One JSON object per line.
    pub fn json_lines<T: Serialize>(&self, name: &str, values: &[T]) -> io::Result<()> {
        let mut out = Vec::new();
        for value in values {
            serde_json::to_writer(&mut out, value).map_err(io::Error::other)?;
            out.push(b'\n');
        }
        fs::write(self.root.join(name), out)
    }

    /// Plain text file.
    pub fn text(&self, name: &str, value: &str) -> io::Result<()> {
        fs::write(self.root.join(name), value)
    }
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    test_name: &'a str,
    status: &'a str,
    started_at_ms: u128,
    duration_ms: u128,
    notes: &'a [String],
    artifacts: &'a [String],
}

/// Writes `summary.json` and `summary.md` for a test, even on panic.
pub struct TestReporter {
    dir: ArtifactDir,
    test_name: String,
    started_at_ms: u128,
    finished: bool,
}

impl TestReporter {
    /// Starts reporting for `test_name`.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            dir: ArtifactDir::create(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: epoch_millis(),
            finished: false,
        })
    }

    /// Artifact directory.
    pub fn artifacts(&self) -> &ArtifactDir {
        &self.dir
    }

    /// Writes the suite report, HTTP transcript, and event stream of a run.
    /// Returns the file names for the summary.
    pub fn record_run<T: Serialize>(
        &self,
        report: &SuiteReport,
        transcript: &T,
        events: &[HarnessEvent],
    ) -> io::Result<Vec<String>> {
        let [report_file, transcript_file, events_file] = RUN_FILES;
        self.dir.json(report_file, report)?;
        self.dir.json(transcript_file, transcript)?;
        self.dir.json_lines(events_file, events)?;
        self.dir.text("verdicts.md", &verdict_table(report))?;
        Ok(RUN_FILES.iter().map(|name| (*name).to_string()).collect())
    }

    /// Writes the summary with a final status.
    pub fn finish(&mut self, status: &str, notes: Vec<String>, artifacts: Vec<String>) -> io::Result<()> {
        let summary = RunSummary {
            test_name: &self.test_name,
            status,
            started_at_ms: self.started_at_ms,
            duration_ms: epoch_millis().saturating_sub(self.started_at_ms),
            notes: &notes,
            artifacts: &artifacts,
        };
        self.dir.json("summary.json", &summary)?;
        self.dir.text("summary.md", &summary_markdown(&summary))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.finished {
            let status = if std::thread::panicking() { "panic" } else { "incomplete" };
            let _ = self.finish(status, vec!["no summary recorded before exit".to_string()], Vec::new());
        }
    }
}

/// One note per scenario: `pass name: detail` or `FAIL name: detail`.
pub fn verdict_notes(report: &SuiteReport) -> Vec<String> {
    report
        .scenarios
        .iter()
        .map(|scenario| {
            let mark = if scenario.verdict.passed { "pass" } else { "FAIL" };
            format!("{mark} {}: {}", scenario.name, scenario.verdict.detail)
        })
        .collect()
}

fn verdict_table(report: &SuiteReport) -> String {
    let mut out = format!("# Verdicts for run {}\n\n", report.run_tag);
    out.push_str("| scenario | actor | expected | accepted | rejected | verdict |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for scenario in &report.scenarios {
        let _ = writeln!(
            out,
            "| {} | {:?} | {} | {} | {} | {} |",
            scenario.name,
            scenario.actor,
            scenario.expectation.as_str(),
            scenario.accepted,
            scenario.rejected,
            if scenario.verdict.passed { "pass" } else { "FAIL" },
        );
    }
    let failed = report.teardown.failures();
    let _ = writeln!(out, "\nTeardown: {}", if failed.is_empty() { "clean" } else { "incomplete" });
    for entry in failed {
        let _ = writeln!(out, "- {:?}: {}", entry.step, entry.error.as_deref().unwrap_or("unknown"));
    }
    out
}

fn summary_markdown(summary: &RunSummary<'_>) -> String {
    let mut out = format!(
        "# {}\n\n- Status: {}\n- Duration (ms): {}\n",
        summary.test_name, summary.status, summary.duration_ms
    );
    for (heading, lines) in [("Notes", summary.notes), ("Artifacts", summary.artifacts)] {
        let _ = writeln!(out, "\n## {heading}\n");
        if lines.is_empty() {
            out.push_str("- None\n");
        }
        for line in lines {
            let _ = writeln!(out, "- {line}");
        }
    }
    out
}
