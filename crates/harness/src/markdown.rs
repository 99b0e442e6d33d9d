//! Markdown output generation for latency statistics.

use crate::scheduler::RunSummary;
use latency_probe_core::MethodStatistics;
use std::fmt::Write;

/// Generate a markdown summary of a run.
///
/// `run` is optional so a summary can also be produced when re-aggregating
/// an existing log.
pub fn generate_summary(statistics: &[MethodStatistics], run: Option<&RunSummary>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Latency Summary");
    let _ = writeln!(output);
    let _ = writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339());
    let _ = writeln!(output);

    if let Some(run) = run {
        let _ = writeln!(output, "## Run");
        let _ = writeln!(output);
        let _ = writeln!(output, "- Started: {}", run.started_at.to_rfc3339());
        let _ = writeln!(output, "- Finished: {}", run.finished_at.to_rfc3339());
        let _ = writeln!(output, "- Passes: {}", run.passes);
        let _ = writeln!(
            output,
            "- Probes: {} ({} succeeded, {} failed)",
            run.probes,
            run.successes(),
            run.failures
        );
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Methods");
    let _ = writeln!(output);

    output.push_str(&generate_table(statistics));

    if statistics.is_empty() {
        return output;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(output, "Total methods: {}", statistics.len());

    output
}

/// Generate the per-method latency table on its own.
///
/// Without statistics this is a single line saying nothing succeeded.
pub fn generate_table(statistics: &[MethodStatistics]) -> String {
    let mut output = String::new();

    if statistics.is_empty() {
        let _ = writeln!(output, "No successful probes were recorded.");
        return output;
    }

    let _ = writeln!(output, "| Method | Max (ms) | Min (ms) | Avg (ms) | Samples |");
    let _ = writeln!(output, "|--------|----------|----------|----------|---------|");
    for stats in statistics {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            stats.method_name.replace('|', "\\|"),
            stats.max_ms,
            stats.min_ms,
            stats.avg_ms,
            stats.samples
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stats(name: &str) -> MethodStatistics {
        MethodStatistics {
            method_name: name.to_string(),
            max_ms: 567,
            min_ms: 123,
            avg_ms: 345,
            samples: 2,
        }
    }

    #[test]
    fn test_summary_has_one_table_row_per_method() {
        let summary = generate_summary(&[stats("ping"), stats("balance")], None);
        assert!(summary.contains("| ping | 567 | 123 | 345 | 2 |"));
        assert!(summary.contains("| balance | 567 | 123 | 345 | 2 |"));
        assert!(summary.contains("Total methods: 2"));
        assert!(!summary.contains("## Run"));
    }

    #[test]
    fn test_summary_includes_run_totals() {
        let run = RunSummary {
            passes: 2,
            probes: 4,
            failures: 1,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let summary = generate_summary(&[stats("ping")], Some(&run));
        assert!(summary.contains("- Passes: 2"));
        assert!(summary.contains("- Probes: 4 (3 succeeded, 1 failed)"));
    }

    #[test]
    fn test_summary_without_samples() {
        let summary = generate_summary(&[], None);
        assert!(summary.contains("No successful probes were recorded."));
        assert!(!summary.contains("| Method |"));
    }

    #[test]
    fn test_table_is_only_the_table() {
        let table = generate_table(&[stats("ping")]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "| Method | Max (ms) | Min (ms) | Avg (ms) | Samples |");
        assert_eq!(lines[2], "| ping | 567 | 123 | 345 | 2 |");
    }

    #[test]
    fn test_table_escapes_pipes_in_method_names() {
        let table = generate_table(&[stats("## Methods|x")]);
        assert!(table.contains("| ## Methods\\|x | 567 |"));
    }

    #[test]
    fn test_table_without_samples() {
        assert_eq!(generate_table(&[]), "No successful probes were recorded.\n");
    }
}
