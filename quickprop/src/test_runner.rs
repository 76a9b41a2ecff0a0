//! Test runner integration: report formatting and assertion helpers for
//! `#[test]` functions.

use crate::config::CheckConfig;
use crate::error::ConfigError;
use crate::execution::PropertyTest;
use crate::property::Testable;
use crate::report::Report;
use crate::suite::SuiteReport;

/// Trait for custom test output formatting
pub trait TestOutputFormatter {
    /// Format the start of a property run
    fn format_start(&self, name: &str) -> String;

    /// Format the final report of a property run
    fn format_report(&self, name: &str, report: &Report) -> String;

    /// Format every member of a suite, one report per line group
    fn format_suite(&self, suite: &SuiteReport) -> String {
        suite
            .members
            .iter()
            .map(|member| self.format_report(&member.name, &member.report))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Output in the style of `cargo test`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl TestOutputFormatter for DefaultFormatter {
    fn format_start(&self, name: &str) -> String {
        format!("test {} ... ", name)
    }

    fn format_report(&self, _name: &str, report: &Report) -> String {
        match report {
            Report::Passed { tests_run, .. } => format!("ok ({} tests)", tests_run),
            Report::Cancelled { .. } => "cancelled".to_string(),
            Report::GaveUp { .. } => format!("GAVE UP\n{}", report),
            _ => format!("FAILED\n{}", report),
        }
    }
}

/// Full report text for every property
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseFormatter;

impl TestOutputFormatter for VerboseFormatter {
    fn format_start(&self, name: &str) -> String {
        format!("Running property: {}", name)
    }

    fn format_report(&self, name: &str, report: &Report) -> String {
        let mark = if report.is_passed() { "✓" } else { "✗" };
        format!("{} {} (seed {})\n{}", mark, name, report.seed(), report)
    }
}

/// One JSON object per event, for machine-readable output
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[cfg(feature = "serde")]
impl TestOutputFormatter for JsonFormatter {
    fn format_start(&self, name: &str) -> String {
        serde_json::json!({ "event": "started", "name": name }).to_string()
    }

    fn format_report(&self, name: &str, report: &Report) -> String {
        serde_json::json!({
            "event": "finished",
            "name": name,
            "report": report,
        })
        .to_string()
    }
}

/// Run `property` and panic with the report unless it passed
pub fn assert_property<P: Testable>(name: &str, property: P, config: CheckConfig) -> Report {
    let report = PropertyTest::new(property, config).named(name).run();
    if !report.is_passed() {
        panic!("property '{}' did not pass\n{}", name, report);
    }
    report
}

/// Check `property` with the defaults overridden by `QUICKPROP_*` variables
pub fn try_quick_check<P: Testable>(property: P) -> Result<Report, ConfigError> {
    let config = CheckConfig::default().with_env_overrides()?;
    PropertyTest::new(property, config).try_run()
}

/// [`try_quick_check`] for `#[test]` functions: panics on a bad environment
/// or a report other than passed
pub fn quick_check<P: Testable>(property: P) -> Report {
    match try_quick_check(property) {
        Ok(report) if report.is_passed() => report,
        Ok(report) => panic!("{}", report),
        Err(error) => panic!("invalid quickprop environment: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::for_all;

    fn falsified() -> Report {
        PropertyTest::new(for_all(|x: u8| x < 30), CheckConfig::default().with_seed(3)).run()
    }

    #[test]
    fn test_default_formatter() {
        let formatter = DefaultFormatter;
        assert_eq!(formatter.format_start("reverse"), "test reverse ... ");

        let passed = assert_property(
            "reflexive",
            for_all(|x: i32| x == x),
            CheckConfig::default().with_seed(1),
        );
        assert_eq!(formatter.format_report("reflexive", &passed), "ok (100 tests)");

        let failed = formatter.format_report("small", &falsified());
        assert!(failed.starts_with("FAILED\n*** Failed! Falsifiable"));
        assert!(failed.contains("\n30\n"));
    }

    #[test]
    fn test_verbose_formatter() {
        let output = VerboseFormatter.format_report("small", &falsified());
        assert!(output.starts_with("✗ small (seed 3)\n*** Failed!"));
    }

    #[test]
    #[should_panic(expected = "property 'small' did not pass")]
    fn test_assert_property_panics() {
        assert_property("small", for_all(|x: u8| x < 30), CheckConfig::default().with_seed(3));
    }

    #[test]
    fn test_quick_check_passes() {
        let report = quick_check(for_all(|v: Vec<i8>| v.len() == v.iter().count()));
        assert!(report.is_passed());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format_report("small", &falsified());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["event"], "finished");
        assert_eq!(value["report"]["verdict"], "falsified");
        assert_eq!(value["report"]["shrunk_witness"][0], "30");
    }
}
