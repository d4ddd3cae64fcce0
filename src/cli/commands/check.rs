use anyhow::Result;
use contractor_safety::config::FormConfig;
use contractor_safety::form::{validator_for, Step, Submission};
use std::path::PathBuf;

use super::{load_submission, Command};

pub struct CheckCommand {
    file: PathBuf,
    form: FormConfig,
}

impl CheckCommand {
    pub fn new(file: PathBuf, form: FormConfig) -> Self {
        Self { file, form }
    }
}

/// Missing fields for every gated step, in wizard order.
pub fn step_report(submission: &Submission) -> Vec<(Step, Vec<&'static str>)> {
    Step::ALL
        .iter()
        .filter(|step| **step != Step::Confirmation)
        .filter_map(|step| validator_for(*step))
        .map(|validator| (validator.step, validator.missing_fields(submission)))
        .collect()
}

/// Values that are filled in but not among the configured choices: the
/// project site and the work-permit safety checks.
pub fn unlisted_choices(submission: &Submission, form: &FormConfig) -> Vec<String> {
    let mut unlisted = Vec::new();
    let location = &submission.project_info.location;
    if !location.is_empty() && !form.is_known_location(location) {
        unlisted.push(format!("location '{}' is not a configured site", location));
    }
    for label in &submission.work_permit.safety_checks {
        if !form.is_known_safety_check(label) {
            unlisted.push(format!("safety check '{}' is not a configured label", label));
        }
    }
    unlisted
}

impl Command for CheckCommand {
    async fn execute(&self) -> Result<()> {
        println!("🔍 Checking {}", self.file.display());
        println!();

        let submission = load_submission(&self.file).await?;
        let report = step_report(&submission);
        let incomplete = report.iter().filter(|(_, missing)| !missing.is_empty()).count();

        for (step, missing) in &report {
            if missing.is_empty() {
                println!("✅ {}. {}", step.ordinal(), step);
            } else {
                println!("❌ {}. {} - missing: {}", step.ordinal(), step, missing.join(", "));
            }
        }
        println!();

        let unlisted = unlisted_choices(&submission, &self.form);
        for finding in &unlisted {
            println!("⚠️  {}", finding);
        }
        if !unlisted.is_empty() {
            println!();
        }

        if incomplete > 0 {
            println!("📋 {} of {} steps incomplete", incomplete, report.len());
            anyhow::bail!("submission is incomplete");
        }
        if !unlisted.is_empty() {
            println!("📋 {} values outside the configured choices", unlisted.len());
            anyhow::bail!("submission uses unconfigured choices");
        }

        println!("🎉 All steps complete. Run 'contractor-safety walk' to submit.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_submission_reports_every_gated_step() {
        let report = step_report(&Submission::default());

        let steps: Vec<Step> = report.iter().map(|(step, _)| *step).collect();
        assert_eq!(
            steps,
            vec![
                Step::ProjectInfo,
                Step::SafetyTraining,
                Step::RiskAssessment,
                Step::WorkPermit,
                Step::SafetyPledge
            ]
        );
        assert!(report[0].1.contains(&"companyName"));
        assert_eq!(report[1].1, vec!["completed"]);
        // An empty risk table passes
        assert!(report[2].1.is_empty());
        assert!(!report[3].1.contains(&"workerCount"));
        assert!(report[4].1.contains(&"signature"));
    }

    #[test]
    fn test_unconfigured_site_and_check_are_flagged() {
        let form = FormConfig::default();
        let mut submission = Submission::default();
        submission.project_info.location = "부산 공장".to_string();
        submission.work_permit.safety_checks =
            vec!["소화기 비치".to_string(), "drone survey".to_string()];

        let unlisted = unlisted_choices(&submission, &form);

        assert_eq!(unlisted.len(), 2);
        assert!(unlisted[0].contains("부산 공장"));
        assert!(unlisted[1].contains("drone survey"));
    }

    #[test]
    fn test_configured_choices_pass() {
        let form = FormConfig::default();
        let mut submission = Submission::default();
        submission.project_info.location = "오송 공장".to_string();
        submission.work_permit.safety_checks = vec!["환기 상태 확인".to_string()];
        assert!(unlisted_choices(&submission, &form).is_empty());

        // Blank location is the validator's concern, not a choice problem
        assert!(unlisted_choices(&Submission::default(), &form).is_empty());
    }
}
