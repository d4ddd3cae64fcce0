//! Plain-text rendering of the confirmation page.

use std::fmt;

use super::types::Submission;

const NOT_PROVIDED: &str = "(not provided)";

/// Borrowed view that renders a submission for final review.
pub struct Review<'a> {
    submission: &'a Submission,
}

impl<'a> Review<'a> {
    pub fn new(submission: &'a Submission) -> Self {
        Self { submission }
    }
}

fn field(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    let value = if value.trim().is_empty() { NOT_PROVIDED } else { value };
    writeln!(f, "  {:<20} {}", label, value)
}

impl fmt::Display for Review<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.submission;

        writeln!(f, "PROJECT INFO")?;
        field(f, "Location", s.project_info.resolved_location())?;
        field(f, "Construction", &s.project_info.construction_name)?;
        field(f, "Company", &s.project_info.company_name)?;
        field(f, "Contact", &s.project_info.contact_person)?;

        writeln!(f, "\nSAFETY TRAINING")?;
        let training = match (s.safety_training.completed, s.safety_training.completion_date) {
            (true, Some(at)) => format!("completed at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            (true, None) => "completed".to_string(),
            (false, _) => "not completed".to_string(),
        };
        field(f, "Status", &training)?;

        writeln!(f, "\nRISK ASSESSMENT")?;
        if s.risk_assessment.is_empty() {
            writeln!(f, "  No risk items added.")?;
        }
        for item in s.risk_assessment.items() {
            writeln!(
                f,
                "  - {}: {} [score {} {}]",
                item.task,
                item.hazard,
                item.risk_score(),
                item.risk_band()
            )?;
        }

        writeln!(f, "\nWORK PERMIT")?;
        let permit = &s.work_permit;
        let permit_type = permit.permit_type.map(|t| t.to_string()).unwrap_or_default();
        field(f, "Type", &permit_type)?;
        let schedule = if permit.work_date.is_empty() {
            String::new()
        } else {
            format!("{} {} ~ {}", permit.work_date, permit.work_start_time, permit.work_end_time)
                .trim()
                .to_string()
        };
        field(f, "Schedule", &schedule)?;
        field(f, "Location", &permit.location)?;
        field(f, "Description", &permit.description)?;
        field(f, "Workers", &permit.worker_count.to_string())?;
        field(f, "Safety checks", &permit.safety_checks.join(", "))?;

        writeln!(f, "\nSAFETY PLEDGE")?;
        field(f, "Name", &s.safety_pledge.name)?;
        field(f, "Agree to all", if s.safety_pledge.agree_to_all { "yes" } else { "no" })?;
        field(
            f,
            "Signature",
            if s.safety_pledge.is_signed() { "signed" } else { "not signed" },
        )
    }
}
