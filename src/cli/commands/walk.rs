use anyhow::Result;
use contractor_safety::config::SinkConfig;
use contractor_safety::form::{
    FormError, ProjectInfoField, Step, Submission, SubmissionWizard, SubmittedRecord,
};
use contractor_safety::sink::sink_for;
use contractor_safety::telemetry::create_submission_span;
use std::path::PathBuf;
use tracing::Instrument;

use super::{load_submission, Command};

/// Replays a submission file through the wizard control surface, one step
/// at a time, then submits and delivers the frozen record.
pub struct WalkCommand {
    file: PathBuf,
    out: Option<PathBuf>,
    sink: SinkConfig,
    pledge_keys: Vec<String>,
}

impl WalkCommand {
    pub fn new(file: PathBuf, out: Option<PathBuf>, sink: SinkConfig, pledge_keys: Vec<String>) -> Self {
        Self {
            file,
            out,
            sink,
            pledge_keys,
        }
    }
}

/// Fill each slice through its setter and advance after it. Stops at the
/// first step whose gate rejects the record.
pub fn replay(wizard: &mut SubmissionWizard, submission: Submission) -> Result<SubmittedRecord, FormError> {
    let Submission {
        project_info,
        safety_training,
        risk_assessment,
        work_permit,
        safety_pledge,
    } = submission;

    let fields = [
        (ProjectInfoField::Location, project_info.location),
        (ProjectInfoField::LocationOther, project_info.location_other),
        (ProjectInfoField::ConstructionName, project_info.construction_name),
        (ProjectInfoField::CompanyName, project_info.company_name),
        (ProjectInfoField::ContactPerson, project_info.contact_person),
    ];
    for (field, value) in fields {
        wizard.update_project_info(field, value)?;
    }
    wizard.go_next()?;

    wizard.update_training(safety_training.completed)?;
    wizard.go_next()?;

    wizard.set_risk_assessment(risk_assessment)?;
    wizard.go_next()?;

    wizard.update_work_permit(work_permit.into())?;
    wizard.go_next()?;

    wizard.update_pledge(safety_pledge.into())?;
    wizard.go_next()?;

    wizard.submit()
}

fn print_progress(reached: Step) {
    for step in Step::ALL.iter().filter(|step| step.ordinal() < reached.ordinal()) {
        println!("  ✅ {}. {}", step.ordinal(), step);
    }
}

impl Command for WalkCommand {
    async fn execute(&self) -> Result<()> {
        println!("🚶 Walking {} through the wizard", self.file.display());
        println!();

        let submission = load_submission(&self.file).await?;
        let mut wizard = SubmissionWizard::with_pledge_items(self.pledge_keys.iter().cloned());

        let record = match replay(&mut wizard, submission) {
            Ok(record) => record,
            Err(e) => {
                let stopped_at = wizard.current_step();
                print_progress(stopped_at);
                println!("  ❌ {}. {} - {}", stopped_at.ordinal(), stopped_at, e);
                if !e.missing_fields().is_empty() {
                    println!("     Missing: {}", e.missing_fields().join(", "));
                }
                return Err(e.into());
            }
        };
        print_progress(Step::Submitted);
        println!();

        let correlation_id = record.correlation_id.to_string();
        let span = create_submission_span("deliver", Some(&correlation_id));
        let sink = sink_for(&self.sink, self.out.clone());
        let receipt = sink.deliver(&record).instrument(span).await?;

        println!("🎉 Submitted {}", record.correlation_id);
        println!("📦 {}", receipt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractor_safety::form::{
        Pledge, ProjectInfo, RiskItem, TrainingStatus, WorkPermit, WorkPermitType, OTHER_LOCATION,
    };

    fn complete_submission() -> Submission {
        let mut pledge = Pledge::with_items(["ppe", "permit"]);
        for agreed in pledge.agreements.values_mut() {
            *agreed = true;
        }
        pledge.agree_to_all = true;
        pledge.name = "Kim".to_string();
        pledge.signature = "data:image/png;base64,AAAA".to_string();

        let mut risk = RiskItem::blank();
        risk.location = "roof".to_string();
        risk.task = "welding".to_string();
        risk.hazard = "fumes".to_string();
        risk.reduction_measures = "ventilation".to_string();

        Submission {
            project_info: ProjectInfo {
                location: OTHER_LOCATION.to_string(),
                location_other: "Site X".to_string(),
                construction_name: "A".to_string(),
                company_name: "B".to_string(),
                contact_person: "C".to_string(),
            },
            safety_training: TrainingStatus {
                completed: true,
                completion_date: None,
            },
            risk_assessment: vec![risk].into(),
            work_permit: WorkPermit {
                permit_type: Some(WorkPermitType::Hazardous),
                work_date: "2026-10-16".to_string(),
                work_start_time: "09:00".to_string(),
                work_end_time: "18:00".to_string(),
                location: "roof".to_string(),
                description: "duct welding".to_string(),
                ..Default::default()
            },
            safety_pledge: pledge,
        }
    }

    #[test]
    fn test_complete_submission_replays_to_submitted() {
        let mut wizard = SubmissionWizard::default();
        let source = complete_submission();

        let record = replay(&mut wizard, source.clone()).unwrap();

        assert!(wizard.is_submitted());
        assert_eq!(record.submission.project_info, source.project_info);
        assert_eq!(record.submission.risk_assessment, source.risk_assessment);
        assert_eq!(record.submission.safety_pledge, source.safety_pledge);
        assert!(record.submission.safety_training.completion_date.is_some());
    }

    #[test]
    fn test_replay_stops_at_first_failing_step() {
        let mut source = complete_submission();
        source.work_permit.worker_count = 0;
        let mut wizard = SubmissionWizard::default();

        let err = replay(&mut wizard, source).unwrap_err();

        assert_eq!(wizard.current_step(), Step::WorkPermit);
        assert_eq!(err.missing_fields(), &["workerCount"]);
        assert!(!wizard.is_submitted());
    }

    #[tokio::test]
    async fn test_walk_writes_record_to_out_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("form.json");
        std::fs::write(&file, serde_json::to_string(&complete_submission()).unwrap()).unwrap();
        let out = temp.path().join("submitted");

        WalkCommand::new(file, Some(out.clone()), SinkConfig::default(), vec![])
            .execute()
            .await
            .unwrap();

        let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
