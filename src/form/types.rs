use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Location value meaning "other site"; the free-text override applies.
pub const OTHER_LOCATION: &str = "기타";

/// Location stamped on risk rows produced by image analysis.
pub const IMAGE_ANALYSIS_LOCATION: &str = "이미지 분석 결과";

/// Wizard steps in their fixed order. Discriminants match the page numbers
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    ProjectInfo = 1,
    SafetyTraining = 2,
    RiskAssessment = 3,
    WorkPermit = 4,
    SafetyPledge = 5,
    Confirmation = 6,
    Submitted = 7,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::ProjectInfo,
        Step::SafetyTraining,
        Step::RiskAssessment,
        Step::WorkPermit,
        Step::SafetyPledge,
        Step::Confirmation,
        Step::Submitted,
    ];

    /// Successor, saturating at `Submitted`
    pub fn next(self) -> Step {
        match self {
            Step::ProjectInfo => Step::SafetyTraining,
            Step::SafetyTraining => Step::RiskAssessment,
            Step::RiskAssessment => Step::WorkPermit,
            Step::WorkPermit => Step::SafetyPledge,
            Step::SafetyPledge => Step::Confirmation,
            Step::Confirmation | Step::Submitted => Step::Submitted,
        }
    }

    /// Predecessor, saturating at `ProjectInfo`
    pub fn prev(self) -> Step {
        match self {
            Step::ProjectInfo | Step::SafetyTraining => Step::ProjectInfo,
            Step::RiskAssessment => Step::SafetyTraining,
            Step::WorkPermit => Step::RiskAssessment,
            Step::SafetyPledge => Step::WorkPermit,
            Step::Confirmation => Step::SafetyPledge,
            Step::Submitted => Step::Confirmation,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn is_terminal(self) -> bool {
        self == Step::Submitted
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::ProjectInfo => "project info",
            Step::SafetyTraining => "safety training",
            Step::RiskAssessment => "risk assessment",
            Step::WorkPermit => "work permit",
            Step::SafetyPledge => "safety pledge",
            Step::Confirmation => "confirmation",
            Step::Submitted => "submitted",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub location: String,
    pub location_other: String,
    pub construction_name: String,
    pub company_name: String,
    pub contact_person: String,
}

impl ProjectInfo {
    pub fn is_other_location(&self) -> bool {
        self.location == OTHER_LOCATION
    }

    /// The site the work happens at, honoring the "other" override.
    pub fn resolved_location(&self) -> &str {
        if self.is_other_location() {
            &self.location_other
        } else {
            &self.location
        }
    }

    pub fn set(&mut self, field: ProjectInfoField, value: String) {
        match field {
            ProjectInfoField::Location => self.location = value,
            ProjectInfoField::LocationOther => self.location_other = value,
            ProjectInfoField::ConstructionName => self.construction_name = value,
            ProjectInfoField::CompanyName => self.company_name = value,
            ProjectInfoField::ContactPerson => self.contact_person = value,
        }
    }
}

/// Addressable fields of [`ProjectInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectInfoField {
    Location,
    LocationOther,
    ConstructionName,
    CompanyName,
    ContactPerson,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingStatus {
    pub completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
}

impl TrainingStatus {
    /// Toggle completion. The timestamp follows the flag and is only
    /// refreshed on a false -> true edge.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed {
            if !self.completed || self.completion_date.is_none() {
                self.completion_date = Some(now);
            }
        } else {
            self.completion_date = None;
        }
        self.completed = completed;
    }
}

/// Likelihood or severity on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskLevel(u8);

impl RiskLevel {
    pub const MIN: RiskLevel = RiskLevel(1);
    pub const MID: RiskLevel = RiskLevel(3);
    pub const MAX: RiskLevel = RiskLevel(5);

    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(RiskLevel(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::MIN
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        RiskLevel::new(value).ok_or_else(|| format!("risk level must be within 1..=5, got {}", value))
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub hazard: String,
    #[serde(default)]
    pub safety_measures: String,
    #[serde(default)]
    pub likelihood: RiskLevel,
    #[serde(default)]
    pub severity: RiskLevel,
    #[serde(default)]
    pub reduction_measures: String,
}

impl RiskItem {
    /// A blank row as added by hand.
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            location: String::new(),
            task: String::new(),
            hazard: String::new(),
            safety_measures: String::new(),
            likelihood: RiskLevel::MIN,
            severity: RiskLevel::MIN,
            reduction_measures: String::new(),
        }
    }

    /// A row seeded from one hazard reported by image analysis.
    pub fn from_analysis(work_type: &str, hazard: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            location: IMAGE_ANALYSIS_LOCATION.to_string(),
            task: work_type.to_string(),
            hazard: hazard.to_string(),
            safety_measures: String::new(),
            likelihood: RiskLevel::MID,
            severity: RiskLevel::MID,
            reduction_measures: String::new(),
        }
    }

    pub fn risk_score(&self) -> u8 {
        self.likelihood.value() * self.severity.value()
    }

    pub fn risk_band(&self) -> RiskBand {
        match self.risk_score() {
            score if score >= 9 => RiskBand::High,
            score if score >= 4 => RiskBand::Medium,
            _ => RiskBand::Low,
        }
    }
}

/// Ordered risk rows. Edits produce whole new sequences which are then
/// installed through the form's single risk-assessment setter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskAssessment {
    items: Vec<RiskItem>,
}

impl RiskAssessment {
    pub fn new(items: Vec<RiskItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[RiskItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&RiskItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn with_appended(&self, extra: impl IntoIterator<Item = RiskItem>) -> Self {
        let mut items = self.items.clone();
        items.extend(extra);
        Self { items }
    }

    /// Replace the row sharing `updated.id`. Unknown ids leave the sequence unchanged.
    pub fn with_updated(&self, updated: RiskItem) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| if item.id == updated.id { updated.clone() } else { item.clone() })
            .collect();
        Self { items }
    }

    /// Drop the first row with `id`. Later rows sharing the id (possible in
    /// hand-edited files) are kept.
    pub fn without(&self, id: Uuid) -> Self {
        let mut items = self.items.clone();
        if let Some(index) = items.iter().position(|item| item.id == id) {
            items.remove(index);
        }
        Self { items }
    }
}

impl From<Vec<RiskItem>> for RiskAssessment {
    fn from(items: Vec<RiskItem>) -> Self {
        Self::new(items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkPermitType {
    General,
    Hazardous,
}

impl fmt::Display for WorkPermitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkPermitType::General => write!(f, "general"),
            WorkPermitType::Hazardous => write!(f, "hazardous"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkPermit {
    #[serde(rename = "type")]
    pub permit_type: Option<WorkPermitType>,
    pub work_date: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub location: String,
    pub description: String,
    pub worker_count: u32,
    pub has_procedure_doc: bool,
    pub has_risk_assessment: bool,
    pub safety_checks: Vec<String>,
}

impl Default for WorkPermit {
    fn default() -> Self {
        Self {
            permit_type: None,
            work_date: String::new(),
            work_start_time: String::new(),
            work_end_time: String::new(),
            location: String::new(),
            description: String::new(),
            worker_count: 1,
            has_procedure_doc: false,
            has_risk_assessment: false,
            safety_checks: Vec::new(),
        }
    }
}

impl WorkPermit {
    pub fn merge(&mut self, update: WorkPermitUpdate) {
        if let Some(permit_type) = update.permit_type {
            self.permit_type = permit_type;
        }
        if let Some(work_date) = update.work_date {
            self.work_date = work_date;
        }
        if let Some(start) = update.work_start_time {
            self.work_start_time = start;
        }
        if let Some(end) = update.work_end_time {
            self.work_end_time = end;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(count) = update.worker_count {
            self.worker_count = count;
        }
        if let Some(flag) = update.has_procedure_doc {
            self.has_procedure_doc = flag;
        }
        if let Some(flag) = update.has_risk_assessment {
            self.has_risk_assessment = flag;
        }
        if let Some(checks) = update.safety_checks {
            self.safety_checks = checks;
        }
    }

    /// Update that flips membership of one safety-check label.
    pub fn toggled_check(&self, label: &str) -> WorkPermitUpdate {
        let checks = if self.safety_checks.iter().any(|check| check == label) {
            self.safety_checks.iter().filter(|check| *check != label).cloned().collect()
        } else {
            let mut checks = self.safety_checks.clone();
            checks.push(label.to_string());
            checks
        };
        WorkPermitUpdate {
            safety_checks: Some(checks),
            ..Default::default()
        }
    }
}

/// Partial [`WorkPermit`]. `None` leaves a field untouched; `permit_type`
/// uses `Some(None)` to clear the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkPermitUpdate {
    #[serde(rename = "type")]
    pub permit_type: Option<Option<WorkPermitType>>,
    pub work_date: Option<String>,
    pub work_start_time: Option<String>,
    pub work_end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub worker_count: Option<u32>,
    pub has_procedure_doc: Option<bool>,
    pub has_risk_assessment: Option<bool>,
    pub safety_checks: Option<Vec<String>>,
}

impl From<WorkPermit> for WorkPermitUpdate {
    fn from(permit: WorkPermit) -> Self {
        Self {
            permit_type: Some(permit.permit_type),
            work_date: Some(permit.work_date),
            work_start_time: Some(permit.work_start_time),
            work_end_time: Some(permit.work_end_time),
            location: Some(permit.location),
            description: Some(permit.description),
            worker_count: Some(permit.worker_count),
            has_procedure_doc: Some(permit.has_procedure_doc),
            has_risk_assessment: Some(permit.has_risk_assessment),
            safety_checks: Some(permit.safety_checks),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pledge {
    pub agreements: BTreeMap<String, bool>,
    pub agree_to_all: bool,
    pub name: String,
    pub signature: String,
}

impl Pledge {
    /// A pledge with every item present and not yet agreed.
    pub fn with_items<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            agreements: keys.into_iter().map(|key| (key.into(), false)).collect(),
            ..Default::default()
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn merge(&mut self, update: PledgeUpdate) {
        if let Some(agreements) = update.agreements {
            self.agreements = agreements;
        }
        if let Some(agree_to_all) = update.agree_to_all {
            self.agree_to_all = agree_to_all;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(signature) = update.signature {
            self.signature = signature;
        }
    }

    /// Update that flips one item and recomputes `agree_to_all`.
    pub fn toggled_item(&self, key: &str) -> PledgeUpdate {
        let mut agreements = self.agreements.clone();
        let current = agreements.get(key).copied().unwrap_or(false);
        agreements.insert(key.to_string(), !current);
        let all_agreed = !agreements.is_empty() && agreements.values().all(|agreed| *agreed);
        PledgeUpdate {
            agreements: Some(agreements),
            agree_to_all: Some(all_agreed),
            ..Default::default()
        }
    }

    /// Update that sets every item, and the aggregate flag, to `agree`.
    pub fn agree_all(&self, agree: bool) -> PledgeUpdate {
        let agreements = self.agreements.keys().map(|key| (key.clone(), agree)).collect();
        PledgeUpdate {
            agreements: Some(agreements),
            agree_to_all: Some(agree),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PledgeUpdate {
    pub agreements: Option<BTreeMap<String, bool>>,
    pub agree_to_all: Option<bool>,
    pub name: Option<String>,
    pub signature: Option<String>,
}

impl From<Pledge> for PledgeUpdate {
    fn from(pledge: Pledge) -> Self {
        Self {
            agreements: Some(pledge.agreements),
            agree_to_all: Some(pledge.agree_to_all),
            name: Some(pledge.name),
            signature: Some(pledge.signature),
        }
    }
}

/// The aggregate record the wizard fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub project_info: ProjectInfo,
    pub safety_training: TrainingStatus,
    pub risk_assessment: RiskAssessment,
    pub work_permit: WorkPermit,
    pub safety_pledge: Pledge,
}

impl Submission {
    /// Empty record whose pledge is seeded with the given item keys.
    pub fn with_pledge_items<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            safety_pledge: Pledge::with_items(keys),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_successor_and_predecessor_saturate() {
        assert_eq!(Step::Confirmation.next(), Step::Submitted);
        assert_eq!(Step::Submitted.next(), Step::Submitted);
        assert_eq!(Step::ProjectInfo.prev(), Step::ProjectInfo);
        assert_eq!(Step::WorkPermit.prev(), Step::RiskAssessment);
        for pair in Step::ALL.windows(2) {
            assert_eq!(pair[0].next(), pair[1]);
            assert_eq!(pair[1].ordinal(), pair[0].ordinal() + 1);
        }
    }

    #[test]
    fn test_resolved_location_prefers_override_for_other() {
        let mut info = ProjectInfo {
            location: "본사".to_string(),
            location_other: "Site X".to_string(),
            ..Default::default()
        };
        assert_eq!(info.resolved_location(), "본사");

        info.set(ProjectInfoField::Location, OTHER_LOCATION.to_string());
        assert_eq!(info.resolved_location(), "Site X");
    }

    #[test]
    fn test_training_timestamp_follows_flag() {
        let mut training = TrainingStatus::default();
        let first = Utc::now();
        training.set_completed(true, first);
        assert_eq!(training.completion_date, Some(first));

        // Re-asserting completion keeps the first timestamp
        training.set_completed(true, first + chrono::Duration::minutes(5));
        assert_eq!(training.completion_date, Some(first));

        training.set_completed(false, first);
        assert!(!training.completed);
        assert_eq!(training.completion_date, None);
    }

    #[test]
    fn test_risk_level_bounds() {
        assert!(RiskLevel::new(0).is_none());
        assert!(RiskLevel::new(6).is_none());
        assert_eq!(RiskLevel::new(5), Some(RiskLevel::MAX));
        assert_eq!(RiskLevel::try_from(1u8), Ok(RiskLevel::MIN));

        let parsed: Result<RiskLevel, _> = serde_json::from_str("9");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_risk_score_and_band() {
        let mut item = RiskItem::blank();
        assert_eq!(item.risk_score(), 1);
        assert_eq!(item.risk_band(), RiskBand::Low);

        item.likelihood = RiskLevel::new(2).unwrap();
        item.severity = RiskLevel::new(2).unwrap();
        assert_eq!(item.risk_band(), RiskBand::Medium);

        item.likelihood = RiskLevel::MID;
        item.severity = RiskLevel::MID;
        assert_eq!(item.risk_score(), 9);
        assert_eq!(item.risk_band(), RiskBand::High);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let assessment = RiskAssessment::new(vec![RiskItem::blank(), RiskItem::blank()]);
        let unchanged = assessment.without(Uuid::new_v4());
        assert_eq!(unchanged, assessment);

        let target = assessment.items()[0].id;
        let trimmed = assessment.without(target);
        assert_eq!(trimmed.len(), 1);
        assert!(trimmed.get(target).is_none());
    }

    #[test]
    fn test_remove_with_duplicate_ids_drops_one_row() {
        let first = RiskItem::blank();
        let mut twin = RiskItem::blank();
        twin.id = first.id;
        twin.task = "twin".to_string();
        let assessment = RiskAssessment::new(vec![first.clone(), RiskItem::blank(), twin.clone()]);

        let trimmed = assessment.without(first.id);

        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed.items()[1], twin);
    }

    #[test]
    fn test_safety_check_toggle_preserves_order() {
        let mut permit = WorkPermit::default();
        permit.merge(permit.toggled_check("환기"));
        permit.merge(permit.toggled_check("소화기 비치"));
        assert_eq!(permit.safety_checks, vec!["환기", "소화기 비치"]);

        permit.merge(permit.toggled_check("환기"));
        assert_eq!(permit.safety_checks, vec!["소화기 비치"]);
    }

    #[test]
    fn test_pledge_toggle_recomputes_agree_to_all() {
        let mut pledge = Pledge::with_items(["ppe", "no_smoking"]);
        pledge.merge(pledge.toggled_item("ppe"));
        assert!(!pledge.agree_to_all);

        pledge.merge(pledge.toggled_item("no_smoking"));
        assert!(pledge.agree_to_all);

        pledge.merge(pledge.toggled_item("ppe"));
        assert!(!pledge.agree_to_all);
        assert_eq!(pledge.agreements.get("no_smoking"), Some(&true));
    }

    #[test]
    fn test_work_permit_deserializes_wire_field_names() {
        let permit: WorkPermit = serde_json::from_str(
            r#"{"type":"hazardous","workDate":"2026-10-16","workerCount":4,"safetyChecks":["환기"]}"#,
        )
        .unwrap();
        assert_eq!(permit.permit_type, Some(WorkPermitType::Hazardous));
        assert_eq!(permit.worker_count, 4);
        assert!(permit.location.is_empty());
    }
}
