//! Cube store collaborator
//!
//! The pipeline writes denormalized rows into reporting cubes owned by a
//! storage collaborator. The trait exposes per-unit transaction
//! boundaries (a failing unit rolls back only its own writes), erase-by-
//! cube semantics for full reruns, and the read queries the milestone
//! evaluator and the flag-propagation pass need. `MemoryCube` implements
//! the contract in memory for tests and offline runs.

use crate::algorithm::milestones::{
    PERFORMED_DOCUMENT_TYPES, REFERRAL_DOCUMENT_TYPES, ServiceStore,
};
use crate::error::{OncoCubeError, Result};
use crate::models::register::{RegisterDiagnosis, RegisterHistory};
use crate::models::semd::{MilestoneRow, PatientSemdRow, SemdDiagnosisRow, SemdServiceRow};
use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// The cubes a run may erase before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeKind {
    /// Per-document diagnosis rows
    SemdDiagnoses,
    /// Per-document service rows
    SemdServices,
    /// Per-document reconciliation/content rows
    PatientSemds,
    /// Patient-diagnosis milestone rows
    Milestones,
    /// Canonical register diagnoses
    RegisterDiagnoses,
}

/// A patient-diagnosis group of the diagnosis cube
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisGroup {
    /// Patient record id
    pub ptn_id: String,
    /// Patient short code
    pub ptn_code: Option<String>,
    /// Patient medical-organization OID
    pub ptn_mo_oid: Option<String>,
    /// Patient tags
    pub ptn_tags: Vec<String>,
    /// ICD-10 diagnosis code
    pub mkb10: String,
    /// Earliest diagnosis date of the group
    pub min_date: NaiveDate,
}

/// Write/read contract of the cube storage collaborator
pub trait CubeStore: ServiceStore {
    /// Purge all rows of a cube before a full rerun
    fn erase(&mut self, kind: CubeKind) -> Result<()>;

    /// Open a per-unit transaction; writes go to the unit buffer
    fn begin_unit(&mut self);
    /// Commit the unit buffer
    fn commit_unit(&mut self) -> Result<()>;
    /// Drop the unit buffer, keeping previously committed rows intact
    fn rollback_unit(&mut self);

    /// Append a diagnosis row
    fn insert_diagnosis(&mut self, row: SemdDiagnosisRow) -> Result<()>;
    /// Append a service row
    fn insert_service(&mut self, row: SemdServiceRow) -> Result<()>;
    /// Append a per-document verdict row
    fn insert_patient_semd(&mut self, row: PatientSemdRow) -> Result<()>;
    /// Append a milestone row
    fn insert_milestone(&mut self, row: MilestoneRow) -> Result<()>;
    /// Append a register diagnosis
    fn insert_register(&mut self, row: RegisterDiagnosis) -> Result<()>;

    /// Group diagnosis rows into `(patient, code) -> earliest date`
    /// timeline entries; undated groups are omitted
    fn diagnosis_groups(&self) -> Vec<DiagnosisGroup>;

    /// Timeline entries already present in the milestone cube, for runs
    /// that skip the regrouping stage
    fn milestone_groups(&self) -> Vec<DiagnosisGroup>;

    /// A patient's register history, ordered for as-of selection
    fn register_history(&self, ptn_id: &str) -> RegisterHistory;

    /// Propagate patient-level has-cancer/has-precancer flags: every row
    /// of a patient with any cancer (precancer) document gets the flag
    fn propagate_patient_flags(&mut self) -> Result<()>;
}

/// In-memory cube store
#[derive(Debug, Default)]
pub struct MemoryCube {
    diagnoses: Vec<SemdDiagnosisRow>,
    services: Vec<SemdServiceRow>,
    patient_semds: Vec<PatientSemdRow>,
    milestones: Vec<MilestoneRow>,
    register: Vec<RegisterDiagnosis>,
    unit: Option<UnitBuffer>,
}

#[derive(Debug, Default)]
struct UnitBuffer {
    diagnoses: Vec<SemdDiagnosisRow>,
    services: Vec<SemdServiceRow>,
    patient_semds: Vec<PatientSemdRow>,
    milestones: Vec<MilestoneRow>,
    register: Vec<RegisterDiagnosis>,
}

impl MemoryCube {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed diagnosis rows
    #[must_use]
    pub fn diagnoses(&self) -> &[SemdDiagnosisRow] {
        &self.diagnoses
    }

    /// Committed service rows
    #[must_use]
    pub fn services(&self) -> &[SemdServiceRow] {
        &self.services
    }

    /// Committed per-document verdict rows
    #[must_use]
    pub fn patient_semds(&self) -> &[PatientSemdRow] {
        &self.patient_semds
    }

    /// Committed milestone rows
    #[must_use]
    pub fn milestones(&self) -> &[MilestoneRow] {
        &self.milestones
    }

    /// Committed register diagnoses
    #[must_use]
    pub fn register_rows(&self) -> &[RegisterDiagnosis] {
        &self.register
    }

}

impl ServiceStore for MemoryCube {
    fn earliest_referral(
        &self,
        ptn_id: &str,
        services: &BTreeSet<String>,
        not_before: NaiveDate,
    ) -> Option<NaiveDate> {
        self.services
            .iter()
            .filter(|row| row.envelope.ptn_id == ptn_id)
            .filter(|row| {
                row.envelope
                    .document_type
                    .as_deref()
                    .is_some_and(|doc_type| REFERRAL_DOCUMENT_TYPES.contains(&doc_type))
            })
            .filter(|row| services.contains(&row.service_code))
            .filter_map(|row| row.envelope.time_rc.map(|time| time.date()))
            .filter(|date| *date >= not_before)
            .min()
    }

    fn earliest_performed(
        &self,
        ptn_id: &str,
        services: &BTreeSet<String>,
        not_before: NaiveDate,
    ) -> Option<NaiveDate> {
        self.services
            .iter()
            .filter(|row| row.envelope.ptn_id == ptn_id)
            .filter(|row| {
                row.envelope
                    .document_type
                    .as_deref()
                    .is_some_and(|doc_type| PERFORMED_DOCUMENT_TYPES.contains(&doc_type))
            })
            .filter(|row| services.contains(&row.service_code))
            .filter_map(|row| row.service_date)
            .filter(|date| *date >= not_before)
            .min()
    }
}

impl CubeStore for MemoryCube {
    fn erase(&mut self, kind: CubeKind) -> Result<()> {
        match kind {
            CubeKind::SemdDiagnoses => self.diagnoses.clear(),
            CubeKind::SemdServices => self.services.clear(),
            CubeKind::PatientSemds => self.patient_semds.clear(),
            CubeKind::Milestones => self.milestones.clear(),
            CubeKind::RegisterDiagnoses => self.register.clear(),
        }
        Ok(())
    }

    fn begin_unit(&mut self) {
        self.unit = Some(UnitBuffer::default());
    }

    fn commit_unit(&mut self) -> Result<()> {
        let Some(unit) = self.unit.take() else {
            return Err(OncoCubeError::Store("commit without an open unit".into()));
        };
        self.diagnoses.extend(unit.diagnoses);
        self.services.extend(unit.services);
        self.patient_semds.extend(unit.patient_semds);
        self.milestones.extend(unit.milestones);
        self.register.extend(unit.register);
        Ok(())
    }

    fn rollback_unit(&mut self) {
        self.unit = None;
    }

    fn insert_diagnosis(&mut self, row: SemdDiagnosisRow) -> Result<()> {
        match &mut self.unit {
            Some(unit) => unit.diagnoses.push(row),
            None => self.diagnoses.push(row),
        }
        Ok(())
    }

    fn insert_service(&mut self, row: SemdServiceRow) -> Result<()> {
        match &mut self.unit {
            Some(unit) => unit.services.push(row),
            None => self.services.push(row),
        }
        Ok(())
    }

    fn insert_patient_semd(&mut self, row: PatientSemdRow) -> Result<()> {
        match &mut self.unit {
            Some(unit) => unit.patient_semds.push(row),
            None => self.patient_semds.push(row),
        }
        Ok(())
    }

    fn insert_milestone(&mut self, row: MilestoneRow) -> Result<()> {
        match &mut self.unit {
            Some(unit) => unit.milestones.push(row),
            None => self.milestones.push(row),
        }
        Ok(())
    }

    fn insert_register(&mut self, row: RegisterDiagnosis) -> Result<()> {
        match &mut self.unit {
            Some(unit) => unit.register.push(row),
            None => self.register.push(row),
        }
        Ok(())
    }

    fn diagnosis_groups(&self) -> Vec<DiagnosisGroup> {
        let mut groups: FxHashMap<(String, String), DiagnosisGroup> = FxHashMap::default();
        for row in &self.diagnoses {
            let Some(date) = row.date else {
                continue;
            };
            let key = (row.envelope.ptn_id.clone(), row.mkb10.clone());
            groups
                .entry(key)
                .and_modify(|group| {
                    if date < group.min_date {
                        group.min_date = date;
                    }
                })
                .or_insert_with(|| DiagnosisGroup {
                    ptn_id: row.envelope.ptn_id.clone(),
                    ptn_code: row.envelope.ptn_code.clone(),
                    ptn_mo_oid: row.envelope.ptn_mo_oid.clone(),
                    ptn_tags: row.envelope.ptn_tags.clone(),
                    mkb10: row.mkb10.clone(),
                    min_date: date,
                });
        }
        groups
            .into_values()
            .sorted_by(|a, b| a.ptn_id.cmp(&b.ptn_id).then_with(|| a.mkb10.cmp(&b.mkb10)))
            .collect()
    }

    fn milestone_groups(&self) -> Vec<DiagnosisGroup> {
        self.milestones
            .iter()
            .map(|row| DiagnosisGroup {
                ptn_id: row.ptn_id.clone(),
                ptn_code: row.ptn_code.clone(),
                ptn_mo_oid: row.ptn_mo_oid.clone(),
                ptn_tags: row.ptn_tags.clone(),
                mkb10: row.mkb10.clone(),
                min_date: row.diagnosis_date,
            })
            .collect()
    }

    fn register_history(&self, ptn_id: &str) -> RegisterHistory {
        RegisterHistory::new(
            self.register
                .iter()
                .filter(|row| row.ptn_id == ptn_id)
                .cloned()
                .collect(),
        )
    }

    fn propagate_patient_flags(&mut self) -> Result<()> {
        let mut cancer_patients: BTreeSet<String> = BTreeSet::new();
        let mut precancer_patients: BTreeSet<String> = BTreeSet::new();
        for row in &self.patient_semds {
            if row.is_cancer_diagnoses {
                cancer_patients.insert(row.envelope.ptn_id.clone());
            }
            if row.is_precancer_diagnoses {
                precancer_patients.insert(row.envelope.ptn_id.clone());
            }
        }
        for row in &mut self.patient_semds {
            row.has_cancer_diagnosis = cancer_patients.contains(&row.envelope.ptn_id);
            row.has_precancer_diagnosis = precancer_patients.contains(&row.envelope.ptn_id);
        }
        Ok(())
    }
}
