use serde::Serialize;

use crate::certificates::domain::{Defect, DefectCategory, TestOutcome, VehicleType};
use crate::certificates::payload::SectionKey;

use super::format::{format_defect, format_defect_welsh};
use super::welsh::FlatDefect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectBucket {
    Dangerous,
    Major,
    Minor,
    Advisory,
    Prs,
}

/// Decides which list a defect is printed under for a given section. Rules
/// are evaluated in order; defects with an unknown category are dropped.
pub fn classify(defect: &Defect, outcome: TestOutcome, section: SectionKey) -> Option<DefectBucket> {
    let category = defect.category()?;
    let serious = matches!(category, DefectCategory::Dangerous | DefectCategory::Major);
    let rectified = outcome == TestOutcome::Prs || defect.prs;

    if serious && rectified && section == SectionKey::FailData {
        return Some(DefectBucket::Prs);
    }

    match category {
        DefectCategory::Dangerous if outcome == TestOutcome::Fail => Some(DefectBucket::Dangerous),
        DefectCategory::Major if outcome == TestOutcome::Fail => Some(DefectBucket::Major),
        DefectCategory::Minor => Some(DefectBucket::Minor),
        DefectCategory::Advisory => Some(DefectBucket::Advisory),
        DefectCategory::Dangerous | DefectCategory::Major => None,
    }
}

/// Catalogue used to render Welsh text when bilingual output is active.
#[derive(Debug, Clone, Copy)]
pub struct WelshRendering<'a> {
    pub vehicle_type: VehicleType,
    pub flat_defects: &'a [FlatDefect],
}

/// Defect lists for one payload section. Empty lists are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefectBuckets {
    #[serde(rename = "DangerousDefects", skip_serializing_if = "Vec::is_empty")]
    pub dangerous: Vec<String>,
    #[serde(rename = "MajorDefects", skip_serializing_if = "Vec::is_empty")]
    pub major: Vec<String>,
    #[serde(rename = "PRSDefects", skip_serializing_if = "Vec::is_empty")]
    pub prs: Vec<String>,
    #[serde(rename = "MinorDefects", skip_serializing_if = "Vec::is_empty")]
    pub minor: Vec<String>,
    #[serde(rename = "AdvisoryDefects", skip_serializing_if = "Vec::is_empty")]
    pub advisory: Vec<String>,
    #[serde(rename = "DangerousDefectsWelsh", skip_serializing_if = "Vec::is_empty")]
    pub dangerous_welsh: Vec<String>,
    #[serde(rename = "MajorDefectsWelsh", skip_serializing_if = "Vec::is_empty")]
    pub major_welsh: Vec<String>,
    #[serde(rename = "PRSDefectsWelsh", skip_serializing_if = "Vec::is_empty")]
    pub prs_welsh: Vec<String>,
    #[serde(rename = "MinorDefectsWelsh", skip_serializing_if = "Vec::is_empty")]
    pub minor_welsh: Vec<String>,
    #[serde(rename = "AdvisoryDefectsWelsh", skip_serializing_if = "Vec::is_empty")]
    pub advisory_welsh: Vec<String>,
}

impl DefectBuckets {
    /// Classifies and renders every defect for `section`.
    pub fn build(
        defects: &[Defect],
        outcome: TestOutcome,
        section: SectionKey,
        welsh: Option<WelshRendering<'_>>,
    ) -> Self {
        let mut buckets = Self::default();
        for defect in defects {
            let Some(bucket) = classify(defect, outcome, section) else {
                continue;
            };

            buckets.lists_mut(bucket).0.push(format_defect(defect));

            if let Some(welsh) = welsh {
                // Advisory notes have no Welsh template and print in English.
                let rendered = match bucket {
                    DefectBucket::Advisory => Some(format_defect(defect)),
                    _ => format_defect_welsh(defect, welsh.vehicle_type, welsh.flat_defects),
                };
                if let Some(rendered) = rendered {
                    buckets.lists_mut(bucket).1.push(rendered);
                }
            }
        }
        buckets
    }

    pub fn english(&self, bucket: DefectBucket) -> &[String] {
        match bucket {
            DefectBucket::Dangerous => &self.dangerous,
            DefectBucket::Major => &self.major,
            DefectBucket::Prs => &self.prs,
            DefectBucket::Minor => &self.minor,
            DefectBucket::Advisory => &self.advisory,
        }
    }

    pub fn welsh(&self, bucket: DefectBucket) -> &[String] {
        match bucket {
            DefectBucket::Dangerous => &self.dangerous_welsh,
            DefectBucket::Major => &self.major_welsh,
            DefectBucket::Prs => &self.prs_welsh,
            DefectBucket::Minor => &self.minor_welsh,
            DefectBucket::Advisory => &self.advisory_welsh,
        }
    }

    fn lists_mut(&mut self, bucket: DefectBucket) -> (&mut Vec<String>, &mut Vec<String>) {
        match bucket {
            DefectBucket::Dangerous => (&mut self.dangerous, &mut self.dangerous_welsh),
            DefectBucket::Major => (&mut self.major, &mut self.major_welsh),
            DefectBucket::Prs => (&mut self.prs, &mut self.prs_welsh),
            DefectBucket::Minor => (&mut self.minor, &mut self.minor_welsh),
            DefectBucket::Advisory => (&mut self.advisory, &mut self.advisory_welsh),
        }
    }
}
