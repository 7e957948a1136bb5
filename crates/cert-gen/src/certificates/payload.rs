use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::domain::TestOutcome;
use super::service::CertificateError;

/// Top-level keys of the payload handed to the document generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKey {
    #[serde(rename = "DATA")]
    Data,
    #[serde(rename = "FAIL_DATA")]
    FailData,
    #[serde(rename = "ADR_DATA")]
    AdrData,
    #[serde(rename = "IVA_DATA")]
    IvaData,
    #[serde(rename = "MSVA_DATA")]
    MsvaData,
    #[serde(rename = "RWT_DATA")]
    RwtData,
    Signature,
    Watermark,
    Reissue,
}

impl SectionKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::FailData => "FAIL_DATA",
            Self::AdrData => "ADR_DATA",
            Self::IvaData => "IVA_DATA",
            Self::MsvaData => "MSVA_DATA",
            Self::RwtData => "RWT_DATA",
            Self::Signature => "Signature",
            Self::Watermark => "Watermark",
            Self::Reissue => "Reissue",
        }
    }

    /// Pass and fail sections populated for an outcome. A PRS test fills both:
    /// it reads as a pass with its rectified defects listed on the fail side.
    pub const fn for_outcome(outcome: TestOutcome) -> &'static [SectionKey] {
        match outcome {
            TestOutcome::Pass => &[SectionKey::Data],
            TestOutcome::Fail => &[SectionKey::FailData],
            TestOutcome::Prs => &[SectionKey::Data, SectionKey::FailData],
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fragment of a payload produced by a single command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialPayload {
    sections: BTreeMap<SectionKey, Value>,
}

impl PartialPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, key: SectionKey) -> Option<&Value> {
        self.sections.get(&key)
    }

    /// Serializes `content` into `key`. Nulls are stripped at every depth, objects
    /// left empty by that are dropped, and a section without content is not
    /// recorded at all.
    pub fn insert<T: Serialize>(&mut self, key: SectionKey, content: &T) -> Result<(), CertificateError> {
        match prune_nulls(serde_json::to_value(content)?) {
            Some(Value::Array(items)) if items.is_empty() => {}
            Some(value) => {
                self.sections.insert(key, value);
            }
            None => {}
        }
        Ok(())
    }

    /// Inserts a value as-is, keeping explicit nulls the template relies on.
    pub fn insert_raw(&mut self, key: SectionKey, value: Value) {
        self.sections.insert(key, value);
    }

    /// Merges `other` into `self`. Sibling keys of object sections are combined;
    /// when both sides define the same leaf key, `other` wins.
    pub fn merge(&mut self, other: PartialPayload) {
        for (key, incoming) in other.sections {
            match (self.sections.get_mut(&key), incoming) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                }
                (_, incoming) => {
                    self.sections.insert(key, incoming);
                }
            }
        }
    }
}

/// Assembled payload for one certificate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CertificatePayload {
    sections: BTreeMap<SectionKey, Value>,
}

impl CertificatePayload {
    pub fn section(&self, key: SectionKey) -> Option<&Value> {
        self.sections.get(&key)
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SectionKey> + '_ {
        self.sections.keys().copied()
    }

    /// Looks up `field` inside an object section.
    pub fn field(&self, key: SectionKey, field: &str) -> Option<&Value> {
        self.section(key).and_then(|section| section.get(field))
    }

    pub fn into_value(self) -> Value {
        Value::Object(
            self.sections
                .into_iter()
                .map(|(key, value)| (key.as_str().to_string(), value))
                .collect(),
        )
    }
}

fn prune_nulls(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, value)| prune_nulls(value).map(|value| (key, value)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(prune_nulls).collect(),
        )),
        other => Some(other),
    }
}

impl From<PartialPayload> for CertificatePayload {
    fn from(partial: PartialPayload) -> Self {
        Self {
            sections: partial.sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_content_is_not_recorded() {
        let mut payload = PartialPayload::empty();
        payload
            .insert(SectionKey::Data, &json!({ "Make": null }))
            .expect("insert");
        payload
            .insert(SectionKey::Reissue, &Option::<String>::None)
            .expect("insert");
        assert!(payload.is_empty());
    }

    #[test]
    fn nested_nulls_are_stripped() {
        let mut payload = PartialPayload::empty();
        payload
            .insert(
                SectionKey::Data,
                &json!({
                    "CurrentOdometer": { "value": null, "unit": null },
                    "ApplicantDetails": { "name": "Haulage Ltd", "address2": null },
                    "AdditionalDefects": [{ "defectName": "Brakes", "defectNotes": null }],
                    "DangerousDefects": [],
                    "RawVIN": "VIN1"
                }),
            )
            .expect("insert");

        assert_eq!(
            payload.section(SectionKey::Data),
            Some(&json!({
                "ApplicantDetails": { "name": "Haulage Ltd" },
                "AdditionalDefects": [{ "defectName": "Brakes" }],
                "DangerousDefects": [],
                "RawVIN": "VIN1"
            }))
        );
    }

    #[test]
    fn merge_combines_siblings_and_last_write_wins() {
        let mut first = PartialPayload::empty();
        first
            .insert(SectionKey::Data, &json!({ "Make": "Volvo", "Model": "FH" }))
            .expect("insert");
        let mut second = PartialPayload::empty();
        second
            .insert(SectionKey::Data, &json!({ "Model": "FM", "RawVIN": "VIN1" }))
            .expect("insert");
        second.insert_raw(SectionKey::Watermark, json!("NOT VALID"));

        first.merge(second);
        let payload = CertificatePayload::from(first);

        assert_eq!(
            payload.section(SectionKey::Data),
            Some(&json!({ "Make": "Volvo", "Model": "FM", "RawVIN": "VIN1" }))
        );
        assert_eq!(
            payload.into_value(),
            json!({
                "DATA": { "Make": "Volvo", "Model": "FM", "RawVIN": "VIN1" },
                "Watermark": "NOT VALID"
            })
        );
    }

    #[test]
    fn prs_populates_both_sections() {
        assert_eq!(
            SectionKey::for_outcome(TestOutcome::Prs),
            &[SectionKey::Data, SectionKey::FailData]
        );
        assert_eq!(SectionKey::for_outcome(TestOutcome::Fail), &[SectionKey::FailData]);
    }
}
