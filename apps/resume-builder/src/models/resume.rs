use serde::{Deserialize, Serialize};

/// Identifier of an entry inside one collection. Unique per collection only.
pub type EntryId = i64;

/// Generates an `Option<String>` patch struct for an entry type plus the
/// shallow-merge that copies every `Some` field onto the target.
macro_rules! entry_patch {
    ($patch:ident for $target:ident { $($field:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $patch {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )+
        }

        impl $patch {
            pub fn apply_to(&self, target: &mut $target) {
                $(
                    if let Some(value) = &self.$field {
                        target.$field = value.clone();
                    }
                )+
            }
        }
    };
}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

/// The complete structured resume. Serialized with camelCase keys, which is
/// also the on-disk and `resume.json` format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub internships: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub languages: Vec<LanguageEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub achievements: Vec<AchievementEntry>,
    pub skills: Vec<String>,
}

impl ResumeRecord {
    /// The first-launch scaffold: one blank entry (id 1) per collection, no skills.
    pub fn scaffold() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            education: vec![EducationEntry::placeholder()],
            experience: vec![ExperienceEntry::placeholder()],
            internships: vec![ExperienceEntry::placeholder()],
            projects: vec![ProjectEntry::placeholder()],
            languages: vec![LanguageEntry::placeholder()],
            certificates: vec![CertificateEntry::placeholder()],
            achievements: vec![AchievementEntry::placeholder()],
            skills: Vec::new(),
        }
    }

    /// Largest entry id across every collection, or 0 for an empty record.
    pub fn max_entry_id(&self) -> EntryId {
        let ids = self
            .education
            .iter()
            .map(Entry::id)
            .chain(self.experience.iter().map(Entry::id))
            .chain(self.internships.iter().map(Entry::id))
            .chain(self.projects.iter().map(Entry::id))
            .chain(self.languages.iter().map(Entry::id))
            .chain(self.certificates.iter().map(Entry::id))
            .chain(self.achievements.iter().map(Entry::id));
        ids.max().unwrap_or(0)
    }

    /// Entry ids of one collection, in collection order.
    pub fn ids(&self, collection: Collection) -> Vec<EntryId> {
        fn collect<E: Entry>(list: &[E]) -> Vec<EntryId> {
            list.iter().map(Entry::id).collect()
        }
        match collection {
            Collection::Education => collect(&self.education),
            Collection::Experience => collect(&self.experience),
            Collection::Internships => collect(&self.internships),
            Collection::Projects => collect(&self.projects),
            Collection::Languages => collect(&self.languages),
            Collection::Certificates => collect(&self.certificates),
            Collection::Achievements => collect(&self.achievements),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collections and entries
// ────────────────────────────────────────────────────────────────────────────

/// The list-valued sections of a record that hold id-carrying entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Education,
    Experience,
    Internships,
    Projects,
    Languages,
    Certificates,
    Achievements,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Education => "education",
            Collection::Experience => "experience",
            Collection::Internships => "internships",
            Collection::Projects => "projects",
            Collection::Languages => "languages",
            Collection::Certificates => "certificates",
            Collection::Achievements => "achievements",
        }
    }
}

/// Common surface of every collection entry.
pub trait Entry {
    fn id(&self) -> EntryId;
    fn set_id(&mut self, id: EntryId);
    /// The identifying field; entries with a blank one are left out of exports.
    fn primary_field(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: EntryId,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

/// Shared by `experience` and `internships`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub id: EntryId,
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub id: EntryId,
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateEntry {
    pub id: EntryId,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementEntry {
    pub id: EntryId,
    pub title: String,
    pub description: String,
    pub date: String,
}

macro_rules! impl_entry {
    ($($entry:ident => $primary:ident),+ $(,)?) => {
        $(
            impl Entry for $entry {
                fn id(&self) -> EntryId {
                    self.id
                }

                fn set_id(&mut self, id: EntryId) {
                    self.id = id;
                }

                fn primary_field(&self) -> &str {
                    &self.$primary
                }
            }

            impl $entry {
                fn placeholder() -> Self {
                    Self { id: 1, ..Self::default() }
                }
            }
        )+
    };
}

impl_entry! {
    EducationEntry => institution,
    ExperienceEntry => company,
    ProjectEntry => title,
    LanguageEntry => language,
    CertificateEntry => name,
    AchievementEntry => title,
}

// ────────────────────────────────────────────────────────────────────────────
// Patches
// ────────────────────────────────────────────────────────────────────────────

entry_patch!(PersonalInfoPatch for PersonalInfo {
    first_name, last_name, email, phone, address, linkedin, summary,
});
entry_patch!(EducationPatch for EducationEntry {
    institution, degree, field, start_date, end_date, description,
});
entry_patch!(ExperiencePatch for ExperienceEntry {
    company, position, start_date, end_date, description,
});
entry_patch!(ProjectPatch for ProjectEntry {
    title, description, technologies, link, start_date, end_date,
});
entry_patch!(LanguagePatch for LanguageEntry { language, proficiency });
entry_patch!(CertificatePatch for CertificateEntry { name, issuer, date, link });
entry_patch!(AchievementPatch for AchievementEntry { title, description, date });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_has_one_placeholder_per_collection() {
        let record = ResumeRecord::scaffold();
        assert_eq!(record.education.len(), 1);
        assert_eq!(record.internships.len(), 1);
        assert_eq!(record.languages[0].id, 1);
        assert!(record.skills.is_empty());
        assert_eq!(record.max_entry_id(), 1);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut record = ResumeRecord::scaffold();
        record.personal_info.first_name = "Ada".into();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["personalInfo"]["firstName"], "Ada");
        assert!(json["education"][0].get("startDate").is_some());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record: ResumeRecord =
            serde_json::from_str(r#"{"education":[{"id":7,"institution":"MIT"}]}"#).unwrap();
        assert_eq!(record.education[0].id, 7);
        assert_eq!(record.education[0].degree, "");
        assert!(record.experience.is_empty());
    }

    #[test]
    fn test_patch_only_touches_some_fields() {
        let mut entry = ExperienceEntry {
            id: 3,
            company: "Acme".into(),
            position: "Engineer".into(),
            ..ExperienceEntry::default()
        };
        let patch = ExperiencePatch {
            position: Some("Staff Engineer".into()),
            ..ExperiencePatch::default()
        };
        patch.apply_to(&mut entry);
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.position, "Staff Engineer");
        assert_eq!(entry.id, 3);
    }
}
