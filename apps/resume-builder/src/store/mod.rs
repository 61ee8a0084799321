//! Resume Record Store — the single owner of the record.
//!
//! Mutations are expressed as [`Action`] values and applied by the pure
//! [`reduce`] function. The only impure step, id generation, happens in
//! [`Store::dispatch`] before the transition runs, through an injected
//! [`IdGenerator`].

pub mod ids;

use tracing::debug;

use crate::models::{
    AchievementEntry, AchievementPatch, CertificateEntry, CertificatePatch, Collection,
    EducationEntry, EducationPatch, Entry, EntryId, ExperienceEntry, ExperiencePatch,
    LanguageEntry, LanguagePatch, PersonalInfoPatch, ProjectEntry, ProjectPatch, ResumeRecord,
};

pub use ids::{IdGenerator, MonotonicIds};

// ────────────────────────────────────────────────────────────────────────────
// Actions
// ────────────────────────────────────────────────────────────────────────────

/// A new entry; the variant names the collection it is appended to.
/// Any id it carries is replaced by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum NewEntry {
    Education(EducationEntry),
    Experience(ExperienceEntry),
    Internship(ExperienceEntry),
    Project(ProjectEntry),
    Language(LanguageEntry),
    Certificate(CertificateEntry),
    Achievement(AchievementEntry),
}

impl NewEntry {
    pub fn collection(&self) -> Collection {
        match self {
            NewEntry::Education(_) => Collection::Education,
            NewEntry::Experience(_) => Collection::Experience,
            NewEntry::Internship(_) => Collection::Internships,
            NewEntry::Project(_) => Collection::Projects,
            NewEntry::Language(_) => Collection::Languages,
            NewEntry::Certificate(_) => Collection::Certificates,
            NewEntry::Achievement(_) => Collection::Achievements,
        }
    }

    fn with_id(mut self, id: EntryId) -> Self {
        match &mut self {
            NewEntry::Education(e) => e.set_id(id),
            NewEntry::Experience(e) | NewEntry::Internship(e) => e.set_id(id),
            NewEntry::Project(e) => e.set_id(id),
            NewEntry::Language(e) => e.set_id(id),
            NewEntry::Certificate(e) => e.set_id(id),
            NewEntry::Achievement(e) => e.set_id(id),
        }
        self
    }
}

/// A shallow-merge patch addressed to one entry of one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryUpdate {
    Education(EntryId, EducationPatch),
    Experience(EntryId, ExperiencePatch),
    Internship(EntryId, ExperiencePatch),
    Project(EntryId, ProjectPatch),
    Language(EntryId, LanguagePatch),
    Certificate(EntryId, CertificatePatch),
    Achievement(EntryId, AchievementPatch),
}

/// Every state transition the store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UpdatePersonalInfo(PersonalInfoPatch),
    AddEntry(NewEntry),
    UpdateEntry(EntryUpdate),
    RemoveEntry { collection: Collection, id: EntryId },
    ReplaceSkills(Vec<String>),
    ReplaceLanguages(Vec<LanguageEntry>),
    AddSkill(String),
    RemoveSkill(String),
    LoadRecord(Box<ResumeRecord>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdatePersonalInfo(_) => "update_personal_info",
            Action::AddEntry(_) => "add_entry",
            Action::UpdateEntry(_) => "update_entry",
            Action::RemoveEntry { .. } => "remove_entry",
            Action::ReplaceSkills(_) => "replace_skills",
            Action::ReplaceLanguages(_) => "replace_languages",
            Action::AddSkill(_) => "add_skill",
            Action::RemoveSkill(_) => "remove_skill",
            Action::LoadRecord(_) => "load_record",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transition function
// ────────────────────────────────────────────────────────────────────────────

/// Applies one action to a record. Pure and infallible: malformed input is
/// stored as-is.
pub fn reduce(mut record: ResumeRecord, action: Action) -> ResumeRecord {
    match action {
        Action::UpdatePersonalInfo(patch) => patch.apply_to(&mut record.personal_info),

        Action::AddEntry(entry) => match entry {
            NewEntry::Education(e) => record.education.push(e),
            NewEntry::Experience(e) => record.experience.push(e),
            NewEntry::Internship(e) => record.internships.push(e),
            NewEntry::Project(e) => record.projects.push(e),
            NewEntry::Language(e) => record.languages.push(e),
            NewEntry::Certificate(e) => record.certificates.push(e),
            NewEntry::Achievement(e) => record.achievements.push(e),
        },

        Action::UpdateEntry(update) => match update {
            EntryUpdate::Education(id, p) => patch_entry(&mut record.education, id, |e| p.apply_to(e)),
            EntryUpdate::Experience(id, p) => patch_entry(&mut record.experience, id, |e| p.apply_to(e)),
            EntryUpdate::Internship(id, p) => patch_entry(&mut record.internships, id, |e| p.apply_to(e)),
            EntryUpdate::Project(id, p) => patch_entry(&mut record.projects, id, |e| p.apply_to(e)),
            EntryUpdate::Language(id, p) => patch_entry(&mut record.languages, id, |e| p.apply_to(e)),
            EntryUpdate::Certificate(id, p) => patch_entry(&mut record.certificates, id, |e| p.apply_to(e)),
            EntryUpdate::Achievement(id, p) => patch_entry(&mut record.achievements, id, |e| p.apply_to(e)),
        },

        Action::RemoveEntry { collection, id } => match collection {
            Collection::Education => remove_entry(&mut record.education, id),
            Collection::Experience => remove_entry(&mut record.experience, id),
            Collection::Internships => remove_entry(&mut record.internships, id),
            Collection::Projects => remove_entry(&mut record.projects, id),
            Collection::Languages => remove_entry(&mut record.languages, id),
            Collection::Certificates => remove_entry(&mut record.certificates, id),
            Collection::Achievements => remove_entry(&mut record.achievements, id),
        },

        Action::ReplaceSkills(skills) => record.skills = skills,
        Action::ReplaceLanguages(languages) => record.languages = languages,

        Action::AddSkill(skill) => {
            let skill = skill.trim();
            if !skill.is_empty() && !record.skills.iter().any(|s| s.trim() == skill) {
                record.skills.push(skill.to_string());
            }
        }
        Action::RemoveSkill(skill) => record.skills.retain(|s| *s != skill),

        Action::LoadRecord(next) => return *next,
    }
    record
}

fn patch_entry<E: Entry>(list: &mut [E], id: EntryId, apply: impl FnOnce(&mut E)) {
    if let Some(entry) = list.iter_mut().find(|e| e.id() == id) {
        apply(entry);
    }
}

/// Removes every entry with `id`, unless that would leave the collection
/// empty. Imported records may repeat an id.
fn remove_entry<E: Entry>(list: &mut Vec<E>, id: EntryId) {
    if list.iter().all(|e| e.id() == id) {
        return;
    }
    list.retain(|e| e.id() != id);
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// Owns the current record and the id generator.
pub struct Store {
    record: ResumeRecord,
    ids: Box<dyn IdGenerator>,
}

impl Store {
    pub fn new(record: ResumeRecord, mut ids: Box<dyn IdGenerator>) -> Self {
        ids.observe(&record);
        Self { record, ids }
    }

    pub fn with_monotonic_ids(record: ResumeRecord) -> Self {
        Self::new(record, Box::new(MonotonicIds::default()))
    }

    pub fn record(&self) -> &ResumeRecord {
        &self.record
    }

    /// Applies an action and returns whether the record changed.
    /// `AddEntry` payloads receive a fresh id first.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let action = match action {
            Action::AddEntry(entry) => Action::AddEntry(entry.with_id(self.ids.next_id())),
            other => other,
        };
        self.apply(action)
    }

    /// Appends an entry and returns the id it was given.
    pub fn add_entry(&mut self, entry: NewEntry) -> EntryId {
        let id = self.ids.next_id();
        self.apply(Action::AddEntry(entry.with_id(id)));
        id
    }

    fn apply(&mut self, action: Action) -> bool {
        let name = action.name();
        let reseed = matches!(action, Action::LoadRecord(_) | Action::ReplaceLanguages(_));

        let next = reduce(self.record.clone(), action);
        let changed = next != self.record;
        self.record = next;

        if reseed {
            self.ids.observe(&self.record);
        }
        debug!(action = name, changed, "Store action applied");
        changed
    }
}
