//! Local resume insights: section detection and keyword frequency.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Header lines have at most this many words.
const MAX_HEADER_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
    Achievements,
    /// Text before the first recognised header.
    Other,
}

impl ResumeSection {
    /// Header cues, checked in this order; the first section with a cue
    /// contained in the line wins.
    const CUES: &'static [(ResumeSection, &'static [&'static str])] = &[
        (ResumeSection::Contact, &["contact", "personal", "address", "phone", "email"]),
        (ResumeSection::Summary, &["summary", "profile", "objective", "about"]),
        (
            ResumeSection::Experience,
            &["experience", "employment", "work", "career", "professional"],
        ),
        (
            ResumeSection::Education,
            &["education", "academic", "degree", "university", "college"],
        ),
        (
            ResumeSection::Skills,
            &["skills", "technical", "competencies", "abilities"],
        ),
        (
            ResumeSection::Certifications,
            &["certification", "license", "credentials"],
        ),
        (ResumeSection::Projects, &["project", "portfolio"]),
        (
            ResumeSection::Achievements,
            &["achievement", "award", "honor", "accomplishment"],
        ),
    ];

    /// Classifies a short line as a section header.
    pub fn from_header(line: &str) -> Option<Self> {
        if line.split_whitespace().count() > MAX_HEADER_WORDS {
            return None;
        }
        let lower = line.to_lowercase();
        Self::CUES
            .iter()
            .find(|(_, cues)| cues.iter().any(|cue| lower.contains(cue)))
            .map(|(section, _)| *section)
    }
}

/// Resume text grouped by detected section, plus how often each analysis
/// keyword appears in the resume.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumeProfile {
    pub sections: BTreeMap<ResumeSection, String>,
    pub keyword_frequency: BTreeMap<String, usize>,
}

impl ResumeProfile {
    pub fn build<'a>(resume_text: &str, keywords: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            sections: detect_sections(resume_text),
            keyword_frequency: keyword_frequency(resume_text, keywords),
        }
    }

    pub fn section_names(&self) -> Vec<ResumeSection> {
        self.sections.keys().copied().collect()
    }
}

/// Splits a resume into sections. Header lines start a section and are not
/// part of its content; blank lines are dropped; sections with no content
/// are omitted.
pub fn detect_sections(resume_text: &str) -> BTreeMap<ResumeSection, String> {
    let mut grouped: BTreeMap<ResumeSection, Vec<&str>> = BTreeMap::new();
    let mut current = ResumeSection::Other;

    for line in resume_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match ResumeSection::from_header(line) {
            Some(section) => current = section,
            None => grouped.entry(current).or_default().push(line),
        }
    }

    grouped
        .into_iter()
        .map(|(section, lines)| (section, lines.join("\n")))
        .collect()
}

/// Counts whole-word, case-insensitive occurrences of each keyword.
pub fn keyword_frequency<'a>(
    text: &str,
    keywords: impl IntoIterator<Item = &'a String>,
) -> BTreeMap<String, usize> {
    let haystack = text.to_lowercase();
    let unique: BTreeSet<String> = keywords
        .into_iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect();

    unique
        .into_iter()
        .map(|kw| {
            let count = count_whole_word(&haystack, &kw);
            (kw, count)
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Non-overlapping matches of `needle`. An edge of the needle that is a word
/// character must not touch another word character, so `rust` is not counted
/// inside "trusty" while `c++` still counts in "c++, go".
fn count_whole_word(haystack: &str, needle: &str) -> usize {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().next_back()) else {
        return 0;
    };
    haystack
        .match_indices(needle)
        .filter(|(at, _)| {
            let before = haystack[..*at].chars().next_back();
            let after = haystack[at + needle.len()..].chars().next();
            let starts = !is_word_char(first) || !before.is_some_and(is_word_char);
            let ends = !is_word_char(last) || !after.is_some_and(is_word_char);
            starts && ends
        })
        .count()
}
