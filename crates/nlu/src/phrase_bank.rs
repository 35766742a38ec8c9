// crates/nlu/src/phrase_bank.rs

use std::path::Path;

use serde::{Deserialize, Serialize};
use talapker_core::{TalapkerError, TalapkerResult};

/// One catalogue group: an intent slug with its example phrases. Slugs may
/// repeat across groups; the flat entry list keeps every occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseGroup {
    pub slug: String,
    pub phrases: Vec<String>,
}

/// Ordered catalogue of example phrases labeled with intent slugs, used as
/// reference points for similarity matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseBank {
    pub groups: Vec<PhraseGroup>,
}

/// A single (slug, phrase) pair in flat catalogue order.
#[derive(Debug, Clone)]
pub struct PhraseEntry {
    pub slug: String,
    pub phrase: String,
}

impl PhraseBank {
    /// The built-in WKATU admissions catalogue.
    ///
    /// The `dorm` group appears twice on purpose: the second group extends
    /// the first with queue-related phrasings, and both stay in the index so
    /// the decision boundary is unchanged.
    pub fn builtin() -> Self {
        let groups = vec![
            group(
                "smalltalk",
                &[
                    "привет",
                    "хай",
                    "здорово",
                    "как ты",
                    "как дела",
                    "ты тут",
                    "салам",
                    "салем",
                    "ассалаумағалейкум",
                    "hi",
                    "hello",
                ],
            ),
            group(
                "programs",
                &[
                    "образовательные программы",
                    "список программ",
                    "какие направления есть",
                    "білім беру бағдарламалары",
                    "бағдарламалар тізімі",
                    "қандай мамандықтар бар",
                ],
            ),
            group(
                "documents",
                &[
                    "документы для поступления",
                    "какие документы нужны",
                    "перечень документов",
                    "құжаттар",
                    "қандай құжаттар керек",
                    "құжаттар тізімі",
                ],
            ),
            group(
                "grants",
                &[
                    "гранты",
                    "стипендии",
                    "как получить грант",
                    "проходные баллы",
                    "гранттар",
                    "стипендия",
                    "грантқа қалай түсемін",
                    "өту балы",
                ],
            ),
            group(
                "dorm",
                &[
                    "общежитие",
                    "проживание",
                    "места в общаге",
                    "комнаты",
                    "жатақхана",
                    "тұру",
                    "орын беру",
                    "жатын орын",
                ],
            ),
            group(
                "admissions",
                &[
                    "приёмная комиссия",
                    "контакты приёмной",
                    "сроки приёма",
                    "стоимость обучения",
                    "қабылдау комиссиясы",
                    "байланыс",
                    "қабылдау мерзімдері",
                    "оқу ақысы",
                ],
            ),
            group(
                "why-wkatu",
                &[
                    "почему wkatu",
                    "зачем wkatu",
                    "почему именно wkatu",
                    "какие преимущества wkatu",
                    "преимущества университета",
                    "плюсы университета",
                    "почему выбрать wkatu",
                    "неге wkatu",
                    "неге дәл wkatu",
                    "артықшылықтары wkatu",
                    "жақсы жақтары wkatu",
                ],
            ),
            group(
                "campus",
                &[
                    "какие развлечения",
                    "чем заняться в wkatu",
                    "студенческая жизнь",
                    "кружки и клубы",
                    "мероприятия",
                    "досуг",
                    "студклуб",
                    "спортзал",
                    "спорт секции",
                    "студенттік өмір",
                    "үйірмелер",
                    "іс-шаралар",
                    "демалыс",
                    "спорт секциялар",
                ],
            ),
            group(
                "dorm",
                &[
                    "общежитие",
                    "проживание",
                    "места в общаге",
                    "комнаты",
                    "жатақхана",
                    "тұру",
                    "орын беру",
                    "жатын орын",
                    "очередь в общежитие",
                    "какая очередь",
                    "очередность",
                    "лист ожидания",
                    "мест нет",
                ],
            ),
        ];

        Self { groups }
    }

    /// Loads a catalogue override from a YAML or JSON file, chosen by
    /// extension.
    pub fn from_file(path: &Path) -> TalapkerResult<Self> {
        let bank: Self = load_catalogue(path)?;
        bank.check()?;
        Ok(bank)
    }

    fn check(&self) -> TalapkerResult<()> {
        if self.groups.is_empty() {
            return Err(TalapkerError::Nlu(
                "Phrase bank must contain at least one group".to_string(),
            ));
        }
        for group in &self.groups {
            if group.slug.trim().is_empty() {
                return Err(TalapkerError::Nlu(
                    "Phrase bank group with empty slug".to_string(),
                ));
            }
            if group.phrases.iter().all(|p| p.trim().is_empty()) {
                return Err(TalapkerError::Nlu(format!(
                    "Phrase bank group '{}' has no usable phrases",
                    group.slug
                )));
            }
        }
        Ok(())
    }

    /// Flattens the catalogue into (slug, phrase) pairs, preserving group
    /// and in-group order. This order is the tie-break: the first maximum
    /// similarity wins.
    pub fn entries(&self) -> Vec<PhraseEntry> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.phrases.iter().map(|phrase| PhraseEntry {
                    slug: group.slug.clone(),
                    phrase: phrase.clone(),
                })
            })
            .collect()
    }

    /// True if any group carries the given slug.
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.groups.iter().any(|group| group.slug == slug)
    }
}

pub(crate) fn load_catalogue<T: serde::de::DeserializeOwned>(path: &Path) -> TalapkerResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| TalapkerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    if ext.eq_ignore_ascii_case("json") {
        serde_json::from_str(&contents)
            .map_err(|e| TalapkerError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| TalapkerError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

fn group(slug: &str, phrases: &[&str]) -> PhraseGroup {
    PhraseGroup {
        slug: slug.to_string(),
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
    }
}
