// crates/nlu/src/mini.rs

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use talapker_core::{TalapkerError, TalapkerResult};

use crate::phrase_bank::{load_catalogue, PhraseBank};

const FALLBACK_LANG: &str = "ru";

/// Pre-written short answers per intent slug and language. Static for the
/// process lifetime; `ru` is the fallback when a slug has no entry for the
/// requested language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedAnswerTable {
    answers: HashMap<String, HashMap<String, String>>,
}

impl CannedAnswerTable {
    pub fn builtin() -> Self {
        let mut answers = HashMap::new();

        insert(
            &mut answers,
            "smalltalk",
            "Привет! Чем помочь по WKATU: поступление, программы, гранты, общага?",
            "Сәлем! WKATU бойынша не керек: қабылдау, бағдарламалар, гранттар, жатақхана?",
        );
        insert(
            &mut answers,
            "programs",
            "Программы WKATU: агро, ветеринария, инж-тех, IT и др. Нужен список/профили?",
            "WKATU бағдарламалары: агро, ветеринария, инж-тех, IT және т.б. Тізімі керек пе?",
        );
        insert(
            &mut answers,
            "documents",
            "Документы: ID/паспорт, аттестат, ЕНТ, фото 3×4, мед-075У, заявление и др.",
            "Құжаттар: Жеке куәлік, аттестат, ҰБТ, 3×4 фото, 075-У, өтініш және т.б.",
        );
        insert(
            &mut answers,
            "grants",
            "Гранты: по ЕНТ и квотам, сроки и проходные — в приёмке. Подсказать по баллам?",
            "Гранттар: ҰБТ және квоталар бойынша, мерзім/өту балдары — қабылдауда.",
        );
        insert(
            &mut answers,
            "admissions",
            "Приёмка: контакты, сроки подачи и стоимость — могу подсказать детали.",
            "Қабылдау: байланыс, өтініс мерзімдері, оқу ақысы — мәлімет беремін.",
        );
        insert(
            &mut answers,
            "why-wkatu",
            "Почему WKATU: практика, сильные агро/инж направления, стипендии, общежитие.",
            "Неге WKATU: тәжірибе, мықты агро/инж бағыттар, стипендия, жатақхана.",
        );
        insert(
            &mut answers,
            "campus",
            "Кампус: клубы, спорт, мероприятия, волонтёрство. Что интересует?",
            "Кампус: клубтар, спорт, іс-шаралар, волонтёрлік. Не қызықты?",
        );
        insert(
            &mut answers,
            "dorm",
            "Общежитие: приоритет иногородним/льготникам, распределение по очереди. \
             Очередь по заявкам приёмки: статус можно уточнить в деканате/общежитии по номеру заявки.",
            "Жатақхана: басымдық қаладан тыс/жеңілдік санаттарына, кезекпен беріледі. \
             Кезек қабылдау өтініштері бойынша: мәртебені өтініш нөмірі арқылы нақтылаңыз.",
        );

        Self { answers }
    }

    /// Loads an answer-table override from a YAML or JSON file, chosen by
    /// extension.
    pub fn from_file(path: &Path) -> TalapkerResult<Self> {
        let table: Self = load_catalogue(path)?;
        if table.answers.is_empty() {
            return Err(TalapkerError::Nlu(
                "Canned-answer table must not be empty".to_string(),
            ));
        }
        Ok(table)
    }

    /// Answer for `(slug, lang)`, falling back to `ru`; `None` when the slug
    /// has no entry at all.
    pub fn lookup(&self, slug: &str, lang: &str) -> Option<&str> {
        let by_lang = self.answers.get(slug)?;
        by_lang
            .get(lang)
            .or_else(|| by_lang.get(FALLBACK_LANG))
            .map(String::as_str)
    }

    /// Every slug the selector can answer for must appear in the phrase
    /// bank, otherwise the canned answer is unreachable.
    pub fn validate_against(&self, bank: &PhraseBank) -> TalapkerResult<()> {
        for slug in self.answers.keys() {
            if !bank.contains_slug(slug) {
                return Err(TalapkerError::Nlu(format!(
                    "Canned answer for '{}' has no phrase-bank entry",
                    slug
                )));
            }
        }
        Ok(())
    }
}

fn insert(
    answers: &mut HashMap<String, HashMap<String, String>>,
    slug: &str,
    ru: &str,
    kz: &str,
) {
    let mut by_lang = HashMap::new();
    by_lang.insert("ru".to_string(), ru.to_string());
    by_lang.insert("kz".to_string(), kz.to_string());
    answers.insert(slug.to_string(), by_lang);
}
