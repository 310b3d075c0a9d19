/// Chrome strings for the gallery in English and Arabic

use serde::{Deserialize, Serialize};

use crate::state::data::CollectionId;

/// Display language for the gallery chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// The other language (the shell only offers two)
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

/// Every string the gallery chrome draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeLabels {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub exit: &'static str,
    pub tap_hint: &'static str,
    pub loading: &'static str,
    pub flip_hint: &'static str,
    power: &'static str,
    voyage: &'static str,
    essence: &'static str,
}

impl ChromeLabels {
    pub fn category(&self, id: CollectionId) -> &'static str {
        match id {
            CollectionId::Power => self.power,
            CollectionId::Voyage => self.voyage,
            CollectionId::Essence => self.essence,
        }
    }
}

const ENGLISH: ChromeLabels = ChromeLabels {
    title: "THE VAULT",
    subtitle: "Enter the architectural realms of visual sovereignty.",
    exit: "Return to Void",
    tap_hint: "Tap to Audit",
    loading: "Preloading",
    flip_hint: "Tap / F: dossier  ·  R: reset zoom  ·  Esc: close",
    power: "Power",
    voyage: "Voyage",
    essence: "Essence",
};

const ARABIC: ChromeLabels = ChromeLabels {
    title: "الخزنة",
    subtitle: "ادخل إلى عوالم السيادة البصرية.",
    exit: "العودة للفراغ",
    tap_hint: "اضغط للتدقيق",
    loading: "جارٍ التحميل",
    flip_hint: "نقرة / F: الملف  ·  R: إعادة التكبير  ·  Esc: إغلاق",
    power: "القوة",
    voyage: "الرحلة",
    essence: "الأصالة",
};

/// Look up the chrome strings for a language
pub fn labels(language: Language) -> &'static ChromeLabels {
    match language {
        Language::En => &ENGLISH,
        Language::Ar => &ARABIC,
    }
}
