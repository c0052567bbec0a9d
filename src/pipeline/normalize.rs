//! Text normalisation for subject cells.
//!
//! Two independent passes:
//!
//! 1. [`clean`] strips everything that is not the subject name itself:
//!    meeting-tool phrases, parity-week notes, lecturer names with initials,
//!    academic-role prefixes, room/hour numbers, commas and run-on spaces.
//! 2. [`shorten_text`] maps a cleaned name onto its short canonical form by
//!    fuzzy matching against [`SUBJECT_SYNONYMS`].
//!
//! ## Rule Order
//!
//! Parity notes go first because removing them also turns the dashes around
//! them into spaces, which the whitespace rule then collapses. Names must be
//! removed before role prefixes, otherwise `доц.` next to a surname would
//! leave the initials dangling. The whole rule list is re-applied until the
//! text stops changing, so `clean(clean(x)) == clean(x)` always holds.

use once_cell::sync::Lazy;
use regex::Regex;
use strsim::normalized_levenshtein;

/// Minimum rounded similarity (exclusive) for a fuzzy match to count.
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Known long subject names and the short form rendered in the image.
pub const SUBJECT_SYNONYMS: &[(&str, &str)] = &[
    ("Веб-орієнтована розробка програмного забезпечення", "Веб-орієнтована розробка"),
    ("Іноземна мова (за спрямуванням)", "Іноземна мова"),
    ("Іноземна мова (за фаховим спрямуванням)", "Іноземна мова"),
    ("Іноземна мова (за професійним спрямуванням)", "Іноземна мова"),
    ("Конструювання програмного забезпечення", "Конструювання ПЗ"),
    ("Основи програмування та алгоритмічні мови", "Основи програмування та алг."),
    (
        "Інноваційне підприємництво та управління стартап проєктами (з гр.ФНМПІ-91)",
        "Підприємництво та стартапи",
    ),
    (
        "Архітектура та проектування програмного забезпечення",
        "Архітектура та проектування ПЗ",
    ),
    ("Бухгалтерський облік і звітність у ком.банках", "Бух. облік і звітність"),
    (
        "Математика (Алгебра і початки аналізу та геометрія)",
        "Математика (алгебра та геометрія)",
    ),
    ("Математика (алгебра та геометрія)", "Математика (алгебра та геометрія)"),
    (
        "Загальна теорія здоров'я діагностика і моніторинг стану здоров'я",
        "Теорія здоров'я",
    ),
    (
        "Фізична терапія при захворюваннях та порушеннях опорно-рухового апарату",
        "Фіз. терапія опорно-рухового апарату",
    ),
    ("Моделювання та аналіз програмного забезпечення", "Моделювання та аналіз ПЗ"),
    ("Якість програмного забезпечення та тестування", "Якість ПЗ та тестування"),
    ("Інформаційно-комунікаційні технології в менеджменті", "Комунікаційні технології"),
    ("Долікарська медична допомога у невідкладних станах", "Долікарська медична допомога"),
    ("Безпека інформаційних систем/Безпека програм та даних", "Безпека програм та БД"),
    ("Рекреаційна рухова активність та оздоровчий фітнес", "Оздоровчий фітнес"),
    ("Теорія оздоровчого харчування дієтотерапія", "Оздорове харчування"),
    ("Історія економіки та економічної думки (з гр.МТ-11)", "Історія економіки"),
];

const MEETING_PHRASES: &[&str] = &[
    "Google meet",
    "Google Meet",
    "Google class",
    // Cyrillic "с" typed by mistake
    "Google сlass",
];

static RE_PARITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"непарний тиждень|непарний тижд.|парний тиждень|парний тижд.").unwrap()
});

static RE_LECTURER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[А-ЩЬЮЯҐЄІЇ][а-щьюяґєії'’]+\.*?,?\s?[А-ЩЬЮЯҐЄІЇа]+\.[А-ЩЬЮЯҐЄІЇ]+\.?").unwrap()
});

static RE_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"ст\.+ ?викл\.+|ст\.+вик\.+|пр\.+,?|доц\.+,?|викл\.+|проф\.+|доц |ст\.+| л\.+| л,|викл |лр.",
    )
    .unwrap()
});

static RE_NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+/\d+|\d+\.\d+").unwrap());

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

/// One pass of every cleaning rule.
fn clean_once(input: &str) -> String {
    let mut s = input.to_string();
    for phrase in MEETING_PHRASES {
        s = s.replace(phrase, "");
    }

    if RE_PARITY.is_match(&s) {
        s = RE_PARITY.replace_all(&s, "").into_owned();
        s = s.replace(['-', '–'], " ");
    }

    s = RE_LECTURER.replace_all(&s, "").into_owned();
    s = RE_ROLE.replace_all(&s, "").into_owned();
    s = RE_NUMBERS.replace_all(&s, "").into_owned();
    s = s.replace(',', "");
    s = RE_SPACES.replace_all(&s, " ").into_owned();
    s.trim().to_string()
}

/// Strip noise from a raw subject paragraph. Idempotent.
///
/// Every rule only removes text (or swaps a dash for a space while removing a
/// parity note), so each pass that changes the string makes it shorter and
/// the loop terminates.
pub fn clean(input: &str) -> String {
    let mut current = clean_once(input);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalised edit-distance similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// True when a similarity ratio, rounded to two decimals, clears the threshold.
pub fn passes_threshold(ratio: f64) -> bool {
    round2(ratio) > SIMILARITY_THRESHOLD
}

/// Canonicalise against an arbitrary synonym table.
///
/// Candidates are ranked by similarity, ties keeping table order, and only the
/// best one is considered.
pub fn shorten_with(subject: &str, synonyms: &[(&str, &str)]) -> String {
    let mut best: Option<(f64, &str)> = None;
    for (long, short) in synonyms {
        let ratio = similarity(long, subject);
        if best.is_none_or(|(top, _)| ratio > top) {
            best = Some((ratio, short));
        }
    }

    match best {
        Some((ratio, short)) if passes_threshold(ratio) => short.to_string(),
        _ => subject.to_string(),
    }
}

/// Canonicalise a cleaned subject name against [`SUBJECT_SYNONYMS`].
pub fn shorten_text(subject: &str) -> String {
    shorten_with(subject, SUBJECT_SYNONYMS)
}

/// Clean and canonicalise a raw subject paragraph.
///
/// `None` when nothing subject-like is left: empty text, or text that does
/// not start with a letter (decorative dashes, stray numbers).
pub fn normalize_subject(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    match cleaned.chars().next() {
        Some(first) if first.is_alphabetic() => Some(shorten_text(&cleaned)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_meeting_phrases() {
        assert_eq!(clean("Фізика Google Meet"), "Фізика");
        assert_eq!(clean("Google class Хімія"), "Хімія");
        assert_eq!(clean("Google сlass Хімія"), "Хімія");
    }

    #[test]
    fn removes_parity_notes_and_dashes() {
        assert_eq!(clean("Фізика – парний тиждень"), "Фізика");
        assert_eq!(clean("непарний тиждень - Хімія"), "Хімія");
    }

    #[test]
    fn dashes_survive_without_parity_note() {
        assert_eq!(clean("Веб-орієнтована розробка"), "Веб-орієнтована розробка");
    }

    #[test]
    fn removes_lecturer_names_and_roles() {
        assert_eq!(clean("Фізика л. доц. Петренко О.В."), "Фізика");
        assert_eq!(clean("Хімія пр. ст.викл. Іваненко І.І."), "Хімія");
        assert_eq!(clean("Історія проф.Коваль А.Б."), "Історія");
    }

    #[test]
    fn removes_numbers_commas_and_spaces() {
        assert_eq!(clean("  Фізика,   ауд. 2/14  12.30 "), "Фізика ауд.");
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            "Фізика л. доц. Петренко О.В.",
            "Хімія – непарний тиждень ст.викл. Іваненко І.І., Google Meet",
            "  ,,, 12.30  ",
            "ст.ст.викл. Мова",
            "Математика (алгебра та геометрія) пр. 3/12",
            "Програмування лр. Сидоренко С.С. доц ",
            "",
        ];
        for s in samples {
            let once = clean(s);
            assert_eq!(clean(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn exact_key_maps_to_short_form() {
        assert_eq!(
            shorten_text("Конструювання програмного забезпечення"),
            "Конструювання ПЗ"
        );
        assert_eq!(
            shorten_text("Іноземна мова (за фаховим спрямуванням)"),
            "Іноземна мова"
        );
    }

    #[test]
    fn near_miss_maps_to_short_form() {
        assert_eq!(
            shorten_text("Конструювання програмного забезпеченя"),
            "Конструювання ПЗ"
        );
    }

    #[test]
    fn unknown_subject_is_unchanged() {
        assert_eq!(shorten_text("Фізика"), "Фізика");
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!passes_threshold(0.75));
        assert!(!passes_threshold(0.7549));
        assert!(passes_threshold(0.76));
        assert!(passes_threshold(0.7551));
    }

    #[test]
    fn ratio_of_exactly_075_does_not_match() {
        // 5 substitutions over 20 chars -> 0.75
        let table = [("abcdefghijklmnopqrst", "SHORT")];
        let input = "XXXXXfghijklmnopqrst";
        assert_eq!(similarity(table[0].0, input), 0.75);
        assert_eq!(shorten_with(input, &table), input);
    }

    #[test]
    fn ratio_of_076_matches() {
        // 6 substitutions over 25 chars -> 0.76
        let table = [("abcdefghijklmnopqrstuvwxy", "SHORT")];
        let input = "XXXXXXghijklmnopqrstuvwxy";
        assert!((similarity(table[0].0, input) - 0.76).abs() < 1e-9);
        assert_eq!(shorten_with(input, &table), "SHORT");
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        let table = [("abcd", "FIRST"), ("abcd", "SECOND")];
        assert_eq!(shorten_with("abcd", &table), "FIRST");
    }

    #[test]
    fn normalize_drops_non_subjects() {
        assert_eq!(normalize_subject("  "), None);
        assert_eq!(normalize_subject("12.30"), None);
        assert_eq!(normalize_subject("- -"), None);
        assert_eq!(normalize_subject("Петренко О.В."), None);
        assert_eq!(
            normalize_subject("Конструювання програмного забезпечення л. доц. Петренко О.В."),
            Some("Конструювання ПЗ".to_string())
        );
    }
}
