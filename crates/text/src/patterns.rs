//! Compiled regex tables and closed lexicon sets
//!
//! All patterns operate on lines already passed through
//! [`crate::normalize::normalize_line`]: diacritics and invisible marks are
//! gone, colon variants are `:`, whitespace is collapsed. Arabic letters are
//! matched with the explicit range `ء-ي`; Arabic-Indic digits with `٠-٩`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `مشهد`/`scene` followed by Arabic or Latin digits, anywhere in the line.
pub static SCENE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:مشهد|scene)\s*[0-9٠-٩]+").unwrap());

/// Same, but the whole line.
pub static SCENE_NUMBER_EXACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:مشهد|scene)\s*[0-9٠-٩]+$").unwrap());

/// Time-of-day segment of a tier-2 header.
pub static SCENE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"نهار|ليل|صباح|مساء|فجر").unwrap());

/// Interior/exterior segment, including hyphen/slash combined forms.
pub static SCENE_LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:داخلي|خارجي)(?:\s*[-/\\]\s*(?:داخلي|خارجي))?").unwrap());

/// A whole line that is a cut or transition cue.
pub static TRANSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:قطع|انتقال|cut\s+to)(?:\s+(?:إلى|الى))?\s*:?$").unwrap()
});

/// A line entirely wrapped in parentheses (Latin or full-width).
pub static PARENTHETICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(（][^()（）]*[)）]$").unwrap());

/// Short performance cues that annotate delivery, e.g. `مبتسماً`, `بغضب`.
pub static ACTION_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:مبتسما|مبتسماً|باسما|باسماً|ضاحكا|ضاحكاً|ساخرا|ساخراً|غاضبا|غاضباً|باكيا|باكياً|هامسا|هامساً|صارخا|صارخاً|متعجبا|متعجباً|مندهشا|مندهشاً|محتدا|محتداً|مقاطعا|مقاطعاً|مترددا|متردداً|بغضب|بحزن|بفرح|بدهشة|بسخرية|بهدوء|بحدة|بخوف|بتوتر|بصوت عال|بصوت خافت|لنفسه|لنفسها)$",
    )
    .unwrap()
});

/// `<name> : <dialogue>` on one line.
pub static INLINE_DIALOGUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ء-ي][ء-ي0-9٠-٩ ]{0,30})\s*:\s*(.+)$").unwrap());

/// Glued variant: a parenthesized cue directly against the speaker name.
pub static INLINE_DIALOGUE_GLUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[(（]([^()（）]{1,30})[)）]\s*([ء-ي][ء-ي0-9٠-٩ ]{0,30})\s*:\s*(.+)$").unwrap()
});

/// Strict speaker-cue line: Arabic letters, digits and spaces, then a colon.
pub static CHARACTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ء-ي][ء-ي0-9٠-٩ ]{0,31}:$").unwrap());

/// Arabic letters and digits only (spaces allowed).
pub static ARABIC_ONLY_WITH_NUMBERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ء-ي0-9٠-٩ ]+$").unwrap());

/// The vocative particle `يا` followed by a name.
pub static VOCATIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )يا +[ء-ي]+").unwrap());

/// Address titles, with or without the vocative particle.
pub static VOCATIVE_TITLES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^| )(?:يا +)?(?:أستاذ|استاذ|دكتور|دكتورة|حاج|حاجة|باشا|بيه|أفندي|افندي|عمو|خالة|أبلة|ابلة|آنسة|انسة|مدام|سيدي|سيدتي|كابتن|معلم|ريس)(?: |$)",
    )
    .unwrap()
});

/// Colloquial discourse markers common in spoken lines.
pub static CONVERSATIONAL_MARKERS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^| )(?:والله|يعني|بقى|خلاص|طيب|معلش|ياريت|يا ريت|ماشي|يلا|عشان|علشان)(?: |$)")
        .unwrap()
});

/// Any quotation mark form.
pub static QUOTE_MARKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\"«»„“”‟'’]").unwrap());

/// Detached pronoun followed by an imperfect verb, with optional `و`/`ثم`.
pub static PRONOUN_ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:ثم +)?و?(?:هو|هي|هما|هم|هن) +[يت][ء-ي]{2,}").unwrap());

/// `ثم` followed by a verb: narrative sequencing.
pub static THEN_ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ثم +و?[ينت][ء-ي]{2,}").unwrap());

/// A line led by a detached pronoun.
pub static PRONOUN_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^و?(?:هو|هي|هما|هم|هن)(?: |$)").unwrap());

/// Pronoun + imperfect verb anywhere in the line.
pub static PRONOUN_PLUS_VERB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )(?:هو|هي|هما|هم|هن) +[يت][ء-ي]{2,}").unwrap());

/// Negation particle + verb.
pub static NEGATION_PLUS_VERB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )(?:لا|لم|لن|ما) +[يتأن][ء-ي]{2,}").unwrap());

/// Imperfect verb carrying an attached object pronoun, e.g. `يمسكها`.
pub static VERB_WITH_PRONOUN_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^| )[يت][ء-ي]{2,}(?:ها|هما|هم|هن|كما|كم|نا|ني)(?: |$)").unwrap()
});

/// Verbal-noun openings that start stage directions.
pub static MASDAR_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:ال)?(?:دخول|خروج|وصول|رحيل|عودة|ظهور|اختفاء|صعود|نزول|اقتراب|ابتعاد)(?: |$)")
        .unwrap()
});

/// The narrative triple `verb name verb`, e.g. `يرفع محمود يده`.
pub static ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[يت][ء-ي]{2,} +[ء-ي]{2,} +و?[يت][ء-ي]{2,}").unwrap());

/// Off-screen audio narration: sound and music descriptions.
pub static AUDIO_NARRATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:صوت|أصوات|اصوات|نسمع|يسمع|تسمع|موسيقى|أغنية|اغنية)(?: |$)").unwrap()
});

/// Known sub-location openings for a tier-3 header.
pub static SCENE3_PLACE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:شقة|منزل|بيت|فيلا|مكتب|العتبة|كوافير|كوايفير|شارع|مستشفى|غرفة|صالة|مطبخ|حديقة|سطح|محل|مقهى|قهوة|مدرسة|جامعة|مسجد|كنيسة|سيارة|عيادة|استوديو|ستوديو)(?: |$)",
    )
    .unwrap()
});

/// Two or three short location segments joined by a dash or slash.
pub static MULTI_LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ء-ي0-9٠-٩ ]{2,20}(?: *[-–/] *[ء-ي0-9٠-٩ ]{2,20}){1,2}$").unwrap()
});

/// `من <place> إلى <place>` range form of a tier-3 header.
pub static SCENE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^من +[ء-ي0-9٠-٩ ]+ +(?:إلى|الى) +[ء-ي0-9٠-٩ ]+$").unwrap());

/// Recognized status words for scene-header spacing repair (`مشهد N <status>`).
pub static SCENE_STATUS_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["نهار", "ليل", "صباح", "مساء", "فجر", "داخلي", "خارجي"]
        .into_iter()
        .collect()
});

/// Imperfect narrative verbs that open stage directions.
pub static FULL_ACTION_VERB_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "يدخل", "تدخل", "يخرج", "تخرج", "يجلس", "تجلس", "يقف", "تقف", "ينظر", "تنظر", "يرفع",
        "ترفع", "يضع", "تضع", "يمشي", "تمشي", "يجري", "تجري", "يفتح", "تفتح", "يغلق", "تغلق",
        "يبتسم", "تبتسم", "يضحك", "تضحك", "يبكي", "تبكي", "يصرخ", "تصرخ", "يلتفت", "تلتفت",
        "يقترب", "تقترب", "يبتعد", "تبتعد", "يمسك", "تمسك", "يحمل", "تحمل", "ينهض", "تنهض",
        "يستدير", "تستدير", "يتجه", "تتجه", "يسير", "تسير", "يركب", "تركب", "ينزل", "تنزل",
        "يصعد", "تصعد", "يلقي", "تلقي", "يشير", "تشير", "يهز", "تهز", "يومئ", "تومئ", "يتأمل",
        "تتأمل", "يراقب", "تراقب", "يستلقي", "تستلقي", "يقطع", "تقطع",
    ]
    .into_iter()
    .collect()
});

/// Imperatives that mark direct speech, not narration.
pub static IMPERATIVE_VERB_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "تعال", "تعالي", "اسمع", "اسمعي", "اقعد", "اقعدي", "قوم", "قومي", "روح", "روحي",
        "اسكت", "اسكتي", "خد", "خدي", "هات", "هاتي", "بص", "بصي", "استنى", "استني", "اتفضل",
        "اتفضلي", "ادخل", "ادخلي", "اخرج", "اخرجي", "سيب", "سيبي", "قول", "قولي",
    ]
    .into_iter()
    .collect()
});

/// Tokens that disqualify a line from being a character cue.
pub static CHARACTER_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "مشهد", "قطع", "انتقال", "داخلي", "خارجي", "نهار", "ليل", "صباح", "مساء", "فجر",
    ]
    .into_iter()
    .collect()
});

/// First tokens that usually open spoken lines.
pub static CONVERSATIONAL_STARTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ايوه", "أيوه", "اه", "آه", "لا", "لأ", "طيب", "خلاص", "يعني", "والله", "ماشي", "يلا",
        "بس", "ليه", "ازاي", "إزاي", "امال", "أمال", "طب", "اوك", "أوك", "مش", "اهلا", "أهلا",
        "اهلاً", "أهلاً", "مرحبا", "مرحباً",
    ]
    .into_iter()
    .collect()
});

/// Complete one-word replies that are dialogue on their own.
pub static SHORT_DIALOGUE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "نعم", "لا", "لأ", "ايوه", "أيوه", "اه", "آه", "طبعا", "طبعاً", "اكيد", "أكيد", "ماشي",
        "خلاص", "شكرا", "شكراً", "اسف", "آسف", "معلش", "تمام",
    ]
    .into_iter()
    .collect()
});

/// Single tokens that can never be a speaker name on their own.
pub static NON_CHARACTER_SINGLE_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "انا", "أنا", "انت", "أنت", "انتي", "إنتي", "هو", "هي", "احنا", "إحنا", "هم", "ده",
        "دي", "دا", "كده", "هنا", "هناك", "فين", "امتى", "إمتى", "ليه", "ايه", "إيه",
    ]
    .into_iter()
    .collect()
});

/// Superset used by name filters: stop words, conversational starters,
/// negations and interrogatives.
pub static NON_NAME_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set: HashSet<&'static str> = HashSet::new();
    set.extend(CHARACTER_STOP_WORDS.iter().copied());
    set.extend(CONVERSATIONAL_STARTS.iter().copied());
    set.extend(NON_CHARACTER_SINGLE_TOKENS.iter().copied());
    set.extend([
        "يا", "لم", "لن", "ما", "هل", "لماذا", "ماذا", "من", "اين", "أين", "كيف", "متى",
    ]);
    set
});

/// Pronouns rejected when harvesting character names into session memory.
pub static MEMORY_INVALID_SINGLE_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "انا", "أنا", "انت", "أنت", "انتي", "إنتي", "انتو", "هو", "هي", "احنا", "إحنا", "انتم",
        "أنتم", "هم", "هما", "هن",
    ]
    .into_iter()
    .collect()
});
