use once_cell::sync::Lazy;
use std::collections::HashMap;

/// ISO 639-1 -> коды Apertium
pub static APERTIUM_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("en", "eng"), ("es", "spa"), ("fr", "fra"), ("de", "deu"), ("it", "ita"),
        ("pt", "por"), ("ca", "cat"), ("eu", "eus"), ("gl", "glg"), ("oc", "oci"),
        ("ar", "ara"), ("mt", "mlt"), ("cy", "cym"), ("br", "bre"), ("is", "isl"),
        ("mk", "mkd"), ("bg", "bul"), ("hr", "hrv"), ("sl", "slv"), ("sr", "srp"),
        ("bs", "bos"), ("sq", "sqi"), ("ro", "ron"), ("ru", "rus"), ("be", "bel"),
        ("uk", "ukr"), ("kk", "kaz"), ("ky", "kir"), ("uz", "uzb"), ("tt", "tat"),
        ("ba", "bak"), ("crh", "crh"), ("nog", "nog"), ("kum", "kum"), ("kaa", "kaa"),
    ]
    .into_iter()
    .collect()
});

pub static GOOGLE_LANGUAGES: &[&str] = &[
    "auto", "af", "am", "ar", "as", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da",
    "de", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fr", "ga", "gd", "gl", "gu",
    "ha", "haw", "he", "hi", "hmn", "hr", "ht", "hu", "hy", "id", "ig", "is", "it", "iw",
    "ja", "jw", "ka", "kk", "km", "kn", "ko", "ku", "ky", "la", "lb", "lo", "lt", "lv",
    "mg", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "ne", "nl", "no", "or", "pa",
    "pl", "ps", "pt", "ro", "ru", "sd", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr",
    "st", "su", "sv", "sw", "ta", "te", "tg", "th", "tl", "tr", "uk", "ur", "uz", "vi",
    "xh", "yi", "yo", "zh", "zh-cn", "zh-tw", "zu",
];

pub static LIBRETRANSLATE_LANGUAGES: &[&str] = &[
    "auto", "af", "am", "ar", "as", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da",
    "de", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fr", "ga", "gl", "gu", "ha",
    "he", "hi", "hr", "hu", "ig", "is", "it", "ja", "jw", "ka", "km", "kn", "ko", "la",
    "lb", "lo", "lt", "lv", "mg", "mk", "ml", "mn", "mr", "mt", "my", "ne", "nl", "no",
    "or", "pa", "pl", "pt", "ro", "ru", "si", "sk", "sl", "sn", "so", "sq", "sr", "st",
    "su", "sv", "sw", "ta", "te", "th", "tl", "tr", "uk", "ur", "uz", "vi", "xh", "yo",
    "zh", "zu",
];

/// Проверка пары по статическому списку; "auto" допустим только как исходный
pub fn pair_in(list: &[&str], source_lang: &str, target_lang: &str) -> bool {
    target_lang != "auto" && list.contains(&source_lang) && list.contains(&target_lang)
}
