//! Language identification for free text.
//!
//! Codes follow ISO 639-1 where one exists (the codes used in the catalog's
//! `language` column), otherwise the three-letter ISO 639-3 code.

pub const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub confidence: f64,
    pub reliable: bool,
}

/// Detect the language of `text`, or `None` when the text carries no usable
/// signal (empty, digits only, too ambiguous).
pub fn detect_language(text: &str) -> Option<DetectedLanguage> {
    let info = whatlang::detect(text.trim())?;
    let lang = info.lang();
    Some(DetectedLanguage {
        code: iso_639_1(lang.code()),
        name: lang.eng_name(),
        confidence: info.confidence(),
        reliable: info.is_reliable(),
    })
}

/// Code for a detection result, with undetected text mapped to `"unknown"`.
pub fn language_code(detected: Option<&DetectedLanguage>) -> &'static str {
    detected.map_or(UNKNOWN_LANGUAGE, |d| d.code)
}

fn iso_639_1(code: &'static str) -> &'static str {
    match code {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        let detected =
            detect_language("The quick brown fox jumps over the lazy dog near the river bank")
                .unwrap();
        assert_eq!(detected.code, "en");
        assert_eq!(detected.name, "English");
    }

    #[test]
    fn test_detects_spanish() {
        let detected = detect_language(
            "Una novela sobre la familia, el amor y la soledad en un pueblo pequeño de Colombia",
        )
        .unwrap();
        assert_eq!(detected.code, "es");
    }

    #[test]
    fn test_undetectable_text_is_none() {
        assert!(detect_language("").is_none());
        assert!(detect_language("   12345 !!! ").is_none());
        assert_eq!(language_code(None), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_unmapped_codes_pass_through() {
        assert_eq!(iso_639_1("xyz"), "xyz");
    }
}
