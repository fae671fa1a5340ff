use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::{LangCode, TranslateConfig, TranslateError, Translator};

/// English to Hindi phrase table covering the sample corpus.
const BUILTIN_HINDI: &[(&str, &str)] = &[
    (
        "Understanding Vector Space Models",
        "वेक्टर स्पेस मॉडल को समझना",
    ),
    (
        "Vector space models represent text documents as vectors in a high-dimensional space. Each dimension corresponds to a term in the vocabulary, and the value represents the term's importance in the document.",
        "वेक्टर स्पेस मॉडल टेक्स्ट डॉक्यूमेंट्स को उच्च-आयामी स्पेस में वेक्टर्स के रूप में दर्शाते हैं। प्रत्येक आयाम शब्दावली में एक शब्द से संबंधित होता है, और मान दस्तावेज़ में शब्द के महत्व को दर्शाता है।",
    ),
    (
        "Cross-Language Information Retrieval",
        "क्रॉस-लैंग्वेज इनफॉर्मेशन रिट्रीवल",
    ),
    (
        "CLIR systems enable users to search documents in one language using queries in another language. This is achieved through techniques like translation-based retrieval and cross-lingual embeddings.",
        "CLIR सिस्टम उपयोगकर्ताओं को एक भाषा में क्वेरी का उपयोग करके दूसरी भाषा में दस्तावेज़ खोजने में सक्षम बनाते हैं। यह अनुवाद-आधारित पुनर्प्राप्ति और क्रॉस-लिंगुअल एम्बेडिंग जैसी तकनीकों के माध्यम से प्राप्त किया जाता है।",
    ),
    ("Query Translation Methods", "क्वेरी अनुवाद विधियाँ"),
    (
        "Dictionary-based translation and machine translation are two primary approaches for query translation in CLIR. Machine translation often provides better context-aware translations.",
        "डिक्शनरी-आधारित अनुवाद और मशीन अनुवाद CLIR में क्वेरी अनुवाद के लिए दो प्राथमिक दृष्टिकोण हैं। मशीन अनुवाद अक्सर बेहतर संदर्भ-जागरूक अनुवाद प्रदान करता है।",
    ),
    ("Document Embedding Techniques", "दस्तावेज़ एम्बेडिंग तकनीकें"),
    (
        "Modern CLIR systems use multilingual document embeddings to create language-agnostic vector representations, enabling direct cross-lingual similarity comparison.",
        "आधुनिक CLIR सिस्टम भाषा-निरपेक्ष वेक्टर प्रतिनिधित्व बनाने के लिए बहुभाषी दस्तावेज़ एम्बेडिंग का उपयोग करते हैं, जिससे सीधी क्रॉस-लिंगुअल समानता तुलना संभव होती है।",
    ),
    ("Evaluation Metrics in IR", "सूचना पुनर्प्राप्ति में मूल्यांकन मेट्रिक्स"),
    (
        "Information retrieval systems are evaluated using metrics like precision, recall, and mean average precision (MAP). These metrics help assess both relevance and ranking quality.",
        "सूचना पुनर्प्राप्ति सिस्टम का मूल्यांकन प्रिसिज़न, रिकॉल और मीन एवरेज प्रिसिज़न (MAP) जैसे मेट्रिक्स से किया जाता है। ये मेट्रिक्स प्रासंगिकता और रैंकिंग गुणवत्ता दोनों का आकलन करने में मदद करते हैं।",
    ),
];

type PhraseTable = HashMap<String, String>;

/// Exact-match phrase lookup, one table per target language.
///
/// Keys are matched after trimming surrounding whitespace. Tables are keyed by
/// primary language subtag, so `hi` and `hi-IN` share an entry.
#[derive(Debug, Clone, Default)]
pub struct DictionaryTranslator {
    tables: HashMap<String, PhraseTable>,
}

impl DictionaryTranslator {
    /// Empty translator. Every lookup fails until tables are added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Translator preloaded with the built-in English to Hindi table.
    pub fn builtin() -> Self {
        let mut dict = Self::empty();
        dict.extend(
            "hi",
            BUILTIN_HINDI
                .iter()
                .map(|(src, dst)| (src.to_string(), dst.to_string())),
        );
        dict
    }

    pub fn from_config(cfg: &TranslateConfig) -> Result<Self, TranslateError> {
        let mut dict = if cfg.disable_builtin_dictionary {
            Self::empty()
        } else {
            Self::builtin()
        };
        if let Some(path) = &cfg.dictionary_path {
            dict.load_file(path)?;
        }
        Ok(dict)
    }

    /// Merge entries for `lang`. Later entries overwrite earlier ones.
    pub fn extend<I>(&mut self, lang: &str, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let table = self.tables.entry(lang.trim().to_ascii_lowercase()).or_default();
        for (src, dst) in entries {
            table.insert(src.trim().to_string(), dst);
        }
    }

    /// Merge a JSON file shaped `{"<lang>": {"<source>": "<target>"}}`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), TranslateError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TranslateError::InvalidConfig(format!(
                "failed to read dictionary {}: {e}",
                path.display()
            ))
        })?;
        let parsed: HashMap<String, PhraseTable> = serde_json::from_str(&raw).map_err(|e| {
            TranslateError::InvalidConfig(format!(
                "failed to parse dictionary {}: {e}",
                path.display()
            ))
        })?;
        for (lang, entries) in parsed {
            let code = LangCode::parse(&lang)?;
            self.extend(code.primary(), entries);
        }
        Ok(())
    }

    pub fn entry_count(&self, lang: &str) -> usize {
        self.tables.get(lang).map_or(0, HashMap::len)
    }

    pub fn lookup(&self, text: &str, target: &LangCode) -> Result<&str, TranslateError> {
        let table = self
            .tables
            .get(target.primary())
            .ok_or_else(|| TranslateError::UnsupportedLanguage(target.to_string()))?;
        table
            .get(text.trim())
            .map(String::as_str)
            .ok_or_else(|| TranslateError::NoEntry {
                lang: target.to_string(),
            })
    }
}

#[async_trait]
impl Translator for DictionaryTranslator {
    fn name(&self) -> &str {
        "dictionary"
    }

    async fn translate(&self, text: &str, target: &LangCode) -> Result<String, TranslateError> {
        self.lookup(text, target).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn hi() -> LangCode {
        LangCode::parse("hi").unwrap()
    }

    #[test]
    fn builtin_table_covers_sample_titles() {
        let dict = DictionaryTranslator::builtin();
        assert_eq!(
            dict.lookup("Query Translation Methods", &hi()).unwrap(),
            "क्वेरी अनुवाद विधियाँ"
        );
        assert_eq!(dict.entry_count("hi"), BUILTIN_HINDI.len());
    }

    #[test]
    fn lookup_ignores_surrounding_whitespace_and_region() {
        let dict = DictionaryTranslator::builtin();
        let hi_in = LangCode::parse("hi-IN").unwrap();
        assert!(dict.lookup("  Query Translation Methods\n", &hi_in).is_ok());
    }

    #[test]
    fn unknown_language_and_missing_entry_are_distinct() {
        let dict = DictionaryTranslator::builtin();
        let fr = LangCode::parse("fr").unwrap();
        assert!(matches!(
            dict.lookup("Query Translation Methods", &fr),
            Err(TranslateError::UnsupportedLanguage(_))
        ));
        assert!(matches!(
            dict.lookup("never seen this", &hi()),
            Err(TranslateError::NoEntry { .. })
        ));
    }

    #[test]
    fn loads_and_merges_json_tables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"FR": {{"Query Translation Methods": "Méthodes de traduction de requêtes"}},
                "hi": {{"Query Translation Methods": "override"}}}}"#
        )
        .unwrap();

        let mut dict = DictionaryTranslator::builtin();
        dict.load_file(file.path()).unwrap();

        let fr = LangCode::parse("fr").unwrap();
        assert_eq!(
            dict.lookup("Query Translation Methods", &fr).unwrap(),
            "Méthodes de traduction de requêtes"
        );
        assert_eq!(dict.lookup("Query Translation Methods", &hi()).unwrap(), "override");
    }

    #[test]
    fn bad_dictionary_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let mut dict = DictionaryTranslator::empty();
        assert!(matches!(
            dict.load_file(file.path()),
            Err(TranslateError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn translator_trait_delegates_to_lookup() {
        let dict = DictionaryTranslator::builtin();
        let out = dict
            .translate("Evaluation Metrics in IR", &hi())
            .await
            .unwrap();
        assert!(!out.is_empty());
    }
}
