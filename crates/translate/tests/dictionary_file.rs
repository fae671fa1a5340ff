use std::io::Write;

use translate::{build_translator, LangCode, TranslateConfig, TranslateError, TranslatorMode};

#[tokio::test]
async fn custom_tables_replace_builtin_when_requested() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"es": {{"Deep Learning Basics": "Fundamentos del aprendizaje profundo"}}}}"#).unwrap();

    let cfg = TranslateConfig {
        mode: TranslatorMode::Dictionary,
        dictionary_path: Some(file.path().to_path_buf()),
        disable_builtin_dictionary: true,
        ..Default::default()
    };
    let translator = build_translator(&cfg).unwrap();

    let es = LangCode::parse("es").unwrap();
    assert_eq!(
        translator.translate("Deep Learning Basics", &es).await.unwrap(),
        "Fundamentos del aprendizaje profundo"
    );

    let hi = LangCode::parse("hi").unwrap();
    let err = translator
        .translate("Query Translation Methods", &hi)
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedLanguage(_)));
}

#[test]
fn missing_dictionary_file_fails_at_build() {
    let cfg = TranslateConfig {
        dictionary_path: Some("/definitely/not/here.json".into()),
        ..Default::default()
    };
    assert!(build_translator(&cfg).is_err());
}
