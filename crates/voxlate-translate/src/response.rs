use serde_json::Value;
use voxlate_core::{TranslationError, TranslationResult};

/// `error` counts only when it holds something: `null`, `false`, `""` and
/// `0` are treated as absent.
fn service_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// First two lines of `text`, accepting both `\n` and `\r\n` breaks.
pub fn split_lines(text: &str) -> (String, String) {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    let original = lines.next().unwrap_or("").to_string();
    let translated = lines.next().unwrap_or("").to_string();
    (original, translated)
}

/// Interpret a decoded response body from the translation service.
pub fn parse_response(body: Value) -> Result<TranslationResult, TranslationError> {
    if let Some(message) = service_error(&body) {
        return Err(TranslationError::Service(message));
    }

    let (original, translated) = split_lines(
        body.get("translated_text")
            .and_then(Value::as_str)
            .unwrap_or(""),
    );
    Ok(TranslationResult::Translated {
        original,
        translated,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translated(body: Value) -> (String, String) {
        match parse_response(body).unwrap() {
            TranslationResult::Translated {
                original,
                translated,
                ..
            } => (original, translated),
            other => panic!("expected Translated, got {other:?}"),
        }
    }

    #[test]
    fn test_two_lines() {
        let (original, translated) = translated(json!({"translated_text": "hola\nhello"}));
        assert_eq!(original, "hola");
        assert_eq!(translated, "hello");
    }

    #[test]
    fn test_single_line_leaves_translation_empty() {
        let (original, translated) = translated(json!({"translated_text": "soloUnaLinea"}));
        assert_eq!(original, "soloUnaLinea");
        assert_eq!(translated, "");
    }

    #[test]
    fn test_crlf_breaks() {
        let (original, translated) = translated(json!({"translated_text": "こんにちは\r\nhello\r\n"}));
        assert_eq!(original, "こんにちは");
        assert_eq!(translated, "hello");
    }

    #[test]
    fn test_extra_lines_only_kept_in_raw() {
        let body = json!({"translated_text": "a\nb\nc"});
        match parse_response(body.clone()).unwrap() {
            TranslationResult::Translated {
                original,
                translated,
                raw,
            } => {
                assert_eq!((original.as_str(), translated.as_str()), ("a", "b"));
                assert_eq!(raw, body);
            }
            other => panic!("expected Translated, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_or_non_string_translated_text_is_empty() {
        assert_eq!(translated(json!({})), (String::new(), String::new()));
        assert_eq!(
            translated(json!({"translated_text": 42})),
            (String::new(), String::new())
        );
        assert_eq!(translated(json!(["not", "an", "object"])), (String::new(), String::new()));
    }

    #[test]
    fn test_service_error_message_verbatim() {
        match parse_response(json!({"error": "quota exceeded"})) {
            Err(TranslationError::Service(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_wins_over_translated_text() {
        let result = parse_response(json!({"error": "boom", "translated_text": "a\nb"}));
        assert!(matches!(result, Err(TranslationError::Service(_))));
    }

    #[test]
    fn test_non_string_error_is_rendered_as_json() {
        match parse_response(json!({"error": {"code": 7}})) {
            Err(TranslationError::Service(msg)) => assert_eq!(msg, r#"{"code":7}"#),
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_error_values_are_ignored() {
        for body in [
            json!({"error": null, "translated_text": "x\ny"}),
            json!({"error": false, "translated_text": "x\ny"}),
            json!({"error": "", "translated_text": "x\ny"}),
            json!({"error": 0, "translated_text": "x\ny"}),
        ] {
            assert_eq!(translated(body), ("x".to_string(), "y".to_string()));
        }
    }

    #[test]
    fn test_split_lines_empty_input() {
        assert_eq!(split_lines(""), (String::new(), String::new()));
    }
}
