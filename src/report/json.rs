//! JSON output of the normalized result

use crate::analysis::AnalysisResult;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, result: &AnalysisResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, result)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::adapt;
    use serde_json::{json, Value};

    #[test]
    fn test_structured_json_is_normalized() {
        let result = adapt(json!({
            "text": "t",
            "polarity": {"pred": {"ja": "ポジティブ", "prob": 0.8}, "detail": []},
            "emotion": {"detail": [{"label": "LABEL_0", "prob": 0.6}]}
        }))
        .unwrap();

        let mut buf = Vec::new();
        write(&mut buf, &result).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["kind"], "structured");
        assert_eq!(value["polarity"]["pred"]["polarity"], "positive");
        assert_eq!(value["polarity"]["pred"]["degree"], "かなり");
        // Classifier index resolved to the emotion key
        assert_eq!(value["emotion"]["detail"][0]["emotion"], "joy");
        assert!(value["emotion"]["detail"][0].get("icon").is_none());
    }

    #[test]
    fn test_flat_json_keys() {
        let result = adapt(json!({"入力された文章": "x", "喜び": 3})).unwrap();

        let mut buf = Vec::new();
        write(&mut buf, &result).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["kind"], "flat");
        assert_eq!(value["scores"]["joy"], "3");
    }
}
