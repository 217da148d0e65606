//! HTML rendering of analysis results
//!
//! [`render`] produces the result block that goes into the page's result
//! region; [`write`] wraps the same block in a standalone document.

use crate::analysis::{AnalysisResult, FlatResult, Prediction, StructuredResult};
use crate::report::{escape_html, percent_format};
use std::fmt::Write as _;
use std::io::{self, Write};
use tracing::warn;

/// Render the result block for any result shape.
///
/// An error result renders the message and nothing else. `image_src` is
/// only honoured for `data:image/` URLs.
pub fn render(result: &AnalysisResult, image_src: Option<&str>) -> String {
    match result {
        AnalysisResult::Error(e) => error_block(&e.message),
        AnalysisResult::Structured(s) => render_structured(s, image_src),
        AnalysisResult::Flat(f) => render_flat(f, image_src),
    }
}

/// A single user-visible error message.
pub fn error_block(message: &str) -> String {
    format!(
        r#"<p class="error-message" style="color: red;">{}</p>"#,
        escape_html(message)
    )
}

fn is_preview_src(src: &str) -> bool {
    src.starts_with("data:image/")
}

fn header(out: &mut String, image_src: Option<&str>) {
    out.push_str("<h2>分析結果</h2>\n");

    match image_src {
        Some(src) if is_preview_src(src) => {
            let _ = writeln!(
                out,
                r#"<img src="{}" alt="分析対象の画像" class="result-image">"#,
                escape_html(src)
            );
        }
        Some(_) => warn!("dropping image preview that is not a data:image URL"),
        None => {}
    }
}

fn input_section(out: &mut String, text: &str) {
    let _ = write!(
        out,
        r#"<div class="result-section">
    <h3>▼ 入力文</h3>
    <p class="input-text-result">{}</p>
</div>
"#,
        escape_html(text)
    );
}

fn prediction_row(p: &Prediction) -> String {
    format!(
        r#"<li class="polarity-row"><span>{} {}:</span> {} ({})</li>"#,
        escape_html(p.icon()),
        escape_html(&p.label),
        percent_format(p.prob),
        escape_html(&p.degree)
    )
}

fn render_structured(result: &StructuredResult, image_src: Option<&str>) -> String {
    let mut out = String::new();
    header(&mut out, image_src);
    input_section(&mut out, &result.text);

    let emotion_rows: String = result
        .emotion_rows()
        .iter()
        .map(|row| {
            format!(
                r#"<li class="emotion-row" data-emotion="{}"><span>{} {}:</span> {} ({})</li>"#,
                row.emotion.key(),
                escape_html(row.icon()),
                row.emotion.ja(),
                percent_format(row.prob),
                escape_html(&row.degree)
            )
        })
        .collect();

    let _ = write!(
        out,
        r#"<div class="result-section">
    <h3>▼ 感情（8種類）</h3>
    <ul class="detail-list">{}</ul>
</div>
"#,
        emotion_rows
    );

    let pred = &result.polarity.pred;
    let polarity_rows: String = result.polarity.detail.iter().map(prediction_row).collect();

    let _ = write!(
        out,
        r#"<div class="result-section">
    <h3>▼ 極性（ネガ・ニュートラル・ポジ）</h3>
    <p class="polarity-pred"><strong>予測:</strong> {} {} / <strong>確率:</strong> {} / <strong>程度:</strong> {}</p>
    <h4>内訳:</h4>
    <ul class="detail-list">{}</ul>
</div>
"#,
        escape_html(pred.icon()),
        escape_html(&pred.label),
        percent_format(pred.prob),
        escape_html(&pred.degree),
        polarity_rows
    );

    out
}

fn render_flat(result: &FlatResult, image_src: Option<&str>) -> String {
    let mut out = String::new();
    header(&mut out, image_src);
    input_section(&mut out, &result.text);

    let rows: String = result
        .rows()
        .into_iter()
        .map(|(emotion, score)| {
            format!(
                r#"<li class="emotion-row" data-emotion="{}"><span>{} {}:</span> {}</li>"#,
                emotion.key(),
                emotion.icon(),
                emotion.ja(),
                escape_html(score)
            )
        })
        .collect();

    let _ = write!(
        out,
        r#"<div class="result-section">
    <h3>▼ 感情（8種類）</h3>
    <ul class="detail-list">{}</ul>
</div>
"#,
        rows
    );

    out
}

/// Write a standalone HTML document containing the result block.
pub fn write<W: Write>(
    writer: &mut W,
    result: &AnalysisResult,
    image_src: Option<&str>,
) -> io::Result<()> {
    let block = render(result, image_src);

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>感情分析レポート</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans JP', 'Hiragino Sans', sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.6;
            margin: 0;
        }}
        .container {{ max-width: 800px; margin: 0 auto; padding: 2rem; }}
        h2 {{ border-bottom: 1px solid var(--border); padding-bottom: 0.5rem; }}
        h3, h4 {{ color: var(--dim); }}
        .result-section {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1rem 1.5rem;
            margin-bottom: 1.5rem;
        }}
        .result-image {{ max-width: 100%; border-radius: 8px; margin-bottom: 1.5rem; }}
        .input-text-result {{ white-space: pre-wrap; }}
        .detail-list {{ list-style: none; padding: 0; }}
        .detail-list li {{ padding: 0.25rem 0; border-bottom: 1px solid var(--border); }}
        .detail-list li:last-child {{ border-bottom: none; }}
        .detail-list span {{ display: inline-block; min-width: 8rem; }}
        .footer {{ color: var(--dim); font-size: 0.875rem; text-align: center; margin-top: 2rem; }}
    </style>
</head>
<body>
    <div class="container" id="result-area">
{block}
        <div class="footer">sentiview {version}</div>
    </div>
</body>
</html>
"#,
        block = block,
        version = env!("CARGO_PKG_VERSION"),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::adapt;
    use serde_json::json;

    fn render_json(value: serde_json::Value, image: Option<&str>) -> String {
        render(&adapt(value).unwrap(), image)
    }

    // ==========================================================================
    // STRUCTURED RESULT TESTS
    // ==========================================================================

    #[test]
    fn test_minimal_structured_result() {
        let html = render_json(
            json!({
                "text": "hello",
                "polarity": {"pred": {"label": "positive", "prob": 0.8, "degree": "strong"}, "detail": []},
                "emotion": {"detail": []}
            }),
            None,
        );

        assert!(html.contains("hello"));
        assert!(html.contains("positive"));
        assert!(html.contains("80.0%"));
        assert!(html.contains("strong"));
    }

    #[test]
    fn test_exactly_eight_emotion_rows_in_order() {
        // Payload arrives sorted by probability, not in display order
        let html = render_json(
            json!({
                "text": "t",
                "polarity": {"pred": {"label": "neutral", "prob": 0.5}, "detail": []},
                "emotion": {"detail": [
                    {"label": "trust", "prob": 0.5},
                    {"label": "fear", "prob": 0.2},
                    {"label": "joy", "prob": 0.1},
                    {"label": "bogus", "prob": 0.05}
                ]}
            }),
            None,
        );

        assert_eq!(html.matches(r#"class="emotion-row""#).count(), 8);

        let positions: Vec<usize> = [
            "joy", "sadness", "anger", "surprise", "fear", "disgust", "trust", "anticipation",
        ]
        .iter()
        .map(|key| html.find(&format!(r#"data-emotion="{}""#, key)).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "rows out of order");
    }

    #[test]
    fn test_section_order() {
        let html = render_json(
            json!({
                "text": "順番",
                "polarity": {"pred": {"label": "negative", "prob": 0.6}, "detail": [
                    {"label": "negative", "prob": 0.6},
                    {"label": "positive", "prob": 0.4}
                ]},
                "emotion": {"detail": []}
            }),
            Some("data:image/png;base64,AAAA"),
        );

        let image = html.find("<img").unwrap();
        let input = html.find("▼ 入力文").unwrap();
        let emotion = html.find("▼ 感情").unwrap();
        let polarity = html.find("▼ 極性").unwrap();
        let breakdown = html.find("内訳").unwrap();
        assert!(image < input && input < emotion && emotion < polarity && polarity < breakdown);
        assert_eq!(html.matches(r#"class="polarity-row""#).count(), 2);
    }

    #[test]
    fn test_catalogue_icons_used_when_absent() {
        let html = render_json(
            json!({
                "text": "t",
                "polarity": {"pred": {"label": "positive", "prob": 0.9}, "detail": []},
                "emotion": {"detail": [{"label": "joy", "prob": 0.9, "icon": "🥳"}]}
            }),
            None,
        );
        assert!(html.contains("😄 positive"));
        assert!(html.contains("🥳 喜び"));
        assert!(html.contains("😢 悲しみ"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_json(
            json!({
                "text": "<b>bold</b> & \"quoted\"",
                "polarity": {"pred": {"label": "<i>neutral</i>", "prob": 0.5}, "detail": []},
                "emotion": {"detail": []}
            }),
            None,
        );
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; &quot;quoted&quot;"));
        assert!(!html.contains("<i>neutral</i>"));
    }

    #[test]
    fn test_non_data_image_src_dropped() {
        let html = render_json(
            json!({
                "text": "t",
                "polarity": {"pred": {"label": "neutral", "prob": 0.5}, "detail": []},
                "emotion": {"detail": []}
            }),
            Some("javascript:alert(1)"),
        );
        assert!(!html.contains("<img"));
        assert!(!html.contains("javascript"));
    }

    // ==========================================================================
    // ERROR AND LEGACY RESULT TESTS
    // ==========================================================================

    #[test]
    fn test_error_renders_only_message() {
        let html = render_json(json!({"error": "サーバー内部エラー"}), Some("data:image/png;base64,AA"));

        assert_eq!(
            html,
            r#"<p class="error-message" style="color: red;">サーバー内部エラー</p>"#
        );
        assert!(!html.contains("分析結果"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_flat_result_rows() {
        let html = render_json(
            json!({"入力された文章": "テスト", "期待": 1, "喜び": 3, "怒り": "2"}),
            None,
        );

        assert!(html.contains("テスト"));
        assert_eq!(html.matches(r#"class="emotion-row""#).count(), 8);
        assert!(html.contains("😊 喜び:</span> 3"));
        assert!(html.contains("😠 怒り:</span> 2"));
        assert!(html.contains("😢 悲しみ:</span> 0"));
        assert!(html.find("喜び").unwrap() < html.find("期待").unwrap());
        assert!(!html.contains("▼ 極性"));
    }

    // ==========================================================================
    // DOCUMENT TESTS
    // ==========================================================================

    #[test]
    fn test_document_wraps_block() {
        let result = adapt(json!({
            "text": "文書",
            "polarity": {"pred": {"label": "neutral", "prob": 0.5}, "detail": []},
            "emotion": {"detail": []}
        }))
        .unwrap();

        let mut buf = Vec::new();
        write(&mut buf, &result, None).unwrap();
        let doc = String::from_utf8(buf).unwrap();

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(&render(&result, None)));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
