//! Plain-text rendering for terminals

use crate::analysis::{AnalysisResult, Prediction};
use crate::report::percent_format;
use std::fmt::Write as _;
use std::io::{self, Write};

pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();

    match result {
        AnalysisResult::Error(e) => {
            let _ = writeln!(out, "エラー: {}", e.message);
        }
        AnalysisResult::Structured(s) => {
            let _ = writeln!(out, "▼ 入力文");
            let _ = writeln!(out, "{}", s.text);

            let _ = writeln!(out, "\n▼ 感情（8種類）");
            for row in s.emotion_rows() {
                let _ = writeln!(
                    out,
                    "    {} {}: {:>6} ({})",
                    row.icon(),
                    row.emotion.ja(),
                    percent_format(row.prob),
                    row.degree
                );
            }

            let pred = &s.polarity.pred;
            let _ = writeln!(out, "\n▼ 極性（ネガ・ニュートラル・ポジ）");
            let _ = writeln!(
                out,
                "  予測: {} / 確率: {} / 程度: {}",
                label_with_icon(pred),
                percent_format(pred.prob),
                pred.degree
            );
            if !s.polarity.detail.is_empty() {
                let _ = writeln!(out, "  内訳:");
                for d in &s.polarity.detail {
                    let _ = writeln!(
                        out,
                        "    {}: {:>6} ({})",
                        label_with_icon(d),
                        percent_format(d.prob),
                        d.degree
                    );
                }
            }
        }
        AnalysisResult::Flat(f) => {
            let _ = writeln!(out, "▼ 入力文");
            let _ = writeln!(out, "{}", f.text);
            let _ = writeln!(out, "\n▼ 感情（8種類）");
            for (emotion, score) in f.rows() {
                let _ = writeln!(out, "    {} {}: {}", emotion.icon(), emotion.ja(), score);
            }
        }
    }

    out
}

fn label_with_icon(p: &Prediction) -> String {
    let icon = p.icon();
    if icon.is_empty() {
        p.label.clone()
    } else {
        format!("{} {}", icon, p.label)
    }
}

pub fn write<W: Write>(writer: &mut W, result: &AnalysisResult) -> io::Result<()> {
    writer.write_all(render(result).as_bytes())
}
