use crate::backend::DocumentBackend;
use crate::compose::{Block, Document};
use crate::error::ExportError;
use crate::styles::DocumentStyles;

const PAGE_BREAK: char = '\u{0C}';
const SIGNATURE_PLACEHOLDER: &str = "[Assinatura capturada digitalmente]";
const SIGNATURE_RULE: &str = "_________________________________________";

/// Plain-text fallback backend. Same logical content as the DOCX backend,
/// suitable for printing or archiving when rich output is unavailable.
pub struct PrintBackend;

impl DocumentBackend for PrintBackend {
    fn id(&self) -> &'static str {
        "print"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(
        &self,
        document: &Document,
        _styles: &DocumentStyles,
    ) -> Result<Vec<u8>, ExportError> {
        let mut out = String::new();

        for block in &document.blocks {
            match block {
                Block::Heading { level, text } => {
                    let underline = if *level <= 1 { '=' } else { '-' };
                    out.push_str(text);
                    out.push('\n');
                    out.extend(std::iter::repeat_n(underline, text.chars().count()));
                    out.push_str("\n\n");
                }
                Block::Paragraph(text) | Block::Warning(text) => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                Block::Bullet(text) => {
                    out.push_str("  \u{2022} ");
                    out.push_str(text);
                    out.push('\n');
                }
                Block::AnswerTable(rows) => {
                    for row in rows {
                        out.push_str(&row.label);
                        out.push_str(": ");
                        out.push_str(&row.value);
                        out.push('\n');
                    }
                    out.push('\n');
                }
                Block::PageBreak => {
                    out.push(PAGE_BREAK);
                    out.push('\n');
                }
                Block::SignatureImage(_) => {
                    out.push_str(SIGNATURE_PLACEHOLDER);
                    out.push_str("\n\n");
                }
                Block::SignatureRule => {
                    out.push_str(SIGNATURE_RULE);
                    out.push_str("\n\n");
                }
                Block::FooterLine(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }

        Ok(out.into_bytes())
    }
}
