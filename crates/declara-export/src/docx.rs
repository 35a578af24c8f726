use std::io::Cursor;

use declara_signature::png::encode_png;
use declara_signature::raster::RasterImage;
use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Pic, Run, RunFonts, Style, StyleType, Table,
    TableCell, TableRow,
};

use crate::backend::DocumentBackend;
use crate::compose::{AnswerRow, Block, Document};
use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Pixel-to-EMU conversion for embedded images (96 dpi).
const EMU_PER_PIXEL: u32 = 9525;

const LABEL_COLUMN_WIDTH: usize = 3200;
const VALUE_COLUMN_WIDTH: usize = 5300;

/// Primary document backend, producing DOCX artifacts.
pub struct DocxBackend;

impl DocxBackend {
    /// Confirm the backend can actually produce output by building and
    /// packing a throwaway document in memory.
    pub fn probe() -> Result<Self, ExportError> {
        let mut buf = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("probe")))
            .build()
            .pack(&mut buf)
            .map_err(|e| ExportError::Docx(e.to_string()))?;
        Ok(Self)
    }
}

impl DocumentBackend for DocxBackend {
    fn id(&self) -> &'static str {
        "docx"
    }

    fn extension(&self) -> &'static str {
        "docx"
    }

    fn render(
        &self,
        document: &Document,
        styles: &DocumentStyles,
    ) -> Result<Vec<u8>, ExportError> {
        let mut docx = Docx::new()
            .add_style(heading_style("Heading1", "heading 1", styles.heading1_size))
            .add_style(heading_style("Heading2", "heading 2", styles.heading2_size));

        for block in &document.blocks {
            docx = match block {
                Block::Heading { level, text } => {
                    let style_id = if *level <= 1 { "Heading1" } else { "Heading2" };
                    docx.add_paragraph(
                        Paragraph::new()
                            .style(style_id)
                            .add_run(Run::new().add_text(text).bold()),
                    )
                }
                Block::Paragraph(text) => docx.add_paragraph(body_paragraph(text, styles)),
                Block::Warning(text) => docx.add_paragraph(
                    Paragraph::new().align(AlignmentType::Left).add_run(
                        body_run(text, styles).bold().color(&styles.critical_color),
                    ),
                ),
                Block::Bullet(text) => docx.add_paragraph(
                    Paragraph::new()
                        .align(AlignmentType::Left)
                        .add_run(body_run(&format!("\u{2022} {text}"), styles)),
                ),
                Block::AnswerTable(rows) => docx.add_table(answer_table(rows, styles)),
                Block::PageBreak => docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                ),
                Block::SignatureImage(image) => {
                    docx.add_paragraph(signature_paragraph(image))
                }
                Block::SignatureRule => docx.add_paragraph(body_paragraph(
                    "_________________________________________",
                    styles,
                )),
                Block::FooterLine(text) => docx.add_paragraph(
                    Paragraph::new().align(AlignmentType::Center).add_run(
                        Run::new()
                            .add_text(text)
                            .size(styles.footer_size * 2)
                            .color(&styles.muted_color)
                            .fonts(RunFonts::new().ascii(&styles.body_font)),
                    ),
                ),
            };
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| ExportError::Docx(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

fn heading_style(style_id: &str, name: &str, size_pt: usize) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2) // OOXML uses half-points
}

fn body_run(text: &str, styles: &DocumentStyles) -> Run {
    Run::new()
        .add_text(text)
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font))
}

fn body_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(body_run(text, styles))
}

fn answer_table(rows: &[AnswerRow], styles: &DocumentStyles) -> Table {
    let table_rows = rows
        .iter()
        .map(|row| {
            let mut label_run = body_run(&row.label, styles).bold();
            let mut value_run = body_run(&row.value, styles);
            if row.critical {
                label_run = label_run.color(&styles.critical_color);
                value_run = value_run.color(&styles.critical_color);
            }
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(label_run)),
                TableCell::new().add_paragraph(Paragraph::new().add_run(value_run)),
            ])
        })
        .collect();

    Table::new(table_rows).set_grid(vec![LABEL_COLUMN_WIDTH, VALUE_COLUMN_WIDTH])
}

fn signature_paragraph(image: &RasterImage) -> Paragraph {
    let png = encode_png(image);
    let pic = Pic::new(&png).size(
        image.width * EMU_PER_PIXEL,
        image.height * EMU_PER_PIXEL,
    );
    Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(Run::new().add_image(pic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_succeeds() {
        assert!(DocxBackend::probe().is_ok());
    }

    #[test]
    fn renders_zip_container() {
        let backend = DocxBackend;
        let document = Document {
            title: "Declaração".to_string(),
            blocks: vec![
                Block::Heading { level: 1, text: "Declaração".to_string() },
                Block::AnswerTable(vec![AnswerRow {
                    label: "Nome".to_string(),
                    value: "Ana".to_string(),
                    critical: false,
                }]),
                Block::PageBreak,
                Block::SignatureRule,
                Block::FooterLine("Documento ID: abcd1234".to_string()),
            ],
        };
        let bytes = backend.render(&document, &DocumentStyles::default()).unwrap();
        // DOCX is a ZIP archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn embeds_signature_image() {
        let backend = DocxBackend;
        let mut image = RasterImage::blank(40, 20);
        image.pixels[5] = 0x00;
        let document = Document {
            title: "Declaração".to_string(),
            blocks: vec![Block::SignatureImage(image)],
        };
        let bytes = backend.render(&document, &DocumentStyles::default()).unwrap();
        assert!(!bytes.is_empty());
    }
}
