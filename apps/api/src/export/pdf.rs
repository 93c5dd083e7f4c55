//! Renders paginated lines into a PDF document.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::export::layout::{ExportConfig, Page};
use crate::export::metrics::FontMetricTable;
use crate::export::ExportError;

/// Builds the PDF bytes for `pages`. Lines are drawn at the left margin with
/// their baseline at `y` points below the top edge.
pub fn render(
    pages: &[Page],
    metrics: &FontMetricTable,
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => metrics.base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let page_height = config.page_height_pt;
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), points(config.font_size_pt)]),
        ];
        for line in page.iter().filter(|l| !l.text.is_empty()) {
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    points(config.margin_pt),
                    points(page_height - line.y),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Render(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                points(config.page_width_pt),
                points(page_height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Render(e.to_string()))?;
    Ok(bytes)
}

/// PDF coordinates as whole points.
fn points(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

/// Maps text onto the WinAnsi code page used by the base-14 fonts.
/// Typographic quotes and dashes get their WinAnsi slots; anything else
/// outside Latin-1 becomes `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{20AC}' => 0x80,
            '\t' => b' ',
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::PlacedLine;
    use crate::export::metrics::HELVETICA;

    #[test]
    fn test_encode_win_ansi_ascii_passthrough() {
        assert_eq!(encode_win_ansi("Hello (world)"), b"Hello (world)".to_vec());
    }

    #[test]
    fn test_encode_win_ansi_maps_typographic_marks() {
        assert_eq!(encode_win_ansi("\u{201C}A\u{201D} \u{2013} é"), vec![0x93, b'A', 0x94, b' ', 0x96, b' ', 0xE9]);
    }

    #[test]
    fn test_encode_win_ansi_replaces_unmappable() {
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_render_produces_loadable_document_with_page_count() {
        let config = ExportConfig::default();
        let page = |text: &str| {
            vec![PlacedLine {
                text: text.to_string(),
                y: config.margin_pt,
            }]
        };
        let bytes = render(&[page("first"), page("second")], &HELVETICA, &config).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
