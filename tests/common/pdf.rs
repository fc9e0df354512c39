//! In-memory PDFs: page `i` (1-based) draws the string `page-i`.
//!
//! Shared by the unit tests (through a `#[path]` module in
//! `src/pipeline/split.rs`) and the integration tests.

use lopdf::{dictionary, Document, Object, Stream};

pub fn sample_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for i in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (page-{i}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(tree));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory save");
    bytes
}

/// The `page-i` markers of every page, in page order.
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("valid chunk PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = doc.get_page_content(id).expect("page content");
            let text = String::from_utf8_lossy(&content).into_owned();
            let open = text.find('(').expect("marker start");
            let close = text.rfind(')').expect("marker end");
            text[open + 1..close].to_string()
        })
        .collect()
}
