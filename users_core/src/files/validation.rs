use lopdf::{Document, Object};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("corrupted PDF file: {0}")]
    CorruptedPdf(String),
}

/// True when the media type's essence is `application/pdf`. Parameters are ignored.
pub fn is_pdf(media_type: &str) -> bool {
    match media_type.parse::<mime::Mime>() {
        Ok(parsed) => parsed
            .essence_str()
            .eq_ignore_ascii_case(mime::APPLICATION_PDF.essence_str()),
        Err(_) => media_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentValidator;

impl ContentValidator {
    pub fn new() -> Self {
        Self
    }

    /// Non-PDF content is accepted as-is.
    pub fn validate(&self, media_type: &str, content: &[u8]) -> Result<(), ContentError> {
        if !is_pdf(media_type) {
            return Ok(());
        }

        self.page_count(content).map(|_| ())
    }

    /// Reads `/Root -> /Pages -> /Count` from a PDF document, following indirect objects.
    pub fn page_count(&self, content: &[u8]) -> Result<u32, ContentError> {
        let document = Document::load_mem(content).map_err(corrupted)?;

        let catalog = resolve(&document, document.trailer.get(b"Root"))
            .and_then(Object::as_dict)
            .map_err(corrupted)?;
        let pages = resolve(&document, catalog.get(b"Pages"))
            .and_then(Object::as_dict)
            .map_err(corrupted)?;
        let count = resolve(&document, pages.get(b"Count"))
            .and_then(Object::as_i64)
            .map_err(corrupted)?;

        u32::try_from(count)
            .map_err(|_| ContentError::CorruptedPdf(format!("invalid page count {}", count)))
    }
}

fn resolve<'a>(
    document: &'a Document,
    entry: lopdf::Result<&'a Object>,
) -> lopdf::Result<&'a Object> {
    document.dereference(entry?).map(|(_, object)| object)
}

fn corrupted(err: lopdf::Error) -> ContentError {
    ContentError::CorruptedPdf(err.to_string())
}

#[cfg(test)]
pub(crate) fn sample_pdf(page_count: usize) -> Vec<u8> {
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
