use crate::{
    font::FontSet,
    image::Image,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    ExportError, Result,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Default)]
/// A document is the main object that stores all the contents of the PDF
/// then renders it out with a call to [Document::write]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: FontSet,
    pub images: Arena<Image>,
    /// Images already embedded, by the path they were decoded from
    image_paths: HashMap<PathBuf, Id<Image>>,
}

impl Document {
    /// Create an empty document that draws text with `fonts`
    pub fn new(fonts: FontSet) -> Document {
        Document {
            fonts,
            ..Document::default()
        }
    }

    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document. Pages are never removed or reordered once added.
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// Add an image to the document structure. Images are stored "globally" within the
    /// document, such that any page can draw them by referring to the returned id.
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// The image previously embedded from `path`, if any
    pub fn image_for(&self, path: &Path) -> Option<Id<Image>> {
        self.image_paths.get(path).copied()
    }

    /// Record that `path` was embedded as `image_id`, so later uses can share it
    pub fn remember_image(&mut self, path: &Path, image_id: Id<Image>) {
        self.image_paths.insert(path.to_path_buf(), image_id);
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// Pages in document order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.page_order.iter().filter_map(|id| self.pages.get(*id))
    }

    /// Write the entire document to the writer. Note: although this can write to arbitrary
    /// streams, the entire document is "rendered" in memory first. If you have a very large
    /// document, this could allocate a significant amount of memory. This limitation is due
    /// to the underlying pdf-writer implementation.
    pub fn write<W: Write>(self, mut w: W) -> Result<()> {
        let Document {
            info,
            pages,
            page_order,
            fonts,
            images,
            ..
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by position in the document, not arena index
        let page_refs: Vec<Ref> = page_order
            .iter()
            .enumerate()
            .map(|(i, _id)| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (i, font) in fonts.embedded().into_iter().enumerate() {
            font.write(&mut refs, i, &mut writer);
        }

        for (i, image) in images.iter() {
            image.write(&mut refs, i.index(), &mut writer);
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or_else(|| {
                ExportError::InvalidGeometry(format!("page {page_index} is missing"))
            })?;
            page.write(&mut refs, page_index, page_tree_id, &fonts, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice())?;
        Ok(())
    }
}
