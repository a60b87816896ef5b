use crate::{
    refs::{ObjectReferences, RefType},
    ExportError, Pt,
};
use owned_ttf_parser::{AsFaceRef, Face, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// A parsed TTF or OTF font. Fonts are embedded in their entirety in the generated PDF, so
/// large CJK fonts will dramatically increase the size of the output.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, ExportError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn scaling(&self, size: Pt) -> f32 {
        size.0 / self.face().units_per_em() as f32
    }

    fn name_entry(&self, id: u16) -> Option<String> {
        self.face()
            .names()
            .into_iter()
            .find(|name| name.name_id == id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// The full name of the font, if it carries one
    pub fn name(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
    }

    /// The family name of the font, if it carries one
    pub fn family(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        Pt(self.scaling(size) * self.face().ascender() as f32)
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given font size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        Pt(self.scaling(size) * self.face().descender() as f32)
    }

    /// Calculate the leading (extra space between lines) for the given font size
    pub fn leading(&self, size: Pt) -> Pt {
        Pt(self.scaling(size) * self.face().line_gap() as f32)
    }

    /// Calculate the default line height of the font for the given size. The returned value is
    /// how much to vertically offset a second row of text below a first row of text.
    pub fn line_height(&self, size: Pt) -> Pt {
        self.leading(size) + self.ascent(size) - self.descent(size)
    }

    /// Horizontal advance of a single character, falling back to the replacement glyph (and
    /// then to `.notdef`) for characters the font does not cover
    pub fn advance(&self, ch: char, size: Pt) -> Pt {
        let gid = GlyphId(self.glyph_id_or_fallback(ch));
        Pt(self.scaling(size) * self.face().glyph_hor_advance(gid).unwrap_or_default() as f32)
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}').or_else(|| self.glyph_id('?'))
    }

    pub fn glyph_id_or_fallback(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.replacement_glyph_id())
            .unwrap_or(0)
    }

    /// Maps glyph ids back to the characters that produce them, from every unicode cmap
    /// subtable in the font
    fn glyph_chars(&self) -> BTreeMap<u16, char> {
        let mut map: BTreeMap<u16, char> = BTreeMap::new();
        let Some(cmap) = self.face().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// Advance widths and heights (in font units) of every mapped glyph
    fn glyph_metrics(&self, glyphs: &BTreeMap<u16, char>) -> BTreeMap<u16, (u16, i16)> {
        let face = self.face();
        glyphs
            .keys()
            .filter_map(|&gid| {
                let id = GlyphId(gid);
                let advance = face.glyph_hor_advance(id)?;
                let height = face
                    .glyph_bounding_box(id)
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                Some((gid, (advance, height)))
            })
            .collect()
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let metrics = self.glyph_metrics(&self.glyph_chars());
        let scaling = 1000.0 / self.face().units_per_em() as f32;

        // the most frequent advance becomes the default width
        let mut width_counts: HashMap<u16, usize> = HashMap::new();
        for &(width, _) in metrics.values() {
            *width_counts.entry(width).or_insert(0) += 1;
        }
        let default_width = width_counts
            .iter()
            .max_by_key(|&(width, count)| (*count, *width))
            .map(|(&width, _)| width as f32 * scaling)
            .unwrap_or(1000.0);

        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);

        // consecutive glyph ids are written as a single run
        let mut run_start: Option<u16> = None;
        let mut run: Vec<f32> = Vec::new();
        for (&gid, &(width, _)) in metrics.iter() {
            match run_start {
                Some(start) if gid as usize == start as usize + run.len() => {}
                Some(start) => {
                    widths.consecutive(start, run.drain(..));
                    run_start = Some(gid);
                }
                None => run_start = Some(gid),
            }
            run.push(width as f32 * scaling);
        }
        if let Some(start) = run_start {
            widths.consecutive(start, run.drain(..));
        }
        widths.finish();

        cid_font.default_width(default_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));

        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);

        let metrics = self.glyph_metrics(&self.glyph_chars());
        let max_width = metrics.values().map(|&(w, _)| w).max().unwrap_or_default();
        let max_height = metrics.values().map(|&(_, h)| h).max().unwrap_or_default();
        let sum_width: usize = metrics.values().map(|&(w, _)| w as usize).sum();
        let avg_width = sum_width as f32 / metrics.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));
        let face = self.face();
        let scaling = 1000.0 / face.units_per_em() as f32;
        let name = self.name().unwrap_or_else(|| format!("F{font_index}"));
        // PDF names cannot carry spaces
        let name = name.replace(' ', "-");

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.as_bytes()));
        if let Some(family) = self.family() {
            descriptor.family(Str(family.as_bytes()));
        }
        descriptor.weight(face.weight().to_number());

        let mut flags: FontFlags = FontFlags::empty();
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        flags.set(FontFlags::SYMBOLIC, true);
        descriptor.flags(flags);

        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: face.descender() as f32 * scaling,
            x2: max_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(
            face.tables()
                .post
                .as_ref()
                .map(|post| post.italic_angle)
                .unwrap_or_default(),
        );
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        let cap_height = face.capital_height().map(|h| h as f32 * scaling);
        descriptor.cap_height(cap_height.unwrap_or(1000.0));
        descriptor.x_height(
            face.x_height()
                .map(|h| h as f32 * scaling)
                .or(cap_height)
                .unwrap_or_default(),
        );
        // TODO: derive the dominant stem width from the OS/2 weight class instead of assuming 80
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        // bfchar blocks hold at most 100 entries and share a common high byte
        let glyphs: Vec<(u16, char)> = self.glyph_chars().into_iter().collect();
        let mut blocks: Vec<&[(u16, char)]> = Vec::new();
        let mut start = 0;
        for i in 1..=glyphs.len() {
            let split = i == glyphs.len()
                || i - start >= 100
                || (glyphs[i].0 >> 8) != (glyphs[start].0 >> 8);
            if split {
                blocks.push(&glyphs[start..i]);
                start = i;
            }
        }

        for block in blocks {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for &(gid, ch) in block {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04x}"))
                    .collect();
                map.push_str(&format!("<{gid:04x}> <{units}>\n"));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }
}

/// The logical typefaces a layout can ask for
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Note content, positions and book metadata
    Body,
    /// Ideas
    Bold,
    /// The book title
    Title,
}

/// The fonts used by a document, keyed by [FontFace]. Faces without a dedicated font fall back
/// to the body font. Fonts are shared between the measurer and the document sink, hence the
/// reference counting.
#[derive(Clone, Default)]
pub struct FontSet {
    body: Option<Rc<Font>>,
    bold: Option<Rc<Font>>,
    title: Option<Rc<Font>>,
}

impl FontSet {
    pub fn new(body: Font) -> FontSet {
        FontSet {
            body: Some(Rc::new(body)),
            ..FontSet::default()
        }
    }

    pub fn with_bold(mut self, font: Font) -> FontSet {
        self.bold = Some(Rc::new(font));
        self
    }

    pub fn with_title(mut self, font: Font) -> FontSet {
        self.title = Some(Rc::new(font));
        self
    }

    fn slot(&self, face: FontFace) -> Option<&Rc<Font>> {
        match face {
            FontFace::Body => self.body.as_ref(),
            FontFace::Bold => self.bold.as_ref(),
            FontFace::Title => self.title.as_ref(),
        }
    }

    /// The font drawing `face`, falling back to the body font
    pub fn get(&self, face: FontFace) -> Option<&Font> {
        self.slot(face).or(self.body.as_ref()).map(Rc::as_ref)
    }

    /// Loaded fonts in the order they are embedded
    pub(crate) fn embedded(&self) -> Vec<&Font> {
        [FontFace::Body, FontFace::Bold, FontFace::Title]
            .into_iter()
            .filter_map(|face| self.slot(face).map(Rc::as_ref))
            .collect()
    }

    /// The resource index (`/F{n}`) a face is drawn with
    pub(crate) fn resource_index(&self, face: FontFace) -> Option<usize> {
        let position = |face: FontFace| {
            [FontFace::Body, FontFace::Bold, FontFace::Title]
                .into_iter()
                .filter(|f| self.slot(*f).is_some())
                .position(|f| f == face)
        };
        if self.slot(face).is_some() {
            position(face)
        } else if self.body.is_some() {
            position(FontFace::Body)
        } else {
            None
        }
    }
}
