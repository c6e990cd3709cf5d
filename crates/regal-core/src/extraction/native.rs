use crate::error::RegalError;
use crate::extraction::{
    DrawOp, PageContent, PaintTarget, PdfExtractor, PositionedFragment, TextPart,
};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// PDF extraction backend that reads content streams with lopdf.
///
/// Positions come from a reduced text-state machine: the text matrix and
/// the current transformation matrix are tracked, glyph widths are
/// approximated from the font size.
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        LopdfExtractor
    }
}

impl Default for LopdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, RegalError> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| RegalError::Extraction(format!("failed to load PDF: {e}")))?;
        pages_from_document(&doc)
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}

/// Interpret every page of a loaded document, in page order.
pub fn pages_from_document(doc: &Document) -> Result<Vec<PageContent>, RegalError> {
    let mut pages = Vec::new();
    for (&page_number, &page_id) in doc.get_pages().iter() {
        let raw = doc.get_page_content(page_id).map_err(|e| {
            RegalError::Extraction(format!("page {page_number}: no content stream: {e}"))
        })?;
        let content = Content::decode(&raw).map_err(|e| {
            RegalError::Extraction(format!("page {page_number}: undecodable content: {e}"))
        })?;

        let mut interpreter = Interpreter::new(page_number as usize, Some(doc));
        interpreter.run(&content.operations, page_resources(doc, page_id), 0);
        let page = interpreter.page;

        tracing::debug!(
            page = page_number,
            fragments = page.fragments.len(),
            ops = page.ops.len(),
            "extracted page content"
        );
        pages.push(page);
    }

    Ok(pages)
}

/// Form XObjects nested deeper than this are not drawn.
const MAX_FORM_DEPTH: usize = 8;

/// Bound on the page tree walk when looking for inherited resources.
const MAX_TREE_DEPTH: usize = 32;

/// Average glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` followed by `n`, in PDF row-vector convention.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Origin of the next glyph in page space.
    fn origin(&self) -> (f32, f32) {
        let m = multiply(&self.text_matrix, &self.ctm);
        (m[4], m[5])
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn advance(&mut self, dx: f32) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, dx, 0.0], &self.text_matrix);
    }

    fn advance_text(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|c| {
                let w = self.font_size * APPROX_CHAR_WIDTH_RATIO + self.char_spacing;
                if c == ' ' {
                    w + self.word_spacing
                } else {
                    w
                }
            })
            .sum();
        self.advance(dx);
    }
}

/// Turn a page's decoded operations into positioned fragments and the
/// colour/text operation stream. XObjects cannot be resolved without the
/// document, so `Do` is skipped here.
pub fn interpret_operations(page_number: usize, operations: &[Operation]) -> PageContent {
    let mut interpreter = Interpreter::new(page_number, None);
    interpreter.run(operations, None, 0);
    interpreter.page
}

struct Interpreter<'a> {
    doc: Option<&'a Document>,
    state: TextState,
    page: PageContent,
}

impl<'a> Interpreter<'a> {
    fn new(page_number: usize, doc: Option<&'a Document>) -> Self {
        Self {
            doc,
            state: TextState::default(),
            page: PageContent {
                page_number,
                ..PageContent::default()
            },
        }
    }

    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for op in operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => self.state.ctm_stack.push(self.state.ctm),
                "Q" => {
                    if let Some(ctm) = self.state.ctm_stack.pop() {
                        self.state.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operand(operands) {
                        self.state.ctm = multiply(&m, &self.state.ctm);
                    }
                }
                "BT" => {
                    self.state.text_matrix = IDENTITY;
                    self.state.line_matrix = IDENTITY;
                }
                "Tf" => {
                    if let Some(size) = operands.get(1).and_then(number) {
                        self.state.font_size = size;
                    }
                }
                "Tc" => {
                    if let Some(v) = operands.first().and_then(number) {
                        self.state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = operands.first().and_then(number) {
                        self.state.word_spacing = v;
                    }
                }
                "TL" => {
                    if let Some(v) = operands.first().and_then(number) {
                        self.state.leading = v;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operand(operands) {
                        self.state.text_matrix = m;
                        self.state.line_matrix = m;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (
                        operands.first().and_then(number),
                        operands.get(1).and_then(number),
                    ) {
                        if op.operator == "TD" {
                            self.state.leading = -ty;
                        }
                        self.state.translate_line(tx, ty);
                    }
                }
                "T*" => self.state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        show_text(decode_pdf_string(bytes), &mut self.state, &mut self.page);
                    }
                }
                "'" => {
                    self.state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        show_text(decode_pdf_string(bytes), &mut self.state, &mut self.page);
                    }
                }
                "\"" => {
                    if let Some(aw) = operands.first().and_then(number) {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = operands.get(1).and_then(number) {
                        self.state.char_spacing = ac;
                    }
                    self.state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        show_text(decode_pdf_string(bytes), &mut self.state, &mut self.page);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        show_spaced_text(items, &mut self.state, &mut self.page);
                    }
                }
                "rg" | "RG" | "g" | "G" | "k" | "K" | "sc" | "SC" | "scn" | "SCN" => {
                    if let Some((r, g, b)) = color_operands(&op.operator, operands) {
                        let target = if op.operator.chars().all(|c| c.is_ascii_uppercase()) {
                            PaintTarget::Stroke
                        } else {
                            PaintTarget::Fill
                        };
                        self.page.ops.push(DrawOp::SetColor { target, r, g, b });
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_form(name, resources, depth);
                    }
                }
                _ => {}
            }
        }
    }

    /// Draw a Form XObject: its stream runs under the current CTM
    /// concatenated with the form's `/Matrix`, with its own resources when
    /// it has them.
    fn draw_form(&mut self, name: &[u8], resources: Option<&'a Dictionary>, depth: usize) {
        let Some(doc) = self.doc else {
            return;
        };
        if depth >= MAX_FORM_DEPTH {
            tracing::debug!(page = self.page.page_number, depth, "form nesting too deep, skipped");
            return;
        }

        let Some(stream) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| resolve(doc, x))
            .and_then(|x| x.as_dict().ok())
            .and_then(|x| x.get(name).ok())
            .and_then(|x| resolve(doc, x))
            .and_then(|x| x.as_stream().ok())
        else {
            tracing::trace!(
                page = self.page.page_number,
                xobject = %String::from_utf8_lossy(name),
                "xobject not found"
            );
            return;
        };

        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        if subtype != Some(b"Form".as_slice()) {
            return;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(
                    page = self.page.page_number,
                    xobject = %String::from_utf8_lossy(name),
                    error = %e,
                    "undecodable form content, skipped"
                );
                return;
            }
        };

        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve(doc, r))
            .and_then(|r| r.as_dict().ok())
            .or(resources);
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| resolve(doc, m))
            .and_then(|m| m.as_array().ok())
            .and_then(|m| matrix_operand(m))
            .unwrap_or(IDENTITY);

        let saved_ctm = self.state.ctm;
        let saved_stack = self.state.ctm_stack.len();
        self.state.ctm = multiply(&matrix, &saved_ctm);
        self.run(&content.operations, form_resources, depth + 1);
        self.state.ctm_stack.truncate(saved_stack);
        self.state.ctm = saved_ctm;
    }
}

/// Follow an indirect reference, if any.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resources of a page, inherited from the nearest ancestor that has them.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let own = node
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve(doc, r))
            .and_then(|r| r.as_dict().ok());
        if own.is_some() {
            return own;
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn show_text(text: String, state: &mut TextState, page: &mut PageContent) {
    let (x, y) = state.origin();
    state.advance_text(&text);
    if !text.is_empty() {
        page.fragments.push(PositionedFragment::new(text.clone(), x, y));
    }
    page.ops.push(DrawOp::ShowText { text });
}

fn show_spaced_text(items: &[Object], state: &mut TextState, page: &mut PageContent) {
    let (x, y) = state.origin();
    let mut parts = Vec::with_capacity(items.len());
    let mut joined = String::new();

    for item in items {
        match item {
            Object::String(bytes, _) => {
                let text = decode_pdf_string(bytes);
                state.advance_text(&text);
                joined.push_str(&text);
                parts.push(TextPart::Text(text));
            }
            other => {
                if let Some(adjust) = number(other) {
                    // adjustments are in thousandths of text space, subtracted
                    state.advance(-adjust / 1000.0 * state.font_size);
                    parts.push(TextPart::Adjust(adjust));
                }
            }
        }
    }

    if !joined.is_empty() {
        page.fragments.push(PositionedFragment::new(joined, x, y));
    }
    page.ops.push(DrawOp::ShowSpacedText { parts });
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let vals: Vec<f32> = operands.iter().take(6).filter_map(number).collect();
    match vals.as_slice() {
        &[a, b, c, d, e, f] => Some([a, b, c, d, e, f]),
        _ => None,
    }
}

/// RGB triple for a colour-setting operator, if its operands describe one.
fn color_operands(operator: &str, operands: &[Object]) -> Option<(f32, f32, f32)> {
    let vals: Vec<f32> = operands.iter().filter_map(number).collect();
    if vals.len() != operands.len() {
        // pattern names and other non-numeric operands
        return None;
    }
    match (operator, vals.as_slice()) {
        ("g" | "G", &[v]) => Some((v, v, v)),
        ("k" | "K", &[c, m, y, k]) => Some(((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))),
        ("rg" | "RG" | "sc" | "SC" | "scn" | "SCN", &[r, g, b]) => Some((r, g, b)),
        _ => None,
    }
}

/// Decode a PDF string: UTF-16BE with byte-order mark, then UTF-8, then
/// Latin-1.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
