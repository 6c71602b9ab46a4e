use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::errors::DocumentError;

// @module: DOCX package processing and text-run manipulation

/// Archive entry holding the document's visible text structure
pub const DOCUMENT_PART: &str = "word/document.xml";

/// WordprocessingML main namespace; text runs live in `<w:t>` elements bound
/// to this namespace. Matching on the prefix alone would miss re-bound
/// prefixes and count look-alike elements from sibling namespaces.
const WORDPROCESSING_NS: &[u8] =
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

// @struct: One pass-through archive entry (name + raw bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    // @field: Entry name inside the archive
    pub name: String,

    // @field: Raw entry bytes, untouched
    pub bytes: Vec<u8>,
}

/// A single text run inside the document body
///
/// The handle stays valid for one processing run; it is consumed when the
/// tree is serialized.
#[derive(Debug, Clone)]
pub struct TextNode {
    /// Position within the node sequence, used for progress accounting
    pub index: usize,

    /// Current text content
    text: String,
}

impl TextNode {
    fn new(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
        }
    }

    /// Current text content of the run
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the run carries no translatable content
    pub fn is_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One element of the rebuilt event stream: either an untouched XML event or
/// the slot where a text run's current content is emitted.
enum DocEvent {
    Raw(Event<'static>),
    TextSlot(usize),
}

/// Parsed, mutable representation of the document body part
///
/// The XML is held as an owned event stream; text-run content is lifted out
/// into indexed nodes so it can be replaced without disturbing any markup,
/// attributes, or whitespace around it.
pub struct DocumentTree {
    events: Vec<DocEvent>,
    nodes: Vec<TextNode>,
}

impl DocumentTree {
    /// Parse the document body XML.
    ///
    /// Performs a namespace-qualified descendant search for text runs:
    /// an element counts only if its resolved namespace is the
    /// WordprocessingML main namespace and its local name is `t`.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = NsReader::from_str(xml);
        let mut events: Vec<DocEvent> = Vec::new();
        let mut nodes: Vec<TextNode> = Vec::new();
        let mut current_node: Option<usize> = None;

        loop {
            match reader.read_resolved_event()? {
                (_, Event::Eof) => break,

                // The declaration is regenerated on serialization
                (_, Event::Decl(_)) => {}

                (resolve, Event::Start(e)) => {
                    let text_run = is_text_run(&resolve, e.local_name().as_ref());
                    events.push(DocEvent::Raw(Event::Start(e.into_owned())));

                    if text_run {
                        let index = nodes.len();
                        nodes.push(TextNode::new(index));
                        events.push(DocEvent::TextSlot(index));
                        current_node = Some(index);
                    }
                }

                (resolve, Event::Empty(e)) => {
                    if is_text_run(&resolve, e.local_name().as_ref()) {
                        // An empty run still occupies a position in the node
                        // sequence; expand it so the slot exists.
                        let qualified = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        let index = nodes.len();
                        nodes.push(TextNode::new(index));

                        events.push(DocEvent::Raw(Event::Start(e.into_owned())));
                        events.push(DocEvent::TextSlot(index));
                        events.push(DocEvent::Raw(Event::End(BytesEnd::new(qualified))));
                    } else {
                        events.push(DocEvent::Raw(Event::Empty(e.into_owned())));
                    }
                }

                (resolve, Event::End(e)) => {
                    if current_node.is_some() && is_text_run(&resolve, e.local_name().as_ref()) {
                        current_node = None;
                    }
                    events.push(DocEvent::Raw(Event::End(e.into_owned())));
                }

                (_, Event::Text(t)) => match current_node {
                    Some(node) => nodes[node].text.push_str(&t.unescape()?),
                    None => events.push(DocEvent::Raw(Event::Text(t.into_owned()))),
                },

                (_, Event::CData(c)) => match current_node {
                    Some(node) => nodes[node]
                        .text
                        .push_str(&String::from_utf8_lossy(c.as_ref())),
                    None => events.push(DocEvent::Raw(Event::CData(c.into_owned()))),
                },

                (_, other) => events.push(DocEvent::Raw(other.into_owned())),
            }
        }

        debug!("Parsed document body: {} text runs", nodes.len());

        Ok(Self { events, nodes })
    }

    /// Number of text runs in document order
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The ordered sequence of text runs
    pub fn nodes(&self) -> &[TextNode] {
        &self.nodes
    }

    /// Text content of the run at the given position
    pub fn node_text(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|n| n.text())
    }

    /// Replace the text content of the run at the given position
    pub fn set_node_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), DocumentError> {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.text = text.into();
                Ok(())
            }
            None => Err(DocumentError::InvalidStructure(format!(
                "No text run at position {}",
                index
            ))),
        }
    }

    /// Serialize the tree back to XML with a declaration header.
    ///
    /// Every event outside the text slots is written back unchanged; slots
    /// emit the node's current text with XML escaping applied.
    pub fn serialize(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| DocumentError::Write(e.to_string()))?;

        for event in &self.events {
            let result = match event {
                DocEvent::Raw(e) => writer.write_event(e.clone()),
                DocEvent::TextSlot(index) => {
                    writer.write_event(Event::Text(BytesText::new(self.nodes[*index].text())))
                }
            };

            result.map_err(|e| DocumentError::Write(e.to_string()))?;
        }

        Ok(writer.into_inner().into_inner())
    }
}

/// True iff the element is a WordprocessingML text run
fn is_text_run(resolve: &ResolveResult, local_name: &[u8]) -> bool {
    matches!(resolve, ResolveResult::Bound(Namespace(ns)) if *ns == WORDPROCESSING_NS)
        && local_name == b"t"
}

/// An opened DOCX package: the parsed body tree plus every other entry's
/// raw bytes, ready for selective rewriting.
pub struct DocxPackage {
    tree: DocumentTree,
    entries: Vec<ArchiveEntry>,
    /// Index among the pass-through entries where the body part sat
    document_position: usize,
}

impl DocxPackage {
    /// Open a package and extract the document body.
    ///
    /// Every entry other than the body part is read into memory verbatim;
    /// the body part is parsed into a mutable tree.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let file = File::open(path.as_ref())?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut entries = Vec::new();
        let mut document_xml: Option<String> = None;
        let mut document_position = 0;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;

            if name == DOCUMENT_PART {
                document_position = entries.len();
                let xml = String::from_utf8(bytes).map_err(|e| {
                    DocumentError::InvalidStructure(format!(
                        "Document part is not valid UTF-8: {}",
                        e
                    ))
                })?;
                document_xml = Some(xml);
            } else {
                entries.push(ArchiveEntry { name, bytes });
            }
        }

        let xml =
            document_xml.ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;
        let tree = DocumentTree::parse(&xml)?;

        debug!(
            "Opened package {:?}: {} pass-through entries, {} text runs",
            path.as_ref(),
            entries.len(),
            tree.node_count()
        );

        Ok(Self {
            tree,
            entries,
            document_position,
        })
    }

    /// The parsed document body
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Mutable access to the document body
    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    /// The pass-through entries, in original archive order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Write a new archive at the given path.
    ///
    /// Pass-through entries keep their original names, bytes, and relative
    /// order; the body part is re-serialized from the tree and written at
    /// its original position.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let body = self.tree.serialize()?;

        let file = File::create(path.as_ref())?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        let mut document_written = false;
        for (i, entry) in self.entries.iter().enumerate() {
            if i == self.document_position {
                write_entry(&mut zip, DOCUMENT_PART, &body, options)?;
                document_written = true;
            }
            write_entry(&mut zip, &entry.name, &entry.bytes, options)?;
        }
        if !document_written {
            write_entry(&mut zip, DOCUMENT_PART, &body, options)?;
        }

        zip.finish()?;

        debug!("Wrote package {:?}", path.as_ref());
        Ok(())
    }
}

fn write_entry(
    zip: &mut ZipWriter<File>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), DocumentError> {
    zip.start_file(name, options)?;
    zip.write_all(bytes)?;
    Ok(())
}
