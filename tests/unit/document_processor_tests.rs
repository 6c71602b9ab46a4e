/*!
 * Unit tests for DOCX package handling and text-run manipulation
 */

use doctrans::document_processor::{DocumentTree, DocxPackage, DOCUMENT_PART};
use doctrans::errors::DocumentError;

use crate::common::{self, WPML_NS};

#[test]
fn test_parse_shouldFindTextRunsInDocumentOrder() {
    let xml = common::document_xml(&["First", "Second", "Third"]);
    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.node_text(0), Some("First"));
    assert_eq!(tree.node_text(1), Some("Second"));
    assert_eq!(tree.node_text(2), Some("Third"));
    assert_eq!(tree.nodes()[2].index, 2);
}

#[test]
fn test_parse_shouldIgnoreTextElementsFromOtherNamespaces() {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\" xmlns:x=\"http://example.com/other\">\
         <w:body><w:p><w:r><w:t>real</w:t></w:r><x:t>fake</x:t></w:p></w:body>\
         </w:document>",
        WPML_NS
    );

    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.node_text(0), Some("real"));
}

#[test]
fn test_parse_shouldResolveDefaultNamespaceBindings() {
    // A text run bound to the WordprocessingML namespace without the w: prefix
    // is still a text run; the search resolves namespaces, not prefixes.
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>\
         <t xmlns=\"{}\">default-ns run</t>\
         </w:p></w:body></w:document>",
        WPML_NS, WPML_NS
    );

    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.node_text(0), Some("default-ns run"));
}

#[test]
fn test_parse_shouldCountEmptyRunElements() {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>\
         <w:r><w:t>before</w:t></w:r><w:r><w:t/></w:r><w:r><w:t>after</w:t></w:r>\
         </w:p></w:body></w:document>",
        WPML_NS
    );

    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.node_text(1), Some(""));
    assert!(tree.nodes()[1].is_whitespace());
    assert!(!tree.nodes()[0].is_whitespace());
}

#[test]
fn test_parse_shouldPreserveWhitespaceOnlyRuns() {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>\
         <w:r><w:t xml:space=\"preserve\">   </w:t></w:r>\
         </w:p></w:body></w:document>",
        WPML_NS
    );

    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.node_text(0), Some("   "));
    assert!(tree.nodes()[0].is_whitespace());
}

#[test]
fn test_parse_shouldUnescapeEntities() {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>\
         <w:r><w:t>Fish &amp; chips &lt;today&gt;</w:t></w:r>\
         </w:p></w:body></w:document>",
        WPML_NS
    );

    let tree = DocumentTree::parse(&xml).unwrap();

    assert_eq!(tree.node_text(0), Some("Fish & chips <today>"));
}

#[test]
fn test_setNodeText_shouldReplaceContentInSerializedOutput() {
    let xml = common::document_xml(&["Hello world"]);
    let mut tree = DocumentTree::parse(&xml).unwrap();

    tree.set_node_text(0, "Hola mundo").unwrap();
    let serialized = String::from_utf8(tree.serialize().unwrap()).unwrap();

    assert!(serialized.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(serialized.contains("<w:t>Hola mundo</w:t>"));
    assert!(!serialized.contains("Hello world"));
}

#[test]
fn test_setNodeText_shouldRejectOutOfRangeIndex() {
    let xml = common::document_xml(&["only one"]);
    let mut tree = DocumentTree::parse(&xml).unwrap();

    let result = tree.set_node_text(5, "nope");
    assert!(matches!(result, Err(DocumentError::InvalidStructure(_))));
}

#[test]
fn test_serialize_shouldEscapeReplacementText() {
    let xml = common::document_xml(&["plain"]);
    let mut tree = DocumentTree::parse(&xml).unwrap();

    tree.set_node_text(0, "a & b < c").unwrap();
    let serialized = String::from_utf8(tree.serialize().unwrap()).unwrap();

    assert!(serialized.contains("a &amp; b &lt; c"));
}

#[test]
fn test_serialize_shouldPreserveRunAttributes() {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>\
         <w:r><w:t xml:space=\"preserve\">keep me</w:t></w:r>\
         </w:p></w:body></w:document>",
        WPML_NS
    );
    let tree = DocumentTree::parse(&xml).unwrap();

    let serialized = String::from_utf8(tree.serialize().unwrap()).unwrap();
    assert!(serialized.contains("<w:t xml:space=\"preserve\">keep me</w:t>"));
}

#[test]
fn test_open_shouldFailOnNonArchiveFile() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("not-a-docx.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let result = DocxPackage::open(&path);
    assert!(matches!(result, Err(DocumentError::Zip(_))));
}

#[test]
fn test_open_shouldFailWhenDocumentPartMissing() {
    let dir = common::create_temp_dir().unwrap();

    // A valid archive that simply has no word/document.xml
    let path = dir.path().join("empty.docx");
    {
        use std::io::Write;
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(common::CONTENT_TYPES_XML.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    let result = DocxPackage::open(&path);
    match result {
        Err(DocumentError::MissingPart(part)) => assert_eq!(part, DOCUMENT_PART),
        other => panic!("Expected MissingPart, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_open_shouldFailOnMalformedXml() {
    let dir = common::create_temp_dir().unwrap();
    let xml = format!(
        "<w:document xmlns:w=\"{}\"><w:body><w:p></w:mismatch></w:body></w:document>",
        WPML_NS
    );
    let path = common::create_test_docx(dir.path(), "broken.docx", &xml, &[]).unwrap();

    let result = DocxPackage::open(&path);
    assert!(matches!(result, Err(DocumentError::Xml(_))));
}

#[test]
fn test_open_shouldExposePassThroughEntries() {
    let dir = common::create_temp_dir().unwrap();
    let styles = b"fake styles bytes".as_slice();
    let path = common::create_test_docx(
        dir.path(),
        "styled.docx",
        &common::document_xml(&["content"]),
        &[("word/styles.xml", styles)],
    )
    .unwrap();

    let package = DocxPackage::open(&path).unwrap();

    let names: Vec<_> = package.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", "word/styles.xml"]);
    assert_eq!(package.entries()[2].bytes, styles);
    assert_eq!(package.tree().node_count(), 1);
}

#[test]
fn test_write_shouldPreserveEntryNamesAndOrder() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_docx(
        dir.path(),
        "input.docx",
        &common::document_xml(&["body text"]),
        &[("word/media/image1.png", b"pngbytes".as_slice())],
    )
    .unwrap();

    let package = DocxPackage::open(&input).unwrap();
    let output = dir.path().join("output.docx");
    package.write(&output).unwrap();

    let input_names = common::archive_entry_names(&input).unwrap();
    let output_names = common::archive_entry_names(&output).unwrap();
    assert_eq!(input_names, output_names);
}

#[test]
fn test_write_shouldCopyPassThroughEntriesByteForByte() {
    let dir = common::create_temp_dir().unwrap();
    let media = b"\x89PNG fake image payload".as_slice();
    let input = common::create_test_docx(
        dir.path(),
        "input.docx",
        &common::document_xml(&["translate me"]),
        &[("word/media/image1.png", media)],
    )
    .unwrap();

    let mut package = DocxPackage::open(&input).unwrap();
    package.tree_mut().set_node_text(0, "übersetzt").unwrap();

    let output = dir.path().join("output.docx");
    package.write(&output).unwrap();

    assert_eq!(
        common::archive_entry_bytes(&output, "word/media/image1.png").unwrap(),
        media
    );
    assert_eq!(
        common::archive_entry_bytes(&output, "_rels/.rels").unwrap(),
        common::RELS_XML.as_bytes()
    );

    let body = String::from_utf8(
        common::archive_entry_bytes(&output, DOCUMENT_PART).unwrap(),
    )
    .unwrap();
    assert!(body.contains("übersetzt"));
    assert!(!body.contains("translate me"));
}

#[test]
fn test_write_shouldRoundTripUnmodifiedDocument() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_simple_docx(dir.path(), "input.docx", &["alpha", "beta"]).unwrap();

    let package = DocxPackage::open(&input).unwrap();
    let output = dir.path().join("output.docx");
    package.write(&output).unwrap();

    let reopened = DocxPackage::open(&output).unwrap();
    assert_eq!(reopened.tree().node_count(), 2);
    assert_eq!(reopened.tree().node_text(0), Some("alpha"));
    assert_eq!(reopened.tree().node_text(1), Some("beta"));
}
