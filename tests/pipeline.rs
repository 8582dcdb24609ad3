//! End-to-end pipeline tests with a mocked chat backend.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdflabel::config::Settings;
use pdflabel::llm::{ChatBackend, LlmConfig, LlmError};
use pdflabel::services::LabelPipeline;

/// Backend that always answers with a fixed response and counts invocations.
struct FixedBackend {
    response: String,
    calls: AtomicUsize,
}

impl FixedBackend {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for FixedBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Build a minimal one-page PDF containing the given text.
fn write_sample_pdf(path: &Path, text: &str) {
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

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content stream"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).expect("save sample pdf");
}

fn test_settings(input: &Path, output: &Path) -> Settings {
    Settings {
        input_dir: input.to_path_buf(),
        output_path: output.to_path_buf(),
        page_limit: 2,
        doc_limit: 0,
    }
}

#[tokio::test]
async fn labels_a_directory_of_pdfs() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("pdf_labels.csv");

    write_sample_pdf(&input.path().join("sample.pdf"), "Neural architecture search");
    std::fs::write(input.path().join("empty.pdf"), b"").unwrap();
    std::fs::write(input.path().join("notes.txt"), b"not a pdf").unwrap();

    let backend = FixedBackend::new("Deep Learning, Neural Networks, Computer Vision, Robotics");
    let settings = test_settings(input.path(), &output_path);
    let llm_config = LlmConfig::default();

    let pipeline = LabelPipeline::new(&settings, &llm_config, &backend);
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.labeled, 1);
    assert_eq!(summary.empty, 1);
    assert_eq!(summary.failed, 0);

    // The zero-byte file short-circuits, so only one document reaches the backend
    assert_eq!(backend.calls(), 1);

    let contents = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(
        contents,
        "PDF File,Labels\n\
         empty.pdf,No text found\n\
         sample.pdf,\"Deep Learning, Neural Networks, Computer Vision\"\n"
    );
}

#[tokio::test]
async fn reruns_produce_identical_tables() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("pdf_labels.csv");

    write_sample_pdf(&input.path().join("a.pdf"), "Gradient descent methods");
    write_sample_pdf(&input.path().join("b.pdf"), "Text mining overview");

    let backend = FixedBackend::new("one, two, three");
    let settings = test_settings(input.path(), &output_path);
    let llm_config = LlmConfig::default();
    let pipeline = LabelPipeline::new(&settings, &llm_config, &backend);

    pipeline.run().await.unwrap();
    let first = std::fs::read_to_string(&output_path).unwrap();

    pipeline.run().await.unwrap();
    let second = std::fs::read_to_string(&output_path).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_directory_writes_header_only() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("pdf_labels.csv");

    let backend = FixedBackend::new("unused");
    let settings = test_settings(input.path(), &output_path);
    let llm_config = LlmConfig::default();

    let pipeline = LabelPipeline::new(&settings, &llm_config, &backend);
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(backend.calls(), 0);

    let contents = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(contents, "PDF File,Labels\n");
}

#[tokio::test]
async fn export_failure_fails_the_run() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_sample_pdf(&input.path().join("a.pdf"), "Support vector machines");

    // The output parent "directory" is a regular file, so the write must fail
    let blocker = output.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let output_path = blocker.join("pdf_labels.csv");

    let backend = FixedBackend::new("one, two, three");
    let settings = test_settings(input.path(), &output_path);
    let llm_config = LlmConfig::default();

    let pipeline = LabelPipeline::new(&settings, &llm_config, &backend);
    assert!(pipeline.run().await.is_err());
}

#[tokio::test]
async fn missing_input_directory_fails() {
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("pdf_labels.csv");

    let backend = FixedBackend::new("unused");
    let settings = test_settings(Path::new("no/such/dir"), &output_path);
    let llm_config = LlmConfig::default();

    let pipeline = LabelPipeline::new(&settings, &llm_config, &backend);
    assert!(pipeline.run().await.is_err());
    assert!(!output_path.exists());
}

#[test]
fn sample_pdf_roundtrips_through_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    write_sample_pdf(&path, "Hello World");

    let text = pdflabel::extract::extract_text(&path, 2);
    assert!(text.contains("Hello World"), "extracted: {:?}", text);
}
