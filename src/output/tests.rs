use super::OutputWriter;
use crate::config::OutputConfig;
use crate::platform::ClipboardSink;
use tempfile::tempdir;

#[test]
fn output_writer_writes_to_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cookies.json");
    let writer = OutputWriter::new(OutputConfig {
        file: Some(path.clone()),
        print: false,
        silent: true,
    });
    writer.write("[]").expect("write");
    let written = std::fs::read_to_string(path).expect("read");
    assert_eq!(written, "[]");
}

#[tokio::test]
async fn output_writer_acts_as_clipboard_sink() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("export.json");
    let writer = OutputWriter::new(OutputConfig {
        file: Some(path.clone()),
        print: false,
        silent: true,
    });
    writer.write_text("{\"a\": 1}").await.expect("write");
    assert_eq!(std::fs::read_to_string(path).expect("read"), "{\"a\": 1}");
}

#[test]
fn output_writer_reports_unwritable_destination() {
    let temp = tempdir().expect("tempdir");
    let writer = OutputWriter::new(OutputConfig {
        file: Some(temp.path().join("missing").join("out.json")),
        print: false,
        silent: true,
    });
    assert!(writer.write("[]").is_err());
}
