use std::path::Path;

use resume_tailor_lib::core::document_parser::ResumeDocumentParser;
use resume_tailor_lib::core::models::RuntimeSettings;
use resume_tailor_lib::core::pdf::PdfTextExtractor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: parse_harness <path-to-resume.pdf|docx>");
        std::process::exit(1);
    }

    let path = &args[1];
    if !Path::new(path).exists() {
        eprintln!("File not found: {path}");
        std::process::exit(2);
    }

    let file_name = Path::new(path)
        .file_name()
        .and_then(|v| v.to_str())
        .unwrap_or("resume.pdf")
        .to_string();

    let bytes = tokio::fs::read(path).await?;

    let settings = RuntimeSettings::default();
    let parser =
        ResumeDocumentParser::new(PdfTextExtractor::new(), settings.max_file_size_bytes());

    let parsed = parser.parse_resume_bytes(&file_name, &bytes)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
