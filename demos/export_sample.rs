use mdpress::{ConvertError, ConverterBuilder, DEFAULT_SAMPLE_DOCUMENT};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), ConvertError> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "mdpress=info");
        }
    }
    env_logger::init();

    // An optional Markdown file to convert instead of the built-in sample.
    let markdown = match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .map_err(|e| ConvertError::Config(format!("cannot read '{}': {}", path, e)))?;
            println!("✓ Loaded {}", path);
            text
        }
        None => DEFAULT_SAMPLE_DOCUMENT.to_string(),
    };

    let converter = ConverterBuilder::new()
        .with_initial_document(markdown)
        .with_output_dir("output")
        .build()?;
    println!("✓ Converter built. Output name: {}", converter.display_filename());

    converter.refresh().wait().await?;
    println!("✓ Preview rendered ({} lines of Markdown).", converter.line_count());

    let saved = converter.export_pdf().await?;
    match saved.path {
        Some(path) => println!("\nSuccess! Generated {} ({} pages)", path.display(), saved.page_count),
        None => println!("\nSuccess! Generated {}", saved.filename),
    }
    Ok(())
}
