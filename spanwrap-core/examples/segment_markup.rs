//! Example of segmenting markup with the library API

use spanwrap_core::{Input, SegmentationConfig, Segmenter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example 1: letters with the default configuration
    println!("=== Example 1: Letters ===");
    let html = Segmenter::new().segment_markup("dog")?;
    println!("{html}");

    // Example 2: words around inline markup
    println!("\n=== Example 2: Words ===");
    let segmenter = Segmenter::for_modes(["word", "space"])?;
    let html = segmenter.segment_markup("The <strong>quick</strong> brown fox")?;
    println!("{html}");

    // Example 3: custom configuration with labels
    println!("\n=== Example 3: Sentences with labels ===");
    let config = SegmentationConfig::builder()
        .mode_names(["sentence", "word"])?
        .wrapper_tag("span")
        .use_labels(true)
        .build()?;
    let segmenter = Segmenter::with_config(config);
    let mut session = segmenter.session();
    for text in ["<p>Wait!! Really?</p>", "<p>Yes. Really.</p>"] {
        let segmented = segmenter.process(Input::from_text(text), &mut session)?;
        println!("{}", segmented.html);
        println!(
            "  {} sentences, {} words, identifiers {:?}",
            segmented.report.kinds.sentence,
            segmented.report.kinds.word,
            segmented.report.identifiers
        );
    }

    Ok(())
}
