//! Pipeline entry points

use std::time::Instant;

use tracing::{debug, info};

use crate::api::{Input, SegmentReport, TaggingSession};
use crate::config::SegmentationConfig;
use crate::domain::assembler::assemble;
use crate::domain::boundary::resolve;
use crate::domain::tokenizer::tokenize;
use crate::domain::tree::{MarkupTree, NodeKind};
use crate::error::{Error, Result};
use crate::markup;

/// Segmented markup together with its run statistics
#[derive(Debug, Clone)]
pub struct SegmentedMarkup {
    pub html: String,
    pub report: SegmentReport,
}

/// Reusable segmentation front end
///
/// Holds one validated configuration; every call works on its own token
/// stream, so a `Segmenter` can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    /// Segmenter with the default configuration (letter mode)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Segmenter for a list of mode names, other options at their defaults
    pub fn for_modes<I, S>(modes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = SegmentationConfig::builder().mode_names(modes)?.build()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Fresh session numbering from zero
    pub fn session(&self) -> TaggingSession {
        TaggingSession::new()
    }

    /// Segment the subtree under `root` in place
    pub fn segment<T: MarkupTree>(&self, tree: &mut T, root: T::Node) -> Result<SegmentReport> {
        self.segment_in(tree, root, &mut TaggingSession::new())
    }

    /// Segment the subtree under `root`, numbering wrappers from `session`
    pub fn segment_in<T: MarkupTree>(
        &self,
        tree: &mut T,
        root: T::Node,
        session: &mut TaggingSession,
    ) -> Result<SegmentReport> {
        run(&self.config, tree, root, session)
    }

    /// Parse, segment and serialize markup text
    pub fn segment_markup(&self, input: &str) -> Result<String> {
        let mut session = TaggingSession::new();
        self.process(Input::from_text(input), &mut session)
            .map(|segmented| segmented.html)
    }

    /// Read, segment and serialize any markup source within `session`
    pub fn process(&self, input: Input, session: &mut TaggingSession) -> Result<SegmentedMarkup> {
        let mut parsed = input.into_markup()?;
        let root = parsed.document.root();
        let report = self.segment_in(&mut parsed.document, root, session)?;
        let html = parsed.to_html()?;
        Ok(SegmentedMarkup { html, report })
    }
}

/// Segment the subtree under `root` with `config`, numbering from zero
pub fn segment<T: MarkupTree>(
    tree: &mut T,
    root: T::Node,
    config: &SegmentationConfig,
) -> Result<SegmentReport> {
    run(config, tree, root, &mut TaggingSession::new())
}

/// Parse `input`, segment it with `config` and serialize the result
pub fn segment_markup(input: &str, config: &SegmentationConfig) -> Result<String> {
    let mut parsed = markup::parse(input)?;
    let root = parsed.document.root();
    segment(&mut parsed.document, root, config)?;
    parsed.to_html()
}

fn run<T: MarkupTree>(
    config: &SegmentationConfig,
    tree: &mut T,
    root: T::Node,
    session: &mut TaggingSession,
) -> Result<SegmentReport> {
    match tree.kind(root) {
        NodeKind::Element | NodeKind::Fragment => {}
        kind => {
            return Err(Error::Configuration(format!(
                "segmentation root must be an element or a fragment, got {kind:?}"
            )))
        }
    }

    let started = Instant::now();

    let stream = tokenize(tree, root, config);
    if stream.is_empty() {
        debug!("no tokens under root");
        session.record_tree();
        return Ok(SegmentReport::empty());
    }

    let spans = resolve(&*tree, root, &stream, config);
    let resolved = spans.len();
    let assembly = assemble(tree, root, spans, &stream, config, session.counter_mut());
    session.record_tree();

    let report = SegmentReport::from_assembly(stream.len(), resolved, &assembly, started.elapsed());
    info!(
        modes = %config.modes(),
        tokens = report.tokens,
        wrappers = report.executed_spans,
        skipped = report.skipped_spans,
        "segmented tree"
    );
    Ok(report)
}
