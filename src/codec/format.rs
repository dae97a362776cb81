//! Container/codec negotiation.

use super::CodecError;

/// Formats tried in order of preference.
pub const CANDIDATE_FORMATS: &[&str] = &[
    r#"video/mp4; codecs="avc1.42E01E, mp4a.40.2""#,
    r#"video/mp4; codecs="avc1, mp4a.40.2""#,
    "video/mp4",
    r#"video/webm; codecs="vp8, opus""#,
    "video/webm; codecs=vp8",
    "video/webm",
];

/// Something that can tell whether it handles a MIME type.
pub trait FormatSupport {
    /// True if `mime` can be recorded or played.
    fn supports(&self, mime: &str) -> bool;
}

impl<F> FormatSupport for F
where
    F: Fn(&str) -> bool,
{
    fn supports(&self, mime: &str) -> bool {
        self(mime)
    }
}

/// A MIME type accepted by both the recorder and the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFormat {
    mime: String,
}

impl MediaFormat {
    /// Wraps a MIME type string.
    pub fn new(mime: impl Into<String>) -> Self {
        Self { mime: mime.into() }
    }

    /// Full MIME type including codec parameters.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Container name, e.g. `mp4` or `webm`.
    pub fn container(&self) -> &str {
        let essence = self.mime.split(';').next().unwrap_or_default().trim();
        essence.rsplit('/').next().unwrap_or(essence)
    }
}

/// Picks the first candidate both sides support.
pub fn negotiate_format(
    candidates: &[&str],
    recorder: &dyn FormatSupport,
    sink: &dyn FormatSupport,
) -> Result<MediaFormat, CodecError> {
    let mime = candidates
        .iter()
        .find(|mime| recorder.supports(mime) && sink.supports(mime))
        .ok_or(CodecError::UnsupportedFormat)?;

    tracing::info!(mime = %mime, "Selected media format");
    Ok(MediaFormat::new(*mime))
}
