//! Message bodies with bold/strikethrough spans.
//!
//! Telegram measures entity offsets in UTF-16 code units, so the builder keeps
//! a running UTF-16 length next to the text and records every span against
//! it. Nothing here knows about the wire format of entities.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanStyle {
    Bold,
    Strikethrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub style: SpanStyle,
    /// UTF-16 code units from the start of the text.
    pub offset: usize,
    /// UTF-16 code units.
    pub length: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichText {
    text: String,
    utf16_len: usize,
    spans: Vec<Span>,
}

pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut out = Self::new();
        out.push(&text.into());
        out
    }

    pub fn push(&mut self, segment: &str) -> &mut Self {
        self.text.push_str(segment);
        self.utf16_len += utf16_len(segment);
        self
    }

    pub fn push_styled(&mut self, style: SpanStyle, segment: &str) -> &mut Self {
        self.styled(style, |text| {
            text.push(segment);
        })
    }

    /// Runs `build` and records one span over everything it appended.
    /// Empty regions produce no span.
    pub fn styled<F>(&mut self, style: SpanStyle, build: F) -> &mut Self
    where
        F: FnOnce(&mut RichText),
    {
        let before = self.utf16_len;
        build(self);
        let length = self.utf16_len - before;
        if length > 0 {
            self.spans.push(Span {
                style,
                offset: before,
                length,
            });
        }
        self
    }

    /// Appends another body, shifting its spans past the current end.
    pub fn append(&mut self, other: RichText) -> &mut Self {
        let shift = self.utf16_len;
        self.text.push_str(&other.text);
        self.utf16_len += other.utf16_len;
        self.spans.extend(other.spans.into_iter().map(|span| Span {
            offset: span.offset + shift,
            ..span
        }));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn utf16_len(&self) -> usize {
        self.utf16_len
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Styled(SpanStyle, &'a str),
}

pub fn render(segments: &[Segment<'_>]) -> RichText {
    let mut out = RichText::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                out.push(text);
            }
            Segment::Styled(style, text) => {
                out.push_styled(*style, text);
            }
        }
    }
    out
}
