use crate::FrameSource;

/// A single still image seen as a one-frame stream.
pub struct StillImage<F> {
    frame: Option<F>,
    opened: bool,
}

impl<F> StillImage<F> {
    pub fn new(frame: F) -> Self {
        Self {
            frame: Some(frame),
            opened: true,
        }
    }

    /// An image that failed to load
    pub fn missing() -> Self {
        Self {
            frame: None,
            opened: false,
        }
    }
}

impl<F> FrameSource for StillImage<F> {
    type Frame = F;

    fn name(&self) -> &str {
        "still image"
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn read(&mut self) -> Option<F> {
        self.frame.take()
    }
}

/// Adapts any iterator of frames, e.g. a decoder handing out frames lazily.
pub struct FrameIter<I> {
    name: String,
    inner: I,
}

impl<I: Iterator> FrameIter<I> {
    pub fn new<S: ToString>(name: S, inner: I) -> Self {
        Self {
            name: name.to_string(),
            inner,
        }
    }
}

impl<I: Iterator> FrameSource for FrameIter<I> {
    type Frame = I::Item;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_opened(&self) -> bool {
        true
    }

    fn read(&mut self) -> Option<I::Item> {
        self.inner.next()
    }
}
