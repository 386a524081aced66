//! Extension point for mutating a response's links before serialization.
//!
//! No processor ships with this crate. Hosts register their own and run the
//! registry right before the codec writes the response.

use crate::link::Links;

/// May rewrite the link collection about to be sent to the client.
pub trait ResponsePostProcessor: Send + Sync {
    fn post_process(&self, links: &mut Links);
}

impl<F> ResponsePostProcessor for F
where
    F: Fn(&mut Links) + Send + Sync,
{
    fn post_process(&self, links: &mut Links) {
        self(links)
    }
}

/// Processors in registration order.
#[derive(Default)]
pub struct PostProcessors {
    processors: Vec<Box<dyn ResponsePostProcessor>>,
}

impl PostProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, processor: impl ResponsePostProcessor + 'static) -> &mut Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Run every processor over `links`, first registered first.
    pub fn apply(&self, links: &mut Links) {
        for processor in &self.processors {
            processor.post_process(links);
        }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl std::fmt::Debug for PostProcessors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostProcessors")
            .field("len", &self.processors.len())
            .finish()
    }
}
