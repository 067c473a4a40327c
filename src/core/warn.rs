use std::collections::HashMap;

use tracing::warn;

/// Non-fatal error classes absorbed at the character/box level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarnClass {
    MissingBoundingBox,
    NegativeBoundingBoxComponent,
    UnrepresentableCharacter,
    EncodingError,
    XmlIncompatibleCharacter,
}

impl WarnClass {
    pub fn message(&self) -> &'static str {
        match self {
            WarnClass::MissingBoundingBox => "character is missing a bounding box component",
            WarnClass::NegativeBoundingBoxComponent => {
                "negative bounding box component clamped to zero"
            }
            WarnClass::UnrepresentableCharacter => "dropped unrepresentable character",
            WarnClass::EncodingError => "dropped character with invalid encoding",
            WarnClass::XmlIncompatibleCharacter => "dropped character not allowed in XML output",
        }
    }
}

/// Warning sink that reports each class once and counts the rest.
///
/// Replaces the original tool's process-wide "already logged" flags with an
/// explicit state object owned by the composer.
#[derive(Debug, Default)]
pub struct Warnings {
    counts: HashMap<WarnClass, u64>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, class: WarnClass) {
        let count = self.counts.entry(class).or_insert(0);
        *count += 1;
        if *count == 1 {
            warn!("{} (further occurrences counted silently)", class.message());
        }
    }

    pub fn count(&self, class: WarnClass) -> u64 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}
