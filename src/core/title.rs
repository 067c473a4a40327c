use quick_xml::escape::escape;

/// Ordered key → value(s) mapping rendered into the hOCR `title` attribute.
///
/// Insertion order is significant and reproduced exactly; no deduplication
/// or validation is performed. The rendered string is XML-escaped and safe
/// to embed in a double-quoted attribute as-is.
#[derive(Debug, Clone, Default)]
pub struct Title {
    entries: Vec<(String, Vec<String>)>,
}

impl Title {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_string(), vec![value.into()]));
    }

    pub fn push_list(&mut self, key: &str, values: Vec<String>) {
        self.entries.push((key.to_string(), values));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let joined = self
            .entries
            .iter()
            .map(|(key, values)| {
                let mut tokens = Vec::with_capacity(values.len() + 1);
                tokens.push(key.as_str());
                tokens.extend(values.iter().map(String::as_str));
                tokens.join(" ")
            })
            .collect::<Vec<_>>()
            .join("; ");
        escape(&joined).into_owned()
    }
}
