use crate::resolution::domain::Component;

/// QueryBuilder - turns a normalized component into a remote search query
///
/// Returning `None` means the component cannot be expressed in the query
/// grammar and is skipped without counting as a failed lookup.
pub trait QueryBuilder: Send + Sync {
    fn build(&self, component: &Component) -> Option<String>;
}

/// Lucene query grammar understood by the Vulners search endpoint.
///
/// A CPE, when present, is matched exactly. Otherwise the affected software
/// name and version are matched as a phrase pair, with a free-text fallback
/// clause unless the builder was created with [`LuceneQueryBuilder::exact_only`].
#[derive(Debug, Clone, Copy)]
pub struct LuceneQueryBuilder {
    free_text_fallback: bool,
}

impl Default for LuceneQueryBuilder {
    fn default() -> Self {
        Self {
            free_text_fallback: true,
        }
    }
}

impl LuceneQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact_only() -> Self {
        Self {
            free_text_fallback: false,
        }
    }
}

impl QueryBuilder for LuceneQueryBuilder {
    fn build(&self, component: &Component) -> Option<String> {
        if let Some(cpe) = component.cpe.as_deref().filter(|cpe| !cpe.is_empty()) {
            return Some(format!("affectedSoftware.cpe:{}", quote(cpe)));
        }
        if component.name.is_empty() || component.version.is_empty() {
            return None;
        }

        let exact = format!(
            "affectedSoftware.name:{} AND affectedSoftware.version:{}",
            quote(&component.name),
            quote(&component.version)
        );
        if !self.free_text_fallback {
            return Some(exact);
        }
        Some(format!(
            "{} OR {} {}",
            exact,
            escape_term(&component.name),
            escape_term(&component.version)
        ))
    }
}

/// Wraps a value in double quotes, escaping backslashes and quotes.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Escapes Lucene metacharacters in a bare term.
fn escape_term(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '"' | ':' | '(' | ')' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
