//! Positional merge of an attachment page sequence with generated pages
//!
//! The attachment wraps the generated content: its leading pages come first,
//! then every generated page, then the attachment's closing page. Attachment
//! pages between the leading and closing ones are dropped.

/// Reference to one page of the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRef {
    Attachment(usize),
    Generated(usize),
}

/// How many attachment pages surround the generated content
///
/// The default keeps the first two attachment pages and the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyPolicy {
    /// Attachment pages placed before the generated pages
    pub leading: usize,
    /// Attachment pages placed after the generated pages, taken from the end
    pub trailing: usize,
}

impl Default for AssemblyPolicy {
    fn default() -> Self {
        Self {
            leading: 2,
            trailing: 1,
        }
    }
}

impl AssemblyPolicy {
    /// Output order for an attachment of `attachment_pages` and `generated_pages`
    ///
    /// An attachment page is never selected twice: closing pages are only
    /// taken from what the leading pages left over.
    pub fn plan(&self, attachment_pages: usize, generated_pages: usize) -> Vec<PageRef> {
        let leading = self.leading.min(attachment_pages);
        let trailing = self.trailing.min(attachment_pages - leading);

        let mut plan = Vec::with_capacity(leading + generated_pages + trailing);
        plan.extend((0..leading).map(PageRef::Attachment));
        plan.extend((0..generated_pages).map(PageRef::Generated));
        plan.extend((attachment_pages - trailing..attachment_pages).map(PageRef::Attachment));
        plan
    }

    /// Number of attachment pages left out of the output
    pub fn dropped(&self, attachment_pages: usize) -> usize {
        let kept = self.plan(attachment_pages, 0).len();
        attachment_pages - kept
    }

    /// Apply the plan to two page sequences, cloning the selected pages
    pub fn apply<P: Clone>(&self, attachment: &[P], generated: &[P]) -> Vec<P> {
        self.plan(attachment.len(), generated.len())
            .into_iter()
            .map(|page| match page {
                PageRef::Attachment(i) => attachment[i].clone(),
                PageRef::Generated(i) => generated[i].clone(),
            })
            .collect()
    }
}

/// Merge with the default policy: first two attachment pages, all generated
/// pages, then the last attachment page when the attachment has three or more
///
/// # Example
///
/// ```
/// use pdf_directory::assemble::assemble;
///
/// let merged = assemble(&["cover", "intro", "notes", "back"], &["p1", "p2"]);
/// assert_eq!(merged, vec!["cover", "intro", "p1", "p2", "back"]);
/// ```
pub fn assemble<P: Clone>(attachment: &[P], generated: &[P]) -> Vec<P> {
    AssemblyPolicy::default().apply(attachment, generated)
}
