use crate::selection::CANCEL_KEYWORD;

pub const DEFAULT_MAX_MENU_OPTIONS: usize = 4;

/// Numbered option list presented when a query is ambiguous.
///
/// # Examples
///
/// ```
/// use encore_menu::SelectionMenu;
///
/// let menu = SelectionMenu::new("Found multiple users:", 4)
///     .with_options(["alice#0042", "alice#0043"]);
/// assert_eq!(menu.len(), 2);
/// assert!(menu.render().ends_with("Type a number `1-2` to select, or `cancel`."));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMenu {
    header: String,
    max_options: usize,
    options: Vec<String>,
}

impl SelectionMenu {
    pub fn new(header: impl Into<String>, max_options: usize) -> Self {
        Self {
            header: header.into(),
            max_options: max_options.max(1),
            options: Vec::new(),
        }
    }

    /// Appends labels; anything past `max_options` is dropped.
    pub fn with_options<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let room = self.max_options.saturating_sub(self.options.len());
        self.options
            .extend(labels.into_iter().take(room).map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn render(&self) -> String {
        let mut rendered = String::new();
        rendered.push_str(&self.header);
        rendered.push('\n');
        for (index, label) in self.options.iter().enumerate() {
            rendered.push_str(&format!("`{}` {label}\n", index + 1));
        }
        rendered.push_str(&format!(
            "\nType a number `1-{}` to select, or `{CANCEL_KEYWORD}`.",
            self.options.len()
        ));
        rendered
    }
}
