use serde::Serialize;

use crate::catalogue::{Catalogue, CultureEntry};
use crate::markup::escape_markup;

pub const CLOSING_PROMPT: &str = "Ask for more detail on any step if you need it";
pub const NO_STEPS_PLACEHOLDER: &str = "no steps available";
pub const NO_TRADITIONS_PLACEHOLDER: &str = "no traditions available";

const FALLBACK_INTRO: &str = "Cameroonian traditional marriages vary by ethnic group.";
const FALLBACK_LIST_HEADER: &str = "The main cultures include:";
const FALLBACK_PROMPT: &str =
    "Please specify which culture you're interested in for detailed information!";
const LINE_BREAK: &str = "<br>";

/// The same answer rendered twice: newline separated text and escaped markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub plain_text: String,
    pub markup_text: String,
}

pub fn render(catalogue: &Catalogue, entry: Option<&CultureEntry>) -> Rendered {
    match entry {
        Some(entry) => render_entry(entry),
        None => render_fallback(catalogue),
    }
}

pub fn render_entry(entry: &CultureEntry) -> Rendered {
    let steps = ListBlock {
        items: &entry.steps,
        style: ListStyle::Numbered,
        placeholder: NO_STEPS_PLACEHOLDER,
    };
    let traditions = ListBlock {
        items: &entry.traditions,
        style: ListStyle::Bulleted,
        placeholder: NO_TRADITIONS_PLACEHOLDER,
    };

    let plain_text = format!(
        "Traditional marriage information for {name}: Marriage steps:\n{steps}\nTraditions:\n{traditions}\n{CLOSING_PROMPT}",
        name = entry.display_name,
        steps = steps.plain(),
        traditions = traditions.plain(),
    );
    let markup_text = format!(
        "<div>Traditional marriage information for <strong>{name}</strong>:{LINE_BREAK}\
         <strong>Marriage steps:</strong>{LINE_BREAK}{steps}\
         <strong>Traditions:</strong>{LINE_BREAK}{traditions}\
         <em>{CLOSING_PROMPT}</em></div>",
        name = escape_markup(&entry.display_name),
        steps = steps.markup(),
        traditions = traditions.markup(),
    );
    Rendered {
        plain_text,
        markup_text,
    }
}

/// Answer used when no culture was resolved: lists every culture and asks the
/// caller to pick one.
pub fn render_fallback(catalogue: &Catalogue) -> Rendered {
    let mut plain_text = format!("{FALLBACK_INTRO} {FALLBACK_LIST_HEADER}");
    let mut items = String::new();
    for name in catalogue.display_names() {
        plain_text.push_str("\n- ");
        plain_text.push_str(name);
        items.push_str("<li><strong>");
        items.push_str(&escape_markup(name));
        items.push_str("</strong></li>");
    }
    plain_text.push_str("\n\n");
    plain_text.push_str(FALLBACK_PROMPT);

    let markup_text = format!(
        "<div>{FALLBACK_INTRO} {FALLBACK_LIST_HEADER}{LINE_BREAK}<ul>{items}</ul>{prompt}</div>",
        prompt = escape_markup(FALLBACK_PROMPT),
    );
    Rendered {
        plain_text,
        markup_text,
    }
}

#[derive(Clone, Copy, Debug)]
enum ListStyle {
    Numbered,
    Bulleted,
}

impl ListStyle {
    fn marker(self, index: usize) -> String {
        match self {
            ListStyle::Numbered => format!("{}.", index + 1),
            ListStyle::Bulleted => "-".to_string(),
        }
    }
}

struct ListBlock<'a> {
    items: &'a [String],
    style: ListStyle,
    placeholder: &'static str,
}

impl ListBlock<'_> {
    fn plain(&self) -> String {
        if self.items.is_empty() {
            return format!(" {}", self.placeholder);
        }
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| format!(" {} {item}", self.style.marker(index)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn markup(&self) -> String {
        if self.items.is_empty() {
            return format!(" {}{LINE_BREAK}", self.placeholder);
        }
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                format!(
                    " {} {}{LINE_BREAK}",
                    self.style.marker(index),
                    escape_markup(item)
                )
            })
            .collect()
    }
}
