//! Rendering of pages as Matrix markdown.
//!
//! Matrix has no embeds, a page becomes a single markdown message:
//!
//! ```text
//! <font data-mx-color="#7289da">**[Title](url)**</font>
//!
//! Body
//!
//! **Field**
//! value
//!
//! **Inline field**: value
//!
//! <sub>Footer · UTC 12:00:00 on 2024-01-01</sub>
//! ```

use crate::{
    constants::TIME_FORMAT,
    pagination::{Field, Page},
};

/// Renders a page as markdown, sections separated by blank lines.
///
/// # Examples
///
/// ```
/// use herald::{matrix::render::render_markdown, pagination::Page};
///
/// let page = Page {
///     title: Some("Pong!".to_owned()),
///     ..Page::default()
/// };
/// assert_eq!(render_markdown(&page), "**Pong!**");
/// ```
pub fn render_markdown(page: &Page) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(title) = render_title(page) {
        sections.push(title);
    }

    if let Some(body) = page.body.as_deref().filter(|b| !b.is_empty()) {
        sections.push(body.to_owned());
    }

    sections.extend(page.fields.iter().map(render_field));

    if let Some(footer) = render_footer(page) {
        sections.push(footer);
    }

    sections.join("\n\n")
}

fn render_title(page: &Page) -> Option<String> {
    let title = page.title.as_deref()?;

    let linked = match page.url.as_deref() {
        Some(url) => format!("**[{}]({})**", title, url),
        None => format!("**{}**", title),
    };

    Some(match page.color {
        Some(color) => format!("<font data-mx-color=\"#{:06x}\">{}</font>", color, linked),
        None => linked,
    })
}

fn render_field(field: &Field) -> String {
    if field.inline {
        format!("**{}**: {}", field.name, field.value)
    } else {
        format!("**{}**\n{}", field.name, field.value)
    }
}

fn render_footer(page: &Page) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(footer) = &page.footer {
        parts.push(footer.text.clone());
    }
    if let Some(timestamp) = page.timestamp {
        parts.push(timestamp.format(TIME_FORMAT).to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("<sub>{}</sub>", parts.join(" · ")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{constants::colors, pagination::Footer};

    fn create_test_page() -> Page {
        Page {
            title: Some("Command list".to_owned()),
            body: Some("Everything I can do".to_owned()),
            ..Page::default()
        }
    }

    #[test]
    fn test_title_and_body() {
        assert_eq!(render_markdown(&create_test_page()), "**Command list**\n\nEverything I can do");
    }

    #[test]
    fn test_colored_title_with_url() {
        let page = Page {
            url: Some("https://example.org".to_owned()),
            color: Some(colors::INFO),
            ..create_test_page()
        };

        let rendered = render_markdown(&page);

        assert!(rendered.starts_with(
            "<font data-mx-color=\"#7289da\">**[Command list](https://example.org)**</font>"
        ));
    }

    #[test]
    fn test_color_is_zero_padded() {
        let page = Page {
            color: Some(0x00ff00),
            ..create_test_page()
        };

        assert!(render_markdown(&page).contains("#00ff00"));
    }

    #[test]
    fn test_fields() {
        let page = Page {
            title: None,
            body: None,
            fields: vec![
                Field::new("General", "`help`, `ping`", false),
                Field::new("Total", "42", true),
            ],
            ..Page::default()
        };

        assert_eq!(
            render_markdown(&page),
            "**General**\n`help`, `ping`\n\n**Total**: 42"
        );
    }

    #[test]
    fn test_footer_with_timestamp() {
        let page = Page {
            footer: Some(Footer {
                text: "Tested by @alice:example.org (1/3)".to_owned(),
                icon_url: None,
            }),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..create_test_page()
        };

        let rendered = render_markdown(&page);

        assert!(rendered.ends_with(
            "<sub>Tested by @alice:example.org (1/3) · UTC 03:04:05 on 2024-01-02</sub>"
        ));
    }

    #[test]
    fn test_timestamp_without_footer() {
        let page = Page {
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..Page::default()
        };

        assert_eq!(render_markdown(&page), "<sub>UTC 03:04:05 on 2024-01-02</sub>");
    }

    #[test]
    fn test_empty_body_is_skipped() {
        let page = Page {
            body: Some(String::new()),
            ..create_test_page()
        };

        assert_eq!(render_markdown(&page), "**Command list**");
    }
}
