use log::debug;

use crate::pagination::{CONTINUED, Document, Field, Footer, Limits, Page, PaginateError, split_text};

/// Splits a document into pages that each respect every limit.
///
/// The body is cut into chunks shorter than `max_body`, the first chunk sharing
/// the first page with the title. Fields start on the page following the last
/// body chunk (or on the first page when the body is empty) and flow over as
/// many pages as needed. A field value of `max_field_value` characters or more
/// is split into a head field and a tail field, the tail being renamed with
/// [`CONTINUED`] and forced non-inline.
///
/// An empty document produces a single blank page.
///
/// # Arguments
///
/// * `document` - The document to split, left untouched
/// * `limits` - The limits every page must respect
///
/// # Returns
///
/// The pages in reading order, or an error when the limits are inconsistent
/// or when an indivisible part (title, field name, footer) cannot fit.
pub fn paginate(document: &Document, limits: &Limits) -> Result<Vec<Page>, PaginateError> {
    limits.validate()?;

    if let Some(title) = &document.title {
        check_length("title", title, limits.max_title)?;
    }

    let footer_len = document.footer.as_ref().map_or(0, |f| f.text.chars().count());
    if footer_len + limits.footer_slack >= limits.max_total {
        return Err(PaginateError::LimitExceeded {
            part: "footer".to_owned(),
            length: footer_len,
            limit: limits.max_total - limits.footer_slack,
        });
    }
    let budget = limits.max_total - footer_len - limits.footer_slack;

    let mut pages = vec![Page {
        title: document.title.clone(),
        color: document.color,
        ..Page::default()
    }];

    let mut rest = Some(document.body.trim()).filter(|body| !body.is_empty());
    while let Some(text) = rest {
        let (chunk, latter) = split_text(text, limits.max_body);
        if current(&mut pages).body.is_some() {
            pages.push(blank_page(document));
        }
        let page = current(&mut pages);
        page.body = Some(chunk.to_owned());
        if page.size() > budget {
            return Err(PaginateError::LimitExceeded {
                part: format!("page {}", pages.len()),
                length: pages[pages.len() - 1].size() + footer_len,
                limit: limits.max_total - limits.footer_slack,
            });
        }
        rest = latter;
    }

    // Fields share the page of the last body chunk when they fit
    if !document.fields.is_empty() {
        place_fields(document, limits, budget, &mut pages)?;
    }

    apply_footers(document, &mut pages);

    debug!(
        "paginated document into {} page(s) ({} field(s) in input)",
        pages.len(),
        document.fields.len()
    );
    Ok(pages)
}

/// Moves every field of the document onto the pages, splitting long values.
fn place_fields(document: &Document, limits: &Limits, budget: usize, pages: &mut Vec<Page>) -> Result<(), PaginateError> {
    // Reversed so that popping yields reading order
    let mut stack: Vec<Field> = document
        .fields
        .iter()
        .rev()
        .map(|field| Field {
            name: field.name.trim().to_owned(),
            value: field.value.trim().to_owned(),
            inline: field.inline,
            continued: field.continued,
        })
        .collect();

    let mut running = current(pages).size();

    while let Some(mut field) = stack.pop() {
        if field.value.chars().count() >= limits.max_field_value {
            let (former, latter) = split_text(&field.value, limits.max_field_value);
            if let Some(latter) = latter {
                stack.push(Field {
                    name: field.name.clone(),
                    value: latter.to_owned(),
                    inline: false,
                    continued: true,
                });
            }
            stack.push(Field {
                name: field.name,
                value: former.to_owned(),
                inline: false,
                continued: field.continued,
            });
            continue;
        }

        if field.continued {
            field.name.push_str(CONTINUED);
        }
        check_length("field name", &field.name, limits.max_field_name)?;

        let length = field.size();
        let page = current(pages);
        let too_many_fields = page.fields.len() >= limits.max_fields;
        let too_big = running + length > budget;
        if (too_many_fields || too_big) && !page.is_blank() {
            pages.push(blank_page(document));
            running = 0;
        }
        if length > budget {
            return Err(PaginateError::LimitExceeded {
                part: format!("field `{}`", field.name),
                length,
                limit: budget,
            });
        }

        running += length;
        current(pages).fields.push(field);
    }

    Ok(())
}

/// Copies the document footer, url and timestamp onto the pages.
///
/// A multi-page result gets a `(i/N)` indicator appended to each footer.
fn apply_footers(document: &Document, pages: &mut [Page]) {
    let count = pages.len();

    if count == 1 {
        let page = &mut pages[0];
        page.footer = document.footer.clone();
        page.url = document.url.clone();
        page.timestamp = document.timestamp;
        return;
    }

    let icon_url = document.footer.as_ref().and_then(|f| f.icon_url.clone());
    for (index, page) in pages.iter_mut().enumerate() {
        let indicator = format!("({}/{})", index + 1, count);
        let text = match &document.footer {
            Some(footer) => format!("{} {}", footer.text, indicator),
            None => indicator,
        };
        page.footer = Some(Footer {
            text,
            icon_url: icon_url.clone(),
        });
        page.url = document.url.clone();
        page.timestamp = document.timestamp;
    }
}

fn blank_page(document: &Document) -> Page {
    Page {
        color: document.color,
        ..Page::default()
    }
}

fn current(pages: &mut [Page]) -> &mut Page {
    let last = pages.len() - 1;
    &mut pages[last]
}

fn check_length(part: &str, text: &str, limit: usize) -> Result<(), PaginateError> {
    let length = text.chars().count();
    if length > limit {
        return Err(PaginateError::LimitExceeded {
            part: part.to_owned(),
            length,
            limit,
        });
    }
    Ok(())
}
