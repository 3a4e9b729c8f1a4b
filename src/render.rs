// HTML rendering - turns handler results into pages
//
// The corpus of this app is three pages (list, detail, form) plus a
// not-found page, all built from one shared layout. No template engine;
// pages are assembled with format! and escaped by hand.

use crate::bear::Bear;
use crate::schema::{BearSchema, FieldError, FieldType, FormData};
use crate::session::DeletedBear;

/// Minimal HTML escaping, safe for both text and attribute positions.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} - Bear Registry</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n\
         <body>\n\
         <nav><a href=\"/bears\">All bears</a> <a href=\"/bears/females\">Females</a> <a href=\"/bears/new\">Add a bear</a></nav>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        body = body,
    )
}

fn age_text(bear: &Bear) -> String {
    bear.age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// The list view, shared by `/bears` and `/bears/females`. A pending
/// deletion notice renders above the heading, once.
pub fn list_page(heading: &str, bears: &[Bear], flash: Option<&DeletedBear>) -> String {
    let mut body = String::new();

    if let Some(deleted) = flash {
        body.push_str(&format!(
            "<p class=\"flash\">Deleted {name}.</p>\n",
            name = escape(&deleted.name),
        ));
    }

    body.push_str(&format!("<h1>{}</h1>\n", escape(heading)));

    if bears.is_empty() {
        body.push_str("<p>No bears yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Name</th><th>Sex</th><th>Age</th><th>Added</th><th></th></tr>\n",
        );
        for bear in bears {
            body.push_str(&format!(
                "<tr>\
                 <td><a href=\"/bears/{id}\">{name}</a></td>\
                 <td>{sex}</td>\
                 <td>{age}</td>\
                 <td>{added}</td>\
                 <td><a href=\"/bears/{id}/edit\">edit</a>\
                 <form method=\"post\" action=\"/bears/{id}/delete\"><button>delete</button></form></td>\
                 </tr>\n",
                id = escape(&bear.id),
                name = escape(&bear.name),
                sex = bear.sex.as_str(),
                age = age_text(bear),
                added = bear.created_at.format("%Y-%m-%d"),
            ));
        }
        body.push_str("</table>\n");
    }

    layout(heading, &body)
}

pub fn detail_page(bear: &Bear) -> String {
    let body = format!(
        "<h1>{name}</h1>\n\
         <dl>\n\
         <dt>Sex</dt><dd>{sex}</dd>\n\
         <dt>Age</dt><dd>{age}</dd>\n\
         <dt>Added</dt><dd>{added}</dd>\n\
         <dt>Last updated</dt><dd>{updated}</dd>\n\
         </dl>\n\
         <p><a href=\"/bears/{id}/edit\">Edit</a></p>\n\
         <form method=\"post\" action=\"/bears/{id}/delete\"><button>Delete</button></form>\n",
        name = escape(&bear.name),
        sex = bear.sex.as_str(),
        age = age_text(bear),
        added = bear.created_at.format("%Y-%m-%d %H:%M"),
        updated = bear.updated_at.format("%Y-%m-%d %H:%M"),
        id = escape(&bear.id),
    );

    layout(&bear.name, &body)
}

/// The create/edit form. Fields come straight from the schema; submitted
/// values are echoed back and each failing field shows its error inline.
pub fn form_page(
    title: &str,
    action: &str,
    schema: &BearSchema,
    values: &FormData,
    errors: &[FieldError],
) -> String {
    let mut body = format!(
        "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n",
        title = escape(title),
        action = escape(action),
    );

    for field in schema.fields() {
        let value = values.get(field.name).map(String::as_str).unwrap_or("");
        let error = errors.iter().find(|e| e.field == field.name);

        body.push_str("<div class=\"field\">\n");
        body.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n",
            name = field.name,
            label = escape(field.label),
        ));

        match field.field_type {
            FieldType::Choice => {
                body.push_str(&format!(
                    "<select id=\"{name}\" name=\"{name}\">\n<option value=\"\"></option>\n",
                    name = field.name,
                ));
                for choice in field.choices().unwrap_or(&[]) {
                    let selected = if choice.eq_ignore_ascii_case(value.trim()) {
                        " selected"
                    } else {
                        ""
                    };
                    body.push_str(&format!(
                        "<option value=\"{choice}\"{selected}>{choice}</option>\n"
                    ));
                }
                body.push_str("</select>\n");
            }
            FieldType::Integer => {
                body.push_str(&format!(
                    "<input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n",
                    name = field.name,
                    value = escape(value),
                ));
            }
            FieldType::Text => {
                body.push_str(&format!(
                    "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n",
                    name = field.name,
                    value = escape(value),
                ));
            }
        }

        if let Some(error) = error {
            body.push_str(&format!(
                "<p class=\"error\">{}</p>\n",
                escape(&error.message)
            ));
        }
        body.push_str("</div>\n");
    }

    body.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    layout(title, &body)
}

pub fn not_found_page(id: &str) -> String {
    let body = format!(
        "<h1>Not found</h1>\n<p>No bear matches id {}.</p>\n",
        escape(id)
    );
    layout("Not found", &body)
}

pub fn server_error_page() -> String {
    layout(
        "Something went wrong",
        "<h1>Something went wrong</h1>\n<p>The registry could not complete that request.</p>\n",
    )
}
