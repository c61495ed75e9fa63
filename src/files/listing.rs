//! # Listado de Directorios
//! src/files/listing.rs
//!
//! Genera el HTML del índice de un directorio. Cada archivo muestra cuántas
//! veces fue servido, leído con `HitCounter::snapshot`: es una lectura sólo
//! para mostrar y no se sincroniza con los requests en curso.

use super::DirEntry;
use crate::state::HitCounter;

/// Renderiza el listado de `resource` (clave lógica, `/` para la raíz)
pub fn render(resource: &str, entries: &[DirEntry], hits: &HitCounter) -> String {
    let title = if resource == "/" {
        "/".to_string()
    } else {
        format!("{}/", resource)
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html><head><meta charset='utf-8'>");
    html.push_str(&format!("<title>Index of {}</title>\n", escape_html(&title)));
    html.push_str("<style>body{font-family:system-ui,Segoe UI,Arial} a{text-decoration:none} td,th{padding:4px 12px;text-align:left}</style>\n");
    html.push_str("</head><body>\n");
    html.push_str(&format!("<h1>Index of {}</h1>\n", escape_html(&title)));
    html.push_str("<table>\n<tr><th>Name</th><th>Hits</th></tr>\n");

    if let Some(parent) = parent_of(resource) {
        let href = if parent == "/" {
            "/".to_string()
        } else {
            format!("{}/", encode_href(&parent))
        };
        html.push_str(&format!(
            "<tr><td>📁 <a href=\"{}\">Parent Directory</a></td><td></td></tr>\n",
            href
        ));
    }

    for entry in entries {
        let child = child_key(resource, &entry.name);
        let row = if entry.is_dir {
            format!(
                "<tr><td>📁 <a href=\"{}/\">{}/</a></td><td>-</td></tr>\n",
                encode_href(&child),
                escape_html(&entry.name)
            )
        } else {
            format!(
                "<tr><td>📄 <a href=\"{}\">{}</a></td><td>{}</td></tr>\n",
                encode_href(&child),
                escape_html(&entry.name),
                hits.snapshot(&child)
            )
        };
        html.push_str(&row);
    }

    html.push_str("</table>\n</body></html>\n");
    html
}

/// Clave lógica de una entrada dentro de `resource`
pub fn child_key(resource: &str, name: &str) -> String {
    if resource == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", resource, name)
    }
}

fn parent_of(resource: &str) -> Option<String> {
    if resource == "/" {
        return None;
    }
    match resource.rfind('/') {
        Some(0) | None => Some("/".to_string()),
        Some(idx) => Some(resource[..idx].to_string()),
    }
}

/// Percent-encoding de todo lo que no sea unreserved o '/'
fn encode_href(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
