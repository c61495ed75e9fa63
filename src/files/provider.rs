//! # Proveedor sobre el Filesystem
//! src/files/provider.rs
//!
//! Resuelve paths contra un directorio raíz:
//!
//! 1. `root.join(path)` y `canonicalize` (resuelve `..` y symlinks)
//! 2. Si el resultado no queda dentro de la raíz → `Absent`
//! 3. Directorio → `Directory` con sus entradas ordenadas
//! 4. Archivo con extensión permitida → `File`; cualquier otro → `Absent`
//!
//! ## Tipos permitidos
//!
//! | Extensión     | Content-Type      |
//! |---------------|-------------------|
//! | .html / .htm  | text/html         |
//! | .png          | image/png         |
//! | .pdf          | application/pdf   |

use super::{DirEntry, Fetched, ResourceProvider};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Archivos que se listan primero, en este orden
const LISTING_PRIORITY: [&str; 3] = ["index.html", "doc.pdf", "image.png"];

/// Sirve archivos desde un directorio raíz
#[derive(Debug, Clone)]
pub struct FsProvider {
    /// Raíz ya canonicalizada
    root: PathBuf,
}

impl FsProvider {
    /// Crea el proveedor; falla si la raíz no existe o no es un directorio
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} no es un directorio", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Clave lógica de un path ya verificado dentro de la raíz
    fn resource_key(&self, absolute: &Path) -> String {
        let relative = absolute.strip_prefix(&self.root).unwrap_or(Path::new(""));
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    fn read_entries(dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.path().is_dir(),
            });
        }
        sort_entries(&mut entries);
        Ok(entries)
    }
}

impl ResourceProvider for FsProvider {
    fn fetch(&self, path: &str) -> io::Result<Fetched> {
        let relative = path.trim_start_matches('/');
        if relative.contains('\0') {
            return Ok(Fetched::Absent);
        }

        let absolute = match fs::canonicalize(self.root.join(relative)) {
            Ok(p) => p,
            Err(_) => return Ok(Fetched::Absent),
        };

        // Path::starts_with compara por componentes: /srv/www2 no está en /srv/www
        if !absolute.starts_with(&self.root) {
            return Ok(Fetched::Absent);
        }

        let resource = self.resource_key(&absolute);

        if absolute.is_dir() {
            return match Self::read_entries(&absolute) {
                Ok(entries) => Ok(Fetched::Directory { resource, entries }),
                Err(_) => Ok(Fetched::Absent),
            };
        }

        let Some(content_type) = content_type_for(&absolute) else {
            return Ok(Fetched::Absent);
        };

        let bytes = fs::read(&absolute)?;
        Ok(Fetched::File {
            resource,
            content_type,
            bytes,
        })
    }
}

/// Content-Type para las extensiones que se sirven
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => Some("text/html"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// index.html, doc.pdf, image.png primero; el resto alfabético sin mayúsculas
fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by_key(|entry| {
        let lower = entry.name.to_lowercase();
        let rank = LISTING_PRIORITY
            .iter()
            .position(|p| *p == lower)
            .unwrap_or(LISTING_PRIORITY.len());
        (rank, lower)
    });
}
