//! # Proveedor de Recursos
//! src/files/mod.rs
//!
//! El handler no toca el filesystem directamente: le pide a un
//! `ResourceProvider` lo que hay en un path y recibe un `Fetched`.
//!
//! - `provider`: `FsProvider`, sirve un directorio raíz con protección contra
//!   path traversal y una lista cerrada de tipos de archivo
//! - `listing`: HTML del listado de directorios con la columna "Hits"

pub mod listing;
pub mod provider;

pub use provider::FsProvider;

/// Entrada de un directorio, tal como se muestra en el listado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Resultado de buscar un path
#[derive(Debug)]
pub enum Fetched {
    /// Archivo servible. `resource` es la clave normalizada (`/docs/a.pdf`)
    File {
        resource: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },

    /// Directorio (o la raíz) con sus entradas ya ordenadas
    Directory {
        resource: String,
        entries: Vec<DirEntry>,
    },

    /// No existe, está fuera de la raíz o su tipo no se sirve
    Absent,
}

/// Colaborador que resuelve paths lógicos a contenido
pub trait ResourceProvider: Send + Sync {
    /// Busca el path pedido (ya decodificado, empieza con '/')
    ///
    /// Un `Err` significa que el recurso existe pero no se pudo leer.
    fn fetch(&self, path: &str) -> std::io::Result<Fetched>;
}
