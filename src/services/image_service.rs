//! Imágenes de puntos
//!
//! Decodifica data-URIs base64 (`data:image/<tipo>;base64,<payload>`) y las
//! guarda en el disco público como
//! `points/point_<routeId>_<unixTs>_<índice>.<tipo>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::utils::errors::{AppError, AppResult};

lazy_static! {
    static ref DATA_URI: Regex = Regex::new(r"^data:image/([A-Za-z0-9_]+);base64,").unwrap();
}

/// Subdirectorio del disco público donde van las imágenes de puntos
pub const POINTS_DIR: &str = "points";

/// Segundos consecutivos que se prueban antes de rendirse con un nombre ocupado
const MAX_NAME_ATTEMPTS: i64 = 16;

/// Imagen decodificada, todavía en memoria
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Posición en el array recibido
    pub index: usize,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Motivo por el que se descarta una entrada de `images`
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRejection {
    NotDataUri,
    InvalidBase64(String),
    Empty,
}

impl std::fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageRejection::NotDataUri => write!(f, "not a data:image/<type>;base64 URI"),
            ImageRejection::InvalidBase64(e) => write!(f, "invalid base64: {}", e),
            ImageRejection::Empty => write!(f, "empty image payload"),
        }
    }
}

/// Resultado de decodificar todas las entradas
#[derive(Debug, Default)]
pub struct DecodeOutcome {
    pub images: Vec<DecodedImage>,
    /// Índices descartados, con el motivo
    pub rejected: Vec<(usize, ImageRejection)>,
}

impl DecodeOutcome {
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.rejected.iter().map(|(index, _)| *index).collect()
    }
}

/// Decodificar una entrada del array `images`
pub fn decode_data_uri(entry: &Value) -> Result<(String, Vec<u8>), ImageRejection> {
    let Value::String(uri) = entry else {
        return Err(ImageRejection::NotDataUri);
    };
    let captures = DATA_URI.captures(uri).ok_or(ImageRejection::NotDataUri)?;
    let extension = captures[1].to_ascii_lowercase();

    let payload_start = uri.find(',').map(|p| p + 1).unwrap_or(uri.len());
    let payload: String = uri[payload_start..]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ImageRejection::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ImageRejection::Empty);
    }
    Ok((extension, bytes))
}

/// Decodificar todas las entradas, separando válidas y descartadas
pub fn decode_all(entries: &[Value]) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();
    for (index, entry) in entries.iter().enumerate() {
        match decode_data_uri(entry) {
            Ok((extension, bytes)) => {
                debug!(
                    "🖼️ Imagen {} decodificada: {} bytes ({})",
                    index,
                    bytes.len(),
                    extension
                );
                outcome.images.push(DecodedImage { index, extension, bytes });
            }
            Err(reason) => {
                warn!("⚠️ Imagen {} descartada: {}", index, reason);
                outcome.rejected.push((index, reason));
            }
        }
    }
    outcome
}

/// Archivo ya escrito en disco
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub path: PathBuf,
    pub url: String,
}

/// Disco público donde se guardan las imágenes
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
    public_prefix: String,
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn file_name(route_id: i64, timestamp: i64, index: usize, extension: &str) -> String {
        format!("point_{}_{}_{}.{}", route_id, timestamp, index, extension)
    }

    /// Escribir las imágenes de un punto.
    ///
    /// Los archivos se crean en exclusiva: si un nombre ya existe (otro punto
    /// de la misma ruta en el mismo segundo) se borra lo escrito en este intento
    /// y se reintenta con el segundo siguiente. Si una escritura falla se borran
    /// las ya escritas antes de devolver el error.
    pub async fn store(
        &self,
        route_id: i64,
        timestamp: i64,
        images: &[DecodedImage],
    ) -> AppResult<Vec<StoredImage>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.root.join(POINTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = timestamp + attempt;
            match self.write_all(&dir, route_id, candidate, images).await {
                Ok(stored) => return Ok(stored),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("🔁 Nombre ocupado (ruta {}, ts {})", route_id, candidate);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(format!(
            "no free image file name for route {} after {} attempts",
            route_id, MAX_NAME_ATTEMPTS
        )))
    }

    /// Un intento de escritura con un timestamp fijo
    async fn write_all(
        &self,
        dir: &Path,
        route_id: i64,
        timestamp: i64,
        images: &[DecodedImage],
    ) -> std::io::Result<Vec<StoredImage>> {
        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            let file_name = Self::file_name(route_id, timestamp, image.index, &image.extension);
            let path = dir.join(&file_name);
            if let Err(e) = write_new(&path, &image.bytes).await {
                self.remove(&stored).await;
                return Err(e);
            }
            info!("💾 Imagen guardada: {} ({} bytes)", path.display(), image.bytes.len());
            stored.push(StoredImage {
                path,
                url: format!("{}/{}/{}", self.public_prefix, POINTS_DIR, file_name),
            });
        }
        Ok(stored)
    }

    /// Borrar archivos ya escritos (best effort)
    pub async fn remove(&self, stored: &[StoredImage]) {
        for image in stored {
            if let Err(e) = tokio::fs::remove_file(&image.path).await {
                warn!("⚠️ No se pudo borrar {}: {}", image.path.display(), e);
            }
        }
    }
}

/// Crear el archivo sin pisar uno existente
async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path).await?;
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // PNG de 1x1
    const PNG: &str = concat!(
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA",
        "60e6kgAAAABJRU5ErkJggg=="
    );

    #[test]
    fn test_decode_valid_png() {
        let uri = json!(format!("data:image/PNG;base64,{}", PNG));
        let (extension, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(extension, "png");
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_decode_ignores_whitespace_in_payload() {
        let wrapped = format!("data:image/png;base64,{}\n{}", &PNG[..20], &PNG[20..]);
        assert!(decode_data_uri(&json!(wrapped)).is_ok());
    }

    #[test]
    fn test_decode_rejections() {
        let not_data_uri = Err(ImageRejection::NotDataUri);
        assert_eq!(decode_data_uri(&json!("https://example.org/a.png")), not_data_uri);
        assert_eq!(decode_data_uri(&json!(42)), not_data_uri);
        assert_eq!(decode_data_uri(&json!("data:image/../x;base64,AAAA")), not_data_uri);
        assert!(matches!(
            decode_data_uri(&json!("data:image/png;base64,@@not-base64@@")),
            Err(ImageRejection::InvalidBase64(_))
        ));
        assert_eq!(
            decode_data_uri(&json!("data:image/png;base64,")),
            Err(ImageRejection::Empty)
        );
    }

    #[test]
    fn test_decode_all_keeps_original_indices() {
        let entries = vec![
            json!("garbage"),
            json!(format!("data:image/png;base64,{}", PNG)),
            json!("data:image/jpeg;base64,%%%"),
            json!(format!("data:image/gif;base64,{}", PNG)),
        ];
        let outcome = decode_all(&entries);
        let indices: Vec<usize> = outcome.images.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(outcome.rejected_indices(), vec![0, 2]);
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(
            ImageStorage::file_name(3, 1700000000, 2, "png"),
            "point_3_1700000000_2.png"
        );
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/storage/");
        let images = vec![DecodedImage {
            index: 0,
            extension: "png".to_string(),
            bytes: vec![1, 2, 3],
        }];

        let stored = storage.store(5, 1700000000, &images).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, "/storage/points/point_5_1700000000_0.png");
        assert_eq!(tokio::fs::read(&stored[0].path).await.unwrap(), vec![1, 2, 3]);

        storage.remove(&stored).await;
        assert!(!stored[0].path.exists());
    }

    #[tokio::test]
    async fn test_store_same_second_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/storage");
        let image = |bytes: &[u8]| {
            vec![DecodedImage {
                index: 0,
                extension: "png".to_string(),
                bytes: bytes.to_vec(),
            }]
        };

        let first = storage.store(5, 1700000000, &image(&b"first"[..])).await.unwrap();
        let second = storage.store(5, 1700000000, &image(&b"second"[..])).await.unwrap();

        assert_ne!(first[0].url, second[0].url);
        assert_eq!(second[0].url, "/storage/points/point_5_1700000001_0.png");
        assert_eq!(tokio::fs::read(&first[0].path).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(&second[0].path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_retry_keeps_one_timestamp_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/storage");
        let points_dir = dir.path().join(POINTS_DIR);
        std::fs::create_dir_all(&points_dir).unwrap();
        // solo el índice 1 está ocupado
        std::fs::write(points_dir.join("point_5_1700000000_1.png"), b"taken").unwrap();

        let images: Vec<DecodedImage> = (0..2)
            .map(|index| DecodedImage {
                index,
                extension: "png".to_string(),
                bytes: vec![index as u8],
            })
            .collect();
        let stored = storage.store(5, 1700000000, &images).await.unwrap();

        let urls: Vec<&str> = stored.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/storage/points/point_5_1700000001_0.png",
                "/storage/points/point_5_1700000001_1.png"
            ]
        );
        assert!(!points_dir.join("point_5_1700000000_0.png").exists());
        assert_eq!(std::fs::read(points_dir.join("point_5_1700000000_1.png")).unwrap(), b"taken");
    }

    #[tokio::test]
    async fn test_store_nothing_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().join("public"), "/storage");
        assert!(storage.store(1, 1, &[]).await.unwrap().is_empty());
        assert!(!dir.path().join("public").exists());
    }
}
