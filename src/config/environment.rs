//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Qué hacer con una imagen base64 que no se puede decodificar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidImagePolicy {
    /// Se descarta sin avisar
    #[default]
    Skip,
    /// Se descarta y se devuelve su índice en `rejected_images`
    Report,
    /// Toda la petición falla con 422
    Reject,
}

impl FromStr for InvalidImagePolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "report" => Ok(Self::Report),
            "reject" => Ok(Self::Reject),
            other => Err(anyhow!(
                "IMAGE_DECODE_POLICY inválido: '{}' (valores: skip, report, reject)",
                other
            )),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Directorio raíz del disco público; las imágenes van en `<root>/points`
    pub storage_root: PathBuf,
    /// Prefijo público con el que se sirven los archivos guardados
    pub public_storage_prefix: String,
    pub image_decode_policy: InvalidImagePolicy,
    pub max_body_bytes: usize,
    pub seed_file: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            storage_root: PathBuf::from("storage/app/public"),
            public_storage_prefix: "/storage".to_string(),
            image_decode_policy: InvalidImagePolicy::Skip,
            max_body_bytes: 20 * 1024 * 1024,
            seed_file: None,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno.
    ///
    /// Las variables ausentes toman el valor por defecto; las que están
    /// presentes pero no se pueden interpretar son un error de arranque.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        let public_storage_prefix = env::var("PUBLIC_STORAGE_PREFIX")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_storage_prefix);

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins,
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            public_storage_prefix,
            image_decode_policy: parse_var("IMAGE_DECODE_POLICY", defaults.image_decode_policy)?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("{} tiene un valor inválido: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("skip".parse::<InvalidImagePolicy>().unwrap(), InvalidImagePolicy::Skip);
        assert_eq!(" Report ".parse::<InvalidImagePolicy>().unwrap(), InvalidImagePolicy::Report);
        assert_eq!("REJECT".parse::<InvalidImagePolicy>().unwrap(), InvalidImagePolicy::Reject);
        assert!("ignore".parse::<InvalidImagePolicy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert_eq!(config.public_storage_prefix, "/storage");
        assert_eq!(config.image_decode_policy, InvalidImagePolicy::Skip);
        assert_eq!(config.server_url(), "0.0.0.0:3000");
    }
}
