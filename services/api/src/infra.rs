use lecturas::error::AppError;
use lecturas::meters::ClaveCatalog;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the clave catalog export, or start with an empty catalog when none is configured.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ClaveCatalog, AppError> {
    let Some(path) = path else {
        warn!("no clave catalog configured; clave ids will not be checked");
        return Ok(ClaveCatalog::default());
    };

    let file = File::open(path)?;
    let catalog = ClaveCatalog::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), claves = catalog.claves().len(), "clave catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_yields_empty_catalog() {
        let catalog = load_catalog(None).expect("empty catalog");
        assert!(catalog.is_empty());
    }

    #[test]
    fn reads_catalog_export_from_disk() {
        let path = std::env::temp_dir().join(format!("claves-{}.json", std::process::id()));
        let mut file = File::create(&path).expect("temp file");
        write!(
            file,
            r#"[{{"IdClave":"22","DescripcionClave":"LEOK - LECTURA CORRECTA","IdentificadorDeAgrupacion":"1"}}]"#
        )
        .expect("write catalog");

        let catalog = load_catalog(Some(&path)).expect("catalog loads");
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.correct_reading_id(), "22");
        assert_eq!(catalog.options_for_group("1").len(), 2);
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let err = load_catalog(Some(Path::new("/nonexistent/claves.json"))).expect_err("missing");
        assert!(matches!(err, AppError::Io(_)));
    }
}
