//! Feature model dialect readers and the extension-based format resolver.

use super::FeatureModel;
use crate::errors::{Error, Result};
use std::path::Path;

pub mod featureide;
pub mod fm4conf;
pub mod glencoe;
pub mod sxfm;
pub mod xmi;
mod xml;

/// Feature model file formats with a registered reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FmFormat {
    /// SPLOT simple XML feature model
    Sxfm,
    FeatureIde,
    Glencoe,
    /// EMF feature model in XMI
    Xmi,
    Fm4Conf,
}

impl FmFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        static EXTENSION_MAP: &[(&[&str], FmFormat)] = &[
            (&["sxfm", "splx"], FmFormat::Sxfm),
            (&["xml"], FmFormat::FeatureIde),
            (&["json"], FmFormat::Glencoe),
            (&["xmi"], FmFormat::Xmi),
            (&["fm4conf"], FmFormat::Fm4Conf),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, format)| *format)
    }

    /// Resolve the format from the last extension of a file name
    /// (`bike.gfm.json` is Glencoe).
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FmFormat::Sxfm => "SPLOT",
            FmFormat::FeatureIde => "FeatureIDE",
            FmFormat::Glencoe => "Glencoe",
            FmFormat::Xmi => "XMI",
            FmFormat::Fm4Conf => "FM4Conf",
        }
    }
}

/// Reads one feature model dialect.
pub trait FeatureModelParser: Send + Sync {
    /// Parse model text. `path` names the source in errors and provides the
    /// model name.
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel>;

    fn format(&self) -> FmFormat;

    fn parse(&self, path: &Path) -> Result<FeatureModel> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        self.parse_str(&content, path)
    }
}

pub fn get_parser(format: FmFormat) -> Box<dyn FeatureModelParser> {
    match format {
        FmFormat::Sxfm => Box::new(sxfm::SxfmParser),
        FmFormat::FeatureIde => Box::new(featureide::FeatureIdeParser),
        FmFormat::Glencoe => Box::new(glencoe::GlencoeParser),
        FmFormat::Xmi => Box::new(xmi::XmiParser),
        FmFormat::Fm4Conf => Box::new(fm4conf::Fm4ConfParser),
    }
}

/// Pick a reader for a model file by its extension.
pub fn resolve(path: &Path) -> Result<Box<dyn FeatureModelParser>> {
    let format = FmFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    log::debug!(
        "Resolved {} as {} model",
        path.display(),
        format.display_name()
    );
    Ok(get_parser(format))
}

/// File name used as the model (and knowledge base) name.
pub(crate) fn model_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn resolves_known_extensions() {
        assert_eq!(FmFormat::from_extension("sxfm"), Some(FmFormat::Sxfm));
        assert_eq!(FmFormat::from_extension("splx"), Some(FmFormat::Sxfm));
        assert_eq!(FmFormat::from_extension("XML"), Some(FmFormat::FeatureIde));
        assert_eq!(FmFormat::from_extension("xmi"), Some(FmFormat::Xmi));
        assert_eq!(FmFormat::from_extension("fm4conf"), Some(FmFormat::Fm4Conf));
        assert_eq!(
            FmFormat::from_path(Path::new("fms/bamboobike.gfm.json")),
            Some(FmFormat::Glencoe)
        );
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        for name in ["bike.uvl", "bike.dimacs", "README", "notes.txt"] {
            let err = resolve(Path::new(name)).err().unwrap();
            assert!(matches!(err, Error::UnsupportedFormat { .. }), "{name}");
        }
    }

    #[test]
    fn parser_matches_format() {
        for format in [
            FmFormat::Sxfm,
            FmFormat::FeatureIde,
            FmFormat::Glencoe,
            FmFormat::Xmi,
            FmFormat::Fm4Conf,
        ] {
            assert_eq!(get_parser(format).format(), format);
        }
    }

    #[test]
    fn missing_file_is_read_error() {
        let parser = get_parser(FmFormat::Sxfm);
        let err = parser
            .parse(&PathBuf::from("does/not/exist.sxfm"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn model_name_is_file_name() {
        assert_eq!(model_name(Path::new("a/b/smartwatch.sxfm")), "smartwatch.sxfm");
    }
}
