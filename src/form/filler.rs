//! Form filling boundary

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::fdf::to_fdf;
use super::fields::FieldMap;
use crate::error::{Error, Result};
use crate::utils::process::{expect_output, run_tool};

/// Fills a form template and flattens the result into `output`.
///
/// Field names the template does not know are ignored by implementations.
pub trait FormFiller: Send + Sync {
    fn fill(&self, template: &Path, fields: &FieldMap, output: &Path) -> Result<()>;
}

/// Fails with [`Error::TemplateMissingError`] unless the template is a readable file
pub fn ensure_template(template: &Path) -> Result<()> {
    if template.is_file() {
        Ok(())
    } else {
        Err(Error::TemplateMissingError(template.to_path_buf()))
    }
}

/// Fills forms with `pdftk <template> fill_form <fdf> output <out> flatten`
#[derive(Debug, Clone)]
pub struct PdftkFormFiller {
    program: PathBuf,
}

impl PdftkFormFiller {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftkFormFiller {
    fn default() -> Self {
        Self::new("pdftk")
    }
}

impl FormFiller for PdftkFormFiller {
    #[instrument(skip(self, fields), fields(count = fields.len()))]
    fn fill(&self, template: &Path, fields: &FieldMap, output: &Path) -> Result<()> {
        ensure_template(template)?;

        let fdf_path = output.with_extension("fdf");
        fs::write(&fdf_path, to_fdf(fields))?;

        run_tool(
            &self.program,
            [
                template.as_os_str(),
                OsStr::new("fill_form"),
                fdf_path.as_os_str(),
                OsStr::new("output"),
                output.as_os_str(),
                OsStr::new("flatten"),
            ],
        )?;
        expect_output(&self.program, output)?;

        info!("Filled {} form fields into {}", fields.len(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_is_reported_before_running_the_tool() {
        let dir = tempfile::tempdir().unwrap();
        let filler = PdftkFormFiller::new("/nonexistent/pdftk");
        let template = dir.path().join("F700-200-000.pdf");
        let err = filler
            .fill(&template, &FieldMap::new(), &dir.path().join("form.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::TemplateMissingError(p) if p == template));
    }

    #[test]
    fn test_unavailable_tool_is_an_external_failure() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("F700-200-000.pdf");
        fs::write(&template, b"%PDF-1.5").unwrap();
        let filler = PdftkFormFiller::new("/nonexistent/pdftk");
        let err = filler
            .fill(&template, &FieldMap::new(), &dir.path().join("form.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::ExternalToolError(_)));
        assert!(dir.path().join("form.fdf").exists());
    }
}
