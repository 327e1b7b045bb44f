use std::fs;
use log::debug;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings, Selector};
use thiserror::Error;

/// A page element whose content is replaced as a whole
pub trait Region {
    /// Replaces the content with the given markup
    fn set_inner_html(&mut self, html: String);

    /// Replaces the content with the given plain text
    fn set_text_content(&mut self, text: &str);
}

/// Region buffered in memory until it is applied to a page
#[derive(Debug)]
pub struct ElementRegion {
    id: String,
    inner_html: String,
}

impl ElementRegion {
    pub fn new(id: &str) -> ElementRegion {
        ElementRegion { id: id.to_string(), inner_html: String::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

impl Region for ElementRegion {
    fn set_inner_html(&mut self, html: String) {
        self.inner_html = html;
    }

    fn set_text_content(&mut self, text: &str) {
        self.inner_html = tera::escape_html(text);
    }
}

/// An HTML page on disk that regions are written into by element id
pub struct HtmlPage {
    path: String,
    source: String,
}

impl HtmlPage {
    /// Reads the page from file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the HTML page
    pub fn load(path: &str) -> Result<HtmlPage, PageError> {
        let source = fs::read_to_string(path)
            .map_err(|e| PageError::FileError(format!("error reading {}: {}", path, e)))?;

        Ok(HtmlPage::from_source(path, source))
    }

    fn from_source(path: &str, source: String) -> HtmlPage {
        HtmlPage { path: path.to_string(), source }
    }

    #[cfg(test)]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replaces the content of the region's element, whatever markup it holds
    ///
    /// # Arguments
    ///
    /// * 'region' - the region to write into the page
    pub fn apply(&mut self, region: &ElementRegion) -> Result<(), PageError> {
        let selector = format!("#{}", region.id());
        selector.parse::<Selector>()
            .map_err(|e| PageError::SelectorError(format!("{}: {}", selector, e)))?;

        let mut matched = 0;
        let source = rewrite_str(&self.source, RewriteStrSettings {
            element_content_handlers: vec![
                element!(selector, |el| {
                    el.set_inner_content(region.inner_html(), ContentType::Html);
                    matched += 1;
                    Ok(())
                })
            ],
            ..RewriteStrSettings::new()
        }).map_err(|e| PageError::RewriteError(format!("#{}: {}", region.id(), e)))?;

        if matched == 0 {
            return Err(PageError::ElementNotFound(region.id().to_string()));
        }
        debug!("replaced content of #{}", region.id());
        self.source = source;

        Ok(())
    }

    /// Writes the page back to where it was read from
    pub fn save(&self) -> Result<(), PageError> {
        fs::write(&self.path, &self.source)
            .map_err(|e| PageError::FileError(format!("error writing {}: {}", self.path, e)))
    }
}

/// Error depicting errors that occur while writing regions into a page
///
#[derive(Debug, Error)]
pub enum PageError {
    #[error("FileError: {0}")]
    FileError(String),
    #[error("ElementNotFound: #{0}")]
    ElementNotFound(String),
    #[error("SelectorError: {0}")]
    SelectorError(String),
    #[error("RewriteError: {0}")]
    RewriteError(String),
}
