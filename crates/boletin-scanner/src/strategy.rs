use crate::error::{Result, ScanError};
use boletin_core::{Record, StrategyConfig};
use scraper::{ElementRef, Selector};
use url::Url;

/// A compiled selector recipe for one class of listing element.
#[derive(Debug, Clone)]
pub struct Strategy {
    name: String,
    container: Selector,
    title: Option<Selector>,
    date: Option<Selector>,
    link: Option<Selector>,
}

impl Strategy {
    pub fn compile(config: &StrategyConfig) -> Result<Self> {
        let parse = |field: &'static str, selector: &str| {
            Selector::parse(selector).map_err(|e| ScanError::InvalidSelector {
                strategy: config.name.clone(),
                field,
                reason: format!("'{selector}': {e}"),
            })
        };

        Ok(Self {
            name: config.name.clone(),
            container: parse("container", &config.container)?,
            title: config.title.as_deref().map(|s| parse("title", s)).transpose()?,
            date: config.date.as_deref().map(|s| parse("date", s)).transpose()?,
            link: config.link.as_deref().map(|s| parse("link", s)).transpose()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &Selector {
        &self.container
    }

    /// Turn one matched container into a record.
    ///
    /// Returns `Ok(None)` for elements with nothing usable and for
    /// untitled elements.
    pub fn extract(
        &self,
        element: &ElementRef,
        base_url: Option<&Url>,
        index: usize,
    ) -> Result<Option<Record>> {
        let title = match &self.title {
            Some(selector) => first_text(element, selector),
            None => collapse_whitespace(element.text()),
        };
        let published_label = self
            .date
            .as_ref()
            .map(|selector| first_text(element, selector))
            .unwrap_or_default();
        let href = match &self.link {
            Some(selector) => element
                .select(selector)
                .find_map(|el| el.value().attr("href")),
            None => element.value().attr("href"),
        }
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !is_script_href(href));

        if title.is_empty() && published_label.is_empty() && href.is_none() {
            return Ok(None);
        }

        if title.is_empty() {
            tracing::debug!(strategy = %self.name, index, "dropping element without title");
            return Ok(None);
        }

        let document_url = href
            .map(|href| self.resolve(href, base_url, index))
            .transpose()?;

        Ok(Some(Record {
            title,
            published_label,
            document_url,
        }))
    }

    fn resolve(&self, href: &str, base_url: Option<&Url>, index: usize) -> Result<String> {
        let resolved = match base_url {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };

        resolved
            .map(|url| url.to_string())
            .map_err(|e| ScanError::Element {
                strategy: self.name.clone(),
                index,
                reason: format!("cannot resolve link '{href}': {e}"),
            })
    }
}

fn first_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .map(|el| collapse_whitespace(el.text()))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_script_href(href: &str) -> bool {
    href.get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}
