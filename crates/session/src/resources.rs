//! The page's related files, as reported to the controller.

use url::{Position, Url};

use crate::protocol::ResourceList;

fn decode_spaces(path: &str) -> String {
    path.replace("%20", " ")
}

struct Collector {
    files: Vec<String>,
}

impl Collector {
    fn push(&mut self, entry: String) {
        if !self.files.contains(&entry) {
            self.files.push(entry);
        }
    }

    /// Add every ancestor folder of `path` (innermost first), then `path`.
    fn add_path(&mut self, path: &str) {
        let mut segments: Vec<&str> = path.split('/').collect();
        while segments.len() > 1 {
            segments.pop();
            self.push(format!("{}/", decode_spaces(&segments.join("/"))));
        }
        self.push(decode_spaces(path));
    }
}

/// The page path plus every same-origin resource in `resources`, each
/// preceded by its folders. Relative references resolve against the page.
pub fn collate_resources<'a>(
    page: &Url,
    resources: impl IntoIterator<Item = &'a str>,
) -> ResourceList {
    let page_path = &page[Position::BeforePath..];
    let mut collector = Collector { files: Vec::new() };
    collector.add_path(page_path);

    for reference in resources {
        let Ok(resolved) = page.join(reference) else {
            continue;
        };
        if resolved.origin() == page.origin() {
            collector.add_path(&resolved[Position::BeforePath..]);
        }
    }

    ResourceList {
        related_files: collector.files,
        source: decode_spaces(page_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn folders_precede_files() {
        let page = Url::parse("http://localhost:8000/my%20site/index.html").unwrap();
        let list = collate_resources(
            &page,
            [
                "css/main.css",
                "http://localhost:8000/my%20site/js/app.js",
                "https://cdn.example.com/lib.js",
                "/img/logo.png",
            ],
        );
        assert_eq!(list.source, "/my site/index.html");
        assert_eq!(
            list.related_files,
            vec![
                "/my site/",
                "/",
                "/my site/index.html",
                "/my site/css/",
                "/my site/css/main.css",
                "/my site/js/",
                "/my site/js/app.js",
                "/img/",
                "/img/logo.png",
            ]
        );
    }

    #[test]
    fn query_stays_on_the_source() {
        let page = Url::parse("http://localhost:8000/a.html?x=1").unwrap();
        let list = collate_resources(&page, []);
        assert_eq!(list.source, "/a.html?x=1");
        assert_eq!(list.related_files, vec!["/", "/a.html?x=1"]);
    }
}
