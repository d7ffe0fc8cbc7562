//! Image and link fields of a news record.
//!
//! A record in `news.json` may carry its media in the current list form
//! (`images`, `links`) or in the older singular form (`image`, `link`,
//! `linkLabel`). The normalizers read whichever is present and return the
//! list form; [`apply_media_fields`] writes both forms back so that the
//! singular fields always mirror the first list element.

use serde_json::{json, Map, Value};
use std::path::{Component, Path};

/// A raw JSON object as it appears in the news file.
pub type Record = Map<String, Value>;

const PLACEHOLDER_LABEL: &str = "see more";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsLink {
    pub label: String,
    pub url: String,
}

impl NewsLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        NewsLink {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Label shown to the user. Empty labels are stored empty and only get a
    /// numbered placeholder here; `position` is 1-based.
    pub fn display_label(&self, position: usize) -> String {
        if self.label.is_empty() {
            format!("{PLACEHOLDER_LABEL} {position}")
        } else {
            self.label.clone()
        }
    }

    fn to_value(&self) -> Value {
        json!({ "label": self.label, "url": self.url })
    }
}

/// Lenient text view of a JSON value. Strings pass through, numbers and
/// booleans use their JSON text, everything else reads as empty.
pub(crate) fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn trimmed_text(value: Option<&Value>) -> String {
    value_text(value).trim().to_string()
}

/// Canonical image list of a record, falling back to the legacy `image`.
pub fn normalize_images(record: &Record) -> Vec<String> {
    if let Some(Value::Array(items)) = record.get("images") {
        let cleaned: Vec<String> = items
            .iter()
            .map(|item| trimmed_text(Some(item)))
            .filter(|item| !item.is_empty())
            .collect();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    let single = trimmed_text(record.get("image"));
    if single.is_empty() {
        Vec::new()
    } else {
        vec![single]
    }
}

/// Canonical link list of a record, falling back to `link`/`linkLabel`.
pub fn normalize_links(record: &Record) -> Vec<NewsLink> {
    let mut links = Vec::new();

    if let Some(Value::Array(items)) = record.get("links") {
        for item in items {
            match item {
                Value::Object(fields) => {
                    let url = trimmed_text(fields.get("url"));
                    if !url.is_empty() {
                        links.push(NewsLink::new(trimmed_text(fields.get("label")), url));
                    }
                }
                Value::String(url) => {
                    let url = url.trim();
                    if !url.is_empty() {
                        links.push(NewsLink::new("", url));
                    }
                }
                _ => {}
            }
        }
    }

    if links.is_empty() {
        let url = trimmed_text(record.get("link"));
        if !url.is_empty() {
            links.push(NewsLink::new(trimmed_text(record.get("linkLabel")), url));
        }
    }

    links
}

/// Writes the list fields and their singular mirrors into `record`.
pub fn apply_media_fields(record: &mut Record, images: &[String], links: &[NewsLink]) {
    record.insert("images".to_string(), Value::from(images.to_vec()));
    record.insert(
        "image".to_string(),
        Value::from(images.first().cloned().unwrap_or_default()),
    );
    record.insert(
        "links".to_string(),
        Value::Array(links.iter().map(NewsLink::to_value).collect()),
    );

    let (link, label) = match links.first() {
        Some(first) => (first.url.clone(), first.label.clone()),
        None => (String::new(), String::new()),
    };
    record.insert("link".to_string(), Value::String(link));
    record.insert("linkLabel".to_string(), Value::String(label));
}

/// One image path per line; blank lines are ignored.
pub fn parse_image_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// One link per line, written `label|url` or just `url`.
pub fn parse_link_lines(text: &str) -> Vec<NewsLink> {
    text.lines()
        .filter_map(|line| {
            let (label, url) = match line.split_once('|') {
                Some((label, url)) => (label.trim(), url.trim()),
                None => ("", line.trim()),
            };
            (!url.is_empty()).then(|| NewsLink::new(label, url))
        })
        .collect()
}

pub fn format_link_lines(links: &[NewsLink]) -> String {
    links
        .iter()
        .map(|link| {
            if link.label.is_empty() {
                link.url.clone()
            } else {
                format!("{}|{}", link.label, link.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Path to store for an attached image. Files under `root` become
/// `./relative/path`; anything else keeps its own path. Separators are
/// always `/`.
pub fn attachable_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => format!("./{}", posix_components(relative)),
        Err(_) => posix_path(path),
    }
}

fn posix_components(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn posix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn images_list_is_trimmed_and_blank_items_dropped() {
        let entry = record(json!({ "images": ["  a.png ", "", "   ", "b.jpg"] }));
        assert_eq!(normalize_images(&entry), vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn images_fall_back_to_legacy_image() {
        let entry = record(json!({ "image": "a.png" }));
        assert_eq!(normalize_images(&entry), vec!["a.png"]);

        let blank_list = record(json!({ "images": ["  "], "image": " c.png " }));
        assert_eq!(normalize_images(&blank_list), vec!["c.png"]);
    }

    #[test]
    fn images_empty_when_nothing_usable() {
        assert!(normalize_images(&Record::new()).is_empty());
        let entry = record(json!({ "images": "not-a-list", "image": "   " }));
        assert!(normalize_images(&entry).is_empty());
    }

    #[test]
    fn images_coerce_scalars_and_skip_null() {
        let entry = record(json!({ "images": [42, null, true, "x.png"] }));
        assert_eq!(normalize_images(&entry), vec!["42", "true", "x.png"]);
    }

    #[test]
    fn links_fall_back_to_legacy_fields() {
        let entry = record(json!({ "link": "http://x", "linkLabel": "X" }));
        assert_eq!(normalize_links(&entry), vec![NewsLink::new("X", "http://x")]);
    }

    #[test]
    fn links_mix_strings_and_objects_and_drop_blank_urls() {
        let entry = record(json!({
            "links": ["http://a", { "url": "http://b", "label": "B" }, { "url": "" }]
        }));
        assert_eq!(
            normalize_links(&entry),
            vec![NewsLink::new("", "http://a"), NewsLink::new("B", "http://b")]
        );
    }

    #[test]
    fn links_list_wins_over_legacy_link() {
        let entry = record(json!({
            "links": [{ "url": " http://list ", "label": " L " }],
            "link": "http://legacy",
            "linkLabel": "Legacy"
        }));
        assert_eq!(normalize_links(&entry), vec![NewsLink::new("L", "http://list")]);
    }

    #[test]
    fn links_empty_when_nothing_usable() {
        let entry = record(json!({ "links": [{ "label": "no url" }, 7], "link": " " }));
        assert!(normalize_links(&entry).is_empty());
    }

    #[test]
    fn apply_media_fields_mirrors_first_elements() {
        let mut entry = record(json!({ "image": "a.png" }));
        let images = normalize_images(&entry);
        apply_media_fields(&mut entry, &images, &[]);

        assert_eq!(entry["image"], json!("a.png"));
        assert_eq!(entry["images"], json!(["a.png"]));
        assert_eq!(entry["links"], json!([]));
        assert_eq!(entry["link"], json!(""));
        assert_eq!(entry["linkLabel"], json!(""));

        let links = vec![NewsLink::new("Read", "http://r"), NewsLink::new("", "http://s")];
        apply_media_fields(&mut entry, &[], &links);
        assert_eq!(entry["image"], json!(""));
        assert_eq!(entry["link"], json!("http://r"));
        assert_eq!(entry["linkLabel"], json!("Read"));
        assert_eq!(
            entry["links"],
            json!([{ "label": "Read", "url": "http://r" }, { "label": "", "url": "http://s" }])
        );
    }

    #[test]
    fn apply_media_fields_is_idempotent() {
        let images = vec!["a.png".to_string(), "b.png".to_string()];
        let links = vec![NewsLink::new("A", "http://a")];
        let mut once = record(json!({ "title": "t" }));
        apply_media_fields(&mut once, &images, &links);
        let mut twice = once.clone();
        apply_media_fields(&mut twice, &images, &links);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_then_apply_is_a_fixed_point() {
        let samples = [
            json!({ "image": "a.png", "link": "http://x", "linkLabel": "X" }),
            json!({ "images": [" a ", "", "b"], "links": ["http://a", { "url": "http://b" }] }),
            json!({ "images": [], "image": "", "links": [], "link": "" }),
            json!({ "links": [{ "url": "" }], "link": "http://fallback" }),
        ];
        for sample in samples {
            let mut entry = record(sample);
            let images = normalize_images(&entry);
            let links = normalize_links(&entry);
            apply_media_fields(&mut entry, &images, &links);
            assert_eq!(normalize_images(&entry), images);
            assert_eq!(normalize_links(&entry), links);
        }
    }

    #[test]
    fn display_label_only_fills_empty_labels() {
        assert_eq!(NewsLink::new("", "http://a").display_label(2), "see more 2");
        assert_eq!(NewsLink::new("Docs", "http://a").display_label(2), "Docs");
    }

    #[test]
    fn link_lines_parse_labels_and_bare_urls() {
        let text = "Docs | http://docs\nhttp://bare\n\n  |  \nOnly label|\nA|B|http://c";
        assert_eq!(
            parse_link_lines(text),
            vec![
                NewsLink::new("Docs", "http://docs"),
                NewsLink::new("", "http://bare"),
                NewsLink::new("A", "B|http://c"),
            ]
        );
    }

    #[test]
    fn link_lines_survive_format_and_parse() {
        let links = vec![NewsLink::new("Docs", "http://docs"), NewsLink::new("", "http://bare")];
        assert_eq!(format_link_lines(&links), "Docs|http://docs\nhttp://bare");
        assert_eq!(parse_link_lines(&format_link_lines(&links)), links);
    }

    #[test]
    fn image_lines_skip_blanks() {
        assert_eq!(
            parse_image_lines(" ./a.png \n\n   \n./b.png"),
            vec!["./a.png", "./b.png"]
        );
    }

    #[test]
    fn attachable_path_is_relative_under_root() {
        let root = PathBuf::from("/site");
        assert_eq!(
            attachable_path(&root, Path::new("/site/assets/images/news-4.jpg")),
            "./assets/images/news-4.jpg"
        );
        assert_eq!(
            attachable_path(&root, Path::new("/elsewhere/pic.png")),
            "/elsewhere/pic.png"
        );
    }
}
